// Configuration types shared across all Frostgate crates
pub mod config;

// Closed set of statement kinds used by the classifier and the permission seed
pub mod statement;

// Re-export commonly used config types for convenience
pub use config::{
    AttributeConstraint,
    AttributeDefinition,
    AttributeType,
    ConfigError,
    CrossFieldRule,
    // Main config
    FrostgateConfig,
    ListingConfig,
    ManagerKind,
    RegistryConfig,
    // Registry seed types
    RegistrySeed,
    Rendering,
    ResourceTypeDefinition,
    Scope,
    ServerConfig,
    SqlConfig,
    SqlDialect,
    StatementPermissionsConfig,
};
pub use statement::{StatementKind, UnknownStatementKind};
