//! Frostgate resource registry and attribute validation.
//!
//! Resource types are described as data (see
//! [`frostgate_core::config::registry`]). This crate compiles those
//! descriptions into immutable [`ResourceSpec`]s held by a
//! [`ResourceRegistry`], and validates caller-supplied attributes against
//! them.
//!
//! # Example
//!
//! ```ignore
//! use frostgate_policy::{AttributeValidator, RegistryBuilder};
//!
//! let registry = RegistryBuilder::with_builtin()?.build();
//! let spec = registry.lookup("warehouse")?;
//! let attrs = AttributeValidator::new(spec)
//!     .validate(&serde_json::json!({"name": "wh1", "warehouse_size": "small"}))?;
//! assert_eq!(attrs.get_str("warehouse_size"), Some("SMALL"));
//! ```

pub mod error;
pub mod registry;
pub mod request;
pub mod spec;
pub mod validator;
pub mod value;

pub use error::{RegistryError, ValidationError, ValidationErrorKind};
pub use registry::{RegistryBuilder, ResourceRegistry};
pub use request::{DropRequest, ListFilter};
pub use spec::{AttributeSpec, Constraint, ResourceSpec};
pub use validator::{AttributeValidator, check_identifier, is_valid_data_type};
pub use value::{AttributeMap, AttributeValue, ColumnSpec};
