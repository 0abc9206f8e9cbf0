//! Resource specification registry.
//!
//! Registration happens on a [`RegistryBuilder`] during startup. Building
//! yields a [`ResourceRegistry`], which has no mutation API: once the engine
//! is running the set of resource types is fixed.

use std::collections::HashMap;

use frostgate_core::config::RegistryConfig;
use frostgate_core::{RegistrySeed, ResourceTypeDefinition};

use crate::error::RegistryError;
use crate::spec::ResourceSpec;

/// Collects resource specs during initialization.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    specs: Vec<ResourceSpec>,
    index: HashMap<String, usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder pre-loaded with the built-in catalog.
    pub fn with_builtin() -> Result<Self, RegistryError> {
        let mut builder = Self::new();
        builder.register_seed(&RegistrySeed::builtin()?)?;
        Ok(builder)
    }

    /// A builder loaded from every source named in the configuration.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut builder = Self::new();
        for def in config.definitions()? {
            builder.register(&def)?;
        }
        Ok(builder)
    }

    /// Register every type in a seed document, in order.
    pub fn register_seed(&mut self, seed: &RegistrySeed) -> Result<(), RegistryError> {
        for def in &seed.resource_types {
            self.register(def)?;
        }
        Ok(())
    }

    /// Register one resource type.
    ///
    /// Fails on a malformed definition or when the type name is taken.
    pub fn register(&mut self, def: &ResourceTypeDefinition) -> Result<(), RegistryError> {
        let spec = ResourceSpec::from_definition(def)?;
        if self.index.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateType(spec.name));
        }
        tracing::debug!(
            object_type = %spec.name,
            scope = spec.scope.as_str(),
            manager = spec.manager.as_str(),
            "Registered resource type"
        );
        self.index.insert(spec.name.clone(), self.specs.len());
        self.specs.push(spec);
        Ok(())
    }

    /// Freeze the registry.
    pub fn build(self) -> ResourceRegistry {
        ResourceRegistry {
            specs: self.specs,
            index: self.index,
        }
    }
}

/// Immutable mapping from type name to [`ResourceSpec`].
#[derive(Debug)]
pub struct ResourceRegistry {
    specs: Vec<ResourceSpec>,
    index: HashMap<String, usize>,
}

impl ResourceRegistry {
    /// Look up a type by name (case-insensitive).
    pub fn lookup(&self, object_type: &str) -> Result<&ResourceSpec, RegistryError> {
        let key = object_type.trim().to_ascii_lowercase();
        self.index
            .get(&key)
            .map(|&idx| &self.specs[idx])
            .ok_or_else(|| RegistryError::UnknownType {
                object_type: object_type.to_string(),
                available: self.list_types().iter().map(|s| s.to_string()).collect(),
            })
    }

    /// Type names in registration order.
    pub fn list_types(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(yaml: &str) -> ResourceTypeDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    const STAGE: &str = r#"
name: stage
keyword: STAGE
scope: nested-in-schema
attributes:
  - name: name
    type: string
    required: true
    render: identity
"#;

    #[test]
    fn test_builtin_types_in_registration_order() {
        let registry = RegistryBuilder::with_builtin().unwrap().build();
        assert_eq!(
            registry.list_types(),
            vec![
                "database",
                "schema",
                "warehouse",
                "role",
                "database_role",
                "table",
                "view",
                "function",
                "procedure"
            ]
        );
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut builder = RegistryBuilder::new();
        builder.register(&def(STAGE)).unwrap();
        let err = builder.register(&def(STAGE)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateType(ref name) if name == "stage"));
    }

    #[test]
    fn test_duplicate_of_builtin_fails() {
        let mut builder = RegistryBuilder::with_builtin().unwrap();
        let err = builder
            .register(&def(
                r#"
name: Warehouse
keyword: WAREHOUSE
attributes:
  - name: name
    type: string
    required: true
    render: identity
"#,
            ))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateType(_)));
    }

    #[test]
    fn test_lookup_unknown_lists_available_types() {
        let mut builder = RegistryBuilder::new();
        builder.register(&def(STAGE)).unwrap();
        let registry = builder.build();

        assert_eq!(registry.lookup("STAGE").unwrap().name, "stage");
        match registry.lookup("pipe").unwrap_err() {
            RegistryError::UnknownType {
                object_type,
                available,
            } => {
                assert_eq!(object_type, "pipe");
                assert_eq!(available, vec!["stage".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_config_without_builtin() {
        let config: RegistryConfig = serde_yaml::from_str(
            r#"
builtin: false
resource_types:
  - name: stage
    keyword: STAGE
    scope: nested-in-schema
    attributes:
      - name: name
        type: string
        required: true
        render: identity
"#,
        )
        .unwrap();
        let registry = RegistryBuilder::from_config(&config).unwrap().build();
        assert_eq!(registry.list_types(), vec!["stage"]);
    }
}
