use frostgate_core::{ManagerKind, StatementKind};
use frostgate_policy::{AttributeMap, ResourceSpec, ValidationError};
use frostgate_sql::StatementClassifier;

use super::{ObjectManager, create_head, render_properties};

/// Views: a backing query kept verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewManager {
    classifier: StatementClassifier,
}

impl ViewManager {
    pub fn new(classifier: StatementClassifier) -> Self {
        Self { classifier }
    }
}

impl ObjectManager for ViewManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::View
    }

    fn build_create(
        &self,
        spec: &ResourceSpec,
        attrs: &AttributeMap,
    ) -> Result<String, ValidationError> {
        let query = attrs
            .get_str("query")
            .map(|q| q.trim().trim_end_matches(';').trim_end())
            .unwrap_or_default();
        if query.is_empty() {
            return Err(ValidationError::required_attribute_missing(&spec.name, "query"));
        }

        // Exactly one statement, and it must be a query.
        let kinds = self.classifier.classify_all(query);
        if kinds != [StatementKind::Query] {
            return Err(ValidationError::rule_violation(
                "query",
                format!(
                    "A view query must be a single SELECT statement, found: {}",
                    kinds
                        .iter()
                        .map(|k| k.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }

        let mut sql = create_head(spec, attrs);
        for property in render_properties(spec, attrs) {
            sql.push(' ');
            sql.push_str(&property);
        }
        sql.push_str(" AS ");
        sql.push_str(query);
        Ok(sql)
    }
}
