use frostgate_core::ManagerKind;
use frostgate_policy::{AttributeMap, ColumnSpec, ResourceSpec, ValidationError};
use frostgate_sql::render::{quote_identifier, string_literal};

use super::{ObjectManager, create_head, render_properties};

/// Tables: ordered column definitions and optional clustering keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableManager;

impl ObjectManager for TableManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Table
    }

    fn build_create(
        &self,
        spec: &ResourceSpec,
        attrs: &AttributeMap,
    ) -> Result<String, ValidationError> {
        let columns = attrs.columns("columns").unwrap_or_default();
        if columns.is_empty() {
            return Err(ValidationError::too_few_items("columns", 1, 0));
        }

        let defs: Vec<String> = columns.iter().map(column_definition).collect();
        let mut sql = format!("{} ({})", create_head(spec, attrs), defs.join(", "));

        let keys = attrs.list("clustering_keys").unwrap_or_default();
        if !keys.is_empty() {
            for key in keys {
                if !columns.iter().any(|c| c.name.eq_ignore_ascii_case(key)) {
                    return Err(ValidationError::rule_violation(
                        "clustering_keys",
                        format!("Clustering key '{}' is not a declared column", key),
                    ));
                }
            }
            let keys: Vec<String> = keys.iter().map(|k| quote_identifier(k)).collect();
            sql.push_str(&format!(" CLUSTER BY ({})", keys.join(", ")));
        }

        for property in render_properties(spec, attrs) {
            sql.push(' ');
            sql.push_str(&property);
        }
        Ok(sql)
    }
}

fn column_definition(column: &ColumnSpec) -> String {
    let mut def = format!("{} {}", quote_identifier(&column.name), column.data_type);
    if !column.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(comment) = &column.comment {
        def.push_str(&format!(" COMMENT {}", string_literal(comment)));
    }
    def
}

#[cfg(test)]
mod tests {
    use crate::manager::test_support::create;
    use frostgate_policy::ValidationErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_create_table_with_columns() {
        let sql = create(
            "table",
            json!({
                "database": "sales",
                "schema": "public",
                "name": "orders",
                "columns": [
                    {"name": "id", "type": "NUMBER(38, 0)", "nullable": false},
                    {"name": "placed at", "type": "TIMESTAMP_NTZ", "comment": "UTC"}
                ],
                "clustering_keys": ["ID"],
                "comment": "orders"
            }),
        )
        .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE sales.public.orders (id NUMBER(38, 0) NOT NULL, \
             \"placed at\" TIMESTAMP_NTZ COMMENT 'UTC') CLUSTER BY (ID) COMMENT = 'orders'"
        );
    }

    #[test]
    fn test_columns_as_json_string() {
        let sql = create(
            "table",
            json!({
                "database": "sales",
                "schema": "public",
                "name": "t",
                "transient": true,
                "columns": "[{\"name\": \"v\", \"type\": \"VARIANT\"}]"
            }),
        )
        .unwrap();
        assert_eq!(sql, "CREATE TRANSIENT TABLE sales.public.t (v VARIANT)");
    }

    #[test]
    fn test_empty_columns_rejected() {
        let err = create(
            "table",
            json!({"database": "d", "schema": "s", "name": "t", "columns": []}),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::TooFewItems);
        assert_eq!(err.attribute.as_deref(), Some("columns"));
    }

    #[test]
    fn test_clustering_key_must_be_a_column() {
        let err = create(
            "table",
            json!({
                "database": "d",
                "schema": "s",
                "name": "t",
                "columns": [{"name": "id", "type": "NUMBER"}],
                "clustering_keys": ["region"]
            }),
        )
        .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::RuleViolation);
        assert_eq!(err.attribute.as_deref(), Some("clustering_keys"));
    }
}
