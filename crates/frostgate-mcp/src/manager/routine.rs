use frostgate_core::ManagerKind;
use frostgate_policy::{AttributeMap, DropRequest, ResourceSpec, ValidationError};
use frostgate_sql::render::{dollar_quote, quote_identifier, string_list_literal, string_literal};

use super::{ObjectManager, create_head, drop_statement, drop_target, render_properties};

/// Languages that run on a managed runtime and need a handler.
const RUNTIME_LANGUAGES: [&str; 3] = ["PYTHON", "JAVA", "SCALA"];

/// Functions and procedures: signature, return type, language and body.
#[derive(Debug, Clone, Copy)]
pub struct RoutineManager {
    kind: ManagerKind,
}

impl RoutineManager {
    pub fn function() -> Self {
        Self {
            kind: ManagerKind::Function,
        }
    }

    pub fn procedure() -> Self {
        Self {
            kind: ManagerKind::Procedure,
        }
    }

    /// Return type, applying the procedure default for SQL bodies.
    fn return_type<'a>(
        &self,
        spec: &ResourceSpec,
        attrs: &'a AttributeMap,
        language: &str,
    ) -> Result<&'a str, ValidationError> {
        match attrs.get_str("returns") {
            Some(returns) => Ok(returns),
            None if self.kind == ManagerKind::Procedure && language == "SQL" => Ok("VARCHAR"),
            None => Err(ValidationError::required_attribute_missing(&spec.name, "returns")),
        }
    }
}

impl ObjectManager for RoutineManager {
    fn kind(&self) -> ManagerKind {
        self.kind
    }

    fn build_create(
        &self,
        spec: &ResourceSpec,
        attrs: &AttributeMap,
    ) -> Result<String, ValidationError> {
        let language = attrs.get_str("language").unwrap_or("SQL");
        let returns = self.return_type(spec, attrs, language)?;
        let needs_runtime = RUNTIME_LANGUAGES.contains(&language);

        for attr in ["runtime_version", "handler"] {
            if needs_runtime && !attrs.contains(attr) {
                return Err(ValidationError::rule_violation(
                    attr,
                    format!("Attribute '{}' is required when language is {}", attr, language),
                ));
            }
        }
        if !needs_runtime {
            for attr in ["runtime_version", "handler", "packages"] {
                if attrs.contains(attr) {
                    return Err(ValidationError::rule_violation(
                        attr,
                        format!(
                            "Attribute '{}' only applies to {} routines",
                            attr,
                            RUNTIME_LANGUAGES.join(", ")
                        ),
                    ));
                }
            }
        }

        let arguments = attrs.columns("arguments").unwrap_or_default();
        let mut params = Vec::with_capacity(arguments.len());
        for arg in arguments {
            if !arg.nullable || arg.comment.is_some() {
                return Err(ValidationError::rule_violation(
                    "arguments",
                    format!("Argument '{}' takes only a name and a type", arg.name),
                ));
            }
            params.push(format!("{} {}", quote_identifier(&arg.name), arg.data_type));
        }

        let body = attrs.get_str("body").unwrap_or_default();
        let Some(body) = dollar_quote(body) else {
            return Err(ValidationError::rule_violation(
                "body",
                "The body must not contain '$$'",
            ));
        };

        let mut sql = format!(
            "{}({}) RETURNS {} LANGUAGE {}",
            create_head(spec, attrs),
            params.join(", "),
            returns,
            language
        );
        if let Some(version) = attrs.get_str("runtime_version") {
            sql.push_str(&format!(" RUNTIME_VERSION = {}", string_literal(version)));
        }
        if let Some(packages) = attrs.list("packages") {
            sql.push_str(&format!(" PACKAGES = {}", string_list_literal(packages)));
        }
        if let Some(handler) = attrs.get_str("handler") {
            sql.push_str(&format!(" HANDLER = {}", string_literal(handler)));
        }
        for property in render_properties(spec, attrs) {
            sql.push(' ');
            sql.push_str(&property);
        }
        sql.push_str(" AS ");
        sql.push_str(&body);
        Ok(sql)
    }

    fn build_drop(
        &self,
        spec: &ResourceSpec,
        request: &DropRequest,
    ) -> Result<String, ValidationError> {
        let Some(signature) = &request.signature else {
            return Err(ValidationError::invalid_request(
                "signature",
                format!(
                    "Dropping a {} requires its argument types, e.g. [\"NUMBER\", \"VARCHAR\"]",
                    spec.name
                ),
            ));
        };
        let target = format!("{}({})", drop_target(spec, request), signature.join(", "));
        Ok(drop_statement(spec, request, &target))
    }
}
