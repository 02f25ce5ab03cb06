//! Argument validation against a tool's JSON Schema.
//!
//! Each tool's schema is derived once from its argument struct and compiled with `jsonschema`,
//! so the schema an agent sees in `tools/list` is the same one its arguments are checked
//! against. Every violation is collected and rendered in one message.

use std::fmt;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde_json::{Map, Value};

pub type JsonObject = Map<String, Value>;

/// Every violation found in one set of arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid arguments: {}", .violations.join("; "))]
pub struct ValidationError {
    violations: Vec<String>,
}

impl ValidationError {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

/// A compiled object schema plus the parts needed to phrase violations.
#[derive(Clone)]
pub struct ArgumentSchema {
    validator: Arc<Validator>,
    schema: Arc<JsonObject>,
    required: Vec<String>,
}

impl fmt::Debug for ArgumentSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSchema")
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

impl ArgumentSchema {
    /// Compile `schema`. The error is the compiler's description of what is wrong with it.
    pub fn compile(schema: &JsonObject) -> Result<Self, String> {
        let validator = jsonschema::validator_for(&Value::Object(schema.clone()))
            .map_err(|e| e.to_string())?;
        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            validator: Arc::new(validator),
            schema: Arc::new(schema.clone()),
            required,
        })
    }

    /// Names of the fields a caller must supply.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    pub fn validate(&self, arguments: &JsonObject) -> Result<(), ValidationError> {
        // A required field sent as null is reported as missing, not as a type mismatch.
        let mut instance = arguments.clone();
        instance.retain(|name, value| !(value.is_null() && self.required.contains(name)));
        let instance = Value::Object(instance);

        let violations: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|error| self.describe(&error))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }

    fn describe(&self, error: &jsonschema::ValidationError<'_>) -> String {
        let field = field_name(&error.instance_path.to_string());
        match &error.kind {
            ValidationErrorKind::Required { property } => match property {
                Value::String(name) => format!("{} is required", name),
                other => format!("{} is required", other),
            },
            ValidationErrorKind::Type { .. } => {
                format!("{} must be a {}", field, self.expected_type(&field))
            }
            ValidationErrorKind::MinLength { limit: 1 } => format!("{} must not be empty", field),
            ValidationErrorKind::MinLength { limit } => {
                format!("{} must be at least {} characters", field, limit)
            }
            _ if field.is_empty() => error.to_string(),
            _ => format!("{}: {}", field, error),
        }
    }

    /// Declared type of a property, ignoring `null`, e.g. `string` or `boolean`.
    fn expected_type(&self, field: &str) -> String {
        let declared = self
            .schema
            .get("properties")
            .and_then(|p| p.get(field))
            .and_then(|p| p.get("type"));
        let names: Vec<&str> = match declared {
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .filter(|name| *name != "null")
                .collect(),
            _ => Vec::new(),
        };
        if names.is_empty() {
            "valid value".to_string()
        } else {
            names.join(" or ")
        }
    }
}

/// Top-level property named by a JSON pointer such as `/category`.
fn field_name(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .replace("~1", "/")
        .replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    fn document_schema() -> ArgumentSchema {
        ArgumentSchema::compile(&object(json!({
            "type": "object",
            "properties": {
                "category": { "type": "string", "minLength": 1 },
                "document": { "type": "string", "minLength": 1 },
                "all": { "type": ["boolean", "null"] }
            },
            "required": ["category", "document"]
        })))
        .unwrap()
    }

    #[test]
    fn test_valid_arguments() {
        let schema = document_schema();
        let args = object(json!({ "category": "cli", "document": "getting-started" }));
        assert!(schema.validate(&args).is_ok());
    }

    #[test]
    fn test_violations_are_aggregated() {
        let schema = document_schema();
        let err = schema.validate(&JsonObject::new()).unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.violations().contains(&"category is required".to_string()));
        assert!(err.violations().contains(&"document is required".to_string()));
        assert!(err.to_string().starts_with("Invalid arguments: "));
    }

    #[test]
    fn test_mixed_violations_are_aggregated() {
        let schema = document_schema();
        let args = object(json!({ "category": "", "all": 3 }));
        let err = schema.validate(&args).unwrap_err();
        assert_eq!(err.violations().len(), 3);
        assert!(err.violations().contains(&"category must not be empty".to_string()));
        assert!(err.violations().contains(&"document is required".to_string()));
        assert!(err.violations().contains(&"all must be a boolean".to_string()));
    }

    #[test]
    fn test_empty_string_rejected() {
        let schema = document_schema();
        let args = object(json!({ "category": "", "document": "x" }));
        let err = schema.validate(&args).unwrap_err();
        assert_eq!(err.violations(), ["category must not be empty"]);
    }

    #[test]
    fn test_wrong_type_rejected() {
        let schema = document_schema();
        let args = object(json!({ "category": 7, "document": "x", "all": "yes" }));
        let err = schema.validate(&args).unwrap_err();
        assert!(err.violations().contains(&"category must be a string".to_string()));
        assert!(err.violations().contains(&"all must be a boolean".to_string()));
    }

    #[test]
    fn test_null_required_counts_as_missing() {
        let schema = document_schema();
        let args = object(json!({ "category": null, "document": "x" }));
        let err = schema.validate(&args).unwrap_err();
        assert_eq!(err.violations(), ["category is required"]);
    }

    #[test]
    fn test_optional_null_and_extra_fields_allowed() {
        let schema = document_schema();
        let args = object(json!({
            "category": "cli",
            "document": "x",
            "all": null,
            "unrelated": 42
        }));
        assert!(schema.validate(&args).is_ok());
    }

    #[test]
    fn test_min_length_counts_characters() {
        let schema = ArgumentSchema::compile(&object(json!({
            "type": "object",
            "properties": { "name": { "type": "string", "minLength": 3 } },
            "required": ["name"]
        })))
        .unwrap();
        assert!(schema.validate(&object(json!({ "name": "äöü" }))).is_ok());
        let err = schema.validate(&object(json!({ "name": "ab" }))).unwrap_err();
        assert_eq!(err.violations(), ["name must be at least 3 characters"]);
    }

    #[test]
    fn test_schema_without_properties_accepts_anything() {
        let schema = ArgumentSchema::compile(&object(json!({ "type": "object" }))).unwrap();
        assert_eq!(schema.required_fields().count(), 0);
        assert!(schema.validate(&object(json!({ "x": 1 }))).is_ok());
    }

    #[test]
    fn test_invalid_schema_does_not_compile() {
        let result = ArgumentSchema::compile(&object(json!({
            "type": "object",
            "properties": { "name": { "type": "not-a-type" } }
        })));
        assert!(result.is_err());
    }

    #[test]
    fn test_field_name_from_pointer() {
        assert_eq!(field_name("/category"), "category");
        assert_eq!(field_name("/a~1b/0"), "a/b");
        assert_eq!(field_name(""), "");
    }
}
