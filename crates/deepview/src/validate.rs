//! Scalar field validation seam
//!
//! Per-value validation is delegated to a collaborator.
//! [`DeclaredTypeValidator`] checks values against the declared
//! [`FieldType`] and is the default strategy of the nested write engine.

use serde_json::Value;

use crate::schema::{EntityType, FieldDef, FieldType};

/// Accepts or rejects one scalar value for a declared field
pub trait FieldValidator: Send + Sync {
    /// Validate `value` for `field` on `entity`, rejecting with a reason
    fn validate(&self, entity: &EntityType, field: &FieldDef, value: &Value) -> Result<(), String>;
}

/// Validates values against the field's declared type.
///
/// Explicit `null` is accepted for optional fields and rejected for
/// required ones; absent fields are left to the storage layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredTypeValidator;

impl FieldValidator for DeclaredTypeValidator {
    fn validate(&self, _entity: &EntityType, field: &FieldDef, value: &Value) -> Result<(), String> {
        if value.is_null() {
            return if field.required {
                Err("field is required".to_string())
            } else {
                Ok(())
            };
        }

        let accepted = match field.field_type {
            FieldType::Text => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Json => true,
        };

        if accepted {
            Ok(())
        } else {
            Err(format!("expected {} value", field.field_type))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(field_type: FieldType) -> FieldDef {
        FieldDef::new("value", field_type)
    }

    #[test]
    fn test_declared_type_validator_accepts_matching_values() {
        let entity = EntityType::new("Sample");
        let validator = DeclaredTypeValidator;

        assert!(validator.validate(&entity, &field(FieldType::Text), &json!("hello")).is_ok());
        assert!(validator.validate(&entity, &field(FieldType::Integer), &json!(3)).is_ok());
        assert!(validator.validate(&entity, &field(FieldType::Float), &json!(3)).is_ok());
        assert!(validator.validate(&entity, &field(FieldType::Boolean), &json!(true)).is_ok());
        assert!(validator.validate(&entity, &field(FieldType::Json), &json!({"any": 1})).is_ok());
    }

    #[test]
    fn test_declared_type_validator_rejects_mismatches() {
        let entity = EntityType::new("Sample");
        let validator = DeclaredTypeValidator;

        let err = validator
            .validate(&entity, &field(FieldType::Integer), &json!("three"))
            .unwrap_err();
        assert_eq!(err, "expected integer value");

        assert!(validator.validate(&entity, &field(FieldType::Text), &json!(1)).is_err());
        assert!(validator.validate(&entity, &field(FieldType::Boolean), &json!("true")).is_err());
    }

    #[test]
    fn test_null_handling_follows_required_flag() {
        let entity = EntityType::new("Sample");
        let validator = DeclaredTypeValidator;

        assert!(validator.validate(&entity, &field(FieldType::Text), &Value::Null).is_ok());
        let required = FieldDef::new("value", FieldType::Text).required();
        let err = validator.validate(&entity, &required, &Value::Null).unwrap_err();
        assert_eq!(err, "field is required");
    }
}
