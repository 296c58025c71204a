//! JSON Schema validation for clashgraft settings

use crate::error::MergeError;
use anyhow::{Result, anyhow};
use jsonschema::Validator;
use serde_json::Value;

/// Build a validator from the embedded settings schema
///
/// # Errors
///
/// Returns an error if:
/// - The embedded schema is not valid JSON or not a valid draft-07 schema
pub fn get_schema() -> Result<Validator> {
    let schema_str = include_str!("../../docs/settings.schema.json");
    let schema: Value = serde_json::from_str(schema_str)
        .map_err(|e| anyhow!("Failed to parse embedded JSON schema: {e}"))?;

    jsonschema::draft7::new(&schema).map_err(|e| anyhow!("Failed to compile JSON schema: {e}"))
}

/// Validate a raw settings value against the schema
///
/// # Errors
///
/// Returns an error listing every schema violation found.
pub fn validate_against_schema(settings: &Value) -> Result<()> {
    let schema = get_schema()?;

    let error_messages: Vec<String> = schema
        .iter_errors(settings)
        .map(|e| format!("  - {e}"))
        .collect();

    if !error_messages.is_empty() {
        return Err(MergeError::configuration(format!(
            "Settings do not match the schema:\n{}",
            error_messages.join("\n")
        ))
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_schema_compiles() {
        get_schema().unwrap();
    }

    #[test]
    fn accepts_partial_settings() {
        validate_against_schema(&json!({"github": {"owner": "me"}})).unwrap();
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = validate_against_schema(&json!({"githbu": {}})).unwrap_err();
        assert!(err.to_string().contains("Settings do not match the schema"));
    }

    #[test]
    fn rejects_unknown_preset() {
        assert!(validate_against_schema(&json!({"policy": {"preset": "v9"}})).is_err());
    }
}
