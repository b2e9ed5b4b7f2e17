use crate::{
    error::{AgentError, Result},
    schemas::{CompletionSchema, SchemaHandle},
    types::response::deserialize_structured_response,
};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::debug;

const MAX_SCHEMA_ERRORS: usize = 3;

/// Terminal tool intercepted by the revision loop.
pub const FINAL_ANSWER_TOOL_NAME: &str = "final_answer_tool";

/// Conventional argument key holding the final plan.
pub const FINAL_OUTPUT_KEY: &str = "final_output";

/// Validate a JSON value against a JSON schema, reporting at most a few
/// violations with their instance paths.
pub(crate) fn validate_against_schema(
    schema_name: &str,
    schema: &Value,
    payload: &Value,
) -> Result<()> {
    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|err| {
            AgentError::Validation(format!(
                "Failed to prepare `{}` schema for validation: {}",
                schema_name, err
            ))
        })?;

    if let Err(errors) = validator.validate(payload) {
        let mut details = Vec::new();
        let mut truncated = false;

        for (idx, error) in errors.enumerate() {
            if idx == MAX_SCHEMA_ERRORS {
                truncated = true;
                break;
            }
            let mut path = error.instance_path.to_string();
            if path.is_empty() {
                path = "<root>".to_string();
            }
            details.push(format!("{}: {}", path, error));
        }

        let mut detail_str = if details.is_empty() {
            "payload failed schema validation".to_string()
        } else {
            details.join("; ")
        };

        if truncated {
            detail_str.push_str("; additional errors truncated");
        }

        return Err(AgentError::Validation(format!(
            "payload does not match `{}` schema: {}",
            schema_name, detail_str
        )));
    }

    Ok(())
}

/// Validate a payload against a completion schema handle.
pub(crate) fn validate_structured_payload(schema: &SchemaHandle, payload: &Value) -> Result<()> {
    validate_against_schema(schema.schema_name(), schema.schema_json(), payload)
}

/// Validate a payload against `T`'s schema, then deserialize it into `T`.
pub fn validate_completion<T: CompletionSchema>(payload: &Value) -> Result<T> {
    let schema = T::schema();
    if let Err(err) = validate_structured_payload(schema, payload) {
        debug!(
            target: "itinerary::schema",
            schema = schema.schema_name(),
            error = %err,
            payload = %payload
        );
        return Err(err);
    }
    deserialize_structured_response::<T>(payload, schema)
}

/// Select the plan payload from final answer arguments: the conventional
/// `final_output` key when present, otherwise the whole argument mapping.
pub fn final_answer_payload(arguments: &Value) -> &Value {
    arguments.get(FINAL_OUTPUT_KEY).unwrap_or(arguments)
}
