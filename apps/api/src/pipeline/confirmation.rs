//! Confirmation stage — third model call, role-description mode only.

use crate::llm_client::{LlmError, StructuredOutputService};
use crate::pipeline::prompts::CONFIRMATION_SYSTEM;
use crate::pipeline::schemas::{ConfirmationResult, RoleDescription, CONFIRMATION_SCHEMA};

/// Wraps a generated role description in a courteous, human-addressed
/// confirmation message that offers to take modification requests.
///
/// Purely derivative of the generation output; stateless.
pub async fn confirm(
    service: &dyn StructuredOutputService,
    role: &RoleDescription,
) -> Result<ConfirmationResult, LlmError> {
    let payload = serde_json::to_string(role).unwrap_or_default();
    let value = service
        .invoke(CONFIRMATION_SYSTEM, &payload, &CONFIRMATION_SCHEMA)
        .await?;

    serde_json::from_value(value).map_err(|e| LlmError::SchemaViolation {
        schema: CONFIRMATION_SCHEMA.name,
        detail: e.to_string(),
    })
}
