//! Extraction stage — first model call: classify the inbound text.

use tracing::info;

use crate::llm_client::{LlmError, StructuredOutputService};
use crate::pipeline::prompts::EXTRACTION_SYSTEM;
use crate::pipeline::schemas::{ExtractionResult, EXTRACTION_SCHEMA};

/// Classifies raw user text as in or out of the recruiting domain.
///
/// A pure mapping from text to classification; the gate owns all policy.
/// The decision and confidence are logged for observability only.
pub async fn extract(
    service: &dyn StructuredOutputService,
    raw_text: &str,
) -> Result<ExtractionResult, LlmError> {
    let value = service
        .invoke(EXTRACTION_SYSTEM, raw_text, &EXTRACTION_SCHEMA)
        .await?;

    let result: ExtractionResult =
        serde_json::from_value(value).map_err(|e| LlmError::SchemaViolation {
            schema: EXTRACTION_SCHEMA.name,
            detail: e.to_string(),
        })?;

    info!(
        is_in_domain = result.is_in_domain,
        confidence = result.confidence,
        "extraction complete"
    );
    Ok(result)
}
