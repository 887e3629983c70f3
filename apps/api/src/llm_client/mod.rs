/// LLM Client — the single point of entry for all model calls in Helix.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module, and every call requests
/// structured output against an explicit `SchemaDescriptor`.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in Helix.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
/// One bounded timeout for every stage call. A call that exceeds it fails
/// with `ModelUnavailable`. Stage errors are terminal for the invocation;
/// retry policy belongs to the caller, not this client.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport or service failure: connection error, timeout, or a
    /// non-success HTTP status from the model API.
    #[error("model service unavailable: {0}")]
    ModelUnavailable(String),

    /// The service responded, but the payload does not conform to the
    /// requested schema: empty content, unparseable JSON, or a missing or
    /// mistyped field.
    #[error("model output violated schema '{schema}': {detail}")]
    SchemaViolation {
        schema: &'static str,
        detail: String,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Schema descriptors
// ────────────────────────────────────────────────────────────────────────────

/// JSON type expected for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Boolean,
    Number,
}

impl FieldType {
    fn label(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Number => "number",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Number => value.is_number(),
        }
    }
}

/// One field of a structured-output schema.
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub description: &'static str,
}

/// Describes the exact field set a stage expects the model to return.
/// Rendered into the system instruction and enforced against the response
/// before the stage ever sees it.
#[derive(Debug)]
pub struct SchemaDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl SchemaDescriptor {
    /// Renders the schema as prompt instructions: one line per field plus
    /// the JSON-only rules shared by every stage.
    pub fn render(&self) -> String {
        let mut out = String::from("Return a single JSON object with EXACTLY these fields:\n");
        for field in self.fields {
            out.push_str(&format!(
                "- \"{}\" ({}): {}\n",
                field.name,
                field.ty.label(),
                field.description
            ));
        }
        out.push('\n');
        out.push_str(prompts::JSON_ONLY_RULES);
        out
    }

    /// Checks that `value` is an object carrying every declared field with
    /// the declared JSON type. Extra fields are tolerated.
    pub fn validate(&self, value: &Value) -> Result<(), LlmError> {
        let object = value.as_object().ok_or_else(|| LlmError::SchemaViolation {
            schema: self.name,
            detail: "expected a JSON object".to_string(),
        })?;

        for field in self.fields {
            let Some(found) = object.get(field.name) else {
                return Err(LlmError::SchemaViolation {
                    schema: self.name,
                    detail: format!("missing field '{}'", field.name),
                });
            };
            if !field.ty.matches(found) {
                return Err(LlmError::SchemaViolation {
                    schema: self.name,
                    detail: format!("field '{}' is not a {}", field.name, field.ty.label()),
                });
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Capability interface
// ────────────────────────────────────────────────────────────────────────────

/// The single capability the pipeline consumes from its environment: one
/// structured-output model invocation keyed by (system instruction, user
/// payload, schema).
///
/// Carried as `Arc<dyn StructuredOutputService>` so tests can substitute a
/// deterministic fake for the real client without any global state.
#[async_trait]
pub trait StructuredOutputService: Send + Sync {
    async fn invoke(
        &self,
        system_instruction: &str,
        user_payload: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Value, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic-backed client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct LlmResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Production `StructuredOutputService` over the Anthropic Messages API.
///
/// Each call is a single atomic round-trip: no retry, no streaming, no
/// internal checkpoints. The schema's rendering is appended to the stage's
/// system instruction and the response is validated against the descriptor
/// before being returned.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl StructuredOutputService for LlmClient {
    async fn invoke(
        &self,
        system_instruction: &str,
        user_payload: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Value, LlmError> {
        let system = format!("{system_instruction}\n\n{}", schema.render());
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: &system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: user_payload,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::ModelUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the error message out of the API's error envelope
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::ModelUnavailable(format!(
                "API returned {status}: {message}"
            )));
        }

        let llm_response: LlmResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ModelUnavailable(e.to_string()))?;

        debug!(
            input_tokens = llm_response.usage.input_tokens,
            output_tokens = llm_response.usage.output_tokens,
            schema = schema.name,
            "model call succeeded"
        );

        let text = llm_response.text().ok_or(LlmError::SchemaViolation {
            schema: schema.name,
            detail: "model returned empty content".to_string(),
        })?;

        let value: Value =
            serde_json::from_str(strip_json_fences(text)).map_err(|e| LlmError::SchemaViolation {
                schema: schema.name,
                detail: format!("output is not valid JSON: {e}"),
            })?;

        schema.validate(&value)?;
        Ok(value)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
