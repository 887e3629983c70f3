//! Stage payload records and their structured-output schemas.
//!
//! Every record here is a value: constructed once by its stage and never
//! mutated afterwards. Each record is paired with the `SchemaDescriptor`
//! its stage requests from the model, so the field set the model is asked
//! for and the field set we deserialize stay side by side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm_client::{FieldSpec, FieldType, SchemaDescriptor};

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// First stage output: classification of the inbound text.
///
/// `confidence` is reported even when `is_in_domain` is false; the gate
/// logs both regardless of the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Normalized restatement of the user's request. Downstream stages see
    /// this, never the raw input.
    pub description: String,
    pub is_in_domain: bool,
    pub confidence: f32,
}

pub const EXTRACTION_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    name: "extraction_result",
    fields: &[
        FieldSpec {
            name: "description",
            ty: FieldType::String,
            description: "Normalized restatement of the user's request",
        },
        FieldSpec {
            name: "is_in_domain",
            ty: FieldType::Boolean,
            description: "Whether the text is a request relevant to a job recruiter",
        },
        FieldSpec {
            name: "confidence",
            ty: FieldType::Number,
            description: "Confidence score between 0 and 1",
        },
    ],
};

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Role-description mode output: a role + requirements pair for internal
/// recruiter use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDescription {
    pub title: String,
    pub requirements: String,
}

pub const ROLE_DESCRIPTION_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    name: "role_description",
    fields: &[
        FieldSpec {
            name: "title",
            ty: FieldType::String,
            description: "Name of the role being hired for",
        },
        FieldSpec {
            name: "requirements",
            ty: FieldType::String,
            description: "Experience needed from a candidate to fill the open position",
        },
    ],
};

/// Conversational-assistant mode output: a user-facing reply plus a short
/// confirmation, produced in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub reply: String,
    pub confirmation: String,
}

pub const ASSISTANT_REPLY_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    name: "assistant_reply",
    fields: &[
        FieldSpec {
            name: "reply",
            ty: FieldType::String,
            description: "The reply to send to the user",
        },
        FieldSpec {
            name: "confirmation",
            ty: FieldType::String,
            description: "One sentence confirming what was done",
        },
    ],
};

// ────────────────────────────────────────────────────────────────────────────
// Confirmation
// ────────────────────────────────────────────────────────────────────────────

/// Terminal output of the confirmation stage (role-description mode only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationResult {
    pub message: String,
}

pub const CONFIRMATION_SCHEMA: SchemaDescriptor = SchemaDescriptor {
    name: "confirmation_result",
    fields: &[FieldSpec {
        name: "message",
        ty: FieldType::String,
        description: "Natural language confirmation message",
    }],
};

// ────────────────────────────────────────────────────────────────────────────
// Pipeline configuration and terminal outcome
// ────────────────────────────────────────────────────────────────────────────

/// Which generation stage the pipeline runs. A deployment configuration
/// choice, never detected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Produce a title + requirements pair, then wrap it with the
    /// confirmation stage.
    RoleDescription,
    /// Produce a user-facing reply plus confirmation in one call; the
    /// confirmation stage never runs.
    Assistant,
}

impl std::str::FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "role_description" => Ok(Self::RoleDescription),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!(
                "unknown generation mode '{other}' (expected 'role_description' or 'assistant')"
            )),
        }
    }
}

/// Terminal result of one pipeline invocation.
///
/// `NotApplicable` is a normal outcome, not a failure: the gate concluded
/// the text is not a recruiting request. Callers must never conflate it
/// with a service error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Role-description mode: the generated role plus its user-facing
    /// confirmation wrapper.
    Confirmed {
        role: RoleDescription,
        confirmation: ConfirmationResult,
    },
    /// Conversational-assistant mode: the generation result is terminal.
    Replied(AssistantReply),
    NotApplicable,
}

// ────────────────────────────────────────────────────────────────────────────
// Conversation history
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    System,
}

/// One prior turn supplied as read-only context to the generation stage.
///
/// The pipeline never parses history: turns are serialized verbatim for
/// the model, in whatever order the store returned them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auxiliary_data: Option<Value>,
    pub timestamp: DateTime<Utc>,
}
