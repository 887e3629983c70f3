//! Generation stage — second model call: produce the domain payload from
//! the extracted description.
//!
//! Input is always `ExtractionResult.description`, never the raw user
//! text: the extraction stage's restatement is the isolation boundary
//! between what the user typed and what downstream stages see.

use crate::llm_client::{LlmError, StructuredOutputService};
use crate::pipeline::prompts::{
    ASSISTANT_GENERATION_SYSTEM, HISTORY_CONTEXT_TEMPLATE, ROLE_GENERATION_SYSTEM,
};
use crate::pipeline::schemas::{
    AssistantReply, ConversationTurn, RoleDescription, ASSISTANT_REPLY_SCHEMA,
    ROLE_DESCRIPTION_SCHEMA,
};

/// Produces a role title + requirements pair for internal recruiter use.
pub async fn generate_role_description(
    service: &dyn StructuredOutputService,
    description: &str,
    history: Option<&[ConversationTurn]>,
) -> Result<RoleDescription, LlmError> {
    let system = with_history_context(ROLE_GENERATION_SYSTEM, history);
    let value = service
        .invoke(&system, description, &ROLE_DESCRIPTION_SCHEMA)
        .await?;

    serde_json::from_value(value).map_err(|e| LlmError::SchemaViolation {
        schema: ROLE_DESCRIPTION_SCHEMA.name,
        detail: e.to_string(),
    })
}

/// Produces a user-facing reply plus a short confirmation in one call.
pub async fn generate_assistant_reply(
    service: &dyn StructuredOutputService,
    description: &str,
    history: Option<&[ConversationTurn]>,
) -> Result<AssistantReply, LlmError> {
    let system = with_history_context(ASSISTANT_GENERATION_SYSTEM, history);
    let value = service
        .invoke(&system, description, &ASSISTANT_REPLY_SCHEMA)
        .await?;

    serde_json::from_value(value).map_err(|e| LlmError::SchemaViolation {
        schema: ASSISTANT_REPLY_SCHEMA.name,
        detail: e.to_string(),
    })
}

/// Embeds serialized history into the system instruction as background
/// context. Turns are serialized verbatim — order preserved, content never
/// parsed — with an instruction to act only on the latest request.
fn with_history_context(base: &str, history: Option<&[ConversationTurn]>) -> String {
    match history {
        None | Some([]) => base.to_string(),
        Some(turns) => {
            let history_json = serde_json::to_string(turns).unwrap_or_default();
            format!(
                "{base}{}",
                HISTORY_CONTEXT_TEMPLATE.replace("{history_json}", &history_json)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::schemas::TurnRole;
    use chrono::Utc;

    fn turn(role: TurnRole, content: &str) -> ConversationTurn {
        ConversationTurn {
            role,
            content: content.to_string(),
            auxiliary_data: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_no_history_leaves_system_untouched() {
        assert_eq!(
            with_history_context(ROLE_GENERATION_SYSTEM, None),
            ROLE_GENERATION_SYSTEM
        );
    }

    #[test]
    fn test_empty_history_leaves_system_untouched() {
        assert_eq!(
            with_history_context(ROLE_GENERATION_SYSTEM, Some(&[])),
            ROLE_GENERATION_SYSTEM
        );
    }

    #[test]
    fn test_history_is_appended_after_base_instruction() {
        let turns = vec![turn(TurnRole::User, "Need a data engineer")];
        let system = with_history_context(ROLE_GENERATION_SYSTEM, Some(&turns));

        assert!(system.starts_with(ROLE_GENERATION_SYSTEM));
        assert!(system.contains("Need a data engineer"));
        assert!(system.contains("continuity only"));
    }

    #[test]
    fn test_history_order_is_preserved() {
        let turns = vec![
            turn(TurnRole::User, "first message"),
            turn(TurnRole::System, "first response"),
            turn(TurnRole::User, "second message"),
        ];
        let system = with_history_context(ASSISTANT_GENERATION_SYSTEM, Some(&turns));

        let first = system.find("first message").unwrap();
        let response = system.find("first response").unwrap();
        let second = system.find("second message").unwrap();
        assert!(first < response && response < second);
    }
}
