//! Pipeline orchestrator — sequences extraction → gate → generation →
//! (confirmation) and returns a terminal outcome.
//!
//! Stages run strictly sequentially: each stage's input is the prior
//! stage's output, so suspension happens only at the model-call boundary.
//! The orchestrator holds no state across invocations; concurrent
//! invocations share nothing but the injected service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm_client::{LlmError, StructuredOutputService};
use crate::pipeline::confirmation::confirm;
use crate::pipeline::extraction::extract;
use crate::pipeline::gate;
use crate::pipeline::generation::{generate_assistant_reply, generate_role_description};
use crate::pipeline::schemas::{ConversationTurn, GenerationMode, PipelineOutcome};

/// The prompt-chain pipeline. Constructed once at startup with its model
/// service, generation mode, and gate threshold — no globals.
#[derive(Clone)]
pub struct Pipeline {
    service: Arc<dyn StructuredOutputService>,
    mode: GenerationMode,
    gate_threshold: f32,
}

impl Pipeline {
    pub fn new(service: Arc<dyn StructuredOutputService>, mode: GenerationMode) -> Self {
        Self {
            service,
            mode,
            gate_threshold: gate::DEFAULT_THRESHOLD,
        }
    }

    /// Overrides the gate threshold (GATE_THRESHOLD config).
    pub fn with_gate_threshold(mut self, threshold: f32) -> Self {
        self.gate_threshold = threshold;
        self
    }

    /// Runs one pipeline invocation.
    ///
    /// 1. extraction stage on the raw text;
    /// 2. gate check — failure returns `NotApplicable` immediately,
    ///    carrying no partial state;
    /// 3. generation stage on the extracted description, never the raw
    ///    text;
    /// 4. role-description mode: confirmation stage wraps the result;
    ///    assistant mode: the generation result is terminal.
    ///
    /// Stage errors (`ModelUnavailable`, `SchemaViolation`) propagate
    /// unretried; `NotApplicable` is an outcome, not an error.
    pub async fn process(
        &self,
        raw_text: &str,
        history: Option<&[ConversationTurn]>,
    ) -> Result<PipelineOutcome, LlmError> {
        let extraction = extract(self.service.as_ref(), raw_text).await?;

        if !gate::passes(&extraction, self.gate_threshold) {
            warn!(
                is_in_domain = extraction.is_in_domain,
                confidence = extraction.confidence,
                threshold = self.gate_threshold,
                "gate check failed"
            );
            return Ok(PipelineOutcome::NotApplicable);
        }
        info!("gate check passed, proceeding with generation");

        match self.mode {
            GenerationMode::RoleDescription => {
                let role =
                    generate_role_description(self.service.as_ref(), &extraction.description, history)
                        .await?;
                info!(title = %role.title, "role description generated");

                let confirmation = confirm(self.service.as_ref(), &role).await?;
                info!("confirmation message generated");

                Ok(PipelineOutcome::Confirmed { role, confirmation })
            }
            GenerationMode::Assistant => {
                let reply =
                    generate_assistant_reply(self.service.as_ref(), &extraction.description, history)
                        .await?;
                info!("assistant reply generated");

                Ok(PipelineOutcome::Replied(reply))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::llm_client::SchemaDescriptor;
    use crate::pipeline::schemas::TurnRole;

    /// Deterministic stand-in for the model service: pops queued values in
    /// order and records what each call asked for.
    struct StubService {
        responses: Mutex<VecDeque<Result<Value, LlmError>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    #[derive(Debug, Clone)]
    struct RecordedCall {
        schema: &'static str,
        system: String,
        payload: String,
    }

    impl StubService {
        fn new(responses: Vec<Result<Value, LlmError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        fn schemas_called(&self) -> Vec<&'static str> {
            self.calls().into_iter().map(|c| c.schema).collect()
        }
    }

    #[async_trait]
    impl StructuredOutputService for StubService {
        async fn invoke(
            &self,
            system_instruction: &str,
            user_payload: &str,
            schema: &SchemaDescriptor,
        ) -> Result<Value, LlmError> {
            self.calls.lock().unwrap().push(RecordedCall {
                schema: schema.name,
                system: system_instruction.to_string(),
                payload: user_payload.to_string(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("no stub response queued for schema '{}'", schema.name))
        }
    }

    fn extraction_value(description: &str, is_in_domain: bool, confidence: f32) -> Value {
        json!({
            "description": description,
            "is_in_domain": is_in_domain,
            "confidence": confidence
        })
    }

    fn role_value() -> Value {
        json!({
            "title": "Senior Backend Engineer",
            "requirements": "5 years of distributed systems experience"
        })
    }

    fn confirmation_value() -> Value {
        json!({
            "message": "Here is the role description for your review. Would you like any modifications?"
        })
    }

    fn pipeline(service: Arc<StubService>, mode: GenerationMode) -> Pipeline {
        Pipeline::new(service, mode)
    }

    #[tokio::test]
    async fn test_recruiting_request_returns_confirmation() {
        // Scenario: a clear recruiting request in role-description mode runs
        // all three stages and ends with a non-empty confirmation.
        let service = Arc::new(StubService::new(vec![
            Ok(extraction_value(
                "Hiring a senior backend engineer with 5 years of distributed systems experience",
                true,
                0.93,
            )),
            Ok(role_value()),
            Ok(confirmation_value()),
        ]));

        let outcome = pipeline(service.clone(), GenerationMode::RoleDescription)
            .process(
                "Looking for a senior backend engineer with 5 years of distributed systems experience",
                None,
            )
            .await
            .unwrap();

        match outcome {
            PipelineOutcome::Confirmed { role, confirmation } => {
                assert_eq!(role.title, "Senior Backend Engineer");
                assert!(!confirmation.message.is_empty());
            }
            other => panic!("expected Confirmed, got {other:?}"),
        }
        assert_eq!(
            service.schemas_called(),
            vec!["extraction_result", "role_description", "confirmation_result"]
        );
    }

    #[tokio::test]
    async fn test_out_of_domain_request_short_circuits() {
        // Scenario: a weather question fails the gate; generation and
        // confirmation are never invoked.
        let service = Arc::new(StubService::new(vec![Ok(extraction_value(
            "A question about today's weather",
            false,
            0.98,
        ))]));

        let outcome = pipeline(service.clone(), GenerationMode::RoleDescription)
            .process("What's the weather today?", None)
            .await
            .unwrap();

        assert!(matches!(outcome, PipelineOutcome::NotApplicable));
        assert_eq!(service.schemas_called(), vec!["extraction_result"]);
    }

    #[tokio::test]
    async fn test_borderline_confidence_fails_gate() {
        // Scenario: in-domain but confidence 0.69 — just under the bound.
        let service = Arc::new(StubService::new(vec![Ok(extraction_value(
            "Possibly a hiring request",
            true,
            0.69,
        ))]));

        let outcome = pipeline(service.clone(), GenerationMode::RoleDescription)
            .process("maybe hire someone?", None)
            .await
            .unwrap();

        assert!(matches!(outcome, PipelineOutcome::NotApplicable));
        assert_eq!(service.schemas_called(), vec!["extraction_result"]);
    }

    #[tokio::test]
    async fn test_exact_threshold_confidence_passes_gate() {
        let service = Arc::new(StubService::new(vec![
            Ok(extraction_value("Hiring request", true, 0.7)),
            Ok(role_value()),
            Ok(confirmation_value()),
        ]));

        let outcome = pipeline(service.clone(), GenerationMode::RoleDescription)
            .process("hire a backend engineer", None)
            .await
            .unwrap();

        assert!(matches!(outcome, PipelineOutcome::Confirmed { .. }));
        assert_eq!(service.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_model_unavailable_during_extraction_propagates() {
        // Scenario: transport failure on the first call; nothing downstream
        // is constructed.
        let service = Arc::new(StubService::new(vec![Err(LlmError::ModelUnavailable(
            "connection refused".to_string(),
        ))]));

        let err = pipeline(service.clone(), GenerationMode::RoleDescription)
            .process("hire a backend engineer", None)
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::ModelUnavailable(_)));
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_schema_violation_during_generation_propagates() {
        // The extraction passes, then generation returns a record missing
        // `requirements` — the typed decode rejects it.
        let service = Arc::new(StubService::new(vec![
            Ok(extraction_value("Hiring request", true, 0.9)),
            Ok(json!({"title": "Senior Backend Engineer"})),
        ]));

        let err = pipeline(service.clone(), GenerationMode::RoleDescription)
            .process("hire a backend engineer", None)
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::SchemaViolation { .. }));
        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_assistant_mode_never_invokes_confirmation() {
        let service = Arc::new(StubService::new(vec![
            Ok(extraction_value("Draft an outreach message", true, 0.88)),
            Ok(json!({
                "reply": "Hi! We're hiring a platform engineer and your background stood out.",
                "confirmation": "Drafted an outreach message for the platform engineer role."
            })),
        ]));

        let outcome = pipeline(service.clone(), GenerationMode::Assistant)
            .process("write an outreach message for a platform engineer", None)
            .await
            .unwrap();

        match outcome {
            PipelineOutcome::Replied(reply) => assert!(!reply.reply.is_empty()),
            other => panic!("expected Replied, got {other:?}"),
        }
        assert_eq!(
            service.schemas_called(),
            vec!["extraction_result", "assistant_reply"]
        );
    }

    #[tokio::test]
    async fn test_confirmation_runs_exactly_once_per_success() {
        let service = Arc::new(StubService::new(vec![
            Ok(extraction_value("Hiring request", true, 0.9)),
            Ok(role_value()),
            Ok(confirmation_value()),
        ]));

        pipeline(service.clone(), GenerationMode::RoleDescription)
            .process("hire a backend engineer", None)
            .await
            .unwrap();

        let confirmations = service
            .schemas_called()
            .into_iter()
            .filter(|s| *s == "confirmation_result")
            .count();
        assert_eq!(confirmations, 1);
    }

    #[tokio::test]
    async fn test_generation_receives_description_not_raw_text() {
        // The extracted restatement, not the user's raw text, feeds the
        // generation stage.
        let raw = "pls find me sum1 who does backend stuff, 5yrs+";
        let normalized = "Hiring a backend engineer with at least 5 years of experience";
        let service = Arc::new(StubService::new(vec![
            Ok(extraction_value(normalized, true, 0.9)),
            Ok(role_value()),
            Ok(confirmation_value()),
        ]));

        pipeline(service.clone(), GenerationMode::RoleDescription)
            .process(raw, None)
            .await
            .unwrap();

        let calls = service.calls();
        assert_eq!(calls[0].payload, raw);
        assert_eq!(calls[1].payload, normalized);
    }

    #[tokio::test]
    async fn test_confirmation_receives_serialized_role() {
        let service = Arc::new(StubService::new(vec![
            Ok(extraction_value("Hiring request", true, 0.9)),
            Ok(role_value()),
            Ok(confirmation_value()),
        ]));

        pipeline(service.clone(), GenerationMode::RoleDescription)
            .process("hire a backend engineer", None)
            .await
            .unwrap();

        let calls = service.calls();
        let payload: Value = serde_json::from_str(&calls[2].payload).unwrap();
        assert_eq!(payload["title"], "Senior Backend Engineer");
    }

    #[tokio::test]
    async fn test_history_reaches_generation_but_not_extraction() {
        let history = vec![ConversationTurn {
            role: TurnRole::User,
            content: "previously asked about a data engineer role".to_string(),
            auxiliary_data: None,
            timestamp: Utc::now(),
        }];
        let service = Arc::new(StubService::new(vec![
            Ok(extraction_value("Hiring request", true, 0.9)),
            Ok(role_value()),
            Ok(confirmation_value()),
        ]));

        pipeline(service.clone(), GenerationMode::RoleDescription)
            .process("hire a backend engineer", Some(&history))
            .await
            .unwrap();

        let calls = service.calls();
        assert!(!calls[0].system.contains("data engineer"));
        assert!(calls[1].system.contains("data engineer"));
    }
}
