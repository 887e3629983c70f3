//! Gate — the single policy decision point in the pipeline.
//!
//! All domain-relevance enforcement lives here, nowhere else. On failure
//! the orchestrator invokes nothing downstream.

use crate::pipeline::schemas::ExtractionResult;

/// Default confidence threshold; overridable via GATE_THRESHOLD.
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// Pass condition: the text is in-domain AND confidence meets the
/// threshold. The bound is inclusive: exactly-at-threshold passes.
pub fn passes(result: &ExtractionResult, threshold: f32) -> bool {
    result.is_in_domain && result.confidence >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extraction(is_in_domain: bool, confidence: f32) -> ExtractionResult {
        ExtractionResult {
            description: "some request".to_string(),
            is_in_domain,
            confidence,
        }
    }

    #[test]
    fn test_fails_below_threshold_even_when_in_domain() {
        assert!(!passes(&extraction(true, 0.69), DEFAULT_THRESHOLD));
        assert!(!passes(&extraction(true, 0.0), DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_fails_out_of_domain_regardless_of_confidence() {
        assert!(!passes(&extraction(false, 1.0), DEFAULT_THRESHOLD));
        assert!(!passes(&extraction(false, 0.7), DEFAULT_THRESHOLD));
        assert!(!passes(&extraction(false, 0.1), DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_passes_at_exact_threshold() {
        // Inclusive bound: exactly 0.7 passes.
        assert!(passes(&extraction(true, 0.7), DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_passes_above_threshold() {
        assert!(passes(&extraction(true, 0.92), DEFAULT_THRESHOLD));
        assert!(passes(&extraction(true, 1.0), DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_custom_threshold_is_respected() {
        assert!(passes(&extraction(true, 0.5), 0.5));
        assert!(!passes(&extraction(true, 0.49), 0.5));
        assert!(passes(&extraction(true, 0.1), 0.0));
    }
}
