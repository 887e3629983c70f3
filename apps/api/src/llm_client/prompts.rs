// Cross-cutting prompt fragments. Each pipeline stage defines its own role
// framing in pipeline::prompts; the schema and output rules are rendered
// here so every stage enforces them identically.

/// Output rules appended to every rendered schema.
pub const JSON_ONLY_RULES: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
