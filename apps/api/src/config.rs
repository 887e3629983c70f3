use anyhow::{ensure, Context, Result};

use crate::pipeline::GenerationMode;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    /// Which generation stage the pipeline runs. A deployment choice,
    /// never detected at runtime.
    pub generation_mode: GenerationMode,
    /// Confidence the gate requires before generation runs. Inclusive bound.
    pub gate_threshold: f32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let gate_threshold = std::env::var("GATE_THRESHOLD")
            .unwrap_or_else(|_| "0.7".to_string())
            .parse::<f32>()
            .context("GATE_THRESHOLD must be a number")?;
        ensure!(
            (0.0..=1.0).contains(&gate_threshold),
            "GATE_THRESHOLD must be between 0 and 1, got {gate_threshold}"
        );

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            generation_mode: match std::env::var("GENERATION_MODE") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))
                    .context("GENERATION_MODE is invalid")?,
                Err(_) => GenerationMode::RoleDescription,
            },
            gate_threshold,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
