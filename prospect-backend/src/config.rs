use std::env;
use std::time::Duration;

use crate::agent::AgentConfig;

#[derive(Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub port: u16,
    pub database_url: String,
    pub step_budget: u32,
    pub step_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set"),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "./.db/leads.db".to_string()),
            step_budget: env::var("AGENT_STEP_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            step_delay_ms: env::var("AGENT_STEP_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
        }
    }

    /// Loop parameters derived from this config.
    pub fn agent(&self) -> AgentConfig {
        AgentConfig {
            step_budget: self.step_budget,
            step_delay: Duration::from_millis(self.step_delay_ms),
        }
    }
}
