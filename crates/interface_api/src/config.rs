//! API configuration

use std::time::Duration;

use serde::Deserialize;

use domain_assistant::GroqConfig;
use domain_claims::WorkflowPolicy;
use infra_db::DatabaseConfig;

/// API configuration
///
/// Every field has a default, so any subset of `API_*` variables may be set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    pub db_min_connections: u32,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Seconds before an idle connection is closed; 0 keeps it open
    pub db_idle_timeout_secs: u64,
    /// Log level
    pub log_level: String,
    /// Prefix for generated claim numbers
    pub claim_number_prefix: String,
    /// Prefix for generated dispute numbers
    pub dispute_number_prefix: String,
    /// Refuse manager confirmation when the specialist approval is missing from the log
    pub strict_decision_log: bool,
    /// Groq API key; the chatbot stays disabled without one
    pub groq_api_key: Option<String>,
    pub groq_base_url: String,
    pub groq_model: String,
    pub llm_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/payroll".to_string(),
            db_min_connections: 2,
            db_max_connections: 10,
            db_acquire_timeout_secs: 30,
            db_idle_timeout_secs: 600,
            log_level: "info".to_string(),
            claim_number_prefix: "CLAIM-".to_string(),
            dispute_number_prefix: "DISP-".to_string(),
            strict_decision_log: false,
            groq_api_key: None,
            groq_base_url: domain_assistant::groq::DEFAULT_BASE_URL.to_string(),
            groq_model: domain_assistant::groq::DEFAULT_MODEL.to_string(),
            llm_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings for the PostgreSQL adapters
    pub fn database_config(&self) -> DatabaseConfig {
        let idle = (self.db_idle_timeout_secs > 0).then(|| Duration::from_secs(self.db_idle_timeout_secs));
        DatabaseConfig::new(self.database_url.clone())
            .with_pool_size(self.db_min_connections, self.db_max_connections)
            .with_acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
            .with_idle_timeout(idle)
    }

    pub fn claim_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy::for_claims()
            .with_prefix(self.claim_number_prefix.clone())
            .strict(self.strict_decision_log)
    }

    pub fn dispute_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy::for_disputes()
            .with_prefix(self.dispute_number_prefix.clone())
            .strict(self.strict_decision_log)
    }

    /// Client settings for the LLM provider, or `None` when no key is set
    pub fn groq_config(&self) -> Option<GroqConfig> {
        let key = self.groq_api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        let mut groq = GroqConfig::new(key);
        groq.base_url = self.groq_base_url.clone();
        groq.model = self.groq_model.clone();
        groq.timeout_secs = self.llm_timeout_secs;
        Some(groq)
    }
}
