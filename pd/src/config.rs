//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main pantryd configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model provider configuration
    pub llm: LlmConfig,

    /// Orchestrator limits
    pub agent: AgentConfig,

    /// Safety policy guardrails
    pub policy: PolicyConfig,

    /// Autonomous cycle configuration
    pub cycle: CycleConfig,

    /// Vendor/ordering client configuration
    pub vendor: VendorConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(eyre::eyre!("agent.max-iterations must be at least 1"));
        }
        if self.policy.budget_ceiling_usd <= 0.0 {
            return Err(eyre::eyre!("policy.budget-ceiling-usd must be positive"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(".pantryd.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("pantryd").join("pantryd.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "anthropic" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .context(format!("API key environment variable {} not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Orchestrator limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum model round-trips per turn
    #[serde(rename = "max-iterations")]
    pub max_iterations: u32,

    /// Retries for transient collaborator failures before folding them in
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Per-handler timeout in milliseconds
    #[serde(rename = "tool-timeout-ms")]
    pub tool_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 4,
            max_retries: 2,
            tool_timeout_ms: 30_000,
        }
    }
}

/// Safety policy guardrails
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Tool names that are denied unconditionally
    #[serde(rename = "guardrailed-tools")]
    pub guardrailed_tools: Vec<String>,

    /// Hard ceiling for any single spend and for the budget preference
    #[serde(rename = "budget-ceiling-usd")]
    pub budget_ceiling_usd: f64,

    /// Preference key the budget ceiling applies to
    #[serde(rename = "budget-preference-key")]
    pub budget_preference_key: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            guardrailed_tools: vec!["delete_all_inventory".to_string()],
            budget_ceiling_usd: 200.0,
            budget_preference_key: "monthly_budget_usd".to_string(),
        }
    }
}

/// Autonomous cycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Seconds between scheduled cycles
    #[serde(rename = "interval-secs")]
    pub interval_secs: u64,

    /// Model round-trip cap for the cycle's decision turn
    #[serde(rename = "max-iterations")]
    pub max_iterations: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            max_iterations: 3,
        }
    }
}

/// Vendor/ordering client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    /// Vendor API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the vendor API key, if any
    #[serde(rename = "api-key-env")]
    pub api_key_env: Option<String>,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://vendor.invalid".to_string(),
            api_key_env: None,
            timeout_ms: 30_000,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the pantry store
    #[serde(rename = "store-dir")]
    pub store_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pantryd")
            .join("store");
        Self {
            store_dir: dir.to_string_lossy().to_string(),
        }
    }
}
