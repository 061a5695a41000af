use crate::config::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_RESULTS, DEFAULT_RETRY_DELAY_SECONDS, DEFAULT_TIMEOUT_SECONDS,
    DEFAULT_USER_AGENT,
};
use crate::core::ConfigProvider;
use crate::utils::error::{Result, UpdateError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub render: RenderConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    pub author: Option<String>,
    pub max_results: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    pub highlight_author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub allow_empty: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| UpdateError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| UpdateError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| UpdateError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.endpoint", self.endpoint())?;

        let author = validation::validate_required_field("source.author", &self.source.author)?;
        validation::validate_non_empty_string("source.author", author)?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_range("source.max_results", self.max_results(), 1, 2000)?;
        validation::validate_range("source.timeout_seconds", self.timeout_seconds(), 1, 600)?;
        validation::validate_range("source.retry_attempts", self.retry_attempts(), 0, 10)?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn endpoint(&self) -> &str {
        self.source.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn author(&self) -> &str {
        self.source.author.as_deref().unwrap_or_default()
    }

    fn max_results(&self) -> usize {
        self.source.max_results.unwrap_or(DEFAULT_MAX_RESULTS)
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts.unwrap_or(0)
    }

    fn retry_delay_seconds(&self) -> u64 {
        self.source
            .retry_delay_seconds
            .unwrap_or(DEFAULT_RETRY_DELAY_SECONDS)
    }

    fn user_agent(&self) -> &str {
        self.source.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn highlight_author(&self) -> Option<&str> {
        self.render
            .highlight_author
            .as_deref()
            .or(self.source.author.as_deref())
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn allow_empty(&self) -> bool {
        self.load.allow_empty.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
