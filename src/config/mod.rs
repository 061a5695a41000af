pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://export.arxiv.org/api/query";
pub const DEFAULT_AUTHOR: &str = "Ruben Lier";
pub const DEFAULT_OUTPUT_PATH: &str = "paper.html";
pub const DEFAULT_MAX_RESULTS: usize = 100;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_DELAY_SECONDS: u64 = 2;
pub const DEFAULT_USER_AGENT: &str =
    concat!("paper-updater/", env!("CARGO_PKG_VERSION"), " (arXiv author listing)");

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "paper-updater")]
#[command(about = "Fetch an author's arXiv papers and refresh a static HTML fragment")]
pub struct CliConfig {
    /// Author name searched with arXiv's `au:` filter
    #[arg(long, env = "PAPER_AUTHOR", default_value = DEFAULT_AUTHOR)]
    pub author: String,

    /// HTML file to refresh
    #[arg(long, env = "PAPER_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, env = "PAPER_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    /// Extra attempts after a 429/5xx response
    #[arg(long, default_value_t = 0)]
    pub retry_attempts: u32,

    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_SECONDS)]
    pub retry_delay_seconds: u64,

    /// Author name rendered in bold; defaults to --author
    #[arg(long)]
    pub highlight_author: Option<String>,

    /// Render an empty list instead of failing when arXiv returns no papers
    #[arg(long)]
    pub allow_empty: bool,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Load settings from a TOML file instead of the flags above
    #[arg(short, long)]
    pub config: Option<String>,

    /// Fetch and render, print the fragment, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON run report on stdout
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn max_results(&self) -> usize {
        self.max_results
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay_seconds(&self) -> u64 {
        self.retry_delay_seconds
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn highlight_author(&self) -> Option<&str> {
        Some(self.highlight_author.as_deref().unwrap_or(&self.author))
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_non_empty_string("author", &self.author)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range("max_results", self.max_results, 1, 2000)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        validation::validate_range("retry_attempts", self.retry_attempts, 0, 10)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_need_no_arguments() {
        let config = CliConfig::try_parse_from(["paper-updater"]).unwrap();

        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.output_path(), DEFAULT_OUTPUT_PATH);
        assert_eq!(config.retry_attempts(), 0);
        assert!(!config.allow_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_highlight_author_defaults_to_author() {
        let config =
            CliConfig::try_parse_from(["paper-updater", "--author", "Jane Doe"]).unwrap();
        assert_eq!(config.highlight_author(), Some("Jane Doe"));

        let config = CliConfig::try_parse_from([
            "paper-updater",
            "--author",
            "Jane Doe",
            "--highlight-author",
            "J. Doe",
        ])
        .unwrap();
        assert_eq!(config.highlight_author(), Some("J. Doe"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config =
            CliConfig::try_parse_from(["paper-updater", "--max-results", "0"]).unwrap();
        assert!(config.validate().is_err());

        let config =
            CliConfig::try_parse_from(["paper-updater", "--endpoint", "not a url"]).unwrap();
        assert!(config.validate().is_err());
    }
}
