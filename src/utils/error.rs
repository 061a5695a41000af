use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API request timed out after {seconds}s")]
    TimeoutError { seconds: u64 },

    #[error("API returned HTTP {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Malformed feed: {message}")]
    FeedParseError { message: String },

    #[error("arXiv reported an error: {message}")]
    ServiceError { message: String },

    #[error("No publications returned for author '{author}'")]
    EmptyFeedError { author: String },

    #[error("Failed to write {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },
}

/// Which side of the run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Fetch,
    Write,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Transient upstream trouble; the next scheduled run may succeed.
    Medium,
    /// Needs a config fix before any run can succeed.
    High,
    /// Local filesystem trouble.
    Critical,
}

impl UpdateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            UpdateError::ApiError(_)
            | UpdateError::TimeoutError { .. }
            | UpdateError::HttpStatusError { .. }
            | UpdateError::FeedParseError { .. }
            | UpdateError::ServiceError { .. }
            | UpdateError::EmptyFeedError { .. } => ErrorCategory::Fetch,
            UpdateError::WriteError { .. } | UpdateError::IoError(_) => ErrorCategory::Write,
            UpdateError::ConfigError { .. }
            | UpdateError::ConfigValidationError { .. }
            | UpdateError::InvalidConfigValueError { .. }
            | UpdateError::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Fetch => ErrorSeverity::Medium,
            ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Write => ErrorSeverity::Critical,
        }
    }

    /// Process exit status for a failed run. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn is_fetch_error(&self) -> bool {
        self.category() == ErrorCategory::Fetch
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            UpdateError::ApiError(_) | UpdateError::TimeoutError { .. } => {
                "Check network connectivity to the arXiv API or raise --timeout-seconds".to_string()
            }
            UpdateError::HttpStatusError { status, .. } if *status == 429 || *status >= 500 => {
                "arXiv is throttling or unavailable; the next scheduled run should pick it up"
                    .to_string()
            }
            UpdateError::HttpStatusError { .. } => {
                "Verify the endpoint URL and the author query".to_string()
            }
            UpdateError::FeedParseError { .. } | UpdateError::ServiceError { .. } => {
                "Inspect the raw API response; the query may be malformed".to_string()
            }
            UpdateError::EmptyFeedError { .. } => {
                "Check the author name, or pass --allow-empty to publish an empty list".to_string()
            }
            UpdateError::WriteError { path, .. } => {
                format!("Check permissions and free space for {}", path.display())
            }
            UpdateError::IoError(_) => "Check that the output file is readable".to_string(),
            UpdateError::ConfigError { .. }
            | UpdateError::ConfigValidationError { .. }
            | UpdateError::InvalidConfigValueError { .. }
            | UpdateError::MissingConfigError { .. } => {
                "Fix the configuration file or command-line flags and rerun".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Fetch => format!("Could not fetch publications: {}", self),
            ErrorCategory::Write => format!("Could not update the output file: {}", self),
            ErrorCategory::Config => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, UpdateError>;
