use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// One paper as listed by the bibliographic source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub title: String,
    pub authors: Vec<String>,
    /// arXiv id without version suffix, e.g. `2401.12345`. Unique per run.
    pub identifier: String,
    pub link: String,
    pub published: DateTime<Utc>,
}

impl Publication {
    pub fn year(&self) -> i32 {
        self.published.year()
    }

    /// `19 August 2025` style, no leading zero on the day.
    pub fn pretty_date(&self) -> String {
        self.published.format("%-d %B %Y").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    pub html: String,
    pub publication_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Changed {
        path: PathBuf,
        bytes: usize,
        publications: usize,
    },
    Unchanged {
        path: PathBuf,
        publications: usize,
    },
}

impl UpdateOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, UpdateOutcome::Changed { .. })
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            UpdateOutcome::Changed { path, .. } | UpdateOutcome::Unchanged { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Changed,
    Unchanged,
    DryRun,
    Failed,
}

/// Machine-readable summary printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publications: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn from_outcome(outcome: &UpdateOutcome) -> Self {
        match outcome {
            UpdateOutcome::Changed {
                path,
                bytes,
                publications,
            } => Self {
                status: RunStatus::Changed,
                path: Some(path.display().to_string()),
                publications: Some(*publications),
                bytes: Some(*bytes),
                error: None,
            },
            UpdateOutcome::Unchanged { path, publications } => Self {
                status: RunStatus::Unchanged,
                path: Some(path.display().to_string()),
                publications: Some(*publications),
                bytes: None,
                error: None,
            },
        }
    }

    pub fn dry_run(fragment: &RenderedFragment) -> Self {
        Self {
            status: RunStatus::DryRun,
            path: None,
            publications: Some(fragment.publication_count),
            bytes: Some(fragment.html.len()),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed,
            path: None,
            publications: None,
            bytes: None,
            error: Some(message.into()),
        }
    }
}
