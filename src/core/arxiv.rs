use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::core::ConfigProvider;
use crate::domain::model::Publication;
use crate::utils::error::{Result, UpdateError};

const MAX_BACKOFF_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    // Every Atom feed carries one; anything without it is not a feed.
    #[allow(dead_code)]
    id: String,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    updated: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

pub struct ArxivClient {
    client: Client,
    endpoint: String,
    author: String,
    max_results: usize,
    timeout_seconds: u64,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl ArxivClient {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint().to_string(),
            author: config.author().to_string(),
            max_results: config.max_results(),
            timeout_seconds: config.timeout_seconds(),
            retry_attempts: config.retry_attempts(),
            retry_delay: Duration::from_secs(config.retry_delay_seconds()),
        })
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn query_url(&self) -> Result<Url> {
        let search_query = format!("au:\"{}\"", self.author);
        let max_results = self.max_results.to_string();

        Url::parse_with_params(
            &self.endpoint,
            &[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ],
        )
        .map_err(|e| UpdateError::InvalidConfigValueError {
            field: "endpoint".to_string(),
            value: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }

    pub async fn fetch_publications(&self) -> Result<Vec<Publication>> {
        let url = self.query_url()?;
        let xml = self.fetch_with_retry(&url).await?;
        parse_feed(&xml)
    }

    async fn fetch_with_retry(&self, url: &Url) -> Result<String> {
        let mut attempt = 0;
        loop {
            tracing::debug!("GET {} (attempt {})", url, attempt + 1);
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| self.request_error(e))?;

            let status = response.status();
            tracing::debug!("API response status: {}", status);

            if status.is_success() {
                return response.text().await.map_err(|e| self.request_error(e));
            }

            if is_retryable(status) && attempt < self.retry_attempts {
                let delay = retry_delay(self.retry_delay, attempt);
                tracing::warn!(
                    "arXiv answered HTTP {}, retrying in {:?} ({}/{})",
                    status.as_u16(),
                    delay,
                    attempt + 1,
                    self.retry_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(UpdateError::HttpStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
    }

    fn request_error(&self, e: reqwest::Error) -> UpdateError {
        if e.is_timeout() {
            UpdateError::TimeoutError {
                seconds: self.timeout_seconds,
            }
        } else {
            UpdateError::ApiError(e)
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.min(16);
    let secs = base.as_secs().saturating_mul(factor).min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

/// Backoff plus up to one second of jitter.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(0..1000);
    backoff(base, attempt) + Duration::from_millis(jitter_ms)
}

/// Parses an arXiv Atom response into publications, in feed order.
pub fn parse_feed(xml: &str) -> Result<Vec<Publication>> {
    if !xml.contains("<feed") {
        return Err(UpdateError::FeedParseError {
            message: "response is not an Atom feed".to_string(),
        });
    }

    let feed: AtomFeed = quick_xml::de::from_str(xml).map_err(|e| UpdateError::FeedParseError {
        message: format!("failed to parse arXiv XML: {}", e),
    })?;

    let mut seen = HashSet::new();
    let mut publications = Vec::with_capacity(feed.entries.len());

    for entry in feed.entries {
        if entry.id.contains("/api/errors") {
            let message = collapse_whitespace(&entry.summary);
            return Err(UpdateError::ServiceError {
                message: if message.is_empty() {
                    collapse_whitespace(&entry.title)
                } else {
                    message
                },
            });
        }

        let Some(publication) = entry_to_publication(entry) else {
            continue;
        };

        if seen.insert(publication.identifier.clone()) {
            publications.push(publication);
        } else {
            tracing::debug!("Skipping duplicate entry {}", publication.identifier);
        }
    }

    Ok(publications)
}

fn entry_to_publication(entry: AtomEntry) -> Option<Publication> {
    let title = collapse_whitespace(&entry.title);

    let link = entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("alternate"))
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .unwrap_or_else(|| entry.id.trim().to_string());

    if title.is_empty() || link.is_empty() {
        tracing::warn!("Skipping entry without title or link: {:?}", entry.id);
        return None;
    }

    let published = entry
        .published
        .as_deref()
        .and_then(parse_arxiv_date)
        .or_else(|| entry.updated.as_deref().and_then(parse_arxiv_date));
    let Some(published) = published else {
        tracing::warn!("Skipping entry without a usable date: {}", entry.id);
        return None;
    };

    let authors = entry
        .authors
        .into_iter()
        .map(|a| a.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let identifier = arxiv_identifier(if entry.id.trim().is_empty() {
        &link
    } else {
        &entry.id
    });

    Some(Publication {
        title,
        authors,
        identifier,
        link,
        published,
    })
}

/// `http://arxiv.org/abs/2401.12345v2` -> `2401.12345`, `.../abs/hep-th/0601001v1` -> `hep-th/0601001`.
pub fn arxiv_identifier(id: &str) -> String {
    let id = id.trim();
    let raw = match id.split_once("/abs/") {
        Some((_, rest)) => rest,
        None => id.rsplit('/').next().unwrap_or(id),
    };
    strip_version(raw.trim_end_matches('/')).to_string()
}

fn strip_version(id: &str) -> &str {
    if let Some(pos) = id.rfind('v') {
        let suffix = &id[pos + 1..];
        if pos > 0 && !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            return &id[..pos];
        }
    }
    id
}

fn parse_arxiv_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();
    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
        })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
