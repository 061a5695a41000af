use anyhow::Result;
use httpmock::prelude::*;
use paper_updater::{
    ArxivPipeline, LocalStorage, TomlConfig, UpdateEngine, UpdateError, UpdateOutcome,
};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn entry(id: &str, title: &str, published: &str) -> String {
    format!(
        r#"  <entry>
    <id>http://arxiv.org/abs/{id}v1</id>
    <updated>{published}</updated>
    <published>{published}</published>
    <title>{title}</title>
    <summary>Abstract of {title}.</summary>
    <author><name>Ruben Lier</name></author>
    <author><name>Jane Doe</name></author>
    <link href="http://arxiv.org/abs/{id}v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/{id}v1" rel="related" type="application/pdf"/>
  </entry>
"#
    )
}

fn feed(entries: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">
  <link href="http://arxiv.org/api/query" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: au:"Ruben Lier"</title>
  <id>http://arxiv.org/api/test</id>
  <updated>2025-01-02T00:00:00-05:00</updated>
  <opensearch:totalResults>{}</opensearch:totalResults>
{}</feed>
"#,
        entries.len(),
        entries.concat()
    )
}

fn config(endpoint: &str, extra_load: &str) -> TomlConfig {
    TomlConfig::from_toml_str(&format!(
        r#"
[source]
endpoint = "{endpoint}"
author = "Ruben Lier"
timeout_seconds = 5

[load]
output_path = "paper.html"
{extra_load}
"#
    ))
    .unwrap()
}

fn engine(
    dir: &Path,
    config: TomlConfig,
) -> UpdateEngine<ArxivPipeline<LocalStorage, TomlConfig>> {
    let pipeline = ArxivPipeline::new(LocalStorage::new(dir), config).unwrap();
    UpdateEngine::new(pipeline)
}

#[tokio::test]
async fn test_newest_publication_listed_first() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    // Deliberately oldest first; the fragment must not depend on feed order.
    let body = feed(&[
        entry("2401.00001", "Paper One", "2024-01-01T00:00:00Z"),
        entry("2501.00001", "Paper Two", "2025-01-01T00:00:00Z"),
    ]);
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(200)
            .header("Content-Type", "application/atom+xml")
            .body(body);
    });

    let outcome = engine(temp_dir.path(), config(&server.url("/api/query"), ""))
        .run()
        .await?;

    api_mock.assert();
    assert!(outcome.is_changed());

    let html = std::fs::read_to_string(temp_dir.path().join("paper.html"))?;
    let p2 = html.find("Paper Two").unwrap();
    let p1 = html.find("Paper One").unwrap();
    assert!(p2 < p1, "newer paper must come first:\n{}", html);
    assert!(html.contains("<strong>Ruben Lier</strong>, Jane Doe"));
    assert!(html.contains("1 January 2025"));
    Ok(())
}

#[tokio::test]
async fn test_second_run_is_unchanged_and_byte_identical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let body = feed(&[entry("2401.00001", "Only Paper", "2024-01-01T00:00:00Z")]);
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(200).body(body);
    });

    let first = engine(temp_dir.path(), config(&server.url("/api/query"), ""))
        .run()
        .await?;
    let output = temp_dir.path().join("paper.html");
    let after_first = std::fs::read(&output)?;
    let modified_first = std::fs::metadata(&output)?.modified()?;

    let second = engine(temp_dir.path(), config(&server.url("/api/query"), ""))
        .run()
        .await?;

    api_mock.assert_hits(2);
    assert!(first.is_changed());
    assert!(matches!(
        second,
        UpdateOutcome::Unchanged { publications: 1, .. }
    ));
    assert_eq!(std::fs::read(&output)?, after_first);
    assert_eq!(std::fs::metadata(&output)?.modified()?, modified_first);
    Ok(())
}

#[tokio::test]
async fn test_changed_upstream_rewrites_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("paper.html");
    std::fs::write(&output, "<p>stale list</p>\n")?;

    let server = MockServer::start();
    let body = feed(&[entry("2501.00001", "Fresh Paper", "2025-01-01T00:00:00Z")]);
    server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(200).body(body);
    });

    let outcome = engine(temp_dir.path(), config(&server.url("/api/query"), ""))
        .run()
        .await?;

    assert!(outcome.is_changed());
    let html = std::fs::read_to_string(&output)?;
    assert!(html.contains("Fresh Paper"));
    assert!(!html.contains("stale list"));
    assert!(!temp_dir.path().join(".paper.html.tmp").exists());
    Ok(())
}

#[tokio::test]
async fn test_service_error_leaves_output_untouched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("paper.html");
    std::fs::write(&output, "<p>good content</p>\n")?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(503).body("Service Unavailable");
    });

    let err = engine(temp_dir.path(), config(&server.url("/api/query"), ""))
        .run()
        .await
        .unwrap_err();

    api_mock.assert();
    assert!(err.is_fetch_error());
    assert_ne!(err.exit_code(), 0);
    assert_eq!(std::fs::read_to_string(&output)?, "<p>good content</p>\n");
    Ok(())
}

#[tokio::test]
async fn test_empty_result_is_fetch_error_and_file_untouched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("paper.html");
    std::fs::write(&output, "<p>good content</p>\n")?;

    let server = MockServer::start();
    let body = feed(&[]);
    server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(200).body(body);
    });

    let err = engine(temp_dir.path(), config(&server.url("/api/query"), ""))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, UpdateError::EmptyFeedError { .. }));
    assert!(err.is_fetch_error());
    assert_eq!(std::fs::read_to_string(&output)?, "<p>good content</p>\n");
    Ok(())
}

#[tokio::test]
async fn test_empty_result_rendered_when_allowed() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let body = feed(&[]);
    server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(200).body(body);
    });

    let outcome = engine(
        temp_dir.path(),
        config(&server.url("/api/query"), "allow_empty = true"),
    )
    .run()
    .await?;

    assert!(matches!(outcome, UpdateOutcome::Changed { publications: 0, .. }));
    let html = std::fs::read_to_string(temp_dir.path().join("paper.html"))?;
    assert!(html.contains("No papers listed yet"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_fetch_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(200).body("<html><body>maintenance</body></html>");
    });

    let err = engine(temp_dir.path(), config(&server.url("/api/query"), ""))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, UpdateError::FeedParseError { .. }));
    assert!(!temp_dir.path().join("paper.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_retries_transient_status_when_configured() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(429);
    });

    let config = TomlConfig::from_toml_str(&format!(
        r#"
[source]
endpoint = "{}"
author = "Ruben Lier"
retry_attempts = 2
retry_delay_seconds = 0

[load]
output_path = "paper.html"
"#,
        server.url("/api/query")
    ))?;

    let err = engine(temp_dir.path(), config).run().await.unwrap_err();

    api_mock.assert_hits(3);
    assert!(matches!(err, UpdateError::HttpStatusError { status: 429, .. }));
    Ok(())
}

#[tokio::test]
async fn test_dry_run_renders_without_writing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let body = feed(&[entry("2401.00001", "Preview Paper", "2024-01-01T00:00:00Z")]);
    server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(200).body(body);
    });

    let fragment = engine(temp_dir.path(), config(&server.url("/api/query"), ""))
        .render_only()
        .await?;

    assert!(fragment.html.contains("Preview Paper"));
    assert_eq!(fragment.publication_count, 1);
    assert!(!temp_dir.path().join("paper.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_slow_response_times_out_and_leaves_output_untouched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("paper.html");
    std::fs::write(&output, "<p>good content</p>\n")?;

    let server = MockServer::start();
    let body = feed(&[entry("2501.00001", "Late Paper", "2025-01-01T00:00:00Z")]);
    server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(200)
            .body(body)
            .delay(Duration::from_secs(3));
    });

    let config = TomlConfig::from_toml_str(&format!(
        r#"
[source]
endpoint = "{}"
author = "Ruben Lier"
timeout_seconds = 1

[load]
output_path = "paper.html"
"#,
        server.url("/api/query")
    ))?;

    let err = engine(temp_dir.path(), config).run().await.unwrap_err();

    assert!(matches!(err, UpdateError::TimeoutError { seconds: 1 }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(std::fs::read_to_string(&output)?, "<p>good content</p>\n");
    Ok(())
}

#[tokio::test]
async fn test_not_found_is_not_retried() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/query");
        then.status(404);
    });

    let config = TomlConfig::from_toml_str(&format!(
        r#"
[source]
endpoint = "{}"
author = "Ruben Lier"
retry_attempts = 3
retry_delay_seconds = 0

[load]
output_path = "paper.html"
"#,
        server.url("/api/query")
    ))?;

    let err = engine(temp_dir.path(), config).run().await.unwrap_err();

    api_mock.assert_hits(1);
    assert!(matches!(err, UpdateError::HttpStatusError { status: 404, .. }));
    assert!(!temp_dir.path().join("paper.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_unavailable_then_ok_succeeds_on_retry() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;
    let mut unavailable = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/query");
            then.status(503);
        })
        .await;

    let config = TomlConfig::from_toml_str(&format!(
        r#"
[source]
endpoint = "{}"
author = "Ruben Lier"
retry_attempts = 2
retry_delay_seconds = 1

[load]
output_path = "paper.html"
"#,
        server.url("/api/query")
    ))?;
    let updater = engine(temp_dir.path(), config);

    let body = feed(&[entry("2501.00001", "Recovered Paper", "2025-01-01T00:00:00Z")]);
    // Swap the 503 for a 200 while the client sleeps before its retry.
    let recover = async {
        while unavailable.hits_async().await < 1 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        unavailable.delete_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/query");
                then.status(200).body(body);
            })
            .await
    };

    let (outcome, ok_mock) = tokio::join!(updater.run(), recover);
    let outcome = outcome?;

    ok_mock.assert_hits_async(1).await;
    assert!(matches!(outcome, UpdateOutcome::Changed { publications: 1, .. }));
    let html = std::fs::read_to_string(temp_dir.path().join("paper.html"))?;
    assert!(html.contains("Recovered Paper"));
    Ok(())
}
