//! Integration tests for the crawler
//!
//! These tests use wiremock to serve search and listing pages and run the
//! full crawl cycle end-to-end, from a configuration file to stored records.

use listing_ripple::config::{load_config_with_hash, SearchOverrides};
use listing_ripple::crawler::run_crawl;
use listing_ripple::output::OutputRecord;
use listing_ripple::storage::{RunStatus, SqliteStorage, Storage};
use listing_ripple::ConfigError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a configuration file pointing the crawler at the mock server
fn write_config(dir: &TempDir, base_url: &str, max_results: u32, extra_output: &str) -> PathBuf {
    let config_path = dir.path().join("config.toml");
    let db_path = dir.path().join("listings.db");
    let content = format!(
        r#"
[search]
search-query = "Pizza"
location = "San Francisco, CA"

[crawler]
max-results = {max_results}
max-retries = 2
delay-between-requests = 0
settle-jitter-min-ms = 0
settle-jitter-max-ms = 0
retry-backoff-ms = 0
network-idle-timeout-secs = 1
renderer = "http"

[site]
base-url = "{base_url}"

[output]
database-path = "{db}"
{extra_output}
"#,
        db = db_path.display(),
    );
    std::fs::write(&config_path, content).unwrap();
    config_path
}

fn search_page(slugs: &[&str], next: Option<&str>) -> String {
    let cards: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<div data-testid="serp-ia-card">
                     <img alt="{slug} title" src="/img/{slug}.jpg">
                     <a href="/biz/{slug}?osq=Pizza">{slug}</a>
                     <div aria-label="4 star rating" role="img"></div>
                   </div>"#
            )
        })
        .collect();
    let next = next
        .map(|href| format!(r#"<a aria-label="Next Page" href="{}">Next</a>"#, href))
        .unwrap_or_default();
    format!("<html><body>{}{}</body></html>", cards, next)
}

fn listing_page(name: &str) -> String {
    format!(
        r#"<html><body>
             <h1>{name}</h1>
             <div role="img" aria-label="4.5 star rating"></div>
             <a href="/biz/{name}/reviews">1,204 reviews</a>
             <a href="/search?cflt=pizza">Pizza</a>
             <p>542 Green St, San Francisco, CA 94133</p>
             <p>(415) 982-9738</p>
             <ul>
               <li class="review__1"><a href="/user_details?userid=1">Sam K.</a><span>2/3/2024</span>
                 <p class="comment__1">Thin crust, great sauce, and the line moved quickly.</p></li>
             </ul>
           </body></html>"#
    )
}

async fn mount_search(server: &MockServer, start: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("start", start))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, slug: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/biz/{}", slug)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&format!("{} Pizzeria", slug)))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn open_storage(config_path: &Path) -> SqliteStorage {
    let db_path = config_path.with_file_name("listings.db");
    SqliteStorage::new(&db_path).expect("Failed to open DB")
}

#[tokio::test]
async fn test_full_crawl_with_pagination_cap_and_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_search(
        &server,
        "0",
        search_page(&["alpha", "bravo", "charlie"], Some("/search?find_desc=Pizza&start=10")),
    )
    .await;
    mount_search(
        &server,
        "10",
        search_page(&["charlie", "delta", "echo"], Some("/search?find_desc=Pizza&start=20")),
    )
    .await;

    mount_listing(&server, "alpha", 1).await;
    mount_listing(&server, "bravo", 1).await;
    mount_listing(&server, "delta", 1).await;
    // Over the cap: never requested
    mount_listing(&server, "echo", 0).await;

    Mock::given(method("GET"))
        .and(path("/biz/charlie"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let jsonl_path = dir.path().join("listings.jsonl");
    let config_path = write_config(
        &dir,
        &server.uri(),
        4,
        &format!(r#"jsonl-path = "{}""#, jsonl_path.display()),
    );

    let (config, hash) = load_config_with_hash(&config_path, &SearchOverrides::default())
        .expect("Failed to load config");
    let report = run_crawl(config, &hash, false).await.expect("Crawl failed");

    assert_eq!(report.businesses_enqueued, 4);
    assert_eq!(report.unique_seen, 4);
    assert_eq!(report.records_emitted, 3);
    assert_eq!(report.failed_requests, 1);

    let storage = open_storage(&config_path);
    assert_eq!(storage.count_businesses().unwrap(), 3);

    let mut urls = storage.load_business_urls().unwrap();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{}/biz/alpha", server.uri()),
            format!("{}/biz/bravo", server.uri()),
            format!("{}/biz/delta", server.uri()),
        ]
    );

    let run = storage.get_latest_run().unwrap().expect("run row missing");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, hash);
    assert_eq!(run.counts.records_emitted, 3);
    assert_eq!(run.counts.businesses_enqueued, 4);

    let failures = storage.get_failed_requests(run.id).unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].url, format!("{}/biz/charlie", server.uri()));
    assert_eq!(failures[0].attempts, 2);

    let lines: Vec<OutputRecord> = std::fs::read_to_string(&jsonl_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    for record in &lines {
        assert!(record.detail.business_name.ends_with("Pizzeria"));
        assert_eq!(record.detail.rating, Some(4.5));
        assert_eq!(record.detail.review_count, 1204);
        assert_eq!(record.reviews.as_ref().map(Vec::len), Some(1));
    }
}

#[tokio::test]
async fn test_second_run_skips_stored_businesses() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_search(&server, "0", search_page(&["alpha", "bravo"], None)).await;
    // Only the first run may fetch these
    mount_listing(&server, "alpha", 1).await;
    mount_listing(&server, "bravo", 1).await;

    let config_path = write_config(&dir, &server.uri(), 10, "");

    let (config, hash) = load_config_with_hash(&config_path, &SearchOverrides::default()).unwrap();
    let first = run_crawl(config.clone(), &hash, false).await.unwrap();
    assert_eq!(first.records_emitted, 2);

    let second = run_crawl(config, &hash, false).await.unwrap();
    assert_eq!(second.businesses_enqueued, 0);
    assert_eq!(second.records_emitted, 0);
    assert_eq!(second.unique_seen, 0);
    assert_eq!(second.carried_over, 2);

    let storage = open_storage(&config_path);
    assert_eq!(storage.count_businesses().unwrap(), 2);
}

#[tokio::test]
async fn test_fresh_run_scrapes_again() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_search(&server, "0", search_page(&["alpha"], None)).await;
    mount_listing(&server, "alpha", 2).await;

    let config_path = write_config(&dir, &server.uri(), 10, "");
    let (config, hash) = load_config_with_hash(&config_path, &SearchOverrides::default()).unwrap();

    run_crawl(config.clone(), &hash, false).await.unwrap();
    let report = run_crawl(config, &hash, true).await.unwrap();
    assert_eq!(report.records_emitted, 1);

    // Records are append-only: both runs' rows remain
    let storage = open_storage(&config_path);
    assert_eq!(storage.count_businesses().unwrap(), 2);
    assert_eq!(storage.count_unique_businesses().unwrap(), 1);
}

#[tokio::test]
async fn test_missing_search_input_fails_before_network() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "[site]\nbase-url = \"{}\"\n\n[output]\ndatabase-path = \"{}\"\n",
            server.uri(),
            dir.path().join("listings.db").display()
        ),
    )
    .unwrap();

    let overrides = SearchOverrides {
        search_query: Some("Pizza".to_string()),
        location: None,
    };
    let err = load_config_with_hash(&config_path, &overrides).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("location")));
}
