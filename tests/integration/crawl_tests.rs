//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use quatermain::config::{resolve_config, Config, ConfigOverrides};
use quatermain::output::write_sitemap;
use quatermain::{crawl, CrawlError, PageRegistry};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration suited to a local mock server
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.max_connections = 4;
    config.crawler.progress_interval = 0;
    config.crawler.request_timeout = 5;
    config.user_agent.name = "TestBot".to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content))
        .mount(server)
        .await;
}

/// Maps each recorded path to its status code
fn codes_by_path(registry: &PageRegistry, base_url: &str) -> BTreeMap<String, u16> {
    registry
        .all()
        .into_iter()
        .map(|record| {
            let path = record.link.trim_start_matches(base_url).to_string();
            (path, record.status_code())
        })
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/page1">Page 1</a>
           <a href="/page2">Page 2</a>
           <a href="https://elsewhere.example.org/">Elsewhere</a>
           <a href="/logo.png">Logo</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<a href="/page2">Page 2</a><a href="/missing">Missing</a>"#,
    )
    .await;
    mount_page(&mock_server, "/page2", r#"<a href="/">Home</a>"#).await;

    let registry = crawl(&create_test_config(), &base_url)
        .await
        .expect("crawl should start");

    let codes = codes_by_path(&registry, &base_url);
    let expected: BTreeMap<String, u16> = [
        ("/", 0),
        ("/page1", 0),
        ("/page2", 0),
        ("/missing", 404),
    ]
    .into_iter()
    .map(|(path, code)| (path.to_string(), code))
    .collect();
    assert_eq!(codes, expected);
}

#[tokio::test]
async fn test_pages_are_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/shared">Shared</a>"#,
    )
    .await;
    mount_page(&mock_server, "/a", r#"<a href="/shared">Shared</a>"#).await;
    mount_page(&mock_server, "/b", r#"<a href="/shared#section">Shared</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html("<p>shared</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let registry = crawl(&create_test_config(), &base_url).await.unwrap();

    assert_eq!(registry.len(), 4);
    assert_eq!(registry.counts(), (4, 0));
}

#[tokio::test]
async fn test_robots_txt_disallow() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /private").await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/private/report">Private</a><a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&mock_server, "/public", "<p>public</p>").await;
    Mock::given(method("GET"))
        .and(path("/private/report"))
        .respond_with(html("<p>private</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let registry = crawl(&create_test_config(), &base_url).await.unwrap();

    let codes = codes_by_path(&registry, &base_url);
    assert_eq!(codes.get("/private/report"), Some(&4));
    assert_eq!(codes.get("/public"), Some(&0));
}

#[tokio::test]
async fn test_x_robots_tag_blocks_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/tagged">Tagged</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/tagged"))
        .respond_with(
            html(r#"<a href="/behind">Behind</a>"#).insert_header("x-robots-tag", "noindex"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/behind"))
        .respond_with(html("<p>behind</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let registry = crawl(&create_test_config(), &base_url).await.unwrap();

    let codes = codes_by_path(&registry, &base_url);
    assert_eq!(codes.get("/tagged"), Some(&3));
    assert_eq!(codes.len(), 2);
}

#[tokio::test]
async fn test_unethical_crawl_ignores_robots() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", r#"<a href="/tagged">Tagged</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/tagged"))
        .respond_with(html("<p>tagged</p>").insert_header("x-robots-tag", "nofollow"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.ethical = false;
    let registry = crawl(&config, &base_url).await.unwrap();

    assert_eq!(registry.counts(), (2, 0));
}

#[tokio::test]
async fn test_missing_robots_txt_allows_everything() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/about">About</a>"#).await;
    mount_page(&mock_server, "/about", "<p>about</p>").await;

    let registry = crawl(&create_test_config(), &base_url).await.unwrap();

    assert_eq!(registry.counts(), (2, 0));
}

#[tokio::test]
async fn test_server_errors_are_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/broken">Broken</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let registry = crawl(&create_test_config(), &base_url).await.unwrap();

    let codes = codes_by_path(&registry, &base_url);
    assert_eq!(codes.get("/broken"), Some(&503));
}

#[tokio::test]
async fn test_timed_out_fetch_is_recorded_and_crawl_finishes() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/slow">Slow</a><a href="/ok">Ok</a>"#,
    )
    .await;
    mount_page(&mock_server, "/ok", "<p>ok</p>").await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_connections = 2;
    config.crawler.request_timeout = 1;
    let registry = tokio::time::timeout(Duration::from_secs(10), crawl(&config, &base_url))
        .await
        .expect("crawl did not finish after a timeout")
        .unwrap();

    let codes = codes_by_path(&registry, &base_url);
    let expected: BTreeMap<String, u16> = [("/", 0), ("/ok", 0), ("/slow", 1)]
        .into_iter()
        .map(|(path, code)| (path.to_string(), code))
        .collect();
    assert_eq!(codes, expected);
}

#[tokio::test]
async fn test_sitemap_written_after_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/about">About</a><a href="/gone">Gone</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><link rel="canonical" href="/about-us"></head></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let registry = crawl(&create_test_config(), &base_url).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let sitemap_path = dir.path().join("sitemap.xml");
    assert_eq!(write_sitemap(&registry, &sitemap_path).unwrap(), 2);

    let xml = std::fs::read_to_string(&sitemap_path).unwrap();
    assert!(xml.contains(&format!("<loc>{}/</loc>", base_url)));
    assert!(xml.contains(&format!("<loc>{}/about-us</loc>", base_url)));
    assert!(!xml.contains("/gone"));
}

#[tokio::test]
async fn test_invalid_seed_is_fatal() {
    let result = crawl(&create_test_config(), "ftp://example.com/").await;
    assert!(matches!(result, Err(CrawlError::InvalidSeed(_))));

    let result = crawl(&create_test_config(), "not a url").await;
    assert!(matches!(result, Err(CrawlError::InvalidSeed(_))));
}

#[test]
fn test_config_file_with_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[crawler]
max-connections = 8
request-interval = 0.25

[user-agent]
name = "FileBot"
"#
    )
    .unwrap();

    let overrides = ConfigOverrides {
        max_connections: Some(16),
        unethical: true,
        ..Default::default()
    };
    let config = resolve_config(Some(file.path()), &overrides).unwrap();

    assert_eq!(config.crawler.max_connections, 16);
    assert_eq!(config.crawler.request_interval, 0.25);
    assert!(!config.crawler.ethical);
    assert_eq!(config.user_agent.name, "FileBot");
    assert_eq!(config.output.sitemap_path, "sitemap.xml");
}

#[test]
fn test_config_rejects_single_connection() {
    let overrides = ConfigOverrides {
        max_connections: Some(1),
        ..Default::default()
    };
    assert!(resolve_config(None, &overrides).is_err());
}
