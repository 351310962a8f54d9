//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use link_harvest::config::{Config, CrawlerConfig, InputConfig, OutputConfig, UserAgentConfig};
use link_harvest::crawler::{crawl, process_page, HttpSession};
use link_harvest::output::HEADER;
use link_harvest::SeedSet;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing results into `dir`
fn create_test_config(dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_pages_open: 4,
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
            contact_email: Some("test@example.com".to_string()),
        },
        input: InputConfig {
            seeds_path: dir.join("urls.txt").to_string_lossy().into_owned(),
        },
        output: OutputConfig {
            results_path: dir.join("foundurls.txt").to_string_lossy().into_owned(),
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Reads the results file, checks the header, and returns the rows as a set
fn read_rows(config: &Config) -> HashSet<String> {
    let content = std::fs::read_to_string(&config.output.results_path).unwrap();
    assert!(content.starts_with(HEADER), "missing header: {:?}", content);
    content.lines().skip(1).map(str::to_string).collect()
}

/// Log sink shared with the tracing subscriber
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[tokio::test]
async fn test_single_page_single_link() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/a", r#"<a href="/b">B</a>"#).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let seeds = SeedSet::parse(&format!("{}/a\n", base));

    let summary = crawl(&config, &seeds, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_with_links, 1);
    assert_eq!(
        read_rows(&config),
        HashSet::from([format!("{}/a\t{}/b", base, base)])
    );
}

#[tokio::test]
async fn test_one_failing_page_among_three() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/one", r#"<a href="/x">x</a><a href="y">y</a>"#).await;
    mount_page(&server, "/two", r#"<a href="https://other.test/z">z</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let seeds: SeedSet = ["/one", "/two", "/three"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let summary = crawl(&config, &seeds, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_with_links, 2);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.failed_urls, vec![format!("{}/three", base)]);

    let expected: HashSet<String> = HashSet::from([
        format!("{}/one\t{}/x", base, base),
        format!("{}/one\t{}/y", base, base),
        format!("{}/two\thttps://other.test/z", base),
    ]);
    assert_eq!(read_rows(&config), expected);

    let failing = format!("{}/three", base);
    let log_text = logs.text();
    assert!(
        log_text
            .lines()
            .any(|l| l.contains("ERROR") && l.contains(&failing) && l.contains("500")),
        "no failure log for {} in:\n{}",
        failing,
        log_text
    );
}

#[tokio::test]
async fn test_rerun_reproduces_rows() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/index",
        r#"<a href="/p1">1</a><a href="/p2">2</a><a href="/p1">again</a>"#,
    )
    .await;
    mount_page(&server, "/p1", r#"<a href="/index">home</a>"#).await;
    mount_page(&server, "/p2", "<p>leaf</p>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let seeds: SeedSet = ["/index", "/p1", "/p2"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();

    crawl(&config, &seeds, CancellationToken::new()).await.unwrap();
    let first = read_rows(&config);

    crawl(&config, &seeds, CancellationToken::new()).await.unwrap();
    let second = read_rows(&config);

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_page_without_links_writes_nothing() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/empty", "<html><body>No links</body></html>").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let seeds = SeedSet::parse(&format!("{}/empty", base));

    let summary = crawl(&config, &seeds, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.pages_without_links, 1);
    assert_eq!(summary.pages_failed, 0);
    assert!(read_rows(&config).is_empty());
}

#[tokio::test]
async fn test_process_never_fails_for_any_status() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/ok", r#"<a href="/next">n</a>"#).await;
    for (page, code) in [("/missing", 404), ("/broken", 500)] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(code))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let session = HttpSession::new(&config.crawler, &config.user_agent).unwrap();

    let ok = process_page(&format!("{}/ok", base), &session).await;
    assert_eq!(ok.links(), HashSet::from([format!("{}/next", base)]));

    for page in ["/missing", "/broken"] {
        let result = process_page(&format!("{}{}", base, page), &session).await;
        assert!(result.is_failed());
        assert!(result.links().is_empty());
    }

    // Connection refused: bind and release a port so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let refused = process_page(&format!("http://{}/", addr), &session).await;
    assert!(refused.is_failed());
    assert!(refused.links().is_empty());
}

#[tokio::test]
async fn test_unreachable_seed_does_not_block_others() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/a", r#"<a href="/b">b</a>"#).await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let seeds: SeedSet = [format!("{}/a", base), dead, "not a url".to_string()]
        .into_iter()
        .collect();

    let summary = crawl(&config, &seeds, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.pages_with_links, 1);
    assert_eq!(summary.pages_failed, 2);
    assert_eq!(read_rows(&config).len(), 1);
}

#[tokio::test]
async fn test_cancellation_stops_slow_fetches() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/fast", r#"<a href="/f">f</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(r#"<a href="/s">s</a>"#).set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let seeds: SeedSet = ["/fast", "/slow"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let summary = tokio::time::timeout(Duration::from_secs(3), crawl(&config, &seeds, cancel))
        .await
        .expect("cancelled crawl should finish before the slow page responds")
        .unwrap();

    assert_eq!(summary.pages_with_links, 1);
    assert_eq!(summary.pages_cancelled, 1);
    assert_eq!(
        read_rows(&config),
        HashSet::from([format!("{}/fast\t{}/f", base, base)])
    );
}

#[tokio::test]
async fn test_binary_exits_successfully_despite_failures() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/a", r#"<a href="/b">b</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let seeds_path = dir.path().join("urls.txt");
    let results_path = dir.path().join("foundurls.txt");
    std::fs::write(&seeds_path, format!("{}/a\n\n{}/down\n", base, base)).unwrap();

    let config_path = dir.path().join("harvest.toml");
    std::fs::write(
        &config_path,
        format!(
            "[crawler]\nmax-concurrent-pages-open = 2\n\n\
             [input]\nseeds-path = {:?}\n\n\
             [output]\nresults-path = {:?}\n",
            seeds_path.to_string_lossy(),
            results_path.to_string_lossy()
        ),
    )
    .unwrap();

    let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_link-harvest"))
        .arg(&config_path)
        .arg("--quiet")
        .output()
        .await
        .expect("failed to run binary");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = std::fs::read_to_string(&results_path).unwrap();
    assert_eq!(
        content,
        format!("{}{}/a\t{}/b\n", HEADER, base, base)
    );
}
