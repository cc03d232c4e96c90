//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the history service and run the
//! full sign-in and pagination cycle end-to-end.

use chrono::NaiveDate;
use history_harvest::config::Config;
use history_harvest::crawler::{CrawlReport, Harvester};
use history_harvest::output::{CsvSink, MemorySink, Progress};
use history_harvest::{ActivityDate, CrawlOutcome, HarvestError, Labels, LoginError};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH: &str = "https://www.google.com/search?q=";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.entry_url = format!("{}/history", base_url);
    config.site.pacing_ms = 0; // No pacing in tests
    config.credentials.login = "user@example.com".to_string();
    config.credentials.password = "secret".to_string();
    config
}

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2013, 1, 15).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> ActivityDate {
    ActivityDate::from(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn login_page(action: &str) -> ResponseTemplate {
    html(format!(
        r#"<html><body><form method="post" action="{}">
            <input type="hidden" name="GALX" value="token123">
            <input type="email" name="Email">
            <input type="password" name="Passwd">
            <input type="submit" name="signIn" value="Connexion">
        </form></body></html>"#,
        action
    ))
}

fn relogin_page(action: &str) -> ResponseTemplate {
    html(format!(
        r#"<html><body><p>Confirmez votre mot de passe</p><form method="post" action="{}">
            <input type="password" name="Passwd">
            <input type="submit" name="signIn" value="Connexion">
        </form></body></html>"#,
        action
    ))
}

fn heading(label: &str) -> String {
    format!(r#"<div class="day"><h1>{}</h1></div>"#, label)
}

fn search_row(term: &str, time: &str) -> String {
    format!(
        r#"<table class="result"><tr><td><a href="{}{}">{}</a></td><td>{}</td></tr></table>"#,
        SEARCH,
        term.replace(' ', "+"),
        term,
        time
    )
}

fn visited_row(title: &str, address: &str, time: &str) -> String {
    format!(
        r#"<table class="result"><tr><td><a href="https://www.google.com/url?q={}" title="{}">{}</a></td><td>{}</td></tr></table>"#,
        address, address, title, time
    )
}

fn listing(children: &[String], previous: Option<&str>) -> ResponseTemplate {
    let previous = previous
        .map(|href| format!(r#"<div class="nav"><a href="{}">Précédent</a></div>"#, href))
        .unwrap_or_default();
    html(format!(
        r#"<html><body><form name="edit">{}</form>{}</body></html>"#,
        children.concat(),
        previous
    ))
}

/// Mounts the entry page and a login endpoint answering with `first_page`
async fn mount_sign_in(server: &MockServer, first_page: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(login_page("/login"))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("Email=user%40example.com"))
        .and(body_string_contains("Passwd=secret"))
        .and(body_string_contains("GALX=token123"))
        .respond_with(first_page)
        .expect(1)
        .mount(server)
        .await;
}

async fn run_to_memory(config: &Config) -> (CrawlReport, MemorySink, Vec<Progress>) {
    let harvester = Harvester::new(config)
        .expect("Failed to build harvester")
        .with_clock(fixed_today);
    let mut sink = MemorySink::new();
    let mut seen = Vec::new();
    let mut observer = |p: &Progress| seen.push(p.clone());

    let report = harvester
        .run(&mut sink, &mut observer)
        .await
        .expect("Crawl failed");
    (report, sink, seen)
}

#[tokio::test]
async fn test_full_history_two_pages() {
    let mock_server = MockServer::start().await;

    mount_sign_in(
        &mock_server,
        listing(
            &[
                heading("Aujourd'hui"),
                search_row("rust csv", "10:32"),
                visited_row("csv - Rust", "https://docs.rs/csv", "10:33"),
            ],
            Some("/history/older"),
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/history/older"))
        .respond_with(listing(
            &[heading("12 déc 2012"), search_row("serde toml", "18:05")],
            None,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let (report, sink, seen) = run_to_memory(&config).await;

    assert_eq!(report.outcome, CrawlOutcome::HistoryComplete);
    assert_eq!(report.pages, 2);
    assert_eq!(report.rows_written, 3);
    assert_eq!(report.searches.len(), 2);
    assert_eq!(report.last_search_date(), Some(date(2012, 12, 12)));

    assert_eq!(
        sink.rows,
        vec![
            vec!["Recherche", "15/01/2013", "10:32", "rust csv"],
            vec![
                "Résultat",
                "15/01/2013",
                "10:33",
                "",
                "csv - Rust",
                "https://docs.rs/csv"
            ],
            vec!["Recherche", "12/12/2012", "18:05", "serde toml"],
        ]
    );

    // Progress is reported before following each previous-page link
    assert_eq!(
        seen,
        vec![Progress {
            pages: 1,
            searches: 1,
            last_search_date: Some(date(2013, 1, 15)),
        }]
    );
}

#[tokio::test]
async fn test_single_page_without_login_form_is_complete() {
    let mock_server = MockServer::start().await;

    mount_sign_in(
        &mock_server,
        listing(
            &[heading("Hier"), search_row("tokio select", "22:10")],
            None,
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri());
    let (report, sink, seen) = run_to_memory(&config).await;

    assert_eq!(report.outcome, CrawlOutcome::HistoryComplete);
    assert!(report.outcome.is_success());
    assert_eq!(report.pages, 1);
    assert_eq!(
        sink.rows,
        vec![vec!["Recherche", "14/01/2013", "22:10", "tokio select"]]
    );
    assert!(seen.is_empty());
}

#[tokio::test]
async fn test_rejected_sign_in_writes_header_only() {
    let mock_server = MockServer::start().await;

    // The service answers a bad password with the login form again
    mount_sign_in(&mock_server, login_page("/login")).await;

    let config = create_test_config(&mock_server.uri());
    let labels = Labels::french();
    let harvester = Harvester::new(&config)
        .unwrap()
        .with_clock(fixed_today);
    let mut sink = CsvSink::new(Vec::new(), b';', &labels.columns).unwrap();
    let mut observer = |_: &Progress| {};

    let report = harvester.run(&mut sink, &mut observer).await.unwrap();

    assert_eq!(report.outcome, CrawlOutcome::ConnectFailed);
    assert!(!report.outcome.is_success());
    assert_eq!(report.pages, 0);
    assert_eq!(report.rows_written, 0);

    let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    assert_eq!(
        output,
        "Type;Date;Heure;Terme de la recherche;Titre de la page;Lien\n"
    );
}

#[tokio::test]
async fn test_reauthenticates_when_session_drops() {
    let mock_server = MockServer::start().await;

    mount_sign_in(
        &mock_server,
        listing(
            &[heading("Aujourd'hui"), search_row("first", "09:00")],
            Some("/history/older"),
        ),
    )
    .await;

    // Page 2 asks for the password again instead of showing the listing
    Mock::given(method("GET"))
        .and(path("/history/older"))
        .respond_with(relogin_page("/relogin"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/relogin"))
        .and(body_string_contains("Passwd=secret"))
        .respond_with(listing(
            &[heading("3 jan 2013"), search_row("second", "08:00")],
            None,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let (report, sink, _) = run_to_memory(&config).await;

    assert_eq!(report.outcome, CrawlOutcome::HistoryComplete);
    assert_eq!(report.pages, 2);
    assert_eq!(
        sink.rows,
        vec![
            vec!["Recherche", "15/01/2013", "09:00", "first"],
            vec!["Recherche", "03/01/2013", "08:00", "second"],
        ]
    );

    let relogins = mock_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/relogin")
        .count();
    assert_eq!(relogins, 1);
}

#[tokio::test]
async fn test_later_page_without_listing_or_password_is_complete() {
    let mock_server = MockServer::start().await;

    mount_sign_in(
        &mock_server,
        listing(
            &[heading("Aujourd'hui"), search_row("last one", "16:40")],
            Some("/history/older"),
        ),
    )
    .await;

    // Some other form, but no listing and no login prompt
    Mock::given(method("GET"))
        .and(path("/history/older"))
        .respond_with(html(
            r#"<html><body><form name="other"><input name="q"></form></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let (report, sink, _) = run_to_memory(&config).await;

    assert_eq!(report.outcome, CrawlOutcome::HistoryComplete);
    assert_eq!(report.pages, 1);
    assert_eq!(report.rows_written, 1);
    assert_eq!(
        sink.rows,
        vec![vec!["Recherche", "15/01/2013", "16:40", "last one"]]
    );
}

#[tokio::test]
async fn test_listing_without_link_but_with_password_signs_in_again() {
    let mock_server = MockServer::start().await;

    // The listing parses, but a password prompt sits where the link should be
    mount_sign_in(
        &mock_server,
        html(format!(
            r#"<html><body>
            <form method="post" action="/relogin">
                <input type="password" name="Passwd">
                <input type="submit" name="signIn" value="Connexion">
            </form>
            <form name="edit">{}{}</form>
            </body></html>"#,
            heading("Aujourd'hui"),
            search_row("first", "09:00")
        )),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/relogin"))
        .and(body_string_contains("Passwd=secret"))
        .respond_with(listing(
            &[heading("3 jan 2013"), search_row("second", "08:00")],
            None,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let (report, sink, _) = run_to_memory(&config).await;

    assert_eq!(report.outcome, CrawlOutcome::HistoryComplete);
    assert_eq!(report.pages, 2);
    assert_eq!(
        sink.rows,
        vec![
            vec!["Recherche", "15/01/2013", "09:00", "first"],
            vec!["Recherche", "03/01/2013", "08:00", "second"],
        ]
    );
}

#[tokio::test]
async fn test_gives_up_after_second_reauthentication() {
    let mock_server = MockServer::start().await;

    mount_sign_in(
        &mock_server,
        listing(
            &[heading("Aujourd'hui"), search_row("only", "07:45")],
            Some("/history/older"),
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/history/older"))
        .respond_with(relogin_page("/relogin"))
        .mount(&mock_server)
        .await;

    // Signing in again never brings the listing back
    Mock::given(method("POST"))
        .and(path("/relogin"))
        .respond_with(relogin_page("/relogin"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let (report, sink, _) = run_to_memory(&config).await;

    assert_eq!(report.outcome, CrawlOutcome::SessionLost);
    assert_eq!(report.pages, 1);
    assert_eq!(sink.rows.len(), 1);
}

#[tokio::test]
async fn test_visited_results_excluded() {
    let mock_server = MockServer::start().await;

    mount_sign_in(
        &mock_server,
        listing(
            &[
                heading("Aujourd'hui"),
                search_row("wiremock", "11:00"),
                visited_row("wiremock - Rust", "https://docs.rs/wiremock", "11:01"),
            ],
            None,
        ),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri());
    config.credentials.include_visited_results = false;
    let (report, sink, _) = run_to_memory(&config).await;

    assert_eq!(report.rows_written, 1);
    assert_eq!(
        sink.rows,
        vec![vec!["Recherche", "15/01/2013", "11:00", "wiremock"]]
    );
}

#[tokio::test]
async fn test_bad_date_heading_aborts_after_earlier_rows() {
    let mock_server = MockServer::start().await;

    mount_sign_in(
        &mock_server,
        listing(
            &[
                heading("Aujourd'hui"),
                search_row("kept", "10:00"),
                heading("4 brumaire 2012"),
                search_row("lost", "09:00"),
            ],
            None,
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri());
    let harvester = Harvester::new(&config).unwrap().with_clock(fixed_today);
    let mut sink = MemorySink::new();
    let mut observer = |_: &Progress| {};

    let err = harvester.run(&mut sink, &mut observer).await.unwrap_err();

    assert!(matches!(err, HarvestError::Date(_)));
    assert_eq!(sink.rows, vec![vec!["Recherche", "15/01/2013", "10:00", "kept"]]);
}

#[tokio::test]
async fn test_login_page_without_sign_in_control_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(html(
            r#"<form action="/login"><input type="password" name="Passwd"></form>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let harvester = Harvester::new(&config).unwrap();
    let mut sink = MemorySink::new();
    let mut observer = |_: &Progress| {};

    let err = harvester.run(&mut sink, &mut observer).await.unwrap_err();

    assert!(matches!(
        err,
        HarvestError::Login(LoginError::MissingSignIn(ref control)) if control == "signIn"
    ));
}

#[tokio::test]
async fn test_http_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let harvester = Harvester::new(&config).unwrap();
    let mut sink = MemorySink::new();
    let mut observer = |_: &Progress| {};

    let err = harvester.run(&mut sink, &mut observer).await.unwrap_err();

    assert!(matches!(err, HarvestError::HttpStatus { status: 503, .. }));
    assert!(sink.rows.is_empty());
}

#[tokio::test]
async fn test_harvest_writes_csv_file() {
    let mock_server = MockServer::start().await;

    mount_sign_in(
        &mock_server,
        listing(
            &[heading("2 fév 2012"), search_row("csv; quoting", "14:20")],
            None,
        ),
    )
    .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let out_path = temp_dir.path().join("history.csv");

    let mut config = create_test_config(&mock_server.uri());
    config.output.path = Some(out_path.clone());

    let report = history_harvest::harvest(config).await.expect("Crawl failed");
    assert_eq!(report.outcome, CrawlOutcome::HistoryComplete);

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        written,
        "Type;Date;Heure;Terme de la recherche;Titre de la page;Lien\n\
         Recherche;02/02/2012;14:20;\"csv; quoting\"\n"
    );
}
