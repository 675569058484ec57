//! Integration tests for the harvester
//!
//! These tests use wiremock to serve catalog search pages and run the full
//! pipeline through the HTTP-backed browser.

use deal_harvester::browser::HttpLauncher;
use deal_harvester::config::{parse_config, Config};
use deal_harvester::crawler::{run_harvest, Coordinator};
use deal_harvester::output::{render, CrawlOutcome, Envelope};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing the catalog at the mock server
fn create_test_config(base_url: &str, queries: &[&str]) -> Config {
    let mut config = Config::default();
    config.site.name = "TestShop".to_string();
    config.site.base_url = base_url.to_string();
    config.site.search_url = format!("{}/sr?q={{query}}&pi=1", base_url);
    config.crawler.queries = queries.iter().map(|q| q.to_string()).collect();
    config.crawler.query_delay_ms = 0;
    config.crawler.navigation_timeout_ms = 2_000;
    config.browser.referer = None;
    config
}

fn card_html(title: &str, current: &str, original: &str, href: &str, discount: &str) -> String {
    format!(
        r#"<div class="p-card-wrppr">
            <a href="{href}">
                <img class="p-card-img" src="https://cdn.example.com{href}.jpg">
                <span class="prdct-desc-cntnr-name"> {title} </span>
                <div class="prc-box-orgnl">{original}</div>
                <div class="prc-box-dscntd">{current}</div>
                <div class="dsct-prcntg">{discount}</div>
            </a>
        </div>"#
    )
}

fn results_page(cards: &[String]) -> String {
    format!(
        r#"<html><head><title>Arama</title></head><body>
        <div class="prdct-cntnr-wrppr">{}</div>
        </body></html>"#,
        cards.join("\n")
    )
}

async fn mount_query(server: &MockServer, query: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/sr"))
        .and(query_param("q", query))
        .and(query_param("pi", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn products(outcome: CrawlOutcome) -> Vec<deal_harvester::ProductRecord> {
    match outcome {
        CrawlOutcome::Success(products) => products,
        CrawlOutcome::Failure(e) => panic!("Crawl failed: {}", e),
    }
}

#[tokio::test]
async fn test_full_harvest_filters_and_dedups() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_query(
        &mock_server,
        "elektronik",
        results_page(&[
            card_html("Kulaklık", "1.299,90 TL", "2.363,45 TL", "/kulaklik-p-1", "%45"),
            card_html("Şarj Aleti", "450 TL", "500 TL", "/sarj-p-2", "%10"),
        ]),
    )
    .await;

    mount_query(
        &mock_server,
        "telefon",
        results_page(&[
            // Same product as in the first query
            card_html("Kulaklık (tekrar)", "1.199,90 TL", "2.363,45 TL", "/kulaklik-p-1", "%49"),
            card_html("Telefon Kılıfı", "59,90 TL", "149,90 TL", "/kilif-p-3", "%60"),
        ]),
    )
    .await;

    let config = create_test_config(&base_url, &["elektronik", "telefon"]);
    let products = products(run_harvest(&config).await);

    assert_eq!(products.len(), 2);

    assert_eq!(products[0].title, "Kulaklık");
    assert_eq!(products[0].current_price, 1299.90);
    assert_eq!(products[0].original_price, 2363.45);
    assert_eq!(products[0].discount_percent, 45);
    assert_eq!(products[0].url, format!("{}/kulaklik-p-1", base_url));
    assert_eq!(
        products[0].image_url,
        "https://cdn.example.com/kulaklik-p-1.jpg"
    );
    assert_eq!(products[0].site, "TestShop");

    assert_eq!(products[1].title, "Telefon Kılıfı");
    assert_eq!(products[1].discount_percent, 60);
}

#[tokio::test]
async fn test_missing_card_container_does_not_abort_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_query(
        &mock_server,
        "elektronik",
        "<html><body><p>Sonuç bulunamadı</p></body></html>".to_string(),
    )
    .await;

    mount_query(
        &mock_server,
        "moda",
        results_page(&[card_html("Ceket", "499,99 TL", "1.199,99 TL", "/ceket-p-5", "%58")]),
    )
    .await;

    let config = create_test_config(&base_url, &["elektronik", "moda"]);
    let products = products(run_harvest(&config).await);

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Ceket");
}

#[tokio::test]
async fn test_http_error_and_slow_page_yield_zero_results() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sr"))
        .and(query_param("q", "telefon"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sr"))
        .and(query_param("q", "bilgisayar"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(results_page(&[card_html(
                    "Laptop", "9.999 TL", "19.999 TL", "/laptop-p-8", "%50",
                )]))
                .set_delay(Duration::from_millis(1_500)),
        )
        .mount(&mock_server)
        .await;

    mount_query(
        &mock_server,
        "moda",
        results_page(&[card_html("Bot", "799,90 TL", "1.599,90 TL", "/bot-p-6", "%50")]),
    )
    .await;

    let mut config = create_test_config(&base_url, &["telefon", "bilgisayar", "moda"]);
    config.crawler.navigation_timeout_ms = 300;

    let products = products(run_harvest(&config).await);

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Bot");
}

#[tokio::test]
async fn test_session_headers_are_sent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sr"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .and(header("accept-language", "tr-TR"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[card_html(
            "Saat",
            "1.000,00 TL",
            "2.500,00 TL",
            "/saat-p-4",
            "%60",
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url, &["saat"]);
    config.browser.user_agent = "HarvestTest/1.0".to_string();
    config.browser.accept_language = "tr-TR".to_string();

    let coordinator = Coordinator::new(&config, HttpLauncher::new()).expect("coordinator");
    let products = products(coordinator.harvest(&config.crawler.queries).await);

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].url, format!("{}/saat-p-4", base_url));
}

#[tokio::test]
async fn test_result_set_is_capped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let queries = ["elektronik", "telefon", "bilgisayar", "ev-yasam", "moda"];
    for query in queries {
        let cards: Vec<String> = (0..20)
            .map(|i| {
                card_html(
                    "Fırsat",
                    "100,00 TL",
                    "250,00 TL",
                    &format!("/{}-p-{}", query, i),
                    "%60",
                )
            })
            .collect();
        mount_query(&mock_server, query, results_page(&cards)).await;
    }

    let config = create_test_config(&base_url, &queries);
    let products = products(run_harvest(&config).await);

    assert_eq!(products.len(), 50);
    assert_eq!(products[0].url, format!("{}/elektronik-p-0", base_url));
    assert_eq!(products[49].url, format!("{}/bilgisayar-p-9", base_url));
}

#[tokio::test]
async fn test_launch_failure_yields_failure_envelope() {
    let mut config = create_test_config("https://shop.example.com", &["moda"]);
    config.browser.user_agent = "Broken\nAgent".to_string();

    let outcome = run_harvest(&config).await;
    assert!(!outcome.is_success());

    let json = render(&Envelope::from(outcome), false).expect("render");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    assert_eq!(value["success"], false);
    assert!(value["error"]
        .as_str()
        .expect("error message")
        .contains("launch"));
    assert_eq!(value["products"], serde_json::json!([]));
    assert_eq!(value["count"], 0);
}

#[tokio::test]
async fn test_config_file_drives_harvest() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_query(
        &mock_server,
        "shoes",
        results_page(&[card_html(
            "Runner",
            "$1,049.50",
            "$2,099.00",
            "/runner-p-1",
            "50%",
        )]),
    )
    .await;

    let config = parse_config(&format!(
        r#"
[site]
name = "PointShop"
base-url = "{base}"
search-url = "{base}/sr?q={{query}}&pi=1"
price-format = "point"

[crawler]
queries = ["shoes"]
query-delay-ms = 0
"#,
        base = base_url
    ))
    .expect("valid config");

    let products = products(run_harvest(&config).await);

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].current_price, 1049.5);
    assert_eq!(products[0].original_price, 2099.0);
    assert_eq!(products[0].discount_percent, 50);
    assert_eq!(products[0].site, "PointShop");
}
