//! Integration tests for the Bybit REST provider against a mocked exchange

use signalscan::error::FetchError;
use signalscan::models::series::Entity;
use signalscan::models::signal::EntityMetrics;
use signalscan::services::bybit::BybitRestClient;
use signalscan::services::market_data::MarketDataProvider;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BybitRestClient {
    BybitRestClient::with_client(server.uri(), reqwest::Client::new(), "5m").expect("client")
}

#[tokio::test]
async fn kline_rows_are_returned_oldest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .and(query_param("category", "linear"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "5"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "symbol": "BTCUSDT",
                "category": "linear",
                "list": [
                    ["600000", "102", "103", "101", "102.5", "12", "1230"],
                    ["300000", "101", "102", "100", "102", "11", "1120"],
                    ["0", "100", "101", "99", "101", "10", "1010"]
                ]
            }
        })))
        .mount(&server)
        .await;

    let window = client(&server)
        .fetch_window(&Entity::new("BTCUSDT"), 3)
        .await
        .expect("window");

    assert_eq!(window.entity, Entity::new("BTCUSDT"));
    let timestamps: Vec<i64> = window.samples.iter().map(|s| s.timestamp).collect();
    assert_eq!(timestamps, vec![0, 300_000, 600_000]);
    assert_eq!(window.closes(), vec![101.0, 102.0, 102.5]);
    assert_eq!(window.samples[0].volume, 10.0);
    assert_eq!(window.samples[0].turnover, Some(1010.0));
    // window volume is quote turnover, not base units
    assert_eq!(EntityMetrics::from_window(&window).volume, Some(3360.0));
}

#[tokio::test]
async fn slow_response_times_out_with_elapsed_duration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .expect("http client");
    let client = BybitRestClient::with_client(server.uri(), http, "5m").expect("client");

    let result = client.fetch_window(&Entity::new("BTCUSDT"), 3).await;

    match result {
        Err(FetchError::Timeout(ms)) => assert!((100..500).contains(&ms), "reported {}ms", ms),
        other => panic!("expected a timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn non_zero_ret_code_is_a_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 10001,
            "retMsg": "params error: symbol invalid",
            "result": {}
        })))
        .mount(&server)
        .await;

    let result = client(&server).fetch_window(&Entity::new("NOPE"), 10).await;
    assert!(matches!(result, Err(FetchError::Provider(msg)) if msg.contains("10001")));
}

#[tokio::test]
async fn garbage_body_is_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let result = client(&server).fetch_window(&Entity::new("BTCUSDT"), 10).await;
    assert!(matches!(result, Err(FetchError::MalformedPayload(_))));
}

#[tokio::test]
async fn http_error_is_a_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/kline"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client(&server).fetch_window(&Entity::new("BTCUSDT"), 10).await;
    assert!(matches!(result, Err(FetchError::Provider(_))));
}

#[tokio::test]
async fn instruments_are_paged_and_filtered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/instruments-info"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "category": "linear",
                "list": [
                    {"symbol": "BTCUSDT", "status": "Trading", "leverageFilter": {"maxLeverage": "100.00"}},
                    {"symbol": "OLDUSDT", "status": "Closed", "leverageFilter": {"maxLeverage": "25.00"}}
                ],
                "nextPageCursor": "page2"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v5/market/instruments-info"))
        .and(query_param("cursor", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "category": "linear",
                "list": [
                    {"symbol": "ETHUSDT", "status": "Trading", "leverageFilter": {"maxLeverage": "50.00"}},
                    {"symbol": "NEWUSDT", "status": "Trading"}
                ],
                "nextPageCursor": ""
            }
        })))
        .mount(&server)
        .await;

    let markets = client(&server).load_markets().await.expect("markets");

    let summary: Vec<(&str, Option<f64>)> = markets
        .iter()
        .map(|m| (m.entity.as_str(), m.max_leverage))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("BTCUSDT", Some(100.0)),
            ("ETHUSDT", Some(50.0)),
            ("NEWUSDT", None)
        ]
    );
}

#[test]
fn unsupported_interval_is_rejected() {
    let result = BybitRestClient::with_client(
        "http://localhost".to_string(),
        reqwest::Client::new(),
        "7m",
    );
    assert!(result.is_err());
}
