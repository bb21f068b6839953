use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use perpsentry::models::instrument::{MarketClass, Timeframe};
use perpsentry::services::market_data::{CandleSource, MarketDataError};
use perpsentry::services::okx::OkxCandleSource;

fn source(server: &MockServer) -> OkxCandleSource {
    OkxCandleSource::with_client(&server.uri(), reqwest::Client::new()).unwrap()
}

#[test]
fn test_inst_id_mapping() {
    let perp = OkxCandleSource::with_client("https://www.okx.com", reqwest::Client::new()).unwrap();
    assert_eq!(perp.inst_id("BTC"), "BTC-USDT-SWAP");
    assert_eq!(perp.inst_id("ETH-USD-SWAP"), "ETH-USD-SWAP");

    let spot = perp.with_market(MarketClass::Spot);
    assert_eq!(spot.inst_id("SOL"), "SOL-USDT");
}

#[tokio::test]
async fn test_fetch_candles_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/candles"))
        .and(query_param("instId", "BTC-USDT-SWAP"))
        .and(query_param("bar", "1H"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "0",
            "msg": "",
            "data": [
                ["1704074400000", "102", "103", "101", "102.5", "12", "0", "0", "0"],
                ["1704070800000", "101", "102", "100", "102", "11", "0", "0", "1"],
                ["1704067200000", "100", "101", "99", "101", "10", "0", "0", "1"]
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let series = source(&server)
        .get_candles("BTC", Timeframe::H1, 3)
        .await
        .unwrap()
        .expect("candles");

    assert_eq!(series.len(), 3);
    assert!(series.is_chronological());
    assert_eq!(series.timeframe, Timeframe::H1);
    assert_eq!(series.candles()[0].close, 101.0);
    assert_eq!(series.last().unwrap().close, 102.5);
    assert_eq!(series.last().unwrap().timestamp.timestamp_millis(), 1704074400000);
}

#[tokio::test]
async fn test_limit_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/candles"))
        .and(query_param("limit", "300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "0", "msg": "", "data": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = source(&server).get_candles("ETH", Timeframe::M15, 1000).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_api_error_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/candles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "51001", "msg": "Instrument ID does not exist", "data": []
        })))
        .mount(&server)
        .await;

    let err = source(&server)
        .get_candles("NOPE", Timeframe::M15, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Api { ref code, .. } if code == "51001"));
}

#[tokio::test]
async fn test_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/candles"))
        .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
        .mount(&server)
        .await;

    let err = source(&server)
        .get_candles("BTC", Timeframe::M15, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Status { status: 429, .. }));
}

#[tokio::test]
async fn test_malformed_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/candles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "0", "msg": "", "data": [["1704067200000", "abc", "1", "1", "1", "1"]]
        })))
        .mount(&server)
        .await;

    let err = source(&server)
        .get_candles("BTC", Timeframe::M15, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Parse(_)));
}
