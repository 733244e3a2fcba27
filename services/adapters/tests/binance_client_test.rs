//! Binance Futures REST Client Tests
//!
//! Runs the collector against a local mock server to pin down request shape,
//! lenient decoding and error mapping.

use adapter_service::{AdapterError, BinanceFuturesClient, HttpClientConfig, MarketData, RequestLimiter};
use mockito::{Matcher, Server};
use std::time::Duration;

fn client_for(server: &Server) -> BinanceFuturesClient {
    let config = HttpClientConfig::with_timeout(Duration::from_secs(5));
    let http = config.build_client().unwrap();
    BinanceFuturesClient::new(http, server.url(), RequestLimiter::new(4, 0), config.request_timeout_ms)
}

#[tokio::test]
async fn test_lists_instruments_from_exchange_info() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/fapi/v1/exchangeInfo")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"timezone":"UTC","symbols":[
                {"symbol":"BTCUSDT","quoteAsset":"USDT","contractType":"PERPETUAL","status":"TRADING","pricePrecision":2},
                {"symbol":"BTCUSDT_240628","quoteAsset":"USDT","contractType":"CURRENT_QUARTER","status":"TRADING"},
                {"symbol":"ETHBTC","quoteAsset":"BTC","contractType":"PERPETUAL","status":"TRADING"}
            ]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let instruments = client.list_instruments().await.unwrap();

    mock.assert_async().await;
    assert_eq!(instruments.len(), 3);
    let perpetuals: Vec<_> = instruments.iter().filter(|i| i.is_usdt_perpetual()).collect();
    assert_eq!(perpetuals.len(), 1);
    assert_eq!(perpetuals[0].symbol, "BTCUSDT");
}

#[tokio::test]
async fn test_decodes_string_numerics_in_tickers() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/fapi/v1/ticker/24hr")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"[
                {"symbol":"BTCUSDT","lastPrice":"64000.10","quoteVolume":"123456789.5","priceChangePercent":"-1.25"},
                {"symbol":"ODDUSDT","lastPrice":"","quoteVolume":"n/a","priceChangePercent":"3"}
            ]"#,
        )
        .create_async()
        .await;

    let tickers = client_for(&server).all_tickers().await.unwrap();

    assert_eq!(tickers[0].last_price, Some(64000.10));
    assert_eq!(tickers[0].price_change_percent, Some(-1.25));
    assert_eq!(tickers[1].last_price, None);
    assert_eq!(tickers[1].quote_volume, None);
    assert_eq!(tickers[1].price_change_percent, Some(3.0));
}

#[tokio::test]
async fn test_klines_request_shape_and_short_rows() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/fapi/v1/klines")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "ETHUSDT".into()),
            Matcher::UrlEncoded("interval".into(), "1h".into()),
            Matcher::UrlEncoded("limit".into(), "25".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"[
                [1700000000000,"100","101","99","100.5","10",1700003599999,"1000",5],
                [1700003600000,"100.5"],
                [1700007200000,"100.5","102","100","bad","12",1700010799999,"1200",6]
            ]"#,
        )
        .create_async()
        .await;

    let candles = client_for(&server).recent_candles("ETHUSDT", 25).await.unwrap();

    mock.assert_async().await;
    // Second row is too short to carry a close and is skipped
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].close, Some(100.5));
    assert_eq!(candles[1].close, None);
    assert_eq!(candles[1].volume, Some(12.0));
}

#[tokio::test]
async fn test_open_interest_and_premium_index() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/fapi/v1/openInterest")
        .match_query(Matcher::UrlEncoded("symbol".into(), "SOLUSDT".into()))
        .with_status(200)
        .with_body(r#"{"symbol":"SOLUSDT","openInterest":"1500000.5","time":1700000000000}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/fapi/v1/premiumIndex")
        .match_query(Matcher::UrlEncoded("symbol".into(), "SOLUSDT".into()))
        .with_status(200)
        .with_body(r#"{"symbol":"SOLUSDT","markPrice":"150.25","lastFundingRate":"-0.00012"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let oi = client.open_interest("SOLUSDT").await.unwrap();
    let premium = client.premium_index("SOLUSDT").await.unwrap();

    assert_eq!(oi.open_interest, Some(1500000.5));
    assert_eq!(premium.mark_price, Some(150.25));
    assert_eq!(premium.last_funding_rate, Some(-0.00012));

    let stats = client.limiter().tracker().stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.failed, 0);
}

#[tokio::test]
async fn test_non_success_status_carries_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/fapi/v1/openInterest")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.open_interest("NOPEUSDT").await.unwrap_err();

    match &err {
        AdapterError::Status { status, body, endpoint } => {
            assert_eq!(*status, 400);
            assert!(body.contains("Invalid symbol"));
            assert_eq!(endpoint, "openInterest");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_recoverable());
    assert_eq!(client.limiter().tracker().stats().failed, 1);
}

#[tokio::test]
async fn test_schema_mismatch_is_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/fapi/v1/ticker/24hr")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"unexpected":"object"}"#)
        .create_async()
        .await;

    let err = client_for(&server).all_tickers().await.unwrap_err();
    assert!(matches!(err, AdapterError::Decode { .. }));
}
