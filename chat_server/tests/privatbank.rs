//! `PrivatBankClient` against a one-shot HTTP responder on loopback.

use std::time::Duration;

use chat_server::rates::{LookupError, PrivatBankClient, RateSource};
use chrono::NaiveDate;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const BODY: &str = r#"{"date":"05.01.2024","bank":"PB","baseCurrency":980,"baseCurrencyLit":"UAH","exchangeRate":[{"baseCurrency":"UAH","currency":"EUR","saleRateNB":41.6041,"purchaseRateNB":41.6041},{"baseCurrency":"UAH","currency":"USD","saleRateNB":38.0067,"purchaseRateNB":38.0067}]}"#;

/// Serve exactly one request with `status_line` and `body`; resolves to the request line.
async fn respond_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        let response = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });
    (format!("http://{addr}/p24api/exchange_rates"), handle)
}

fn client(base_url: &str) -> PrivatBankClient {
    PrivatBankClient::new(base_url, Duration::from_secs(2)).unwrap()
}

fn jan(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

#[tokio::test]
async fn fetches_sale_rate_for_the_date() {
    let (url, request) = respond_once("HTTP/1.1 200 OK", BODY).await;

    let rate = client(&url).fetch_rate("USD", jan(5)).await.unwrap();

    assert_eq!(rate, "38.0067");
    assert_eq!(
        request.await.unwrap(),
        "GET /p24api/exchange_rates?json&date=05.01.2024 HTTP/1.1"
    );
}

#[tokio::test]
async fn non_success_status_is_http_error() {
    let (url, _request) = respond_once("HTTP/1.1 503 Service Unavailable", "{}").await;

    let err = client(&url).fetch_rate("USD", jan(5)).await.unwrap_err();

    assert!(matches!(err, LookupError::Http { status: 503 }), "{err:?}");
}

#[tokio::test]
async fn unknown_currency_is_not_found() {
    let (url, _request) = respond_once("HTTP/1.1 200 OK", BODY).await;

    let err = client(&url).fetch_rate("JPY", jan(5)).await.unwrap_err();

    assert!(
        matches!(err, LookupError::NotFound { ref currency, ref date } if currency == "JPY" && date == "05.01.2024"),
        "{err:?}"
    );
}

#[tokio::test]
async fn unreachable_upstream_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}/rates"))
        .fetch_rate("USD", jan(5))
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::Transport(_)), "{err:?}");
}
