use tickwatch_core::common::Instrument;
use tickwatch_core::config::FeedConfig;
use tickwatch_core::market::entity::PivotLevel;
use tickwatch_core::market::error::MarketError;
use tickwatch_core::market::port::{PivotSource, PriceSource};
use tickwatch_feed::moneycontrol::MoneycontrolProvider;
use tickwatch_feed::yahoo::YahooProvider;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const CHART_BODY: &str = r#"{"chart":{"result":[{"meta":{"currency":"INR","symbol":"ICICIBANK.NS","regularMarketPrice":1254.35},"timestamp":[1736135100],"indicators":{"quote":[{"close":[1253.9]}]}}],"error":null}}"#;

const PIVOT_PAGE: &str = r#"
<html><body>
<table class="pivot">
  <tr><th>Type</th><th>Value</th></tr>
  <tr><td>Pivot Point</td><td>1,250.10</td></tr>
  <tr><td class="r">Resistance 1</td><td>1,262.45</td></tr>
  <tr><td class="r">Resistance 2</td><td>1,270.80</td></tr>
  <tr><td class="r">Resistance 3</td><td>1,283.15</td></tr>
  <tr><td class="s">Support 1</td><td>1,241.75</td></tr>
  <tr><td class="s">Support 2</td><td>1,229.40</td></tr>
  <tr><td class="s">Support 3</td><td>1,221.05</td></tr>
</table>
</body></html>
"#;

fn install_crypto() {
    // a second install in the same test binary only reports the existing provider
    let _already_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_err();
}

/// # Summary
/// Minimal HTTP/1.1 server answering every request with the same response.
///
/// # Returns
/// Base URL of the server and a receiver yielding each request line.
async fn serve(status: &'static str, body: &'static str) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();
            if tx.send(request_line).is_err() {
                break;
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            if socket.write_all(response.as_bytes()).await.is_ok() {
                socket.shutdown().await.unwrap_or_default();
            }
        }
    });

    (format!("http://{}", addr), rx)
}

fn instrument() -> Instrument {
    Instrument::default()
}

#[tokio::test]
async fn test_yahoo_fetch_price_from_local_server() {
    install_crypto();
    let (base, mut requests) = serve("200 OK", CHART_BODY).await;
    let cfg = FeedConfig {
        price_base_url: base,
        ..FeedConfig::default()
    };

    let provider = YahooProvider::new(&cfg).unwrap();
    let price = provider.fetch_price(&instrument()).await.unwrap();
    assert_eq!(price, 1254.35);

    let request_line = requests.recv().await.unwrap();
    assert!(
        request_line.starts_with("GET /v8/finance/chart/ICICIBANK.NS?"),
        "unexpected request: {}",
        request_line
    );
    assert!(request_line.contains("interval=1m"));
}

#[tokio::test]
async fn test_yahoo_http_error_is_network_error() {
    install_crypto();
    let (base, _requests) = serve("503 Service Unavailable", "busy").await;
    let cfg = FeedConfig {
        price_base_url: base,
        ..FeedConfig::default()
    };

    let provider = YahooProvider::new(&cfg).unwrap();
    let result = provider.fetch_price(&instrument()).await;
    assert!(matches!(result, Err(MarketError::Network(_))), "{:?}", result);
}

#[tokio::test]
async fn test_moneycontrol_fetch_pivots_from_local_server() {
    install_crypto();
    let (base, mut requests) = serve("200 OK", PIVOT_PAGE).await;
    let cfg = FeedConfig {
        pivot_base_url: base,
        ..FeedConfig::default()
    };

    let provider = MoneycontrolProvider::new(&cfg).unwrap();
    let levels = provider.fetch_pivots(&instrument()).await.unwrap();

    assert_eq!(levels.get(PivotLevel::Pp), Some(1250.10));
    assert_eq!(levels.get(PivotLevel::R3), Some(1283.15));
    assert_eq!(levels.get(PivotLevel::S2), Some(1229.40));
    assert_eq!(levels.iter().count(), 7);

    let request_line = requests.recv().await.unwrap();
    assert!(request_line.starts_with("GET /banks-private-sector/icicibank/ICI02 "));
}

#[tokio::test]
async fn test_moneycontrol_incomplete_page_yields_empty_levels() {
    install_crypto();
    let provider = MoneycontrolProvider::new(&FeedConfig::default()).unwrap();
    let page = PIVOT_PAGE.replace("Support 3", "Support Three");
    assert!(provider.parse_page(&page).is_empty());
    assert!(provider.parse_page("<html></html>").is_empty());
}

/// # Summary
/// Live check against Yahoo Finance.
///
/// # Logic
/// Ignored by default; run with `--ignored` when network access is available.
#[tokio::test]
#[ignore]
async fn test_yahoo_real_fetch() -> anyhow::Result<()> {
    install_crypto();
    let provider = YahooProvider::new(&FeedConfig::default())?;
    let price = provider.fetch_price(&instrument()).await?;
    assert!(price > 0.0);
    println!("ICICIBANK.NS = {}", price);
    Ok(())
}
