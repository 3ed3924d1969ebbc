use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tickwatch_core::common::Instrument;
use tickwatch_core::config::FeedConfig;
use tickwatch_core::market::error::MarketError;
use tickwatch_core::market::port::PriceSource;
use tracing::debug;

/// # Summary
/// Yahoo Finance price source.
///
/// # Invariants
/// - Talks to the v8 chart endpoint under `base_url` with an async `reqwest` client.
/// - Never retries; one call is one HTTP request.
#[derive(Clone)]
pub struct YahooProvider {
    // shared HTTP client
    client: Client,
    // e.g. https://query1.finance.yahoo.com
    base_url: String,
}

impl YahooProvider {
    /// # Summary
    /// Creates a provider from the `[feed]` config section.
    ///
    /// # Returns
    /// `MarketError` when the HTTP client cannot be built.
    pub fn new(cfg: &FeedConfig) -> Result<Self, MarketError> {
        Ok(Self {
            client: crate::http::build_client(cfg)?,
            base_url: cfg.price_base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Top level of the chart response.
#[derive(Deserialize, Debug)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Deserialize, Debug)]
struct YahooError {
    description: String,
}

#[derive(Deserialize, Debug)]
struct YahooResult {
    meta: YahooMeta,
    indicators: Option<YahooIndicators>,
}

#[derive(Deserialize, Debug)]
struct YahooMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Deserialize, Debug)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// # Summary
/// Extracts the current price from a chart response body.
///
/// # Logic
/// 1. Surfaces a chart-level error as `MarketError::Unknown`.
/// 2. Tries the candidate fields in order: `meta.regularMarketPrice`, then the
///    last non-null intraday close.
/// 3. Rejects non-finite or non-positive values.
///
/// # Returns
/// The price, `MarketError::NotFound` when no candidate holds a usable value.
pub(crate) fn parse_chart(body: &str) -> Result<f64, MarketError> {
    let json: YahooResponse =
        serde_json::from_str(body).map_err(|e| MarketError::Parse(e.to_string()))?;

    if let Some(err) = json.chart.error {
        return Err(MarketError::Unknown(err.description));
    }

    let result = json
        .chart
        .result
        .and_then(|mut results| results.pop())
        .ok_or(MarketError::NotFound)?;

    let last_close = result
        .indicators
        .as_ref()
        .and_then(|ind| ind.quote.first())
        .and_then(|quote| quote.close.iter().rev().find_map(|c| *c));

    [result.meta.regular_market_price, last_close]
        .into_iter()
        .flatten()
        .find(|price| price.is_finite() && *price > 0.0)
        .ok_or(MarketError::NotFound)
}

#[async_trait]
impl PriceSource for YahooProvider {
    /// # Summary
    /// Fetches the latest price of `instrument`.
    ///
    /// # Logic
    /// 1. GET `{base}/v8/finance/chart/{symbol}?interval=1m&range=1d`.
    /// 2. Non-success status becomes `MarketError::Network`.
    /// 3. Body is handed to `parse_chart`.
    async fn fetch_price(&self, instrument: &Instrument) -> Result<f64, MarketError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, instrument.symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[("interval", "1m"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let price = parse_chart(&body)?;
        debug!("{} quoted at {}", instrument.symbol, price);
        Ok(price)
    }
}
