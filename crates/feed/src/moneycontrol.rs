use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tickwatch_core::common::Instrument;
use tickwatch_core::config::FeedConfig;
use tickwatch_core::market::entity::{PivotLevel, PivotLevels};
use tickwatch_core::market::error::MarketError;
use tickwatch_core::market::port::PivotSource;
use tracing::{info, warn};

/// Row labels of the pivot table on a Moneycontrol quote page.
const LABELS: [(PivotLevel, &str); 7] = [
    (PivotLevel::Pp, "Pivot Point"),
    (PivotLevel::R1, "Resistance 1"),
    (PivotLevel::R2, "Resistance 2"),
    (PivotLevel::R3, "Resistance 3"),
    (PivotLevel::S1, "Support 1"),
    (PivotLevel::S2, "Support 2"),
    (PivotLevel::S3, "Support 3"),
];

/// # Summary
/// Pivot source scraping the daily pivot table of a Moneycontrol quote page.
///
/// # Invariants
/// - One compiled matcher per level, built once in `new`.
/// - A page missing any of the seven rows yields an empty mapping.
pub struct MoneycontrolProvider {
    client: Client,
    base_url: String,
    matchers: Vec<(PivotLevel, Regex)>,
}

impl MoneycontrolProvider {
    /// # Summary
    /// Creates a provider from the `[feed]` config section.
    ///
    /// # Logic
    /// 1. Builds the shared HTTP client.
    /// 2. Compiles `<td>label</td><td>value</td>` matchers for the seven labels.
    pub fn new(cfg: &FeedConfig) -> Result<Self, MarketError> {
        let matchers = LABELS
            .iter()
            .map(|(level, label)| {
                let pattern = format!(
                    r"(?is)<td[^>]*>\s*{}\s*</td>\s*<td[^>]*>\s*([^<]+?)\s*</td>",
                    regex::escape(label)
                );
                Regex::new(&pattern)
                    .map(|re| (*level, re))
                    .map_err(|e| MarketError::Parse(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            client: crate::http::build_client(cfg)?,
            base_url: cfg.pivot_base_url.trim_end_matches('/').to_string(),
            matchers,
        })
    }

    /// # Summary
    /// Extracts the seven levels from page HTML.
    ///
    /// # Logic
    /// 1. For each label, captures the text of the cell right after it.
    /// 2. Strips thousands separators and parses as `f64`.
    /// 3. Any missing or unparsable cell empties the whole result.
    pub fn parse_page(&self, html: &str) -> PivotLevels {
        let mut levels = PivotLevels::new();
        for (level, re) in &self.matchers {
            let value = re
                .captures(html)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().replace(',', "").trim().parse::<f64>().ok());
            match value {
                Some(v) => levels.insert(*level, v),
                None => {
                    warn!("Pivot level {} missing from page, check the page layout", level);
                    return PivotLevels::new();
                }
            }
        }
        levels
    }
}

#[async_trait]
impl PivotSource for MoneycontrolProvider {
    async fn fetch_pivots(&self, instrument: &Instrument) -> Result<PivotLevels, MarketError> {
        let url = format!("{}/{}", self.base_url, instrument.pivot_page);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let html = resp
            .text()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let levels = self.parse_page(&html);
        if !levels.is_empty() {
            info!(
                "📊 Pivot levels fetched for {}: PP {:?}, R1 {:?}, S1 {:?}",
                instrument.symbol,
                levels.get(PivotLevel::Pp),
                levels.get(PivotLevel::R1),
                levels.get(PivotLevel::S1)
            );
        }
        Ok(levels)
    }
}
