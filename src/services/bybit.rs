//! Bybit v5 public REST market data provider

use crate::config;
use crate::error::FetchError;
use crate::models::series::{Entity, Sample, SeriesWindow};
use crate::models::signal::MarketInfo;
use crate::services::market_data::MarketDataProvider;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Bybit caps kline requests at this many rows
pub const MAX_KLINE_LIMIT: usize = 1000;

/// Largest page instruments-info serves for linear contracts
pub const INSTRUMENTS_PAGE_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    ret_code: i64,
    ret_msg: String,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentsResult {
    #[serde(default)]
    list: Vec<Instrument>,
    #[serde(default)]
    next_page_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
    symbol: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    leverage_filter: Option<LeverageFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeverageFilter {
    max_leverage: String,
}

pub struct BybitRestClient {
    base_url: String,
    client: reqwest::Client,
    category: String,
    interval: String,
}

impl BybitRestClient {
    /// Client whose requests give up after `request_timeout`
    pub fn new(interval: &str, request_timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| FetchError::Provider(format!("failed to build HTTP client: {}", e)))?;
        Self::with_client(config::get_bybit_base_url(), client, interval)
    }

    /// Use an explicit base URL and client (tests point this at a mock server)
    pub fn with_client(base_url: String, client: reqwest::Client, interval: &str) -> Result<Self, FetchError> {
        let interval = to_bybit_interval(interval)
            .ok_or_else(|| FetchError::Provider(format!("unsupported interval '{}'", interval)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            category: "linear".to_string(),
            interval,
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(started.elapsed().as_millis() as u64)
                } else {
                    FetchError::Provider(format!("request to {} failed: {}", path, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Provider(format!("{} returned HTTP {}", path, status)));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedPayload(format!("{}: {}", path, e)))?;

        if envelope.ret_code != 0 {
            return Err(FetchError::Provider(format!(
                "{} retCode {}: {}",
                path, envelope.ret_code, envelope.ret_msg
            )));
        }
        envelope
            .result
            .ok_or_else(|| FetchError::MalformedPayload(format!("{}: missing result", path)))
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for BybitRestClient {
    async fn fetch_window(&self, entity: &Entity, window_size: usize) -> Result<SeriesWindow, FetchError> {
        let limit = window_size.clamp(1, MAX_KLINE_LIMIT);
        let result: KlineResult = self
            .get(
                "/v5/market/kline",
                &[
                    ("category", self.category.clone()),
                    ("symbol", entity.as_str().to_string()),
                    ("interval", self.interval.clone()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let mut samples = result
            .list
            .iter()
            .map(|row| parse_kline_row(row))
            .collect::<Result<Vec<_>, _>>()?;
        // Bybit lists newest first
        samples.sort_by_key(|s| s.timestamp);

        debug!(entity = %entity, count = samples.len(), "Bybit: fetched {} klines for {}", samples.len(), entity);
        Ok(SeriesWindow::new(entity.clone(), samples))
    }

    async fn load_markets(&self) -> Result<Vec<MarketInfo>, FetchError> {
        let mut markets = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![
                ("category", self.category.clone()),
                ("limit", INSTRUMENTS_PAGE_LIMIT.to_string()),
            ];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.clone()));
            }

            let page: InstrumentsResult = self.get("/v5/market/instruments-info", &query).await?;
            for instrument in page.list {
                if instrument.status.as_deref().is_some_and(|s| s != "Trading") {
                    continue;
                }
                let max_leverage = instrument
                    .leverage_filter
                    .and_then(|f| f.max_leverage.parse::<f64>().ok());
                markets.push(MarketInfo {
                    entity: Entity::new(instrument.symbol),
                    max_leverage,
                });
            }

            match page.next_page_cursor.filter(|c| !c.is_empty()) {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                _ => break,
            }
        }

        debug!(count = markets.len(), "Bybit: loaded {} markets", markets.len());
        Ok(markets)
    }
}

fn parse_kline_row(row: &[String]) -> Result<Sample, FetchError> {
    if row.len() < 6 {
        return Err(FetchError::MalformedPayload(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }
    let num = |i: usize, name: &str| -> Result<f64, FetchError> {
        row[i]
            .parse::<f64>()
            .map_err(|e| FetchError::MalformedPayload(format!("invalid {} '{}': {}", name, row[i], e)))
    };
    let turnover = row
        .get(6)
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|e| FetchError::MalformedPayload(format!("invalid turnover '{}': {}", raw, e)))
        })
        .transpose()?;
    let timestamp = row[0]
        .parse::<i64>()
        .map_err(|e| FetchError::MalformedPayload(format!("invalid start time '{}': {}", row[0], e)))?;

    let sample = Sample::new(
        timestamp,
        num(1, "open")?,
        num(2, "high")?,
        num(3, "low")?,
        num(4, "close")?,
        num(5, "volume")?,
    );
    Ok(match turnover {
        Some(t) => sample.with_turnover(t),
        None => sample,
    })
}

/// Map `5m`/`1h`/`1d`/`1w` to Bybit's interval codes
pub fn to_bybit_interval(interval: &str) -> Option<String> {
    let minutes = config_minutes(interval)?;
    match minutes {
        1 | 3 | 5 | 15 | 30 | 60 | 120 | 240 | 360 | 720 => Some(minutes.to_string()),
        1440 => Some("D".to_string()),
        10080 => Some("W".to_string()),
        _ => None,
    }
}

fn config_minutes(interval: &str) -> Option<i64> {
    crate::common::time::parse_interval_millis(interval).map(|ms| ms / 60_000)
}
