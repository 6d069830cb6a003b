use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::core::market::{DailyClose, SeriesProvider};
use crate::core::period::Period;

/// How bar timestamps map to the exchange's calendar.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ExchangeClock {
    /// Named zone; the offset in force at each instant is applied.
    Zone(Tz),
    /// Only the response's current offset is known, in seconds.
    Fixed(i64),
}

impl ExchangeClock {
    fn from_meta(meta: &ChartMeta) -> Self {
        match meta.exchange_timezone_name.as_deref() {
            Some(name) => match name.parse::<Tz>() {
                Ok(tz) => ExchangeClock::Zone(tz),
                Err(_) => {
                    warn!(timezone = name, "Unknown exchange timezone, using gmtoffset");
                    ExchangeClock::Fixed(meta.gmtoffset.unwrap_or(0))
                }
            },
            None => ExchangeClock::Fixed(meta.gmtoffset.unwrap_or(0)),
        }
    }

    fn date_of(&self, timestamp: i64) -> Option<NaiveDate> {
        let instant = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        Some(match self {
            ExchangeClock::Zone(tz) => instant.with_timezone(tz).date_naive(),
            ExchangeClock::Fixed(offset) => (instant + Duration::seconds(*offset)).date_naive(),
        })
    }
}

/// Maps bar timestamps to the exchange's calendar date and pairs them with
/// their closes. Null closes are skipped; for repeated dates the last bar wins.
fn extract_daily_closes(chart_item: &ChartItem) -> Vec<DailyClose> {
    let (Some(timestamps), Some(closes)) = (
        chart_item.timestamp.as_ref(),
        chart_item
            .indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return Vec::new();
    };

    let clock = ExchangeClock::from_meta(&chart_item.meta);
    let mut by_date = BTreeMap::new();
    for (ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close.filter(|c| c.is_finite() && *c > 0.0) else {
            continue;
        };
        if let Some(date) = clock.date_of(*ts) {
            by_date.insert(date, close);
        }
    }

    by_date
        .into_iter()
        .map(|(date, close)| DailyClose { date, close })
        .collect()
}

pub struct YahooFinanceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("goldspread/1.0")
            .timeout(timeout)
            .build()?;
        Ok(YahooFinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    gmtoffset: Option<i64>,
    exchange_timezone_name: Option<String>,
}

#[async_trait]
impl SeriesProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooSeriesFetch",
        skip(self),
        fields(symbol = %symbol, period = %period)
    )]
    async fn fetch_daily_closes(&self, symbol: &str, period: Period) -> Result<Vec<DailyClose>> {
        let now = Utc::now();
        // One extra day so the first bar of the window is not cut by time of day
        let start = now - period.to_duration() - Duration::days(1);
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&period1={}&period2={}",
            self.base_url,
            symbol,
            start.timestamp(),
            now.timestamp()
        );
        debug!("Requesting daily closes from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let item = data
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No chart data found for symbol: {}", symbol))?;

        let closes = extract_daily_closes(&item);
        if closes.is_empty() {
            return Err(anyhow!("No daily closes found for symbol: {}", symbol));
        }
        debug!("Received {} daily closes for {}", closes.len(), symbol);
        Ok(closes)
    }
}
