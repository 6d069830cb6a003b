//! Market data abstractions: daily close providers and the combined
//! exchange-rate + spot-price snapshot.

use crate::core::error::{AnalysisError, Result};
use crate::core::period::Period;
use crate::core::window::Dated;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One daily close for a single instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Fetches daily closes for one instrument over a trailing period.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        period: Period,
    ) -> anyhow::Result<Vec<DailyClose>>;
}

/// Market state for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketPoint {
    pub date: NaiveDate,
    /// Local currency per unit of foreign currency.
    pub exchange_rate: f64,
    /// Foreign currency per troy ounce.
    pub spot_price_foreign: f64,
}

impl Dated for MarketPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Date-ordered market points with unique dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MarketSeries {
    points: Vec<MarketPoint>,
}

impl MarketSeries {
    /// Sorts by date; for duplicate dates the last point wins.
    pub fn new(points: Vec<MarketPoint>) -> Self {
        let by_date: BTreeMap<NaiveDate, MarketPoint> =
            points.into_iter().map(|p| (p.date, p)).collect();
        MarketSeries {
            points: by_date.into_values().collect(),
        }
    }

    /// Joins the two instruments on date; days missing from either side are dropped.
    pub fn from_closes(rates: &[DailyClose], spots: &[DailyClose]) -> Self {
        let rate_by_date: BTreeMap<NaiveDate, f64> =
            rates.iter().map(|c| (c.date, c.close)).collect();
        let points = spots
            .iter()
            .filter_map(|spot| {
                rate_by_date.get(&spot.date).map(|rate| MarketPoint {
                    date: spot.date,
                    exchange_rate: *rate,
                    spot_price_foreign: spot.close,
                })
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[MarketPoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&MarketPoint> {
        self.points.last()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Instrument identifiers for the exchange rate and the commodity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruments {
    pub exchange_rate: String,
    pub commodity: String,
}

impl Default for Instruments {
    fn default() -> Self {
        Instruments {
            exchange_rate: "TWD=X".to_string(),
            commodity: "GC=F".to_string(),
        }
    }
}

impl std::fmt::Display for Instruments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.exchange_rate, self.commodity)
    }
}

/// Fetches both instruments and combines them into one [`MarketSeries`].
///
/// Every upstream failure, including an empty result, becomes
/// [`AnalysisError::MarketUnavailable`]; the cause is logged.
pub struct MarketSeriesSource<P: SeriesProvider> {
    provider: P,
    instruments: Instruments,
}

impl<P: SeriesProvider> MarketSeriesSource<P> {
    pub fn new(provider: P, instruments: Instruments) -> Self {
        MarketSeriesSource {
            provider,
            instruments,
        }
    }

    pub fn instruments(&self) -> &Instruments {
        &self.instruments
    }

    pub async fn fetch(&self, period: Period) -> Result<MarketSeries> {
        let unavailable = || AnalysisError::MarketUnavailable {
            instruments: self.instruments.to_string(),
        };

        let fetched = futures::try_join!(
            self.provider
                .fetch_daily_closes(&self.instruments.exchange_rate, period),
            self.provider
                .fetch_daily_closes(&self.instruments.commodity, period),
        );
        let (rates, spots) = fetched.map_err(|e| {
            warn!(instruments = %self.instruments, %period, "Market fetch failed: {e:#}");
            unavailable()
        })?;

        let series = MarketSeries::from_closes(&rates, &spots);
        if series.is_empty() {
            warn!(
                instruments = %self.instruments,
                %period,
                rates = rates.len(),
                spots = spots.len(),
                "Market fetch returned no common dates"
            );
            return Err(unavailable());
        }

        debug!(
            "Fetched {} market points for {} over {}",
            series.len(),
            self.instruments,
            period
        );
        Ok(series)
    }
}
