//! Aligns bank quotes with the international reference price and derives
//! premium/discount metrics.
//!
//! Sign convention: `bank price - reference`. A positive sell premium means
//! buying from the bank costs more than the reference; the buy discount is
//! usually negative because the bank buys back below the reference.
use crate::core::convert::{ConvertedMarket, ConvertedMarketPoint};
use crate::core::error::{AnalysisError, Result};
use crate::core::market::MarketSeries;
use crate::core::period::Period;
use crate::core::quote::QuotePoint;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// A day present in both the quote series and the converted market series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPoint {
    pub date: NaiveDate,
    pub bank_sell: f64,
    pub bank_buy: f64,
    pub local_price_per_gram: f64,
}

impl AlignedPoint {
    pub fn sell_premium(&self) -> f64 {
        self.bank_sell - self.local_price_per_gram
    }

    pub fn buy_discount(&self) -> f64 {
        self.bank_buy - self.local_price_per_gram
    }
}

/// Deviation of the bank's quotes from the reference on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviationPoint {
    pub date: NaiveDate,
    pub sell_premium: f64,
    pub buy_discount: f64,
}

impl From<&AlignedPoint> for DeviationPoint {
    fn from(point: &AlignedPoint) -> Self {
        DeviationPoint {
            date: point.date,
            sell_premium: point.sell_premium(),
            buy_discount: point.buy_discount(),
        }
    }
}

/// Summary of the deviation history over the aligned window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviationStats {
    pub days: usize,
    pub mean_sell_premium: f64,
    pub min_sell_premium: f64,
    pub max_sell_premium: f64,
    pub mean_buy_discount: f64,
    pub min_buy_discount: f64,
    pub max_buy_discount: f64,
}

impl DeviationStats {
    /// Returns `None` for an empty series.
    pub fn from_series(series: &[DeviationPoint]) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let days = series.len();
        let (sell_sum, min_sell, max_sell) = sum_min_max(series.iter().map(|p| p.sell_premium));
        let (buy_sum, min_buy, max_buy) = sum_min_max(series.iter().map(|p| p.buy_discount));

        Some(DeviationStats {
            days,
            mean_sell_premium: sell_sum / days as f64,
            min_sell_premium: min_sell,
            max_sell_premium: max_sell,
            mean_buy_discount: buy_sum / days as f64,
            min_buy_discount: min_buy,
            max_buy_discount: max_buy,
        })
    }
}

fn sum_min_max(values: impl Iterator<Item = f64>) -> (f64, f64, f64) {
    values.fold(
        (0.0, f64::INFINITY, f64::NEG_INFINITY),
        |(sum, min, max), v| (sum + v, min.min(v), max.max(v)),
    )
}

/// Output of one analysis run. Immutable once built.
///
/// Any `None` metric means the value could not be derived from the inputs;
/// it never stands in for zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub period: Period,
    /// Latest reference price, local currency per gram.
    pub latest_international_price: Option<f64>,
    pub latest_sell_premium: Option<f64>,
    pub latest_buy_discount: Option<f64>,
    pub latest_exchange_rate: Option<f64>,
    /// Foreign currency per troy ounce.
    pub latest_foreign_spot_price: Option<f64>,
    pub latest_quote: Option<QuotePoint>,
    pub aligned_series: Vec<DeviationPoint>,
    pub stats: Option<DeviationStats>,
    pub quotes_window: Vec<QuotePoint>,
    pub converted_market_full: Vec<ConvertedMarketPoint>,
    pub raw_market_full: MarketSeries,
}

/// Inner join on exact date equality, ascending by date.
pub fn align(quotes: &[QuotePoint], converted: &[ConvertedMarketPoint]) -> Vec<AlignedPoint> {
    let reference_by_date: HashMap<NaiveDate, f64> = converted
        .iter()
        .map(|p| (p.date, p.local_price_per_gram))
        .collect();

    let mut aligned: Vec<AlignedPoint> = quotes
        .iter()
        .filter_map(|quote| {
            reference_by_date
                .get(&quote.date)
                .map(|reference| AlignedPoint {
                    date: quote.date,
                    bank_sell: quote.bank_sell,
                    bank_buy: quote.bank_buy,
                    local_price_per_gram: *reference,
                })
        })
        .collect();
    aligned.sort_by_key(|p| p.date);
    aligned
}

/// Builds the [`AnalysisResult`] for already windowed inputs.
///
/// `quotes` and `converted` are the windowed series; `market` is the
/// unwindowed snapshot kept for charting. Fails with
/// [`AnalysisError::InsufficientData`] only when both windowed series are empty.
pub fn analyze(
    period: Period,
    quotes: &[QuotePoint],
    converted: &[ConvertedMarketPoint],
    market: &ConvertedMarket,
) -> Result<AnalysisResult> {
    if quotes.is_empty() && converted.is_empty() {
        return Err(AnalysisError::InsufficientData);
    }

    let aligned = align(quotes, converted);
    let aligned_series: Vec<DeviationPoint> = aligned.iter().map(DeviationPoint::from).collect();
    debug!(
        quotes = quotes.len(),
        market = converted.len(),
        aligned = aligned_series.len(),
        "Aligned quote and market series"
    );

    let latest_international_price = converted.last().map(|p| p.local_price_per_gram);
    let latest_quote = quotes.last().copied();

    let (latest_sell_premium, latest_buy_discount) =
        match (latest_quote, latest_international_price) {
            (Some(quote), Some(reference)) if !aligned.is_empty() => (
                Some(quote.bank_sell - reference),
                Some(quote.bank_buy - reference),
            ),
            _ => (None, None),
        };

    let latest_market = market.raw().latest();

    Ok(AnalysisResult {
        period,
        latest_international_price,
        latest_sell_premium,
        latest_buy_discount,
        latest_exchange_rate: latest_market.map(|p| p.exchange_rate),
        latest_foreign_spot_price: latest_market.map(|p| p.spot_price_foreign),
        latest_quote,
        stats: DeviationStats::from_series(&aligned_series),
        aligned_series,
        quotes_window: quotes.to_vec(),
        converted_market_full: market.converted().to_vec(),
        raw_market_full: market.raw().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::convert::local_price_per_gram;
    use crate::core::market::MarketPoint;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn quote(d: u32, bank_sell: f64, bank_buy: f64) -> QuotePoint {
        QuotePoint {
            date: date(d),
            bank_sell,
            bank_buy,
        }
    }

    fn reference(d: u32, local_price_per_gram: f64) -> ConvertedMarketPoint {
        ConvertedMarketPoint {
            date: date(d),
            local_price_per_gram,
        }
    }

    fn market(d: u32, exchange_rate: f64, spot_price_foreign: f64) -> MarketPoint {
        MarketPoint {
            date: date(d),
            exchange_rate,
            spot_price_foreign,
        }
    }

    #[test]
    fn test_align_is_inner_join() {
        let quotes = vec![quote(3, 30.0, 29.0), quote(1, 10.0, 9.0), quote(2, 20.0, 19.0)];
        let converted = vec![reference(4, 4.0), reference(3, 3.0), reference(2, 2.0)];

        let aligned = align(&quotes, &converted);
        let dates: Vec<_> = aligned.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2), date(3)]);
        assert_eq!(aligned[0].local_price_per_gram, 2.0);
        assert_eq!(aligned[1].bank_sell, 30.0);
    }

    #[test]
    fn test_sign_convention() {
        let quotes = vec![quote(5, 2000.0, 1900.0)];
        let converted = vec![reference(5, 1950.0)];
        let raw = MarketSeries::new(vec![market(5, 31.1035, 1950.0)]);

        let market = ConvertedMarket::new(raw);
        let result = analyze(Period::OneMonth, &quotes, &converted, &market).unwrap();
        assert_eq!(result.latest_sell_premium, Some(50.0));
        assert_eq!(result.latest_buy_discount, Some(-50.0));
        assert_eq!(
            result.aligned_series,
            vec![DeviationPoint {
                date: date(5),
                sell_premium: 50.0,
                buy_discount: -50.0,
            }]
        );
    }

    #[test]
    fn test_latest_metrics_use_last_points() {
        let quotes = vec![quote(5, 2000.0, 1900.0), quote(6, 2010.0, 1905.0)];
        let converted = vec![reference(5, 1950.0), reference(6, 1960.0), reference(7, 1970.0)];
        let raw = MarketSeries::new(vec![
            market(5, 32.0, 2600.0),
            market(6, 32.1, 2610.0),
            market(7, 32.2, 2620.0),
        ]);

        let market = ConvertedMarket::new(raw);
        let result = analyze(Period::OneMonth, &quotes, &converted, &market).unwrap();
        assert_eq!(result.latest_international_price, Some(1970.0));
        assert_eq!(result.latest_sell_premium, Some(40.0));
        assert_eq!(result.latest_buy_discount, Some(-65.0));
        assert_eq!(result.latest_exchange_rate, Some(32.2));
        assert_eq!(result.latest_foreign_spot_price, Some(2620.0));
        assert_eq!(result.latest_quote, Some(quote(6, 2010.0, 1905.0)));
        assert_eq!(result.aligned_series.len(), 2);
        assert_eq!(result.converted_market_full.len(), 3);
        assert_eq!(
            result.converted_market_full[2].local_price_per_gram,
            local_price_per_gram(2620.0, 32.2)
        );
    }

    #[test]
    fn test_empty_market_falls_back_without_premiums() {
        let quotes = vec![quote(5, 2000.0, 1900.0)];

        let result = analyze(Period::OneMonth, &quotes, &[], &ConvertedMarket::default()).unwrap();
        assert!(result.aligned_series.is_empty());
        assert_eq!(result.latest_sell_premium, None);
        assert_eq!(result.latest_buy_discount, None);
        assert_eq!(result.latest_international_price, None);
        assert_eq!(result.stats, None);
        assert_eq!(result.latest_quote, Some(quote(5, 2000.0, 1900.0)));
    }

    #[test]
    fn test_disjoint_dates_report_market_without_premiums() {
        let quotes = vec![quote(5, 2000.0, 1900.0)];
        let converted = vec![reference(6, 1950.0)];
        let raw = MarketSeries::new(vec![market(6, 31.1035, 1950.0)]);

        let market = ConvertedMarket::new(raw);
        let result = analyze(Period::OneMonth, &quotes, &converted, &market).unwrap();
        assert!(result.aligned_series.is_empty());
        assert_eq!(result.latest_international_price, Some(1950.0));
        assert_eq!(result.latest_exchange_rate, Some(31.1035));
        assert_eq!(result.latest_sell_premium, None);
        assert_eq!(result.latest_buy_discount, None);
    }

    #[test]
    fn test_market_only_is_partial_result() {
        let converted = vec![reference(6, 1950.0)];
        let raw = MarketSeries::new(vec![market(6, 31.1035, 1950.0)]);

        let market = ConvertedMarket::new(raw);
        let result = analyze(Period::OneYear, &[], &converted, &market).unwrap();
        assert_eq!(result.latest_international_price, Some(1950.0));
        assert_eq!(result.latest_quote, None);
        assert_eq!(result.latest_sell_premium, None);
        assert!(result.quotes_window.is_empty());
    }

    #[test]
    fn test_both_empty_is_insufficient_data() {
        let result = analyze(Period::OneMonth, &[], &[], &ConvertedMarket::default());
        assert_eq!(result.unwrap_err(), AnalysisError::InsufficientData);
    }

    #[test]
    fn test_deviation_stats() {
        let series = vec![
            DeviationPoint {
                date: date(1),
                sell_premium: 40.0,
                buy_discount: -60.0,
            },
            DeviationPoint {
                date: date(2),
                sell_premium: 60.0,
                buy_discount: -40.0,
            },
        ];
        let stats = DeviationStats::from_series(&series).unwrap();
        assert_eq!(stats.days, 2);
        assert_eq!(stats.mean_sell_premium, 50.0);
        assert_eq!(stats.min_sell_premium, 40.0);
        assert_eq!(stats.max_sell_premium, 60.0);
        assert_eq!(stats.mean_buy_discount, -50.0);
        assert_eq!(stats.min_buy_discount, -60.0);
        assert_eq!(stats.max_buy_discount, -40.0);
        assert!(DeviationStats::from_series(&[]).is_none());
    }
}
