//! Converts per-ounce foreign prices into local currency per gram.

use crate::core::market::{MarketPoint, MarketSeries};
use crate::core::window::Dated;
use chrono::NaiveDate;
use serde::Serialize;

pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

/// International reference price for one day, in local currency per gram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvertedMarketPoint {
    pub date: NaiveDate,
    pub local_price_per_gram: f64,
}

impl Dated for ConvertedMarketPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

pub fn local_price_per_gram(spot_price_foreign: f64, exchange_rate: f64) -> f64 {
    spot_price_foreign * exchange_rate / GRAMS_PER_TROY_OUNCE
}

impl From<&MarketPoint> for ConvertedMarketPoint {
    fn from(point: &MarketPoint) -> Self {
        ConvertedMarketPoint {
            date: point.date,
            local_price_per_gram: local_price_per_gram(
                point.spot_price_foreign,
                point.exchange_rate,
            ),
        }
    }
}

/// Element-wise conversion; output has the same length and date order as the input.
pub fn convert_series(series: &MarketSeries) -> Vec<ConvertedMarketPoint> {
    series.points().iter().map(ConvertedMarketPoint::from).collect()
}

/// A market series paired with its per-gram conversion, computed once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedMarket {
    raw: MarketSeries,
    converted: Vec<ConvertedMarketPoint>,
}

impl ConvertedMarket {
    pub fn new(raw: MarketSeries) -> Self {
        let converted = convert_series(&raw);
        ConvertedMarket { raw, converted }
    }

    pub fn raw(&self) -> &MarketSeries {
        &self.raw
    }

    pub fn converted(&self) -> &[ConvertedMarketPoint] {
        &self.converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn test_point_conversion_round_trip() {
        for (spot, rate) in [(2650.4, 32.85), (1.0, 1.0), (4321.9, 29.1), (0.5, 150.0)] {
            let per_gram = local_price_per_gram(spot, rate);
            assert!((per_gram * GRAMS_PER_TROY_OUNCE - spot * rate).abs() < 1e-9);
        }
    }

    #[test]
    fn test_known_value() {
        // 2000 USD/oz at 31.1035 TWD/USD is exactly 2000 TWD/g
        assert!((local_price_per_gram(2000.0, 31.1035) - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_series_conversion_preserves_dates_and_order() {
        let series = MarketSeries::new(vec![
            MarketPoint {
                date: date(2),
                exchange_rate: 32.0,
                spot_price_foreign: 2600.0,
            },
            MarketPoint {
                date: date(5),
                exchange_rate: 32.5,
                spot_price_foreign: 2610.0,
            },
        ]);

        let converted = convert_series(&series);
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].date, date(2));
        assert_eq!(converted[1].date, date(5));
        assert_eq!(
            converted[1].local_price_per_gram,
            local_price_per_gram(2610.0, 32.5)
        );
    }

    #[test]
    fn test_empty_series() {
        assert!(convert_series(&MarketSeries::default()).is_empty());
        assert!(ConvertedMarket::default().converted().is_empty());
    }

    #[test]
    fn test_converted_market_keeps_raw_and_converted_in_step() {
        let raw = MarketSeries::new(vec![MarketPoint {
            date: date(6),
            exchange_rate: 31.1035,
            spot_price_foreign: 4500.0,
        }]);

        let market = ConvertedMarket::new(raw.clone());
        assert_eq!(market.raw(), &raw);
        assert_eq!(market.converted(), convert_series(&raw).as_slice());
        assert!((market.converted()[0].local_price_per_gram - 4500.0).abs() < 1e-9);
    }
}
