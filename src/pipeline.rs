//! Runs one analysis: load quotes, fetch market data, convert, window, analyze.

use crate::core::analytics::{self, AnalysisResult};
use crate::core::convert::ConvertedMarket;
use crate::core::error::Result;
use crate::core::market::{MarketSeries, MarketSeriesSource, SeriesProvider};
use crate::core::period::Period;
use crate::core::quote::{QuoteColumns, QuoteHistory};
use crate::core::window::trailing_window;
use std::path::Path;
use tracing::{debug, info};

/// Windows both inputs to `period` and derives the deviation metrics.
pub fn evaluate(
    history: &QuoteHistory,
    market: MarketSeries,
    period: Period,
) -> Result<AnalysisResult> {
    let market = ConvertedMarket::new(market);
    let quotes_window = trailing_window(history.points(), period);
    let market_window = trailing_window(market.converted(), period);
    debug!(
        "Window {}: {} of {} quotes, {} of {} market points",
        period,
        quotes_window.len(),
        history.len(),
        market_window.len(),
        market.converted().len()
    );

    analytics::analyze(period, &quotes_window, &market_window, &market)
}

/// Full pipeline for one invocation. Each failure kind propagates unchanged.
pub async fn analyze<P: SeriesProvider>(
    quotes_path: &Path,
    columns: &QuoteColumns,
    source: &MarketSeriesSource<P>,
    period: Period,
) -> Result<AnalysisResult> {
    info!(
        "Analyzing {} against {} over {}",
        quotes_path.display(),
        source.instruments(),
        period
    );
    let history = QuoteHistory::load(quotes_path, columns)?;
    let market = source.fetch(period).await?;
    evaluate(&history, market, period)
}
