//! Core business logic: quote loading, market data, conversion, windowing
//! and deviation analytics.

pub mod analytics;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod log;
pub mod market;
pub mod period;
pub mod quote;
pub mod window;

// Re-export main types for cleaner imports
pub use analytics::{AnalysisResult, DeviationPoint, DeviationStats};
pub use convert::{ConvertedMarket, ConvertedMarketPoint, GRAMS_PER_TROY_OUNCE};
pub use error::AnalysisError;
pub use market::{
    DailyClose, Instruments, MarketPoint, MarketSeries, MarketSeriesSource, SeriesProvider,
};
pub use period::Period;
pub use quote::{QuoteColumns, QuoteHistory, QuotePoint};
