//! Failure kinds surfaced by the analysis pipeline.

use thiserror::Error;

/// Errors returned by the core components.
///
/// Upstream causes (I/O, HTTP, JSON) are logged where they happen and
/// collapsed into one of these kinds; callers match on the kind to pick a
/// user-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The local quote file is missing or unreadable under every encoding.
    #[error("quote history unavailable: {0}")]
    DataUnavailable(String),

    /// The quote file decoded but lacks required columns, or no row has a valid date.
    #[error("quote history schema error: {0}")]
    Schema(String),

    /// The market data fetch failed, timed out, or returned no rows.
    #[error("market data unavailable for {instruments}")]
    MarketUnavailable { instruments: String },

    /// Both the quote series and the market series are empty after windowing.
    #[error("no quote or market data in the selected window")]
    InsufficientData,
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
