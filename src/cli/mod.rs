pub mod history;
pub mod report;
pub mod setup;
pub mod ui;

use crate::core::analytics::AnalysisResult;
use crate::core::error::AnalysisError;
use crate::core::market::{MarketSeriesSource, SeriesProvider};
use crate::core::period::Period;
use crate::core::quote::QuoteColumns;
use crate::pipeline;
use anyhow::Result;
use std::path::Path;

/// Runs the pipeline behind a spinner and reports failures to the user.
pub(crate) async fn analyze_with_progress<P: SeriesProvider>(
    quotes_path: &Path,
    columns: &QuoteColumns,
    source: &MarketSeriesSource<P>,
    period: Period,
) -> Result<AnalysisResult> {
    let pb = ui::new_spinner(&format!("Fetching {} ({period})", source.instruments()));
    let result = pipeline::analyze(quotes_path, columns, source, period).await;
    pb.finish_and_clear();

    result.map_err(|e| {
        eprintln!(
            "{}",
            ui::style_text(&failure_message(&e, quotes_path), ui::StyleType::Error)
        );
        e.into()
    })
}

fn failure_message(error: &AnalysisError, quotes_path: &Path) -> String {
    match error {
        AnalysisError::DataUnavailable(_) => format!(
            "Could not read bank quotes from {}. Check the file path and encoding.",
            quotes_path.display()
        ),
        AnalysisError::Schema(detail) => format!(
            "Bank quote file {} has an unexpected layout: {detail}",
            quotes_path.display()
        ),
        AnalysisError::MarketUnavailable { instruments } => format!(
            "Could not fetch market data for {instruments}. Check the network connection and try again."
        ),
        AnalysisError::InsufficientData => {
            "Neither bank quotes nor market data fall in the selected window.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_per_kind() {
        let path = Path::new("quotes.csv");
        assert!(
            failure_message(&AnalysisError::DataUnavailable("gone".into()), path)
                .contains("quotes.csv")
        );
        assert!(
            failure_message(&AnalysisError::Schema("missing column 日期".into()), path)
                .contains("missing column 日期")
        );
        let market = AnalysisError::MarketUnavailable {
            instruments: "TWD=X, GC=F".into(),
        };
        assert!(failure_message(&market, path).contains("TWD=X, GC=F"));
        assert!(
            failure_message(&AnalysisError::InsufficientData, path).contains("selected window")
        );
    }
}
