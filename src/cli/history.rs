use super::ui;
use crate::core::analytics::AnalysisResult;
use crate::core::market::{MarketSeriesSource, SeriesProvider};
use crate::core::period::Period;
use crate::core::quote::QuoteColumns;
use anyhow::Result;
use comfy_table::Cell;
use std::path::Path;

impl AnalysisResult {
    /// Renders the day-by-day deviation of the bank's quotes, oldest first.
    pub fn display_history_table(&self) -> String {
        let mut output = format!(
            "Premium/discount history: {}\n\n",
            ui::style_text(&self.period.to_string(), ui::StyleType::Title)
        );

        if self.aligned_series.is_empty() {
            output.push_str(&ui::style_text(
                "No days common to bank quotes and market data",
                ui::StyleType::Error,
            ));
            return output;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Sell premium"),
            ui::header_cell("Buy discount"),
        ]);
        for point in &self.aligned_series {
            table.add_row(vec![
                Cell::new(point.date.to_string()),
                ui::deviation_cell(Some(point.sell_premium)),
                ui::deviation_cell(Some(point.buy_discount)),
            ]);
        }
        output.push_str(&table.to_string());

        if let Some(stats) = &self.stats {
            output.push_str(&format!(
                "\n\n{}: premium {:+.1}, discount {:+.1} over {} days",
                ui::style_text("Mean", ui::StyleType::TotalLabel),
                stats.mean_sell_premium,
                stats.mean_buy_discount,
                stats.days
            ));
        }
        output
    }
}

pub async fn run<P: SeriesProvider>(
    quotes_path: &Path,
    columns: &QuoteColumns,
    source: &MarketSeriesSource<P>,
    period: Period,
) -> Result<()> {
    let result = super::analyze_with_progress(quotes_path, columns, source, period).await?;
    println!("{}", result.display_history_table());
    Ok(())
}
