use super::ui;
use crate::core::analytics::AnalysisResult;
use crate::core::market::{MarketSeriesSource, SeriesProvider};
use crate::core::period::Period;
use crate::core::quote::QuoteColumns;
use anyhow::Result;
use comfy_table::Cell;
use std::path::Path;

impl AnalysisResult {
    /// Renders the reference price and bank quote panel.
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Metric"),
            ui::header_cell("Value"),
            ui::header_cell("vs. Reference"),
        ]);

        table.add_row(vec![
            Cell::new("Exchange rate"),
            ui::format_optional_cell(self.latest_exchange_rate, |v| format!("{v:.2}")),
            Cell::new(""),
        ]);
        table.add_row(vec![
            Cell::new("Spot gold (per oz)"),
            ui::format_optional_cell(self.latest_foreign_spot_price, |v| format!("{v:.1}")),
            Cell::new(""),
        ]);
        table.add_row(vec![
            Cell::new("International reference (per g)"),
            ui::format_optional_cell(self.latest_international_price, ui::format_price),
            Cell::new(""),
        ]);
        table.add_row(vec![
            Cell::new("Bank sells at (you buy)"),
            ui::format_optional_cell(self.latest_quote.map(|q| q.bank_sell), ui::format_price),
            ui::deviation_cell(self.latest_sell_premium),
        ]);
        table.add_row(vec![
            Cell::new("Bank buys at (you sell)"),
            ui::format_optional_cell(self.latest_quote.map(|q| q.bank_buy), ui::format_price),
            ui::deviation_cell(self.latest_buy_discount),
        ]);

        let mut output = format!(
            "Gold spread: {}\n\n",
            ui::style_text(&self.period.to_string(), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let quote_date = self
            .latest_quote
            .map_or("N/A".to_string(), |q| q.date.to_string());
        let market_date = self
            .raw_market_full
            .latest()
            .map_or("N/A".to_string(), |p| p.date.to_string());
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!("Bank quote as of {quote_date}, market close as of {market_date}"),
                ui::StyleType::Subtle
            )
        ));

        match &self.stats {
            Some(stats) => output.push_str(&format!(
                "\n\n{} over {} aligned days: premium {:+.1} ({:+.1} to {:+.1}), discount {:+.1} ({:+.1} to {:+.1})",
                ui::style_text("Average", ui::StyleType::TotalLabel),
                stats.days,
                stats.mean_sell_premium,
                stats.min_sell_premium,
                stats.max_sell_premium,
                stats.mean_buy_discount,
                stats.min_buy_discount,
                stats.max_buy_discount,
            )),
            None if self.quotes_window.is_empty() => output.push_str(&format!(
                "\n\n{}",
                ui::style_text("No local quotes in the selected window", ui::StyleType::Error)
            )),
            None => output.push_str(&format!(
                "\n\n{}",
                ui::style_text(
                    "No days common to bank quotes and market data",
                    ui::StyleType::Error
                )
            )),
        }

        output
    }
}

pub async fn run<P: SeriesProvider>(
    quotes_path: &Path,
    columns: &QuoteColumns,
    source: &MarketSeriesSource<P>,
    period: Period,
    json: bool,
) -> Result<()> {
    let result = super::analyze_with_progress(quotes_path, columns, source, period).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.display_as_table());
    }
    Ok(())
}
