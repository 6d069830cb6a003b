pub mod cli;
pub mod core;
pub mod pipeline;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::market::MarketSeriesSource;
use crate::core::period::Period;
use crate::providers::caching::CachingSeriesProvider;
use crate::providers::yahoo_finance::YahooFinanceProvider;
use anyhow::Result;
use tracing::{debug, info};

/// Commands that run an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Latest reference price and bank premium/discount.
    Report { period: Option<Period>, json: bool },
    /// Deviation of the bank's quotes over the aligned window.
    History { period: Option<Period> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Gold spread tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let yahoo = &config.providers.yahoo;
    let provider = CachingSeriesProvider::new(YahooFinanceProvider::new(
        &yahoo.base_url,
        yahoo.timeout(),
    )?);
    let source = MarketSeriesSource::new(provider, config.instruments.clone());
    let quotes_path = config.quotes_path();
    let columns = &config.quotes.columns;

    match command {
        AppCommand::Report { period, json } => {
            let period = period.unwrap_or(config.period);
            cli::report::run(&quotes_path, columns, &source, period, json).await
        }
        AppCommand::History { period } => {
            let period = period.unwrap_or(config.period);
            cli::history::run(&quotes_path, columns, &source, period).await
        }
    }
}
