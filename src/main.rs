use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use goldspread::core::log::init_logging;
use goldspread::core::period::Period;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for goldspread::AppCommand {
    fn from(cmd: Commands) -> goldspread::AppCommand {
        match cmd {
            Commands::Report { period, json } => goldspread::AppCommand::Report { period, json },
            Commands::History { period } => goldspread::AppCommand::History { period },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the latest reference price and bank premium/discount
    Report {
        /// Trailing window: 1M, 3M, 6M, 1Y or 2Y
        #[arg(short, long)]
        period: Option<Period>,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Display the premium/discount history over the window
    History {
        /// Trailing window: 1M, 3M, 6M, 1Y or 2Y
        #[arg(short, long)]
        period: Option<Period>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => goldspread::cli::setup::setup(cli.config_path.as_deref()),
        Some(cmd) => goldspread::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
