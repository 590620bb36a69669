use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use goldwatch::core::derive::CalcInput;
use goldwatch::core::log::init_logging;
use goldwatch::core::units::WeightUnit;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Display currency, overrides the configured one
    #[arg(long, global = true)]
    currency: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for goldwatch::AppCommand {
    fn from(cmd: Commands) -> goldwatch::AppCommand {
        match cmd {
            Commands::Show { json } => goldwatch::AppCommand::Show { json },
            Commands::Watch => goldwatch::AppCommand::Watch,
            Commands::Calc {
                weight,
                unit,
                karat,
            } => goldwatch::AppCommand::Calc(CalcInput {
                weight,
                unit,
                karat,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch prices once and display them
    Show {
        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep prices updated; press Enter to refresh
    Watch,
    /// Value a quantity of gold
    Calc {
        /// Weight of gold
        #[arg(short, long, default_value_t = 1.0)]
        weight: f64,
        /// Weight unit: gram, ounce or kg
        #[arg(short, long, default_value = "gram")]
        unit: WeightUnit,
        /// Karat of the gold
        #[arg(short, long, default_value_t = 21)]
        karat: u8,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => goldwatch::cli::setup::setup(),
        Some(cmd) => {
            goldwatch::run_command(
                cmd.into(),
                cli.config_path.as_deref(),
                cli.currency.as_deref(),
            )
            .await
        }
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
