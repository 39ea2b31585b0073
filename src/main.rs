use anyhow::Result;
use clap::{Parser, Subcommand};
use xrates::core::RateColumn;
use xrates::core::log::init_logging;

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

impl From<Commands> for xrates::AppCommand {
    fn from(cmd: Commands) -> xrates::AppCommand {
        match cmd {
            Commands::Browse => xrates::AppCommand::Browse,
            Commands::Currencies => xrates::AppCommand::Currencies,
            Commands::Rates {
                currency,
                sort,
                desc,
            } => xrates::AppCommand::Rates {
                currency,
                sort,
                descending: desc,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Browse exchange rates interactively (default)
    Browse,
    /// List available currencies
    Currencies,
    /// Display exchange rates for a base currency
    Rates {
        /// Base currency code, e.g. USD
        currency: String,

        /// Column to sort by: base-currency, currency or exchange-rate
        #[arg(short, long)]
        sort: Option<RateColumn>,

        /// Sort in descending order
        #[arg(long, requires = "sort")]
        desc: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xrates::cli::setup::setup(),
        Some(cmd) => xrates::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => xrates::run_command(xrates::AppCommand::Browse, cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
