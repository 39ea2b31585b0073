pub mod cli;
pub mod core;
pub mod providers;

use crate::core::RateColumn;
use crate::core::config::AppConfig;
use crate::providers::rates_api::RatesApiProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Browse,
    Currencies,
    Rates {
        currency: String,
        sort: Option<RateColumn>,
        descending: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Exchange rates viewer starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = RatesApiProvider::new(&config.base_url, config.accept_invalid_certs)?;

    match command {
        AppCommand::Browse => cli::browse::run(Arc::new(provider), config.stale_responses).await,
        AppCommand::Currencies => cli::currencies::run(&provider).await,
        AppCommand::Rates {
            currency,
            sort,
            descending,
        } => {
            cli::rates::run(
                &provider,
                &currency,
                sort,
                descending,
                config.stale_responses,
            )
            .await
        }
    }
}
