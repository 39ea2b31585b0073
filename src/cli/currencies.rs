use crate::core::ExchangeRateProvider;
use crate::core::state::CURRENCIES_ERROR;
use anyhow::{Context, Result};

/// Prints the available currencies, one per line, in service order.
pub async fn run(provider: &(dyn ExchangeRateProvider + Send + Sync)) -> Result<()> {
    let currencies = provider.fetch_currencies().await.context(CURRENCIES_ERROR)?;
    for currency in currencies {
        println!("{currency}");
    }
    Ok(())
}
