use super::{ui, view};
use crate::core::{
    ExchangeRateProvider, RateColumn, SortDirection, SortState, StalePolicy, ViewState,
};
use anyhow::Result;
use futures::future::join;

/// Loads the currency list and the rates for `currency` together and
/// returns the resulting view state.
pub async fn load(
    provider: &(dyn ExchangeRateProvider + Send + Sync),
    currency: &str,
    stale_policy: StalePolicy,
) -> ViewState {
    let mut state = ViewState::new(stale_policy);
    let request = state.select(currency);

    let pb = ui::new_spinner(view::LOADING);
    let (currencies, rates) = match &request {
        Some(request) => {
            let (currencies, rates) = join(
                provider.fetch_currencies(),
                provider.fetch_rates(&request.currency),
            )
            .await;
            (currencies, Some(rates))
        }
        None => (provider.fetch_currencies().await, None),
    };
    pb.finish_and_clear();

    state.currencies_loaded(currencies);
    if let (Some(request), Some(rates)) = (request, rates) {
        state.rates_loaded(&request, rates);
    }
    state
}

pub fn sort_state(sort: Option<RateColumn>, descending: bool) -> SortState<RateColumn> {
    match sort {
        Some(column) if descending => SortState::sorted_by(column, SortDirection::Descending),
        Some(column) => SortState::sorted_by(column, SortDirection::Ascending),
        None => SortState::new(),
    }
}

pub async fn run(
    provider: &(dyn ExchangeRateProvider + Send + Sync),
    currency: &str,
    sort: Option<RateColumn>,
    descending: bool,
    stale_policy: StalePolicy,
) -> Result<()> {
    let state = load(provider, currency, stale_policy).await;
    println!("{}", view::render_frame(&state, &sort_state(sort, descending)));
    Ok(())
}
