//! State of the exchange rates view.
//!
//! `ViewState` is written only by the event loop that owns it. Network
//! operations hand their results back through [`ViewState::currencies_loaded`]
//! and [`ViewState::rates_loaded`].

use crate::core::rates::{ExchangeRates, RateRow, project_rows};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const CURRENCIES_ERROR: &str = "Failed to load currencies";
pub const RATES_ERROR: &str = "Failed to load exchange rates";

/// What to do with a rate response that belongs to an older request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Drop responses to anything but the latest request.
    #[default]
    Discard,
    /// Apply every response as it lands; the last one to arrive wins.
    Apply,
}

/// A rate fetch issued by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub generation: u64,
    pub currency: String,
}

#[derive(Debug, Default)]
pub struct ViewState {
    currencies: Vec<String>,
    selected: String,
    rates: ExchangeRates,
    loading: bool,
    error: String,
    generation: u64,
    stale_policy: StalePolicy,
}

impl ViewState {
    pub fn new(stale_policy: StalePolicy) -> Self {
        Self {
            stale_policy,
            ..Self::default()
        }
    }

    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    pub fn selected(&self) -> Option<&str> {
        (!self.selected.is_empty()).then_some(self.selected.as_str())
    }

    pub fn rates(&self) -> &ExchangeRates {
        &self.rates
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        (!self.error.is_empty()).then_some(self.error.as_str())
    }

    /// Applies the outcome of the one-time currency load.
    pub fn currencies_loaded(&mut self, result: Result<Vec<String>>) {
        match result {
            Ok(currencies) => {
                debug!(count = currencies.len(), "Currencies loaded");
                self.currencies = currencies;
            }
            Err(e) => {
                warn!("Currency load failed: {e:#}");
                self.error = CURRENCIES_ERROR.to_string();
            }
        }
    }

    /// Changes the selected currency. Returns the rate fetch to issue when
    /// the selection changed to a non-empty value.
    pub fn select(&mut self, currency: &str) -> Option<RateRequest> {
        if currency == self.selected {
            return None;
        }
        self.selected = currency.to_string();
        if self.selected.is_empty() {
            return None;
        }
        Some(self.begin_fetch())
    }

    /// Issues a new fetch for the current selection, if any.
    pub fn refresh(&mut self) -> Option<RateRequest> {
        if self.selected.is_empty() {
            return None;
        }
        Some(self.begin_fetch())
    }

    fn begin_fetch(&mut self) -> RateRequest {
        self.error.clear();
        self.loading = true;
        self.generation += 1;
        debug!(
            generation = self.generation,
            currency = %self.selected,
            "Requesting exchange rates"
        );
        RateRequest {
            generation: self.generation,
            currency: self.selected.clone(),
        }
    }

    /// Applies the outcome of `request`. Returns `false` when the response was
    /// stale and dropped.
    pub fn rates_loaded(&mut self, request: &RateRequest, result: Result<ExchangeRates>) -> bool {
        if request.generation != self.generation && self.stale_policy == StalePolicy::Discard {
            debug!(
                generation = request.generation,
                latest = self.generation,
                currency = %request.currency,
                "Discarding stale exchange rates"
            );
            return false;
        }

        match result {
            Ok(rates) => {
                debug!(count = rates.len(), currency = %request.currency, "Exchange rates loaded");
                self.rates = rates;
            }
            Err(e) => {
                warn!(currency = %request.currency, "Exchange rate load failed: {e:#}");
                self.error = RATES_ERROR.to_string();
            }
        }
        self.loading = false;
        true
    }

    /// Table rows for the current rates, expressed against the selection.
    pub fn rows(&self) -> Vec<RateRow> {
        project_rows(&self.selected, &self.rates)
    }
}
