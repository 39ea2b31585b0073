//! Core business logic abstractions

pub mod config;
pub mod log;
pub mod rates;
pub mod state;
pub mod table;

// Re-export main types for cleaner imports
pub use rates::{ExchangeRateProvider, ExchangeRates, RateRow};
pub use state::{RateRequest, StalePolicy, ViewState};
pub use table::{RateColumn, SortDirection, SortState};
