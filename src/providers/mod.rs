pub mod rates_api;
