//! Exchange rate abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use serde::de::{self, Deserialize, Deserializer, MapAccess};
use std::fmt;

/// Rates of every target currency against one base currency.
///
/// Entries keep the order in which the service returned them. Keys are
/// unique: inserting an existing currency replaces its rate in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRates {
    entries: Vec<(String, f64)>,
}

impl ExchangeRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, currency: String, rate: f64) {
        match self.entries.iter_mut().find(|(c, _)| *c == currency) {
            Some(entry) => entry.1 = rate,
            None => self.entries.push((currency, rate)),
        }
    }

    pub fn get(&self, currency: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| c == currency)
            .map(|(_, rate)| *rate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(c, rate)| (c.as_str(), *rate))
    }
}

impl FromIterator<(String, f64)> for ExchangeRates {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut rates = ExchangeRates::new();
        for (currency, rate) in iter {
            rates.insert(currency, rate);
        }
        rates
    }
}

impl<'de> Deserialize<'de> for ExchangeRates {
    fn deserialize<D>(deserializer: D) -> Result<ExchangeRates, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = ExchangeRates;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an object mapping currency codes to numeric rates")
            }

            fn visit_map<M>(self, mut map: M) -> Result<ExchangeRates, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut rates = ExchangeRates::new();
                while let Some((currency, rate)) = map.next_entry::<String, f64>()? {
                    rates.insert(currency, rate);
                }
                Ok(rates)
            }
        }

        deserializer.deserialize_map(Visitor)
    }
}

/// One displayed line of the rates table. Derived from the current rates on
/// every render, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub base_currency: String,
    pub currency: String,
    pub exchange_rate: f64,
}

/// Projects `rates` into table rows expressed against `base_currency`.
pub fn project_rows(base_currency: &str, rates: &ExchangeRates) -> Vec<RateRow> {
    rates
        .iter()
        .map(|(currency, rate)| RateRow {
            base_currency: base_currency.to_string(),
            currency: currency.to_string(),
            exchange_rate: rate,
        })
        .collect()
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Lists the currency codes the service can quote, in service order.
    async fn fetch_currencies(&self) -> Result<Vec<String>>;

    /// Fetches the rates of every quoted currency against `base_currency`.
    async fn fetch_rates(&self, base_currency: &str) -> Result<ExchangeRates>;
}
