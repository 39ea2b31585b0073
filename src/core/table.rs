//! Sortable table model.
//!
//! A table has a fixed set of columns and at most one sorted column. Toggling
//! a column header cycles it through ascending, descending and unsorted.
//! Sorting only reorders references to the rows; the rows themselves are
//! never modified.

use crate::core::rates::RateRow;
use anyhow::anyhow;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Marker appended to a sorted column header.
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => " 🔼",
            SortDirection::Descending => " 🔽",
        }
    }
}

/// A column that rows of a table can be ordered by.
pub trait SortColumn: Copy + Eq {
    type Row;

    fn title(&self) -> &'static str;
    fn compare(&self, a: &Self::Row, b: &Self::Row) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<C> {
    sorting: Option<(C, SortDirection)>,
}

impl<C> Default for SortState<C> {
    fn default() -> Self {
        Self { sorting: None }
    }
}

impl<C: Copy + Eq> SortState<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sorted_by(column: C, direction: SortDirection) -> Self {
        Self {
            sorting: Some((column, direction)),
        }
    }

    /// Advances `column` one step: unsorted -> ascending -> descending ->
    /// unsorted. Any other sorted column is reset.
    pub fn toggle(&mut self, column: C) {
        self.sorting = match self.sorting {
            Some((c, SortDirection::Ascending)) if c == column => {
                Some((column, SortDirection::Descending))
            }
            Some((c, SortDirection::Descending)) if c == column => None,
            _ => Some((column, SortDirection::Ascending)),
        };
    }

    pub fn direction(&self, column: C) -> Option<SortDirection> {
        self.sorting
            .filter(|(c, _)| *c == column)
            .map(|(_, direction)| direction)
    }

    pub fn sorting(&self) -> Option<(C, SortDirection)> {
        self.sorting
    }

    /// Header text for `column`, with the sort indicator when sorted.
    pub fn header(&self, column: C) -> String
    where
        C: SortColumn,
    {
        match self.direction(column) {
            Some(direction) => format!("{}{}", column.title(), direction.indicator()),
            None => column.title().to_string(),
        }
    }

    /// Rows in display order. Equal rows keep their original order.
    pub fn apply<'a>(&self, rows: &'a [C::Row]) -> Vec<&'a C::Row>
    where
        C: SortColumn,
    {
        let mut view: Vec<&C::Row> = rows.iter().collect();
        if let Some((column, direction)) = self.sorting {
            view.sort_by(|a, b| match direction {
                SortDirection::Ascending => column.compare(a, b),
                SortDirection::Descending => column.compare(b, a),
            });
        }
        view
    }
}

/// Columns of the exchange rates table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateColumn {
    BaseCurrency,
    Currency,
    ExchangeRate,
}

impl RateColumn {
    pub const ALL: [RateColumn; 3] = [
        RateColumn::BaseCurrency,
        RateColumn::Currency,
        RateColumn::ExchangeRate,
    ];
}

impl SortColumn for RateColumn {
    type Row = RateRow;

    fn title(&self) -> &'static str {
        match self {
            RateColumn::BaseCurrency => "Base Currency",
            RateColumn::Currency => "Currency",
            RateColumn::ExchangeRate => "Exchange Rate",
        }
    }

    fn compare(&self, a: &RateRow, b: &RateRow) -> Ordering {
        match self {
            RateColumn::BaseCurrency => a.base_currency.cmp(&b.base_currency),
            RateColumn::Currency => a.currency.cmp(&b.currency),
            RateColumn::ExchangeRate => a.exchange_rate.total_cmp(&b.exchange_rate),
        }
    }
}

impl Display for RateColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RateColumn::BaseCurrency => "base-currency",
                RateColumn::Currency => "currency",
                RateColumn::ExchangeRate => "exchange-rate",
            }
        )
    }
}

impl FromStr for RateColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "1" | "base" | "base-currency" => Ok(RateColumn::BaseCurrency),
            "2" | "currency" => Ok(RateColumn::Currency),
            "3" | "rate" | "exchange-rate" => Ok(RateColumn::ExchangeRate),
            _ => Err(anyhow!("Invalid column: {}", s)),
        }
    }
}
