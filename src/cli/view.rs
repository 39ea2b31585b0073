//! Renders the exchange rates view as text.
//!
//! A frame is a pure function of the view state and the table's sort state.

use super::ui;
use crate::core::table::{RateColumn, SortState};
use crate::core::ViewState;
use comfy_table::Cell;

pub const TITLE: &str = "Exchange Rates";
pub const PLACEHOLDER: &str = "Select a currency";
pub const LOADING: &str = "Loading exchange rates...";

/// Selector entries: the placeholder first, then every currency in order.
pub fn selector_options(state: &ViewState) -> Vec<&str> {
    std::iter::once(PLACEHOLDER)
        .chain(state.currencies().iter().map(String::as_str))
        .collect()
}

pub fn render_selector(state: &ViewState) -> String {
    let selected = state.selected();
    selector_options(state)
        .into_iter()
        .enumerate()
        .map(|(i, option)| {
            let is_selected = match selected {
                None => i == 0,
                Some(code) => i > 0 && option == code,
            };
            let line = format!("{i:>3}) {option}");
            if is_selected {
                format!("> {}", ui::style_text(&line, ui::StyleType::Selected))
            } else if i == 0 {
                format!("  {}", ui::style_text(&line, ui::StyleType::Subtle))
            } else {
                format!("  {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_table(state: &ViewState, sort: &SortState<RateColumn>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(
        RateColumn::ALL
            .iter()
            .map(|column| ui::header_cell(&sort.header(*column))),
    );

    let rows = state.rows();
    for row in sort.apply(&rows) {
        table.add_row(vec![
            Cell::new(&row.base_currency),
            Cell::new(&row.currency),
            ui::rate_cell(row.exchange_rate),
        ]);
    }

    table.to_string()
}

/// Builds one full frame: title, error, selector, selection and either the
/// loading indicator or the table.
pub fn render_frame(state: &ViewState, sort: &SortState<RateColumn>) -> String {
    let mut output = format!("{}\n\n", ui::style_text(TITLE, ui::StyleType::Title));

    if let Some(error) = state.error() {
        output.push_str(&format!("{}\n\n", ui::style_text(error, ui::StyleType::Error)));
    }

    output.push_str(&render_selector(state));
    output.push_str("\n\n");

    if let Some(code) = state.selected() {
        output.push_str(&format!(
            "{} {}\n\n",
            ui::style_text("Selected Currency:", ui::StyleType::Label),
            code
        ));
    }

    if state.is_loading() {
        output.push_str(LOADING);
    } else {
        output.push_str(&render_table(state, sort));
    }

    output
}
