pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Column order for schedule-like rows; unknown keys follow alphabetically.
const COLUMN_ORDER: &[&str] = &[
    "period",
    "year",
    "interest",
    "insurance",
    "principal",
    "payment",
    "payment_with_insurance",
    "balance",
    "insured_capital",
    "active_loans",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Headers for a list of row objects, in schedule column order.
pub(crate) fn ordered_columns(first: &Map<String, Value>) -> Vec<String> {
    let mut headers: Vec<String> = first.keys().cloned().collect();
    headers.sort_by_key(|key| {
        (
            COLUMN_ORDER
                .iter()
                .position(|c| *c == key.as_str())
                .unwrap_or(COLUMN_ORDER.len()),
            key.clone(),
        )
    });
    headers
}

/// The primary row list of a result: a loan schedule, the consolidated
/// portfolio schedule, or the value itself when it is already a list.
pub(crate) fn primary_rows(value: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(rows) = value {
        return Some(rows);
    }
    let result = value.get("result").unwrap_or(value);
    ["consolidated", "schedule"]
        .iter()
        .find_map(|key| result.get(*key).and_then(Value::as_array))
}
