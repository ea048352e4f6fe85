use serde_json::Value;

use super::ordered_columns;

/// Print the headline figure of a result.
///
/// Loans report their base payment, portfolios their total cost of credit.
/// Plain row lists print one tab-separated line per row.
pub fn print_minimal(value: &Value) {
    if let Value::Array(rows) = value {
        for row in rows {
            match row.as_object() {
                Some(map) => {
                    let fields: Vec<String> = ordered_columns(map)
                        .iter()
                        .filter_map(|key| map.get(key))
                        .map(format_minimal)
                        .collect();
                    println!("{}", fields.join("\t"));
                }
                None => println!("{}", format_minimal(row)),
            }
        }
        return;
    }

    let result = value.get("result").unwrap_or(value);
    let priority_keys = ["base_payment", "total_cost_of_credit", "cost_of_credit"];

    for key in &priority_keys {
        if let Some(val) = result.get(*key) {
            if !val.is_null() {
                println!("{}", format_minimal(val));
                return;
            }
        }
    }

    println!("{}", format_minimal(result));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
