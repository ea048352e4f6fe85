use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::ordered_columns;

/// Render a result as tables: scalar fields in a Field/Value table, each row
/// list (schedule, consolidated rows, summaries) in its own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            let result = map.get("result").unwrap_or(value);
            print_section(None, result);
            print_envelope(map);
        }
        Value::Array(rows) => print_rows(rows),
        _ => println!("{}", value),
    }
}

fn print_section(title: Option<&str>, value: &Value) {
    let Value::Object(map) = value else {
        println!("{}", format_value(value));
        return;
    };

    let scalars: Vec<(&String, &Value)> = map
        .iter()
        .filter(|(_, v)| !v.is_object() && !is_row_list(v))
        .collect();
    if !scalars.is_empty() {
        if let Some(title) = title {
            println!("\n{}:", title);
        }
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in scalars {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        let heading = match title {
            Some(title) => format!("{}.{}", title, key),
            None => key.clone(),
        };
        if val.is_object() {
            print_section(Some(heading.as_str()), val);
        } else if let Value::Array(rows) = val {
            if is_row_list(val) {
                println!("\n{}:", heading);
                print_rows(rows);
            }
        }
    }
}

fn print_envelope(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn is_row_list(value: &Value) -> bool {
    matches!(value, Value::Array(rows) if rows.iter().any(Value::is_object))
}

fn print_rows(rows: &[Value]) {
    let Some(first) = rows.iter().find_map(Value::as_object) else {
        for item in rows {
            println!("{}", format_value(item));
        }
        return;
    };

    let headers = ordered_columns(first);
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in rows {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h.as_str()).map(format_value).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
