use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, Table};
use serde_json::Value;

use crate::error::{PennyError, Result};
use crate::fmt::money;

/// Turn a camelCase JSON key into a readable label ("totalExpense" ->
/// "Total expense").
fn label(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn scalar(value: &Value) -> String {
    match value {
        // Amounts come back as floats; counts and dates as integers.
        Value::Number(n) if n.is_f64() => n.as_f64().map(money).unwrap_or_else(|| n.to_string()),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Render a server report object as a table, one row per field. Nested
/// objects (category or day breakdowns) become their own table below.
fn render(title: &str, value: &Value) {
    let Value::Object(map) = value else {
        println!("{title}\n{}", scalar(value));
        return;
    };

    let mut table = Table::new();
    table.set_header(vec![title, ""]);
    let mut nested: Vec<(&String, &Value)> = Vec::new();
    for (key, field) in map {
        match field {
            Value::Object(_) | Value::Array(_) => nested.push((key, field)),
            _ => {
                table.add_row(vec![Cell::new(label(key)), Cell::new(scalar(field))]);
            }
        }
    }
    if table.row_count() > 0 {
        println!("{table}");
    }

    for (key, field) in nested {
        match field {
            Value::Object(inner) => {
                let mut sub = Table::new();
                sub.set_header(vec![label(key).as_str(), ""]);
                for (k, v) in inner {
                    sub.add_row(vec![Cell::new(k), Cell::new(scalar(v))]);
                }
                println!("{sub}");
            }
            Value::Array(items) => {
                let mut sub = Table::new();
                sub.set_header(vec![label(key).as_str()]);
                for item in items {
                    sub.add_row(vec![Cell::new(scalar(item))]);
                }
                println!("{sub}");
            }
            _ => {}
        }
    }
}

pub async fn monthly(month: Option<String>) -> Result<()> {
    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;
    let today = chrono::Local::now().date_naive();
    let (year, month) = match super::parse_month_opt(&month)? {
        Some((y, m)) if (1..=12).contains(&m) => (y, m),
        Some(_) => {
            return Err(PennyError::Other("Invalid month (expected YYYY-MM)".to_string()))
        }
        None => (today.year(), today.month()),
    };
    let report = api.monthly_report(month, year).await?;
    render(&format!("Monthly report {year:04}-{month:02}"), &report);
    Ok(())
}

pub async fn category() -> Result<()> {
    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;
    let report = api.category_report().await?;
    render("Expense by category", &report);
    Ok(())
}

pub async fn daily(date: Option<String>) -> Result<()> {
    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;
    let date: NaiveDate = match date {
        Some(s) => s
            .parse()
            .map_err(|_| PennyError::Other(format!("Invalid date: {s} (expected YYYY-MM-DD)")))?,
        None => chrono::Local::now().date_naive(),
    };
    let report = api.daily_report(date).await?;
    render(&format!("Daily report {date}"), &report);
    Ok(())
}

pub async fn summary() -> Result<()> {
    let store = super::open_store();
    let (api, _) = super::protected_client(&store)?;
    let report = api.summary_report().await?;
    render("Summary", &report);
    Ok(())
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_splits_camel_case_keys() {
        assert_eq!(label("totalExpense"), "Total expense");
        assert_eq!(label("netBalance"), "Net balance");
        assert_eq!(label("month"), "Month");
    }

    #[test]
    fn test_scalar_formats_floats_as_money() {
        assert_eq!(scalar(&serde_json::json!(1234.5)), "$1,234.50");
        assert_eq!(scalar(&serde_json::json!("Food")), "Food");
        assert_eq!(scalar(&Value::Null), "-");
    }
}
