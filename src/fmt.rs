use chrono::NaiveDate;

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let sign = if val < 0.0 { "-" } else { "" };
    let cents = (val.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let rem = cents % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}${grouped}.{rem:02}")
}

/// Uppercase the first character, as the dashboard does for category names.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// "Today", "Yesterday", "3 days ago", or the date itself for anything older.
pub fn relative_date(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if (2..7).contains(&d) => format!("{d} days ago"),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.1), "$42.10");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("food"), "Food");
        assert_eq!(capitalize("Other"), "Other");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_relative_date() {
        let today = d("2024-06-10");
        assert_eq!(relative_date(d("2024-06-10"), today), "Today");
        assert_eq!(relative_date(d("2024-06-09"), today), "Yesterday");
        assert_eq!(relative_date(d("2024-06-07"), today), "3 days ago");
        assert_eq!(relative_date(d("2024-05-01"), today), "2024-05-01");
        // Future dates fall through to the plain date
        assert_eq!(relative_date(d("2024-06-11"), today), "2024-06-11");
    }
}
