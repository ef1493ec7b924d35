//! Client-side filtering for the transaction list view.

use chrono::NaiveDate;

use crate::models::{Transaction, TransactionType};

#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    /// Substring match against description, category, and the amount's
    /// string form, case-insensitive.
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
    pub category: Option<String>,
    pub kind: Option<TransactionType>,
}

impl TransactionFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let haystack_hit = t
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false)
                || t.category
                    .as_deref()
                    .map(|c| c.to_lowercase().contains(&needle))
                    .unwrap_or(false)
                || t.amount.to_string().contains(&needle);
            if !haystack_hit {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if t.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if t.date > to {
                return false;
            }
        }
        if let Some(min) = self.amount_min {
            if t.amount < min {
                return false;
            }
        }
        if let Some(max) = self.amount_max {
            if t.amount > max {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !t
                .category
                .as_deref()
                .map(|c| c.eq_ignore_ascii_case(category))
                .unwrap_or(false)
            {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if t.kind != kind {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: f64, kind: TransactionType, category: &str, desc: &str, date: &str) -> Transaction {
        Transaction {
            id: None,
            amount,
            kind,
            category: Some(category.to_string()),
            description: if desc.is_empty() {
                None
            } else {
                Some(desc.to_string())
            },
            date: date.parse().unwrap(),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(12.50, TransactionType::Expense, "food", "Lunch at cafe", "2024-06-01"),
            tx(900.0, TransactionType::Expense, "rent", "June rent", "2024-06-02"),
            tx(2000.0, TransactionType::Income, "salary", "", "2024-06-03"),
            tx(30.0, TransactionType::Expense, "food", "Groceries", "2024-05-28"),
        ]
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let f = TransactionFilter::default();
        assert_eq!(f.apply(&sample()).len(), 4);
    }

    #[test]
    fn test_search_matches_description_and_category() {
        let f = TransactionFilter {
            search: Some("CAFE".to_string()),
            ..Default::default()
        };
        assert_eq!(f.apply(&sample()).len(), 1);

        let f = TransactionFilter {
            search: Some("food".to_string()),
            ..Default::default()
        };
        assert_eq!(f.apply(&sample()).len(), 2);
    }

    #[test]
    fn test_date_range() {
        let f = TransactionFilter {
            date_from: Some("2024-06-01".parse().unwrap()),
            date_to: Some("2024-06-02".parse().unwrap()),
            ..Default::default()
        };
        assert_eq!(f.apply(&sample()).len(), 2);
    }

    #[test]
    fn test_amount_bounds_and_type() {
        let f = TransactionFilter {
            amount_min: Some(100.0),
            kind: Some(TransactionType::Expense),
            ..Default::default()
        };
        let rows = f.apply(&sample());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category.as_deref(), Some("rent"));
    }

    #[test]
    fn test_category_is_case_insensitive() {
        let f = TransactionFilter {
            category: Some("Food".to_string()),
            ..Default::default()
        };
        assert_eq!(f.apply(&sample()).len(), 2);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(2024, 6).unwrap(),
            ("2024-06-01".parse().unwrap(), "2024-06-30".parse().unwrap())
        );
        assert_eq!(
            month_bounds(2024, 12).unwrap(),
            ("2024-12-01".parse().unwrap(), "2024-12-31".parse().unwrap())
        );
        // Leap February
        assert_eq!(
            month_bounds(2024, 2).unwrap(),
            ("2024-02-01".parse().unwrap(), "2024-02-29".parse().unwrap())
        );
        assert!(month_bounds(2024, 13).is_none());
    }
}
