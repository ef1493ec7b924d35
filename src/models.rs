use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("income") {
            Ok(Self::Income)
        } else if s.eq_ignore_ascii_case("expense") {
            Ok(Self::Expense)
        } else {
            Err(format!("unknown transaction type: {s} (expected income or expense)"))
        }
    }
}

/// Wire shape of a transaction as the backend serves it (camelCase JSON).
/// `amount` is always positive; `type` carries the direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
}

/// Budget limits. `id` absent means the budget has not been created
/// server-side yet (POST rather than PUT).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub daily_limit: f64,
    #[serde(default)]
    pub monthly_limit: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_deserializes_wire_shape() {
        let json = r#"{"id":7,"amount":42.5,"type":"EXPENSE","category":"food","date":"2024-06-01"}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.id, Some(7));
        assert_eq!(t.kind, TransactionType::Expense);
        assert_eq!(t.category.as_deref(), Some("food"));
        assert!(t.description.is_none());
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_transaction_serializes_without_id() {
        let t = Transaction {
            id: None,
            amount: 10.0,
            kind: TransactionType::Income,
            category: Some("salary".to_string()),
            description: None,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["type"], "INCOME");
        assert_eq!(json["date"], "2024-06-01");
    }

    #[test]
    fn test_budget_tolerates_missing_limits() {
        let b: Budget = serde_json::from_str(r#"{"id":1}"#).unwrap();
        assert_eq!(b.daily_limit, 0.0);
        assert_eq!(b.monthly_limit, 0.0);
    }

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!("Expense".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert_eq!("INCOME".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert!("transfer".parse::<TransactionType>().is_err());
    }
}
