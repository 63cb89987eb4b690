use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// Identifier assigned by the store, unique across every category.
pub type TransactionId = u64;

/// Calendar format used for every stored and entered date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "transaction_number", with = "transaction_number")]
    pub id: TransactionId,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub date: String,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        amount: f64,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            amount,
            description: description.into(),
            date: date.into(),
        }
    }

    /// Calendar date of the record, if the stored text is a valid ISO date.
    ///
    /// Imported records keep their date verbatim, so this can be `None`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Validates a user-entered date and returns it normalized to `YYYY-MM-DD`.
pub fn validate_date(raw: &str) -> Result<String> {
    parse_date(raw)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .ok_or_else(|| {
            LedgerError::InvalidInput(format!(
                "`{}` is not a valid date, use YYYY-MM-DD",
                raw.trim()
            ))
        })
}

/// Parses a user-entered amount; infinities and NaN are rejected.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LedgerError::InvalidInput(format!(
            "`{}` is not a valid amount",
            trimmed
        ))),
    }
}

/// `transaction_number` is persisted as a string-encoded integer.
mod transaction_number {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::TransactionId;

    pub fn serialize<S>(id: &TransactionId, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<TransactionId, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(TransactionId),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.trim().parse().map_err(|_| {
                de::Error::custom(format!("invalid transaction_number `{}`", text))
            }),
            Raw::Number(number) => Ok(number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_id_as_string_transaction_number() {
        let txn = Transaction::new(7, 12.5, "lunch", "2024-01-05");
        let json = serde_json::to_string(&txn).unwrap();
        assert_eq!(
            json,
            r#"{"transaction_number":"7","amount":12.5,"description":"lunch","date":"2024-01-05"}"#
        );
    }

    #[test]
    fn accepts_numeric_transaction_number_and_missing_description() {
        let txn: Transaction =
            serde_json::from_str(r#"{"transaction_number":3,"amount":-4,"date":"2024-02-01"}"#)
                .unwrap();
        assert_eq!(txn.id, 3);
        assert_eq!(txn.amount, -4.0);
        assert!(txn.description.is_empty());
    }

    #[test]
    fn rejects_non_integer_transaction_number() {
        let err = serde_json::from_str::<Transaction>(
            r#"{"transaction_number":"abc","amount":1,"description":"","date":"2024-02-01"}"#,
        )
        .expect_err("non numeric id must fail");
        assert!(err.to_string().contains("abc"), "unexpected error: {err}");
    }

    #[test]
    fn validate_date_normalizes_and_rejects() {
        assert_eq!(validate_date(" 2024-3-7 ").unwrap(), "2024-03-07");
        assert!(matches!(
            validate_date("07/03/2024"),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(validate_date("2024-02-30").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn parse_amount_requires_finite_number() {
        assert_eq!(parse_amount(" 50.00 ").unwrap(), 50.0);
        assert_eq!(parse_amount("-3.25").unwrap(), -3.25);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn parsed_date_is_none_for_verbatim_imports() {
        let txn = Transaction::new(1, 1.0, "", "next tuesday");
        assert!(txn.parsed_date().is_none());
        let txn = Transaction::new(2, 1.0, "", "2024-03-01");
        assert_eq!(txn.parsed_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
