//! Incomes and expenses, the one-off movements of money in and out.

use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, UserID, database_id::DatabaseId, ledger::PositiveAmount};

/// The maximum number of characters in an income or expense title.
pub const CASH_FLOW_TITLE_MAX_LENGTH: usize = 50;
/// The maximum number of characters in an income or expense description.
pub const CASH_FLOW_DESCRIPTION_MAX_LENGTH: usize = 20;

/// Whether money came in or went out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowKind {
    /// Money coming in, e.g. a salary.
    Income,
    /// Money going out, e.g. rent.
    Expense,
}

impl CashFlowKind {
    /// The value stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CashFlowKind::Income => "income",
            CashFlowKind::Expense => "expense",
        }
    }

    /// The capitalised name used in response messages.
    pub fn title(&self) -> &'static str {
        match self {
            CashFlowKind::Income => "Income",
            CashFlowKind::Expense => "Expense",
        }
    }
}

impl Display for CashFlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An income or expense as stored in the database and sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    /// The ID of the record in the database.
    pub id: DatabaseId,
    /// Whether this is an income or an expense.
    #[serde(rename = "type")]
    pub kind: CashFlowKind,
    /// A short name for the record.
    pub title: String,
    /// How much money moved, always positive.
    pub amount: Decimal,
    /// The slug of the category, e.g. "eating_out".
    pub category: String,
    /// A short note about the record.
    pub description: String,
    /// The day the money moved.
    pub date: Date,
    /// The user that owns the record.
    #[serde(skip_serializing)]
    pub user_id: UserID,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The raw body of a create or update request for an income or expense.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CashFlowFields {
    /// The requested title.
    pub title: Option<String>,
    /// The requested amount.
    pub amount: Option<Decimal>,
    /// The requested category slug.
    pub category: Option<String>,
    /// The requested description.
    pub description: Option<String>,
    /// The requested date.
    pub date: Option<Date>,
}

/// A fully validated income or expense, ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowForm {
    /// The trimmed title.
    pub title: String,
    /// The amount of money.
    pub amount: PositiveAmount,
    /// The trimmed category slug.
    pub category: String,
    /// The trimmed description.
    pub description: String,
    /// The day the money moved.
    pub date: Date,
}

impl CashFlowForm {
    /// Validate the fields of a create or update request. Every field is required.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingField] for the first absent field, otherwise an
    /// [Error::NonPositiveAmount], [Error::EmptyField] or [Error::FieldTooLong]
    /// if a field has a bad value.
    pub fn parse(fields: CashFlowFields) -> Result<Self, Error> {
        let title = fields.title.ok_or(Error::MissingField("title"))?;
        let amount = fields.amount.ok_or(Error::MissingField("amount"))?;
        let category = fields.category.ok_or(Error::MissingField("category"))?;
        let description = fields.description.ok_or(Error::MissingField("description"))?;
        let date = fields.date.ok_or(Error::MissingField("date"))?;

        Ok(Self {
            title: bounded_text(&title, "title", CASH_FLOW_TITLE_MAX_LENGTH)?,
            amount: PositiveAmount::new(amount, "amount")?,
            category: bounded_text(&category, "category", usize::MAX)?,
            description: bounded_text(
                &description,
                "description",
                CASH_FLOW_DESCRIPTION_MAX_LENGTH,
            )?,
            date,
        })
    }
}

fn bounded_text(raw: &str, field: &'static str, max_length: usize) -> Result<String, Error> {
    let text = raw.trim();

    if text.is_empty() {
        Err(Error::EmptyField(field))
    } else if text.chars().count() > max_length {
        Err(Error::FieldTooLong { field, max_length })
    } else {
        Ok(text.to_owned())
    }
}

#[cfg(test)]
mod cash_flow_form_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        cash_flow::{CashFlowFields, CashFlowForm},
    };

    fn valid_fields() -> CashFlowFields {
        CashFlowFields {
            title: Some("  October salary ".to_owned()),
            amount: Some(dec!(2500.50)),
            category: Some("salary".to_owned()),
            description: Some("monthly".to_owned()),
            date: Some(date!(2025 - 10 - 25)),
        }
    }

    #[test]
    fn parse_trims_text_fields() {
        let form = CashFlowForm::parse(valid_fields()).unwrap();

        assert_eq!(form.title, "October salary");
        assert_eq!(form.amount.get(), dec!(2500.50));
    }

    #[test]
    fn parse_requires_every_field() {
        let cases = [
            (CashFlowFields { title: None, ..valid_fields() }, "title"),
            (CashFlowFields { amount: None, ..valid_fields() }, "amount"),
            (CashFlowFields { category: None, ..valid_fields() }, "category"),
            (
                CashFlowFields { description: None, ..valid_fields() },
                "description",
            ),
            (CashFlowFields { date: None, ..valid_fields() }, "date"),
        ];

        for (fields, missing) in cases {
            assert_eq!(CashFlowForm::parse(fields), Err(Error::MissingField(missing)));
        }
    }

    #[test]
    fn parse_rejects_zero_and_negative_amounts() {
        for amount in [dec!(0), dec!(-10)] {
            let fields = CashFlowFields {
                amount: Some(amount),
                ..valid_fields()
            };

            assert_eq!(
                CashFlowForm::parse(fields),
                Err(Error::NonPositiveAmount("amount"))
            );
        }
    }

    #[test]
    fn parse_rejects_long_title_and_description() {
        let long_title = CashFlowFields {
            title: Some("a".repeat(51)),
            ..valid_fields()
        };
        let long_description = CashFlowFields {
            description: Some("a".repeat(21)),
            ..valid_fields()
        };

        assert_eq!(
            CashFlowForm::parse(long_title),
            Err(Error::FieldTooLong {
                field: "title",
                max_length: 50
            })
        );
        assert_eq!(
            CashFlowForm::parse(long_description),
            Err(Error::FieldTooLong {
                field: "description",
                max_length: 20
            })
        );
    }

    #[test]
    fn parse_rejects_blank_category() {
        let fields = CashFlowFields {
            category: Some("  ".to_owned()),
            ..valid_fields()
        };

        assert_eq!(CashFlowForm::parse(fields), Err(Error::EmptyField("category")));
    }
}
