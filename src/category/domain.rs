//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, UserID, database_id::DatabaseId};

/// A validated, non-empty category label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct CategoryLabel(String);

impl CategoryLabel {
    /// Create a category label.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyField] if `label` is blank.
    pub fn new(label: &str) -> Result<Self, Error> {
        let label = label.trim();

        if label.is_empty() {
            Err(Error::EmptyField("label"))
        } else {
            Ok(Self(label.to_string()))
        }
    }

    /// Create a category label without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(label: &str) -> Self {
        Self(label.to_string())
    }

    /// The machine friendly form of the label, e.g. "Eating Out" becomes "eating_out".
    pub fn slug(&self) -> String {
        self.0.to_lowercase().split(' ').collect::<Vec<_>>().join("_")
    }
}

impl AsRef<str> for CategoryLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a category applies to expenses or incomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    /// A category for money going out.
    Expense,
    /// A category for money coming in.
    Income,
}

impl CategoryType {
    /// The value stored in the database and sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Expense => "expense",
            CategoryType::Income => "income",
        }
    }
}

impl FromStr for CategoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(CategoryType::Expense),
            "income" => Ok(CategoryType::Income),
            other => Err(Error::InvalidCategoryType(other.to_owned())),
        }
    }
}

/// A label for grouping incomes or expenses, e.g. 'Groceries' or 'Salary'.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category in the database.
    pub id: DatabaseId,
    /// The name shown to the user.
    pub label: CategoryLabel,
    /// The slug derived from the label.
    pub value: String,
    /// Whether the category is for incomes or expenses.
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// The user that owns the category.
    #[serde(skip_serializing)]
    pub user_id: UserID,
    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod category_domain_tests {
    use std::str::FromStr;

    use crate::{
        Error,
        category::{CategoryLabel, CategoryType},
    };

    #[test]
    fn label_fails_on_just_whitespace() {
        assert_eq!(CategoryLabel::new("\n\t "), Err(Error::EmptyField("label")));
    }

    #[test]
    fn slug_lowercases_and_replaces_spaces() {
        let label = CategoryLabel::new(" Eating Out ").unwrap();

        assert_eq!(label.slug(), "eating_out");
    }

    #[test]
    fn slug_keeps_repeated_spaces_as_underscores() {
        let label = CategoryLabel::new_unchecked("Car  Parts");

        assert_eq!(label.slug(), "car__parts");
    }

    #[test]
    fn category_type_parses_known_values_only() {
        assert_eq!(CategoryType::from_str("income"), Ok(CategoryType::Income));
        assert_eq!(CategoryType::from_str("expense"), Ok(CategoryType::Expense));
        assert_eq!(
            CategoryType::from_str("Expense"),
            Err(Error::InvalidCategoryType("Expense".to_owned()))
        );
    }
}
