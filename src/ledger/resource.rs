//! The JSON shapes of debts and goals.
//!
//! Debts and goals share one implementation and differ only in their field
//! names, which are described by the [LedgerResource] implementations here.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use time::{Date, OffsetDateTime};

use crate::{
    database_id::DatabaseId,
    endpoints,
    ledger::{EntryFields, Ledger, LedgerEntry, LedgerFields, LedgerKind},
};

/// Describes how one kind of ledger is exposed over the REST API.
pub trait LedgerResource: Send + Sync + 'static {
    /// The kind of ledger stored for this resource.
    const KIND: LedgerKind;
    /// The key holding the ledger in `{message, <key>}` responses.
    const ITEM_KEY: &'static str;
    /// The route for listing and creating ledgers.
    const COLLECTION_PATH: &'static str;
    /// The route for a single ledger.
    const ITEM_PATH: &'static str;
    /// The route for adding entries to a ledger.
    const ENTRIES_PATH: &'static str;
    /// The route for a single entry.
    const ENTRY_PATH: &'static str;

    /// The JSON representation of a ledger.
    type View: Serialize + From<Ledger>;
    /// The request body for creating or updating a ledger.
    type Body: DeserializeOwned + Into<LedgerFields> + Send;
    /// The request body for adding or editing an entry.
    type EntryBody: DeserializeOwned + Into<EntryFields> + Send;
}

/// Debts and their payments.
pub struct Debts;

/// Savings goals and their contributions.
pub struct Goals;

impl LedgerResource for Debts {
    const KIND: LedgerKind = LedgerKind::Debt;
    const ITEM_KEY: &'static str = "debt";
    const COLLECTION_PATH: &'static str = endpoints::DEBTS;
    const ITEM_PATH: &'static str = endpoints::DEBT;
    const ENTRIES_PATH: &'static str = endpoints::DEBT_PAYMENTS;
    const ENTRY_PATH: &'static str = endpoints::DEBT_PAYMENT;

    type View = DebtView;
    type Body = DebtBody;
    type EntryBody = PaymentBody;
}

impl LedgerResource for Goals {
    const KIND: LedgerKind = LedgerKind::Goal;
    const ITEM_KEY: &'static str = "goal";
    const COLLECTION_PATH: &'static str = endpoints::GOALS;
    const ITEM_PATH: &'static str = endpoints::GOAL;
    const ENTRIES_PATH: &'static str = endpoints::GOAL_CONTRIBUTIONS;
    const ENTRY_PATH: &'static str = endpoints::GOAL_CONTRIBUTION;

    type View = GoalView;
    type Body = GoalBody;
    type EntryBody = ContributionBody;
}

/// A payment or contribution as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryView {
    pub id: DatabaseId,
    pub amount: Decimal,
    pub date: Date,
}

impl From<LedgerEntry> for EntryView {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            amount: entry.amount,
            date: entry.date,
        }
    }
}

/// A debt as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtView {
    pub id: DatabaseId,
    pub name: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub date: Option<Date>,
    pub payments: Vec<EntryView>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub version: i64,
}

impl From<Ledger> for DebtView {
    fn from(ledger: Ledger) -> Self {
        Self {
            id: ledger.id,
            name: ledger.label.as_ref().to_owned(),
            total_amount: ledger.target,
            paid_amount: ledger.accumulated,
            remaining_amount: ledger.remaining(),
            date: ledger.reference_date,
            payments: ledger.entries.into_iter().map(EntryView::from).collect(),
            created_at: ledger.created_at,
            updated_at: ledger.updated_at,
            version: ledger.version,
        }
    }
}

/// A goal as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    pub id: DatabaseId,
    pub name: String,
    pub target_amount: Decimal,
    pub contributed_amount: Decimal,
    pub remaining_amount: Decimal,
    pub date: Option<Date>,
    pub contributions: Vec<EntryView>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub version: i64,
}

impl From<Ledger> for GoalView {
    fn from(ledger: Ledger) -> Self {
        Self {
            id: ledger.id,
            name: ledger.label.as_ref().to_owned(),
            target_amount: ledger.target,
            contributed_amount: ledger.accumulated,
            remaining_amount: ledger.remaining(),
            date: ledger.reference_date,
            contributions: ledger.entries.into_iter().map(EntryView::from).collect(),
            created_at: ledger.created_at,
            updated_at: ledger.updated_at,
            version: ledger.version,
        }
    }
}

/// Read a field that may be absent, `null` or a value as `None`,
/// `Some(None)` or `Some(Some(value))`. Use together with `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The body of a create or update debt request.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtBody {
    pub name: Option<String>,
    pub total_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "present")]
    pub debt_date: Option<Option<Date>>,
}

impl From<DebtBody> for LedgerFields {
    fn from(body: DebtBody) -> Self {
        Self {
            label: body.name,
            target: body.total_amount,
            reference_date: body.debt_date,
        }
    }
}

/// The body of a create or update goal request.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalBody {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "present")]
    pub goal_date: Option<Option<Date>>,
}

impl From<GoalBody> for LedgerFields {
    fn from(body: GoalBody) -> Self {
        Self {
            label: body.name,
            target: body.target_amount,
            reference_date: body.goal_date,
        }
    }
}

/// The body of an add or edit payment request.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBody {
    pub amount: Option<Decimal>,
    pub payment_date: Option<Date>,
}

impl From<PaymentBody> for EntryFields {
    fn from(body: PaymentBody) -> Self {
        Self {
            amount: body.amount,
            date: body.payment_date,
        }
    }
}

/// The body of an add or edit contribution request.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionBody {
    pub amount: Option<Decimal>,
    pub contribution_date: Option<Date>,
}

impl From<ContributionBody> for EntryFields {
    fn from(body: ContributionBody) -> Self {
        Self {
            amount: body.amount,
            date: body.contribution_date,
        }
    }
}
