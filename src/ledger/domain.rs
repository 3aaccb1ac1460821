//! Debts and goals as running totals over a list of entries.
//!
//! A [Ledger] is either a debt with payments or a goal with contributions.
//! All entry mutations go through the `apply_*` methods, which keep
//! `accumulated` equal to the sum of the entry amounts.

use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, UserID, database_id::DatabaseId};

/// Whether a ledger tracks a debt or a savings goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// Money owed, paid off with payments.
    Debt,
    /// Money being saved, built up with contributions.
    Goal,
}

impl LedgerKind {
    /// The value stored in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Debt => "debt",
            LedgerKind::Goal => "goal",
        }
    }

    /// The capitalized name of the ledger, e.g. "Debt".
    pub fn title(&self) -> &'static str {
        match self {
            LedgerKind::Debt => "Debt",
            LedgerKind::Goal => "Goal",
        }
    }

    /// The capitalized name of an entry, e.g. "Payment".
    pub fn entry_title(&self) -> &'static str {
        match self {
            LedgerKind::Debt => "Payment",
            LedgerKind::Goal => "Contribution",
        }
    }

    /// The name of an entry in running text, e.g. "payment".
    pub fn entry_name(&self) -> &'static str {
        match self {
            LedgerKind::Debt => "payment",
            LedgerKind::Goal => "contribution",
        }
    }

    /// The name of the running total in running text.
    pub fn accumulated_name(&self) -> &'static str {
        match self {
            LedgerKind::Debt => "paid amount",
            LedgerKind::Goal => "contributed amount",
        }
    }

    /// The name of the target in running text.
    pub fn target_name(&self) -> &'static str {
        match self {
            LedgerKind::Debt => "total amount",
            LedgerKind::Goal => "target amount",
        }
    }

    /// The JSON field holding the target.
    pub fn target_field(&self) -> &'static str {
        match self {
            LedgerKind::Debt => "totalAmount",
            LedgerKind::Goal => "targetAmount",
        }
    }

    /// The JSON field holding an entry's date.
    pub fn entry_date_field(&self) -> &'static str {
        match self {
            LedgerKind::Debt => "paymentDate",
            LedgerKind::Goal => "contributionDate",
        }
    }
}

impl Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with an entry that would push a ledger past its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LimitPolicy {
    /// Refuse the entry with [Error::LimitExceeded].
    #[default]
    Reject,
    /// Accept the entry, letting the ledger go past its target.
    Allow,
}

impl Display for LimitPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitPolicy::Reject => f.write_str("reject"),
            LimitPolicy::Allow => f.write_str("allow"),
        }
    }
}

/// The longest name a debt or goal may have.
pub const LEDGER_LABEL_MAX_LENGTH: usize = 100;

/// The name of a debt or goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerLabel(String);

impl LedgerLabel {
    /// Create a ledger label, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyField] for a blank label and
    /// [Error::FieldTooLong] for one longer than [LEDGER_LABEL_MAX_LENGTH].
    pub fn new(label: &str) -> Result<Self, Error> {
        let label = label.trim();

        if label.is_empty() {
            Err(Error::EmptyField("name"))
        } else if label.chars().count() > LEDGER_LABEL_MAX_LENGTH {
            Err(Error::FieldTooLong {
                field: "name",
                max_length: LEDGER_LABEL_MAX_LENGTH,
            })
        } else {
            Ok(Self(label.to_owned()))
        }
    }

    /// Create a ledger label without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(label: &str) -> Self {
        Self(label.to_owned())
    }
}

impl AsRef<str> for LedgerLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An amount of money strictly greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveAmount(Decimal);

impl PositiveAmount {
    /// Check that `amount` is positive, naming `field` in the error if not.
    pub fn new(amount: Decimal, field: &'static str) -> Result<Self, Error> {
        if amount > Decimal::ZERO {
            Ok(Self(amount))
        } else {
            Err(Error::NonPositiveAmount(field))
        }
    }

    /// The wrapped amount.
    pub fn get(&self) -> Decimal {
        self.0
    }
}

/// A payment against a debt or a contribution towards a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// The entry's ID in the database.
    pub id: DatabaseId,
    /// How much money the entry moved, always positive.
    pub amount: Decimal,
    /// The day the money was paid or saved.
    pub date: Date,
}

/// A debt or goal together with its entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    /// The ledger's ID in the database.
    pub id: DatabaseId,
    /// The user that owns the ledger.
    pub user_id: UserID,
    /// Debt or goal.
    pub kind: LedgerKind,
    /// The name of the debt or goal.
    pub label: LedgerLabel,
    /// The amount owed or aimed for.
    pub target: Decimal,
    /// The sum of the entry amounts.
    pub accumulated: Decimal,
    /// An optional date for the debt or goal, e.g. a due date.
    pub reference_date: Option<Date>,
    /// When the ledger was created.
    pub created_at: OffsetDateTime,
    /// When the ledger was last changed.
    pub updated_at: OffsetDateTime,
    /// Incremented each time the ledger is saved.
    pub version: i64,
    /// The entries in the order they were added.
    pub entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// How much is left to pay or save. Negative if the target was overshot.
    pub fn remaining(&self) -> Decimal {
        self.target - self.accumulated
    }

    /// Record a new entry.
    ///
    /// # Errors
    ///
    /// Returns [Error::LimitExceeded] under [LimitPolicy::Reject] if the entry
    /// would push `accumulated` past `target`, or [Error::AmountTooLarge] if
    /// the new total does not fit in a [Decimal]. The ledger is not changed on error.
    pub fn apply_add(&mut self, entry: LedgerEntry, policy: LimitPolicy) -> Result<(), Error> {
        let attempted = self
            .accumulated
            .checked_add(entry.amount)
            .ok_or(Error::AmountTooLarge(self.kind.accumulated_name()))?;
        self.check_limit(attempted, policy)?;

        self.accumulated = attempted;
        self.entries.push(entry);

        Ok(())
    }

    /// Replace the amount and date of the entry with `entry_id`.
    ///
    /// The old amount is subtracted before the new amount is added. An edit
    /// that lowers the running total is always accepted, even if the ledger is
    /// still over its target afterwards.
    ///
    /// # Errors
    ///
    /// Returns [Error::EntryNotFound] if the ledger has no such entry,
    /// [Error::LimitExceeded] under [LimitPolicy::Reject] if the edit would
    /// raise `accumulated` past `target`, or [Error::AmountTooLarge] if the new
    /// total does not fit in a [Decimal].
    pub fn apply_edit(
        &mut self,
        entry_id: DatabaseId,
        form: &EntryForm,
        policy: LimitPolicy,
    ) -> Result<(), Error> {
        let kind = self.kind;
        let index = self.entry_index(entry_id)?;
        let old_amount = self.entries[index].amount;
        let attempted = self
            .accumulated
            .checked_sub(old_amount)
            .and_then(|total| total.checked_add(form.amount.get()))
            .ok_or(Error::AmountTooLarge(kind.accumulated_name()))?;

        if attempted > self.accumulated {
            self.check_limit(attempted, policy)?;
        }

        let entry = self
            .entries
            .get_mut(index)
            .ok_or(Error::EntryNotFound(kind))?;
        entry.amount = form.amount.get();
        entry.date = form.date;
        self.accumulated = attempted;

        Ok(())
    }

    /// Remove the entry with `entry_id` and return it.
    ///
    /// # Errors
    ///
    /// Returns [Error::EntryNotFound] if the ledger has no such entry.
    pub fn apply_remove(&mut self, entry_id: DatabaseId) -> Result<LedgerEntry, Error> {
        let index = self.entry_index(entry_id)?;
        let entry = self.entries.remove(index);
        self.accumulated -= entry.amount;

        Ok(entry)
    }

    /// Overwrite the fields that are present in `patch`.
    ///
    /// The entries and running total are left alone.
    pub fn apply_patch(&mut self, patch: LedgerPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }

        if let Some(target) = patch.target {
            self.target = target.get();
        }

        if let Some(reference_date) = patch.reference_date {
            self.reference_date = reference_date;
        }
    }

    fn entry_index(&self, entry_id: DatabaseId) -> Result<usize, Error> {
        self.entries
            .iter()
            .position(|entry| entry.id == entry_id)
            .ok_or(Error::EntryNotFound(self.kind))
    }

    fn check_limit(&self, attempted: Decimal, policy: LimitPolicy) -> Result<(), Error> {
        match policy {
            LimitPolicy::Reject if attempted > self.target => Err(Error::LimitExceeded {
                kind: self.kind,
                attempted,
                target: self.target,
            }),
            _ => Ok(()),
        }
    }
}

/// Ledger fields as they arrive from a client, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerFields {
    /// The requested name.
    pub label: Option<String>,
    /// The requested target.
    pub target: Option<Decimal>,
    /// The requested reference date. `Some(None)` asks for the date to be
    /// cleared, `None` means the field was not sent.
    pub reference_date: Option<Option<Date>>,
}

/// The validated data for creating a ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerForm {
    /// The name of the debt or goal.
    pub label: LedgerLabel,
    /// The amount owed or aimed for.
    pub target: PositiveAmount,
    /// An optional date for the debt or goal.
    pub reference_date: Option<Date>,
}

impl LedgerForm {
    /// Validate the fields for a new ledger of `kind`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name or target is missing or invalid.
    pub fn parse(kind: LedgerKind, fields: LedgerFields) -> Result<Self, Error> {
        let label = fields.label.ok_or(Error::MissingField("name"))?;
        let target = fields
            .target
            .ok_or(Error::MissingField(kind.target_field()))?;

        Ok(Self {
            label: LedgerLabel::new(&label)?,
            target: PositiveAmount::new(target, kind.target_field())?,
            reference_date: fields.reference_date.flatten(),
        })
    }
}

/// A partial update of a ledger's own fields. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerPatch {
    /// A new name.
    pub label: Option<LedgerLabel>,
    /// A new target.
    pub target: Option<PositiveAmount>,
    /// A new reference date, or `Some(None)` to remove it.
    pub reference_date: Option<Option<Date>>,
}

impl LedgerPatch {
    /// Validate the fields that are present.
    ///
    /// # Errors
    ///
    /// A present but invalid field is an error, it is never skipped.
    pub fn parse(kind: LedgerKind, fields: LedgerFields) -> Result<Self, Error> {
        Ok(Self {
            label: fields
                .label
                .as_deref()
                .map(LedgerLabel::new)
                .transpose()?,
            target: fields
                .target
                .map(|target| PositiveAmount::new(target, kind.target_field()))
                .transpose()?,
            reference_date: fields.reference_date,
        })
    }
}

/// Entry fields as they arrive from a client, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFields {
    /// The requested amount.
    pub amount: Option<Decimal>,
    /// The requested date.
    pub date: Option<Date>,
}

/// The validated data for adding or editing an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    /// How much money the entry moves.
    pub amount: PositiveAmount,
    /// The day the money was paid or saved.
    pub date: Date,
}

impl EntryForm {
    /// Validate the fields for an entry on a ledger of `kind`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is missing or not positive,
    /// or if the date is missing.
    pub fn parse(kind: LedgerKind, fields: EntryFields) -> Result<Self, Error> {
        let amount = fields.amount.ok_or(Error::MissingField("amount"))?;
        let date = fields
            .date
            .ok_or(Error::MissingField(kind.entry_date_field()))?;

        Ok(Self {
            amount: PositiveAmount::new(amount, "amount")?,
            date,
        })
    }
}
