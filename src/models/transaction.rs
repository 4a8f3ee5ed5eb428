use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income or expense entry. Amount is always positive; the kind
/// carries the sign. Kind and category classify the entry for aggregation
/// and budget matching.
#[derive(Debug, Clone)]
pub(crate) struct Transaction {
    pub id: Option<i64>,
    pub owner: String,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub notes: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub created_at: String,
}

impl Transaction {
    pub(crate) fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

/// Input for creating a transaction. `date` defaults to today when absent.
#[derive(Debug, Clone)]
pub(crate) struct NewTransaction {
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub notes: String,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
}

/// Owner-editable transaction fields. Anything not listed here cannot be
/// changed after creation.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

impl TransactionPatch {
    pub(crate) fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.notes.is_none()
            && self.amount.is_none()
            && self.date.is_none()
    }

    pub(crate) fn apply(&self, txn: &mut Transaction) {
        if let Some(kind) = self.kind {
            txn.kind = kind;
        }
        if let Some(category) = &self.category {
            txn.category = category.trim().to_string();
        }
        if let Some(description) = &self.description {
            txn.description = description.trim().to_string();
        }
        if let Some(notes) = &self.notes {
            txn.notes = notes.trim().to_string();
        }
        if let Some(amount) = self.amount {
            txn.amount = amount;
        }
        if let Some(date) = self.date {
            txn.date = date;
        }
    }
}
