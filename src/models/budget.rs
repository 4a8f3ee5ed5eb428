use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::period::{Period, Window};

/// A spending cap for one category over one fixed window.
///
/// `spent` is derived from the owner's matching expense transactions but
/// persisted for fast reads; it is kept in sync by reconciliation and can
/// be rebuilt from the transaction set at any time.
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    pub id: Option<i64>,
    pub owner: String,
    pub category: String,
    pub period: Period,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub limit: Decimal,
    pub spent: Decimal,
    pub alert_threshold: u8,
    pub is_active: bool,
    pub created_at: String,
}

impl Budget {
    pub(crate) fn window(&self) -> Window {
        Window {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Share of the limit consumed, as a percentage. Zero when there is no
    /// limit to consume.
    pub(crate) fn percentage_used(&self) -> Decimal {
        if self.limit > Decimal::ZERO {
            self.spent / self.limit * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    pub(crate) fn is_exceeded(&self) -> bool {
        self.spent > self.limit
    }

    pub(crate) fn alert_triggered(&self) -> bool {
        self.percentage_used() >= Decimal::from(self.alert_threshold)
    }
}

/// Input for creating a budget. The window is derived from `period` and the
/// creation date, never supplied directly.
#[derive(Debug, Clone)]
pub(crate) struct NewBudget {
    pub category: String,
    pub period: Period,
    pub limit: Decimal,
    pub alert_threshold: u8,
}

impl NewBudget {
    pub(crate) const DEFAULT_ALERT_THRESHOLD: u8 = 80;
}

/// Owner-editable budget fields. The window and `spent` are off-limits:
/// the window is fixed at creation and `spent` only moves through
/// reconciliation or recompute.
#[derive(Debug, Clone, Default)]
pub(crate) struct BudgetPatch {
    pub limit: Option<Decimal>,
    pub alert_threshold: Option<u8>,
    pub is_active: Option<bool>,
}

impl BudgetPatch {
    pub(crate) fn is_empty(&self) -> bool {
        self.limit.is_none() && self.alert_threshold.is_none() && self.is_active.is_none()
    }
}
