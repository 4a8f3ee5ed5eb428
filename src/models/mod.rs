mod budget;
mod period;
mod transaction;

pub(crate) use budget::{Budget, BudgetPatch, NewBudget};
pub(crate) use period::{Period, Window};
pub(crate) use transaction::{NewTransaction, Transaction, TransactionKind, TransactionPatch};

use rust_decimal::Decimal;

/// True when the value fits currency minor-unit precision (two decimal places).
pub(crate) fn fits_minor_units(amount: Decimal) -> bool {
    amount.normalize().scale() <= 2
}

#[cfg(test)]
mod tests;
