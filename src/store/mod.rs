use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::ledger::BudgetReconciler;
use crate::models::{fits_minor_units, NewTransaction, Transaction, TransactionKind, TransactionPatch};

/// Owns transaction lifecycle and notifies the budget ledger of spending
/// deltas after every committed expense write.
pub(crate) struct TransactionStore<R: BudgetReconciler> {
    reconciler: R,
}

impl<R: BudgetReconciler> TransactionStore<R> {
    pub(crate) fn new(reconciler: R) -> Self {
        Self { reconciler }
    }

    pub(crate) fn create(
        &self,
        db: &Database,
        owner: &str,
        new: &NewTransaction,
        today: NaiveDate,
    ) -> Result<Transaction> {
        let mut txn = Transaction {
            id: None,
            owner: owner.to_string(),
            kind: new.kind,
            category: new.category.trim().to_string(),
            description: new.description.trim().to_string(),
            notes: new.notes.trim().to_string(),
            amount: new.amount,
            date: new.date.unwrap_or(today),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        validate(&txn)?;

        let id = db.insert_transaction(&txn)?;
        txn.id = Some(id);

        if txn.is_expense() {
            self.reconcile(db, owner, &txn.category, txn.date, txn.amount);
        }
        Ok(txn)
    }

    /// Apply an allow-listed patch. Budget-wise this is a delete-then-create:
    /// the old record's contribution is withdrawn and the new record's is
    /// added, each against its own budget lookup, which covers amount edits,
    /// category and date moves, and kind flips in either direction.
    pub(crate) fn update(
        &self,
        db: &Database,
        owner: &str,
        id: i64,
        patch: &TransactionPatch,
    ) -> Result<Transaction> {
        if patch.is_empty() {
            return Err(Error::Validation("Nothing to update".into()));
        }

        let old = db
            .get_transaction(owner, id)?
            .ok_or(Error::NotFound("Transaction"))?;

        let mut updated = old.clone();
        patch.apply(&mut updated);
        validate(&updated)?;

        if !db.update_transaction(&updated)? {
            return Err(Error::NotFound("Transaction"));
        }

        if old.is_expense() {
            self.reconcile(db, owner, &old.category, old.date, -old.amount);
        }
        if updated.is_expense() {
            self.reconcile(db, owner, &updated.category, updated.date, updated.amount);
        }
        Ok(updated)
    }

    pub(crate) fn delete(&self, db: &Database, owner: &str, id: i64) -> Result<()> {
        let old = db
            .get_transaction(owner, id)?
            .ok_or(Error::NotFound("Transaction"))?;

        if !db.delete_transaction(owner, id)? {
            return Err(Error::NotFound("Transaction"));
        }

        if old.is_expense() {
            self.reconcile(db, owner, &old.category, old.date, -old.amount);
        }
        Ok(())
    }

    pub(crate) fn get(&self, db: &Database, owner: &str, id: i64) -> Result<Transaction> {
        db.get_transaction(owner, id)?
            .ok_or(Error::NotFound("Transaction"))
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn list(
        &self,
        db: &Database,
        owner: &str,
        kind: Option<TransactionKind>,
        category: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        search: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        Ok(db.get_transactions(owner, kind, category, from, to, search)?)
    }

    /// The transaction write has already committed; a failed budget update
    /// must not roll it back. The stale `spent` is recoverable through
    /// `recompute_spent`, so log and move on.
    fn reconcile(&self, db: &Database, owner: &str, category: &str, on: NaiveDate, delta: Decimal) {
        if let Err(e) = self.reconciler.apply_delta(db, owner, category, on, delta) {
            warn!(owner, category, %on, %delta, error = %e, "budget reconciliation failed; spent may be stale");
        }
    }
}

fn validate(txn: &Transaction) -> Result<()> {
    if txn.amount <= Decimal::ZERO {
        return Err(Error::Validation("Amount must be greater than 0".into()));
    }
    if !fits_minor_units(txn.amount) {
        return Err(Error::Validation(
            "Amount cannot have more than two decimal places".into(),
        ));
    }
    if txn.category.is_empty() || txn.category.len() > 50 {
        return Err(Error::Validation(
            "Category is required and must be less than 50 characters".into(),
        ));
    }
    if txn.description.is_empty() || txn.description.len() > 200 {
        return Err(Error::Validation(
            "Description is required and must be less than 200 characters".into(),
        ));
    }
    if txn.notes.len() > 500 {
        return Err(Error::Validation(
            "Notes must be less than 500 characters".into(),
        ));
    }
    Ok(())
}
