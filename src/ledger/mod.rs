use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{fits_minor_units, Budget, BudgetPatch, NewBudget, Window};

/// The seam between the transaction store and the budget ledger: a
/// one-directional, synchronous notification of a signed spending delta.
pub(crate) trait BudgetReconciler {
    /// Adjust `spent` on the owner's active budget for `category` whose
    /// window contains `on`. A miss is a silent no-op: spending outside
    /// any budget window simply is not tracked.
    fn apply_delta(
        &self,
        db: &Database,
        owner: &str,
        category: &str,
        on: NaiveDate,
        delta: Decimal,
    ) -> Result<()>;
}

/// Owns budget lifecycle and keeps `spent` synchronized with the
/// transaction set.
pub(crate) struct BudgetLedger;

impl BudgetLedger {
    /// Create a budget anchored at `today`: derive the window from the
    /// period, seed `spent` from the owner's matching in-window expenses,
    /// and insert unless an active budget overlaps.
    pub(crate) fn create_budget(
        &self,
        db: &Database,
        owner: &str,
        new: &NewBudget,
        today: NaiveDate,
    ) -> Result<Budget> {
        let category = new.category.trim();
        if category.is_empty() || category.len() > 50 {
            return Err(Error::Validation(
                "Category is required and must be less than 50 characters".into(),
            ));
        }
        validate_limit(new.limit)?;
        validate_threshold(new.alert_threshold)?;

        let window = Window::for_period(new.period, today);
        let spent = db.sum_expenses_in_window(owner, category, &window)?;

        let budget = Budget {
            id: None,
            owner: owner.to_string(),
            category: category.to_string(),
            period: new.period,
            start_date: window.start,
            end_date: window.end,
            limit: new.limit,
            spent,
            alert_threshold: new.alert_threshold,
            is_active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        match db.insert_budget(&budget)? {
            Some(id) => {
                info!(owner, category, period = %new.period, "budget created");
                Ok(Budget {
                    id: Some(id),
                    ..budget
                })
            }
            None => Err(Error::Conflict(
                "Budget already exists for this category and period".into(),
            )),
        }
    }

    /// Apply an allow-listed settings patch. The window and `spent` are
    /// never touched here.
    pub(crate) fn update_budget(
        &self,
        db: &Database,
        owner: &str,
        id: i64,
        patch: &BudgetPatch,
    ) -> Result<Budget> {
        if patch.is_empty() {
            return Err(Error::Validation("Nothing to update".into()));
        }
        if let Some(limit) = patch.limit {
            validate_limit(limit)?;
        }
        if let Some(threshold) = patch.alert_threshold {
            validate_threshold(threshold)?;
        }

        let mut budget = db
            .get_budget(owner, id)?
            .ok_or(Error::NotFound("Budget"))?;

        if let Some(limit) = patch.limit {
            budget.limit = limit;
        }
        if let Some(threshold) = patch.alert_threshold {
            budget.alert_threshold = threshold;
        }
        if let Some(active) = patch.is_active {
            budget.is_active = active;
        }

        if !db.update_budget_settings(&budget)? {
            return Err(Error::NotFound("Budget"));
        }
        Ok(budget)
    }

    /// Delete a budget. Transactions are untouched; the reference runs
    /// from budget to category, never the other way.
    pub(crate) fn delete_budget(&self, db: &Database, owner: &str, id: i64) -> Result<()> {
        if !db.delete_budget(owner, id)? {
            return Err(Error::NotFound("Budget"));
        }
        Ok(())
    }

    pub(crate) fn budgets(&self, db: &Database, owner: &str) -> Result<Vec<Budget>> {
        Ok(db.get_budgets(owner)?)
    }

    pub(crate) fn active_budgets(
        &self,
        db: &Database,
        owner: &str,
        on: NaiveDate,
    ) -> Result<Vec<Budget>> {
        Ok(db.get_active_budgets(owner, on)?)
    }

    /// Re-derive `spent` from the source transaction set and overwrite the
    /// persisted figure. This is the recovery path for reconciliation
    /// updates lost to transient storage failures, and for anything the
    /// clamp-at-zero may have masked.
    pub(crate) fn recompute_spent(&self, db: &Database, owner: &str, id: i64) -> Result<Budget> {
        let mut budget = db
            .get_budget(owner, id)?
            .ok_or(Error::NotFound("Budget"))?;

        let spent = db.sum_expenses_in_window(owner, &budget.category, &budget.window())?;
        db.set_budget_spent(owner, id, spent)?;
        info!(owner, category = %budget.category, %spent, "budget spent recomputed");
        budget.spent = spent;
        Ok(budget)
    }
}

impl BudgetReconciler for BudgetLedger {
    fn apply_delta(
        &self,
        db: &Database,
        owner: &str,
        category: &str,
        on: NaiveDate,
        delta: Decimal,
    ) -> Result<()> {
        // Matched by the transaction's own date, so backdated writes hit
        // the historically-correct window.
        let touched = db.increment_budget_spent(owner, category, on, delta)?;
        if touched == 0 {
            debug!(owner, category, %on, "no active budget for delta; spending untracked");
        }
        Ok(())
    }
}

fn validate_limit(limit: Decimal) -> Result<()> {
    if limit < Decimal::ZERO || !fits_minor_units(limit) {
        return Err(Error::Validation(
            "Budget limit must be a positive number".into(),
        ));
    }
    Ok(())
}

fn validate_threshold(threshold: u8) -> Result<()> {
    if threshold > 100 {
        return Err(Error::Validation(
            "Alert threshold must be between 0 and 100".into(),
        ));
    }
    Ok(())
}
