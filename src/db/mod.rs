mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;

use crate::models::*;

/// Convert a model amount into minor units (cents) for storage.
///
/// Monetary columns are INTEGER minor units so that `spent` adjustments can
/// be exact SQL-side increments. Callers validate two-decimal precision
/// before amounts get here.
pub(crate) fn to_minor_units(amount: Decimal) -> Result<i64> {
    let scaled = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .with_context(|| format!("Amount out of range: {amount}"))?;
    if !scaled.fract().is_zero() {
        anyhow::bail!("Amount has sub-cent precision: {amount}");
    }
    scaled
        .trunc()
        .to_i64()
        .with_context(|| format!("Amount out of range: {amount}"))
}

pub(crate) fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (owner, kind, category, description, notes, amount, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                txn.owner,
                txn.kind.as_str(),
                txn.category,
                txn.description,
                txn.notes,
                to_minor_units(txn.amount)?,
                txn.date,
                txn.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_transaction(&self, owner: &str, id: i64) -> Result<Option<Transaction>> {
        let result = self.conn.query_row(
            "SELECT id, owner, kind, category, description, notes, amount, date, created_at
             FROM transactions WHERE id = ?1 AND owner = ?2",
            params![id, owner],
            map_transaction,
        );
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_transactions(
        &self,
        owner: &str,
        kind: Option<TransactionKind>,
        category: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        search: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let mut sql = String::from(
            "SELECT id, owner, kind, category, description, notes, amount, date, created_at
             FROM transactions WHERE owner = ?1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(owner.to_string())];

        if let Some(k) = kind {
            sql.push_str(&format!(" AND kind = ?{}", param_values.len() + 1));
            param_values.push(Box::new(k.as_str()));
        }
        if let Some(c) = category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(c.to_string()));
        }
        if let Some(f) = from {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(f));
        }
        if let Some(t) = to {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(t));
        }
        if let Some(s) = search {
            sql.push_str(&format!(
                " AND (description LIKE ?{0} OR notes LIKE ?{0})",
                param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{s}%")));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), map_transaction)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn update_transaction(&self, txn: &Transaction) -> Result<bool> {
        let id = txn.id.ok_or_else(|| anyhow::anyhow!("Transaction has no ID"))?;
        let changed = self.conn.execute(
            "UPDATE transactions
             SET kind = ?1, category = ?2, description = ?3, notes = ?4, amount = ?5, date = ?6
             WHERE id = ?7 AND owner = ?8",
            params![
                txn.kind.as_str(),
                txn.category,
                txn.description,
                txn.notes,
                to_minor_units(txn.amount)?,
                txn.date,
                id,
                txn.owner,
            ],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn delete_transaction(&self, owner: &str, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;
        Ok(changed > 0)
    }

    // ── Budgets ───────────────────────────────────────────────

    /// Insert a budget unless an active budget for the same owner and
    /// category has an overlapping window (closed intervals). The overlap
    /// guard lives inside the INSERT so two concurrent creations cannot
    /// both pass a separate pre-check; the partial unique index backs it
    /// up for identical windows. Returns `None` when the insert lost.
    pub(crate) fn insert_budget(&self, budget: &Budget) -> Result<Option<i64>> {
        let result = self.conn.execute(
            "INSERT INTO budgets (owner, category, period, start_date, end_date,
                                  limit_amount, spent, alert_threshold, is_active, created_at)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
             WHERE NOT EXISTS (
                 SELECT 1 FROM budgets
                 WHERE owner = ?1 AND category = ?2 AND is_active = 1
                   AND start_date <= ?5 AND end_date >= ?4
             )",
            params![
                budget.owner,
                budget.category,
                budget.period.as_str(),
                budget.start_date,
                budget.end_date,
                to_minor_units(budget.limit)?,
                to_minor_units(budget.spent)?,
                budget.alert_threshold,
                budget.is_active,
                budget.created_at,
            ],
        );
        match result {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(self.conn.last_insert_rowid())),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_budget(&self, owner: &str, id: i64) -> Result<Option<Budget>> {
        let result = self.conn.query_row(
            "SELECT id, owner, category, period, start_date, end_date,
                    limit_amount, spent, alert_threshold, is_active, created_at
             FROM budgets WHERE id = ?1 AND owner = ?2",
            params![id, owner],
            map_budget,
        );
        match result {
            Ok(b) => Ok(Some(b)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_budgets(&self, owner: &str) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, category, period, start_date, end_date,
                    limit_amount, spent, alert_threshold, is_active, created_at
             FROM budgets WHERE owner = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![owner], map_budget)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Active budgets whose window contains `on`.
    pub(crate) fn get_active_budgets(&self, owner: &str, on: NaiveDate) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, category, period, start_date, end_date,
                    limit_amount, spent, alert_threshold, is_active, created_at
             FROM budgets
             WHERE owner = ?1 AND is_active = 1 AND start_date <= ?2 AND end_date >= ?2
             ORDER BY category",
        )?;
        let rows = stmt.query_map(params![owner, on], map_budget)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Persist the owner-editable settings. The window and `spent` are
    /// deliberately not part of this statement.
    pub(crate) fn update_budget_settings(&self, budget: &Budget) -> Result<bool> {
        let id = budget.id.ok_or_else(|| anyhow::anyhow!("Budget has no ID"))?;
        let changed = self.conn.execute(
            "UPDATE budgets SET limit_amount = ?1, alert_threshold = ?2, is_active = ?3
             WHERE id = ?4 AND owner = ?5",
            params![
                to_minor_units(budget.limit)?,
                budget.alert_threshold,
                budget.is_active,
                id,
                budget.owner,
            ],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn set_budget_spent(&self, owner: &str, id: i64, spent: Decimal) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE budgets SET spent = ?1 WHERE id = ?2 AND owner = ?3",
            params![to_minor_units(spent)?, id, owner],
        )?;
        Ok(changed > 0)
    }

    /// Atomically adjust `spent` on the owner's active budget whose window
    /// contains `on`, clamping at zero. The increment happens inside SQL so
    /// concurrent reconciliations cannot lose updates. Returns the number
    /// of budgets touched (0 or, by the overlap invariant, 1).
    pub(crate) fn increment_budget_spent(
        &self,
        owner: &str,
        category: &str,
        on: NaiveDate,
        delta: Decimal,
    ) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE budgets SET spent = MAX(0, spent + ?1)
             WHERE owner = ?2 AND category = ?3 AND is_active = 1
               AND start_date <= ?4 AND end_date >= ?4",
            params![to_minor_units(delta)?, owner, category, on],
        )?;
        Ok(changed)
    }

    pub(crate) fn delete_budget(&self, owner: &str, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM budgets WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;
        Ok(changed > 0)
    }

    // ── Aggregation ───────────────────────────────────────────

    /// Sum of the owner's expense amounts for one category inside a window.
    /// Seeds `spent` at budget creation and backs `recompute_spent`.
    pub(crate) fn sum_expenses_in_window(
        &self,
        owner: &str,
        category: &str,
        window: &Window,
    ) -> Result<Decimal> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions
             WHERE owner = ?1 AND category = ?2 AND kind = 'expense'
               AND date >= ?3 AND date <= ?4",
            params![owner, category, window.start, window.end],
            |row| row.get(0),
        )?;
        Ok(from_minor_units(total))
    }

    /// (income, expenses) totals for the owner inside a window.
    pub(crate) fn totals_in_window(&self, owner: &str, window: &Window) -> Result<(Decimal, Decimal)> {
        let (income, expenses): (i64, i64) = self.conn.query_row(
            "SELECT COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount ELSE 0 END), 0)
             FROM transactions
             WHERE owner = ?1 AND date >= ?2 AND date <= ?3",
            params![owner, window.start, window.end],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((from_minor_units(income), from_minor_units(expenses)))
    }

    /// Expense totals per category inside a window, largest first.
    pub(crate) fn spending_by_category(
        &self,
        owner: &str,
        window: &Window,
    ) -> Result<Vec<(String, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, SUM(amount) FROM transactions
             WHERE owner = ?1 AND kind = 'expense' AND date >= ?2 AND date <= ?3
             GROUP BY category
             ORDER BY SUM(amount) DESC, category",
        )?;
        let rows = stmt.query_map(params![owner, window.start, window.end], |row| {
            Ok((row.get::<_, String>(0)?, from_minor_units(row.get(1)?)))
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn map_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(2)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        owner: row.get(1)?,
        // CHECK constraint keeps the column well-formed
        kind: TransactionKind::parse(&kind).unwrap_or(TransactionKind::Expense),
        category: row.get(3)?,
        description: row.get(4)?,
        notes: row.get(5)?,
        amount: from_minor_units(row.get(6)?),
        date: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_budget(row: &rusqlite::Row<'_>) -> rusqlite::Result<Budget> {
    let period: String = row.get(3)?;
    Ok(Budget {
        id: Some(row.get(0)?),
        owner: row.get(1)?,
        category: row.get(2)?,
        period: Period::parse(&period).unwrap_or(Period::Monthly),
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        limit: from_minor_units(row.get(6)?),
        spent: from_minor_units(row.get(7)?),
        alert_threshold: row.get(8)?,
        is_active: row.get(9)?,
        created_at: row.get(10)?,
    })
}
