pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    owner       TEXT NOT NULL,
    kind        TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
    category    TEXT NOT NULL,
    description TEXT NOT NULL,
    notes       TEXT NOT NULL DEFAULT '',
    amount      INTEGER NOT NULL CHECK (amount > 0),
    date        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_owner_date ON transactions(owner, date);
CREATE INDEX IF NOT EXISTS idx_transactions_owner_category ON transactions(owner, category);
CREATE INDEX IF NOT EXISTS idx_transactions_owner_kind ON transactions(owner, kind);

CREATE TABLE IF NOT EXISTS budgets (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    owner           TEXT NOT NULL,
    category        TEXT NOT NULL,
    period          TEXT NOT NULL CHECK (period IN ('weekly', 'monthly', 'yearly')),
    start_date      TEXT NOT NULL,
    end_date        TEXT NOT NULL,
    limit_amount    INTEGER NOT NULL CHECK (limit_amount >= 0),
    spent           INTEGER NOT NULL DEFAULT 0 CHECK (spent >= 0),
    alert_threshold INTEGER NOT NULL DEFAULT 80 CHECK (alert_threshold BETWEEN 0 AND 100),
    is_active       BOOLEAN NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_budgets_owner_category ON budgets(owner, category);
CREATE UNIQUE INDEX IF NOT EXISTS idx_budgets_unique_window
    ON budgets(owner, category, start_date, end_date) WHERE is_active = 1;

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // Future migrations go here:
    // (1, "ALTER TABLE transactions ADD COLUMN currency TEXT NOT NULL DEFAULT 'USD';"),
];
