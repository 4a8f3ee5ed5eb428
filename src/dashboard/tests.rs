#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{Transaction, TransactionKind};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn insert(db: &Database, owner: &str, kind: TransactionKind, category: &str, amount: Decimal, date: NaiveDate) {
    db.insert_transaction(&Transaction {
        id: None,
        owner: owner.into(),
        kind,
        category: category.into(),
        description: format!("{category} entry"),
        notes: String::new(),
        amount,
        date,
        created_at: String::new(),
    })
    .unwrap();
}

#[test]
fn test_current_month_totals_and_savings() {
    let db = Database::open_in_memory().unwrap();
    insert(&db, "alice", TransactionKind::Income, "Salary", dec!(3000), d(2024, 1, 1));
    insert(&db, "alice", TransactionKind::Expense, "Rent", dec!(1200), d(2024, 1, 2));
    insert(&db, "alice", TransactionKind::Expense, "Food", dec!(300), d(2024, 1, 20));
    // Previous month stays out of the current totals
    insert(&db, "alice", TransactionKind::Expense, "Food", dec!(999), d(2023, 12, 28));
    // Other owners never leak in
    insert(&db, "bob", TransactionKind::Income, "Salary", dec!(5000), d(2024, 1, 5));

    let summary = summary(&db, "alice", d(2024, 1, 25)).unwrap();
    assert_eq!(summary.total_income, dec!(3000));
    assert_eq!(summary.total_expenses, dec!(1500));
    assert_eq!(summary.savings, dec!(1500));
}

#[test]
fn test_expenses_by_category_shares() {
    let db = Database::open_in_memory().unwrap();
    insert(&db, "alice", TransactionKind::Expense, "Rent", dec!(1200), d(2024, 1, 2));
    insert(&db, "alice", TransactionKind::Expense, "Food", dec!(300), d(2024, 1, 10));
    insert(&db, "alice", TransactionKind::Expense, "Food", dec!(100), d(2024, 1, 12));
    insert(&db, "alice", TransactionKind::Income, "Salary", dec!(3000), d(2024, 1, 1));

    let summary = summary(&db, "alice", d(2024, 1, 25)).unwrap();
    assert_eq!(
        summary.expenses_by_category,
        vec![
            CategorySpend {
                category: "Rent".into(),
                amount: dec!(1200),
                percentage: dec!(75),
            },
            CategorySpend {
                category: "Food".into(),
                amount: dec!(400),
                percentage: dec!(25),
            },
        ]
    );
}

#[test]
fn test_no_expenses_guards_division() {
    let db = Database::open_in_memory().unwrap();
    insert(&db, "alice", TransactionKind::Income, "Salary", dec!(3000), d(2024, 1, 1));

    let summary = summary(&db, "alice", d(2024, 1, 25)).unwrap();
    assert!(summary.expenses_by_category.is_empty());
    assert_eq!(summary.total_expenses, Decimal::ZERO);
    assert_eq!(summary.savings, dec!(3000));
}

#[test]
fn test_trailing_six_months_oldest_first() {
    let db = Database::open_in_memory().unwrap();
    // One income/expense pair per month from Aug 2023 through Jan 2024
    for (y, m) in [(2023, 8), (2023, 9), (2023, 10), (2023, 11), (2023, 12), (2024, 1)] {
        insert(&db, "alice", TransactionKind::Income, "Salary", dec!(1000), d(y, m, 5));
        insert(&db, "alice", TransactionKind::Expense, "Rent", dec!(400), d(y, m, 6));
    }
    // Too old to appear
    insert(&db, "alice", TransactionKind::Expense, "Rent", dec!(400), d(2023, 7, 6));

    let summary = summary(&db, "alice", d(2024, 1, 25)).unwrap();
    let months: Vec<&str> = summary.monthly_data.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(months, vec!["Aug", "Sep", "Oct", "Nov", "Dec", "Jan"]);
    for point in &summary.monthly_data {
        assert_eq!(point.income, dec!(1000));
        assert_eq!(point.expenses, dec!(400));
        assert_eq!(point.savings, dec!(600));
    }
}

#[test]
fn test_six_month_series_includes_empty_months() {
    let db = Database::open_in_memory().unwrap();
    insert(&db, "alice", TransactionKind::Expense, "Food", dec!(50), d(2024, 1, 10));

    let summary = summary(&db, "alice", d(2024, 1, 25)).unwrap();
    assert_eq!(summary.monthly_data.len(), 6);
    assert_eq!(summary.monthly_data[5].expenses, dec!(50));
    for point in &summary.monthly_data[..5] {
        assert_eq!(point.income, Decimal::ZERO);
        assert_eq!(point.expenses, Decimal::ZERO);
    }
}

#[test]
fn test_active_budgets_listed() {
    let db = Database::open_in_memory().unwrap();
    let ledger = crate::ledger::BudgetLedger;
    ledger
        .create_budget(
            &db,
            "alice",
            &crate::models::NewBudget {
                category: "Food".into(),
                period: crate::models::Period::Monthly,
                limit: dec!(500),
                alert_threshold: 80,
            },
            d(2024, 1, 5),
        )
        .unwrap();
    // A December budget is no longer active in January
    ledger
        .create_budget(
            &db,
            "alice",
            &crate::models::NewBudget {
                category: "Gifts".into(),
                period: crate::models::Period::Monthly,
                limit: dec!(200),
                alert_threshold: 80,
            },
            d(2023, 12, 10),
        )
        .unwrap();

    let summary = summary(&db, "alice", d(2024, 1, 25)).unwrap();
    assert_eq!(summary.active_budgets.len(), 1);
    assert_eq!(summary.active_budgets[0].category, "Food");
}
