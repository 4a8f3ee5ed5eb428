#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ── Period windows ────────────────────────────────────────────

#[test]
fn test_weekly_window_from_midweek() {
    // 2024-01-10 is a Wednesday; the week began Sunday the 7th.
    let w = Window::for_period(Period::Weekly, d(2024, 1, 10));
    assert_eq!(w.start, d(2024, 1, 7));
    assert_eq!(w.end, d(2024, 1, 13));
}

#[test]
fn test_weekly_window_from_sunday() {
    // 2024-01-07 is a Sunday and starts its own week.
    let w = Window::for_period(Period::Weekly, d(2024, 1, 7));
    assert_eq!(w.start, d(2024, 1, 7));
    assert_eq!(w.end, d(2024, 1, 13));
}

#[test]
fn test_weekly_window_across_month_boundary() {
    // 2024-02-01 is a Thursday; the week began Sunday Jan 28.
    let w = Window::for_period(Period::Weekly, d(2024, 2, 1));
    assert_eq!(w.start, d(2024, 1, 28));
    assert_eq!(w.end, d(2024, 2, 3));
}

#[test]
fn test_monthly_window() {
    let w = Window::for_period(Period::Monthly, d(2024, 1, 15));
    assert_eq!(w.start, d(2024, 1, 1));
    assert_eq!(w.end, d(2024, 1, 31));
}

#[test]
fn test_monthly_window_leap_february() {
    let w = Window::for_period(Period::Monthly, d(2024, 2, 10));
    assert_eq!(w.end, d(2024, 2, 29));

    let w = Window::for_period(Period::Monthly, d(2023, 2, 10));
    assert_eq!(w.end, d(2023, 2, 28));
}

#[test]
fn test_monthly_window_december() {
    let w = Window::for_period(Period::Monthly, d(2023, 12, 25));
    assert_eq!(w.start, d(2023, 12, 1));
    assert_eq!(w.end, d(2023, 12, 31));
}

#[test]
fn test_yearly_window() {
    let w = Window::for_period(Period::Yearly, d(2024, 6, 30));
    assert_eq!(w.start, d(2024, 1, 1));
    assert_eq!(w.end, d(2024, 12, 31));
}

#[test]
fn test_window_contains_endpoints() {
    let w = Window {
        start: d(2024, 1, 1),
        end: d(2024, 1, 31),
    };
    assert!(w.contains(d(2024, 1, 1)));
    assert!(w.contains(d(2024, 1, 31)));
    assert!(!w.contains(d(2023, 12, 31)));
    assert!(!w.contains(d(2024, 2, 1)));
}

#[test]
fn test_window_overlap_is_closed_interval() {
    let january = Window {
        start: d(2024, 1, 1),
        end: d(2024, 1, 31),
    };
    let touching = Window {
        start: d(2024, 1, 31),
        end: d(2024, 2, 29),
    };
    let disjoint = Window {
        start: d(2024, 2, 1),
        end: d(2024, 2, 29),
    };
    assert!(january.overlaps(&touching));
    assert!(touching.overlaps(&january));
    assert!(!january.overlaps(&disjoint));
    assert!(!disjoint.overlaps(&january));
}

#[test]
fn test_period_parse_round_trip() {
    for period in [Period::Weekly, Period::Monthly, Period::Yearly] {
        assert_eq!(Period::parse(period.as_str()), Some(period));
    }
    assert_eq!(Period::parse("Monthly"), Some(Period::Monthly));
    assert_eq!(Period::parse("daily"), None);
}

// ── Transaction ───────────────────────────────────────────────

fn make_txn(kind: TransactionKind, amount: Decimal) -> Transaction {
    Transaction {
        id: None,
        owner: "alice".into(),
        kind,
        category: "Food".into(),
        description: "Test".into(),
        notes: String::new(),
        amount,
        date: d(2024, 1, 15),
        created_at: String::new(),
    }
}

#[test]
fn test_kind_parse() {
    assert_eq!(TransactionKind::parse("expense"), Some(TransactionKind::Expense));
    assert_eq!(TransactionKind::parse("Income"), Some(TransactionKind::Income));
    assert_eq!(TransactionKind::parse("transfer"), None);
}

#[test]
fn test_is_expense() {
    assert!(make_txn(TransactionKind::Expense, dec!(5)).is_expense());
    assert!(!make_txn(TransactionKind::Income, dec!(5)).is_expense());
}

#[test]
fn test_patch_applies_only_present_fields() {
    let mut txn = make_txn(TransactionKind::Expense, dec!(45.00));
    let patch = TransactionPatch {
        amount: Some(dec!(100.00)),
        category: Some("  Groceries ".into()),
        ..Default::default()
    };
    patch.apply(&mut txn);
    assert_eq!(txn.amount, dec!(100.00));
    assert_eq!(txn.category, "Groceries");
    assert_eq!(txn.kind, TransactionKind::Expense);
    assert_eq!(txn.description, "Test");
    assert_eq!(txn.date, d(2024, 1, 15));
}

#[test]
fn test_empty_patch() {
    assert!(TransactionPatch::default().is_empty());
    assert!(!TransactionPatch {
        amount: Some(dec!(1)),
        ..Default::default()
    }
    .is_empty());
}

// ── Budget derived facts ──────────────────────────────────────

fn make_budget(limit: Decimal, spent: Decimal, threshold: u8) -> Budget {
    Budget {
        id: Some(1),
        owner: "alice".into(),
        category: "Food".into(),
        period: Period::Monthly,
        start_date: d(2024, 1, 1),
        end_date: d(2024, 1, 31),
        limit,
        spent,
        alert_threshold: threshold,
        is_active: true,
        created_at: String::new(),
    }
}

#[test]
fn test_percentage_used() {
    let budget = make_budget(dec!(500), dec!(100), 80);
    assert_eq!(budget.percentage_used(), dec!(20));
}

#[test]
fn test_percentage_used_zero_limit() {
    let budget = make_budget(Decimal::ZERO, dec!(50), 80);
    assert_eq!(budget.percentage_used(), Decimal::ZERO);
    assert!(budget.is_exceeded());
}

#[test]
fn test_is_exceeded_at_exact_limit() {
    // Spending the whole limit is not an overrun.
    let budget = make_budget(dec!(500), dec!(500), 80);
    assert!(!budget.is_exceeded());
    assert!(make_budget(dec!(500), dec!(500.01), 80).is_exceeded());
}

#[test]
fn test_alert_triggered_at_threshold() {
    // >= threshold triggers, strictly below does not.
    assert!(make_budget(dec!(500), dec!(400), 80).alert_triggered());
    assert!(!make_budget(dec!(500), dec!(399.99), 80).alert_triggered());
    assert!(make_budget(dec!(500), dec!(450), 80).alert_triggered());
}

#[test]
fn test_budget_window_accessor() {
    let budget = make_budget(dec!(500), Decimal::ZERO, 80);
    assert!(budget.window().contains(d(2024, 1, 20)));
    assert!(!budget.window().contains(d(2024, 2, 1)));
}

// ── Money precision ───────────────────────────────────────────

#[test]
fn test_fits_minor_units() {
    assert!(fits_minor_units(dec!(10)));
    assert!(fits_minor_units(dec!(10.99)));
    assert!(fits_minor_units(dec!(10.990)));
    assert!(!fits_minor_units(dec!(10.999)));
}
