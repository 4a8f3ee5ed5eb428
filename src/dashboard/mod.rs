use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Budget, Period, Window};

/// One category's share of the month's expenses.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategorySpend {
    pub category: String,
    pub amount: Decimal,
    pub percentage: Decimal,
}

/// One month in the trailing series.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlyPoint {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
}

#[derive(Debug)]
pub(crate) struct DashboardSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub savings: Decimal,
    pub expenses_by_category: Vec<CategorySpend>,
    pub monthly_data: Vec<MonthlyPoint>,
    pub active_budgets: Vec<Budget>,
}

/// Read-only monthly aggregation for one owner: current-month totals,
/// category shares of expenses (largest first), a trailing six-month
/// series oldest first, and the budgets active today.
pub(crate) fn summary(db: &Database, owner: &str, today: NaiveDate) -> Result<DashboardSummary> {
    let month = Window::for_period(Period::Monthly, today);
    let (total_income, total_expenses) = db.totals_in_window(owner, &month)?;

    let expenses_by_category = db
        .spending_by_category(owner, &month)?
        .into_iter()
        .map(|(category, amount)| CategorySpend {
            category,
            percentage: if total_expenses > Decimal::ZERO {
                amount / total_expenses * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            },
            amount,
        })
        .collect();

    let mut monthly_data = Vec::with_capacity(6);
    for back in (0..6).rev() {
        let anchor = today
            .checked_sub_months(Months::new(back))
            .unwrap_or(today);
        let window = Window::for_period(Period::Monthly, anchor);
        let (income, expenses) = db.totals_in_window(owner, &window)?;
        monthly_data.push(MonthlyPoint {
            month: window.start.format("%b").to_string(),
            income,
            expenses,
            savings: income - expenses,
        });
    }

    Ok(DashboardSummary {
        total_income,
        total_expenses,
        savings: total_income - total_expenses,
        expenses_by_category,
        monthly_data,
        active_budgets: db.get_active_budgets(owner, today)?,
    })
}

#[cfg(test)]
mod tests;
