use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::dashboard;
use crate::db::Database;
use crate::ledger::BudgetLedger;
use crate::models::*;
use crate::store::TransactionStore;

pub(crate) fn as_cli(args: &[String], db: &Database) -> Result<()> {
    let owner = flag(args, "--user")
        .map(str::to_string)
        .or_else(|| std::env::var("FINTRACK_USER").ok())
        .unwrap_or_else(|| "default".into());
    let today = chrono::Local::now().date_naive();

    // Drop the --user pair so commands see only their own args
    let mut rest: Vec<&String> = Vec::new();
    let mut skip = false;
    for (i, arg) in args.iter().enumerate().skip(1) {
        if skip {
            skip = false;
            continue;
        }
        if arg == "--user" && i + 1 < args.len() {
            skip = true;
            continue;
        }
        rest.push(arg);
    }

    let store = TransactionStore::new(BudgetLedger);

    match rest.first().map(|s| s.as_str()) {
        Some("tx") => cli_tx(&rest[1..], db, &store, &owner, today),
        Some("budget") => cli_budget(&rest[1..], db, &owner, today),
        Some("dashboard") | Some("d") => cli_dashboard(db, &owner, today),
        Some("--help") | Some("-h") | Some("help") | None => {
            print_usage();
            Ok(())
        }
        Some("--version") | Some("-V") | Some("version") => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(other) => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack — local personal finance tracker");
    println!();
    println!("Usage: fintrack [--user <id>] <command>");
    println!();
    println!("Commands:");
    println!("  tx add <income|expense> <amount> <category> <description>");
    println!("    [--date YYYY-MM-DD] [--notes <text>]  Record a transaction");
    println!("  tx list [--month YYYY-MM] [--category <c>] [--kind <k>] [--search <s>]");
    println!("  tx edit <id> [--amount <n>] [--kind <k>] [--category <c>]");
    println!("    [--description <d>] [--date <d>] [--notes <n>]");
    println!("  tx delete <id>");
    println!("  budget add <category> <limit> <weekly|monthly|yearly> [--alert <pct>]");
    println!("  budget list");
    println!("  budget edit <id> [--limit <n>] [--alert <pct>] [--active <true|false>]");
    println!("  budget delete <id>");
    println!("  budget recompute <id>            Rebuild spent from transactions");
    println!("  dashboard                        Monthly summary and trends");
    println!("  --help, -h                       Show this help");
    println!("  --version, -V                    Show version");
}

// ── Transactions ──────────────────────────────────────────────

fn cli_tx(
    args: &[&String],
    db: &Database,
    store: &TransactionStore<BudgetLedger>,
    owner: &str,
    today: NaiveDate,
) -> Result<()> {
    match args.first().map(|s| s.as_str()) {
        Some("add") => {
            let (kind, amount, category, description) =
                match (args.get(1), args.get(2), args.get(3), args.get(4)) {
                    (Some(k), Some(a), Some(c), Some(d)) => (k, a, c, d),
                    _ => anyhow::bail!(
                        "Usage: fintrack tx add <income|expense> <amount> <category> <description>"
                    ),
                };

            let new = NewTransaction {
                kind: parse_kind(kind)?,
                amount: parse_amount(amount)?,
                category: category.to_string(),
                description: description.to_string(),
                notes: flag_owned(args, "--notes").unwrap_or_default(),
                date: flag_owned(args, "--date").map(|d| parse_date(&d)).transpose()?,
            };
            let txn = store.create(db, owner, &new, today)?;
            println!(
                "Recorded {} #{}: {} ${:.2} ({})",
                txn.kind,
                txn.id.unwrap_or(0),
                txn.category,
                txn.amount,
                txn.date
            );
            Ok(())
        }
        Some("list") => {
            let (from, to) = match flag_owned(args, "--month") {
                Some(m) => {
                    let window = parse_month(&m)?;
                    (Some(window.start), Some(window.end))
                }
                None => (None, None),
            };
            let kind = flag_owned(args, "--kind").map(|k| parse_kind(&k)).transpose()?;
            let category = flag_owned(args, "--category");
            let search = flag_owned(args, "--search");

            let txns = store.list(db, owner, kind, category.as_deref(), from, to, search.as_deref())?;
            if txns.is_empty() {
                println!("No transactions");
                return Ok(());
            }
            println!("{:<6} {:<12} {:<8} {:<20} {:>12}  Description", "ID", "Date", "Kind", "Category", "Amount");
            println!("{}", "─".repeat(78));
            for txn in &txns {
                println!(
                    "{:<6} {:<12} {:<8} {:<20} {:>12}  {}",
                    txn.id.unwrap_or(0),
                    txn.date.to_string(),
                    txn.kind.to_string(),
                    txn.category,
                    format!("${:.2}", txn.amount),
                    txn.description,
                );
            }
            Ok(())
        }
        Some("edit") => {
            let id = parse_id(args.get(1))?;
            let patch = TransactionPatch {
                kind: flag_owned(args, "--kind").map(|k| parse_kind(&k)).transpose()?,
                amount: flag_owned(args, "--amount").map(|a| parse_amount(&a)).transpose()?,
                category: flag_owned(args, "--category"),
                description: flag_owned(args, "--description"),
                date: flag_owned(args, "--date").map(|d| parse_date(&d)).transpose()?,
                notes: flag_owned(args, "--notes"),
            };
            let txn = store.update(db, owner, id, &patch)?;
            println!("Updated transaction #{id}: {} ${:.2}", txn.category, txn.amount);
            Ok(())
        }
        Some("delete") => {
            let id = parse_id(args.get(1))?;
            store.delete(db, owner, id)?;
            println!("Deleted transaction #{id}");
            Ok(())
        }
        _ => {
            print_usage();
            anyhow::bail!("Usage: fintrack tx <add|list|edit|delete>");
        }
    }
}

// ── Budgets ───────────────────────────────────────────────────

fn cli_budget(args: &[&String], db: &Database, owner: &str, today: NaiveDate) -> Result<()> {
    match args.first().map(|s| s.as_str()) {
        Some("add") => {
            let (category, limit, period) = match (args.get(1), args.get(2), args.get(3)) {
                (Some(c), Some(l), Some(p)) => (c, l, p),
                _ => anyhow::bail!("Usage: fintrack budget add <category> <limit> <weekly|monthly|yearly>"),
            };
            let alert_threshold = match flag_owned(args, "--alert") {
                Some(a) => a
                    .parse::<u8>()
                    .map_err(|_| anyhow::anyhow!("Alert threshold must be between 0 and 100"))?,
                None => NewBudget::DEFAULT_ALERT_THRESHOLD,
            };
            let new = NewBudget {
                category: category.to_string(),
                limit: parse_amount(limit)?,
                period: Period::parse(period)
                    .ok_or_else(|| anyhow::anyhow!("Period must be weekly, monthly, or yearly"))?,
                alert_threshold,
            };
            let budget = BudgetLedger.create_budget(db, owner, &new, today)?;
            println!(
                "Created {} budget #{} for {}: ${:.2} ({} to {}), spent so far ${:.2}",
                budget.period,
                budget.id.unwrap_or(0),
                budget.category,
                budget.limit,
                budget.start_date,
                budget.end_date,
                budget.spent,
            );
            Ok(())
        }
        Some("list") => {
            let budgets = BudgetLedger.budgets(db, owner)?;
            if budgets.is_empty() {
                println!("No budgets");
                return Ok(());
            }
            println!(
                "{:<6} {:<20} {:<9} {:<24} {:>10} {:>10} {:>7}  Status",
                "ID", "Category", "Period", "Window", "Limit", "Spent", "Used"
            );
            println!("{}", "─".repeat(100));
            for b in &budgets {
                let mut status = if b.is_active { "active" } else { "inactive" }.to_string();
                if b.is_exceeded() {
                    status.push_str(", exceeded");
                } else if b.alert_triggered() {
                    status.push_str(", alert");
                }
                println!(
                    "{:<6} {:<20} {:<9} {:<24} {:>10} {:>10} {:>7}  {}",
                    b.id.unwrap_or(0),
                    b.category,
                    b.period.to_string(),
                    format!("{}..{}", b.start_date, b.end_date),
                    format!("${:.2}", b.limit),
                    format!("${:.2}", b.spent),
                    format!("{:.1}%", b.percentage_used()),
                    status,
                );
            }
            Ok(())
        }
        Some("edit") => {
            let id = parse_id(args.get(1))?;
            let patch = BudgetPatch {
                limit: flag_owned(args, "--limit").map(|l| parse_amount(&l)).transpose()?,
                alert_threshold: flag_owned(args, "--alert")
                    .map(|a| {
                        a.parse::<u8>()
                            .map_err(|_| anyhow::anyhow!("Alert threshold must be between 0 and 100"))
                    })
                    .transpose()?,
                is_active: flag_owned(args, "--active")
                    .map(|a| match a.as_str() {
                        "true" => Ok(true),
                        "false" => Ok(false),
                        _ => Err(anyhow::anyhow!("--active takes true or false")),
                    })
                    .transpose()?,
            };
            let budget = BudgetLedger.update_budget(db, owner, id, &patch)?;
            println!(
                "Updated budget #{id}: limit ${:.2}, alert {}%, {}",
                budget.limit,
                budget.alert_threshold,
                if budget.is_active { "active" } else { "inactive" },
            );
            Ok(())
        }
        Some("delete") => {
            let id = parse_id(args.get(1))?;
            BudgetLedger.delete_budget(db, owner, id)?;
            println!("Deleted budget #{id}");
            Ok(())
        }
        Some("recompute") => {
            let id = parse_id(args.get(1))?;
            let budget = BudgetLedger.recompute_spent(db, owner, id)?;
            println!("Recomputed budget #{id}: spent ${:.2}", budget.spent);
            Ok(())
        }
        _ => {
            print_usage();
            anyhow::bail!("Usage: fintrack budget <add|list|edit|delete|recompute>");
        }
    }
}

// ── Dashboard ─────────────────────────────────────────────────

fn cli_dashboard(db: &Database, owner: &str, today: NaiveDate) -> Result<()> {
    let summary = dashboard::summary(db, owner, today)?;

    println!("fintrack — {}", today.format("%B %Y"));
    println!("{}", "─".repeat(44));
    println!("  Income:    ${:.2}", summary.total_income);
    println!("  Expenses:  ${:.2}", summary.total_expenses);
    println!("  Savings:   ${:.2}", summary.savings);

    if !summary.expenses_by_category.is_empty() {
        println!();
        println!("Spending by category:");
        for share in &summary.expenses_by_category {
            println!(
                "  {:<24} {:>10}  {:>6}",
                share.category,
                format!("${:.2}", share.amount),
                format!("{:.1}%", share.percentage),
            );
        }
    }

    println!();
    println!("Last 6 months:");
    for point in &summary.monthly_data {
        println!(
            "  {:<4} income {:>10}  expenses {:>10}  savings {:>10}",
            point.month,
            format!("${:.2}", point.income),
            format!("${:.2}", point.expenses),
            format!("${:.2}", point.savings),
        );
    }

    if !summary.active_budgets.is_empty() {
        println!();
        println!("Active budgets:");
        for b in &summary.active_budgets {
            let marker = if b.is_exceeded() {
                " EXCEEDED"
            } else if b.alert_triggered() {
                " ALERT"
            } else {
                ""
            };
            println!(
                "  {:<20} {:>10} of {:>10}  ({:.1}%){marker}",
                b.category,
                format!("${:.2}", b.spent),
                format!("${:.2}", b.limit),
                b.percentage_used(),
            );
        }
    }

    Ok(())
}

// ── Argument helpers ──────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn flag_owned(args: &[&String], name: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0].as_str() == name)
        .map(|w| w[1].to_string())
}

fn parse_id(arg: Option<&&String>) -> Result<i64> {
    arg.ok_or_else(|| anyhow::anyhow!("Missing id"))?
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("Invalid id"))
}

fn parse_kind(s: &str) -> Result<TransactionKind> {
    TransactionKind::parse(s).ok_or_else(|| anyhow::anyhow!("Type must be income or expense"))
}

fn parse_amount(s: &str) -> Result<Decimal> {
    Decimal::from_str(s).map_err(|_| anyhow::anyhow!("Invalid amount: {s}"))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date (expected YYYY-MM-DD): {s}"))
}

fn parse_month(s: &str) -> Result<Window> {
    let first = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid month (expected YYYY-MM): {s}"))?;
    Ok(Window::for_period(Period::Monthly, first))
}
