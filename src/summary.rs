//! Pure aggregation functions that reduce a user's transactions into the
//! figures shown on the dashboard.
//!
//! All functions here operate on in-memory slices so they can be tested
//! without a database. Monetary results are rounded to two decimal places.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Category, Transaction, TransactionType};

/// The running totals over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The sum of all income amounts.
    pub total_incomes: f64,
    /// The sum of all expense amounts.
    pub total_expenses: f64,
    /// Incomes minus expenses.
    pub total_balance: f64,
}

/// The income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBalance {
    /// The month in `YYYY-MM` form, e.g. `2025-09`.
    pub month: String,
    /// The sum of income amounts recorded in this month.
    pub total_incomes: f64,
    /// The sum of expense amounts recorded in this month.
    pub total_expenses: f64,
}

/// The total spent in one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryExpenses {
    /// The category the expenses belong to.
    pub category: Category,
    /// The sum of expense amounts in this category.
    pub total_expenses: f64,
}

/// Round a monetary value to two decimal places.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum `transactions` into income, expense and balance totals.
///
/// The income and expense totals are rounded to cents and the balance is
/// their exact difference, so the three figures are always consistent with
/// each other. An empty slice produces all zeroes.
pub fn calculate_summary(transactions: &[Transaction]) -> Summary {
    let (incomes, expenses) = transactions.iter().fold(
        (0.0, 0.0),
        |(incomes, expenses), transaction| match transaction.kind() {
            TransactionType::Income => (incomes + transaction.amount(), expenses),
            TransactionType::Expense => (incomes, expenses + transaction.amount()),
        },
    );

    let total_incomes = round_to_cents(incomes);
    let total_expenses = round_to_cents(expenses);

    Summary {
        total_incomes,
        total_expenses,
        total_balance: total_incomes - total_expenses,
    }
}

/// Group `transactions` by the calendar month they were recorded in and sum
/// each month's incomes and expenses.
///
/// Months with no transactions are absent from the result. The result is
/// sorted by month, oldest first.
pub fn monthly_balance(transactions: &[Transaction]) -> Vec<MonthlyBalance> {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        let created_at = transaction.created_at();
        let key = format!("{:04}-{:02}", created_at.year(), created_at.month() as u8);
        let (incomes, expenses) = months.entry(key).or_insert((0.0, 0.0));

        match transaction.kind() {
            TransactionType::Income => *incomes += transaction.amount(),
            TransactionType::Expense => *expenses += transaction.amount(),
        }
    }

    months
        .into_iter()
        .map(|(month, (incomes, expenses))| MonthlyBalance {
            month,
            total_incomes: round_to_cents(incomes),
            total_expenses: round_to_cents(expenses),
        })
        .collect()
}

/// Sum the expense amounts of `transactions` per category.
///
/// Income transactions are ignored, and categories with no expenses are
/// omitted. Categories appear in the order they are declared in [Category].
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryExpenses> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let total: f64 = transactions
                .iter()
                .filter(|transaction| {
                    transaction.kind() == TransactionType::Expense
                        && transaction.category() == category
                })
                .map(Transaction::amount)
                .sum();

            (total > 0.0).then_some(CategoryExpenses {
                category,
                total_expenses: round_to_cents(total),
            })
        })
        .collect()
}
