//! The dashboard views: overall balance, monthly balance, expenses by
//! category and the most recent transactions.
//!
//! Each view loads the owner's transactions through a
//! [TransactionStore] and reduces them with the functions in
//! [summary](crate::summary). Unexpected store failures are logged and
//! replaced with a view-specific error so clients only see which view
//! failed to load.

use serde::Serialize;

use crate::{
    Error,
    models::{Transaction, UserId},
    pagination::PaginationParams,
    stores::{SortOrder, TransactionQuery, TransactionStore},
    summary::{
        CategoryExpenses, MonthlyBalance, Summary, calculate_summary, expenses_by_category as summarize_expenses_by_category,
        monthly_balance as summarize_monthly_balance,
    },
};

/// How many transactions the recent transactions view returns.
const LAST_TRANSACTIONS_PAGE_SIZE: u64 = 6;

/// The overall balance view: total incomes, expenses and their difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceResponse {
    /// The totals over every transaction the user owns.
    #[serde(flatten)]
    pub summary: Summary,
}

/// The monthly balance view: per-month income and expense totals, oldest
/// month first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBalanceResponse {
    /// One entry per calendar month that has transactions.
    pub monthly_balance: Vec<MonthlyBalance>,
}

/// The category breakdown view: how much was spent per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdownResponse {
    /// One entry per category that has expenses.
    pub expenses_by_category: Vec<CategoryExpenses>,
}

/// The recent transactions view: the newest few transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastTransactionsResponse {
    /// The newest transactions, most recent first.
    pub last_transactions: Vec<Transaction>,
}

/// Load the overall balance for `owner`.
///
/// # Errors
/// Returns an [Error::BalanceLoad] if the transactions could not be loaded.
pub fn balance<T>(store: &T, owner: UserId) -> Result<BalanceResponse, Error>
where
    T: TransactionStore,
{
    let transactions = store
        .get_all(owner)
        .map_err(|error| error.or_internal(Error::BalanceLoad))?;

    Ok(BalanceResponse {
        summary: calculate_summary(&transactions),
    })
}

/// Load the per-month balance for `owner`.
///
/// # Errors
/// Returns an [Error::MonthlyBalanceLoad] if the transactions could not be
/// loaded.
pub fn monthly_balance<T>(store: &T, owner: UserId) -> Result<MonthlyBalanceResponse, Error>
where
    T: TransactionStore,
{
    let transactions = store
        .get_all(owner)
        .map_err(|error| error.or_internal(Error::MonthlyBalanceLoad))?;

    Ok(MonthlyBalanceResponse {
        monthly_balance: summarize_monthly_balance(&transactions),
    })
}

/// Load the expenses per category for `owner`.
///
/// # Errors
/// Returns an [Error::CategoryBreakdownLoad] if the transactions could not
/// be loaded.
pub fn expenses_by_category<T>(store: &T, owner: UserId) -> Result<CategoryBreakdownResponse, Error>
where
    T: TransactionStore,
{
    let transactions = store
        .get_all(owner)
        .map_err(|error| error.or_internal(Error::CategoryBreakdownLoad))?;

    Ok(CategoryBreakdownResponse {
        expenses_by_category: summarize_expenses_by_category(&transactions),
    })
}

/// Load the most recent transactions for `owner`, newest first.
///
/// # Errors
/// Returns an [Error::LastTransactionsLoad] if the transactions could not be
/// loaded.
pub fn last_transactions<T>(store: &T, owner: UserId) -> Result<LastTransactionsResponse, Error>
where
    T: TransactionStore,
{
    let query = TransactionQuery {
        sort_created: Some(SortOrder::Descending),
        page: Some(PaginationParams {
            page: 1,
            limit: LAST_TRANSACTIONS_PAGE_SIZE,
        }),
        ..TransactionQuery::all_for(owner)
    };

    let (transactions, _) = store
        .get_page(&query)
        .map_err(|error| error.or_internal(Error::LastTransactionsLoad))?;

    Ok(LastTransactionsResponse {
        last_transactions: transactions,
    })
}

#[cfg(test)]
mod dashboard_tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        dashboard::{balance, expenses_by_category, last_transactions, monthly_balance},
        models::{
            Category, PasswordHash, Transaction, TransactionBuilder, TransactionId,
            TransactionType, User, UserId,
        },
        stores::{
            NewUser, TransactionQuery, TransactionStore, UpdateTransaction, UserStore,
            sqlite::{SqliteTransactionStore, create_app_state},
        },
        summary::{CategoryExpenses, MonthlyBalance},
    };

    fn seeded_store() -> (SqliteTransactionStore, User) {
        let connection = Connection::open_in_memory().unwrap();
        let mut state = create_app_state(connection, "nekoteterces").unwrap();

        let user = state
            .user_store
            .create(NewUser {
                name: "Alice".to_string(),
                email: "alice@example.com".parse().unwrap(),
                password_hash: PasswordHash::new_unchecked("dummy hash"),
            })
            .unwrap();

        (state.transaction_store, user)
    }

    fn seed(
        store: &mut SqliteTransactionStore,
        owner: UserId,
        amount: f64,
        kind: TransactionType,
        category: Category,
    ) -> Transaction {
        store
            .create(Transaction::build("Seed", amount, kind, category, owner).unwrap())
            .unwrap()
    }

    #[test]
    fn balance_sums_incomes_and_expenses() {
        let (mut store, user) = seeded_store();
        seed(
            &mut store,
            user.id(),
            200.0,
            TransactionType::Expense,
            Category::Food,
        );
        seed(
            &mut store,
            user.id(),
            400.0,
            TransactionType::Income,
            Category::Salary,
        );
        seed(
            &mut store,
            user.id(),
            100.0,
            TransactionType::Expense,
            Category::Transport,
        );

        let got = balance(&store, user.id()).unwrap();

        assert_eq!(got.summary.total_incomes, 400.0);
        assert_eq!(got.summary.total_expenses, 300.0);
        assert_eq!(got.summary.total_balance, 100.0);
    }

    #[test]
    fn balance_of_a_new_user_is_zero() {
        let (store, user) = seeded_store();

        let got = balance(&store, user.id()).unwrap();

        assert_eq!(got.summary.total_balance, 0.0);
        assert_eq!(got.summary.total_incomes, 0.0);
        assert_eq!(got.summary.total_expenses, 0.0);
    }

    #[test]
    fn monthly_balance_groups_by_month() {
        let (mut store, user) = seeded_store();
        seed(
            &mut store,
            user.id(),
            200.0,
            TransactionType::Expense,
            Category::Food,
        );
        seed(
            &mut store,
            user.id(),
            400.0,
            TransactionType::Income,
            Category::Salary,
        );

        let got = monthly_balance(&store, user.id()).unwrap();

        let now = OffsetDateTime::now_utc();
        let want_month = format!("{:04}-{:02}", now.year(), now.month() as u8);
        assert_eq!(
            got.monthly_balance,
            vec![MonthlyBalance {
                month: want_month,
                total_incomes: 400.0,
                total_expenses: 200.0,
            }]
        );
    }

    #[test]
    fn expenses_by_category_omits_incomes() {
        let (mut store, user) = seeded_store();
        seed(
            &mut store,
            user.id(),
            200.0,
            TransactionType::Expense,
            Category::Food,
        );
        seed(
            &mut store,
            user.id(),
            400.0,
            TransactionType::Income,
            Category::Salary,
        );

        let got = expenses_by_category(&store, user.id()).unwrap();

        assert_eq!(
            got.expenses_by_category,
            vec![CategoryExpenses {
                category: Category::Food,
                total_expenses: 200.0,
            }]
        );
    }

    #[test]
    fn last_transactions_returns_newest_six() {
        let (mut store, user) = seeded_store();
        let start = OffsetDateTime::now_utc() - Duration::days(10);

        for i in 0..8 {
            let builder = Transaction::build(
                &format!("Transaction #{i}"),
                (i + 1) as f64,
                TransactionType::Expense,
                Category::Other,
                user.id(),
            )
            .unwrap()
            .created_at(start + Duration::days(i));

            store.create(builder).unwrap();
        }

        let got = last_transactions(&store, user.id()).unwrap();

        let titles: Vec<&str> = got
            .last_transactions
            .iter()
            .map(Transaction::title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Transaction #7",
                "Transaction #6",
                "Transaction #5",
                "Transaction #4",
                "Transaction #3",
                "Transaction #2",
            ]
        );
    }

    /// A store whose queries always fail, for exercising error masking.
    struct FailingStore;

    impl TransactionStore for FailingStore {
        fn create(&mut self, _: TransactionBuilder) -> Result<Transaction, Error> {
            Err(Error::SqlError(rusqlite::Error::InvalidQuery))
        }

        fn get(&self, _: TransactionId, _: UserId) -> Result<Transaction, Error> {
            Err(Error::SqlError(rusqlite::Error::InvalidQuery))
        }

        fn get_page(&self, _: &TransactionQuery) -> Result<(Vec<Transaction>, u64), Error> {
            Err(Error::SqlError(rusqlite::Error::InvalidQuery))
        }

        fn get_all(&self, _: UserId) -> Result<Vec<Transaction>, Error> {
            Err(Error::SqlError(rusqlite::Error::InvalidQuery))
        }

        fn update(
            &mut self,
            _: TransactionId,
            _: UserId,
            _: UpdateTransaction,
        ) -> Result<Transaction, Error> {
            Err(Error::SqlError(rusqlite::Error::InvalidQuery))
        }

        fn delete(&mut self, _: TransactionId, _: UserId) -> Result<(), Error> {
            Err(Error::SqlError(rusqlite::Error::InvalidQuery))
        }
    }

    #[test]
    fn store_failures_are_masked_per_view() {
        let owner = UserId::new(1);

        assert_eq!(balance(&FailingStore, owner), Err(Error::BalanceLoad));
        assert_eq!(
            monthly_balance(&FailingStore, owner),
            Err(Error::MonthlyBalanceLoad)
        );
        assert_eq!(
            expenses_by_category(&FailingStore, owner),
            Err(Error::CategoryBreakdownLoad)
        );
        assert_eq!(
            last_transactions(&FailingStore, owner),
            Err(Error::LastTransactionsLoad)
        );
    }
}
