//! Defines the endpoints for the REST server in one place to avoid route
//! mismatches between the router and the tests.

/// Create a new user account.
pub const REGISTER: &str = "/api/users";
/// Sign in and receive a session cookie.
pub const LOG_IN: &str = "/api/log_in";
/// Sign out and invalidate the session cookie.
pub const LOG_OUT: &str = "/api/log_out";
/// Retrieve, change or delete the signed-in user's account.
pub const PROFILE: &str = "/api/users/me";
/// Create or list the signed-in user's transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// Retrieve, change or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The overall balance dashboard view.
pub const DASHBOARD_BALANCE: &str = "/api/dashboard/balance";
/// The per-month balance dashboard view.
pub const DASHBOARD_MONTHLY_BALANCE: &str = "/api/dashboard/monthly_balance";
/// The expenses per category dashboard view.
pub const DASHBOARD_EXPENSES_BY_CATEGORY: &str = "/api/dashboard/expenses_by_category";
/// The most recent transactions dashboard view.
pub const DASHBOARD_LAST_TRANSACTIONS: &str = "/api/dashboard/last_transactions";

/// Replace the parameter in an endpoint path with a concrete ID.
pub fn format_endpoint(endpoint: &str, id: i64) -> String {
    let prefix = endpoint
        .split_once('{')
        .map_or(endpoint, |(prefix, _)| prefix);

    format!("{prefix}{id}")
}

#[cfg(test)]
mod endpoint_tests {
    use crate::endpoints::{TRANSACTION, format_endpoint};

    #[test]
    fn format_endpoint_replaces_the_parameter() {
        let got = format_endpoint(TRANSACTION, 42);

        assert_eq!(got, "/api/transactions/42");
    }
}
