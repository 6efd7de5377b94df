//! Builds the router and defines the request handlers for the REST server.
//!
//! Handlers are thin wrappers around the service functions in
//! [transactions](crate::transactions), [users](crate::users),
//! [dashboard](crate::dashboard) and [auth](crate::auth). They extract the
//! substate and session user ID, call the service and convert the result
//! into a JSON response.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::{
    Error,
    app_state::{AppState, DashboardState, TransactionState, UserState},
    auth::{
        Credentials, USER_AUTHENTICATED_MESSAGE, USER_SIGNED_OUT_MESSAGE, auth_guard,
        invalidate_auth_cookie, set_auth_cookie, verify_credentials,
    },
    dashboard, endpoints,
    models::{TransactionId, UserId},
    stores::{TransactionStore, UpdateTransaction, UserStore},
    transactions::{self, CreateTransaction, TransactionListQuery},
    users::{self, RegisterUser, UpdateUser},
};

/// Assemble the application router around `state`.
///
/// Everything except registration, sign in and sign out sits behind the
/// session cookie [auth_guard].
pub fn build_router<T, U>(state: AppState<T, U>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
    U: UserStore + Clone + Send + Sync + 'static,
{
    let unprotected = Router::new()
        .route(endpoints::REGISTER, post(register::<U>))
        .route(endpoints::LOG_IN, post(log_in::<T, U>))
        .route(endpoints::LOG_OUT, get(log_out));

    let protected = Router::new()
        .route(
            endpoints::PROFILE,
            get(get_profile::<U>)
                .patch(update_profile::<U>)
                .delete(delete_profile::<U>),
        )
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction::<T>).get(list_transactions::<T>),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction::<T>)
                .patch(update_transaction::<T>)
                .delete(remove_transaction::<T>),
        )
        .route(endpoints::DASHBOARD_BALANCE, get(balance::<T>))
        .route(
            endpoints::DASHBOARD_MONTHLY_BALANCE,
            get(monthly_balance::<T>),
        )
        .route(
            endpoints::DASHBOARD_EXPENSES_BY_CATEGORY,
            get(expenses_by_category::<T>),
        )
        .route(
            endpoints::DASHBOARD_LAST_TRANSACTIONS,
            get(last_transactions::<T>),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    unprotected
        .merge(protected)
        .fallback(not_found)
        .with_state(state)
}

async fn register<U>(
    State(state): State<UserState<U>>,
    Json(data): Json<RegisterUser>,
) -> Result<impl IntoResponse, Error>
where
    U: UserStore + Send + Sync,
{
    let mut store = state.user_store;
    let response = users::register_user(&mut store, data)?;

    Ok((StatusCode::CREATED, Json(response)))
}

async fn log_in<T, U>(
    State(state): State<AppState<T, U>>,
    jar: PrivateCookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
    U: UserStore + Send + Sync,
{
    let user = verify_credentials(&credentials, &state.user_store)?;
    let jar = set_auth_cookie(jar, user.id(), state.cookie_duration);

    Ok((jar, Json(json!({ "message": USER_AUTHENTICATED_MESSAGE }))))
}

async fn log_out(jar: PrivateCookieJar) -> impl IntoResponse {
    let jar = invalidate_auth_cookie(jar);

    (jar, Json(json!({ "message": USER_SIGNED_OUT_MESSAGE })))
}

async fn get_profile<U>(
    State(state): State<UserState<U>>,
    Extension(user_id): Extension<UserId>,
) -> Result<impl IntoResponse, Error>
where
    U: UserStore + Send + Sync,
{
    users::get_profile(&state.user_store, user_id).map(Json)
}

async fn update_profile<U>(
    State(state): State<UserState<U>>,
    Extension(user_id): Extension<UserId>,
    Json(update): Json<UpdateUser>,
) -> Result<impl IntoResponse, Error>
where
    U: UserStore + Send + Sync,
{
    let mut store = state.user_store;

    users::update_user(&mut store, user_id, update).map(Json)
}

async fn delete_profile<U>(
    State(state): State<UserState<U>>,
    Extension(user_id): Extension<UserId>,
) -> Result<impl IntoResponse, Error>
where
    U: UserStore + Send + Sync,
{
    let mut store = state.user_store;

    users::delete_user(&mut store, user_id).map(Json)
}

async fn create_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserId>,
    Json(data): Json<CreateTransaction>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
{
    let mut store = state.transaction_store;
    let response = transactions::create_transaction(&mut store, user_id, data)?;

    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_transactions<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TransactionListQuery>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
{
    transactions::list_transactions(&state.transaction_store, user_id, query).map(Json)
}

async fn get_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
{
    transactions::get_transaction(&state.transaction_store, user_id, transaction_id).map(Json)
}

async fn update_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
    Json(update): Json<UpdateTransaction>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
{
    let mut store = state.transaction_store;

    transactions::update_transaction(&mut store, user_id, transaction_id, update).map(Json)
}

async fn remove_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
{
    let mut store = state.transaction_store;

    transactions::remove_transaction(&mut store, user_id, transaction_id).map(Json)
}

async fn balance<T>(
    State(state): State<DashboardState<T>>,
    Extension(user_id): Extension<UserId>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
{
    dashboard::balance(&state.transaction_store, user_id).map(Json)
}

async fn monthly_balance<T>(
    State(state): State<DashboardState<T>>,
    Extension(user_id): Extension<UserId>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
{
    dashboard::monthly_balance(&state.transaction_store, user_id).map(Json)
}

async fn expenses_by_category<T>(
    State(state): State<DashboardState<T>>,
    Extension(user_id): Extension<UserId>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
{
    dashboard::expenses_by_category(&state.transaction_store, user_id).map(Json)
}

async fn last_transactions<T>(
    State(state): State<DashboardState<T>>,
    Extension(user_id): Extension<UserId>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Send + Sync,
{
    dashboard::last_transactions(&state.transaction_store, user_id).map(Json)
}

async fn not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{endpoints, routes::build_router, stores::sqlite::create_app_state};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = create_app_state(connection, "nekoteterces").unwrap();

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nonsense").await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn protected_route_without_session_returns_unauthorized() {
        let server = get_test_server();

        let response = server.get(endpoints::DASHBOARD_BALANCE).await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn register_returns_created() {
        let server = get_test_server();

        let response = server
            .post(endpoints::REGISTER)
            .json(&json!({
                "name": "Alice",
                "email": "alice@example.com",
                "password": "averysecurepassword",
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
    }
}
