//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    extract::FromRef,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;

use crate::{
    AppState, Error,
    auth::{AuthState, auth_guard},
    endpoints,
    log_in::log_in_endpoint,
    log_out::log_out_endpoint,
    register_user::create_user_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_summary_endpoint,
        get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::USERS, post(create_user_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::LOG_OUT, post(log_out_endpoint));

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .fallback(not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({ "error": "I'm a teapot" })),
    )
        .into_response()
}

/// The JSON fallback for unknown routes.
async fn not_found() -> Response {
    Error::NotFound.into_response()
}

#[cfg(test)]
mod routing_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        AppState,
        endpoints,
        transaction::{Summary, Transaction, TransactionKind},
        user::UserResponse,
    };

    use super::build_router;

    const TEST_PASSWORD: &str = "averysecretandsecurepassword";

    fn get_test_server() -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn, "42").expect("Could not create app state");

        let mut server =
            TestServer::new(build_router(state)).expect("Could not create test server");
        server.save_cookies();
        server
    }

    /// Register a user and leave their session cookies in the server's cookie
    /// store.
    async fn register_test_user(server: &TestServer, email: &str) -> UserResponse {
        let response = server
            .post(endpoints::USERS)
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<UserResponse>()
    }

    async fn create_test_transaction(
        server: &TestServer,
        amount: f64,
        kind: &str,
        date: &str,
    ) -> Transaction {
        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": amount,
                "category": "misc",
                "kind": kind,
                "date": date
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Transaction>()
    }

    #[tokio::test]
    async fn coffee_returns_teapot() {
        let server = get_test_server();

        let response = server.get(endpoints::COFFEE).await;

        response.assert_status(axum::http::StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_returns_404_json() {
        let server = get_test_server();

        let response = server.get("/api/bogus").await;

        response.assert_status_not_found();
        let body = response.json::<serde_json::Value>();
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn transactions_require_authentication() {
        let server = get_test_server();

        server
            .get(endpoints::TRANSACTIONS)
            .await
            .assert_status_unauthorized();
        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "amount": 1.0, "category": "x", "kind": "expense" }))
            .await
            .assert_status_unauthorized();
        server
            .get(endpoints::SUMMARY)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn created_transaction_appears_in_listing_exactly_once() {
        let server = get_test_server();
        register_test_user(&server, "foo@bar.baz").await;

        let transaction = create_test_transaction(&server, 50.0, "income", "2025-08-01").await;

        let response = server.get(endpoints::TRANSACTIONS).await;
        response.assert_status_ok();
        let transactions = response.json::<Vec<Transaction>>();
        let occurrences = transactions
            .iter()
            .filter(|&each| *each == transaction)
            .count();
        assert_eq!(occurrences, 1);
    }

    #[tokio::test]
    async fn deleted_transaction_disappears_from_listing() {
        let server = get_test_server();
        register_test_user(&server, "foo@bar.baz").await;
        let transaction = create_test_transaction(&server, 50.0, "income", "2025-08-01").await;

        server
            .delete(&endpoints::format_endpoint(
                endpoints::TRANSACTION,
                transaction.id,
            ))
            .await
            .assert_status_ok();

        let transactions = server
            .get(endpoints::TRANSACTIONS)
            .await
            .json::<Vec<Transaction>>();
        assert!(!transactions.contains(&transaction));
    }

    #[tokio::test]
    async fn deleting_twice_returns_404() {
        let server = get_test_server();
        register_test_user(&server, "foo@bar.baz").await;
        let transaction = create_test_transaction(&server, 50.0, "income", "2025-08-01").await;
        let path = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);

        server.delete(&path).await.assert_status_ok();
        server.delete(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn listing_is_ordered_most_recent_first() {
        let server = get_test_server();
        register_test_user(&server, "foo@bar.baz").await;
        create_test_transaction(&server, 10.0, "expense", "2025-05-19").await;
        create_test_transaction(&server, 20.0, "income", "2025-08-01").await;
        create_test_transaction(&server, 30.0, "expense", "2025-07-04").await;

        let transactions = server
            .get(endpoints::TRANSACTIONS)
            .await
            .json::<Vec<Transaction>>();

        let dates: Vec<_> = transactions.iter().map(|each| each.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2025 - 08 - 01),
                date!(2025 - 07 - 04),
                date!(2025 - 05 - 19)
            ]
        );
    }

    #[tokio::test]
    async fn summary_reports_net_of_income_and_expenses() {
        let server = get_test_server();
        register_test_user(&server, "foo@bar.baz").await;
        create_test_transaction(&server, 50.0, "income", "2025-08-01").await;
        create_test_transaction(&server, 20.0, "expense", "2025-08-02").await;

        let response = server.get(endpoints::SUMMARY).await;

        response.assert_status_ok();
        response.assert_json(&Summary {
            income: 50.0,
            expense: 20.0,
            net: 30.0,
        });
    }

    #[tokio::test]
    async fn users_cannot_see_or_delete_each_others_transactions() {
        let server = get_test_server();
        register_test_user(&server, "foo@bar.baz").await;
        let transaction = create_test_transaction(&server, 50.0, "income", "2025-08-01").await;

        // Registering a second user replaces the stored session cookies.
        register_test_user(&server, "bar@baz.qux").await;

        let transactions = server
            .get(endpoints::TRANSACTIONS)
            .await
            .json::<Vec<Transaction>>();
        assert!(transactions.is_empty());

        server
            .delete(&endpoints::format_endpoint(
                endpoints::TRANSACTION,
                transaction.id,
            ))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn log_in_then_access_protected_route() {
        let mut server = get_test_server();
        register_test_user(&server, "foo@bar.baz").await;
        server.clear_cookies();

        server
            .get(endpoints::TRANSACTIONS)
            .await
            .assert_status_unauthorized();

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "foo@bar.baz", "password": TEST_PASSWORD }))
            .await
            .assert_status_ok();

        server.get(endpoints::TRANSACTIONS).await.assert_status_ok();
    }

    #[tokio::test]
    async fn log_out_ends_the_session() {
        let server = get_test_server();
        register_test_user(&server, "foo@bar.baz").await;

        server.post(endpoints::LOG_OUT).await.assert_status_ok();

        server
            .get(endpoints::TRANSACTIONS)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn kind_filter_is_applied_to_listing() {
        let server = get_test_server();
        register_test_user(&server, "foo@bar.baz").await;
        create_test_transaction(&server, 50.0, "income", "2025-08-01").await;
        create_test_transaction(&server, 20.0, "expense", "2025-08-02").await;

        let transactions = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("kind", "expense")
            .await
            .json::<Vec<Transaction>>();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, TransactionKind::Expense);
    }
}
