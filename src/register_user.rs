//! The route handler for registering a new user.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;
use serde::Deserialize;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::set_auth_cookie,
    user::{UserResponse, create_user},
};

/// The request body for registering a new user.
#[derive(Debug, Deserialize)]
pub struct RegisterUserData {
    /// The email address to register with.
    pub email: String,
    /// The password to register with.
    pub password: String,
}

/// A route handler for registering a new user.
///
/// The new user is logged in right away, so the response carries the auth
/// cookies alongside the created user.
pub async fn create_user_endpoint(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(data): Json<RegisterUserData>,
) -> Result<Response, Error> {
    let email: EmailAddress = data
        .email
        .parse()
        .map_err(|_| Error::InvalidEmail(data.email.clone()))?;
    let validated_password = ValidatedPassword::new(&data.password)?;
    let password_hash = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");
        create_user(email, password_hash, &connection)?
    };

    tracing::info!("Registered user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)
        .map_err(|_| Error::DateError)?;

    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(&user))).into_response())
}

#[cfg(test)]
mod register_user_tests {
    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        AppState,
        auth::COOKIE_USER_ID,
        endpoints,
        user::{UserResponse, count_users},
    };

    use super::create_user_endpoint;

    fn get_test_server() -> (TestServer, AppState) {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn, "42").expect("Could not create app state");

        let app = Router::new()
            .route(endpoints::USERS, post(create_user_endpoint))
            .with_state(state.clone());

        let server = TestServer::new(app).expect("Could not create test server");

        (server, state)
    }

    #[tokio::test]
    async fn register_returns_201_and_sets_auth_cookie() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysecretandsecurepassword"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let user_response = response.json::<UserResponse>();
        assert_eq!(user_response.email, "foo@bar.baz");
        assert!(response.maybe_cookie(COOKIE_USER_ID).is_some());
    }

    #[tokio::test]
    async fn register_fails_on_invalid_email() {
        let (server, state) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .json(&json!({
                "email": "definitelynotanemail",
                "password": "averysecretandsecurepassword"
            }))
            .await;

        response.assert_status_bad_request();
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection), Ok(0));
    }

    #[tokio::test]
    async fn register_fails_on_weak_password() {
        let (server, state) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "password123"
            }))
            .await;

        response.assert_status_bad_request();
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection), Ok(0));
    }

    #[tokio::test]
    async fn register_fails_on_duplicate_email() {
        let (server, _) = get_test_server();
        let body = json!({
            "email": "foo@bar.baz",
            "password": "averysecretandsecurepassword"
        });

        server
            .post(endpoints::USERS)
            .json(&body)
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server.post(endpoints::USERS).json(&body).await;

        response.assert_status_bad_request();
    }
}
