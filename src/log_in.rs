//! The route handler for logging in a user.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{REMEMBER_ME_COOKIE_DURATION, set_auth_cookie},
    user::{UserResponse, get_user_by_email},
};

/// The request body for logging in a user.
#[derive(Debug, Deserialize)]
pub struct LogInData {
    /// The email address the user registered with.
    pub email: String,
    /// The user's password.
    pub password: String,
    /// Whether to keep the user logged in for longer than the default session
    /// duration.
    pub remember_me: Option<bool>,
}

/// A route handler for logging in a user.
///
/// An unknown email and a wrong password produce the same response so the
/// endpoint cannot be used to probe which emails are registered.
pub async fn log_in_endpoint(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(data): Json<LogInData>,
) -> Result<Response, Error> {
    let email: EmailAddress = data.email.parse().map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .expect("Could not acquire database lock");
        get_user_by_email(&email, &connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidCredentials,
            error => error,
        })?
    };

    let password_is_correct = user
        .password_hash
        .verify(&data.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let cookie_duration = if data.remember_me.unwrap_or(false) {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let jar =
        set_auth_cookie(jar, user.id, cookie_duration).map_err(|_| Error::DateError)?;

    tracing::info!("Logged in user {}", user.id);

    Ok((jar, Json(UserResponse::from(&user))).into_response())
}
