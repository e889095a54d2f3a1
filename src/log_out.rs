//! The route handler for logging out the current user.
//!
//! The route is not placed behind the auth middleware: the middleware would
//! re-extend the auth cookies on the way out, undoing the invalidation, and
//! logging out an already logged out client is harmless anyway.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::auth::invalidate_auth_cookie;

/// A route handler that logs out the current user by invalidating their auth
/// cookies.
pub async fn log_out_endpoint(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Json(json!({ "ok": true }))).into_response()
}
