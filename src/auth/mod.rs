//! User authentication: private session cookies and the middleware that
//! validates them.

mod cookie;
mod middleware;

pub(crate) use cookie::{
    COOKIE_EXPIRY, COOKIE_USER_ID, DEFAULT_COOKIE_DURATION, REMEMBER_ME_COOKIE_DURATION,
    get_user_id_from_auth_cookie, invalidate_auth_cookie, set_auth_cookie,
};
pub use middleware::{AuthState, auth_guard};
