//! Session cookie gate protecting the control routes.

use axum::http::{HeaderMap, header::COOKIE};
use tracing::{info, warn};

use crate::{config::AppConfig, dto::auth::LoginRequest, error::ServiceError};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";
/// Value carried by an authenticated session cookie.
const SESSION_VALUE: &str = "authenticated";

/// Check the submitted credentials and return the `Set-Cookie` value opening a session.
pub fn login(config: &AppConfig, request: &LoginRequest) -> Result<String, ServiceError> {
    if !config.credentials_match(&request.username, &request.password) {
        warn!(username = %request.username, "rejected login attempt");
        return Err(ServiceError::Unauthorized("invalid credentials".into()));
    }

    info!(username = %request.username, "control surface logged in");
    Ok(session_cookie(config, SESSION_VALUE, config.session_max_age_secs()))
}

/// `Set-Cookie` value expiring the session immediately.
pub fn logout(config: &AppConfig) -> String {
    session_cookie(config, "", 0)
}

/// Whether the request carries an authenticated session cookie.
pub fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == SESSION_COOKIE && value == SESSION_VALUE)
}

fn session_cookie(config: &AppConfig, value: &str, max_age_secs: u64) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}");
    if config.secure_cookie() {
        cookie.push_str("; Secure");
    }
    cookie
}
