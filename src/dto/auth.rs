use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials submitted by the control surface login form.
///
/// Anything but an exact match, empty fields included, is a rejected login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Control surface login.
    pub username: String,
    /// Control surface password.
    pub password: String,
}

/// Outcome of a login or logout call.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Whether the call opened (or closed) the session.
    pub success: bool,
}
