use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
    routing::post,
};

use crate::{
    dto::auth::{AuthResponse, LoginRequest},
    error::{AppError, ServiceError},
    services::auth_service,
    state::SharedState,
};

/// Session endpoints used by the control surface.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
}

/// Exchange credentials for a session cookie.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; `session` cookie set", body = AuthResponse),
        (status = 401, description = "Credentials rejected", body = AuthResponse)
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    match auth_service::login(&state.config(), &payload) {
        Ok(cookie) => Ok((
            StatusCode::OK,
            [(SET_COOKIE, cookie)],
            Json(AuthResponse { success: true }),
        )
            .into_response()),
        Err(ServiceError::Unauthorized(_)) => Ok((
            StatusCode::UNAUTHORIZED,
            Json(AuthResponse { success: false }),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

/// Clear the session cookie.
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "auth",
    responses((status = 200, description = "Logged out", body = AuthResponse))
)]
pub async fn logout(State(state): State<SharedState>) -> impl IntoResponse {
    let cookie = auth_service::logout(&state.config());
    (
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(AuthResponse { success: true }),
    )
}
