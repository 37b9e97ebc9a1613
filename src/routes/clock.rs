use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::{
    dto::scoreboard::{ClockParam, ScoreboardSnapshot},
    error::AppError,
    services::clock_service,
    state::SharedState,
};

/// Countdown control endpoints (session cookie required).
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/clocks/{clock}/start", post(start_clock))
        .route("/clocks/{clock}/stop", post(stop_clock))
        .route("/clocks/{clock}/reset", post(reset_clock))
}

/// Start counting a clock down from its displayed value.
#[utoipa::path(
    post,
    path = "/clocks/{clock}/start",
    tag = "clock",
    params(("clock" = ClockParam, Path, description = "`game` or `shot`")),
    responses(
        (status = 200, description = "Clock started", body = ScoreboardSnapshot),
        (status = 409, description = "Displayed value is not a countdown")
    )
)]
pub async fn start_clock(
    State(state): State<SharedState>,
    Path(clock): Path<ClockParam>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(clock_service::start_clock(&state, clock.into()).await?))
}

/// Pause a clock on its displayed value.
#[utoipa::path(
    post,
    path = "/clocks/{clock}/stop",
    tag = "clock",
    params(("clock" = ClockParam, Path, description = "`game` or `shot`")),
    responses((status = 200, description = "Clock stopped", body = ScoreboardSnapshot))
)]
pub async fn stop_clock(
    State(state): State<SharedState>,
    Path(clock): Path<ClockParam>,
) -> Json<ScoreboardSnapshot> {
    Json(clock_service::stop_clock(&state, clock.into()).await)
}

/// Stop a clock and restore its initial value.
#[utoipa::path(
    post,
    path = "/clocks/{clock}/reset",
    tag = "clock",
    params(("clock" = ClockParam, Path, description = "`game` or `shot`")),
    responses((status = 200, description = "Clock reset", body = ScoreboardSnapshot))
)]
pub async fn reset_clock(
    State(state): State<SharedState>,
    Path(clock): Path<ClockParam>,
) -> Json<ScoreboardSnapshot> {
    Json(clock_service::reset_clock(&state, clock.into()).await)
}
