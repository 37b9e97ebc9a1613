use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    dto::scoreboard::{
        RenameTeamRequest, ScoreDeltaRequest, ScoreboardSnapshot, SetValueRequest, TeamParam,
    },
    error::AppError,
    services::scoreboard_service,
    state::SharedState,
};

/// Public read-only view of the scoreboard.
pub fn router() -> Router<SharedState> {
    Router::new().route("/scoreboard", get(get_scoreboard))
}

/// Control surface endpoints mutating the scoreboard (session cookie required).
pub fn control_router() -> Router<SharedState> {
    Router::new()
        .route("/scoreboard/teams/{team}/name", put(rename_team))
        .route("/scoreboard/teams/{team}/score", post(adjust_score))
        .route("/scoreboard/period", put(set_period))
        .route("/scoreboard/game-timer", put(set_game_timer))
        .route("/scoreboard/shot-clock", put(set_shot_clock))
        .route("/scoreboard/reset", post(reset))
}

#[utoipa::path(
    get,
    path = "/scoreboard",
    tag = "scoreboard",
    responses((status = 200, description = "Current scoreboard", body = ScoreboardSnapshot))
)]
/// Return the current scoreboard.
pub async fn get_scoreboard(State(state): State<SharedState>) -> Json<ScoreboardSnapshot> {
    Json(scoreboard_service::snapshot(&state).await)
}

/// Rename a team.
#[utoipa::path(
    put,
    path = "/scoreboard/teams/{team}/name",
    tag = "scoreboard",
    params(("team" = TeamParam, Path, description = "Team to rename (`A` or `B`)")),
    request_body = RenameTeamRequest,
    responses(
        (status = 200, description = "Team renamed", body = ScoreboardSnapshot),
        (status = 401, description = "Missing session cookie")
    )
)]
pub async fn rename_team(
    State(state): State<SharedState>,
    Path(team): Path<TeamParam>,
    Json(payload): Json<RenameTeamRequest>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(
        scoreboard_service::rename_team(&state, team.into(), payload).await?,
    ))
}

/// Add (or remove) points for a team.
#[utoipa::path(
    post,
    path = "/scoreboard/teams/{team}/score",
    tag = "scoreboard",
    params(("team" = TeamParam, Path, description = "Team to credit (`A` or `B`)")),
    request_body = ScoreDeltaRequest,
    responses(
        (status = 200, description = "Score adjusted", body = ScoreboardSnapshot),
        (status = 401, description = "Missing session cookie")
    )
)]
pub async fn adjust_score(
    State(state): State<SharedState>,
    Path(team): Path<TeamParam>,
    Json(payload): Json<ScoreDeltaRequest>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(
        scoreboard_service::adjust_score(&state, team.into(), payload).await?,
    ))
}

/// Set the current period.
#[utoipa::path(
    put,
    path = "/scoreboard/period",
    tag = "scoreboard",
    request_body = SetValueRequest,
    responses((status = 200, description = "Period set", body = ScoreboardSnapshot))
)]
pub async fn set_period(
    State(state): State<SharedState>,
    Json(payload): Json<SetValueRequest>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(scoreboard_service::set_period(&state, payload).await?))
}

/// Overwrite the game clock display.
#[utoipa::path(
    put,
    path = "/scoreboard/game-timer",
    tag = "scoreboard",
    request_body = SetValueRequest,
    responses((status = 200, description = "Game clock set", body = ScoreboardSnapshot))
)]
pub async fn set_game_timer(
    State(state): State<SharedState>,
    Json(payload): Json<SetValueRequest>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(
        scoreboard_service::set_game_timer(&state, payload).await?,
    ))
}

/// Overwrite the shot clock display.
#[utoipa::path(
    put,
    path = "/scoreboard/shot-clock",
    tag = "scoreboard",
    request_body = SetValueRequest,
    responses((status = 200, description = "Shot clock set", body = ScoreboardSnapshot))
)]
pub async fn set_shot_clock(
    State(state): State<SharedState>,
    Json(payload): Json<SetValueRequest>,
) -> Result<Json<ScoreboardSnapshot>, AppError> {
    Ok(Json(
        scoreboard_service::set_shot_clock(&state, payload).await?,
    ))
}

/// Start a fresh session: clocks stopped and every field back to its initial value.
#[utoipa::path(
    post,
    path = "/scoreboard/reset",
    tag = "scoreboard",
    responses((status = 200, description = "Scoreboard reset", body = ScoreboardSnapshot))
)]
pub async fn reset(State(state): State<SharedState>) -> Json<ScoreboardSnapshot> {
    Json(scoreboard_service::reset(&state).await)
}
