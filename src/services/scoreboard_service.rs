//! Control operations on the scoreboard; each one funnels into the session's single entry point.

use validator::Validate;

use crate::{
    dto::{
        format_system_time,
        scoreboard::{RenameTeamRequest, ScoreDeltaRequest, ScoreboardSnapshot, SetValueRequest},
    },
    error::ServiceError,
    state::{
        SharedState,
        game::{Mutation, TeamId},
    },
};

/// Current scoreboard, clock status included.
pub async fn snapshot(state: &SharedState) -> ScoreboardSnapshot {
    let (game, updated_at) = state.snapshot_with_time().await;
    let clocks = state.clock_status().await;
    ScoreboardSnapshot::new(&game, clocks, format_system_time(updated_at))
}

/// Rename a team.
pub async fn rename_team(
    state: &SharedState,
    team: TeamId,
    request: RenameTeamRequest,
) -> Result<ScoreboardSnapshot, ServiceError> {
    request.validate()?;
    state
        .apply_mutation(
            Mutation::UpdateName {
                team,
                name: request.name,
            },
            None,
        )
        .await;
    Ok(snapshot(state).await)
}

/// Add `delta` points to a team; the score never drops below zero.
pub async fn adjust_score(
    state: &SharedState,
    team: TeamId,
    request: ScoreDeltaRequest,
) -> Result<ScoreboardSnapshot, ServiceError> {
    state
        .apply_mutation(
            Mutation::UpdateScore {
                team,
                delta: request.delta,
            },
            None,
        )
        .await;
    Ok(snapshot(state).await)
}

/// Overwrite the period label.
pub async fn set_period(
    state: &SharedState,
    request: SetValueRequest,
) -> Result<ScoreboardSnapshot, ServiceError> {
    set_value(state, request, Mutation::SetPeriod).await
}

/// Overwrite the game clock display.
pub async fn set_game_timer(
    state: &SharedState,
    request: SetValueRequest,
) -> Result<ScoreboardSnapshot, ServiceError> {
    set_value(state, request, Mutation::SetTimer).await
}

/// Overwrite the shot clock display.
pub async fn set_shot_clock(
    state: &SharedState,
    request: SetValueRequest,
) -> Result<ScoreboardSnapshot, ServiceError> {
    set_value(state, request, Mutation::SetShotClock).await
}

/// Start a new session: clocks stopped, every field back to its initial value.
pub async fn reset(state: &SharedState) -> ScoreboardSnapshot {
    state.reset().await;
    snapshot(state).await
}

async fn set_value(
    state: &SharedState,
    request: SetValueRequest,
    mutation: fn(String) -> Mutation,
) -> Result<ScoreboardSnapshot, ServiceError> {
    request.validate()?;
    state.apply_mutation(mutation(request.value), None).await;
    Ok(snapshot(state).await)
}
