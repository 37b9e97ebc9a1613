//! Server-driven countdowns: every tick is applied and broadcast like any other mutation.

use tracing::info;

use crate::{
    dto::scoreboard::ScoreboardSnapshot,
    error::ServiceError,
    services::scoreboard_service,
    state::{ClockKind, SharedState},
};

/// Start counting `kind` down from its current display value.
///
/// Restarting a running clock resumes from the value currently shown. Fails when the shown
/// value is not a countdown (`MM:SS` or `SS`).
pub async fn start_clock(
    state: &SharedState,
    kind: ClockKind,
) -> Result<ScoreboardSnapshot, ServiceError> {
    state.start_clock(kind).await?;
    Ok(scoreboard_service::snapshot(state).await)
}

/// Pause `kind` on its current value.
pub async fn stop_clock(state: &SharedState, kind: ClockKind) -> ScoreboardSnapshot {
    state.stop_clock(kind).await;
    scoreboard_service::snapshot(state).await
}

/// Stop `kind` and put it back to its configured initial value.
pub async fn reset_clock(state: &SharedState, kind: ClockKind) -> ScoreboardSnapshot {
    let game = state.reset_clock(kind).await;
    info!(clock = ?kind, value = %kind.displayed(&game), "clock reset");
    scoreboard_service::snapshot(state).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::{
        config::AppConfig,
        dto::{scoreboard::SetValueRequest, wire::WireUpdate},
        state::{AppState, HubEvent, game::Mutation},
    };

    #[tokio::test(start_paused = true)]
    async fn ticks_flow_through_the_hub() {
        let state = AppState::new(AppConfig::default());
        let mut rx = state.subscribe();

        let snap = start_clock(&state, ClockKind::Shot).await.unwrap();
        assert!(snap.clocks.shot_running);
        assert!(!snap.clocks.game_running);

        sleep(Duration::from_millis(2_100)).await;
        assert_eq!(state.snapshot().await.shot_clock, "22");
        assert_eq!(
            rx.try_recv().unwrap(),
            HubEvent {
                origin: None,
                update: WireUpdate::ShotClock("23".into()),
            }
        );

        let snap = stop_clock(&state, ClockKind::Shot).await;
        assert!(!snap.clocks.shot_running);
        sleep(Duration::from_secs(3)).await;
        assert_eq!(state.snapshot().await.shot_clock, "22");
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_writes_the_zero_value() {
        let state = AppState::new(AppConfig::default());
        state
            .apply_mutation(Mutation::SetTimer("00:01".into()), None)
            .await;

        start_clock(&state, ClockKind::Game).await.unwrap();
        sleep(Duration::from_millis(1_100)).await;
        assert_eq!(state.snapshot().await.game_timer, "00");

        sleep(Duration::from_secs(1)).await;
        assert_eq!(state.snapshot().await.game_timer, "00:00");
        assert!(!state.clock_status().await.game_running);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_restores_initial_value() {
        let state = AppState::new(AppConfig::default());
        start_clock(&state, ClockKind::Game).await.unwrap();
        sleep(Duration::from_millis(3_100)).await;
        assert_eq!(state.snapshot().await.game_timer, "09:57");

        let snap = reset_clock(&state, ClockKind::Game).await;
        assert_eq!(snap.game_timer, "10:00");
        assert!(!snap.clocks.game_running);
    }

    #[tokio::test]
    async fn malformed_display_value_refuses_to_start() {
        let state = AppState::new(AppConfig::default());
        state
            .apply_mutation(Mutation::SetShotClock("--".into()), None)
            .await;

        let err = start_clock(&state, ClockKind::Shot).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert!(!state.clock_status().await.shot_running);
    }

    #[tokio::test(start_paused = true)]
    async fn setting_the_game_timer_while_running_keeps_counting_from_it() {
        let state = AppState::new(AppConfig::default());
        start_clock(&state, ClockKind::Game).await.unwrap();
        sleep(Duration::from_millis(2_100)).await;

        scoreboard_service::set_game_timer(
            &state,
            SetValueRequest {
                value: "05:00".into(),
            },
        )
        .await
        .unwrap();
        sleep(Duration::from_millis(1_100)).await;

        let snap = scoreboard_service::snapshot(&state).await;
        assert_eq!(snap.game_timer, "04:59");
        assert!(snap.clocks.game_running);
    }
}
