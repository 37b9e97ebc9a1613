//! Read-only scoreboard viewer: mirrors the server's record over the sync channel and logs it.

use std::{
    env,
    sync::{Arc, Mutex},
};

use scoreboard_back::{
    channel::{SyncChannel, TungsteniteConnector},
    config::AppConfig,
    state::game::{GameState, apply},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ENDPOINT: &str = "ws://localhost:8080/ws";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let endpoint = env::var("SCOREBOARD_WS_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
    info!(%endpoint, "starting viewer");

    let channel = SyncChannel::connect(TungsteniteConnector, endpoint, config.reconnect_delay());

    let board = Arc::new(Mutex::new(GameState::default()));
    let handler_board = board.clone();
    channel.on_message(move |update| {
        let mut guard = match handler_board.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mutation = update.into_mutation(&guard);
        *guard = apply(std::mem::take(&mut *guard), mutation);
        info!("{}", scoreboard_line(&guard));
    });

    let mut connectivity = channel.connectivity();
    loop {
        tokio::select! {
            changed = connectivity.changed() => {
                if changed.is_err() {
                    warn!("sync channel stopped");
                    break;
                }
                let current = *connectivity.borrow_and_update();
                info!(state = %current, "connectivity changed");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl+c received; closing");
                break;
            }
        }
    }

    channel.close().await;
    Ok(())
}

/// One-line rendering of the record, e.g. `Team A 12 - 9 Team B | P1 | 09:58 | 14`.
fn scoreboard_line(state: &GameState) -> String {
    format!(
        "{} {} - {} {} | P{} | {} | {}",
        state.team_a.name,
        state.team_a.score,
        state.team_b.score,
        state.team_b.name,
        state.period,
        state.game_timer,
        state.shot_clock
    )
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
