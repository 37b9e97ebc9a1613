/// Clock display values.
pub mod clock;
/// One-tick-per-second countdown engine.
pub mod countdown;
/// Game record and its mutations.
pub mod game;
mod hub;

use std::{
    sync::{Arc, Weak},
    time::SystemTime,
};

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{RwLock, broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::{scoreboard::ClockStatus, wire::WireUpdate},
    state::{
        clock::DurationFormatError,
        countdown::Countdown,
        game::{GameState, Mutation},
    },
};

pub use self::hub::{HubEvent, UpdateHub};

/// Reference-counted handle on the application state.
pub type SharedState = Arc<AppState>;

/// Capacity of the update hub; slower subscribers resynchronise from a full snapshot.
const HUB_CAPACITY: usize = 64;

/// The two countdowns driven by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Period clock (`MM:SS`).
    Game,
    /// Shot clock (`SS`).
    Shot,
}

impl ClockKind {
    /// Mutation overwriting this clock's display value.
    pub fn mutation(self, value: String) -> Mutation {
        match self {
            ClockKind::Game => Mutation::SetTimer(value),
            ClockKind::Shot => Mutation::SetShotClock(value),
        }
    }

    /// Value shown once the clock runs out.
    pub fn expired_value(self) -> &'static str {
        match self {
            ClockKind::Game => "00:00",
            ClockKind::Shot => "00",
        }
    }

    /// Current display value of this clock in `game`.
    pub fn displayed(self, game: &GameState) -> &str {
        match self {
            ClockKind::Game => &game.game_timer,
            ClockKind::Shot => &game.shot_clock,
        }
    }

    /// Clock overwritten by `mutation`, if any.
    fn set_by(mutation: &Mutation) -> Option<Self> {
        match mutation {
            Mutation::SetTimer(_) => Some(ClockKind::Game),
            Mutation::SetShotClock(_) => Some(ClockKind::Shot),
            _ => None,
        }
    }
}

#[derive(Clone)]
/// Handle used to push frames to a connected WebSocket peer.
pub struct PeerConnection {
    /// Connection identifier, also used as the origin of the peer's updates.
    pub id: Uuid,
    /// Writer channel of the peer's socket.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Authoritative game record plus the time it last changed.
struct Session {
    game: GameState,
    updated_at: SystemTime,
}

/// Central application state: the single game session and everyone watching it.
///
/// Every mutation, whatever its source, goes through [`AppState::apply_mutation`] or
/// [`AppState::apply_update`], which apply and broadcast under one write guard so viewers see
/// updates in application order. Clock control (start, stop, reset, ticks) takes the same
/// guard.
pub struct AppState {
    me: Weak<AppState>,
    config: Arc<AppConfig>,
    session: RwLock<Session>,
    hub: UpdateHub,
    peers: DashMap<Uuid, PeerConnection>,
    game_clock: Countdown,
    shot_clock: Countdown,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        let game = GameState::with_clocks(config.initial_game_timer(), config.initial_shot_clock());
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            config: Arc::new(config),
            session: RwLock::new(Session {
                game,
                updated_at: SystemTime::now(),
            }),
            hub: UpdateHub::new(HUB_CAPACITY),
            peers: DashMap::new(),
            game_clock: Countdown::new("game"),
            shot_clock: Countdown::new("shot"),
        })
    }

    /// Shared runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Copy of the current game record.
    pub async fn snapshot(&self) -> GameState {
        self.session.read().await.game.clone()
    }

    /// Copy of the current game record and the time of its last change.
    pub async fn snapshot_with_time(&self) -> (GameState, SystemTime) {
        let guard = self.session.read().await;
        (guard.game.clone(), guard.updated_at)
    }

    /// Apply `mutation`, broadcast its wire form and return the resulting record.
    ///
    /// Overwriting a running clock makes it count down from the new value.
    pub async fn apply_mutation(&self, mutation: Mutation, origin: Option<Uuid>) -> GameState {
        let mut guard = self.session.write().await;
        self.commit_manual(&mut guard, mutation, origin).await;
        guard.game.clone()
    }

    /// Apply an update received from a peer.
    ///
    /// Absolute values are turned into mutations against the record as it stands under the
    /// write guard, so concurrent writers cannot interleave between read and apply.
    pub async fn apply_update(&self, update: WireUpdate, origin: Option<Uuid>) -> GameState {
        let mut guard = self.session.write().await;
        let mutation = update.into_mutation(&guard.game);
        self.commit_manual(&mut guard, mutation, origin).await;
        guard.game.clone()
    }

    /// Stop both clocks and replace the record with a fresh one, broadcasting every field.
    pub async fn reset(&self) -> GameState {
        let mut guard = self.session.write().await;
        self.game_clock.stop().await;
        self.shot_clock.stop().await;

        guard.game = GameState::with_clocks(
            self.config.initial_game_timer(),
            self.config.initial_shot_clock(),
        );
        guard.updated_at = SystemTime::now();
        for update in WireUpdate::full_state(&guard.game) {
            self.hub.broadcast(None, update);
        }
        guard.game.clone()
    }

    /// Start counting `kind` down from the value currently displayed.
    ///
    /// Restarting a running clock resumes from the value shown when the previous cadence
    /// is halted; no tick can land in between.
    pub async fn start_clock(&self, kind: ClockKind) -> Result<(), DurationFormatError> {
        let guard = self.session.write().await;
        self.spawn_cadence(kind, kind.displayed(&guard.game)).await
    }

    /// Pause `kind` on its current value.
    pub async fn stop_clock(&self, kind: ClockKind) {
        let _guard = self.session.write().await;
        self.countdown(kind).stop().await;
    }

    /// Stop `kind` and put it back to its configured initial value.
    pub async fn reset_clock(&self, kind: ClockKind) -> GameState {
        let mut guard = self.session.write().await;
        self.countdown(kind).stop().await;
        let initial = match kind {
            ClockKind::Game => self.config.initial_game_timer(),
            ClockKind::Shot => self.config.initial_shot_clock(),
        };
        self.commit(&mut guard, kind.mutation(initial.to_string()), None);
        guard.game.clone()
    }

    /// Subscribe to every update applied from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.hub.subscribe()
    }

    /// Countdown driving the given clock.
    pub fn countdown(&self, kind: ClockKind) -> &Countdown {
        match kind {
            ClockKind::Game => &self.game_clock,
            ClockKind::Shot => &self.shot_clock,
        }
    }

    /// Whether each countdown is currently running.
    pub async fn clock_status(&self) -> ClockStatus {
        ClockStatus {
            game_running: self.game_clock.is_running().await,
            shot_running: self.shot_clock.is_running().await,
        }
    }

    /// Registry of connected WebSocket peers keyed by connection identifier.
    pub fn peers(&self) -> &DashMap<Uuid, PeerConnection> {
        &self.peers
    }

    /// Ask every connected peer to close.
    pub fn close_all_peers(&self) {
        for peer in self.peers.iter() {
            let _ = peer.tx.send(Message::Close(None));
        }
    }

    /// Stop both clocks and close every peer, used on graceful shutdown.
    pub async fn shutdown(&self) {
        self.stop_clock(ClockKind::Game).await;
        self.stop_clock(ClockKind::Shot).await;
        self.close_all_peers();
    }

    /// Commit a mutation coming from outside the clocks, keeping a running clock in line
    /// with a value written over it.
    async fn commit_manual(
        &self,
        session: &mut Session,
        mutation: Mutation,
        origin: Option<Uuid>,
    ) {
        let overwritten = ClockKind::set_by(&mutation);
        self.commit(session, mutation, origin);

        let Some(kind) = overwritten else {
            return;
        };
        if !self.countdown(kind).is_running().await {
            return;
        }
        if let Err(err) = self.spawn_cadence(kind, kind.displayed(&session.game)).await {
            warn!(clock = ?kind, error = %err, "running clock overwritten with a non-countdown value; stopping it");
            self.countdown(kind).stop().await;
        }
    }

    /// (Re)start the cadence of `kind` from `from`. Callers hold the session write guard.
    async fn spawn_cadence(&self, kind: ClockKind, from: &str) -> Result<(), DurationFormatError> {
        let tick_state = self.me.clone();
        let finish_state = self.me.clone();

        self.countdown(kind)
            .start(
                from,
                move |value| {
                    let state = tick_state.clone();
                    async move {
                        if let Some(state) = state.upgrade() {
                            state.apply_clock(kind, value).await;
                        }
                    }
                },
                move || async move {
                    if let Some(state) = finish_state.upgrade() {
                        info!(clock = ?kind, "clock expired");
                        state
                            .apply_clock(kind, kind.expired_value().to_string())
                            .await;
                    }
                },
            )
            .await
    }

    /// Write a value produced by the clock itself.
    async fn apply_clock(&self, kind: ClockKind, value: String) {
        let mut guard = self.session.write().await;
        self.commit(&mut guard, kind.mutation(value), None);
    }

    fn commit(&self, session: &mut Session, mutation: Mutation, origin: Option<Uuid>) {
        let current = std::mem::take(&mut session.game);
        session.game = game::apply(current, mutation.clone());
        session.updated_at = SystemTime::now();

        let update = WireUpdate::from_applied(&mutation, &session.game);
        debug!(origin = ?origin, update = ?update, "applied mutation");
        self.hub.broadcast(origin, update);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::state::game::TeamId;

    fn drain(rx: &mut broadcast::Receiver<HubEvent>) -> Vec<HubEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn mutations_are_applied_then_broadcast_in_order() {
        let state = AppState::new(AppConfig::default());
        let mut rx = state.subscribe();
        let origin = Uuid::new_v4();

        state
            .apply_mutation(
                Mutation::UpdateScore {
                    team: TeamId::A,
                    delta: 3,
                },
                Some(origin),
            )
            .await;
        let after = state
            .apply_mutation(
                Mutation::UpdateScore {
                    team: TeamId::A,
                    delta: -5,
                },
                None,
            )
            .await;

        assert_eq!(after.team_a.score, 0);
        assert_eq!(
            drain(&mut rx),
            vec![
                HubEvent {
                    origin: Some(origin),
                    update: WireUpdate::TeamAScore(3),
                },
                HubEvent {
                    origin: None,
                    update: WireUpdate::TeamAScore(0),
                },
            ]
        );
    }

    #[tokio::test]
    async fn absolute_updates_are_resolved_against_current_state() {
        let state = AppState::new(AppConfig::default());
        state
            .apply_mutation(
                Mutation::UpdateScore {
                    team: TeamId::B,
                    delta: 10,
                },
                None,
            )
            .await;

        let after = state.apply_update(WireUpdate::TeamBScore(7), None).await;
        assert_eq!(after.team_b.score, 7);
        assert_eq!(state.snapshot().await.team_b.score, 7);
    }

    #[tokio::test]
    async fn reset_replaces_the_record_and_broadcasts_every_field() {
        let state = AppState::new(AppConfig::default());
        state
            .apply_mutation(Mutation::SetPeriod("3".into()), None)
            .await;
        let mut rx = state.subscribe();

        let fresh = state.reset().await;
        assert_eq!(fresh, GameState::default());

        let events = drain(&mut rx);
        assert_eq!(events.len(), 7);
        assert!(events.iter().all(|event| event.origin.is_none()));
        assert!(
            events
                .iter()
                .any(|event| event.update == WireUpdate::Period("1".into()))
        );
        assert_eq!(
            state.clock_status().await,
            ClockStatus {
                game_running: false,
                shot_running: false
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn overwriting_a_running_clock_counts_down_from_the_new_value() {
        let state = AppState::new(AppConfig::default());
        state.start_clock(ClockKind::Game).await.unwrap();
        sleep(Duration::from_millis(2_100)).await;
        assert_eq!(state.snapshot().await.game_timer, "09:58");

        state
            .apply_mutation(Mutation::SetTimer("05:00".into()), None)
            .await;
        sleep(Duration::from_millis(1_100)).await;
        assert_eq!(state.snapshot().await.game_timer, "04:59");
        assert!(state.clock_status().await.game_running);
    }

    #[tokio::test(start_paused = true)]
    async fn peer_clock_frames_retarget_the_running_clock() {
        let state = AppState::new(AppConfig::default());
        state.start_clock(ClockKind::Shot).await.unwrap();
        sleep(Duration::from_millis(1_100)).await;

        state
            .apply_update(WireUpdate::ShotClock("10".into()), Some(Uuid::new_v4()))
            .await;
        sleep(Duration::from_millis(1_100)).await;
        assert_eq!(state.snapshot().await.shot_clock, "09");

        sleep(Duration::from_secs(3)).await;
        assert_eq!(state.snapshot().await.shot_clock, "06");
    }

    #[tokio::test(start_paused = true)]
    async fn non_countdown_value_stops_the_running_clock() {
        let state = AppState::new(AppConfig::default());
        state.start_clock(ClockKind::Game).await.unwrap();
        sleep(Duration::from_millis(1_100)).await;

        state
            .apply_mutation(Mutation::SetTimer("HALF".into()), None)
            .await;
        sleep(Duration::from_secs(3)).await;

        assert_eq!(state.snapshot().await.game_timer, "HALF");
        assert!(!state.clock_status().await.game_running);
    }

    #[tokio::test(start_paused = true)]
    async fn setting_an_idle_clock_leaves_it_idle() {
        let state = AppState::new(AppConfig::default());
        state
            .apply_mutation(Mutation::SetShotClock("14".into()), None)
            .await;
        sleep(Duration::from_secs(2)).await;

        assert_eq!(state.snapshot().await.shot_clock, "14");
        assert!(!state.clock_status().await.shot_running);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_a_running_clock_never_repeats_a_second() {
        let state = AppState::new(AppConfig::default());
        let mut rx = state.subscribe();

        state.start_clock(ClockKind::Game).await.unwrap();
        sleep(Duration::from_millis(1_100)).await;
        state.start_clock(ClockKind::Game).await.unwrap();
        sleep(Duration::from_millis(2_100)).await;

        let shown: Vec<WireUpdate> = drain(&mut rx).into_iter().map(|event| event.update).collect();
        assert_eq!(
            shown,
            vec![
                WireUpdate::GameTimer("09:59".into()),
                WireUpdate::GameTimer("09:58".into()),
                WireUpdate::GameTimer("09:57".into()),
            ]
        );
    }
}
