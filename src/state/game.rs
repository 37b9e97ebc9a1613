use std::fmt;

/// Label shown for the first team until renamed.
pub const DEFAULT_TEAM_A_NAME: &str = "Team A";
/// Label shown for the second team until renamed.
pub const DEFAULT_TEAM_B_NAME: &str = "Team B";
/// Game clock value at session start.
pub const DEFAULT_GAME_TIMER: &str = "10:00";
/// Shot clock value at session start.
pub const DEFAULT_SHOT_CLOCK: &str = "24";
/// Period shown at session start.
pub const DEFAULT_PERIOD: &str = "1";
/// Period values offered by control surfaces. The model itself accepts any string.
pub const CANONICAL_PERIODS: [&str; 5] = ["1", "2", "3", "4", "OT"];

/// Identifies one of the two teams on the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamId {
    /// Home side, shown on the left.
    A,
    /// Away side, shown on the right.
    B,
}

impl TeamId {
    /// Both teams, in display order.
    pub const ALL: [TeamId; 2] = [TeamId::A, TeamId::B];

    /// Single-letter identifier used in wire keys and routes.
    pub fn as_str(self) -> &'static str {
        match self {
            TeamId::A => "A",
            TeamId::B => "B",
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A team as displayed on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Display label.
    pub name: String,
    /// Points scored so far; never negative.
    pub score: u32,
}

impl Team {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0,
        }
    }
}

/// Authoritative record shared by every party of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// First team.
    pub team_a: Team,
    /// Second team.
    pub team_b: Team,
    /// Game clock display value (`MM:SS` or `SS`).
    pub game_timer: String,
    /// Shot clock display value (`SS`).
    pub shot_clock: String,
    /// Current period label.
    pub period: String,
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_clocks(DEFAULT_GAME_TIMER, DEFAULT_SHOT_CLOCK)
    }
}

impl GameState {
    /// Fresh session state using the provided initial clock values.
    pub fn with_clocks(game_timer: &str, shot_clock: &str) -> Self {
        Self {
            team_a: Team::named(DEFAULT_TEAM_A_NAME),
            team_b: Team::named(DEFAULT_TEAM_B_NAME),
            game_timer: game_timer.to_string(),
            shot_clock: shot_clock.to_string(),
            period: DEFAULT_PERIOD.to_string(),
        }
    }

    /// Borrow a team by identifier.
    pub fn team(&self, id: TeamId) -> &Team {
        match id {
            TeamId::A => &self.team_a,
            TeamId::B => &self.team_b,
        }
    }

    fn team_mut(&mut self, id: TeamId) -> &mut Team {
        match id {
            TeamId::A => &mut self.team_a,
            TeamId::B => &mut self.team_b,
        }
    }
}

/// A discrete change request against the [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Rename a team.
    UpdateName {
        /// Team to rename.
        team: TeamId,
        /// New label, applied verbatim.
        name: String,
    },
    /// Add a signed number of points to a team.
    UpdateScore {
        /// Team to credit or debit.
        team: TeamId,
        /// Signed point delta.
        delta: i64,
    },
    /// Overwrite the game clock.
    SetTimer(String),
    /// Overwrite the shot clock.
    SetShotClock(String),
    /// Overwrite the period label.
    SetPeriod(String),
}

/// Pure transition function: consume a state and return the state after `mutation`.
///
/// Scores clamp at zero and saturate at `u32::MAX`. Every other field is overwritten
/// verbatim; format checks belong to whoever produces the value.
pub fn apply(mut state: GameState, mutation: Mutation) -> GameState {
    match mutation {
        Mutation::UpdateName { team, name } => state.team_mut(team).name = name,
        Mutation::UpdateScore { team, delta } => {
            let team = state.team_mut(team);
            team.score = clamp_score(i64::from(team.score).saturating_add(delta));
        }
        Mutation::SetTimer(value) => state.game_timer = value,
        Mutation::SetShotClock(value) => state.shot_clock = value,
        Mutation::SetPeriod(value) => state.period = value,
    }
    state
}

fn clamp_score(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}
