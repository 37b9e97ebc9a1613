//! DTO definitions used by the scoreboard REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::{
    ClockKind,
    game::{GameState, Team, TeamId},
};

/// Team selector used in route paths (`A` or `B`, case-insensitive).
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub enum TeamParam {
    /// First team.
    #[serde(alias = "a")]
    A,
    /// Second team.
    #[serde(alias = "b")]
    B,
}

impl From<TeamParam> for TeamId {
    fn from(value: TeamParam) -> Self {
        match value {
            TeamParam::A => TeamId::A,
            TeamParam::B => TeamId::B,
        }
    }
}

/// Clock selector used in route paths.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClockParam {
    /// The period clock.
    Game,
    /// The shot clock.
    Shot,
}

impl From<ClockParam> for ClockKind {
    fn from(value: ClockParam) -> Self {
        match value {
            ClockParam::Game => ClockKind::Game,
            ClockParam::Shot => ClockKind::Shot,
        }
    }
}

/// Request renaming a team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RenameTeamRequest {
    /// New display name, at most 64 characters.
    #[validate(length(max = 64))]
    pub name: String,
}

/// Request adding a signed number of points to a team.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScoreDeltaRequest {
    /// Points to add; negative values remove points (the score never drops below zero).
    pub delta: i64,
}

/// Request overwriting a clock or the period with a display value.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetValueRequest {
    /// Display value, stored verbatim.
    #[validate(length(min = 1, max = 16))]
    pub value: String,
}

/// Team as exposed to REST consumers.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct TeamSnapshot {
    /// Display name.
    pub name: String,
    /// Current score.
    pub score: u32,
}

impl From<&Team> for TeamSnapshot {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name.clone(),
            score: team.score,
        }
    }
}

/// Whether each countdown is currently running.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
pub struct ClockStatus {
    /// Whether the game clock is counting down.
    pub game_running: bool,
    /// Whether the shot clock is counting down.
    pub shot_running: bool,
}

/// Full scoreboard snapshot returned by every control route.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ScoreboardSnapshot {
    /// Team A.
    pub team_a: TeamSnapshot,
    /// Team B.
    pub team_b: TeamSnapshot,
    /// Game clock display value.
    pub game_timer: String,
    /// Shot clock display value.
    pub shot_clock: String,
    /// Current period label.
    pub period: String,
    /// Period labels offered by control surfaces.
    pub periods: Vec<String>,
    /// Which clocks are running.
    pub clocks: ClockStatus,
    /// RFC 3339 timestamp of the last applied mutation.
    pub updated_at: String,
}

impl ScoreboardSnapshot {
    /// Build the snapshot from the authoritative state.
    pub fn new(state: &GameState, clocks: ClockStatus, updated_at: String) -> Self {
        Self {
            team_a: (&state.team_a).into(),
            team_b: (&state.team_b).into(),
            game_timer: state.game_timer.clone(),
            shot_clock: state.shot_clock.clone(),
            period: state.period.clone(),
            periods: crate::state::game::CANONICAL_PERIODS
                .iter()
                .map(|period| period.to_string())
                .collect(),
            clocks,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn team_param_accepts_both_cases() {
        let upper: TeamParam = serde_json::from_str(r#""A""#).unwrap();
        let lower: TeamParam = serde_json::from_str(r#""b""#).unwrap();
        assert_eq!(TeamId::from(upper), TeamId::A);
        assert_eq!(TeamId::from(lower), TeamId::B);
        assert!(serde_json::from_str::<TeamParam>(r#""C""#).is_err());
    }

    #[test]
    fn value_requests_are_bounded() {
        assert!(SetValueRequest { value: "OT".into() }.validate().is_ok());
        assert!(SetValueRequest { value: "".into() }.validate().is_err());
        assert!(
            RenameTeamRequest {
                name: "x".repeat(65)
            }
            .validate()
            .is_err()
        );
        assert!(RenameTeamRequest { name: "".into() }.validate().is_ok());
    }
}
