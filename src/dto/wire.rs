//! Flat JSON frames exchanged over the synchronization channel.
//!
//! Every frame is an object keyed by field name (`{"teamAScore": 5}`, `{"period": "2"}`).
//! Senders always emit one key per frame; receivers accept several.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::game::{GameState, Mutation, TeamId};

/// Reasons an inbound frame cannot be turned into updates.
#[derive(Debug, Error)]
pub enum WireError {
    /// The frame is not valid JSON.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The frame is valid JSON but not an object.
    #[error("frame must be a JSON object")]
    NotAnObject,
    /// The frame is an object without any key.
    #[error("frame carries no update")]
    Empty,
    /// A key is unknown or its value has the wrong type.
    #[error("invalid value for `{key}`: {source}")]
    InvalidEntry {
        /// Offending key.
        key: String,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

/// One scoreboard field as carried on the wire.
///
/// Serialises as a single-key object, which is exactly the frame layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WireUpdate {
    /// Display name of team A.
    #[serde(rename = "teamAName")]
    TeamAName(String),
    /// Display name of team B.
    #[serde(rename = "teamBName")]
    TeamBName(String),
    /// Absolute score of team A.
    #[serde(rename = "teamAScore")]
    TeamAScore(u32),
    /// Absolute score of team B.
    #[serde(rename = "teamBScore")]
    TeamBScore(u32),
    /// Game clock value.
    #[serde(rename = "gameTimer")]
    GameTimer(String),
    /// Shot clock value.
    #[serde(rename = "shotClock")]
    ShotClock(String),
    /// Period label.
    #[serde(rename = "period")]
    Period(String),
}

impl WireUpdate {
    /// Wire form of a mutation that has just been applied, read back from the resulting state.
    ///
    /// Scores travel as absolute values so receivers never accumulate deltas.
    pub fn from_applied(mutation: &Mutation, state: &GameState) -> Self {
        match mutation {
            Mutation::UpdateName { team, .. } => Self::name(*team, state.team(*team).name.clone()),
            Mutation::UpdateScore { team, .. } => Self::score(*team, state.team(*team).score),
            Mutation::SetTimer(_) => Self::GameTimer(state.game_timer.clone()),
            Mutation::SetShotClock(_) => Self::ShotClock(state.shot_clock.clone()),
            Mutation::SetPeriod(_) => Self::Period(state.period.clone()),
        }
    }

    /// Every field of `state`, one update per field, teams first.
    pub fn full_state(state: &GameState) -> Vec<Self> {
        let mut updates = Vec::with_capacity(7);
        for team in TeamId::ALL {
            updates.push(Self::name(team, state.team(team).name.clone()));
            updates.push(Self::score(team, state.team(team).score));
        }
        updates.push(Self::GameTimer(state.game_timer.clone()));
        updates.push(Self::ShotClock(state.shot_clock.clone()));
        updates.push(Self::Period(state.period.clone()));
        updates
    }

    /// Mutation that makes `current` reflect this update.
    ///
    /// An absolute score becomes the delta between the target and the current score.
    pub fn into_mutation(self, current: &GameState) -> Mutation {
        match self {
            Self::TeamAName(name) => Mutation::UpdateName {
                team: TeamId::A,
                name,
            },
            Self::TeamBName(name) => Mutation::UpdateName {
                team: TeamId::B,
                name,
            },
            Self::TeamAScore(score) => score_delta(TeamId::A, score, current),
            Self::TeamBScore(score) => score_delta(TeamId::B, score, current),
            Self::GameTimer(value) => Mutation::SetTimer(value),
            Self::ShotClock(value) => Mutation::SetShotClock(value),
            Self::Period(value) => Mutation::SetPeriod(value),
        }
    }

    /// Encode as a text frame.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn name(team: TeamId, name: String) -> Self {
        match team {
            TeamId::A => Self::TeamAName(name),
            TeamId::B => Self::TeamBName(name),
        }
    }

    fn score(team: TeamId, score: u32) -> Self {
        match team {
            TeamId::A => Self::TeamAScore(score),
            TeamId::B => Self::TeamBScore(score),
        }
    }
}

fn score_delta(team: TeamId, target: u32, current: &GameState) -> Mutation {
    Mutation::UpdateScore {
        team,
        delta: i64::from(target) - i64::from(current.team(team).score),
    }
}

/// Decode a text frame into its updates.
///
/// The whole frame is rejected when any key is unknown or ill-typed.
pub fn decode_frame(text: &str) -> Result<Vec<WireUpdate>, WireError> {
    let Value::Object(entries) = serde_json::from_str::<Value>(text)? else {
        return Err(WireError::NotAnObject);
    };
    if entries.is_empty() {
        return Err(WireError::Empty);
    }

    entries
        .into_iter()
        .map(|(key, value)| {
            let mut single = Map::with_capacity(1);
            single.insert(key.clone(), value);
            serde_json::from_value(Value::Object(single))
                .map_err(|source| WireError::InvalidEntry { key, source })
        })
        .collect()
}
