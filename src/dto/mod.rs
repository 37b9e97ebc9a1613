use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Login and logout payloads.
pub mod auth;
/// Health check payloads.
pub mod health;
/// Scoreboard REST payloads.
pub mod scoreboard;
/// Server-sent event payloads.
pub mod sse;
/// Sync protocol frames.
pub mod wire;

pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
