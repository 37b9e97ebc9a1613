//! Library crate for scoreboard-back, exposing modules for binaries and integration tests.

/// Reconnecting client side of the sync protocol.
pub mod channel;
/// Runtime configuration.
pub mod config;
/// Request, response and wire payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP, WebSocket and SSE routes.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared session state, game model and clocks.
pub mod state;
