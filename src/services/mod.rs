/// Session cookie gate for the control surface.
pub mod auth_service;
/// Server-driven game and shot clocks.
pub mod clock_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Control operations on the scoreboard.
pub mod scoreboard_service;
/// Server-Sent Events viewer stream.
pub mod sse_service;
/// WebSocket peer synchronisation.
pub mod websocket_service;
