use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Scoreboard Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::scoreboard_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::scoreboard::get_scoreboard,
        crate::routes::scoreboard::rename_team,
        crate::routes::scoreboard::adjust_score,
        crate::routes::scoreboard::set_period,
        crate::routes::scoreboard::set_game_timer,
        crate::routes::scoreboard::set_shot_clock,
        crate::routes::scoreboard::reset,
        crate::routes::clock::start_clock,
        crate::routes::clock::stop_clock,
        crate::routes::clock::reset_clock,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::wire::WireUpdate,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::AuthResponse,
            crate::dto::scoreboard::ScoreboardSnapshot,
            crate::dto::scoreboard::TeamSnapshot,
            crate::dto::scoreboard::ClockStatus,
            crate::dto::scoreboard::RenameTeamRequest,
            crate::dto::scoreboard::ScoreDeltaRequest,
            crate::dto::scoreboard::SetValueRequest,
            crate::dto::scoreboard::TeamParam,
            crate::dto::scoreboard::ClockParam,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "sync", description = "WebSocket synchronisation of scoreboard peers"),
        (name = "auth", description = "Control surface session"),
        (name = "scoreboard", description = "Scoreboard control"),
        (name = "clock", description = "Game and shot clock control"),
    )
)]
pub struct ApiDoc;
