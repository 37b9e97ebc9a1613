use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/scoreboard",
    tag = "sse",
    responses((status = 200, description = "Scoreboard viewer stream", content_type = "text/event-stream", body = String))
)]
/// Stream the scoreboard to passive displays: a `snapshot` event, then `update` events.
pub async fn scoreboard_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    info!("New scoreboard SSE connection");
    sse_service::viewer_stream(state).await
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/scoreboard", get(scoreboard_stream))
}
