use tracing::debug;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a health payload reporting how many peers are synchronised.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let peers = state.peers().len();
    debug!(peers, "health check");
    HealthResponse::ok(peers)
}
