use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::{sse::ServerEvent, wire::WireUpdate},
    services::scoreboard_service,
    state::{HubEvent, SharedState},
};

const EVENT_SNAPSHOT: &str = "snapshot";
const EVENT_UPDATE: &str = "update";

/// Open a viewer stream: a full snapshot first, then one `update` event per applied mutation.
pub async fn viewer_stream(
    state: SharedState,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading the snapshot so nothing applied in between is missed.
    let receiver = state.subscribe();
    let initial = snapshot_event(&state).await;
    to_sse_stream(state, receiver, initial)
}

/// Convert a hub receiver into an SSE response, forwarding updates and resending a snapshot
/// whenever the viewer lagged behind.
fn to_sse_stream(
    state: SharedState,
    mut receiver: broadcast::Receiver<HubEvent>,
    initial: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(initial) = initial {
            if tx.send(Ok(into_event(initial))).await.is_err() {
                return;
            }
        }

        loop {
            let next = tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => match recv_result {
                    Ok(HubEvent { update, .. }) => update_event(&update),
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "viewer stream lagged; resending snapshot");
                        snapshot_event(&state).await
                    }
                },
            };

            if let Some(event) = next {
                if tx.send(Ok(into_event(event))).await.is_err() {
                    break;
                }
            }
        }

        info!("viewer SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn snapshot_event(state: &SharedState) -> Option<ServerEvent> {
    let snapshot = scoreboard_service::snapshot(state).await;
    ServerEvent::json(Some(EVENT_SNAPSHOT.to_string()), &snapshot)
        .inspect_err(|err| warn!(error = %err, "failed to serialise snapshot event"))
        .ok()
}

fn update_event(update: &WireUpdate) -> Option<ServerEvent> {
    ServerEvent::json(Some(EVENT_UPDATE.to_string()), update)
        .inspect_err(|err| warn!(error = %err, "failed to serialise update event"))
        .ok()
}

fn into_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use futures::StreamExt;
    use tokio::time::timeout;

    use super::*;
    use crate::{
        config::AppConfig,
        state::{
            AppState,
            game::{Mutation, TeamId},
        },
    };

    /// Read the body until one complete SSE event (terminated by a blank line) is buffered.
    async fn next_event<S>(body: &mut S, buffer: &mut String) -> String
    where
        S: Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
    {
        loop {
            if let Some(end) = buffer.find("\n\n") {
                let event = buffer[..end].to_string();
                buffer.drain(..end + 2);
                return event;
            }
            let chunk = timeout(Duration::from_secs(5), body.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }

    #[tokio::test]
    async fn stream_opens_with_a_snapshot_then_forwards_updates() {
        let state = AppState::new(AppConfig::default());
        let mut body = Box::pin(
            viewer_stream(state.clone())
                .await
                .into_response()
                .into_body()
                .into_data_stream(),
        );
        let mut buffer = String::new();

        let first = next_event(&mut body, &mut buffer).await;
        assert!(first.contains("event: snapshot"), "{first}");
        assert!(first.contains(r#""game_timer":"10:00""#), "{first}");

        state
            .apply_mutation(
                Mutation::UpdateScore {
                    team: TeamId::B,
                    delta: 2,
                },
                None,
            )
            .await;
        state
            .apply_mutation(Mutation::SetPeriod("2".into()), None)
            .await;

        let second = next_event(&mut body, &mut buffer).await;
        assert!(second.contains("event: update"), "{second}");
        assert!(second.contains(r#"data: {"teamBScore":2}"#), "{second}");

        let third = next_event(&mut body, &mut buffer).await;
        assert!(third.contains(r#"data: {"period":"2"}"#), "{third}");
    }

    #[test]
    fn update_events_carry_the_wire_frame() {
        let event = update_event(&WireUpdate::GameTimer("09:59".into())).unwrap();
        assert_eq!(event.event.as_deref(), Some("update"));
        assert_eq!(event.data, r#"{"gameTimer":"09:59"}"#);
    }
}
