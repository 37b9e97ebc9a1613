use serde::Serialize;

/// Dispatched payload carried across the SSE viewer stream.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// SSE event name (`snapshot` or `update`).
    pub event: Option<String>,
    /// JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}
