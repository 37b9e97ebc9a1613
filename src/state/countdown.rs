use std::{future::Future, time::Duration};

use tokio::{
    sync::{Mutex, oneshot},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info};

use super::clock::{ClockValue, DurationFormatError};

/// Spacing between two countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Active one-tick-per-second schedule owned by a [`Countdown`].
struct Cadence {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Drives a clock display value down to zero, one tick per second.
///
/// Each instance owns at most one cadence; starting again replaces the previous one.
/// Callbacks run on the cadence task and must not stop their own countdown.
pub struct Countdown {
    label: &'static str,
    cadence: Mutex<Option<Cadence>>,
}

impl Countdown {
    /// Create an idle countdown; `label` only shows up in logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            cadence: Mutex::new(None),
        }
    }

    /// Begin counting down from `current`.
    ///
    /// `on_tick` receives each formatted value. Once the value has reached zero the next
    /// boundary stops the cadence and calls `on_finish` instead. A malformed `current` is
    /// rejected before any running cadence is touched.
    pub async fn start<T, TFut, F, FFut>(
        &self,
        current: &str,
        mut on_tick: T,
        on_finish: F,
    ) -> Result<(), DurationFormatError>
    where
        T: FnMut(String) -> TFut + Send + 'static,
        TFut: Future<Output = ()> + Send,
        F: FnOnce() -> FFut + Send + 'static,
        FFut: Future<Output = ()> + Send,
    {
        let mut value: ClockValue = current.parse()?;

        let mut slot = self.cadence.lock().await;
        if let Some(previous) = slot.take() {
            halt(previous).await;
        }

        let (cancel, mut cancelled) = oneshot::channel::<()>();
        let label = self.label;
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancelled => break,
                    _ = ticker.tick() => {}
                }

                match value.tick() {
                    Some(next) => {
                        value = next;
                        on_tick(next.to_string()).await;
                    }
                    None => {
                        info!(clock = label, "countdown finished");
                        on_finish().await;
                        break;
                    }
                }
            }
        });

        info!(clock = label, from = %current, "countdown started");
        *slot = Some(Cadence { cancel, task });
        Ok(())
    }

    /// Cancel the active cadence, if any. Returns once no further callback can run.
    pub async fn stop(&self) {
        let previous = self.cadence.lock().await.take();
        match previous {
            Some(cadence) => {
                halt(cadence).await;
                info!(clock = self.label, "countdown stopped");
            }
            None => debug!(clock = self.label, "countdown already idle"),
        }
    }

    /// Whether a cadence is currently counting down.
    pub async fn is_running(&self) -> bool {
        self.cadence
            .lock()
            .await
            .as_ref()
            .is_some_and(|cadence| !cadence.task.is_finished())
    }
}

async fn halt(cadence: Cadence) {
    let Cadence { cancel, task } = cadence;
    let _ = cancel.send(());
    task.abort();
    let _ = task.await;
}
