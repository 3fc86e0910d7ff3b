//! Trailing-edge debouncing of async event streams.
//!
//! [`Debouncer::run`] keeps a single pending slot and a deadline. Each event
//! replaces the slot and pushes the deadline out by the window; once the
//! deadline passes without a new event, the handler runs with the most recent
//! value. Handler runs are awaited inline, so at most one is ever in flight.

use std::future::Future;
use std::time::Duration;

use canopy_core::NotifyConfig;
use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Coalesces bursts of events into one handler run.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use canopy_notify::Debouncer;
///
/// let debouncer = Debouncer::new(Duration::from_millis(250));
/// assert_eq!(debouncer.window(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    window: Duration,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::from_config(&NotifyConfig::default())
    }
}

impl Debouncer {
    /// Creates a debouncer with the given quiet window.
    #[inline]
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Creates a debouncer from the notifier configuration.
    #[inline]
    #[must_use]
    pub const fn from_config(config: &NotifyConfig) -> Self {
        Self::new(Duration::from_millis(config.debounce_ms))
    }

    /// The quiet window.
    #[inline]
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Drives `events` until it ends or `cancel` fires.
    ///
    /// The handler receives the last event of each burst. When the stream
    /// ends with an event still pending, it is flushed immediately. A pending
    /// event is dropped on cancellation.
    ///
    /// Returns the number of handler runs.
    pub async fn run<S, T, F, Fut>(&self, events: S, cancel: CancellationToken, mut handler: F) -> usize
    where
        S: Stream<Item = T>,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = ()>,
    {
        tokio::pin!(events);
        let deadline = tokio::time::sleep(self.window);
        tokio::pin!(deadline);

        let mut pending: Option<T> = None;
        let mut runs = 0;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!(dropped = pending.is_some(), "Debouncer cancelled");
                    break;
                }

                next = events.next() => match next {
                    Some(event) => {
                        pending = Some(event);
                        deadline.as_mut().reset(Instant::now() + self.window);
                    }
                    None => {
                        if let Some(event) = pending.take() {
                            handler(event).await;
                            runs += 1;
                        }
                        break;
                    }
                },

                () = &mut deadline, if pending.is_some() => {
                    if let Some(event) = pending.take() {
                        handler(event).await;
                        runs += 1;
                    }
                }
            }
        }

        runs
    }
}

/// Adapts a broadcast receiver into a stream.
///
/// Lagged receivers skip the overwritten events with a warning; the stream
/// ends when every sender is dropped.
pub fn broadcast_stream<T>(receiver: broadcast::Receiver<T>) -> impl Stream<Item = T>
where
    T: Clone + Send + 'static,
{
    futures_util::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => return Some((event, receiver)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event receiver lagged, skipping events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    fn channel_stream(rx: mpsc::Receiver<u32>) -> impl Stream<Item = u32> {
        futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|value| (value, rx))
        })
    }

    fn spawn_debouncer(
        window: Duration,
        rx: mpsc::Receiver<u32>,
        cancel: CancellationToken,
    ) -> (Arc<Mutex<Vec<u32>>>, tokio::task::JoinHandle<usize>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let task = tokio::spawn(async move {
            Debouncer::new(window)
                .run(channel_stream(rx), cancel, move |value| {
                    let sink = Arc::clone(&sink);
                    async move { sink.lock().push(value) }
                })
                .await
        });
        (seen, task)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once_with_last_value() {
        let (tx, rx) = mpsc::channel(8);
        let (seen, task) = spawn_debouncer(Duration::from_secs(1), rx, CancellationToken::new());

        for value in [1, 2, 3] {
            tx.send(value).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(*seen.lock(), [3]);

        tx.send(4).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(5).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(*seen.lock(), [3, 5]);

        drop(tx);
        assert_eq!(task.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_window_not_yet_elapsed() {
        let (tx, rx) = mpsc::channel(8);
        let (seen, _task) = spawn_debouncer(Duration::from_secs(1), rx, CancellationToken::new());

        tx.send(1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(seen.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*seen.lock(), [1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_end_flushes_pending() {
        let (tx, rx) = mpsc::channel(8);
        let (seen, task) = spawn_debouncer(Duration::from_secs(60), rx, CancellationToken::new());

        tx.send(7).await.unwrap();
        drop(tx);

        assert_eq!(task.await.unwrap(), 1);
        assert_eq!(*seen.lock(), [7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let (seen, task) = spawn_debouncer(Duration::from_secs(1), rx, cancel.clone());

        tx.send(1).await.unwrap();
        cancel.cancel();

        assert_eq!(task.await.unwrap(), 0);
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_stream_ends_when_senders_drop() {
        let (tx, rx) = broadcast::channel(4);
        tx.send(1u32).unwrap();
        tx.send(2u32).unwrap();
        drop(tx);

        let collected: Vec<u32> = broadcast_stream(rx).collect().await;
        assert_eq!(collected, [1, 2]);
    }

    #[tokio::test]
    async fn test_broadcast_stream_skips_lagged() {
        let (tx, rx) = broadcast::channel(2);
        for value in 1..=4u32 {
            tx.send(value).unwrap();
        }
        drop(tx);

        let collected: Vec<u32> = broadcast_stream(rx).collect().await;
        assert_eq!(collected, [3, 4]);
    }

    #[test]
    fn test_default_window_follows_config() {
        assert_eq!(Debouncer::default().window(), Duration::from_millis(1000));
    }
}
