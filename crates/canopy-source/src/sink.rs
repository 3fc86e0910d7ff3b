//! Destinations for rendered rows.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use crate::row::RenderedRow;

/// The paint pipeline that receives rendered rows.
///
/// Each call carries one batch in ascending row order: every visible row for
/// a full render, or only the changed rows for a partial one.
#[async_trait]
pub trait RenderSink: Send + Sync {
    /// Paints a batch of rows.
    async fn paint(&self, rows: Vec<RenderedRow>);
}

/// Forwards batches over an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Vec<RenderedRow>>,
}

impl ChannelSink {
    /// Creates a sink and the receiver its batches arrive on.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Vec<RenderedRow>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl RenderSink for ChannelSink {
    async fn paint(&self, rows: Vec<RenderedRow>) {
        if self.tx.send(rows).await.is_err() {
            debug!("Render receiver dropped, discarding rows");
        }
    }
}

/// Keeps every batch in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<Vec<RenderedRow>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the recorded batches.
    pub fn take(&self) -> Vec<Vec<RenderedRow>> {
        std::mem::take(&mut *self.batches.lock())
    }

    /// The most recent batch.
    #[must_use]
    pub fn last(&self) -> Option<Vec<RenderedRow>> {
        self.batches.lock().last().cloned()
    }

    /// Number of recorded batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.lock().len()
    }

    /// Returns `true` if nothing was painted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RenderSink for RecordingSink {
    async fn paint(&self, rows: Vec<RenderedRow>) {
        self.batches.lock().push(rows);
    }
}
