use std::sync::{Mutex, PoisonError};

use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::Event;

/// Sink for audit events
///
/// Emission is best-effort: implementations must never fail or block the
/// request pipeline, and must serialize their own writes so concurrent
/// emissions never interleave within one record.
pub trait AuditLogger: Send + Sync {
    fn emit(&self, event: Event);
}

/// Writes each event as one JSON object per line
///
/// `emit` only enqueues. A background task owns the writer and drains the
/// queue in emission order, so a slow or broken destination never holds up
/// a request.
#[derive(Debug, Clone)]
pub struct JsonLogger {
    tx: mpsc::UnboundedSender<Event>,
}

impl JsonLogger {
    /// Spawn the writer task for `writer`
    ///
    /// The task exits once every clone of the logger is dropped and the
    /// queue is drained; its handle then yields the writer back.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<W>(writer: W) -> (Self, JoinHandle<W>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_events(rx, writer));

        (Self { tx }, handle)
    }

    /// Logger writing to standard output
    pub fn stdout() -> (Self, JoinHandle<Stdout>) {
        Self::spawn(tokio::io::stdout())
    }
}

impl AuditLogger for JsonLogger {
    fn emit(&self, event: Event) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(trace_id = %e.0.trace_id(), "audit writer stopped; event dropped");
        }
    }
}

async fn write_events<W>(mut rx: mpsc::UnboundedReceiver<Event>, mut writer: W) -> W
where
    W: AsyncWrite + Unpin,
{
    while let Some(event) = rx.recv().await {
        let mut line = match serde_json::to_vec(&event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, event_type = %event.event_type(), "failed to encode audit event");
                continue;
            }
        };
        line.push(b'\n');

        if let Err(e) = write_line(&mut writer, &line).await {
            tracing::warn!(error = %e, trace_id = %event.trace_id(), "failed to write audit event");
        }
    }

    tracing::debug!("audit writer shutting down");
    writer
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &[u8]) -> std::io::Result<()> {
    writer.write_all(line).await?;
    writer.flush().await
}

/// Keeps emitted events in memory, in emission order
#[derive(Debug, Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<Event>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl AuditLogger for MemoryLogger {
    fn emit(&self, event: Event) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}
