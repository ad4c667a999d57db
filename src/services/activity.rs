use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::{
    db::{Backend, Table},
    error::AppResult,
    models::ActivityEvent,
};

/// Best-effort recorder of user actions
///
/// Events are pushed onto a bounded queue and written to the activity table by
/// a background task, so callers never wait on the backend. A full or closed
/// queue drops the event with a warning; write failures are logged and dropped.
#[derive(Clone)]
pub struct ActivityRecorder {
    write_tx: mpsc::Sender<ActivityEvent>,
}

/// Handle for gracefully shutting down the activity writer
pub struct ActivityWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ActivityWriterHandle {
    /// Stops accepting events, flushes the queue and waits for the writer to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Activity writer shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Activity writer task join error");
        }
    }
}

impl ActivityRecorder {
    /// Creates a recorder and spawns its background writer task
    pub fn spawn(backend: Arc<dyn Backend>, capacity: usize) -> (Self, ActivityWriterHandle) {
        let (write_tx, write_rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            Self::activity_writer_task(backend, write_rx, shutdown_rx).await;
        });

        (Self { write_tx }, ActivityWriterHandle { shutdown_tx, task })
    }

    /// Background task that drains the queue into the backend
    ///
    /// On shutdown the queue is closed and whatever is already buffered is
    /// written before the task exits.
    async fn activity_writer_task(
        backend: Arc<dyn Backend>,
        mut write_rx: mpsc::Receiver<ActivityEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(backend = backend.name(), "Activity writer task started");

        loop {
            tokio::select! {
                Some(event) = write_rx.recv() => {
                    Self::write_event(backend.as_ref(), event).await;
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(event) = write_rx.recv().await {
                        Self::write_event(backend.as_ref(), event).await;
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Activity writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_event(backend: &dyn Backend, event: ActivityEvent) {
        if let Err(e) = Self::insert_event(backend, &event).await {
            tracing::error!(
                error = %e,
                user_id = %event.user_id,
                kind = %event.kind,
                "Failed to record user activity"
            );
        }
    }

    async fn insert_event(backend: &dyn Backend, event: &ActivityEvent) -> AppResult<()> {
        let record = serde_json::to_value(event)?;
        backend.insert(Table::UserActivity, record).await
    }

    /// Records an action without waiting for it to be stored
    pub fn record(&self, user_id: &str, kind: &str, product_id: Option<&str>) {
        let event = ActivityEvent::now(user_id, kind, product_id.map(str::to_string));

        match self.write_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    user_id = %event.user_id,
                    kind = %event.kind,
                    "Activity queue full, dropping event"
                );
            }
            Err(TrySendError::Closed(event)) => {
                tracing::warn!(
                    user_id = %event.user_id,
                    kind = %event.kind,
                    "Activity writer stopped, dropping event"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MemoryBackend, MockBackend},
        error::AppError,
        models::{ACTIVITY_SEARCH, ACTIVITY_VIEW},
    };

    #[tokio::test]
    async fn test_recorded_events_are_written_on_shutdown() {
        let backend = MemoryBackend::new();
        let (recorder, handle) = ActivityRecorder::spawn(Arc::new(backend.clone()), 16);

        recorder.record("u1", ACTIVITY_SEARCH, None);
        recorder.record("u1", ACTIVITY_VIEW, Some("p7"));
        handle.shutdown().await;

        let rows = backend.rows(Table::UserActivity).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["activity_type"], "search");
        assert_eq!(rows[1]["activity_type"], "view");
        assert_eq!(rows[1]["product_id"], "p7");
        assert_eq!(rows[1]["user_id"], "u1");
    }

    #[tokio::test]
    async fn test_write_failures_are_swallowed() {
        let mut backend = MockBackend::new();
        backend.expect_name().return_const("mock");
        backend
            .expect_insert()
            .times(2)
            .returning(|_, _| Err(AppError::Backend("unavailable".to_string())));

        let (recorder, handle) = ActivityRecorder::spawn(Arc::new(backend), 4);
        recorder.record("u1", ACTIVITY_SEARCH, None);
        recorder.record("u2", ACTIVITY_SEARCH, None);

        // Completes without panicking even though every write failed
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_record_after_shutdown_is_dropped() {
        let backend = MemoryBackend::new();
        let (recorder, handle) = ActivityRecorder::spawn(Arc::new(backend.clone()), 4);
        handle.shutdown().await;

        recorder.record("u1", ACTIVITY_SEARCH, None);

        assert!(backend.rows(Table::UserActivity).await.is_empty());
    }
}
