//! Background writer that applies persistence requests in order

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::{error::StorageError, storage::KeyValueStore};

/// A queued persistence request
#[derive(Debug)]
pub enum PersistCommand {
    Write { key: String, value: String },
    Remove { key: String },
    /// Acknowledged once every earlier command has been applied
    Flush(oneshot::Sender<()>),
}

/// Cheap handle used to enqueue writes without waiting on them
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistHandle {
    /// Create a handle and the receiver that `persist_writer_task` consumes
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PersistCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Spawn the writer task on the current runtime and return its handle
    pub fn spawn(backend: Arc<dyn KeyValueStore>) -> Self {
        let (handle, rx) = Self::channel();
        tokio::spawn(persist_writer_task(rx, backend));
        handle
    }

    pub fn write(&self, key: &str, value: String) {
        self.send(PersistCommand::Write {
            key: key.to_string(),
            value,
        });
    }

    pub fn remove(&self, key: &str) {
        self.send(PersistCommand::Remove {
            key: key.to_string(),
        });
    }

    /// Wait until everything queued so far has reached the backend
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(ack_tx)).is_err() {
            warn!("Persistence writer is gone, nothing to flush");
            return;
        }
        if ack_rx.await.is_err() {
            warn!("Persistence writer stopped before acknowledging flush");
        }
    }

    fn send(&self, command: PersistCommand) {
        if let Err(e) = self.tx.send(command) {
            warn!("Dropping persistence request, writer is gone: {:?}", e.0);
        }
    }
}

/// Background task draining the persistence queue.
///
/// Failures are logged and skipped; callers already hold the authoritative
/// in-memory value.
pub async fn persist_writer_task(
    mut rx: mpsc::UnboundedReceiver<PersistCommand>,
    backend: Arc<dyn KeyValueStore>,
) {
    info!("Starting persistence writer task");

    while let Some(command) = rx.recv().await {
        match command {
            PersistCommand::Write { key, value } => {
                let store = Arc::clone(&backend);
                let result = run_blocking(move || store.set(&key, &value).map(|_| key)).await;
                match result {
                    Ok(key) => debug!("Persisted {}", key),
                    Err(e) => error!("Failed to persist value: {}", e),
                }
            }
            PersistCommand::Remove { key } => {
                let store = Arc::clone(&backend);
                let result = run_blocking(move || store.remove(&key).map(|_| key)).await;
                match result {
                    Ok(key) => debug!("Removed {}", key),
                    Err(e) => error!("Failed to remove value: {}", e),
                }
            }
            PersistCommand::Flush(ack) => {
                // Nobody waiting is not an error.
                let _ = ack.send(());
            }
        }
    }

    info!("Persistence writer task stopped");
}

async fn run_blocking<F, R>(f: F) -> Result<R, StorageError>
where
    F: FnOnce() -> Result<R, StorageError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Join(e.to_string()))?
}
