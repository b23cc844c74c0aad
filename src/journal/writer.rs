//! Background Journal Writer
//!
//! Request handlers never wait on the journal store. They push entries into a
//! bounded channel through a `JournalHandle`; a single spawned task drains the
//! channel and writes entries in submission order.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::ActivityJournal;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

enum JournalCommand {
    Record {
        user_id: String,
        description: String,
    },
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Cheap, cloneable sender side of the journal writer.
#[derive(Clone)]
pub struct JournalHandle {
    tx: mpsc::Sender<JournalCommand>,
    journal: Arc<ActivityJournal>,
}

impl JournalHandle {
    /// Queues an entry without waiting. A full or closed queue drops it.
    pub fn submit(&self, user_id: &str, description: String) {
        let command = JournalCommand::Record {
            user_id: user_id.to_string(),
            description,
        };
        match self.tx.try_send(command) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Journal queue full, dropping entry for {}", user_id);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Journal writer stopped, dropping entry for {}", user_id);
            }
        }
    }

    /// Resolves once every entry submitted before this call has been handled.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(JournalCommand::Flush(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }

    pub fn journal(&self) -> &Arc<ActivityJournal> {
        &self.journal
    }
}

pub struct JournalWriter {
    handle: JournalHandle,
    task: JoinHandle<()>,
}

impl JournalWriter {
    pub fn spawn(journal: Arc<ActivityJournal>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(journal.clone(), rx));
        tracing::info!("Journal writer started (queue capacity {})", capacity.max(1));

        Self {
            handle: JournalHandle { tx, journal },
            task,
        }
    }

    pub fn handle(&self) -> JournalHandle {
        self.handle.clone()
    }

    /// Writes everything already queued, then stops the task.
    pub async fn shutdown(self) {
        if self.handle.tx.send(JournalCommand::Shutdown).await.is_err() {
            return;
        }
        match tokio::time::timeout(SHUTDOWN_GRACE, self.task).await {
            Ok(Ok(())) => tracing::info!("Journal writer drained"),
            Ok(Err(e)) => tracing::error!("Journal writer task failed: {}", e),
            Err(_) => tracing::warn!("Journal writer did not drain within {:?}", SHUTDOWN_GRACE),
        }
    }
}

async fn run(journal: Arc<ActivityJournal>, mut rx: mpsc::Receiver<JournalCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            JournalCommand::Record {
                user_id,
                description,
            } => {
                journal.record(&user_id, &description).await;
            }
            JournalCommand::Flush(ack) => {
                let _ = ack.send(());
            }
            JournalCommand::Shutdown => break,
        }
    }
}
