//! Mutation Queue
//!
//! Serializes every write against the platform through a single worker task:
//! - FIFO order, one mutation in flight at a time
//! - a fixed pause after each mutation to stay under the API rate limit
//! - failures are logged and dropped, never retried
//! - each mutation runs in its own task, so a panicking call only fails
//!   that mutation
//!
//! Producers never block; the channel is unbounded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::domain::entities::{Mutation, MutationKind, MutationOutcome};
use crate::domain::ports::PlatformClient;
use crate::error::QueueError;

struct QueuedMutation {
    mutation: Mutation,
    completion: Option<oneshot::Sender<MutationOutcome>>,
}

/// Producer handle for the mutation queue
///
/// Cloning is cheap. The worker exits once every handle has been dropped and
/// the backlog is drained.
#[derive(Clone)]
pub struct MutationQueue {
    tx: mpsc::UnboundedSender<QueuedMutation>,
}

impl MutationQueue {
    /// Start the worker task and return the producer handle
    pub fn spawn<P>(platform: Arc<P>, delay: Duration) -> (Self, JoinHandle<()>)
    where
        P: PlatformClient + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = MutationWorker {
            platform,
            rx,
            delay,
        };
        (Self { tx }, tokio::spawn(worker.run()))
    }

    /// Submit a mutation without waiting for it
    pub fn enqueue(&self, mutation: Mutation) -> Result<(), QueueError> {
        self.submit(QueuedMutation {
            mutation,
            completion: None,
        })
    }

    /// Submit a mutation and get a receiver for its outcome
    #[allow(dead_code)]
    pub fn enqueue_tracked(
        &self,
        mutation: Mutation,
    ) -> Result<oneshot::Receiver<MutationOutcome>, QueueError> {
        let (tx, rx) = oneshot::channel();
        self.submit(QueuedMutation {
            mutation,
            completion: Some(tx),
        })?;
        Ok(rx)
    }

    fn submit(&self, job: QueuedMutation) -> Result<(), QueueError> {
        self.tx.send(job).map_err(|_| QueueError::Closed)
    }
}

struct MutationWorker<P: PlatformClient + 'static> {
    platform: Arc<P>,
    rx: mpsc::UnboundedReceiver<QueuedMutation>,
    delay: Duration,
}

impl<P: PlatformClient + 'static> MutationWorker<P> {
    async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            let outcome = self.execute(&job.mutation).await;

            if let Some(completion) = job.completion {
                // Receiver may have been dropped; completion is informational only
                let _ = completion.send(outcome);
            }

            tokio::time::sleep(self.delay).await;
        }

        tracing::debug!("Mutation queue closed, worker exiting");
    }

    async fn execute(&self, mutation: &Mutation) -> MutationOutcome {
        let id = &mutation.comment_id;
        let platform = self.platform.clone();
        let job = mutation.clone();
        let call = tokio::spawn(async move {
            match &job.kind {
                MutationKind::Edit { text } => platform.edit(&job.comment_id, text).await,
                MutationKind::Delete => platform.delete(&job.comment_id).await,
            }
        });

        let result = match call.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    comment_id = %id,
                    error = %e,
                    "Queued {} aborted",
                    mutation.verb()
                );
                return MutationOutcome::Failed(e.to_string());
            }
        };

        match result {
            Ok(()) => {
                match mutation.kind {
                    MutationKind::Edit { .. } => tracing::info!("Updated comment: {}", id),
                    MutationKind::Delete => tracing::info!("Deleted comment: {}", id),
                }
                MutationOutcome::Applied
            }
            Err(e) => {
                tracing::error!(
                    comment_id = %id,
                    error = %e,
                    "Error executing queued {}",
                    mutation.verb()
                );
                MutationOutcome::Failed(e.to_string())
            }
        }
    }
}
