//! Single-context dispatcher for UI-bound state mutations
//!
//! The bound list state may only be mutated from one logical execution
//! context. Callers and background workers post closures here; a single
//! task applies them in post order. Each post carries its generation's
//! cancellation token, and a post whose generation has been cancelled by the
//! time it is applied is dropped instead of clobbering a newer generation's
//! state.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;

use crate::model::TrackListState;

type StateOp = Box<dyn FnOnce(&mut TrackListState) + Send>;

enum Message {
    Apply {
        generation: CancellationToken,
        op: StateOp,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle for posting mutations onto the UI-affinity context
#[derive(Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<Message>,
}

impl UiDispatcher {
    /// Spawn the apply loop over the given state cell.
    pub fn spawn(state: Arc<Mutex<TrackListState>>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Apply { generation, op } => {
                        if generation.is_cancelled() {
                            continue;
                        }
                        let mut state = state.lock().await;
                        op(&mut state);
                    }
                    Message::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });
        Self { tx }
    }

    /// Enqueue a mutation under the given generation.
    pub fn post<F>(&self, generation: &CancellationToken, op: F)
    where
        F: FnOnce(&mut TrackListState) + Send + 'static,
    {
        let _ = self.tx.send(Message::Apply {
            generation: generation.clone(),
            op: Box::new(op),
        });
    }

    /// Wait until everything posted so far has been applied (or skipped).
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Message::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}
