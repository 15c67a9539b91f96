// THEORY:
// The `LookupWorker` moves network lookups off the owning thread. A batch runs on
// one background task that asks the provider about each address in turn, never
// concurrently, and posts every outcome back over a channel. The owning task is
// the only one that touches the cluster engine; it drains the channel and applies
// events in the order they arrive, which is the input order.
//
// A failed lookup becomes a `Failed` event and the batch carries on. The last
// event of every batch is `Finished`, which is the cue for the owner to fit the
// viewport and recompute clusters. There is no cancellation: a batch that nobody
// listens to any more stops at the next send.

use crate::error::LookupError;
use crate::geolocation::{GeoProvider, GeoRecord};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

/// One outcome posted by a running batch.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupEvent {
    Located { ip: String, record: GeoRecord },
    Failed { ip: String, error: LookupError },
    Finished { located: usize, failed: usize },
}

/// The receiving end of one running batch.
pub struct BatchHandle {
    events: mpsc::UnboundedReceiver<LookupEvent>,
    join: JoinHandle<()>,
}

impl BatchHandle {
    /// The next outcome, or `None` once the batch is over and drained.
    pub async fn recv(&mut self) -> Option<LookupEvent> {
        self.events.recv().await
    }

    /// Waits for the background task itself to exit.
    pub async fn join(self) -> Result<(), JoinError> {
        self.join.await
    }
}

pub struct LookupWorker<P: GeoProvider + 'static> {
    provider: Arc<P>,
}

impl<P: GeoProvider + 'static> LookupWorker<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Starts looking up `ips` on a blocking background task. Must be called
    /// from within a tokio runtime.
    pub fn spawn_batch(&self, ips: Vec<String>) -> BatchHandle {
        let (sender, events) = mpsc::unbounded_channel::<LookupEvent>();
        let provider = Arc::clone(&self.provider);

        let join = tokio::task::spawn_blocking(move || {
            run_batch(provider.as_ref(), ips, &sender);
        });

        BatchHandle { events, join }
    }
}

/// Looks up every address sequentially and posts each outcome to `sender`,
/// followed by `Finished`. Stops early if the receiver is gone.
pub fn run_batch<P: GeoProvider + ?Sized>(
    provider: &P,
    ips: Vec<String>,
    sender: &mpsc::UnboundedSender<LookupEvent>,
) {
    let total = ips.len();
    let mut located = 0;
    let mut failed = 0;

    for ip in ips {
        let event = match provider.locate(&ip) {
            Ok(record) => {
                located += 1;
                LookupEvent::Located { ip, record }
            }
            Err(error) => {
                failed += 1;
                LookupEvent::Failed { ip, error }
            }
        };

        if sender.send(event).is_err() {
            debug!("lookup batch abandoned: receiver dropped");
            return;
        }
    }

    info!(total, located, failed, "lookup batch finished");
    let _ = sender.send(LookupEvent::Finished { located, failed });
}
