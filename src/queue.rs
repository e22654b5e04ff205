use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::trace;

use crate::error::ScourError;
use crate::walker::{DirListing, PathWalker};

/// Upper bound on listings buffered between the walk and the workers.
///
/// Keeps memory bounded on wide trees; the producer blocks once workers
/// fall this far behind.
const QUEUE_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// WorkQueue
// ---------------------------------------------------------------------------

/// A worker's handle onto the shared stream of directory listings.
///
/// One [`PathWalker`] feeds the queue from a dedicated producer thread;
/// every listing is delivered to exactly one claimant. Cloned once per
/// worker; the queue is exhausted when the producer has finished and the
/// buffer is drained.
#[derive(Clone)]
pub(crate) struct WorkQueue {
    rx: Receiver<DirListing>,
}

impl WorkQueue {
    /// Claim the next unvisited directory, blocking until one is available.
    ///
    /// Returns `None` once the walk is complete and all buffered listings
    /// have been claimed. Subsequent calls keep returning `None`.
    pub(crate) fn claim_next(&self) -> Option<DirListing> {
        self.rx.recv().ok()
    }
}

/// Start the walk on its own thread and return the queue it feeds.
///
/// The producer runs until the walk is exhausted, `stop` is raised, or
/// every claimant has gone away (send fails once all receivers drop, so an
/// abandoned walk cannot outlive its workers for long).
pub(crate) fn spawn_producer(
    walker: PathWalker,
    stop: Arc<AtomicBool>,
) -> Result<WorkQueue, ScourError> {
    let (tx, rx): (Sender<DirListing>, Receiver<DirListing>) = bounded(QUEUE_CAPACITY);

    thread::Builder::new()
        .name("scour-walk".into())
        .spawn(move || {
            let mut produced = 0usize;
            for listing in walker {
                if stop.load(Ordering::Relaxed) {
                    trace!(produced, "walk producer stopping on request");
                    return;
                }
                if tx.send(listing).is_err() {
                    trace!(produced, "walk producer stopping, no claimants left");
                    return;
                }
                produced += 1;
            }
            trace!(produced, "walk exhausted");
        })
        .map_err(|source| ScourError::Spawn { source })?;

    Ok(WorkQueue { rx })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
