use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{trace, warn};

use crate::matcher::SearchMatcher;
use crate::queue::WorkQueue;
use crate::results::MatchResult;

/// Match callback shared by all workers. Invoked from arbitrary worker
/// threads, possibly concurrently, with no internal lock held.
pub(crate) type MatchSink = Arc<dyn Fn(MatchResult) + Send + Sync>;

// ---------------------------------------------------------------------------
// CompletionLatch
// ---------------------------------------------------------------------------

/// Countdown latch that runs a single action when the last participant
/// arrives.
///
/// Several workers can finish at the same moment; `fetch_sub` hands the
/// value 1 to exactly one of them, so the action cannot run twice. Taking
/// the action out of its slot doubles as the single-fire guard, and the
/// action runs with no lock held.
pub(crate) struct CompletionLatch {
    remaining: AtomicUsize,
    action:    Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl CompletionLatch {
    pub(crate) fn new(participants: usize, action: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            remaining: AtomicUsize::new(participants),
            action:    Mutex::new(Some(action)),
        }
    }

    /// Record one participant's exit; the last arrival fires the action.
    pub(crate) fn arrive(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            let action = self.action.lock().ok().and_then(|mut slot| slot.take());
            if let Some(action) = action {
                action();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Worker pool
// ---------------------------------------------------------------------------

/// Spawn `count` detached worker threads over the shared queue.
///
/// Each worker loops: claim a directory listing, run the matcher over it,
/// forward every match to `on_match` as it is produced. A raised stop flag
/// is observed between claims, so an in-flight listing always finishes
/// naturally and drain time is bounded by one listing's work, not by the
/// remaining tree.
///
/// Workers are not joined; each arrives at `latch` on exit and the last
/// one fires the completion action. A worker that fails to spawn arrives
/// immediately so the latch still reaches zero.
pub(crate) fn spawn_workers(
    count: usize,
    matcher: Arc<SearchMatcher>,
    queue: WorkQueue,
    stop: Arc<AtomicBool>,
    on_match: MatchSink,
    latch: Arc<CompletionLatch>,
) {
    for id in 0..count {
        let matcher  = Arc::clone(&matcher);
        let queue    = queue.clone();
        let stop     = Arc::clone(&stop);
        let on_match = Arc::clone(&on_match);
        let latch    = Arc::clone(&latch);

        let worker_latch = Arc::clone(&latch);
        let spawned = thread::Builder::new()
            .name(format!("scour-worker-{id}"))
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let Some(listing) = queue.claim_next() else {
                        break;
                    };
                    matcher.search_entry(&listing, &mut |m| on_match(m));
                }
                trace!(id, "worker exiting");
                worker_latch.arrive();
            });

        if let Err(err) = spawned {
            warn!(id, %err, "failed to spawn worker");
            latch.arrive();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_fires_after_all_arrivals() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let latch = CompletionLatch::new(3, Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        latch.arrive();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        latch.arrive();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        latch.arrive();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn latch_fires_exactly_once_under_contention() {
        for _ in 0..50 {
            let fired = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&fired);
            let latch = Arc::new(CompletionLatch::new(8, Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })));

            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let latch = Arc::clone(&latch);
                    thread::spawn(move || latch.arrive())
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(fired.load(Ordering::SeqCst), 1);
        }
    }
}
