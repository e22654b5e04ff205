use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::criteria::SearchCriteria;
use crate::error::ScourError;
use crate::matcher::SearchMatcher;
use crate::pool::{spawn_workers, CompletionLatch, MatchSink};
use crate::queue::spawn_producer;
use crate::results::MatchResult;
use crate::walker::{discover_roots, PathWalker};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle of a [`SearchSession`].
///
/// States only move forward: a session runs once and is done. Build a new
/// session to search again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Constructed, not yet started.
    Idle = 0,
    /// Workers are claiming and matching.
    Running = 1,
    /// Stop requested; workers finish their in-flight listing and exit.
    Stopping = 2,
    /// All workers have exited and the completion callback has fired.
    Stopped = 3,
}

impl SessionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

// ---------------------------------------------------------------------------
// SearchSession
// ---------------------------------------------------------------------------

/// One cancellable search: configuration in, a stream of matches out, one
/// completion notification at the end.
///
/// The session owns the walk producer and the worker pool for its
/// lifetime. [`start`](Self::start) returns immediately; matches arrive
/// asynchronously through the per-match callback and completion is
/// signalled exactly once through the completion callback, from whichever
/// worker thread exits last. Callers needing a specific execution context
/// (a UI thread, say) redispatch from inside their callbacks.
///
/// All methods take `&self`, so a session can be shared across threads
/// behind an `Arc`; `stop` is safe to call from anywhere, any number of
/// times. Worker threads are detached: dropping the session does not
/// interrupt a search already in flight.
pub struct SearchSession {
    state:    Arc<AtomicU8>,
    stop:     Arc<AtomicBool>,
    on_match: MatchSink,
    on_done:  Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl SearchSession {
    /// Create a session with its result callbacks.
    ///
    /// `on_match` is invoked once per match, from arbitrary worker threads,
    /// possibly concurrently; a consumer accumulating results must
    /// serialize its own state. `on_done` is invoked exactly once, after
    /// every worker has exited.
    pub fn new(
        on_match: impl Fn(MatchResult) + Send + Sync + 'static,
        on_done: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            state:    Arc::new(AtomicU8::new(SessionState::Idle as u8)),
            stop:     Arc::new(AtomicBool::new(false)),
            on_match: Arc::new(on_match),
            on_done:  Mutex::new(Some(Box::new(on_done))),
        }
    }

    /// The session's current lifecycle state.
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Begin searching. Non-blocking.
    ///
    /// Validates the criteria, builds the walk over the configured roots
    /// (or every discoverable volume when none are configured), and starts
    /// the producer and worker threads. Matches begin arriving on the
    /// per-match callback before this returns, potentially.
    ///
    /// # Errors
    ///
    /// Returns a config error for unusable criteria, `AlreadyRunning` if
    /// the session is not idle (sessions are single-use), or `Spawn` if
    /// the walk thread cannot be created.
    pub fn start(&self, criteria: SearchCriteria) -> Result<(), ScourError> {
        criteria.validate()?;

        self.state
            .compare_exchange(
                SessionState::Idle as u8,
                SessionState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| ScourError::AlreadyRunning)?;

        let roots = if criteria.roots.is_empty() {
            discover_roots()
        } else {
            criteria.roots.clone()
        };
        debug!(
            targets = criteria.targets.len(),
            roots = roots.len(),
            workers = criteria.workers,
            contents = criteria.search_contents,
            "starting search"
        );

        let walker = PathWalker::new(roots);
        let queue = match spawn_producer(walker, Arc::clone(&self.stop)) {
            Ok(queue) => queue,
            Err(err) => {
                // The walk never began, so no worker will ever fire
                // completion; the session is dead.
                self.state
                    .store(SessionState::Stopped as u8, Ordering::Release);
                return Err(err);
            }
        };

        let matcher = Arc::new(SearchMatcher::new(&criteria));
        let latch = Arc::new(CompletionLatch::new(
            criteria.workers,
            self.completion_action(),
        ));

        spawn_workers(
            criteria.workers,
            matcher,
            queue,
            Arc::clone(&self.stop),
            Arc::clone(&self.on_match),
            latch,
        );
        Ok(())
    }

    /// Request the search to stop. Non-blocking, idempotent, a no-op
    /// unless the session is running.
    ///
    /// Workers stop claiming new directories; whatever each is matching
    /// right now completes, and the completion callback still fires once
    /// the last worker exits. Drain time is therefore bounded by a single
    /// directory's work.
    pub fn stop(&self) {
        let swapped = self.state.compare_exchange(
            SessionState::Running as u8,
            SessionState::Stopping as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if swapped.is_ok() {
            debug!("stop requested");
            self.stop.store(true, Ordering::Relaxed);
        }
    }

    /// Build the one-shot action the last worker runs: mark the session
    /// terminal, then hand control to the consumer's callback.
    ///
    /// Only reachable from the one `start` call that won the idle state
    /// exchange, so the callback slot is still populated here.
    fn completion_action(&self) -> Box<dyn FnOnce() + Send> {
        let on_done = self.on_done.lock().ok().and_then(|mut slot| slot.take());
        let state = Arc::clone(&self.state);

        Box::new(move || {
            state.store(SessionState::Stopped as u8, Ordering::Release);
            debug!("search complete");
            if let Some(on_done) = on_done {
                on_done();
            }
        })
    }
}
