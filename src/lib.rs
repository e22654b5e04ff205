//! # scour
//!
//! Cancellable, concurrent filesystem search engine with streaming results.
//!
//! scour walks one or more directory trees, matches target substrings
//! against directory paths, file names, and (optionally) file contents,
//! and streams every match back through a callback as it is found. It owns
//! the traversal, the work queue, and the worker pool; it does **not** own
//! result presentation, input validation, or any UI surface. Those belong
//! to the caller.
//!
//! A search is a single-use [`SearchSession`]: start it with a
//! [`SearchCriteria`], receive [`MatchResult`]s on the per-match callback
//! from worker threads, and get exactly one completion notification when
//! the walk is exhausted or the session is stopped.
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//! use crossbeam_channel::unbounded;
//! use scour::{SearchCriteria, SearchSession};
//!
//! let dir = tempfile::tempdir().unwrap();
//! fs::write(dir.path().join("invoice_jan.txt"), "january invoice").unwrap();
//! fs::write(dir.path().join("report.txt"), "see invoice 42").unwrap();
//!
//! // Callbacks run on worker threads; a channel carries results back.
//! let (tx, rx) = unbounded();
//! let done_tx = tx.clone();
//! let session = SearchSession::new(
//!     move |m| { tx.send(Some(m)).ok(); },
//!     move || { done_tx.send(None).ok(); },
//! );
//!
//! session
//!     .start(
//!         SearchCriteria::new(["invoice"])
//!             .root(dir.path())
//!             .search_contents(true),
//!     )
//!     .unwrap();
//!
//! let mut found = Vec::new();
//! while let Some(m) = rx.recv().unwrap() {
//!     found.push(m);
//! }
//! // invoice_jan.txt matches by name and content, report.txt by content.
//! assert_eq!(found.len(), 3);
//! ```
//!
//! # Cancellation
//!
//! [`SearchSession::stop`] is cooperative: workers finish the directory
//! they are matching and claim no further work. It never blocks, is
//! idempotent, and the completion callback still fires exactly once.
//!
//! # Ordering
//!
//! Within one directory the emission order is fixed (directory match,
//! then each file's name and content matches in listing order). Across
//! directories, matches from different workers interleave arbitrarily;
//! consumers must not rely on a global order.

#![forbid(unsafe_code)]

pub mod matcher;
pub mod walker;

mod criteria;
mod error;
mod pool;
mod queue;
mod results;
mod session;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use criteria::{SearchCriteria, DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_WORKERS};
pub use error::ScourError;
pub use matcher::SearchMatcher;
pub use results::MatchResult;
pub use session::{SearchSession, SessionState};
pub use walker::{discover_roots, DirListing, PathWalker};
