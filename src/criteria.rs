use std::path::PathBuf;

use crate::error::ScourError;

/// Default number of worker threads per session.
pub const DEFAULT_WORKERS: usize = 16;

/// Default ceiling for content scanning, in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: f64 = 20.0;

// ---------------------------------------------------------------------------
// SearchCriteria
// ---------------------------------------------------------------------------

/// What to search for, where, and how.
///
/// Built with chained methods, then handed to
/// [`SearchSession::start`](crate::SearchSession::start). A session captures
/// the criteria when it starts; mutating a clone afterwards has no effect on
/// a running search.
///
/// # Example
///
/// ```rust,ignore
/// let criteria = SearchCriteria::new(["invoice", "report"])
///     .root("/home/me/documents")
///     .search_contents(true)
///     .max_file_size_mb(10.0)
///     .extensions([".txt", ".csv"])
///     .workers(8);
/// ```
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub(crate) targets:          Vec<String>,
    pub(crate) roots:            Vec<PathBuf>,
    pub(crate) search_contents:  bool,
    pub(crate) max_file_size_mb: f64,
    pub(crate) extensions:       Vec<String>,
    pub(crate) workers:          usize,
}

impl SearchCriteria {
    /// Create criteria for the given target substrings.
    ///
    /// Targets are compared case-insensitively against directory paths,
    /// file names, and (when enabled) file contents. The target list must
    /// be non-empty and contain no empty strings; this is checked when the
    /// session starts.
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets:          targets.into_iter().map(Into::into).collect(),
            roots:            Vec::new(),
            search_contents:  false,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            extensions:       Vec::new(),
            workers:          DEFAULT_WORKERS,
        }
    }

    // ── Roots ─────────────────────────────────────────────────────────────

    /// Add one root directory to search under.
    ///
    /// May be called repeatedly. If no roots are configured at all, the
    /// session searches every discoverable top-level volume on the host
    /// (see [`discover_roots`](crate::walker::discover_roots)).
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(path.into());
        self
    }

    /// Replace the set of root directories.
    pub fn roots<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots = paths.into_iter().map(Into::into).collect();
        self
    }

    // ── Content search ────────────────────────────────────────────────────

    /// Also scan file contents for the targets. Disabled by default.
    ///
    /// Content scanning is gated per file: the extension filter is applied
    /// first, then the size ceiling, and only then is the file opened and
    /// decoded. Files that vanish or fail to decode as UTF-8 are skipped
    /// silently.
    pub fn search_contents(mut self, yes: bool) -> Self {
        self.search_contents = yes;
        self
    }

    /// Skip content scanning for files larger than `mb` megabytes.
    ///
    /// Only consulted when content search is enabled. Name matching is
    /// never size-gated. Defaults to 20 MB. Must be finite and
    /// non-negative; anything else fails validation when the session
    /// starts (a NaN ceiling would otherwise compare false against every
    /// size and admit arbitrarily large files).
    pub fn max_file_size_mb(mut self, mb: f64) -> Self {
        self.max_file_size_mb = mb;
        self
    }

    /// Restrict content scanning to files whose name ends with one of the
    /// given suffixes.
    ///
    /// Suffixes are compared exactly as supplied. Include the dot yourself
    /// (`".csv"`, not `"csv"`) if you want extension semantics. An empty
    /// set accepts every file; that is the default.
    pub fn extensions<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = suffixes.into_iter().map(Into::into).collect();
        self
    }

    // ── Concurrency ───────────────────────────────────────────────────────

    /// Number of worker threads claiming directories concurrently.
    ///
    /// Defaults to 16. Must be at least 1. Workers only parallelize the
    /// matching and file I/O; the directory walk itself is a single
    /// producer thread.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    // ── Validation ────────────────────────────────────────────────────────

    /// Check the criteria are usable. Called by the session on start.
    pub(crate) fn validate(&self) -> Result<(), ScourError> {
        if self.targets.is_empty() {
            return Err(ScourError::NoTargets);
        }
        if self.targets.iter().any(|t| t.is_empty()) {
            return Err(ScourError::EmptyTarget);
        }
        if self.workers == 0 {
            return Err(ScourError::InvalidWorkerCount(self.workers));
        }
        if !self.max_file_size_mb.is_finite() || self.max_file_size_mb < 0.0 {
            return Err(ScourError::InvalidSizeLimit(self.max_file_size_mb));
        }
        Ok(())
    }
}
