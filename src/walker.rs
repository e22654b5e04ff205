use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Directory names treated as version-control metadata.
///
/// The walker does not descend into these and the matcher never emits
/// results for paths containing one of them as a segment.
pub(crate) const VCS_DIR_NAMES: &[&str] = &[".git", ".svn", ".hg"];

// ---------------------------------------------------------------------------
// DirListing
// ---------------------------------------------------------------------------

/// One visited directory: its path plus the names of its immediate children.
///
/// Produced once per physical directory by [`PathWalker`] and claimed by
/// exactly one worker. Subdirectory names are informational only; matching
/// runs against the directory's own path and the file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    /// The directory itself.
    pub path: PathBuf,

    /// Names of immediate subdirectories, in directory-iteration order.
    pub dirs: Vec<String>,

    /// Names of immediate regular files, in directory-iteration order.
    pub files: Vec<String>,
}

// ---------------------------------------------------------------------------
// PathWalker
// ---------------------------------------------------------------------------

/// Lazy, single-pass, depth-first enumeration of one or more root
/// directories, yielding one [`DirListing`] per visited directory
/// (roots included).
///
/// Unreadable directories are skipped silently and the walk continues.
/// Symbolic links are never followed, so the walk is finite on any
/// filesystem. Version-control metadata directories are not descended
/// into. The iterator is not restartable; build a new walker to walk
/// again.
pub struct PathWalker {
    pending: Vec<PathBuf>,
}

impl PathWalker {
    /// Build a walker over the given roots.
    ///
    /// Roots that are not directories (missing, or plain files) are
    /// dropped here rather than surfaced as errors.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut pending: Vec<PathBuf> = roots
            .into_iter()
            .map(Into::into)
            .filter(|p| p.is_dir())
            .collect();
        // Stack order: first root should be visited first.
        pending.reverse();
        Self { pending }
    }
}

impl Iterator for PathWalker {
    type Item = DirListing;

    fn next(&mut self) -> Option<DirListing> {
        while let Some(dir) = self.pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    debug!(path = %dir.display(), %err, "skipping unreadable directory");
                    continue;
                }
            };

            let mut dirs = Vec::new();
            let mut files = Vec::new();
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().into_owned();
                // file_type() on a DirEntry does not traverse symlinks, so a
                // link to a directory lands in neither bucket and cannot
                // introduce a cycle.
                match entry.file_type() {
                    Ok(ft) if ft.is_dir() => dirs.push(name),
                    Ok(ft) if ft.is_file() => files.push(name),
                    _ => {}
                }
            }

            for sub in dirs.iter().rev() {
                if !VCS_DIR_NAMES.contains(&sub.as_str()) {
                    self.pending.push(dir.join(sub));
                }
            }

            return Some(DirListing { path: dir, dirs, files });
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Root discovery
// ---------------------------------------------------------------------------

/// Enumerate the host's top-level volumes.
///
/// Used when a session is started with no configured roots. On Windows
/// every drive letter is probed for existence; elsewhere the filesystem
/// has a single root.
pub fn discover_roots() -> Vec<PathBuf> {
    #[cfg(windows)]
    {
        (b'A'..=b'Z')
            .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
            .filter(|p| p.is_dir())
            .collect()
    }
    #[cfg(not(windows))]
    {
        vec![PathBuf::from("/")]
    }
}

/// True if any segment of `path` is a version-control metadata directory.
pub(crate) fn has_vcs_segment(path: &Path) -> bool {
    path.iter()
        .any(|seg| VCS_DIR_NAMES.contains(&seg.to_string_lossy().as_ref()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
