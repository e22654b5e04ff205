use std::path::{Path, PathBuf};

/// One match found during a search.
///
/// Exactly one variant per match; a single directory visit may produce zero
/// or many of these (one per target, per match kind). Results are streamed
/// to the consumer's callback as they are found, so there is no aggregate
/// results container — accumulate on the consumer side if needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchResult {
    /// A target occurred in a directory's path.
    Directory(PathBuf),

    /// A target occurred in a file's name.
    FileName(PathBuf),

    /// A target occurred in a file's decoded text content.
    Content(PathBuf),
}

impl MatchResult {
    /// The path this match was found at.
    /// Callers use this to present results without pattern matching on variants.
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(p) | Self::FileName(p) | Self::Content(p) => p,
        }
    }
}
