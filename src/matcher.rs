use std::fs;
use std::path::Path;

use tracing::trace;

use crate::criteria::SearchCriteria;
use crate::results::MatchResult;
use crate::walker::{has_vcs_segment, DirListing};

const BYTES_PER_MB: f64 = 1_048_576.0;

// ---------------------------------------------------------------------------
// Pure predicates
// ---------------------------------------------------------------------------

/// True if `needle` occurs anywhere in `haystack`, ignoring case.
///
/// Plain case-folded substring containment; no other normalization.
pub fn matches_substring(haystack: &str, needle: &str) -> bool {
    contains_fold(haystack, &needle.to_lowercase())
}

/// The one containment predicate everything routes through. The needle
/// must already be lower-cased; [`SearchMatcher`] lowers its targets once
/// at construction.
fn contains_fold(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// True if `file_name` ends with any of the configured suffixes, or the
/// suffix set is empty.
///
/// Suffixes are compared exactly as configured; no dot is inserted or
/// stripped on either side.
pub fn accepts_extension(file_name: &str, extensions: &[String]) -> bool {
    extensions.is_empty() || extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
}

/// Size of the file at `path` in megabytes.
///
/// Fails if the path cannot be stat'ed, e.g. it was removed between the
/// directory listing and this call. Callers skip the file on failure
/// rather than propagating.
pub fn file_size_mb(path: &Path) -> std::io::Result<f64> {
    Ok(fs::metadata(path)?.len() as f64 / BYTES_PER_MB)
}

// ---------------------------------------------------------------------------
// SearchMatcher
// ---------------------------------------------------------------------------

/// Evaluates one claimed directory against every target.
///
/// Stateless per call; a single matcher is shared by all workers. Targets
/// are lower-cased once at construction so per-entry work only folds the
/// haystack side.
pub struct SearchMatcher {
    targets:          Vec<String>,
    search_contents:  bool,
    max_file_size_mb: f64,
    extensions:       Vec<String>,
}

impl SearchMatcher {
    pub fn new(criteria: &SearchCriteria) -> Self {
        Self {
            targets:          criteria.targets.iter().map(|t| t.to_lowercase()).collect(),
            search_contents:  criteria.search_contents,
            max_file_size_mb: criteria.max_file_size_mb,
            extensions:       criteria.extensions.clone(),
        }
    }

    /// Run every target over one directory listing, emitting matches into
    /// `emit` as they are found.
    ///
    /// Emission order is fixed per listing: for each target in configured
    /// order, the directory path test first, then each file's name test
    /// and content test in file-name iteration order. Listings under a
    /// version-control metadata segment produce nothing at all.
    ///
    /// Per-file failures (vanished file, unreadable or non-UTF-8 content)
    /// are recovered here: the file is skipped and evaluation continues.
    /// No error escapes this method.
    pub fn search_entry(&self, listing: &DirListing, emit: &mut dyn FnMut(MatchResult)) {
        if has_vcs_segment(&listing.path) {
            return;
        }

        let dir_haystack = listing.path.to_string_lossy();

        for target in &self.targets {
            if contains_fold(&dir_haystack, target) {
                emit(MatchResult::Directory(listing.path.clone()));
            }

            for file_name in &listing.files {
                let full_path = listing.path.join(file_name);

                if contains_fold(file_name, target) {
                    emit(MatchResult::FileName(full_path.clone()));
                }

                if self.search_contents && self.content_contains(&full_path, file_name, target) {
                    emit(MatchResult::Content(full_path));
                }
            }
        }
    }

    /// Content gate and scan for one file: extension filter, then size
    /// ceiling, then read and case-folded containment.
    fn content_contains(&self, path: &Path, file_name: &str, target: &str) -> bool {
        if !accepts_extension(file_name, &self.extensions) {
            return false;
        }

        // A file listed a moment ago may be gone by now; skip it.
        let size_mb = match file_size_mb(path) {
            Ok(mb) => mb,
            Err(_) => return false,
        };
        if size_mb > self.max_file_size_mb {
            return false;
        }

        match fs::read_to_string(path) {
            Ok(text) => contains_fold(&text, target),
            Err(err) => {
                // Binary content or a vanished file, either way not a hit.
                trace!(path = %path.display(), %err, "skipping unscannable file");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn collect(matcher: &SearchMatcher, listing: &DirListing) -> Vec<MatchResult> {
        let mut out = Vec::new();
        matcher.search_entry(listing, &mut |m| out.push(m));
        out
    }

    fn criteria(targets: &[&str]) -> SearchCriteria {
        SearchCriteria::new(targets.iter().copied())
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        assert!(matches_substring("Report2023.TXT", "report"));
        assert!(matches_substring("some/Path/Here", "path"));
        assert!(!matches_substring("Report2023.TXT", "summary"));
    }

    #[test]
    fn engine_folds_case_the_same_way_as_the_contract() {
        let listing = DirListing {
            path:  PathBuf::from("/Data/Reports"),
            dirs:  vec![],
            files: vec!["Summary2023.TXT".into()],
        };
        let matcher = SearchMatcher::new(&criteria(&["REPORT", "summary"]));

        let found = collect(&matcher, &listing);
        assert!(matches_substring("/Data/Reports", "REPORT"));
        assert!(matches_substring("Summary2023.TXT", "summary"));
        assert_eq!(
            found,
            vec![
                MatchResult::Directory(PathBuf::from("/Data/Reports")),
                MatchResult::FileName(PathBuf::from("/Data/Reports/Summary2023.TXT")),
            ]
        );
    }

    #[test]
    fn extension_set_is_raw_suffix_compare() {
        let csv = vec![".csv".to_string()];
        assert!(accepts_extension("data.csv", &csv));
        assert!(!accepts_extension("data.csv.bak", &csv));
        assert!(!accepts_extension("notes.txt", &csv));
        assert!(accepts_extension("anything", &[]));
    }

    #[test]
    fn file_size_mb_fails_for_missing_path() {
        assert!(file_size_mb(Path::new("/no/such/file")).is_err());
    }

    #[test]
    fn directory_and_file_name_matches_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("invoices");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("invoice_jan.txt"), "x").unwrap();
        fs::write(dir.join("report.txt"), "x").unwrap();

        let listing = DirListing {
            path:  dir.clone(),
            dirs:  vec![],
            files: vec!["invoice_jan.txt".into(), "report.txt".into()],
        };
        let matcher = SearchMatcher::new(&criteria(&["invoice"]));

        let found = collect(&matcher, &listing);
        assert_eq!(
            found,
            vec![
                MatchResult::Directory(dir.clone()),
                MatchResult::FileName(dir.join("invoice_jan.txt")),
            ]
        );
    }

    #[test]
    fn content_match_requires_opt_in() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("notes.txt"), "alpha beta").unwrap();
        let listing = DirListing {
            path:  tmp.path().to_path_buf(),
            dirs:  vec![],
            files: vec!["notes.txt".into()],
        };

        let off = SearchMatcher::new(&criteria(&["alpha"]));
        assert!(collect(&off, &listing).is_empty());

        let on = SearchMatcher::new(&criteria(&["alpha"]).search_contents(true));
        assert_eq!(
            collect(&on, &listing),
            vec![MatchResult::Content(tmp.path().join("notes.txt"))]
        );
    }

    #[test]
    fn extension_filter_gates_content_scan() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("notes.txt"), "alpha").unwrap();
        let listing = DirListing {
            path:  tmp.path().to_path_buf(),
            dirs:  vec![],
            files: vec!["notes.txt".into()],
        };

        let matcher = SearchMatcher::new(
            &criteria(&["alpha"]).search_contents(true).extensions([".csv"]),
        );
        assert!(collect(&matcher, &listing).is_empty());
    }

    #[test]
    fn size_ceiling_gates_content_scan() {
        let tmp = tempfile::tempdir().unwrap();
        // ~2 MB of padding around the target.
        let mut body = "alpha ".to_string();
        body.push_str(&"x".repeat(2 * 1024 * 1024));
        fs::write(tmp.path().join("big.txt"), &body).unwrap();
        let listing = DirListing {
            path:  tmp.path().to_path_buf(),
            dirs:  vec![],
            files: vec!["big.txt".into()],
        };

        let matcher = SearchMatcher::new(
            &criteria(&["alpha"]).search_contents(true).max_file_size_mb(1.0),
        );
        assert!(collect(&matcher, &listing).is_empty());
    }

    #[test]
    fn binary_content_is_skipped_but_name_still_matches() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("alpha.bin"), [0xff, 0xfe, 0x00, 0x61]).unwrap();
        let listing = DirListing {
            path:  tmp.path().to_path_buf(),
            dirs:  vec![],
            files: vec!["alpha.bin".into()],
        };

        let matcher = SearchMatcher::new(&criteria(&["alpha"]).search_contents(true));
        assert_eq!(
            collect(&matcher, &listing),
            vec![MatchResult::FileName(tmp.path().join("alpha.bin"))]
        );
    }

    #[test]
    fn vanished_file_is_skipped_silently() {
        let tmp = tempfile::tempdir().unwrap();
        let listing = DirListing {
            path:  tmp.path().to_path_buf(),
            dirs:  vec![],
            files: vec!["gone.txt".into()],
        };

        let matcher = SearchMatcher::new(&criteria(&["gone"]).search_contents(true));
        // Name still matches; content scan finds nothing to read.
        assert_eq!(
            collect(&matcher, &listing),
            vec![MatchResult::FileName(tmp.path().join("gone.txt"))]
        );
    }

    #[test]
    fn vcs_listings_produce_nothing() {
        let listing = DirListing {
            path:  PathBuf::from("/proj/.git"),
            dirs:  vec![],
            files: vec!["proj_notes.txt".into()],
        };
        let matcher = SearchMatcher::new(&criteria(&["proj"]));
        assert!(collect(&matcher, &listing).is_empty());
    }

    #[test]
    fn each_target_is_evaluated_independently() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("reports");
        fs::create_dir(&dir).unwrap();
        let listing = DirListing {
            path:  dir.clone(),
            dirs:  vec![],
            files: vec!["summary_2023.txt".into()],
        };

        let matcher = SearchMatcher::new(&criteria(&["report", "summary"]));
        let found = collect(&matcher, &listing);
        assert_eq!(
            found,
            vec![
                MatchResult::Directory(dir.clone()),
                MatchResult::FileName(dir.join("summary_2023.txt")),
            ]
        );
    }
}
