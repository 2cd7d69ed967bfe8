use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::decode::{decode_text, looks_binary};
use crate::error::SearchError;
use crate::filter::{extension_lower, is_text_extension, TypeFilter};
use crate::record::MatchReason;
use crate::request::{SearchFlags, SearchRequest};
use crate::traits::Matcher;

/// Keyword matcher for a [`SearchRequest`].
///
/// Checks run cheapest first and short-circuit:
/// 1. type filter on the extension (no I/O),
/// 2. substring test on the base file name,
/// 3. substring test on the decoded content of text-like files.
pub struct KeywordMatcher {
    /// Already lowercased when the search is case-insensitive.
    needle:    String,
    flags:     SearchFlags,
    file_type: TypeFilter,
    cancel:    Option<Arc<AtomicBool>>,
}

impl KeywordMatcher {
    pub fn new(request: &SearchRequest) -> Self {
        let keyword = request.keyword();
        let needle = if request.flags.case_sensitive {
            keyword.to_string()
        } else {
            keyword.to_lowercase()
        };
        Self {
            needle,
            flags: request.flags,
            file_type: request.file_type,
            cancel: None,
        }
    }

    /// Skip content reads once `cancel` is set.
    pub(crate) fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn contains(&self, haystack: &str) -> bool {
        if self.flags.case_sensitive {
            haystack.contains(&self.needle)
        } else {
            haystack.to_lowercase().contains(&self.needle)
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Acquire))
    }

    fn content_matches(&self, path: &Path) -> Result<bool, SearchError> {
        let bytes = std::fs::read(path).map_err(|e| SearchError::from_io(path.to_path_buf(), e))?;
        if looks_binary(&bytes) {
            return Err(SearchError::Binary(path.to_path_buf()));
        }
        let (text, encoding) = decode_text(&bytes);
        trace!(path = %path.display(), ?encoding, "decoded");
        Ok(self.contains(&text))
    }
}

impl Matcher for KeywordMatcher {
    fn matches(&self, path: &Path) -> Option<MatchReason> {
        let ext = extension_lower(path);
        if !self.file_type.accepts(&ext) {
            return None;
        }

        if self.flags.match_filenames {
            let name = path.file_name()?.to_string_lossy();
            if self.contains(&name) {
                return Some(MatchReason::NameMatch);
            }
        }

        if !self.flags.match_content || !is_text_extension(&ext) || self.cancelled() {
            return None;
        }

        match self.content_matches(path) {
            Ok(true) => Some(MatchReason::ContentMatch),
            Ok(false) => None,
            Err(e) => {
                debug!(error = %e, "content not searchable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn request(root: &Path, keyword: &str, flags: SearchFlags, file_type: TypeFilter) -> SearchRequest {
        SearchRequest {
            root: root.to_path_buf(),
            keyword: keyword.to_string(),
            flags,
            file_type,
            max_depth: None,
        }
    }

    fn names_only(case_sensitive: bool) -> SearchFlags {
        SearchFlags { match_filenames: true, match_content: false, case_sensitive }
    }

    fn content_only() -> SearchFlags {
        SearchFlags { match_filenames: false, match_content: true, case_sensitive: false }
    }

    #[test]
    fn name_match_ignores_case_by_default() {
        let m = KeywordMatcher::new(&request(Path::new("/"), "Invoice", names_only(false), TypeFilter::All));
        assert_eq!(m.matches(Path::new("/x/INVOICE_jan.pdf")), Some(MatchReason::NameMatch));
        assert_eq!(m.matches(Path::new("/x/report.pdf")), None);
    }

    #[test]
    fn case_sensitive_name_match() {
        let m = KeywordMatcher::new(&request(Path::new("/"), "Invoice", names_only(true), TypeFilter::All));
        assert_eq!(m.matches(Path::new("/x/Invoice.txt")), Some(MatchReason::NameMatch));
        assert_eq!(m.matches(Path::new("/x/invoice.txt")), None);
    }

    #[test]
    fn only_base_name_is_tested() {
        let m = KeywordMatcher::new(&request(Path::new("/"), "secret", names_only(false), TypeFilter::All));
        assert_eq!(m.matches(Path::new("/secret/plain.txt")), None);
    }

    #[test]
    fn type_filter_rejects_before_name_test() {
        let m = KeywordMatcher::new(&request(Path::new("/"), "photo", names_only(false), TypeFilter::Text));
        assert_eq!(m.matches(Path::new("/x/photo.jpg")), None);
        assert_eq!(m.matches(Path::new("/x/photo.TXT")), Some(MatchReason::NameMatch));
    }

    #[test]
    fn name_match_wins_without_reading_content() {
        // The file does not exist: a content read would fail.
        let flags = SearchFlags { match_filenames: true, match_content: true, case_sensitive: false };
        let m = KeywordMatcher::new(&request(Path::new("/"), "ghost", flags, TypeFilter::All));
        assert_eq!(m.matches(Path::new("/no/such/ghost.txt")), Some(MatchReason::NameMatch));
    }

    #[test]
    fn content_match_on_text_files() {
        let dir = tempfile::tempdir().unwrap();
        let hit = dir.path().join("a.log");
        let miss = dir.path().join("b.log");
        fs::write(&hit, "line one\nERROR: disk full\n").unwrap();
        fs::write(&miss, "all good\n").unwrap();

        let m = KeywordMatcher::new(&request(dir.path(), "error", content_only(), TypeFilter::All));
        assert_eq!(m.matches(&hit), Some(MatchReason::ContentMatch));
        assert_eq!(m.matches(&miss), None);
    }

    #[test]
    fn content_of_non_text_extension_is_never_read() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("blob.dat");
        fs::write(&bin, "needle").unwrap();

        let m = KeywordMatcher::new(&request(dir.path(), "needle", content_only(), TypeFilter::All));
        assert_eq!(m.matches(&bin), None);
    }

    #[test]
    fn binary_content_under_text_extension_does_not_match() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("weird.txt");
        fs::write(&f, b"needle\0\x01\x02").unwrap();

        let m = KeywordMatcher::new(&request(dir.path(), "needle", content_only(), TypeFilter::All));
        assert_eq!(m.matches(&f), None);
    }

    #[test]
    fn unreadable_file_is_a_non_match() {
        let m = KeywordMatcher::new(&request(Path::new("/"), "x", content_only(), TypeFilter::All));
        assert_eq!(m.matches(Path::new("/definitely/missing/file.txt")), None);
    }

    #[test]
    fn no_targets_matches_nothing() {
        let flags = SearchFlags { match_filenames: false, match_content: false, case_sensitive: false };
        let m = KeywordMatcher::new(&request(Path::new("/"), "a", flags, TypeFilter::All));
        assert_eq!(m.matches(Path::new("/x/a.txt")), None);
    }

    #[test]
    fn cancelled_matcher_skips_content() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("a.txt");
        fs::write(&f, "needle").unwrap();

        let cancel = Arc::new(AtomicBool::new(true));
        let m = KeywordMatcher::new(&request(dir.path(), "needle", content_only(), TypeFilter::All))
            .with_cancel(cancel);
        assert_eq!(m.matches(&f), None);
    }
}
