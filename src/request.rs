use std::path::{Path, PathBuf};

use crate::error::SearchError;
use crate::filter::TypeFilter;

/// Which parts of a file the keyword is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFlags {
    pub match_filenames: bool,
    pub match_content:   bool,
    pub case_sensitive:  bool,
}

impl Default for SearchFlags {
    fn default() -> Self {
        Self {
            match_filenames: true,
            match_content:   false,
            case_sensitive:  false,
        }
    }
}

/// An immutable description of one search.
///
/// Build one with [`seekr::search()`](crate::search) or construct it directly.
/// A request with both `match_filenames` and `match_content` off is valid but
/// finds nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub root:      PathBuf,
    pub keyword:   String,
    pub flags:     SearchFlags,
    pub file_type: TypeFilter,
    /// Maximum traversal depth below the root. Unlimited when `None`.
    pub max_depth: Option<usize>,
}

impl SearchRequest {
    pub fn new(root: impl Into<PathBuf>, keyword: impl Into<String>) -> Self {
        Self {
            root:      root.into(),
            keyword:   keyword.into(),
            flags:     SearchFlags::default(),
            file_type: TypeFilter::All,
            max_depth: None,
        }
    }

    /// The keyword with surrounding whitespace removed.
    pub fn keyword(&self) -> &str {
        self.keyword.trim()
    }

    /// Check the request before any session is created.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyKeyword`] for a blank keyword,
    /// [`SearchError::RootNotFound`] / [`SearchError::NotADirectory`] for a bad root.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.keyword().is_empty() {
            return Err(SearchError::EmptyKeyword);
        }
        check_root(&self.root)
    }
}

fn check_root(root: &Path) -> Result<(), SearchError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(SearchError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SearchError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => Err(SearchError::from_io(root.to_path_buf(), e)),
    }
}
