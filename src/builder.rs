use std::path::PathBuf;

use crate::engine::{Engine, SessionHandle};
use crate::error::SearchError;
use crate::filter::TypeFilter;
use crate::request::{SearchFlags, SearchRequest};

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Fluent configuration for a [`SearchRequest`].
///
/// Created via [`seekr::search()`](crate::search). Defaults mirror a plain
/// "find by name" search: filenames on, content off, case-insensitive, every
/// file type, unlimited depth.
///
/// # Example
///
/// ```rust
/// use seekr::{Engine, SearchError, TypeFilter};
///
/// fn main() -> Result<(), SearchError> {
///     let engine = Engine::new();
///     let handle = seekr::search(std::env::temp_dir(), "invoice")
///         .content(true)
///         .file_type(TypeFilter::Text)
///         .max_depth(1)
///         .start(&engine)?;
///
///     handle.cancel();
///     assert!(handle.wait().is_terminal());
///     Ok(())
/// }
/// ```
pub struct SearchBuilder {
    root:      PathBuf,
    keyword:   String,
    flags:     SearchFlags,
    file_type: TypeFilter,
    max_depth: Option<usize>,
}

impl SearchBuilder {
    pub(crate) fn new(root: PathBuf, keyword: String) -> Self {
        Self {
            root,
            keyword,
            flags:     SearchFlags::default(),
            file_type: TypeFilter::All,
            max_depth: None,
        }
    }

    // ── Match targets ─────────────────────────────────────────────────────

    /// Test the keyword against base file names.
    pub fn filenames(mut self, yes: bool) -> Self {
        self.flags.match_filenames = yes;
        self
    }

    /// Test the keyword against decoded contents of text-like files.
    ///
    /// Only attempted when the name test did not already match.
    pub fn content(mut self, yes: bool) -> Self {
        self.flags.match_content = yes;
        self
    }

    /// Compare names and contents case-sensitively. Off by default.
    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.flags.case_sensitive = yes;
        self
    }

    // ── Filters ───────────────────────────────────────────────────────────

    /// Restrict candidates to one extension category.
    pub fn file_type(mut self, filter: TypeFilter) -> Self {
        self.file_type = filter;
        self
    }

    /// Maximum traversal depth. `1` means direct children of the root only.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.max_depth = Some(d);
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    pub fn build(self) -> SearchRequest {
        SearchRequest {
            root:      self.root,
            keyword:   self.keyword,
            flags:     self.flags,
            file_type: self.file_type,
            max_depth: self.max_depth,
        }
    }

    /// Start the search on `engine`, superseding whatever it was running.
    ///
    /// # Errors
    ///
    /// Request errors (blank keyword, missing root) and a failure to spawn the
    /// background worker. Per-file problems never surface here.
    pub fn start(self, engine: &Engine) -> Result<SessionHandle, SearchError> {
        engine.start_search(self.build())
    }
}
