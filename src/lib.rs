//! # seekr
//!
//! Cancellable background file search: match file names and decoded text
//! contents against a keyword, filter by file type, and collect sortable
//! metadata for every hit.
//!
//! A search runs in three stages on its own thread:
//!
//! 1. the [`Walker`] enumerates every file below the root,
//! 2. a [`Matcher`] (normally [`KeywordMatcher`]) decides whether a file matches,
//! 3. a [`Collector`] keeps the resulting [`FileRecord`]s in discovery order.
//!
//! The caller never blocks on the filesystem. It polls a [`SessionHandle`]
//! with [`snapshot()`](SessionHandle::snapshot), or waits with
//! [`wait()`](SessionHandle::wait).
//!
//! # Quick Start
//!
//! ```rust
//! use seekr::{Engine, MatchReason, SessionStatus, SortColumn, SortDirection, TypeFilter};
//!
//! let dir = std::env::temp_dir().join(format!("seekr-doc-{}", std::process::id()));
//! std::fs::create_dir_all(&dir).unwrap();
//! std::fs::write(dir.join("report.txt"), "hello world").unwrap();
//! std::fs::write(dir.join("photo.jpg"), "hello").unwrap();
//!
//! let engine = Engine::new();
//! let handle = seekr::search(&dir, "HELLO")
//!     .filenames(false)
//!     .content(true)
//!     .file_type(TypeFilter::Text)
//!     .start(&engine)
//!     .unwrap();
//!
//! assert_eq!(handle.wait(), SessionStatus::Completed);
//! handle.sort(SortColumn::Name, SortDirection::Ascending);
//!
//! let snap = handle.snapshot();
//! assert_eq!(snap.records.len(), 1);
//! assert_eq!(snap.records[0].name, "report.txt");
//! assert_eq!(snap.records[0].reason, MatchReason::ContentMatch);
//! assert_eq!(snap.scanned(), 2);
//! # std::fs::remove_dir_all(&dir).unwrap();
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (session start and finish at `info`,
//! skipped entries at `debug`, individual matches at `trace`). Install any
//! subscriber to see them.

#![forbid(unsafe_code)]

mod builder;
mod collector;
mod decode;
mod engine;
mod error;
mod filter;
mod matcher;
mod record;
mod request;
mod traits;
mod walker;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SearchBuilder;
pub use collector::{Collector, ScanStats, SessionStatus, Snapshot, SortColumn, SortDirection};
pub use decode::{decode_text, TextEncoding};
pub use engine::{Engine, SessionHandle};
pub use error::SearchError;
pub use filter::{is_text_extension, TypeFilter};
pub use matcher::KeywordMatcher;
pub use record::{format_size, format_time, FileProperties, FileRecord, MatchReason, UNKNOWN};
pub use request::{SearchFlags, SearchRequest};
pub use traits::Matcher;
pub use walker::Walker;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Start configuring a search for `keyword` below `root`.
///
/// # Example
///
/// ```rust
/// use seekr::TypeFilter;
///
/// let request = seekr::search("/var/log", "error")
///     .content(true)
///     .file_type(TypeFilter::Text)
///     .build();
///
/// assert!(request.flags.match_filenames);
/// assert!(request.flags.match_content);
/// ```
pub fn search(root: impl Into<std::path::PathBuf>, keyword: impl Into<String>) -> SearchBuilder {
    SearchBuilder::new(root.into(), keyword.into())
}
