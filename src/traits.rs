use std::path::Path;

use crate::record::MatchReason;

/// Decides whether one enumerated file belongs in the result set.
///
/// The engine calls this from its background thread for every file the walker
/// yields, so implementations may block on file I/O. They must not fail: any
/// problem reading a file means "no match".
///
/// [`KeywordMatcher`](crate::KeywordMatcher) is the implementation the engine
/// uses for a [`SearchRequest`](crate::SearchRequest).
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use seekr::{Matcher, MatchReason};
///
/// struct ExtensionMatcher(&'static str);
///
/// impl Matcher for ExtensionMatcher {
///     fn matches(&self, path: &Path) -> Option<MatchReason> {
///         path.extension()
///             .filter(|e| e.eq_ignore_ascii_case(self.0))
///             .map(|_| MatchReason::NameMatch)
///     }
/// }
///
/// assert!(ExtensionMatcher("rs").matches(Path::new("lib.RS")).is_some());
/// ```
pub trait Matcher: Send + Sync {
    /// Returns why `path` matched, or `None`.
    fn matches(&self, path: &Path) -> Option<MatchReason>;
}
