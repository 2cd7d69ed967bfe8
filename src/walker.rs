use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use ignore::{Walk, WalkBuilder};
use tracing::debug;

use crate::error::SearchError;

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// Depth-first enumeration of every regular file beneath a root.
///
/// Behaves like a plain recursive listing: hidden files are included and ignore
/// files are not honoured. Symlinked directories are not descended into, but a
/// symlink whose target is a regular file is yielded like a file. Siblings are
/// visited in file-name order so a fixed tree always yields the same sequence.
///
/// Yields `Err` for entries that could not be read. Errors below the root are
/// recoverable and the walk carries on past them; an error on the root itself
/// is reported as [`SearchError::Walk`].
///
/// The walker stops, without error, as soon as `cancel` is observed.
pub struct Walker<'a> {
    inner:  Walk,
    cancel: &'a AtomicBool,
    dirs:   usize,
    done:   bool,
}

impl<'a> Walker<'a> {
    pub fn new(root: &Path, max_depth: Option<usize>, cancel: &'a AtomicBool) -> Self {
        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .same_file_system(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        if let Some(depth) = max_depth {
            builder.max_depth(Some(depth));
        }

        Self {
            inner: builder.build(),
            cancel,
            dirs: 0,
            done: false,
        }
    }

    /// Directories entered so far, the root excluded.
    pub fn dirs_visited(&self) -> usize {
        self.dirs
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

impl Iterator for Walker<'_> {
    type Item = Result<PathBuf, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.cancelled() {
                self.done = true;
                return None;
            }

            let entry = match self.inner.next()? {
                Ok(e) => e,
                Err(e) => {
                    if e.depth() == Some(0) {
                        self.done = true;
                        return Some(Err(SearchError::Walk(e.to_string())));
                    }
                    let err = map_ignore_error(e);
                    debug!(error = %err, "skipping unreadable entry");
                    return Some(Err(err));
                }
            };

            let Some(ft) = entry.file_type() else {
                continue;
            };

            if ft.is_dir() {
                if entry.depth() > 0 {
                    self.dirs += 1;
                }
                continue;
            }

            if ft.is_file() || (ft.is_symlink() && points_to_file(entry.path())) {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}

/// A symlink counts as a file when its target is one. Dangling links and
/// links to directories do not.
fn points_to_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Map ignore::Error to SearchError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> SearchError {
    match e {
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => SearchError::from_io(path, io_err),
            ignore::Error::Loop { child, .. } => SearchError::SymlinkLoop(child),
            other => SearchError::Io {
                path,
                source: std::io::Error::other(other.to_string()),
            },
        },
        ignore::Error::Loop { child, .. } => SearchError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => SearchError::from_io(PathBuf::new(), io_err),
        other => SearchError::Io {
            path:   PathBuf::new(),
            source: std::io::Error::other(other.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join(".hidden"), "h").unwrap();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("sub/c.md"), "c").unwrap();
        fs::write(root.join("sub/deeper/d.log"), "d").unwrap();
        dir
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn yields_every_file_in_stable_order() {
        let dir = tree();
        let cancel = AtomicBool::new(false);

        let first: Vec<PathBuf> = Walker::new(dir.path(), None, &cancel)
            .filter_map(Result::ok)
            .collect();
        let second: Vec<PathBuf> = Walker::new(dir.path(), None, &cancel)
            .filter_map(Result::ok)
            .collect();

        assert_eq!(first, second);
        assert_eq!(names(&first), vec![".hidden", "a.txt", "b.txt", "c.md", "d.log"]);
    }

    #[test]
    fn counts_directories_below_root() {
        let dir = tree();
        let cancel = AtomicBool::new(false);
        let mut walker = Walker::new(dir.path(), None, &cancel);
        while walker.next().is_some() {}
        assert_eq!(walker.dirs_visited(), 2);
    }

    #[test]
    fn max_depth_limits_descent() {
        let dir = tree();
        let cancel = AtomicBool::new(false);
        let found: Vec<PathBuf> = Walker::new(dir.path(), Some(1), &cancel)
            .filter_map(Result::ok)
            .collect();
        assert_eq!(names(&found), vec![".hidden", "a.txt", "b.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_yielded_but_not_linked_dirs() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("real_target.dat"), "x").unwrap();
        symlink(root.join("real_target.dat"), root.join("link_report.txt")).unwrap();
        symlink(root.join("missing.dat"), root.join("dangling.txt")).unwrap();
        fs::create_dir(root.join("inner")).unwrap();
        fs::write(root.join("inner/deep.txt"), "d").unwrap();
        symlink(root.join("inner"), root.join("zz_linked_dir")).unwrap();

        let cancel = AtomicBool::new(false);
        let found: Vec<PathBuf> = Walker::new(root, None, &cancel)
            .filter_map(Result::ok)
            .collect();

        assert_eq!(names(&found), vec!["deep.txt", "link_report.txt", "real_target.dat"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_reported_and_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tree();
        let locked = dir.path().join("sub");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running with privileges that ignore permissions.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let cancel = AtomicBool::new(false);
        let items: Vec<_> = Walker::new(dir.path(), None, &cancel).collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let errors: Vec<&SearchError> = items.iter().filter_map(|i| i.as_ref().err()).collect();
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.is_recoverable()));

        let found: Vec<PathBuf> = items.into_iter().filter_map(Result::ok).collect();
        assert_eq!(names(&found), vec![".hidden", "a.txt", "b.txt"]);
    }

    #[test]
    fn stops_once_cancelled() {
        let dir = tree();
        let cancel = AtomicBool::new(false);
        let mut walker = Walker::new(dir.path(), None, &cancel);

        assert!(walker.next().is_some());
        cancel.store(true, Ordering::Release);
        assert!(walker.next().is_none());
        cancel.store(false, Ordering::Release);
        assert!(walker.next().is_none(), "walker stays finished");
    }
}
