use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::error::SearchError;

/// Shown in place of a size or time that could not be read.
pub const UNKNOWN: &str = "unknown";

/// Why a file was included in the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchReason {
    /// The keyword occurs in the base file name.
    NameMatch,
    /// The keyword occurs in the decoded file content.
    ContentMatch,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchReason::NameMatch => "name match",
            MatchReason::ContentMatch => "content match",
        })
    }
}

/// One matched file.
///
/// Built once, right after the match is confirmed, and never modified. Sorting
/// only reorders records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub path: PathBuf,
    /// Byte count; `None` when metadata could not be read.
    pub size: Option<u64>,
    /// `size` for display, e.g. `"512 B"` or `"1.5 MB"`.
    pub size_display: String,
    pub modified: Option<SystemTime>,
    /// `modified` as local `YYYY-MM-DD HH:MM`.
    pub modified_display: String,
    /// Uppercase extension without the dot; empty when there is none.
    pub extension: String,
    pub reason: MatchReason,
    /// Position in discovery order within its session.
    pub seq: usize,
}

impl FileRecord {
    /// Stat `path` and build its record. Metadata failures yield a record with
    /// unknown size and time rather than no record.
    pub(crate) fn build(path: PathBuf, reason: MatchReason, seq: usize) -> Self {
        let meta = std::fs::metadata(&path).ok();
        Self::from_metadata(path, reason, seq, meta.as_ref())
    }

    pub(crate) fn from_metadata(
        path: PathBuf,
        reason: MatchReason,
        seq: usize,
        meta: Option<&Metadata>,
    ) -> Self {
        let size = meta.map(Metadata::len);
        let modified = meta.and_then(|m| m.modified().ok());

        Self {
            name: file_name(&path),
            extension: path
                .extension()
                .map(|e| e.to_string_lossy().to_uppercase())
                .unwrap_or_default(),
            size_display: size.map_or_else(|| UNKNOWN.to_string(), format_size),
            modified_display: modified.map_or_else(|| UNKNOWN.to_string(), format_time),
            size,
            modified,
            path,
            reason,
            seq,
        }
    }

    /// Re-read metadata for the full property sheet of this file.
    ///
    /// # Errors
    ///
    /// Returns a per-file error if the file is gone or unreadable.
    pub fn properties(&self) -> Result<FileProperties, SearchError> {
        let meta = std::fs::metadata(&self.path)
            .map_err(|e| SearchError::from_io(self.path.clone(), e))?;
        Ok(FileProperties {
            name:      self.name.clone(),
            path:      self.path.clone(),
            size:      format_size(meta.len()),
            modified:  meta.modified().map_or_else(|_| UNKNOWN.to_string(), format_time),
            created:   meta.created().map_or_else(|_| UNKNOWN.to_string(), format_time),
            accessed:  meta.accessed().map_or_else(|_| UNKNOWN.to_string(), format_time),
            extension: self.extension.clone(),
        })
    }
}

/// Display-ready properties of a matched file, read fresh from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProperties {
    pub name:      String,
    pub path:      PathBuf,
    pub size:      String,
    pub modified:  String,
    pub created:   String,
    pub accessed:  String,
    pub extension: String,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Human-readable size: bytes below 1 KB, otherwise one decimal in KB, MB or GB.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.1} GB", b / GB)
    } else if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_time(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_pick_unit_by_magnitude() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024 / 2), "1.5 GB");
    }

    #[test]
    fn time_format_is_minute_precision() {
        let s = format_time(SystemTime::now());
        assert_eq!(s.len(), "2024-01-01 12:00".len());
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], " ");
    }

    #[test]
    fn record_from_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.Md");
        std::fs::write(&path, vec![b'x'; 2048]).unwrap();

        let rec = FileRecord::build(path.clone(), MatchReason::NameMatch, 7);
        assert_eq!(rec.name, "notes.Md");
        assert_eq!(rec.path, path);
        assert_eq!(rec.size, Some(2048));
        assert_eq!(rec.size_display, "2.0 KB");
        assert!(rec.modified.is_some());
        assert_ne!(rec.modified_display, UNKNOWN);
        assert_eq!(rec.extension, "MD");
        assert_eq!(rec.seq, 7);
    }

    #[test]
    fn vanished_file_still_yields_a_record() {
        let rec = FileRecord::build("/no/such/dir/gone.txt".into(), MatchReason::ContentMatch, 0);
        assert_eq!(rec.name, "gone.txt");
        assert_eq!(rec.size, None);
        assert_eq!(rec.size_display, UNKNOWN);
        assert_eq!(rec.modified, None);
        assert_eq!(rec.modified_display, UNKNOWN);
        assert_eq!(rec.extension, "TXT");
        assert!(rec.properties().is_err());
    }

    #[test]
    fn extensionless_file_has_empty_type() {
        let rec = FileRecord::from_metadata("/x/Makefile".into(), MatchReason::NameMatch, 0, None);
        assert_eq!(rec.extension, "");
    }

    #[test]
    fn properties_reread_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "abc").unwrap();

        let rec = FileRecord::build(path, MatchReason::NameMatch, 0);
        let props = rec.properties().unwrap();
        assert_eq!(props.size, "3 B");
        assert_eq!(props.extension, "TXT");
        assert_ne!(props.modified, UNKNOWN);
    }
}
