use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use crate::record::FileRecord;

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// Lifecycle of one search session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Walking and accepting new matches.
    Running,
    /// The walk finished normally.
    Completed,
    /// Stopped on request. A normal outcome, not an error.
    Cancelled,
    /// Stopped by an unrecoverable error.
    Failed(String),
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Running => f.write_str("running"),
            SessionStatus::Completed => f.write_str("completed"),
            SessionStatus::Cancelled => f.write_str("cancelled"),
            SessionStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// A result column that records can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    /// Full path compared as a string, not component by component.
    Path,
    /// Raw byte count; unknown sizes sort as zero.
    Size,
    /// Raw timestamp; unknown times sort before every known time.
    Modified,
    /// Uppercase extension.
    Type,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

fn compare(column: SortColumn, a: &FileRecord, b: &FileRecord) -> Ordering {
    match column {
        SortColumn::Name => a.name.cmp(&b.name),
        SortColumn::Path => a.path.as_os_str().cmp(b.path.as_os_str()),
        SortColumn::Size => a.size.unwrap_or(0).cmp(&b.size.unwrap_or(0)),
        SortColumn::Modified => a.modified.cmp(&b.modified),
        SortColumn::Type => a.extension.cmp(&b.extension),
    }
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Ordered accumulation of one session's matches.
///
/// Discovery order is the default order. Once sealed, the collector rejects
/// further appends but can still be re-sorted.
#[derive(Debug, Default)]
pub struct Collector {
    records: Vec<FileRecord>,
    sealed:  bool,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the end. Returns `false` (and drops it) once sealed.
    pub fn append(&mut self, record: FileRecord) -> bool {
        if self.sealed {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Stable re-sort of every record.
    ///
    /// Ties are broken by discovery order (`FileRecord::seq`) in both
    /// directions, regardless of any earlier sort.
    pub fn sort_by(&mut self, column: SortColumn, direction: SortDirection) {
        self.records.sort_by(|a, b| {
            let ord = compare(column, a, b);
            let ord = match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            };
            ord.then_with(|| a.seq.cmp(&b.seq))
        });
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time copy of a session, safe to hold while the scan continues.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Matches in the session's current order.
    pub records: Vec<FileRecord>,
    pub status:  SessionStatus,
    pub stats:   ScanStats,
}

impl Snapshot {
    /// Files enumerated so far, matched or not.
    pub fn scanned(&self) -> usize {
        self.stats.files
    }
}

/// Progress counters for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Files enumerated (matched or not).
    pub files: usize,

    /// Directories entered below the root.
    pub dirs: usize,

    /// Entries skipped because they could not be read.
    pub skipped: usize,

    /// Time since the session started, or its total run time once finished.
    pub duration: Duration,

    /// Files scanned per second, 0 on zero-duration runs.
    pub files_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(files: usize, dirs: usize, skipped: usize, duration: Duration) -> Self {
        let fps = if duration.as_secs_f64() > 0.0 {
            (files as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            files,
            dirs,
            skipped,
            duration,
            files_per_sec: fps,
        }
    }
}
