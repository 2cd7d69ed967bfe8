use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use crate::collector::{Collector, ScanStats, SessionStatus, Snapshot, SortColumn, SortDirection};
use crate::error::SearchError;
use crate::matcher::KeywordMatcher;
use crate::record::FileRecord;
use crate::request::SearchRequest;
use crate::traits::Matcher;
use crate::walker::Walker;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs at most one search at a time, each on its own background thread.
///
/// Starting a search cancels the previous one before the new walk begins, so
/// results of two sessions never mix. All calls return without waiting on the
/// filesystem; progress is read through the returned [`SessionHandle`].
#[derive(Default)]
pub struct Engine {
    current: Mutex<Option<SessionHandle>>,
    next_id: AtomicU64,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `request` and start searching in the background.
    ///
    /// # Errors
    ///
    /// Request errors ([`SearchError::EmptyKeyword`], [`SearchError::RootNotFound`],
    /// [`SearchError::NotADirectory`]) leave any running session untouched.
    /// [`SearchError::Spawn`] if the worker thread could not be created.
    pub fn start_search(&self, request: SearchRequest) -> Result<SessionHandle, SearchError> {
        self.launch(request, |cancel, req| {
            Box::new(KeywordMatcher::new(req).with_cancel(cancel))
        })
    }

    /// Like [`start_search`](Engine::start_search) but deciding matches with
    /// a caller-supplied [`Matcher`]. The request still provides the root,
    /// depth limit and validation.
    pub fn start_with(
        &self,
        request: SearchRequest,
        matcher: impl Matcher + 'static,
    ) -> Result<SessionHandle, SearchError> {
        self.launch(request, move |_, _| Box::new(matcher))
    }

    /// The most recently started session, if any.
    pub fn current(&self) -> Option<SessionHandle> {
        self.lock_current().clone()
    }

    /// Cancel the most recently started session, if any.
    pub fn cancel_current(&self) {
        if let Some(handle) = self.lock_current().as_ref() {
            handle.cancel();
        }
    }

    fn launch<F>(&self, request: SearchRequest, make_matcher: F) -> Result<SessionHandle, SearchError>
    where
        F: FnOnce(Arc<AtomicBool>, &SearchRequest) -> Box<dyn Matcher>,
    {
        request.validate()?;

        let mut current = self.lock_current();
        if let Some(previous) = current.take() {
            previous.cancel();
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let shared = Arc::new(Shared::new(id, request));
        let matcher = make_matcher(Arc::clone(&shared.cancel), &shared.request);

        let worker = Arc::clone(&shared);
        thread::Builder::new()
            .name(format!("seekr-session-{id}"))
            .spawn(move || run_session(&worker, matcher.as_ref()))
            .map_err(SearchError::Spawn)?;

        let req = &shared.request;
        info!(
            session = id,
            root = %req.root.display(),
            filenames = req.flags.match_filenames,
            content = req.flags.match_content,
            case_sensitive = req.flags.case_sensitive,
            file_type = %req.file_type,
            "search started"
        );

        let handle = SessionHandle { shared };
        *current = Some(handle.clone());
        Ok(handle)
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<SessionHandle>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Caller's view of one search session. Cheap to clone; every method is safe
/// to call from any thread while the scan runs.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn request(&self) -> &SearchRequest {
        &self.shared.request
    }

    /// Request cooperative cancellation. Idempotent, and a no-op once the
    /// session has finished.
    ///
    /// No record is appended after this returns; the status becomes
    /// [`SessionStatus::Cancelled`] immediately.
    pub fn cancel(&self) {
        let mut state = self.shared.lock();
        self.shared.cancel.store(true, Ordering::Release);
        if state.status == SessionStatus::Running {
            state.status = SessionStatus::Cancelled;
            state.elapsed = Some(self.shared.started.elapsed());
            state.collector.seal();
            debug!(session = self.shared.id, "cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.load(Ordering::Acquire)
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.lock().status.clone()
    }

    /// Copy of the records in their current order, plus status and counters.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.shared.lock();
        let elapsed = state
            .elapsed
            .unwrap_or_else(|| self.shared.started.elapsed());
        Snapshot {
            records: state.collector.records().to_vec(),
            status:  state.status.clone(),
            stats:   ScanStats::compute(
                self.shared.files.load(Ordering::Relaxed),
                self.shared.dirs.load(Ordering::Relaxed),
                self.shared.skipped.load(Ordering::Relaxed),
                elapsed,
            ),
        }
    }

    /// Stable re-sort of everything collected so far. Matches found later are
    /// appended after the sorted block.
    pub fn sort(&self, column: SortColumn, direction: SortDirection) {
        self.shared.lock().collector.sort_by(column, direction);
    }

    /// Block until the background worker has exited and return the final status.
    pub fn wait(&self) -> SessionStatus {
        let state = self.shared.lock();
        let state = self
            .shared
            .finished
            .wait_while(state, |s| !s.worker_done)
            .unwrap_or_else(PoisonError::into_inner);
        state.status.clone()
    }

    /// Like [`wait`](SessionHandle::wait), giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<SessionStatus> {
        let state = self.shared.lock();
        let (state, _) = self
            .shared
            .finished
            .wait_timeout_while(state, timeout, |s| !s.worker_done)
            .unwrap_or_else(PoisonError::into_inner);
        state.worker_done.then(|| state.status.clone())
    }
}

// ---------------------------------------------------------------------------
// Shared session state
// ---------------------------------------------------------------------------

struct State {
    collector:   Collector,
    status:      SessionStatus,
    /// Frozen once the session leaves `Running`.
    elapsed:     Option<Duration>,
    worker_done: bool,
}

struct Shared {
    id:       u64,
    request:  SearchRequest,
    state:    Mutex<State>,
    finished: Condvar,
    cancel:   Arc<AtomicBool>,
    files:    AtomicUsize,
    dirs:     AtomicUsize,
    skipped:  AtomicUsize,
    started:  Instant,
}

impl Shared {
    fn new(id: u64, request: SearchRequest) -> Self {
        Self {
            id,
            request,
            state: Mutex::new(State {
                collector:   Collector::new(),
                status:      SessionStatus::Running,
                elapsed:     None,
                worker_done: false,
            }),
            finished: Condvar::new(),
            cancel:   Arc::new(AtomicBool::new(false)),
            files:    AtomicUsize::new(0),
            dirs:     AtomicUsize::new(0),
            skipped:  AtomicUsize::new(0),
            started:  Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Publish a finished record. The cancel flag is re-checked under the lock
    /// so nothing lands after `SessionHandle::cancel` returns.
    fn append(&self, record: FileRecord) -> bool {
        let mut state = self.lock();
        if self.is_cancelled() {
            return false;
        }
        state.collector.append(record)
    }

    /// Walk, match and collect until the walk ends or cancellation is seen.
    fn drive(&self, matcher: &dyn Matcher) -> Result<(), SearchError> {
        let mut walker = Walker::new(&self.request.root, self.request.max_depth, &self.cancel);
        let mut seq = 0;

        while let Some(item) = walker.next() {
            self.dirs.store(walker.dirs_visited(), Ordering::Relaxed);

            let path = match item {
                Ok(p) => p,
                Err(e) if e.is_recoverable() => {
                    self.skipped.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.is_cancelled() {
                break;
            }
            self.files.fetch_add(1, Ordering::Relaxed);

            let Some(reason) = matcher.matches(&path) else {
                continue;
            };

            // Metadata is read outside the lock.
            let record = FileRecord::build(path, reason, seq);
            trace!(session = self.id, path = %record.path.display(), %reason, "match");
            if !self.append(record) {
                break;
            }
            seq += 1;
        }

        self.dirs.store(walker.dirs_visited(), Ordering::Relaxed);
        Ok(())
    }

    /// Leave `Running` (unless `cancel` already did) and wake waiters.
    fn finish(&self, status: SessionStatus) {
        let mut state = self.lock();
        if state.status == SessionStatus::Running {
            state.status = status;
            state.elapsed = Some(self.started.elapsed());
        }
        state.collector.seal();
        state.worker_done = true;

        info!(
            session = self.id,
            status = %state.status,
            files = self.files.load(Ordering::Relaxed),
            matches = state.collector.len(),
            elapsed_ms = state.elapsed.unwrap_or_default().as_millis() as u64,
            "search finished"
        );
        drop(state);
        self.finished.notify_all();
    }
}

/// Body of the background thread.
fn run_session(shared: &Shared, matcher: &dyn Matcher) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| shared.drive(matcher)));
    let status = match outcome {
        Ok(Ok(())) if shared.is_cancelled() => SessionStatus::Cancelled,
        Ok(Ok(())) => SessionStatus::Completed,
        Ok(Err(e)) => SessionStatus::Failed(e.to_string()),
        Err(_) => SessionStatus::Failed(SearchError::WorkerPanicked.to_string()),
    };
    shared.finish(status);
}
