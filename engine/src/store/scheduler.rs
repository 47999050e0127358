//! Background writes with per-file ordering.
//!
//! Writes to the same path run one at a time in the order they were
//! scheduled; writes to different paths run independently. A write that has
//! not started yet can be cancelled, and cancelling it never lets a later
//! write to the same path overtake an earlier one.
//!
//! Ordering is fixed at schedule time: every write receives the completion
//! signal of the previous write to its path and hands its own signal to the
//! next one.

use super::ThemeStore;
use crate::common::errors::{ThemeError, ThemeResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const PENDING: u8 = 0;
const STARTED: u8 = 1;
const CANCELLED: u8 = 2;

/// Result of [`PendingWrite::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The write will not run.
    Cancelled,
    /// The write is running or done and will complete normally.
    AlreadyStarted,
}

/// Completion signal of the newest write per path, tagged with its write id.
type Tails = HashMap<PathBuf, (u64, oneshot::Receiver<()>)>;

/// Queues writes through a [`ThemeStore`]. Must be used inside a Tokio
/// runtime.
pub struct WriteScheduler {
    store: ThemeStore,
    tails: Arc<Mutex<Tails>>,
    next_id: AtomicU64,
    /// Parent of every write token scheduled since the last `cancel_pending`.
    pending: Mutex<CancellationToken>,
}

impl WriteScheduler {
    pub fn new(store: ThemeStore) -> Self {
        Self {
            store,
            tails: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            pending: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn schedule(&self, path: impl Into<PathBuf>, bytes: Vec<u8>) -> PendingWrite {
        self.schedule_with(path, move |writer| writer.write_all(&bytes))
    }

    /// Queue a streamed write; `write` runs on the blocking pool.
    pub fn schedule_with<F>(&self, path: impl Into<PathBuf>, write: F) -> PendingWrite
    where
        F: FnOnce(&mut BufWriter<File>) -> io::Result<()> + Send + 'static,
    {
        let path = path.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (done, tail) = oneshot::channel::<()>();
        let previous = self
            .tails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.clone(), (id, tail))
            .map(|(_, previous)| previous);

        let state = Arc::new(AtomicU8::new(PENDING));
        let token = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .child_token();
        let store = self.store.clone();

        let tails = Arc::clone(&self.tails);
        let task_state = Arc::clone(&state);
        let task_token = token.clone();
        let task_path = path.clone();
        let handle = tokio::spawn(async move {
            // Held until this task ends; dropping it releases the next write.
            let _done = done;
            let result =
                run_write(previous, task_token, task_state, store, &task_path, write).await;

            // No later write queued behind this one: forget the path.
            let mut tails = tails.lock().unwrap_or_else(PoisonError::into_inner);
            if tails.get(&task_path).is_some_and(|(tail_id, _)| *tail_id == id) {
                tails.remove(&task_path);
            }
            result
        });

        log::debug!("Scheduled write to {}", path.display());
        PendingWrite {
            path,
            state,
            token,
            handle,
        }
    }

    /// Cancel every write that has not started yet. Writes scheduled
    /// afterwards run normally.
    pub fn cancel_pending(&self) {
        let previous = std::mem::replace(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
            CancellationToken::new(),
        );
        previous.cancel();
    }

    /// Paths with a write queued or running.
    pub fn busy_paths(&self) -> usize {
        self.tails.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

async fn run_write<F>(
    previous: Option<oneshot::Receiver<()>>,
    token: CancellationToken,
    state: Arc<AtomicU8>,
    store: ThemeStore,
    path: &Path,
    write: F,
) -> ThemeResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()> + Send + 'static,
{
    if let Some(mut previous) = previous {
        let cancelled_first = tokio::select! {
            biased;
            () = token.cancelled() => true,
            _ = &mut previous => false,
        };
        if cancelled_first {
            let _ = previous.await;
        }
    }

    if token.is_cancelled() {
        let _ = state.compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst);
    }
    if state
        .compare_exchange(PENDING, STARTED, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        log::debug!("Write to {} cancelled", path.display());
        return Err(ThemeError::Cancelled {
            path: path.to_path_buf(),
        });
    }

    let blocking_path = path.to_path_buf();
    tokio::task::spawn_blocking(move || store.write_with(&blocking_path, write))
        .await
        .map_err(|e| ThemeError::io(path, io::Error::other(e)))?
}

/// Handle to one scheduled write.
pub struct PendingWrite {
    path: PathBuf,
    state: Arc<AtomicU8>,
    token: CancellationToken,
    handle: JoinHandle<ThemeResult<()>>,
}

impl PendingWrite {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_started(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STARTED
    }

    pub fn cancel(&self) -> CancelOutcome {
        match self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => {
                self.token.cancel();
                CancelOutcome::Cancelled
            }
            Err(CANCELLED) => CancelOutcome::Cancelled,
            Err(_) => CancelOutcome::AlreadyStarted,
        }
    }

    /// Wait for the write to finish. A cancelled write yields
    /// [`ThemeError::Cancelled`].
    pub async fn wait(self) -> ThemeResult<()> {
        self.handle
            .await
            .map_err(|e| ThemeError::io(&self.path, io::Error::other(e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupManager;
    use claims::{assert_err, assert_ok};
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn scheduler(dir: &TempDir) -> WriteScheduler {
        WriteScheduler::new(ThemeStore::new(BackupManager::new(dir.path().join("backups"), 5)))
    }

    /// A write that signals when it starts and blocks until released.
    fn gated_write(
        scheduler: &WriteScheduler,
        path: &Path,
        bytes: &'static [u8],
    ) -> (PendingWrite, oneshot::Receiver<()>, mpsc::Sender<()>) {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let pending = scheduler.schedule_with(path, move |writer| {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
            writer.write_all(bytes)
        });
        (pending, started_rx, release_tx)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_writes_to_one_path_keep_order() {
        let dir = TempDir::new().expect("temp dir");
        let scheduler = scheduler(&dir);
        let path = dir.path().join("themes.json");

        let (first, started, release) = gated_write(&scheduler, &path, b"first");
        let second = scheduler.schedule(&path, b"second".to_vec());

        started.await.expect("first write started");
        assert!(!second.is_started());
        release.send(()).expect("release");

        assert_ok!(first.wait().await);
        assert_ok!(second.wait().await);
        assert_eq!(fs::read(&path).expect("read"), b"second");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_before_start() {
        let dir = TempDir::new().expect("temp dir");
        let scheduler = scheduler(&dir);
        let path = dir.path().join("themes.json");

        let (first, started, release) = gated_write(&scheduler, &path, b"first");
        let second = scheduler.schedule(&path, b"second".to_vec());
        let third = scheduler.schedule(&path, b"third".to_vec());

        started.await.expect("first write started");
        assert_eq!(second.cancel(), CancelOutcome::Cancelled);
        assert_eq!(second.cancel(), CancelOutcome::Cancelled);
        release.send(()).expect("release");

        assert_ok!(first.wait().await);
        let error = assert_err!(second.wait().await);
        assert!(matches!(error, ThemeError::Cancelled { .. }));
        assert_ok!(third.wait().await);
        assert_eq!(fs::read(&path).expect("read"), b"third");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_after_start_is_too_late() {
        let dir = TempDir::new().expect("temp dir");
        let scheduler = scheduler(&dir);
        let path = dir.path().join("themes.json");

        let (write, started, release) = gated_write(&scheduler, &path, b"content");
        started.await.expect("write started");

        assert_eq!(write.cancel(), CancelOutcome::AlreadyStarted);
        release.send(()).expect("release");
        assert_ok!(write.wait().await);
        assert_eq!(fs::read(&path).expect("read"), b"content");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_pending_spares_running_write() {
        let dir = TempDir::new().expect("temp dir");
        let scheduler = scheduler(&dir);
        let path = dir.path().join("palette.json");

        let (running, started, release) = gated_write(&scheduler, &path, b"kept");
        let queued = scheduler.schedule(&path, b"dropped".to_vec());
        started.await.expect("write started");

        scheduler.cancel_pending();
        release.send(()).expect("release");

        assert_ok!(running.wait().await);
        assert_err!(queued.wait().await);
        assert_eq!(fs::read(&path).expect("read"), b"kept");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_writes_after_cancel_pending_still_run() {
        let dir = TempDir::new().expect("temp dir");
        let scheduler = scheduler(&dir);
        let path = dir.path().join("themes.json");

        let (running, started, release) = gated_write(&scheduler, &path, b"kept");
        let queued = scheduler.schedule(&path, b"dropped".to_vec());
        started.await.expect("write started");

        scheduler.cancel_pending();
        let later = scheduler.schedule(&path, b"later".to_vec());
        release.send(()).expect("release");

        assert_ok!(running.wait().await);
        let error = assert_err!(queued.wait().await);
        assert!(matches!(error, ThemeError::Cancelled { .. }));
        assert_ok!(later.wait().await);
        assert_eq!(fs::read(&path).expect("read"), b"later");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_finished_paths_are_forgotten() {
        let dir = TempDir::new().expect("temp dir");
        let scheduler = scheduler(&dir);
        let path = dir.path().join("themes.json");

        let (first, started, release) = gated_write(&scheduler, &path, b"first");
        let second = scheduler.schedule(&path, b"second".to_vec());
        started.await.expect("first write started");
        assert_eq!(scheduler.busy_paths(), 1);

        release.send(()).expect("release");
        assert_ok!(first.wait().await);
        assert_ok!(second.wait().await);
        assert_eq!(scheduler.busy_paths(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_different_paths_do_not_wait_for_each_other() {
        let dir = TempDir::new().expect("temp dir");
        let scheduler = scheduler(&dir);
        let blocked = dir.path().join("a.json");
        let free = dir.path().join("b.json");

        let (slow, started, release) = gated_write(&scheduler, &blocked, b"a");
        started.await.expect("write started");

        let fast = scheduler.schedule(&free, b"b".to_vec());
        assert_ok!(fast.wait().await);
        assert_eq!(fs::read(&free).expect("read"), b"b");

        release.send(()).expect("release");
        assert_ok!(slow.wait().await);
    }
}
