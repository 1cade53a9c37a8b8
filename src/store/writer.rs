//! Background persistence for the option file.
//!
//! A dedicated writer thread owns all file I/O. The session parks the newest
//! snapshot in a shared slot and wakes the thread over a bounded crossbeam
//! channel with `try_send()`, so an edit never waits on the disk. Snapshots
//! that arrive while a write is still queued replace each other; only the
//! newest reaches the file.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use parking_lot::Mutex;

use super::preferences::StoredOptions;
use crate::core::errors::{PwoError, Result};

/// Write attempts observed by a store, shared with its writer threads.
#[derive(Debug, Default)]
pub struct WriteStats {
    writes: AtomicU64,
    failures: AtomicU64,
}

impl WriteStats {
    /// Completed writes.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Writes that hit an error and were dropped.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

enum Signal {
    Dirty,
    Shutdown,
}

/// Handle to a running writer thread.
pub struct PersistWriter {
    tx: Sender<Signal>,
    pending: Arc<Mutex<Option<StoredOptions>>>,
    join: Option<thread::JoinHandle<()>>,
}

impl PersistWriter {
    /// Start a writer for `path`. With a non-zero `debounce` the thread lets a
    /// burst of snapshots settle for that long before writing.
    pub fn spawn(path: PathBuf, debounce: Duration, stats: Arc<WriteStats>) -> Result<Self> {
        // One queued wake-up is enough: the slot always holds the newest value.
        let (tx, rx) = bounded::<Signal>(1);
        let pending = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&pending);

        let join = thread::Builder::new()
            .name("pwo-store".to_string())
            .spawn(move || writer_thread_main(&rx, &path, debounce, &slot, &stats))
            .map_err(|e| PwoError::Runtime {
                details: format!("failed to spawn store writer: {e}"),
            })?;

        Ok(Self {
            tx,
            pending,
            join: Some(join),
        })
    }

    /// Hand `stored` to the writer. Never blocks on I/O.
    pub fn submit(&self, stored: StoredOptions) {
        *self.pending.lock() = Some(stored);
        match self.tx.try_send(Signal::Dirty) {
            // Full means a wake-up is already queued; it will see the new value.
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => {
                eprintln!("[PWO-STORE] writer thread is gone; options not saved");
            }
        }
    }

    /// Write whatever is still pending, then stop the thread and wait for it.
    pub fn shutdown(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        // Blocking send: the caller is closing and waits for the write anyway.
        let _ = self.tx.send(Signal::Shutdown);
        if join.join().is_err() {
            eprintln!("[PWO-STORE] writer thread panicked");
        }
    }
}

impl Drop for PersistWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn writer_thread_main(
    rx: &Receiver<Signal>,
    path: &Path,
    debounce: Duration,
    pending: &Mutex<Option<StoredOptions>>,
    stats: &WriteStats,
) {
    while let Ok(signal) = rx.recv() {
        let stop = match signal {
            Signal::Shutdown => true,
            Signal::Dirty => settle(rx, debounce),
        };
        let next = pending.lock().take();
        if let Some(stored) = next {
            persist(path, &stored, stats);
        }
        if stop {
            return;
        }
    }
    // Every sender dropped without a shutdown.
    let next = pending.lock().take();
    if let Some(stored) = next {
        persist(path, &stored, stats);
    }
}

/// Swallow further wake-ups until `debounce` has passed. Returns whether a
/// shutdown arrived meanwhile.
fn settle(rx: &Receiver<Signal>, debounce: Duration) -> bool {
    if debounce.is_zero() {
        return false;
    }
    let deadline = Instant::now() + debounce;
    loop {
        match rx.recv_deadline(deadline) {
            Ok(Signal::Dirty) => {}
            Ok(Signal::Shutdown) | Err(RecvTimeoutError::Disconnected) => return true,
            Err(RecvTimeoutError::Timeout) => return false,
        }
    }
}

/// Write one snapshot, logging and counting a failure instead of raising it.
pub(crate) fn persist(path: &Path, stored: &StoredOptions, stats: &WriteStats) {
    match write_atomic(stored, path) {
        Ok(()) => {
            stats.writes.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            stats.failures.fetch_add(1, Ordering::Relaxed);
            eprintln!("[PWO-STORE] failed to persist options: {e}");
        }
    }
}

/// Replace `path` in one step: the document goes to a synced sibling staging
/// file first and is then renamed over the target, so readers see either the
/// old or the new options and never a torn write.
pub fn write_atomic(stored: &StoredOptions, path: &Path) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| PwoError::io(dir, e))?;

    let mut body = serde_json::to_vec_pretty(stored)?;
    body.push(b'\n');

    let staging = staging_path(path);
    let mut file = fs::File::create(&staging).map_err(|e| PwoError::io(&staging, e))?;
    file.write_all(&body)
        .and_then(|()| file.sync_all())
        .map_err(|e| PwoError::io(&staging, e))?;
    drop(file);

    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(PwoError::io(path, e));
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "options".to_string(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
