//! JSONL tracking sink: one self-contained JSON object per event.
//!
//! Lines are assembled in memory and written with a single `write_all`, so a
//! process tailing the file never sees half a record.
//!
//! Degradation chain:
//! 1. Primary file path
//! 2. Fallback path
//! 3. stderr with `[PWO-TRACK]` prefix
//! 4. Silent discard (tracking must never fail a session)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{TrackingEvent, TrackingMode, TrackingSink};
use crate::core::errors::{PwoError, Result};

/// One line of the tracking log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: String,
    pub mode: TrackingMode,
    /// Groups the events of one generator session.
    pub session: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Normal,
    Fallback,
    Stderr,
    Discard,
}

/// Where tracking lines go.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    pub fallback_path: Option<PathBuf>,
}

/// Append-only JSONL tracker with multi-level fallback.
pub struct JsonlTracker {
    config: JsonlConfig,
    writer: Option<BufWriter<File>>,
    state: WriterState,
    session: String,
    lines_written: u64,
}

impl JsonlTracker {
    /// Open the log. Falls through the degradation chain on failure.
    pub fn open(config: JsonlConfig) -> Self {
        let mut tracker = Self {
            config,
            writer: None,
            state: WriterState::Discard,
            session: format!("{:016x}", rand::random::<u64>()),
            lines_written: 0,
        };
        tracker.try_open_primary();
        tracker
    }

    /// Tag subsequent records with a host-chosen session id.
    #[must_use]
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = session.into();
        self
    }

    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Current degradation state.
    #[must_use]
    pub fn state(&self) -> &str {
        match self.state {
            WriterState::Normal => "normal",
            WriterState::Fallback => "fallback",
            WriterState::Stderr => "stderr",
            WriterState::Discard => "discard",
        }
    }

    #[must_use]
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn flush(&mut self) {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
        }
    }

    pub fn write_record(&mut self, record: &TrackingRecord) {
        let line = match serde_json::to_string(record) {
            Ok(json) => format!("{json}\n"),
            Err(e) => {
                let _ = writeln!(io::stderr(), "[PWO-TRACK] serialize error: {e}");
                return;
            }
        };
        self.write_line(&line);
    }

    // ──────────────────────── internals ────────────────────────

    fn write_line(&mut self, line: &str) {
        match self.state {
            WriterState::Normal | WriterState::Fallback => {
                let written = self
                    .writer
                    .as_mut()
                    .is_some_and(|w| w.write_all(line.as_bytes()).and_then(|()| w.flush()).is_ok());
                if written {
                    self.lines_written += 1;
                } else {
                    self.degrade();
                    self.write_line(line);
                }
            }
            WriterState::Stderr => {
                let _ = write!(io::stderr(), "[PWO-TRACK] {line}");
                self.lines_written += 1;
            }
            WriterState::Discard => {}
        }
    }

    fn try_open_primary(&mut self) {
        match open_append(&self.config.path) {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                self.state = WriterState::Normal;
            }
            Err(_) => self.try_open_fallback(),
        }
    }

    fn try_open_fallback(&mut self) {
        let Some(fb) = self.config.fallback_path.clone() else {
            self.state = WriterState::Stderr;
            let _ = writeln!(
                io::stderr(),
                "[PWO-TRACK] primary path failed and no fallback configured, using stderr"
            );
            return;
        };
        if let Ok(file) = open_append(&fb) {
            let _ = writeln!(
                io::stderr(),
                "[PWO-TRACK] primary path failed, using fallback: {}",
                fb.display()
            );
            self.writer = Some(BufWriter::new(file));
            self.state = WriterState::Fallback;
        } else {
            self.state = WriterState::Stderr;
            let _ = writeln!(
                io::stderr(),
                "[PWO-TRACK] both primary and fallback paths failed, using stderr"
            );
        }
    }

    fn degrade(&mut self) {
        self.writer = None;
        match self.state {
            WriterState::Normal => self.try_open_fallback(),
            WriterState::Fallback => {
                self.state = WriterState::Stderr;
                let _ = writeln!(io::stderr(), "[PWO-TRACK] fallback write failed, using stderr");
            }
            WriterState::Stderr => self.state = WriterState::Discard,
            WriterState::Discard => {}
        }
    }
}

impl TrackingSink for JsonlTracker {
    fn track(&mut self, mode: TrackingMode, event: TrackingEvent) {
        let record = TrackingRecord {
            ts: format_utc_now(),
            event: event.name().to_string(),
            mode,
            session: self.session.clone(),
        };
        self.write_record(&record);
    }
}

// ──────────────────────── helpers ────────────────────────

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| PwoError::io(parent, source))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| PwoError::io(path, source))
}

fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
