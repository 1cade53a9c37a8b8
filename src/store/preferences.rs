//! JSON-file option store with safe atomic persistence.
//!
//! The generator remembers the last-used options across sessions. Loading and
//! saving are designed so that persistence failures **never** block session
//! start, regeneration, or the next edit.
//!
//! # Document shape
//!
//! ```text
//! {
//!   "schema_version": 1,
//!   "password_generator_uppercase": true,
//!   "password_generator_lowercase": true,
//!   "password_generator_numbers": true,
//!   "password_generator_special": true,
//!   "password_generator_min_numbers": 1,
//!   "password_generator_min_special": 1,
//!   "password_generator_length": 10
//! }
//! ```
//!
//! Each key falls back independently when absent. Unknown keys are ignored.
//!
//! # Persistence
//!
//! Writes go through [`super::writer`]: a background thread that owns the
//! file and replaces it atomically. Saving only hands a snapshot over; the
//! session flushes and joins the thread on close.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::OptionStore;
use super::writer::{PersistWriter, WriteStats, persist};
use crate::options::state::{
    DEFAULT_LENGTH, DEFAULT_LENGTH_BOUNDS, DEFAULT_MIN_COUNT_BOUNDS, DEFAULT_MIN_NUMBERS,
    DEFAULT_MIN_SPECIAL, OptionState,
};

/// Bump when a field changes meaning. Additive fields rely on
/// `#[serde(default)]` instead.
const SCHEMA_VERSION: u32 = 1;

// ──────────────────── stored values ────────────────────

/// The seven persisted option values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredOptions {
    pub schema_version: u32,
    #[serde(rename = "password_generator_uppercase")]
    pub uppercase: bool,
    #[serde(rename = "password_generator_lowercase")]
    pub lowercase: bool,
    #[serde(rename = "password_generator_numbers")]
    pub numbers: bool,
    #[serde(rename = "password_generator_special")]
    pub special: bool,
    #[serde(rename = "password_generator_min_numbers")]
    pub min_numbers: u32,
    #[serde(rename = "password_generator_min_special")]
    pub min_special: u32,
    #[serde(rename = "password_generator_length")]
    pub length: u32,
}

impl Default for StoredOptions {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            uppercase: true,
            lowercase: true,
            numbers: true,
            special: true,
            min_numbers: DEFAULT_MIN_NUMBERS,
            min_special: DEFAULT_MIN_SPECIAL,
            length: DEFAULT_LENGTH,
        }
    }
}

impl StoredOptions {
    /// Capture the persisted subset of a live state.
    #[must_use]
    pub fn from_state(state: &OptionState) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            uppercase: state.use_uppercase,
            lowercase: state.use_lowercase,
            numbers: state.use_numbers,
            special: state.use_special,
            min_numbers: state.min_numbers,
            min_special: state.min_special,
            length: state.length,
        }
    }

    /// Unreconciled session defaults: stored values, default bounds, no locks.
    #[must_use]
    pub fn into_state(self) -> OptionState {
        OptionState {
            length: self.length,
            use_uppercase: self.uppercase,
            use_lowercase: self.lowercase,
            use_numbers: self.numbers,
            use_special: self.special,
            min_numbers: self.min_numbers,
            min_special: self.min_special,
            ..OptionState::default()
        }
    }
}

// ──────────────────── validation ────────────────────

/// Issues found while normalizing loaded values.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Normalize loaded values into their default ranges.
pub fn validate(mut stored: StoredOptions) -> (StoredOptions, ValidationReport) {
    let mut report = ValidationReport::default();

    if stored.schema_version > SCHEMA_VERSION {
        report.warnings.push(format!(
            "options schema version {} is newer than supported {}; \
             unknown fields will be ignored",
            stored.schema_version, SCHEMA_VERSION,
        ));
    }

    let length = DEFAULT_LENGTH_BOUNDS.clamp(stored.length);
    if length != stored.length {
        report.warnings.push(format!(
            "length={} outside [{}, {}]; clamped to {length}",
            stored.length,
            DEFAULT_LENGTH_BOUNDS.min(),
            DEFAULT_LENGTH_BOUNDS.max(),
        ));
        stored.length = length;
    }

    for (name, slot) in [
        ("min_numbers", &mut stored.min_numbers),
        ("min_special", &mut stored.min_special),
    ] {
        let clamped = DEFAULT_MIN_COUNT_BOUNDS.clamp(*slot);
        if clamped != *slot {
            report.warnings.push(format!(
                "{name}={} exceeds {}; clamped",
                *slot,
                DEFAULT_MIN_COUNT_BOUNDS.max(),
            ));
            *slot = clamped;
        }
    }

    if !(stored.uppercase || stored.lowercase || stored.numbers || stored.special) {
        report
            .warnings
            .push("all character classes disabled; lowercase re-enabled".to_string());
        stored.lowercase = true;
    }

    (stored, report)
}

// ──────────────────── persistence ────────────────────

/// Load outcome from the persistence layer.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Successfully loaded and validated.
    Loaded {
        stored: StoredOptions,
        report: ValidationReport,
    },
    /// File not found; defaults apply (normal on first launch).
    Missing,
    /// File exists but is corrupt or unparseable; defaults apply.
    Corrupt { details: String },
    /// I/O error reading the file; defaults apply.
    IoError { details: String },
}

impl LoadOutcome {
    /// Extract the effective values regardless of load status.
    #[must_use]
    pub fn into_stored(self) -> StoredOptions {
        match self {
            Self::Loaded { stored, .. } => stored,
            Self::Missing | Self::Corrupt { .. } | Self::IoError { .. } => {
                StoredOptions::default()
            }
        }
    }
}

/// Load stored options from a file path. Never panics.
pub fn load(path: &Path) -> LoadOutcome {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return LoadOutcome::Missing,
        // Invalid UTF-8 is corrupt content, not an I/O error.
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return LoadOutcome::Corrupt {
                details: format!("{e}"),
            };
        }
        Err(e) => {
            return LoadOutcome::IoError {
                details: format!("{e}"),
            };
        }
    };

    let stored: StoredOptions = match serde_json::from_str(&content) {
        Ok(s) => s,
        Err(e) => {
            return LoadOutcome::Corrupt {
                details: format!("{e}"),
            };
        }
    };

    let (stored, report) = validate(stored);
    LoadOutcome::Loaded { stored, report }
}

// ──────────────────── store ────────────────────

/// [`OptionStore`] backed by a JSON document on disk.
///
/// The writer thread starts on the first save and stops on [`OptionStore::flush`];
/// a later save starts a fresh one.
pub struct JsonFileStore {
    path: PathBuf,
    debounce: Duration,
    writer: Option<PersistWriter>,
    stats: Arc<WriteStats>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            debounce: Duration::ZERO,
            writer: None,
            stats: Arc::new(WriteStats::default()),
        }
    }

    /// Let bursts of saves settle for `d` before the file is touched.
    #[must_use]
    pub fn with_debounce(mut self, d: Duration) -> Self {
        self.debounce = d;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshots written so far.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.stats.writes()
    }

    /// Snapshots dropped because the write failed.
    #[must_use]
    pub fn write_failures(&self) -> u64 {
        self.stats.failures()
    }
}

impl OptionStore for JsonFileStore {
    fn load(&mut self) -> StoredOptions {
        let outcome = load(&self.path);
        match &outcome {
            LoadOutcome::Loaded { report, .. } => {
                for warning in &report.warnings {
                    eprintln!("[PWO-STORE] {warning}");
                }
            }
            LoadOutcome::Missing => {}
            LoadOutcome::Corrupt { details } => {
                eprintln!(
                    "[PWO-STORE] corrupt options file {}, using defaults: {details}",
                    self.path.display()
                );
            }
            LoadOutcome::IoError { details } => {
                eprintln!(
                    "[PWO-STORE] cannot read options file {}, using defaults: {details}",
                    self.path.display()
                );
            }
        }
        outcome.into_stored()
    }

    fn save(&mut self, state: &OptionState) {
        let stored = StoredOptions::from_state(state);
        if self.writer.is_none() {
            match PersistWriter::spawn(self.path.clone(), self.debounce, Arc::clone(&self.stats)) {
                Ok(writer) => self.writer = Some(writer),
                Err(e) => {
                    eprintln!("[PWO-STORE] {e}; writing inline");
                    persist(&self.path, &stored, &self.stats);
                    return;
                }
            }
        }
        if let Some(writer) = &self.writer {
            writer.submit(stored);
        }
    }

    fn flush(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            writer.shutdown();
        }
    }
}
