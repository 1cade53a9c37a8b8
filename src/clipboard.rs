//! Write-only clipboard port.

#![allow(missing_docs)]

use std::io::{self, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::core::errors::{PwoError, Result};

/// System clipboard, write side only. No read-back.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

impl<C: Clipboard + ?Sized> Clipboard for Box<C> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        (**self).set_text(text)
    }
}

/// Which clipboard the CLI host wires in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipboardBackend {
    /// OSC 52 escape sequence on stderr; the terminal owns the clipboard.
    #[default]
    Osc52,
    /// Copies are accepted and dropped.
    None,
}

/// Terminal clipboard via the OSC 52 "set selection" sequence.
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl Osc52Clipboard<io::Stderr> {
    #[must_use]
    pub fn stderr() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> Osc52Clipboard<W> {
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Build the escape sequence that puts `text` on the system clipboard.
#[must_use]
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(osc52_sequence(text).as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| PwoError::Clipboard {
                details: e.to_string(),
            })
    }
}

/// Accepts and drops every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClipboard;

impl Clipboard for NullClipboard {
    fn set_text(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Keeps the last text written, for hosts that paste themselves and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    writes: usize,
}

impl MemoryClipboard {
    #[must_use]
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        self.writes += 1;
        Ok(())
    }
}
