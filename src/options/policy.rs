//! Host-supplied policy constraints.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{PwoError, Result};

/// Mandatory requirements imposed by the hosting context for one session.
///
/// Field names accept both snake_case and the camelCase spelling hosts tend
/// to send (`requireDigits`, `minLength`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConstraint {
    /// Passwords must contain a digit; the numbers switch locks on.
    #[serde(alias = "requireDigits")]
    pub require_digits: bool,
    /// Passwords must contain a symbol; the special switch locks on.
    #[serde(alias = "requireSymbols")]
    pub require_symbols: bool,
    /// Shortest allowed length. `0` leaves the floor alone.
    #[serde(alias = "minLength")]
    pub min_length: u32,
    /// Longest allowed length. Values of 5 or less are ignored.
    #[serde(alias = "maxLength")]
    pub max_length: u32,
}

impl PolicyConstraint {
    /// A length range is only honoured when `min_length < max_length`.
    #[must_use]
    pub const fn has_length_range(&self) -> bool {
        self.min_length < self.max_length
    }

    /// Whether the policy asks for anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.require_digits && !self.require_symbols && !self.has_length_range()
    }

    /// Read a policy from a JSON document.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| PwoError::io(path, source))?;
        Ok(serde_json::from_str(&raw)?)
    }
}
