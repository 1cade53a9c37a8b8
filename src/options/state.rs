//! The reconciled option set owned by one editing session.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

use super::bounds::Bounds;

/// Slider range for `length` before any policy narrows it.
pub const DEFAULT_LENGTH_BOUNDS: Bounds = Bounds::new(5, 64);
/// Stepper range for both minimum-count fields before any policy floor.
pub const DEFAULT_MIN_COUNT_BOUNDS: Bounds = Bounds::new(0, 5);

pub const DEFAULT_LENGTH: u32 = 10;
pub const DEFAULT_MIN_NUMBERS: u32 = 1;
pub const DEFAULT_MIN_SPECIAL: u32 = 1;

/// One of the four character classes a password may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    Uppercase,
    Lowercase,
    Numbers,
    Special,
}

impl CharClass {
    /// All classes in list order.
    pub const ALL: [Self; 4] = [Self::Uppercase, Self::Lowercase, Self::Numbers, Self::Special];

    /// Parse the snake_case name used on the command line and in JSON.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "uppercase" | "upper" => Some(Self::Uppercase),
            "lowercase" | "lower" => Some(Self::Lowercase),
            "numbers" | "digits" => Some(Self::Numbers),
            "special" | "symbols" => Some(Self::Special),
            _ => None,
        }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uppercase => write!(f, "uppercase"),
            Self::Lowercase => write!(f, "lowercase"),
            Self::Numbers => write!(f, "numbers"),
            Self::Special => write!(f, "special"),
        }
    }
}

/// A single user edit. Every widget change is expressed as one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edit {
    /// Switch a class on or off.
    SetClass { class: CharClass, enabled: bool },
    /// Flip a class relative to its current value.
    ToggleClass { class: CharClass },
    /// Move the length slider.
    SetLength { value: u32 },
    /// Step the minimum-numbers field.
    SetMinNumbers { value: u32 },
    /// Step the minimum-special field.
    SetMinSpecial { value: u32 },
}

/// Mutable option set plus the bounds and locks that constrain it.
///
/// Value fields are public so hosts can seed a state directly; bounds and
/// locks only change through [`super::reconcile::initialize`]. Outside the
/// crate a state comes from [`Default`], [`crate::store::StoredOptions::into_state`]
/// or `initialize`; it serializes for output but never deserializes.
///
/// ```compile_fail
/// use password_options::options::state::OptionState;
///
/// let forged: OptionState = serde_json::from_str(r#"{"length": 200}"#).unwrap();
/// ```
///
/// ```compile_fail
/// use password_options::options::bounds::Bounds;
/// use password_options::options::state::OptionState;
///
/// let forged = OptionState {
///     numbers_locked: true,
///     length_bounds: Bounds::new(5, 500),
///     ..OptionState::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionState {
    pub length: u32,
    pub use_uppercase: bool,
    pub use_lowercase: bool,
    pub use_numbers: bool,
    pub use_special: bool,
    pub min_numbers: u32,
    pub min_special: u32,
    pub(crate) length_bounds: Bounds,
    pub(crate) min_numbers_bounds: Bounds,
    pub(crate) min_special_bounds: Bounds,
    pub(crate) numbers_locked: bool,
    pub(crate) special_locked: bool,
}

impl Default for OptionState {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            use_uppercase: true,
            use_lowercase: true,
            use_numbers: true,
            use_special: true,
            min_numbers: DEFAULT_MIN_NUMBERS,
            min_special: DEFAULT_MIN_SPECIAL,
            length_bounds: DEFAULT_LENGTH_BOUNDS,
            min_numbers_bounds: DEFAULT_MIN_COUNT_BOUNDS,
            min_special_bounds: DEFAULT_MIN_COUNT_BOUNDS,
            numbers_locked: false,
            special_locked: false,
        }
    }
}

impl OptionState {
    #[must_use]
    pub const fn length_bounds(&self) -> Bounds {
        self.length_bounds
    }

    #[must_use]
    pub const fn min_numbers_bounds(&self) -> Bounds {
        self.min_numbers_bounds
    }

    #[must_use]
    pub const fn min_special_bounds(&self) -> Bounds {
        self.min_special_bounds
    }

    #[must_use]
    pub const fn numbers_locked(&self) -> bool {
        self.numbers_locked
    }

    #[must_use]
    pub const fn special_locked(&self) -> bool {
        self.special_locked
    }

    #[must_use]
    pub const fn class_enabled(&self, class: CharClass) -> bool {
        match class {
            CharClass::Uppercase => self.use_uppercase,
            CharClass::Lowercase => self.use_lowercase,
            CharClass::Numbers => self.use_numbers,
            CharClass::Special => self.use_special,
        }
    }

    /// Whether policy forbids switching `class` off.
    #[must_use]
    pub const fn is_locked(&self, class: CharClass) -> bool {
        match class {
            CharClass::Numbers => self.numbers_locked,
            CharClass::Special => self.special_locked,
            CharClass::Uppercase | CharClass::Lowercase => false,
        }
    }

    pub(crate) fn set_class(&mut self, class: CharClass, enabled: bool) {
        match class {
            CharClass::Uppercase => self.use_uppercase = enabled,
            CharClass::Lowercase => self.use_lowercase = enabled,
            CharClass::Numbers => self.use_numbers = enabled,
            CharClass::Special => self.use_special = enabled,
        }
    }

    /// At least one class is enabled.
    #[must_use]
    pub const fn has_enabled_class(&self) -> bool {
        self.use_uppercase || self.use_lowercase || self.use_numbers || self.use_special
    }

    /// Snapshot of the seven values handed to the generator.
    #[must_use]
    pub const fn request(&self) -> GenerationRequest {
        GenerationRequest {
            length: self.length,
            uppercase: self.use_uppercase,
            lowercase: self.use_lowercase,
            numbers: self.use_numbers,
            special: self.use_special,
            min_numbers: self.min_numbers,
            min_special: self.min_special,
        }
    }
}

/// The seven generation parameters, detached from bounds and locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub length: u32,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub special: bool,
    pub min_numbers: u32,
    pub min_special: u32,
}

impl GenerationRequest {
    /// Characters that must come from a specific class. Minimums of disabled
    /// classes do not count.
    #[must_use]
    pub const fn required_chars(&self) -> u32 {
        let numbers = if self.numbers { self.min_numbers } else { 0 };
        let special = if self.special { self.min_special } else { 0 };
        numbers.saturating_add(special)
    }

    #[must_use]
    pub const fn has_enabled_class(&self) -> bool {
        self.uppercase || self.lowercase || self.numbers || self.special
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_matches_store_fallbacks() {
        let state = OptionState::default();
        assert_eq!(state.length, 10);
        assert!(CharClass::ALL.iter().all(|c| state.class_enabled(*c)));
        assert_eq!(state.min_numbers, 1);
        assert_eq!(state.min_special, 1);
        assert_eq!(state.length_bounds(), Bounds::new(5, 64));
        assert_eq!(state.min_numbers_bounds(), Bounds::new(0, 5));
        assert!(!state.numbers_locked() && !state.special_locked());
    }

    #[test]
    fn only_numbers_and_special_can_lock() {
        let mut state = OptionState::default();
        state.numbers_locked = true;
        state.special_locked = true;
        assert!(state.is_locked(CharClass::Numbers));
        assert!(state.is_locked(CharClass::Special));
        assert!(!state.is_locked(CharClass::Uppercase));
        assert!(!state.is_locked(CharClass::Lowercase));
    }

    #[test]
    fn required_chars_ignores_disabled_classes() {
        let mut state = OptionState::default();
        state.min_numbers = 3;
        state.min_special = 4;
        assert_eq!(state.request().required_chars(), 7);
        state.use_special = false;
        assert_eq!(state.request().required_chars(), 3);
    }

    #[test]
    fn class_names_parse_with_aliases() {
        assert_eq!(CharClass::from_name("Upper"), Some(CharClass::Uppercase));
        assert_eq!(CharClass::from_name("digits"), Some(CharClass::Numbers));
        assert_eq!(CharClass::from_name("symbols"), Some(CharClass::Special));
        assert_eq!(CharClass::from_name("emoji"), None);
    }

    #[test]
    fn edit_serde_is_tagged() {
        let edit = Edit::SetClass {
            class: CharClass::Numbers,
            enabled: false,
        };
        let json = serde_json::to_string(&edit).unwrap();
        assert!(json.contains("\"kind\":\"set_class\""));
        assert!(json.contains("\"class\":\"numbers\""));
        let back: Edit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, edit);
    }
}
