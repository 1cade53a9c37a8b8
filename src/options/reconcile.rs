//! Policy reconciliation and edit application.
//!
//! Both entry points are pure: they take a state by reference, never touch
//! the policy, and perform no I/O. The session driver in [`crate::engine`]
//! owns the side-effects (generation, persistence, tracking).
//!
//! # Invariants maintained
//!
//! - at least one character class is enabled after every call;
//! - a policy-locked class stays enabled and its minimum stays `>= 1`;
//! - policy length limits only ever narrow the slider range, and `length`
//!   always sits inside the current range.

use serde::Serialize;

use super::policy::PolicyConstraint;
use super::state::{CharClass, Edit, OptionState};

/// Policy `max_length` values at or below this are ignored.
const MIN_HONOURED_MAX_LENGTH: u32 = 5;

/// Reconcile persisted defaults against an optional policy.
///
/// Runs once per session. Deterministic: identical inputs give identical
/// output.
#[must_use]
pub fn initialize(defaults: &OptionState, constraint: Option<&PolicyConstraint>) -> OptionState {
    let mut state = defaults.clone();

    if let Some(policy) = constraint {
        if policy.require_digits {
            state.use_numbers = true;
            state.numbers_locked = true;
            if state.min_numbers < 1 {
                state.min_numbers = 1;
            }
            state.min_numbers_bounds.raise_min(1);
        }

        if policy.require_symbols {
            state.use_special = true;
            state.special_locked = true;
            if state.min_special < 1 {
                state.min_special = 1;
            }
            state.min_special_bounds.raise_min(1);
        }

        if policy.has_length_range() {
            // Lower end first, then upper end; each clamps before narrowing.
            if policy.min_length > 0 && policy.min_length > state.length_bounds.min() {
                let floor = policy.min_length.min(state.length_bounds.max());
                if state.length < floor {
                    state.length = floor;
                }
                state.length_bounds.raise_min(floor);
            }

            if policy.max_length > MIN_HONOURED_MAX_LENGTH
                && policy.max_length < state.length_bounds.max()
            {
                let ceiling = policy.max_length.max(state.length_bounds.min());
                if state.length > ceiling {
                    state.length = ceiling;
                }
                state.length_bounds.lower_max(ceiling);
            }
        }
    }

    clamp_to_bounds(&mut state);
    enforce_non_empty_alphabet(&mut state);
    state
}

/// Apply one edit and return the corrected state.
#[must_use]
pub fn apply_edit(state: &OptionState, edit: Edit) -> OptionState {
    let mut next = state.clone();
    apply_edit_in_place(&mut next, edit);
    next
}

/// What [`apply_edit_in_place`] did with an edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EditReport {
    /// The state differs from before the edit.
    pub changed: bool,
    /// A toggle-off hit a policy-locked class and was dropped.
    pub ignored_locked: bool,
    /// The edit would have emptied the alphabet; lowercase was re-enabled.
    pub forced_lowercase: bool,
}

/// In-place variant of [`apply_edit`] that also reports corrections.
pub fn apply_edit_in_place(state: &mut OptionState, edit: Edit) -> EditReport {
    let before = state.clone();
    let mut report = EditReport::default();

    match edit {
        Edit::SetClass { class, enabled } => {
            set_class_respecting_lock(state, class, enabled, &mut report);
        }
        Edit::ToggleClass { class } => {
            let enabled = !state.class_enabled(class);
            set_class_respecting_lock(state, class, enabled, &mut report);
        }
        Edit::SetLength { value } => {
            state.length = state.length_bounds.clamp(value);
        }
        Edit::SetMinNumbers { value } => {
            state.min_numbers = state.min_numbers_bounds.clamp(value);
        }
        Edit::SetMinSpecial { value } => {
            state.min_special = state.min_special_bounds.clamp(value);
        }
    }

    // Value fields are public and may have been written directly.
    enforce_locks(state);
    clamp_to_bounds(state);
    report.forced_lowercase = enforce_non_empty_alphabet(state);
    report.changed = *state != before;
    report
}

fn set_class_respecting_lock(
    state: &mut OptionState,
    class: CharClass,
    enabled: bool,
    report: &mut EditReport,
) {
    if !enabled && state.is_locked(class) {
        report.ignored_locked = true;
        return;
    }
    state.set_class(class, enabled);
}

/// Re-enable lowercase when every class is off. Returns whether it fired.
fn enforce_non_empty_alphabet(state: &mut OptionState) -> bool {
    if state.has_enabled_class() {
        return false;
    }
    state.use_lowercase = true;
    true
}

fn enforce_locks(state: &mut OptionState) {
    if state.numbers_locked {
        state.use_numbers = true;
    }
    if state.special_locked {
        state.use_special = true;
    }
}

fn clamp_to_bounds(state: &mut OptionState) {
    state.length = state.length_bounds.clamp(state.length);
    state.min_numbers = state.min_numbers_bounds.clamp(state.min_numbers);
    state.min_special = state.min_special_bounds.clamp(state.min_special);
}
