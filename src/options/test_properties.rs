//! Property-based tests for reconciliation invariants.
//!
//! Uses `proptest` to check that arbitrary stored defaults, policies, and
//! edit sequences keep the option state valid: a non-empty alphabet,
//! policy-required classes enabled with a minimum of at least one, and a
//! length range that only narrows and always contains the length.

use proptest::prelude::*;

use super::policy::PolicyConstraint;
use super::reconcile::{apply_edit, initialize};
use super::state::{
    CharClass, DEFAULT_LENGTH_BOUNDS, DEFAULT_MIN_COUNT_BOUNDS, Edit, OptionState,
};

// ──────────────────── strategies ────────────────────

fn arb_class() -> impl Strategy<Value = CharClass> {
    prop_oneof![
        Just(CharClass::Uppercase),
        Just(CharClass::Lowercase),
        Just(CharClass::Numbers),
        Just(CharClass::Special),
    ]
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (arb_class(), any::<bool>()).prop_map(|(class, enabled)| Edit::SetClass { class, enabled }),
        arb_class().prop_map(|class| Edit::ToggleClass { class }),
        (0u32..100).prop_map(|value| Edit::SetLength { value }),
        (0u32..10).prop_map(|value| Edit::SetMinNumbers { value }),
        (0u32..10).prop_map(|value| Edit::SetMinSpecial { value }),
    ]
}

/// Stored defaults, including values a corrupted store could hand back.
fn arb_defaults() -> impl Strategy<Value = OptionState> {
    (
        0u32..100,
        any::<[bool; 4]>(),
        0u32..10,
        0u32..10,
    )
        .prop_map(|(length, [upper, lower, numbers, special], min_numbers, min_special)| {
            OptionState {
                length,
                use_uppercase: upper,
                use_lowercase: lower,
                use_numbers: numbers,
                use_special: special,
                min_numbers,
                min_special,
                ..OptionState::default()
            }
        })
}

fn arb_policy() -> impl Strategy<Value = PolicyConstraint> {
    (any::<bool>(), any::<bool>(), 0u32..90, 0u32..90).prop_map(
        |(require_digits, require_symbols, min_length, max_length)| PolicyConstraint {
            require_digits,
            require_symbols,
            min_length,
            max_length,
        },
    )
}

// ──────────────────── invariant checks ────────────────────

fn assert_valid(state: &OptionState, policy: Option<&PolicyConstraint>) {
    assert!(state.has_enabled_class(), "empty alphabet: {state:?}");
    assert!(state.length_bounds().is_within(DEFAULT_LENGTH_BOUNDS));
    assert!(state.length_bounds().contains(state.length));
    assert!(state.min_numbers_bounds().is_within(DEFAULT_MIN_COUNT_BOUNDS));
    assert!(state.min_special_bounds().is_within(DEFAULT_MIN_COUNT_BOUNDS));
    assert!(state.min_numbers_bounds().contains(state.min_numbers));
    assert!(state.min_special_bounds().contains(state.min_special));

    if let Some(policy) = policy {
        if policy.require_digits {
            assert!(state.numbers_locked());
            assert!(state.use_numbers);
            assert!(state.min_numbers >= 1);
        }
        if policy.require_symbols {
            assert!(state.special_locked());
            assert!(state.use_special);
            assert!(state.min_special >= 1);
        }
    }
}

// ──────────────────── properties ────────────────────

proptest! {
    #[test]
    fn initialize_yields_valid_state(
        defaults in arb_defaults(),
        policy in proptest::option::of(arb_policy()),
    ) {
        let state = initialize(&defaults, policy.as_ref());
        assert_valid(&state, policy.as_ref());
    }

    #[test]
    fn initialize_is_deterministic_and_idempotent(
        defaults in arb_defaults(),
        policy in proptest::option::of(arb_policy()),
    ) {
        let once = initialize(&defaults, policy.as_ref());
        prop_assert_eq!(&once, &initialize(&defaults, policy.as_ref()));
        prop_assert_eq!(&once, &initialize(&once, policy.as_ref()));
    }

    #[test]
    fn edits_preserve_invariants(
        defaults in arb_defaults(),
        policy in proptest::option::of(arb_policy()),
        edits in proptest::collection::vec(arb_edit(), 0..40),
    ) {
        let mut state = initialize(&defaults, policy.as_ref());
        let bounds = state.length_bounds();
        for edit in edits {
            state = apply_edit(&state, edit);
            assert_valid(&state, policy.as_ref());
            prop_assert_eq!(state.length_bounds(), bounds);
        }
    }

    #[test]
    fn honoured_length_range_narrows_slider(
        min_length in 6u32..64,
        span in 1u32..30,
    ) {
        let policy = PolicyConstraint {
            min_length,
            max_length: min_length + span,
            ..Default::default()
        };
        let state = initialize(&OptionState::default(), Some(&policy));
        let b = state.length_bounds();
        prop_assert_eq!(b.min(), min_length);
        prop_assert_eq!(b.max(), (min_length + span).min(DEFAULT_LENGTH_BOUNDS.max()));
        prop_assert!(b.is_within(DEFAULT_LENGTH_BOUNDS));
        prop_assert!(b.contains(state.length));
    }

    #[test]
    fn setting_length_lands_inside_bounds(value in any::<u32>()) {
        let state = apply_edit(&OptionState::default(), Edit::SetLength { value });
        prop_assert_eq!(state.length, DEFAULT_LENGTH_BOUNDS.clamp(value));
    }
}

