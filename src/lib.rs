#![forbid(unsafe_code)]

//! Password Options (pwopts): option reconciliation for a password generator.
//!
//! The engine merges three sources into one consistent option set:
//! 1. **Stored defaults**: the user's last-used generator settings
//! 2. **Host policy**: required digits/symbols and a permitted length range
//! 3. **Live edits**: switch, slider, and stepper changes during a session
//!
//! and keeps the option set valid (at least one character class, values
//! inside their bounds, policy-required classes locked on) while driving
//! generation, persistence, tracking, and copy.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use password_options::prelude::*;
//! ```
//!
//! The reconciliation rules are plain functions and can be used without the
//! session driver:
//!
//! ```rust,no_run
//! use password_options::options::policy::PolicyConstraint;
//! use password_options::options::reconcile::{apply_edit, initialize};
//! use password_options::options::state::{Edit, OptionState};
//!
//! let policy = PolicyConstraint { require_digits: true, ..Default::default() };
//! let state = initialize(&OptionState::default(), Some(&policy));
//! let next = apply_edit(&state, Edit::SetLength { value: 20 });
//! assert_eq!(next.length, 20);
//! ```

pub mod prelude;

pub mod clipboard;
pub mod core;
pub mod engine;
pub mod generator;
pub mod list;
pub mod options;
pub mod store;
pub mod tracking;
