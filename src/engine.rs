//! Session driver: wires the option store, generator, tracker, and clipboard
//! around the pure reconciliation rules.
//!
//! One engine lives for one editing session. Every event runs to completion
//! (reconcile → generate → hand the values to the store) before the next is
//! taken; `&mut self` makes that the only possible schedule. The store writes
//! off the session's thread and is joined in [`ReconciliationEngine::close`].
//! Hosts with a faster event source queue events and feed them through
//! [`ReconciliationEngine::drain`].

#![allow(missing_docs)]

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::clipboard::Clipboard;
use crate::generator::PasswordGenerator;
use crate::list::{ActionRow, ListModel, RowInput, RowRef, action_at, field_at};
use crate::options::policy::PolicyConstraint;
use crate::options::reconcile::{EditReport, apply_edit_in_place, initialize};
use crate::options::state::{Edit, OptionState};
use crate::store::OptionStore;
use crate::tracking::{TrackingEvent, TrackingMode, TrackingSink};

/// Text shown on the copy confirmation.
pub const COPIED_NOTICE: &str = "Copied";
/// Copy confirmation lifetime when the host doesn't choose one.
pub const DEFAULT_NOTICE_TIMEOUT: Duration = Duration::from_secs(2);

/// External capabilities injected at construction.
pub struct Collaborators<S, G, T, C> {
    pub store: S,
    pub generator: G,
    pub tracker: T,
    pub clipboard: C,
}

/// Per-session host settings.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub mode: TrackingMode,
    pub notice_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: TrackingMode::default(),
            notice_timeout: DEFAULT_NOTICE_TIMEOUT,
        }
    }
}

/// What the password label shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PasswordDisplay {
    Generated { password: String },
    /// Generation failed; the label shows a placeholder and the error.
    Failed { code: &'static str, message: String },
}

impl PasswordDisplay {
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        match self {
            Self::Generated { password } => Some(password),
            Self::Failed { .. } => None,
        }
    }
}

/// Transient confirmation that dismisses itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: &'static str,
    pub expires_at: Instant,
}

/// Result of activating a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Regenerated,
    Copied,
    /// Copy was requested while no password is displayed.
    NothingToCopy,
    CopyFailed { details: String },
    /// Row has no action.
    None,
}

/// One serialized input to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A direct edit, already in engine terms.
    Edit(Edit),
    /// A widget on an option row reported a new value.
    Input { at: RowRef, input: RowInput },
    /// A row was tapped.
    Select(RowRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    Edited { report: EditReport },
    Activated { activation: Activation },
    /// The event did not address anything editable.
    Ignored,
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// Hand the current password back to the host.
    Select,
    Cancel,
}

/// Reconciled option state plus the collaborators that act on it.
pub struct ReconciliationEngine<S, G, T, C> {
    ports: Collaborators<S, G, T, C>,
    settings: SessionSettings,
    state: OptionState,
    display: PasswordDisplay,
    notice: Option<Notice>,
}

impl<S, G, T, C> ReconciliationEngine<S, G, T, C>
where
    S: OptionStore,
    G: PasswordGenerator,
    T: TrackingSink,
    C: Clipboard,
{
    /// Start a session: load defaults, reconcile against `policy`, produce
    /// the first password.
    pub fn open(
        mut ports: Collaborators<S, G, T, C>,
        policy: Option<&PolicyConstraint>,
        settings: SessionSettings,
    ) -> Self {
        let defaults = ports.store.load().into_state();
        let state = initialize(&defaults, policy);
        let display = generate(&mut ports.generator, &state);
        ports
            .tracker
            .track(settings.mode, TrackingEvent::GeneratedPassword);
        Self {
            ports,
            settings,
            state,
            display,
            notice: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &OptionState {
        &self.state
    }

    #[must_use]
    pub const fn display(&self) -> &PasswordDisplay {
        &self.display
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    #[must_use]
    pub const fn collaborators(&self) -> &Collaborators<S, G, T, C> {
        &self.ports
    }

    #[must_use]
    pub fn list_model(&self) -> ListModel {
        ListModel::build(&self.state)
    }

    /// Apply one edit. A state change regenerates and persists; an edit that
    /// changes nothing (same value, locked class) has no side-effects.
    pub fn apply(&mut self, edit: Edit) -> EditReport {
        let report = apply_edit_in_place(&mut self.state, edit);
        if report.changed {
            self.display = generate(&mut self.ports.generator, &self.state);
            self.ports.store.save(&self.state);
        }
        report
    }

    /// Produce a fresh password for the current options.
    pub fn regenerate(&mut self) {
        self.ports
            .tracker
            .track(self.settings.mode, TrackingEvent::RegeneratedPassword);
        self.display = generate(&mut self.ports.generator, &self.state);
    }

    /// Put the displayed password on the clipboard and raise the
    /// confirmation notice.
    pub fn copy(&mut self, now: Instant) -> Activation {
        let Some(password) = self.display.password() else {
            return Activation::NothingToCopy;
        };
        if let Err(e) = self.ports.clipboard.set_text(password) {
            eprintln!("[PWO-ENGINE] copy failed: {e}");
            return Activation::CopyFailed {
                details: e.to_string(),
            };
        }
        self.ports
            .tracker
            .track(self.settings.mode, TrackingEvent::CopiedGeneratedPassword);
        self.notice = Some(Notice {
            message: COPIED_NOTICE,
            expires_at: now + self.settings.notice_timeout,
        });
        Activation::Copied
    }

    /// Run the action bound to a row, if any.
    pub fn activate(&mut self, at: RowRef, now: Instant) -> Activation {
        match action_at(at) {
            Some(ActionRow::Regenerate) => {
                self.regenerate();
                Activation::Regenerated
            }
            Some(ActionRow::Copy) => self.copy(now),
            None => Activation::None,
        }
    }

    /// Dismiss the notice once its time is up.
    pub fn tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }
    }

    pub fn handle(&mut self, event: SessionEvent, now: Instant) -> EventOutcome {
        self.tick(now);
        match event {
            SessionEvent::Edit(edit) => EventOutcome::Edited {
                report: self.apply(edit),
            },
            SessionEvent::Input { at, input } => {
                match field_at(at).and_then(|field| field.edit_for(input)) {
                    Some(edit) => EventOutcome::Edited {
                        report: self.apply(edit),
                    },
                    None => EventOutcome::Ignored,
                }
            }
            SessionEvent::Select(at) => EventOutcome::Activated {
                activation: self.activate(at, now),
            },
        }
    }

    /// Handle queued events in arrival order, one at a time.
    pub fn drain<I>(&mut self, events: I) -> Vec<EventOutcome>
    where
        I: IntoIterator<Item = SessionEvent>,
    {
        events
            .into_iter()
            .map(|event| self.handle(event, Instant::now()))
            .collect()
    }

    /// End the session, flushing any pending persistence. Returns the
    /// password when the host selected it.
    pub fn close(mut self, exit: SessionExit) -> (Option<String>, Collaborators<S, G, T, C>) {
        self.ports.store.flush();
        let selected = match exit {
            SessionExit::Select => self.display.password().map(str::to_string),
            SessionExit::Cancel => None,
        };
        (selected, self.ports)
    }
}

fn generate<G: PasswordGenerator>(generator: &mut G, state: &OptionState) -> PasswordDisplay {
    match generator.generate(&state.request()) {
        Ok(password) => PasswordDisplay::Generated { password },
        Err(e) => {
            eprintln!("[PWO-ENGINE] generation failed: {e}");
            PasswordDisplay::Failed {
                code: e.code(),
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::core::errors::{PwoError, Result};
    use crate::generator::RandomPasswordGenerator;
    use crate::options::state::{CharClass, GenerationRequest};
    use crate::store::{MemoryStore, StoredOptions};
    use crate::tracking::MemoryTracker;

    type TestEngine = ReconciliationEngine<
        MemoryStore,
        RandomPasswordGenerator<StdRng>,
        MemoryTracker,
        MemoryClipboard,
    >;

    fn open_with(stored: StoredOptions, policy: Option<&PolicyConstraint>) -> TestEngine {
        ReconciliationEngine::open(
            Collaborators {
                store: MemoryStore::new(stored),
                generator: RandomPasswordGenerator::with_rng(StdRng::seed_from_u64(1)),
                tracker: MemoryTracker::default(),
                clipboard: MemoryClipboard::default(),
            },
            policy,
            SessionSettings::default(),
        )
    }

    fn open() -> TestEngine {
        open_with(StoredOptions::default(), None)
    }

    #[test]
    fn open_generates_and_tracks_once() {
        let engine = open();
        assert_eq!(engine.display().password().map(str::len), Some(10));
        let tracker = &engine.collaborators().tracker;
        assert_eq!(tracker.count(TrackingEvent::GeneratedPassword), 1);
        assert_eq!(tracker.events().len(), 1);
        assert_eq!(engine.collaborators().store.save_count(), 0);
    }

    #[test]
    fn changing_edit_regenerates_and_persists() {
        let mut engine = open();
        let report = engine.apply(Edit::SetLength { value: 24 });
        assert!(report.changed);
        assert_eq!(engine.display().password().map(str::len), Some(24));
        let store = &engine.collaborators().store;
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.values().length, 24);
    }

    #[test]
    fn no_op_edit_has_no_side_effects() {
        let mut engine = open();
        let before = engine.display().clone();
        let report = engine.apply(Edit::SetLength { value: 10 });
        assert!(!report.changed);
        assert_eq!(engine.display(), &before);
        assert_eq!(engine.collaborators().store.save_count(), 0);
    }

    #[test]
    fn locked_toggle_is_ignored_without_saving() {
        let policy = PolicyConstraint {
            require_symbols: true,
            ..Default::default()
        };
        let mut engine = open_with(StoredOptions::default(), Some(&policy));
        let report = engine.apply(Edit::ToggleClass {
            class: CharClass::Special,
        });
        assert!(report.ignored_locked);
        assert!(engine.state().use_special);
        assert_eq!(engine.collaborators().store.save_count(), 0);
    }

    #[test]
    fn regenerate_row_tracks_event() {
        let mut engine = open();
        let activation = engine.activate(RowRef::new(0, 0), Instant::now());
        assert_eq!(activation, Activation::Regenerated);
        assert_eq!(
            engine
                .collaborators()
                .tracker
                .count(TrackingEvent::RegeneratedPassword),
            1
        );
    }

    #[test]
    fn copy_row_writes_clipboard_and_raises_notice() {
        let mut engine = open();
        let now = Instant::now();
        let shown = engine.display().password().map(str::to_string);

        assert_eq!(engine.activate(RowRef::new(0, 1), now), Activation::Copied);
        assert_eq!(
            engine.collaborators().clipboard.contents(),
            shown.as_deref()
        );
        let notice = engine.notice().cloned().unwrap();
        assert_eq!(notice.message, COPIED_NOTICE);

        engine.tick(now + Duration::from_millis(500));
        assert!(engine.notice().is_some());
        engine.tick(now + DEFAULT_NOTICE_TIMEOUT);
        assert!(engine.notice().is_none());
    }

    #[test]
    fn option_rows_have_no_activation() {
        let mut engine = open();
        assert_eq!(
            engine.activate(RowRef::new(1, 2), Instant::now()),
            Activation::None
        );
        assert_eq!(engine.collaborators().tracker.events().len(), 1);
    }

    #[test]
    fn infeasible_minimums_surface_as_failed_display() {
        let stored = StoredOptions {
            length: 5,
            min_numbers: 3,
            min_special: 3,
            ..Default::default()
        };
        let mut engine = open_with(stored, None);
        assert!(matches!(
            engine.display(),
            PasswordDisplay::Failed {
                code: "PWO-2003",
                ..
            }
        ));
        assert_eq!(
            engine.copy(Instant::now()),
            Activation::NothingToCopy
        );

        engine.apply(Edit::SetLength { value: 8 });
        assert!(engine.display().password().is_some());
    }

    #[test]
    fn input_events_route_through_row_mapping() {
        let mut engine = open();
        let outcome = engine.handle(
            SessionEvent::Input {
                at: RowRef::new(1, 1),
                input: RowInput::Switch(false),
            },
            Instant::now(),
        );
        assert!(matches!(outcome, EventOutcome::Edited { report } if report.changed));
        assert!(!engine.state().use_uppercase);

        let ignored = engine.handle(
            SessionEvent::Input {
                at: RowRef::new(0, 0),
                input: RowInput::Number(3),
            },
            Instant::now(),
        );
        assert_eq!(ignored, EventOutcome::Ignored);
    }

    #[test]
    fn drain_processes_events_in_order() {
        let mut engine = open();
        let outcomes = engine.drain([
            SessionEvent::Edit(Edit::SetLength { value: 30 }),
            SessionEvent::Edit(Edit::SetLength { value: 12 }),
            SessionEvent::Select(RowRef::new(0, 0)),
        ]);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(engine.state().length, 12);
        assert_eq!(engine.collaborators().store.values().length, 12);
        assert_eq!(engine.display().password().map(str::len), Some(12));
    }

    #[test]
    fn close_returns_selected_password() {
        let engine = open();
        let shown = engine.display().password().map(str::to_string);
        let (selected, _) = engine.close(SessionExit::Select);
        assert_eq!(selected, shown);

        let (cancelled, _) = open().close(SessionExit::Cancel);
        assert_eq!(cancelled, None);
    }

    struct FailingClipboard;

    impl Clipboard for FailingClipboard {
        fn set_text(&mut self, _text: &str) -> Result<()> {
            Err(PwoError::Clipboard {
                details: "no terminal".to_string(),
            })
        }
    }

    struct RecordingGenerator {
        requests: Vec<GenerationRequest>,
    }

    impl PasswordGenerator for RecordingGenerator {
        fn generate(&mut self, request: &GenerationRequest) -> Result<String> {
            self.requests.push(*request);
            Ok("x".repeat(request.length as usize))
        }
    }

    #[test]
    fn failed_copy_neither_tracks_nor_notifies() {
        let mut engine = ReconciliationEngine::open(
            Collaborators {
                store: MemoryStore::default(),
                generator: RecordingGenerator {
                    requests: Vec::new(),
                },
                tracker: MemoryTracker::default(),
                clipboard: FailingClipboard,
            },
            None,
            SessionSettings::default(),
        );
        let activation = engine.copy(Instant::now());
        assert!(matches!(activation, Activation::CopyFailed { .. }));
        assert!(engine.notice().is_none());
        assert_eq!(
            engine
                .collaborators()
                .tracker
                .count(TrackingEvent::CopiedGeneratedPassword),
            0
        );
    }

    #[test]
    fn autofill_mode_tags_events() {
        let engine = ReconciliationEngine::open(
            Collaborators {
                store: MemoryStore::default(),
                generator: RecordingGenerator {
                    requests: Vec::new(),
                },
                tracker: MemoryTracker::default(),
                clipboard: MemoryClipboard::default(),
            },
            None,
            SessionSettings {
                mode: TrackingMode::AutofillExtension,
                ..Default::default()
            },
        );
        assert_eq!(
            engine.collaborators().tracker.events(),
            &[(
                TrackingMode::AutofillExtension,
                TrackingEvent::GeneratedPassword
            )]
        );
        assert_eq!(engine.collaborators().generator.requests.len(), 1);
    }
}
