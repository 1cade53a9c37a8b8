//! Usage tracking: event names, host mode, and sinks.

#![allow(missing_docs)]

pub mod jsonl;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use jsonl::{JsonlConfig, JsonlTracker};

/// Events the generator session reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingEvent {
    /// First password produced when the session opens.
    GeneratedPassword,
    /// User asked for a new password.
    RegeneratedPassword,
    /// User copied the current password.
    CopiedGeneratedPassword,
}

impl TrackingEvent {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GeneratedPassword => "GeneratedPassword",
            Self::RegeneratedPassword => "RegeneratedPassword",
            Self::CopiedGeneratedPassword => "CopiedGeneratedPassword",
        }
    }
}

impl fmt::Display for TrackingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host context the session runs in. Only affects which tracking stream an
/// event lands in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    #[default]
    Extension,
    AutofillExtension,
}

impl TrackingMode {
    #[must_use]
    pub const fn from_autofill(autofill: bool) -> Self {
        if autofill {
            Self::AutofillExtension
        } else {
            Self::Extension
        }
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extension => write!(f, "extension"),
            Self::AutofillExtension => write!(f, "autofill_extension"),
        }
    }
}

/// Destination for tracking events. Fire-and-forget.
pub trait TrackingSink {
    fn track(&mut self, mode: TrackingMode, event: TrackingEvent);
}

impl<T: TrackingSink + ?Sized> TrackingSink for Box<T> {
    fn track(&mut self, mode: TrackingMode, event: TrackingEvent) {
        (**self).track(mode, event);
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTracker;

impl TrackingSink for NullTracker {
    fn track(&mut self, _mode: TrackingMode, _event: TrackingEvent) {}
}

/// Records events in memory, in order.
#[derive(Debug, Clone, Default)]
pub struct MemoryTracker {
    events: Vec<(TrackingMode, TrackingEvent)>,
}

impl MemoryTracker {
    #[must_use]
    pub fn events(&self) -> &[(TrackingMode, TrackingEvent)] {
        &self.events
    }

    /// How many times `event` was tracked, in any mode.
    #[must_use]
    pub fn count(&self, event: TrackingEvent) -> usize {
        self.events.iter().filter(|(_, e)| *e == event).count()
    }
}

impl TrackingSink for MemoryTracker {
    fn track(&mut self, mode: TrackingMode, event: TrackingEvent) {
        self.events.push((mode, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_stable() {
        assert_eq!(TrackingEvent::GeneratedPassword.name(), "GeneratedPassword");
        assert_eq!(
            TrackingEvent::RegeneratedPassword.to_string(),
            "RegeneratedPassword"
        );
        assert_eq!(
            TrackingEvent::CopiedGeneratedPassword.name(),
            "CopiedGeneratedPassword"
        );
    }

    #[test]
    fn mode_from_autofill_flag() {
        assert_eq!(
            TrackingMode::from_autofill(true),
            TrackingMode::AutofillExtension
        );
        assert_eq!(TrackingMode::from_autofill(false), TrackingMode::Extension);
    }

    #[test]
    fn memory_tracker_counts_per_event() {
        let mut tracker = MemoryTracker::default();
        tracker.track(TrackingMode::Extension, TrackingEvent::GeneratedPassword);
        tracker.track(
            TrackingMode::Extension,
            TrackingEvent::CopiedGeneratedPassword,
        );
        tracker.track(
            TrackingMode::Extension,
            TrackingEvent::CopiedGeneratedPassword,
        );
        assert_eq!(tracker.count(TrackingEvent::CopiedGeneratedPassword), 2);
        assert_eq!(tracker.count(TrackingEvent::RegeneratedPassword), 0);
        assert_eq!(tracker.events().len(), 3);
    }
}
