//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use password_options::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{PwoError, Result};

// Options
pub use crate::options::bounds::Bounds;
pub use crate::options::policy::PolicyConstraint;
pub use crate::options::reconcile::{EditReport, apply_edit, initialize};
pub use crate::options::state::{CharClass, Edit, GenerationRequest, OptionState};

// Session
pub use crate::engine::{
    Activation, Collaborators, PasswordDisplay, ReconciliationEngine, SessionEvent, SessionExit,
    SessionSettings,
};
pub use crate::list::{ListModel, RowInput, RowRef};

// Ports
pub use crate::clipboard::{Clipboard, MemoryClipboard, NullClipboard, Osc52Clipboard};
pub use crate::generator::{PasswordGenerator, RandomPasswordGenerator};
pub use crate::store::{JsonFileStore, MemoryStore, OptionStore, StoredOptions};
pub use crate::tracking::{
    JsonlConfig, JsonlTracker, MemoryTracker, NullTracker, TrackingEvent, TrackingMode,
    TrackingSink,
};
