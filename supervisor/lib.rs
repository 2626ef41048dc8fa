//! The task lifecycle supervisor behind the `ralph` binary.
//!
//! Every invocation of `ralph` is short-lived. It creates a [Supervisor], performs exactly
//! one operation and exits. All knowledge about tasks lives in the state file, which is
//! accessed through a [Store](store::Store), so later invocations can look at and control
//! the processes that were started by earlier ones.
use ralph_lib::settings::Settings;

use crate::store::{FileStore, Store};

/// Remove finished tasks and their log files.
pub mod cleaner;
/// Start a task's command as a detached process.
pub mod launcher;
/// Read the output of a task.
pub mod output;
/// Detect finished processes and reconcile their exit status.
pub mod probe;
/// Create, get and list tasks.
pub mod registry;
/// Load and persist the state document.
pub mod store;
/// Stop a task's process group.
pub mod terminator;

/// Entry point for all task operations.
///
/// The settings are resolved once on startup and handed in explicitly,
/// there's no global configuration.
pub struct Supervisor<S: Store = FileStore> {
    settings: Settings,
    store: S,
}

impl Supervisor<FileStore> {
    /// Create a supervisor that persists its state in the state file of the given settings.
    pub fn from_settings(settings: Settings) -> Self {
        let store = FileStore::new(settings.state_file());
        Supervisor::new(settings, store)
    }
}

impl<S: Store> Supervisor<S> {
    pub fn new(settings: Settings, store: S) -> Self {
        Supervisor { settings, store }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
