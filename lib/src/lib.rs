//! Ralph-lib is the shared library used by the `ralph` binary and its supervisor logic.
//!
//! It contains common components such as:
//!
//! - Everything about the [Task](task::Task) and its [TaskStatus](task::TaskStatus).
//! - The [State](state::State), which is the document persisted between invocations.
//! - Helper to create, read and clean up task log files.
//! - Platform specific process handling.
//! - The [Settings](settings::Settings) and their default values.

/// Ralph lib's own Error implementation.
pub mod error;
/// Helper functions to create, read and remove the log files of tasks.
pub mod log;
/// Platform specific code, mainly used to get platform specific directories.
mod platform;
/// Everything that interacts with the OS process of a task.
pub mod process_helper;
/// This module contains all platform unspecific default values for our setting representation.
mod setting_defaults;
/// Ralph's representation of configuration and their default settings.
pub mod settings;
/// The document that's persisted in the state file.
pub mod state;
/// Everything regarding Ralph's task
pub mod task;
