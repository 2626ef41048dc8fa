//! Subprocess handling is platform specific code.
//!
//! The submodules of this module represent the different implementations for
//! each supported platform.
//! Depending on the target, the respective platform is read and loaded into this scope.
//!
//! Ralph only supports unix-like systems, since it relies on sessions and process groups.

// Unix specific process handling
// Shared between Linux and all other unix-like systems
mod unix;
pub use self::unix::*;

// Linux specific process support via `/proc`
#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use self::linux::{get_process_group_pids, group_is_alive, process_exists};

/// The signals that're used during the termination of a task.
/// The intend is to keep any platform specific types out of the top level code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessAction {
    /// Ask the process group to shut down.
    Terminate,
    /// Forcefully kill the process group.
    Kill,
}
