mod helper;
mod state;
mod task;

// Re-exports
pub use self::state::print_tasks;
pub use self::task::{print_started_task, print_task};
