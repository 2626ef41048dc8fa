use std::collections::BTreeSet;

use anyhow::Result;
use log::{info, warn};

use ralph_lib::log::clean_orphaned_logs;

use crate::store::Store;
use crate::Supervisor;

impl<S: Store> Supervisor<S> {
    /// Remove finished tasks from the state and delete their log files.
    ///
    /// With `keep_running`, running tasks and their logs are kept. Otherwise every task
    /// is dropped, even if its process is still alive.
    /// Running tasks aren't probed beforehand, so tasks that finished unnoticed are kept.
    ///
    /// Returns the amount of removed tasks.
    pub fn clean(&self, keep_running: bool) -> Result<usize> {
        let log_dir = self.settings.log_directory();

        let removed = self.store.update(|state| {
            let removed = state.retain_tasks(|task| keep_running && task.is_running());
            let retained: BTreeSet<String> = state.tasks.keys().cloned().collect();

            // Logs are removed while the state is still locked.
            // Otherwise we might delete the log of a task that's being created right now.
            match clean_orphaned_logs(&log_dir, &retained) {
                Ok(files) => info!("Removed {files} log files"),
                Err(err) => warn!("Failed to clean up log directory {log_dir:?}: {err}"),
            }

            removed
        })?;

        info!("Removed {removed} tasks");
        Ok(removed)
    }
}
