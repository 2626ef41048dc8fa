use anyhow::Result;
use chrono::Local;
use log::debug;

use ralph_lib::task::Task;

use crate::launcher::spawn_task;
use crate::probe::probe_task;
use crate::store::Store;
use crate::Supervisor;

/// Finished tasks that started within this window are still shown by default.
pub const RECENT_TASK_WINDOW_SECONDS: i64 = 24 * 60 * 60;

impl<S: Store> Supervisor<S> {
    /// Start a new task and persist it.
    ///
    /// The process is launched before the record is written.
    /// `timeout` falls back to the configured default and is never enforced.
    pub fn create(&self, command: &str, name: &str, timeout: Option<u64>) -> Result<Task> {
        let timeout = timeout.unwrap_or(self.settings.ralph.default_timeout);

        let task = self.store.update(|state| -> Result<Task> {
            let task_id = state.generate_task_id();
            let task = spawn_task(&self.settings, &task_id, name, command, timeout)?;
            state.add_task(task.clone());

            Ok(task)
        })??;

        Ok(task)
    }

    /// Get a task by its id, exactly as it's stored.
    pub fn get(&self, task_id: &str) -> Result<Option<Task>> {
        let state = self.store.load()?;
        Ok(state.tasks.get(task_id).cloned())
    }

    /// List tasks, most recently started first.
    ///
    /// All running tasks are probed beforehand, so their status is current.
    /// Unless `show_all` is set, only running tasks and tasks that started within the last
    /// 24 hours are returned. Hidden tasks aren't removed from the state.
    pub fn list(&self, show_all: bool) -> Result<Vec<Task>> {
        let log_dir = self.settings.log_directory();
        let state = self.store.update(|state| {
            for task in state.tasks.values_mut() {
                probe_task(task, &log_dir);
            }
            state.clone()
        })?;

        let now = Local::now();
        let mut tasks: Vec<Task> = state
            .tasks
            .into_values()
            .filter(|task| {
                show_all
                    || task.is_running()
                    || (now - task.started_at).num_seconds() < RECENT_TASK_WINDOW_SECONDS
            })
            .collect();
        debug!("Listing {} tasks", tasks.len());

        tasks.sort_by(|a, b| {
            b.started_at
                .cmp(&a.started_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(tasks)
    }
}
