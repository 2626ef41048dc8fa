use std::path::Path;

use anyhow::Result;
use log::{debug, info};

use ralph_lib::log::read_exit_code;
use ralph_lib::process_helper::{get_task_process_group, process_exists, try_reap};
use ralph_lib::task::Task;

use crate::store::Store;
use crate::Supervisor;

impl<S: Store> Supervisor<S> {
    /// Get a task and bring its status up to date.
    ///
    /// If the task's process has exited since the last look, the task is transitioned to
    /// `Completed` and the change is persisted. Finished tasks are returned unchanged.
    pub fn check(&self, task_id: &str) -> Result<Option<Task>> {
        let log_dir = self.settings.log_directory();
        let task = self.store.update(|state| -> Option<Task> {
            let task = state.tasks.get_mut(task_id)?;
            probe_task(task, &log_dir);
            Some(task.clone())
        })?;

        Ok(task)
    }
}

/// Check whether the process of a task is still alive.
///
/// A pid whose process group differs from the pid itself has been recycled by an
/// unrelated process, as tasks always lead their own group.
fn task_process_is_alive(task: &Task) -> bool {
    if !process_exists(task.pid) {
        return false;
    }

    get_task_process_group(task.pid).is_ok()
}

/// Determine the exit code of a task whose process is gone.
///
/// If the process is our own child, the real status can be reaped directly.
/// Otherwise the code that the wrapper shell wrote on exit is used.
/// A process that vanished without either is assumed to have succeeded.
fn reconcile_exit_code(task: &Task, log_dir: &Path) -> i32 {
    if let Some(code) = try_reap(task.pid) {
        debug!("Reaped exit code {code} of task {}", task.id);
        return code;
    }

    if let Some(code) = read_exit_code(&task.id, log_dir) {
        debug!("Read exit code {code} of task {} from its exit file", task.id);
        return code;
    }

    info!(
        "Task {} is gone without an exit code, assuming it succeeded",
        task.id
    );
    0
}

/// Update a single running task, if its process has finished.
///
/// Returns `true` if the task has been transitioned.
/// Tasks that aren't running are never touched.
pub fn probe_task(task: &mut Task, log_dir: &Path) -> bool {
    if !task.is_running() {
        return false;
    }

    if task_process_is_alive(task) {
        return false;
    }

    let exit_code = reconcile_exit_code(task, log_dir);
    info!("Task {} finished with exit code {exit_code}", task.id);
    task.complete(exit_code)
}
