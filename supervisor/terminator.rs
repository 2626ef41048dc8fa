use std::thread::sleep;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use nix::errno::Errno;

use ralph_lib::error::Error;
use ralph_lib::process_helper::{
    get_task_process_group, group_is_alive, send_signal_to_group, try_reap, ProcessAction,
};

use crate::store::Store;
use crate::Supervisor;

/// How a process group has been brought down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The group exited after SIGTERM.
    Graceful,
    /// Some members were still alive after the grace period and received SIGKILL.
    Forced,
}

/// Terminate a whole process group.
///
/// The group receives SIGTERM first. If any member is still alive after `grace`,
/// the group is killed with SIGKILL.
pub fn terminate_group(pgid: i32, grace: Duration) -> Result<Termination, Error> {
    send_signal_to_group(pgid, ProcessAction::Terminate)?;
    sleep(grace);

    if !group_is_alive(pgid) {
        debug!("Process group {pgid} exited gracefully");
        return Ok(Termination::Graceful);
    }

    info!("Process group {pgid} survived SIGTERM, sending SIGKILL");
    match send_signal_to_group(pgid, ProcessAction::Kill) {
        Ok(()) => Ok(Termination::Forced),
        // The last member exited between our check and the signal.
        Err(Error::Signal(_, Errno::ESRCH)) => Ok(Termination::Graceful),
        Err(err) => Err(err),
    }
}

impl<S: Store> Supervisor<S> {
    /// Stop a running task and its whole process group.
    ///
    /// Returns `false` if the task doesn't exist, isn't running, or its process couldn't be
    /// signaled. A task whose process is already gone is left for `check` to reconcile.
    ///
    /// The state isn't locked while waiting for the process group to exit.
    /// If another invocation finished the task in the meantime, its status is kept.
    pub fn kill(&self, task_id: &str) -> Result<bool> {
        let state = self.store.load()?;
        let Some(task) = state.tasks.get(task_id) else {
            debug!("Cannot kill unknown task {task_id}");
            return Ok(false);
        };
        if !task.is_running() {
            debug!("Cannot kill task {task_id} with status {}", task.status);
            return Ok(false);
        }
        let pid = task.pid;

        let pgid = match get_task_process_group(pid) {
            Ok(pgid) => pgid,
            Err(err) => {
                warn!("Failed to find process group of task {task_id}: {err}");
                return Ok(false);
            }
        };

        let grace = self.settings.ralph.kill_grace_period();
        match terminate_group(pgid, grace) {
            Ok(termination) => info!("Terminated task {task_id} ({termination:?})"),
            Err(err) => {
                warn!("Failed to terminate task {task_id}: {err}");
                return Ok(false);
            }
        }

        // Don't leave a zombie behind, if the task has been started by this very process.
        try_reap(pid);

        let killed = self.store.update(|state| match state.tasks.get_mut(task_id) {
            Some(task) => task.kill(),
            None => false,
        })?;
        if !killed {
            debug!("Task {task_id} finished while it was being killed");
        }

        Ok(true)
    }
}
