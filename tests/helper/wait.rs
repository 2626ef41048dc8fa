use anyhow::{bail, Result};

use ralph_lib::task::{Task, TaskStatus};
use ralph_supervisor::Supervisor;

use super::sleep_ms;

/// This is a small helper function, which probes a task in very short intervals, until it
/// reached the expected status.
///
/// Using continuous lookups, we can have a long overall timeout, while still having overall fast
/// tests.
pub fn wait_for_status(
    supervisor: &Supervisor,
    task_id: &str,
    expected_status: TaskStatus,
) -> Result<Task> {
    let tries = 100;
    let mut current_try = 0;
    while current_try <= tries {
        let Some(task) = supervisor.check(task_id)? else {
            bail!("Couldn't find task {task_id} while waiting for status {expected_status}");
        };

        if task.status == expected_status {
            return Ok(task);
        }

        current_try += 1;
        sleep_ms(50);
    }

    bail!("Task {task_id} didn't reach status {expected_status} in about 5 seconds.")
}
