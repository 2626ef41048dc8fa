use anyhow::Result;
use log::debug;

use ralph_lib::log::read_last_lines;

use crate::store::Store;
use crate::Supervisor;

impl<S: Store> Supervisor<S> {
    /// Get the last `lines` lines of a task's output. `0` or less returns the full output.
    ///
    /// Problems that concern the task itself are reported as a readable message instead
    /// of an error, so they can be shown to the user as is.
    /// Only a failure to access the state is returned as an error.
    pub fn tail(&self, task_id: &str, lines: i64) -> Result<String> {
        let Some(task) = self.get(task_id)? else {
            return Ok(format!("Task {task_id} not found"));
        };

        if !task.output_file.exists() {
            debug!("Log file {:?} of task {task_id} is missing", task.output_file);
            return Ok("No output file found".to_string());
        }

        let amount = usize::try_from(lines).unwrap_or(0);
        match read_last_lines(&task.output_file, amount) {
            Ok(output) => Ok(output),
            Err(err) => Ok(format!("Error reading output: {err}")),
        }
    }
}
