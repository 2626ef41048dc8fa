use std::fs::{self, File};
use std::io::Write;
use std::process::Stdio;

use anyhow::{Context, Result};
use log::{error, info, trace};

use ralph_lib::log::{create_log_file_handles, get_exit_code_path, get_log_path};
use ralph_lib::process_helper::{compile_shell_command, detach};
use ralph_lib::settings::Settings;
use ralph_lib::task::Task;

/// Actually spawn a new task process.
///
/// The process is started in its own session, so it outlives the current invocation.
/// Its merged stdout and stderr are written to the task's log file, which is created before
/// the process is spawned. This function doesn't wait for the process in any way.
///
/// If the command cannot be spawned, the error is written to the log file and a task in
/// `Failed` state is returned. Only errors that prevent the creation of the log file are
/// propagated.
pub fn spawn_task(
    settings: &Settings,
    task_id: &str,
    name: &str,
    command_string: &str,
    timeout: u64,
) -> Result<Task> {
    let log_dir = settings.log_directory();
    let log_path = get_log_path(task_id, &log_dir);

    let (stdout_log, stderr_log) = create_log_file_handles(task_id, &log_dir)
        .context(format!("Failed to create log file for task {task_id}"))?;

    // The log directory might contain leftovers of a state that has been lost.
    let exit_code_path = get_exit_code_path(task_id, &log_dir);
    if exit_code_path.exists() {
        fs::remove_file(&exit_code_path)
            .context(format!("Failed to remove stale exit code file {exit_code_path:?}"))?;
    }

    let mut command = compile_shell_command(command_string, &exit_code_path);
    command
        .current_dir(&settings.root_path)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_log))
        .stderr(Stdio::from(stderr_log));
    detach(&mut command);

    let mut task = Task::new(
        task_id.to_string(),
        name.to_string(),
        command_string.to_string(),
        0,
        timeout,
        log_path.clone(),
    );

    match command.spawn() {
        Ok(child) => {
            task.pid = child.id();
            info!("Started task {task_id} with pid {}: {command_string}", task.pid);
        }
        Err(err) => {
            error!("Failed to spawn task {task_id}: {err:?}");
            trace!("Command that failed: {command:?}");

            // Write some debug output to the task's log file.
            let log_output = format!("Ralph error, failed to spawn task. Check your command.\n{err}\n");
            let write_result = File::options()
                .append(true)
                .open(&log_path)
                .and_then(|mut file| file.write_all(log_output.as_bytes()));
            if let Err(write_err) = write_result {
                error!("Failed to write spawn error to task log: {write_err}");
            }

            task.fail();
        }
    }

    Ok(task)
}
