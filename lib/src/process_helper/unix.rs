use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

use log::{debug, info};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{getpgid, setsid, Pid};

use super::ProcessAction;
use crate::error::Error;

/// The wrapper around a task's command.
///
/// `$1` is the user's command, `$2` the file that receives the exit code.
/// Passing both as positional parameters means the command never has to be re-quoted.
const EXIT_CODE_WRAPPER: &str = r#"sh -c "$1"; code=$?; printf '%s\n' "$code" > "$2"; exit "$code""#;

/// Build the `sh -c` invocation for a task's command.
///
/// The command runs in a wrapper shell, which writes the command's exit code into
/// `exit_code_file` once it finishes.
pub fn compile_shell_command(command_string: &str, exit_code_file: &Path) -> Command {
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(EXIT_CODE_WRAPPER)
        .arg("ralph")
        .arg(command_string)
        .arg(exit_code_file);

    command
}

/// Start the child in a new session.
/// This makes it the leader of a new process group, which isn't bound to the lifetime
/// or the terminal of the invoking process.
pub fn detach(command: &mut Command) {
    // Safety: `setsid` is async-signal-safe and nothing else happens between fork and exec.
    unsafe {
        command.pre_exec(|| setsid().map(|_| ()).map_err(io::Error::from));
    }
}

/// Convert a stored pid into a nix [Pid].
/// `0` and values that don't fit into a `pid_t` are rejected, as they would address
/// our own process group or no process at all.
fn to_pid(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(pid) if pid > 0 => Some(Pid::from_raw(pid)),
        _ => None,
    }
}

fn get_signal_from_action(action: ProcessAction) -> Signal {
    match action {
        ProcessAction::Terminate => Signal::SIGTERM,
        ProcessAction::Kill => Signal::SIGKILL,
    }
}

/// Get the process group of a task's process.
///
/// Tasks are always started as session leaders, hence their group id equals their pid.
/// If that's not the case, the pid has been recycled by an unrelated process and
/// `ESRCH` is returned, just like for a process that's gone.
pub fn get_task_process_group(pid: u32) -> Result<i32, Error> {
    let Some(nix_pid) = to_pid(pid) else {
        return Err(Error::Generic(format!("Invalid pid {pid}")));
    };

    let pgid = getpgid(Some(nix_pid)).map_err(|err| Error::Signal(nix_pid.as_raw(), err))?;
    if pgid != nix_pid {
        info!("Process {pid} belongs to foreign process group {pgid}, the pid has been reused.");
        return Err(Error::Signal(nix_pid.as_raw(), Errno::ESRCH));
    }

    Ok(pgid.as_raw())
}

/// Send a signal to all processes of a process group.
pub fn send_signal_to_group(pgid: i32, action: ProcessAction) -> Result<(), Error> {
    if pgid <= 0 {
        return Err(Error::Generic(format!("Invalid process group {pgid}")));
    }

    let signal = get_signal_from_action(action);
    debug!("Sending signal {signal} to process group {pgid}");
    signal::killpg(Pid::from_raw(pgid), signal).map_err(|err| Error::Signal(pgid, err))
}

/// Try to collect the exit status of a finished process without blocking.
///
/// This only works if the process is a direct child of the current process.
/// Processes that were started by an earlier invocation have been re-parented and reaped by
/// someone else, in which case `None` is returned.
/// Processes that died by a signal are reported as `-1`.
pub fn try_reap(pid: u32) -> Option<i32> {
    let pid = to_pid(pid)?;

    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::Exited(_, code)) => Some(code),
        Ok(WaitStatus::Signaled(_, signal, _)) => {
            debug!("Process {pid} has been terminated by {signal}");
            Some(-1)
        }
        Ok(_) => None,
        Err(Errno::ECHILD) => None,
        Err(err) => {
            debug!("Failed to reap process {pid}: {err}");
            None
        }
    }
}

/// Check, whether a specific process exists or not.
/// This is a non-destructive signal `0` probe.
#[cfg(not(target_os = "linux"))]
pub fn process_exists(pid: u32) -> bool {
    match to_pid(pid) {
        Some(pid) => signal::kill(pid, None).is_ok(),
        None => false,
    }
}

/// Check whether any member of a process group is still alive.
#[cfg(not(target_os = "linux"))]
pub fn group_is_alive(pgrp: i32) -> bool {
    pgrp > 0 && signal::killpg(Pid::from_raw(pgrp), None).is_ok()
}
