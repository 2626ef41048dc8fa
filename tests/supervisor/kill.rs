use anyhow::{Context, Result};
use pretty_assertions::assert_eq;

use ralph_lib::task::TaskStatus;

use crate::helper::*;

/// Get all living members of a process group.
#[cfg(target_os = "linux")]
fn group_members(pgrp: i32) -> Vec<i32> {
    let Ok(processes) = procfs::process::all_processes() else {
        return Vec::new();
    };

    processes
        .filter_map(|process| process.ok())
        .filter_map(|process| match process.stat() {
            Ok(stat) if stat.pgrp == pgrp && stat.state != 'Z' && stat.state != 'X' => {
                Some(process.pid)
            }
            _ => None,
        })
        .collect()
}

/// Test if killing a running task works as intended.
#[test]
fn test_kill_task() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();
    let task = supervisor.create("sleep 60 & sleep 60; wait", "sleeper", None)?;
    // Give the shell a chance to spawn its children.
    sleep_ms(200);

    assert!(supervisor.kill(&task.id)?);

    let killed = supervisor.get(&task.id)?.context("Task wasn't stored")?;
    assert_eq!(killed.status, TaskStatus::Killed);
    assert_eq!(killed.exit_code, None);
    assert!(killed.completed_at.is_some());

    #[cfg(target_os = "linux")]
    assert_eq!(group_members(task.pid as i32), Vec::<i32>::new());

    Ok(())
}

/// Processes that ignore SIGTERM are killed after the grace period.
#[test]
fn test_kill_escalates_to_sigkill() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();
    let task = supervisor.create("trap '' TERM; sleep 60", "stubborn", None)?;
    // Give the shell a chance to install its trap.
    sleep_ms(300);

    assert!(supervisor.kill(&task.id)?);
    sleep_ms(100);

    let killed = supervisor.check(&task.id)?.context("Task wasn't stored")?;
    assert_eq!(killed.status, TaskStatus::Killed);

    #[cfg(target_os = "linux")]
    assert_eq!(group_members(task.pid as i32), Vec::<i32>::new());

    Ok(())
}

/// Tasks that don't exist or aren't running cannot be killed.
#[test]
fn test_kill_non_running_tasks() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();

    assert!(!supervisor.kill("ralph_9999")?);

    let task = supervisor.create("true", "done", None)?;
    let finished = wait_for_status(&supervisor, &task.id, TaskStatus::Completed)?;
    assert!(!supervisor.kill(&task.id)?);

    // Nothing changed.
    let stored = supervisor.get(&task.id)?.context("Task wasn't stored")?;
    assert_eq!(stored, finished);

    Ok(())
}

/// A task can only be killed once.
#[test]
fn test_kill_twice() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();
    let task = supervisor.create("sleep 60", "sleeper", None)?;

    assert!(supervisor.kill(&task.id)?);
    assert!(!env.supervisor().kill(&task.id)?);

    Ok(())
}
