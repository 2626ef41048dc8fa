use std::fs;

use anyhow::Result;
use pretty_assertions::assert_eq;

use ralph_lib::task::TaskStatus;

use crate::helper::*;

/// Finished tasks and their logs are removed, running tasks and their logs are kept.
#[test]
fn test_clean_keeps_running_tasks() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();

    let running = supervisor.create("sleep 60", "running", None)?;
    let first = supervisor.create("true", "first", None)?;
    let second = supervisor.create("exit 1", "second", None)?;
    wait_for_status(&supervisor, &first.id, TaskStatus::Completed)?;
    wait_for_status(&supervisor, &second.id, TaskStatus::Completed)?;

    // Files that don't belong to ralph are never touched.
    let foreign_file = env.log_dir().join("notes.txt");
    fs::write(&foreign_file, "keep me")?;

    assert_eq!(supervisor.clean(true)?, 2);

    let tasks = supervisor.list(true)?;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, running.id);

    assert!(running.output_file.exists());
    assert!(!first.output_file.exists());
    assert!(!second.output_file.exists());
    assert!(foreign_file.exists());

    supervisor.kill(&running.id)?;
    Ok(())
}

/// Cleaning everything drops running tasks as well, without touching their processes.
#[test]
fn test_clean_all() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();

    let running = supervisor.create("sleep 60", "running", None)?;
    let finished = supervisor.create("true", "finished", None)?;
    wait_for_status(&supervisor, &finished.id, TaskStatus::Completed)?;

    assert_eq!(supervisor.clean(false)?, 2);
    assert!(supervisor.list(true)?.is_empty());
    assert!(!running.output_file.exists());

    // The process is still alive and has to be stopped by hand.
    let pgid = ralph_lib::process_helper::get_task_process_group(running.pid)?;
    ralph_lib::process_helper::send_signal_to_group(
        pgid,
        ralph_lib::process_helper::ProcessAction::Kill,
    )?;

    Ok(())
}

/// Logs of tasks that have been lost from the state are cleaned up as well.
#[test]
fn test_clean_orphaned_logs() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();
    fs::create_dir_all(env.log_dir())?;
    let orphan_log = env.log_dir().join("ralph_0042.log");
    let orphan_exit = env.log_dir().join("ralph_0042.exit");
    fs::write(&orphan_log, "old output")?;
    fs::write(&orphan_exit, "0\n")?;

    assert_eq!(supervisor.clean(true)?, 0);
    assert!(!orphan_log.exists());
    assert!(!orphan_exit.exists());

    Ok(())
}
