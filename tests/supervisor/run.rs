use std::fs::read_to_string;

use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use rstest::rstest;

use ralph_lib::task::TaskStatus;

use crate::helper::*;

/// A short command is started, and reported as completed once it finished.
#[test]
fn test_run_and_complete() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();

    let task = supervisor.create("sleep 1", "sleeper", None)?;
    assert_eq!(task.id, "ralph_0001");
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.timeout, 300);
    assert!(task.pid > 0);
    assert!(task.output_file.exists());
    assert_eq!(task.output_file, env.log_dir().join("ralph_0001.log"));

    // The record has been persisted before `create` returned.
    let stored = env.supervisor().get(&task.id)?.context("Task wasn't stored")?;
    assert_eq!(stored, task);

    let task = wait_for_status(&supervisor, &task.id, TaskStatus::Completed)?;
    assert_eq!(task.exit_code, Some(0));
    assert!(task.completed_at.is_some());

    Ok(())
}

/// The real exit code of a finished command is recorded.
#[rstest]
#[case("true", 0)]
#[case("exit 1", 1)]
#[case("false", 1)]
#[case("exit 42", 42)]
fn test_exit_codes(#[case] command: &str, #[case] expected: i32) -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();

    let task = supervisor.create(command, "exit", Some(10))?;
    let task = wait_for_status(&supervisor, &task.id, TaskStatus::Completed)?;
    assert_eq!(task.exit_code, Some(expected));
    assert_eq!(task.timeout, 10);

    Ok(())
}

/// Stdout and stderr end up in the same log file.
#[test]
fn test_output_is_logged() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();

    let task = supervisor.create("echo out; echo err >&2", "output", None)?;
    let task = wait_for_status(&supervisor, &task.id, TaskStatus::Completed)?;

    let output = read_to_string(&task.output_file)?;
    assert!(output.contains("out\n"));
    assert!(output.contains("err\n"));

    Ok(())
}

/// Tasks are executed in the project root.
#[test]
fn test_working_directory_is_root() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();

    let task = supervisor.create("pwd", "pwd", None)?;
    let task = wait_for_status(&supervisor, &task.id, TaskStatus::Completed)?;

    let output = read_to_string(&task.output_file)?;
    let root = env.root().canonicalize()?;
    assert_eq!(output.trim(), root.to_string_lossy());

    Ok(())
}

/// Ids keep increasing across invocations and are never reused, even after cleaning.
#[test]
fn test_ids_are_strictly_increasing() -> Result<()> {
    let env = base_setup()?;

    let first = env.supervisor().create("true", "first", None)?;
    let second = env.supervisor().create("true", "second", None)?;
    wait_for_status(&env.supervisor(), &first.id, TaskStatus::Completed)?;
    wait_for_status(&env.supervisor(), &second.id, TaskStatus::Completed)?;

    env.supervisor().clean(true)?;
    let third = env.supervisor().create("true", "third", None)?;

    assert_eq!(first.id, "ralph_0001");
    assert_eq!(second.id, "ralph_0002");
    assert_eq!(third.id, "ralph_0003");

    Ok(())
}

/// A command that cannot be spawned is recorded as failed, with the reason in its log.
#[test]
fn test_spawn_failure() -> Result<()> {
    let mut env = base_setup()?;
    env.settings.root_path = env.tempdir.path().join("does_not_exist");
    // The state must not live in the missing root, it would be created on save.
    env.settings.ralph.state_file = env.tempdir.path().join("state.json");
    let supervisor = env.supervisor();

    let task = supervisor.create("true", "broken", None)?;
    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.completed_at.is_some());
    assert_eq!(task.exit_code, None);

    let output = read_to_string(&task.output_file)?;
    assert!(output.contains("failed to spawn task"));

    // The failed task is persisted and never changes again.
    let checked = supervisor.check(&task.id)?.context("Task wasn't stored")?;
    assert_eq!(checked, task);

    Ok(())
}
