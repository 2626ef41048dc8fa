use std::path::PathBuf;

use anyhow::Result;
use chrono::{Duration, Local};
use pretty_assertions::assert_eq;

use ralph_lib::task::{Task, TaskStatus};
use ralph_supervisor::store::Store;

use crate::helper::*;

/// Insert a finished task that started `age_hours` ago.
fn add_old_task(env: &TestEnv, name: &str, age_hours: i64) -> Result<String> {
    let id = env.supervisor().store().update(|state| {
        let id = state.generate_task_id();
        let mut task = Task::new(
            id.clone(),
            name.to_string(),
            "true".to_string(),
            // No process will ever have this pid.
            99_999_999,
            300,
            PathBuf::from(format!("/tmp/{id}.log")),
        );
        task.started_at = Local::now() - Duration::hours(age_hours);
        task.complete(0);
        state.add_task(task);
        id
    })?;

    Ok(id)
}

#[test]
fn test_empty_list() -> Result<()> {
    let env = base_setup()?;

    assert!(env.supervisor().list(false)?.is_empty());
    assert!(env.supervisor().list(true)?.is_empty());

    Ok(())
}

/// Tasks are listed with the most recently started task first.
#[test]
fn test_list_order() -> Result<()> {
    let env = base_setup()?;
    let oldest = add_old_task(&env, "oldest", 3)?;
    let newest = add_old_task(&env, "newest", 1)?;
    let middle = add_old_task(&env, "middle", 2)?;

    let ids: Vec<String> = env
        .supervisor()
        .list(false)?
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(ids, vec![newest, middle, oldest]);

    Ok(())
}

/// Old finished tasks are hidden by default, but stay in the state.
#[test]
fn test_list_hides_old_tasks() -> Result<()> {
    let env = base_setup()?;
    let old = add_old_task(&env, "old", 48)?;
    let recent = add_old_task(&env, "recent", 1)?;

    let visible: Vec<String> = env
        .supervisor()
        .list(false)?
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(visible, vec![recent.clone()]);

    let all: Vec<String> = env
        .supervisor()
        .list(true)?
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(all, vec![recent, old]);

    Ok(())
}

/// Listing updates tasks whose process has finished.
#[test]
fn test_list_probes_running_tasks() -> Result<()> {
    let env = base_setup()?;
    let supervisor = env.supervisor();
    let task = supervisor.create("exit 5", "quick", None)?;
    sleep_ms(500);

    let tasks = supervisor.list(false)?;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, TaskStatus::Completed);
    assert_eq!(tasks[0].exit_code, Some(5));

    // The update has been persisted.
    let stored = env.supervisor().get(&task.id)?;
    assert_eq!(stored.map(|task| task.status), Some(TaskStatus::Completed));

    Ok(())
}
