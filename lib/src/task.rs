use std::path::PathBuf;

use chrono::prelude::*;
use serde::{de, de::Deserialize as _, Deserializer};
use serde_derive::{Deserialize, Serialize};
use strum_macros::Display;

/// The prefix of all task ids, e.g. `ralph_0001`.
pub const TASK_ID_PREFIX: &str = "ralph";

/// This enum represents the life-cycle of a supervised task.
///
/// A task starts as `Running` and moves exactly once into one of the terminal states.
/// `Failed` is only used for tasks whose command couldn't be spawned at all.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Display, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    /// The process has been launched and hasn't been observed dead yet.
    Running,
    /// The process exited by itself.
    Completed,
    /// The process group has been terminated by `kill`.
    Killed,
    /// The command couldn't be spawned.
    Failed,
}

/// Representation of a supervised task.
/// `completed_at` and `exit_code` won't be initialized, until the task has reached a terminal state.
#[derive(PartialEq, Eq, Clone, Debug, Deserialize, Serialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub command: String,
    pub pid: u32,
    pub status: TaskStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub started_at: DateTime<Local>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub completed_at: Option<DateTime<Local>>,
    /// Requested time to live in seconds.
    /// This is purely informational, nothing enforces it.
    pub timeout: u64,
    pub output_file: PathBuf,
    /// Best-effort exit code. Defaults to `0`, if the real exit status couldn't be observed.
    pub exit_code: Option<i32>,
}

impl Task {
    /// Create a new running task for an already launched process.
    pub fn new(
        id: String,
        name: String,
        command: String,
        pid: u32,
        timeout: u64,
        output_file: PathBuf,
    ) -> Task {
        Task {
            id,
            name,
            command,
            pid,
            status: TaskStatus::Running,
            started_at: Local::now(),
            completed_at: None,
            timeout,
            output_file,
            exit_code: None,
        }
    }

    /// Whether the task's process is still supposed to be alive.
    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }

    /// Whether the task reached any terminal state.
    pub fn is_done(&self) -> bool {
        !self.is_running()
    }

    /// Transition a running task into `Completed`.
    /// Returns `false` and leaves the task untouched, if it already is in a terminal state.
    pub fn complete(&mut self, exit_code: i32) -> bool {
        self.finish(TaskStatus::Completed, Some(exit_code))
    }

    /// Transition a running task into `Killed`.
    /// Returns `false` and leaves the task untouched, if it already is in a terminal state.
    pub fn kill(&mut self) -> bool {
        self.finish(TaskStatus::Killed, None)
    }

    /// Transition a running task into `Failed`.
    pub fn fail(&mut self) -> bool {
        self.finish(TaskStatus::Failed, None)
    }

    fn finish(&mut self, status: TaskStatus, exit_code: Option<i32>) -> bool {
        if self.is_done() {
            return false;
        }

        self.status = status;
        self.completed_at = Some(Local::now());
        self.exit_code = exit_code;
        true
    }
}

/// Build the id of a task from the current id counter.
pub fn format_task_id(counter: u64) -> String {
    format!("{TASK_ID_PREFIX}_{counter:04}")
}

/// Parse a timestamp as it's found in the state file.
///
/// Current state files use RFC 3339 with an offset.
/// Older state files contain naive ISO-8601 local times (`2024-05-01T12:00:00.123456`),
/// those are interpreted in the local timezone.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Local>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        return Some(datetime.with_timezone(&Local));
    }

    let naive: NaiveDateTime = input.parse().ok()?;
    Local.from_local_datetime(&naive).earliest()
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("Invalid timestamp: {raw}")))
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Local>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("Invalid timestamp: {raw}"))),
    }
}
