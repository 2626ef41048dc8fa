use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};

use crate::task::{format_task_id, Task};

/// The first value of the id counter of a fresh state.
pub const FIRST_TASK_ID: u64 = 1;

fn default_next_id() -> u64 {
    FIRST_TASK_ID
}

/// This is the full document that's persisted in the state file.
///
/// It contains every known task by id and the counter used to build the next id.
/// The counter only ever grows, so ids of removed tasks are never handed out again.
///
/// Each invocation of `ralph` loads this document, mutates it and writes it back as a whole.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct State {
    /// All tasks by id.
    #[serde(default)]
    pub tasks: BTreeMap<String, Task>,
    /// The counter for the next task id.
    #[serde(default = "default_next_id")]
    pub next_id: u64,
}

impl Default for State {
    fn default() -> Self {
        State::new()
    }
}

impl State {
    /// Create a new empty state.
    pub fn new() -> State {
        State {
            tasks: BTreeMap::new(),
            next_id: FIRST_TASK_ID,
        }
    }

    /// Reserve the next task id and bump the counter.
    pub fn generate_task_id(&mut self) -> String {
        let id = format_task_id(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert a task under its own id.
    pub fn add_task(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    /// Remove all tasks for which `keep` returns false.
    /// Returns the amount of removed tasks.
    pub fn retain_tasks<F>(&mut self, keep: F) -> usize
    where
        F: Fn(&Task) -> bool,
    {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| keep(task));
        before - self.tasks.len()
    }
}
