use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

#[derive(Parser, Debug, Clone)]
pub enum SubCommand {
    /// Start a command in the background.
    ///
    /// The command is executed via `sh -c` in the project root and keeps running after
    /// ralph exits. Its output is written to a log file.
    /// Remember that the command needs proper shell escaping, the safest way is to surround
    /// it with single quotes, for example:
    ///
    /// ralph run 'cargo test && echo "done"'
    Run {
        /// The command to be executed.
        #[arg(value_hint = ValueHint::CommandString)]
        command: String,

        /// A label for the task. It doesn't have to be unique.
        #[arg(short, long, default_value = "task")]
        name: String,

        /// Expected runtime in seconds.
        /// This is informational only, the task won't be stopped once it's exceeded.
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Display the status of recent tasks.
    ///
    /// Only running tasks and tasks that started within the last 24 hours are shown.
    Status {
        /// Show all tasks, regardless of their age.
        #[arg(short, long)]
        all: bool,
    },

    /// Check whether a task is still running and show its details.
    Check {
        /// The id of the task, e.g. `ralph_0001`.
        task_id: String,
    },

    /// Display the output of a task.
    Output {
        /// The id of the task.
        task_id: String,

        /// Only print the last X lines. `0` or a negative value prints the whole output.
        #[arg(short, long, default_value_t = 50, allow_negative_numbers = true)]
        tail: i64,
    },

    /// Kill a running task and all of its child processes.
    ///
    /// The task's process group receives SIGTERM first and SIGKILL, if it's still alive
    /// after a short grace period.
    Kill {
        /// The id of the task.
        task_id: String,
    },

    /// Remove finished tasks and their logs.
    Clean {
        /// Also remove running tasks from the list.
        /// Their processes are left alone.
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "ralph",
    about = "Supervise long running shell commands in the background",
    author,
    version
)]
pub struct CliArguments {
    /// Verbose mode (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// If provided, ralph only uses this config file.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// The project root. Tasks are executed in this directory.
    ///
    /// By default, this is the closest parent directory that contains a `config.yaml` or
    /// `CLAUDE.md`, or the current directory.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Option<SubCommand>,
}
