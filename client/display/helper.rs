use chrono::{DateTime, Local};
use comfy_table::Color;

use ralph_lib::task::{Task, TaskStatus};

/// Commands are cut to this amount of characters in tables.
pub const MAX_COMMAND_WIDTH: usize = 50;

/// Determine the color of a task's status.
/// Completed tasks are green or red, depending on their exit code.
pub fn status_color(task: &Task) -> Color {
    match task.status {
        TaskStatus::Running => Color::Blue,
        TaskStatus::Completed => match task.exit_code {
            Some(0) | None => Color::Green,
            Some(_) => Color::Red,
        },
        TaskStatus::Killed => Color::Yellow,
        TaskStatus::Failed => Color::Red,
    }
}

/// Shorten a command, so it doesn't blow up the table.
pub fn truncate_command(command: &str) -> String {
    if command.chars().count() <= MAX_COMMAND_WIDTH {
        return command.to_string();
    }

    let mut shortened: String = command.chars().take(MAX_COMMAND_WIDTH - 3).collect();
    shortened.push_str("...");
    shortened
}

/// Show the time only, if it's today. Otherwise show the full date.
pub fn format_datetime(datetime: &DateTime<Local>) -> String {
    if datetime.date_naive() == Local::now().date_naive() {
        datetime.format("%H:%M:%S").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

pub fn format_exit_code(exit_code: Option<i32>) -> String {
    exit_code.map(|code| code.to_string()).unwrap_or_default()
}
