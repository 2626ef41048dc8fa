use comfy_table::presets::NOTHING;
use comfy_table::*;

use ralph_lib::task::Task;

use super::helper::*;

/// Print the details of a single task.
pub fn print_task(task: &Task) {
    let mut table = Table::new();
    table.load_preset(NOTHING);

    let completed_at = task
        .completed_at
        .as_ref()
        .map(format_datetime)
        .unwrap_or_default();

    table.add_row(vec![Cell::new("Id"), Cell::new(&task.id)]);
    table.add_row(vec![Cell::new("Name"), Cell::new(&task.name)]);
    table.add_row(vec![
        Cell::new("Status"),
        Cell::new(task.status.to_string()).fg(status_color(task)),
    ]);
    table.add_row(vec![Cell::new("Command"), Cell::new(&task.command)]);
    table.add_row(vec![Cell::new("Pid"), Cell::new(task.pid)]);
    table.add_row(vec![
        Cell::new("Started"),
        Cell::new(format_datetime(&task.started_at)),
    ]);
    table.add_row(vec![Cell::new("Completed"), Cell::new(completed_at)]);
    table.add_row(vec![
        Cell::new("Exit code"),
        Cell::new(format_exit_code(task.exit_code)),
    ]);
    table.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", task.timeout))]);
    table.add_row(vec![Cell::new("Log"), Cell::new(task.output_file.display())]);

    println!("{table}");
}

/// Print the info about a freshly started task.
pub fn print_started_task(task: &Task) {
    println!("Started task: {}", task.id);
    println!("  Name: {}", task.name);
    println!("  PID: {}", task.pid);
    println!("  Status: {}", task.status);
    println!("  Output: {}", task.output_file.display());
}
