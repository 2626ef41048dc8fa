use comfy_table::presets::UTF8_HORIZONTAL_ONLY;
use comfy_table::*;

use ralph_lib::task::Task;

use super::helper::*;

/// Print a list of tasks in a nicely formatted table.
pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    println!("{}", build_table(tasks));
}

fn build_table(tasks: &[Task]) -> Table {
    let headers = vec![
        Cell::new("Id"),
        Cell::new("Name"),
        Cell::new("Status"),
        Cell::new("Command"),
        Cell::new("Start"),
        Cell::new("End"),
        Cell::new("Exit"),
        Cell::new("Log"),
    ];

    // Initialize comfy table.
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(UTF8_HORIZONTAL_ONLY)
        .set_header(headers);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(&task.id));
        row.add_cell(Cell::new(&task.name));
        row.add_cell(Cell::new(task.status.to_string()).fg(status_color(task)));
        row.add_cell(Cell::new(truncate_command(&task.command)));
        row.add_cell(Cell::new(format_datetime(&task.started_at)));

        let end = task
            .completed_at
            .as_ref()
            .map(format_datetime)
            .unwrap_or_default();
        row.add_cell(Cell::new(end));
        row.add_cell(Cell::new(format_exit_code(task.exit_code)));
        row.add_cell(Cell::new(task.output_file.display()));

        table.add_row(row);
    }

    table
}
