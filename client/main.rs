use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use simplelog::{Config, LevelFilter, SimpleLogger};

use ralph_lib::settings::Settings;
use ralph_supervisor::Supervisor;

pub mod cli;
pub mod display;

use crate::cli::{CliArguments, SubCommand};
use crate::display::{print_started_task, print_task, print_tasks};

/// This is the main entry point of the client.
///
/// At first we do some basic setup:
/// - Parse the cli
/// - Initialize logging
/// - Read the config
///
/// Afterwards, exactly one subcommand is executed against the task state.
fn main() -> Result<()> {
    // Parse commandline options.
    let opt = CliArguments::parse();

    // Set the verbosity level of the logger.
    let level = match opt.verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    // Logging is a nice to have. Don't fail, if another logger has been set up already.
    let _ = SimpleLogger::init(level, Config::default());

    // Try to read settings from the configuration file.
    let (settings, config_found) =
        Settings::read(&opt.config, opt.root.clone()).context("Failed to read configuration.")?;
    if !config_found {
        debug!("No configuration file found, using defaults.");
    }

    // If no subcommand is given, we default to the `status` subcommand without any arguments.
    let subcommand = opt.cmd.unwrap_or(SubCommand::Status { all: false });

    let supervisor = Supervisor::from_settings(settings);
    handle_command(&supervisor, subcommand)
}

/// Execute a single subcommand and print its result.
///
/// Unknown tasks and tasks that cannot be acted upon aren't errors.
/// They are reported to the user and the program exits successfully.
fn handle_command(supervisor: &Supervisor, subcommand: SubCommand) -> Result<()> {
    match subcommand {
        SubCommand::Run {
            command,
            name,
            timeout,
        } => {
            let task = supervisor
                .create(&command, &name, timeout)
                .context("Failed to start task.")?;
            print_started_task(&task);
        }
        SubCommand::Status { all } => {
            let tasks = supervisor.list(all)?;
            print_tasks(&tasks);
        }
        SubCommand::Check { task_id } => match supervisor.check(&task_id)? {
            Some(task) => print_task(&task),
            None => println!("Task {task_id} not found"),
        },
        SubCommand::Output { task_id, tail } => {
            let output = supervisor.tail(&task_id, tail)?;
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
        }
        SubCommand::Kill { task_id } => {
            if supervisor.kill(&task_id)? {
                println!("Killed task {task_id}");
            } else {
                println!("Could not kill task {task_id}");
            }
        }
        SubCommand::Clean { all } => {
            let removed = supervisor.clean(!all)?;
            println!("Cleaned {removed} completed tasks");
        }
    }

    Ok(())
}
