use log::warn;

use procfs::process::{self, Process};

/// Get all processes in a process group that're still alive.
/// Zombies aren't considered alive, they only wait for their parent to reap them.
pub fn get_process_group_pids(pgrp: i32) -> Vec<i32> {
    let all_processes = match process::all_processes() {
        Err(error) => {
            warn!("Failed to get full process list: {error}");
            return Vec::new();
        }
        Ok(processes) => processes,
    };

    // Get all processes whose `stat` can be access without any errors.
    // If the stat() result matches the process group, use the process PID.
    all_processes
        .into_iter()
        .filter_map(|result| result.ok())
        .filter_map(|process| match process.stat() {
            Ok(stat) if stat.pgrp == pgrp && stat.state != 'Z' && stat.state != 'X' => {
                Some(process.pid)
            }
            _ => None,
        })
        .collect()
}

/// Check whether any member of a process group is still alive.
pub fn group_is_alive(pgrp: i32) -> bool {
    !get_process_group_pids(pgrp).is_empty()
}

/// Check, whether a specific process exists or not.
/// Zombies count as gone.
pub fn process_exists(pid: u32) -> bool {
    let Ok(pid) = i32::try_from(pid) else {
        return false;
    };

    match Process::new(pid) {
        Ok(process) => process.is_alive(),
        Err(_) => false,
    }
}
