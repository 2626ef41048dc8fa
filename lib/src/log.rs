use std::collections::BTreeSet;
use std::fs::{create_dir_all, read_dir, read_to_string, remove_file, File};
use std::io::{self, prelude::*, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use rev_buf_reader::RevBufReader;

use crate::error::Error;
use crate::task::TASK_ID_PREFIX;

/// File extension of the merged stdout/stderr log of a task.
pub const LOG_EXTENSION: &str = "log";
/// File extension of the sidecar that receives the exit code of a task's command.
pub const EXIT_CODE_EXTENSION: &str = "exit";

/// Get the path to the log file of a task.
pub fn get_log_path(task_id: &str, log_dir: &Path) -> PathBuf {
    log_dir.join(format!("{task_id}.{LOG_EXTENSION}"))
}

/// Get the path to the exit code sidecar of a task.
pub fn get_exit_code_path(task_id: &str, log_dir: &Path) -> PathBuf {
    log_dir.join(format!("{task_id}.{EXIT_CODE_EXTENSION}"))
}

/// Create and return the two file handles for the `(stdout, stderr)` log file of a task.
/// These are two handles to the same file.
///
/// The log directory is created, if it doesn't exist yet.
pub fn create_log_file_handles(task_id: &str, log_dir: &Path) -> Result<(File, File), Error> {
    create_dir_all(log_dir)
        .map_err(|err| Error::IoPathError(log_dir.to_path_buf(), "creating log directory", err))?;

    let log_path = get_log_path(task_id, log_dir);
    let stdout_handle = File::create(&log_path)
        .map_err(|err| Error::IoPathError(log_path, "creating log file", err))?;
    let stderr_handle = stdout_handle.try_clone()?;

    Ok((stdout_handle, stderr_handle))
}

/// Read the exit code that the task's wrapper shell wrote on completion.
/// Returns `None` if the file doesn't exist or doesn't contain a valid number.
pub fn read_exit_code(task_id: &str, log_dir: &Path) -> Option<i32> {
    let path = get_exit_code_path(task_id, log_dir);
    let content = read_to_string(&path).ok()?;

    match content.trim().parse() {
        Ok(code) => Some(code),
        Err(_) => {
            warn!("Found invalid exit code file at {path:?}: {content:?}");
            None
        }
    }
}

/// Return the last `amount` lines of a log file.
/// An `amount` of `0` returns the whole file.
///
/// The lines are returned exactly as they've been written, including their line endings.
/// Commands may print anything, so invalid UTF-8 is replaced instead of failing.
pub fn read_last_lines(path: &Path, amount: usize) -> Result<String, Error> {
    let read_error =
        |err: io::Error| Error::LogRead(format!("Error while reading {path:?}: {err}"));

    let mut file = File::open(path).map_err(|err| {
        Error::LogRead(format!("Error while opening log file {path:?}: {err}"))
    })?;

    if amount > 0 {
        seek_to_last_lines(&mut file, amount).map_err(read_error)?;
    }

    let mut content = Vec::new();
    file.read_to_end(&mut content).map_err(read_error)?;

    Ok(String::from_utf8_lossy(&content).into_owned())
}

/// Seek the cursor of the file to the beginning of the line that's located `amount` lines
/// from the back of the file.
/// If the file has fewer lines, the cursor is placed at the start of the file.
fn seek_to_last_lines(file: &mut File, amount: usize) -> Result<(), io::Error> {
    let file_size = file.seek(SeekFrom::End(0))?;
    if file_size == 0 {
        return Ok(());
    }

    // A final newline terminates the last line, it doesn't start another one.
    file.seek(SeekFrom::End(-1))?;
    let mut last_byte = [0; 1];
    file.read_exact(&mut last_byte)?;
    let newlines_to_pass = if last_byte[0] == b'\n' {
        amount + 1
    } else {
        amount
    };

    let target_position = {
        let mut reader = RevBufReader::new(&mut *file);
        // The position from which the RevBufReader starts reading.
        // The file might still be written to, so it's saved now.
        let start_position = reader.get_mut().seek(SeekFrom::End(0))?;

        let mut total_read_bytes: u64 = 0;
        let mut found_lines = 0;
        let mut target_position = 0;

        // Read in 4KB chunks until there's either nothing left or we passed enough newlines.
        'outer: loop {
            let mut buffer = vec![0; 4096];
            let read_bytes = reader.read(&mut buffer)?;
            if read_bytes == 0 {
                break;
            }

            // The bytes in the buffer are in forward order, even though they're read from
            // behind. Scan them from the back.
            for byte in buffer[0..read_bytes].iter().rev() {
                total_read_bytes += 1;
                if *byte != b'\n' {
                    continue;
                }

                found_lines += 1;
                if found_lines == newlines_to_pass {
                    // The line starts right after this newline.
                    target_position = (start_position + 1).saturating_sub(total_read_bytes);
                    break 'outer;
                }
            }
        }

        target_position
    };

    file.seek(SeekFrom::Start(target_position))?;
    Ok(())
}

/// Extract the task id from the name of a log or exit code file.
/// Only files created by ralph are considered, i.e. `ralph_0001.log` or `ralph_0001.exit`.
fn task_id_from_file(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if extension != LOG_EXTENSION && extension != EXIT_CODE_EXTENSION {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    if !stem.starts_with(&format!("{TASK_ID_PREFIX}_")) {
        return None;
    }

    Some(stem.to_string())
}

/// Remove all log and exit code files whose task id isn't in `keep`.
/// Returns the amount of removed files.
pub fn clean_orphaned_logs(log_dir: &Path, keep: &BTreeSet<String>) -> Result<usize, Error> {
    // Nothing has ever been logged.
    if !log_dir.exists() {
        return Ok(0);
    }

    let files = read_dir(log_dir)
        .map_err(|err| Error::IoPathError(log_dir.to_path_buf(), "listing log directory", err))?;

    let mut removed = 0;
    for file in files.flatten() {
        let path = file.path();
        let Some(task_id) = task_id_from_file(&path) else {
            continue;
        };
        if keep.contains(&task_id) {
            continue;
        }

        match remove_file(&path) {
            Ok(()) => {
                debug!("Removed log file {path:?}");
                removed += 1;
            }
            Err(err) => error!("Failed to remove log file {path:?} with error {err:?}"),
        }
    }

    Ok(removed)
}
