use std::path::PathBuf;

use crate::platform::directories::default_log_directory;

pub(crate) fn default_state_file() -> PathBuf {
    PathBuf::from(".ralph_state.json")
}

pub(crate) fn default_timeout() -> u64 {
    300
}

pub(crate) fn default_log_dir() -> PathBuf {
    default_log_directory()
}

pub(crate) fn default_kill_grace_period_ms() -> u64 {
    500
}
