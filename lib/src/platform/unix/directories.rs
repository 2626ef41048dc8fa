use std::env::temp_dir;
use std::path::{Path, PathBuf};

/// Files whose presence marks the root directory of a project.
const ROOT_MARKERS: [&str; 2] = ["config.yaml", "CLAUDE.md"];

/// Find the project root by walking up from `start`.
///
/// The first directory that contains one of the [ROOT_MARKERS] wins.
/// If there's none, `start` itself is used.
pub fn find_root_path(start: &Path) -> PathBuf {
    for directory in start.ancestors() {
        if ROOT_MARKERS
            .iter()
            .any(|marker| directory.join(marker).is_file())
        {
            return directory.to_path_buf();
        }
    }

    start.to_path_buf()
}

/// The per-user configuration directory, e.g. `~/.config/ralph`.
pub fn default_config_directory() -> Option<PathBuf> {
    dirs::config_dir().map(|path| path.join("ralph"))
}

/// All locations that're checked for a configuration file, in order of precedence.
pub fn get_config_files(root: &Path) -> Vec<PathBuf> {
    let mut files = vec![root.join("config.yaml")];
    if let Some(directory) = default_config_directory() {
        files.push(directory.join("ralph.yml"));
    }

    files
}

/// Task logs live in a fixed temporary directory.
pub fn default_log_directory() -> PathBuf {
    temp_dir().join("ralph")
}
