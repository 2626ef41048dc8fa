use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde_derive::{Deserialize, Serialize};
use shellexpand::tilde;

use crate::error::Error;
use crate::platform::directories::*;
use crate::setting_defaults::*;

/// Environment variable that overwrites `ralph.state_file`.
pub const STATE_FILE_ENV: &str = "RALPH_STATE_FILE";
/// Environment variable that overwrites `ralph.default_timeout`.
pub const DEFAULT_TIMEOUT_ENV: &str = "RALPH_DEFAULT_TIMEOUT";
/// Environment variable that overwrites `ralph.log_directory`.
pub const LOG_DIR_ENV: &str = "RALPH_LOG_DIR";

/// All settings of the task supervisor.
/// This is the `ralph` section of the project's `config.yaml`.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct Ralph {
    /// Don't access this property directly, but rather use the getter with the same name.
    ///
    /// The state file. Relative paths are resolved against the project root.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// The timeout that's stored for tasks, if none is given.
    #[serde(default = "default_timeout")]
    pub default_timeout: u64,
    /// Don't access this property directly, but rather use the getter with the same name.
    ///
    /// The directory that contains the output of all tasks.
    pub log_directory: Option<PathBuf>,
    /// How long `kill` waits after SIGTERM before it sends SIGKILL.
    #[serde(default = "default_kill_grace_period_ms")]
    pub kill_grace_period_ms: u64,
}

impl Default for Ralph {
    fn default() -> Self {
        Ralph {
            state_file: default_state_file(),
            default_timeout: default_timeout(),
            log_directory: None,
            kill_grace_period_ms: default_kill_grace_period_ms(),
        }
    }
}

/// The parent settings struct.
///
/// Configuration files may contain many other sections that belong to other tools.
/// Those are simply ignored.
#[derive(PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "Default::default")]
    pub ralph: Ralph,
    /// The root directory of the project. Tasks are executed in here.
    /// This isn't part of any configuration file, it's resolved on startup.
    #[serde(skip)]
    pub root_path: PathBuf,
}

/// Little helper which expands a given path's `~` characters to a fully qualified path.
pub fn expand_home(old_path: &Path) -> PathBuf {
    PathBuf::from(tilde(&old_path.to_string_lossy()).into_owned())
}

impl Ralph {
    /// The location of the state file.
    pub fn state_file(&self, root: &Path) -> PathBuf {
        let path = expand_home(&self.state_file);
        if path.is_absolute() {
            path
        } else {
            root.join(path)
        }
    }

    /// The directory in which task logs are placed.
    pub fn log_directory(&self) -> PathBuf {
        if let Some(path) = &self.log_directory {
            expand_home(path)
        } else {
            default_log_dir()
        }
    }

    pub fn kill_grace_period(&self) -> Duration {
        Duration::from_millis(self.kill_grace_period_ms)
    }
}

impl Settings {
    /// Try to read existing config files, while using default values for non-existing fields.
    /// If successful, this will return a full config as well as a boolean on whether we found an
    /// existing configuration file or not.
    ///
    /// `root` overrides the project root. Otherwise it's searched from the current directory.
    /// Environment variables are applied on top of the configuration file.
    pub fn read(from_file: &Option<PathBuf>, root: Option<PathBuf>) -> Result<(Settings, bool), Error> {
        let root_path = match root {
            Some(root) => root,
            None => {
                let current_dir = env::current_dir().map_err(|err| {
                    Error::IoPathError(PathBuf::from("."), "resolving current directory", err)
                })?;
                find_root_path(&current_dir)
            }
        };

        let (mut settings, found) = Settings::read_file(from_file, &root_path)?;
        settings.root_path = root_path;
        settings.apply_env_overrides(|key| env::var(key).ok());

        Ok((settings, found))
    }

    fn read_file(from_file: &Option<PathBuf>, root: &Path) -> Result<(Settings, bool), Error> {
        // Load the config from a very specific file path
        if let Some(path) = from_file {
            if !path.exists() || !path.is_file() {
                return Err(Error::FileNotFound(format!(
                    "Couldn't find config at path {path:?}"
                )));
            }

            return Ok((Settings::parse(path)?, true));
        };

        info!("Parsing config files");
        for path in get_config_files(root).into_iter() {
            info!("Checking path: {path:?}");

            // Check if the file exists and parse it.
            if path.exists() && path.is_file() {
                info!("Found config file at: {path:?}");
                return Ok((Settings::parse(&path)?, true));
            }
        }

        info!("No config file found. Use default config.");
        Ok((Settings::default(), false))
    }

    fn parse(path: &Path) -> Result<Settings, Error> {
        // Open the file in read-only mode with buffer.
        let file = File::open(path)
            .map_err(|err| Error::IoPathError(path.to_path_buf(), "opening config file", err))?;
        let reader = BufReader::new(file);

        // An empty yaml file deserializes to `null`.
        let settings: Option<Settings> = serde_yaml::from_reader(reader)
            .map_err(|err| Error::ConfigDeserialization(err.to_string()))?;

        Ok(settings.unwrap_or_default())
    }

    /// Apply overrides from the environment.
    /// `lookup` is injected, so this can be tested without touching the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(STATE_FILE_ENV) {
            self.ralph.state_file = PathBuf::from(path);
        }

        if let Some(timeout) = lookup(DEFAULT_TIMEOUT_ENV) {
            match timeout.parse() {
                Ok(timeout) => self.ralph.default_timeout = timeout,
                Err(_) => warn!("Ignoring invalid {DEFAULT_TIMEOUT_ENV}: {timeout}"),
            }
        }

        if let Some(path) = lookup(LOG_DIR_ENV) {
            self.ralph.log_directory = Some(PathBuf::from(path));
        }
    }

    /// Shortcut for the resolved location of the state file.
    pub fn state_file(&self) -> PathBuf {
        self.ralph.state_file(&self.root_path)
    }

    /// Shortcut for the resolved task log directory.
    pub fn log_directory(&self) -> PathBuf {
        self.ralph.log_directory()
    }
}
