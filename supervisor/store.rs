use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use log::{debug, warn};

use ralph_lib::state::State;

/// Access to the persisted [State].
///
/// Callers never write a state they didn't load in the same [Store::update] cycle.
/// This allows implementations to choose their own consistency strategy, e.g. a plain file,
/// a locked file or a single process owning the state.
pub trait Store {
    /// Load the current state.
    /// A missing, unreadable or malformed document results in a fresh, empty state.
    fn load(&self) -> Result<State>;

    /// Persist the full state, replacing whatever has been stored before.
    fn save(&self, state: &State) -> Result<()>;

    /// Run a full load-mutate-save cycle.
    ///
    /// The state is only written, if `mutate` actually changed it.
    /// The default implementation doesn't protect against concurrent cycles. Last writer wins.
    fn update<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut State) -> T,
        Self: Sized,
    {
        load_mutate_save(self, mutate)
    }
}

fn load_mutate_save<S, T, F>(store: &S, mutate: F) -> Result<T>
where
    S: Store,
    F: FnOnce(&mut State) -> T,
{
    let mut state = store.load()?;
    let original = state.clone();

    let result = mutate(&mut state);

    if state != original {
        store.save(&state)?;
    }

    Ok(result)
}

/// The default store: a single JSON document on disk.
///
/// Updates are serialized between concurrent invocations with an exclusive advisory lock
/// on a `.lock` file next to the state file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

/// Holds the advisory lock of a [FileStore] until it's dropped.
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!("Failed to release state lock: {err}");
        }
    }
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        FileStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, extension: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "state".into());
        name.push(extension);
        self.path.with_file_name(name)
    }

    fn ensure_parent_directory(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .context(format!("Failed to create state directory {parent:?}"))?;
            }
        }

        Ok(())
    }

    /// Block until we hold the exclusive lock for this state file.
    fn lock(&self) -> Result<StoreLock> {
        self.ensure_parent_directory()?;
        let lock_path = self.sibling(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .context(format!("Failed to open state lock {lock_path:?}"))?;

        FileExt::lock_exclusive(&file).context(format!("Failed to lock {lock_path:?}"))?;
        debug!("Acquired state lock {lock_path:?}");

        Ok(StoreLock { file })
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<State> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No state file at {:?}, starting with an empty state", self.path);
                return Ok(State::new());
            }
            Err(err) => {
                warn!(
                    "Failed to read state file {:?}, using clean state instead: {err}",
                    self.path
                );
                return Ok(State::new());
            }
        };

        // A broken state file must never block task management.
        // We lose the history, but everything keeps working.
        match serde_json::from_slice(&data) {
            Ok(state) => Ok(state),
            Err(err) => {
                warn!(
                    "Failed to deserialize state file {:?}, using clean state instead: {err}",
                    self.path
                );
                Ok(State::new())
            }
        }
    }

    /// The state is saved as pretty JSON for readability and debugging purposes.
    fn save(&self, state: &State) -> Result<()> {
        let serialized =
            serde_json::to_string_pretty(state).context("Failed to serialize state:")?;
        self.ensure_parent_directory()?;

        // Write to a temporary file first, to prevent loss due to crashes.
        let temp = self.sibling(".partial");
        fs::write(&temp, serialized).context("Failed to write temp file while saving state.")?;

        // Overwrite the original with the temp file, if everything went fine.
        fs::rename(&temp, &self.path)
            .context("Failed to overwrite old state while saving state")?;

        debug!("State saved at: {:?}", self.path);
        Ok(())
    }

    fn update<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut State) -> T,
    {
        let _lock = self.lock()?;
        load_mutate_save(self, mutate)
    }
}
