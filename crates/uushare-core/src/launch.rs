//! Starting the companion client.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::{ShareError, ShareResult};

/// Client executable name for the current target.
///
/// 64-bit builds start the x64 client, everything else the 32-bit one.
pub fn default_executable_name() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "ApexDC-x64.exe"
    } else {
        "ApexDC.exe"
    }
}

/// The client program and the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Companion {
    pub executable: PathBuf,
    pub working_dir: PathBuf,
}

impl Companion {
    /// Resolve `executable` against `base_dir` (absolute paths are kept).
    pub fn new(base_dir: &Path, executable: impl AsRef<Path>) -> Self {
        Self {
            executable: base_dir.join(executable),
            working_dir: base_dir.to_path_buf(),
        }
    }
}

/// Starts a process without waiting for it.
pub trait Spawner {
    fn spawn(&self, companion: &Companion) -> ShareResult<()>;
}

/// Spawns the real executable via [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn(&self, companion: &Companion) -> ShareResult<()> {
        let child = Command::new(&companion.executable)
            .current_dir(&companion.working_dir)
            .spawn()
            .map_err(|source| ShareError::Launch {
                path: companion.executable.clone(),
                source,
            })?;
        info!(pid = child.id(), exe = %companion.executable.display(), "companion started");
        Ok(())
    }
}
