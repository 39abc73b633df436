//! Process-identity file
//!
//! External supervisors locate the orchestrator through this file and
//! manage it with OS signals. Written at startup, removed at clean
//! shutdown; a leftover file after a crash is harmless because the
//! supervisor verifies the pid before signaling.

use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Write the current process id to `path`.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, format!("{}\n", std::process::id()))?;
        info!(path = %path.display(), pid = std::process::id(), "pid file written");
        Ok(Self { path })
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove pid file");
            }
        } else {
            info!(path = %self.path.display(), "pid file removed");
        }
    }
}
