//! Process-scoped scratch directory and the temp artifacts encodes write into.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

/// Scratch directory for in-progress encodes. Removed when dropped.
#[derive(Debug)]
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    /// Create under the system temp directory, or under `parent` if given
    pub fn new(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ffshrink-");
        let dir = match parent {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        debug!(path = %dir.path().display(), "created work directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Reserve a fresh, uniquely named artifact path. Nothing is created on
    /// disk until ffmpeg writes it.
    pub fn artifact(&self) -> TempArtifact {
        let name = format!("{}.tmp.mkv", Uuid::new_v4().simple());
        TempArtifact {
            path: self.dir.path().join(name),
            armed: true,
        }
    }
}

/// Exclusively owned temp output. Deleted on drop unless promoted.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    armed: bool,
}

impl TempArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically move the artifact to `dest`.
    ///
    /// When `dest` is on another filesystem the bytes are first copied into a
    /// hidden file next to `dest`, which is then renamed into place, so `dest`
    /// never holds a partial file. On error the artifact is still deleted.
    pub fn promote(mut self, dest: &Path) -> io::Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        match fs::rename(&self.path, dest) {
            Ok(()) => {
                self.armed = false;
                Ok(())
            }
            Err(e) if is_cross_device(&e) => {
                debug!(
                    from = %self.path.display(),
                    to = %dest.display(),
                    "rename crosses filesystems, copying"
                );
                copy_then_rename(&self.path, dest)
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed temp artifact"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove temp artifact"),
        }
    }
}

fn copy_then_rename(src: &Path, dest: &Path) -> io::Result<()> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let staged = tempfile::Builder::new()
        .prefix(".ffshrink-")
        .suffix(".partial")
        .tempfile_in(dir)?;
    fs::copy(src, staged.path())?;
    staged.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(windows)]
fn is_cross_device(e: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    e.raw_os_error() == Some(17)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_e: &io::Error) -> bool {
    false
}
