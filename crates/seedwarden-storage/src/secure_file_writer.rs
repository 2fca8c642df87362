use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use seedwarden_core::filesystem::{FilesystemInspector, FilesystemKind};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Owner read/write only.
#[cfg(unix)]
const SEED_FILE_MODE: u32 = 0o600;

#[derive(Debug, Error)]
pub enum WriteError {
    /// Open failed: the path already exists, the parent is missing, or access was denied.
    #[error("creating file at {path:?}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("inspecting filesystem at {path:?}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file would have landed on a filesystem that may persist it.
    #[error("filesystem at {path:?} has type {found}, but {required} is required")]
    FilesystemMismatch {
        path: PathBuf,
        found: FilesystemKind,
        required: FilesystemKind,
    },
    #[error("writing to file at {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes secret material to a fresh file, refusing to overwrite and refusing
/// any filesystem other than the required kind. A failed call never leaves the
/// file behind.
pub struct SecureFileWriter<I: FilesystemInspector> {
    inspector: I,
}

impl<I: FilesystemInspector> SecureFileWriter<I> {
    pub fn new(inspector: I) -> Self {
        Self { inspector }
    }

    /// Create `path` exclusively and fill it with `content`.
    /// The parent directory must already exist.
    #[instrument(skip_all, fields(path = %path.display(), %required))]
    pub fn persist(
        &self,
        path: &Path,
        content: &[u8],
        required: FilesystemKind,
    ) -> Result<(), WriteError> {
        self.persist_with(path, content, required, |file, bytes| file.write_all(bytes))
    }

    fn persist_with(
        &self,
        path: &Path,
        content: &[u8],
        required: FilesystemKind,
        write: impl FnOnce(&mut File, &[u8]) -> io::Result<()>,
    ) -> Result<(), WriteError> {
        let file = open_exclusive(path).map_err(|source| WriteError::Create {
            path: path.to_path_buf(),
            source,
        })?;

        let result = self.fill(file, path, content, required, write);
        if result.is_err() {
            discard(path);
        } else {
            debug!(bytes = content.len(), "seed file written");
        }
        result
    }

    fn fill(
        &self,
        mut file: File,
        path: &Path,
        content: &[u8],
        required: FilesystemKind,
        write: impl FnOnce(&mut File, &[u8]) -> io::Result<()>,
    ) -> Result<(), WriteError> {
        let found = self
            .inspector
            .kind_of(&file)
            .map_err(|source| WriteError::Inspect {
                path: path.to_path_buf(),
                source,
            })?;

        if found != required {
            return Err(WriteError::FilesystemMismatch {
                path: path.to_path_buf(),
                found,
                required,
            });
        }

        write(&mut file, content).map_err(|source| WriteError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn open_exclusive(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(SEED_FILE_MODE);
    }
    options.open(path)
}

fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!(path = %path.display(), "failed to remove rejected seed file: {err}");
    }
}
