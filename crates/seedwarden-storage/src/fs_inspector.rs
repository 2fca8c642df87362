use std::{fs::File, io};

use seedwarden_core::filesystem::{FilesystemInspector, FilesystemKind};

/// Asks the kernel via `fstatfs(2)` which filesystem backs the descriptor.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatfsInspector;

#[cfg(target_os = "linux")]
impl FilesystemInspector for StatfsInspector {
    fn kind_of(&self, file: &File) -> io::Result<FilesystemKind> {
        let stat = nix::sys::statfs::fstatfs(file).map_err(io::Error::from)?;
        // f_type width differs between libc targets.
        #[allow(clippy::unnecessary_cast)]
        let magic = stat.filesystem_type().0 as i64;
        Ok(FilesystemKind(magic))
    }
}

#[cfg(not(target_os = "linux"))]
impl FilesystemInspector for StatfsInspector {
    fn kind_of(&self, _file: &File) -> io::Result<FilesystemKind> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "filesystem type checks are only implemented on Linux",
        ))
    }
}

/// Reports the same kind for every file; lets tests stand in for tmpfs.
#[derive(Debug, Clone, Copy)]
pub struct FixedInspector(pub FilesystemKind);

impl FilesystemInspector for FixedInspector {
    fn kind_of(&self, _file: &File) -> io::Result<FilesystemKind> {
        Ok(self.0)
    }
}
