use std::{fmt, fs::File, io, str::FromStr};

use thiserror::Error;

/// Filesystem type as reported by `statfs(2)` in `f_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilesystemKind(pub i64);

impl FilesystemKind {
    /// Linux tmpfs: memory-backed, never written to persistent disk.
    pub const TMPFS: FilesystemKind = FilesystemKind(0x0102_1994);
}

impl fmt::Display for FilesystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Accepts decimal or `0x` / `0o` / `0b` prefixed integers with at most one sign.
impl FromStr for FilesystemKind {
    type Err = FilesystemKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FilesystemKindError {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let lower = digits.to_ascii_lowercase();
        let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
            (16, hex)
        } else if let Some(oct) = lower.strip_prefix("0o") {
            (8, oct)
        } else if let Some(bin) = lower.strip_prefix("0b") {
            (2, bin)
        } else {
            (10, lower.as_str())
        };
        if body.starts_with(['+', '-']) {
            return Err(invalid());
        }

        // Parse through i128 so i64::MIN survives the sign flip.
        let magnitude = i128::from(u64::from_str_radix(body, radix).map_err(|_| invalid())?);
        let value = if negative { -magnitude } else { magnitude };
        i64::try_from(value).map(Self).map_err(|_| invalid())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{input:?} is not a filesystem type number (decimal or 0x/0o/0b prefixed)")]
pub struct FilesystemKindError {
    pub input: String,
}

/// Reports which filesystem backs an open file (statfs in production; fixed in tests).
pub trait FilesystemInspector: Send + Sync {
    fn kind_of(&self, file: &File) -> io::Result<FilesystemKind>;
}
