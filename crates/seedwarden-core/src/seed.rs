use std::fmt;

use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Every seed is exactly this many bytes.
pub const SEED_LEN: usize = 32;

/// 256 bits of secret entropy handed to a log as key-derivation input.
/// Never log the bytes; `Debug` is redacted and the buffer is wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; SEED_LEN],
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("seed must be exactly 32 bytes, got {0}")]
    InvalidLength(usize),
    #[error("entropy source failed: {0}")]
    Entropy(String),
}

impl Seed {
    /// Draw a fresh seed from the operating system CSPRNG.
    pub fn generate() -> Result<Self, SeedError> {
        let mut bytes = [0u8; SEED_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| SeedError::Entropy(e.to_string()))?;
        Ok(Self { bytes })
    }

    pub fn from_slice(content: &[u8]) -> Result<Self, SeedError> {
        let bytes: [u8; SEED_LEN] = content
            .try_into()
            .map_err(|_| SeedError::InvalidLength(content.len()))?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}
