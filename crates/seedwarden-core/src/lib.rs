//! Core abstractions for Seedwarden: seed material, log identities, the remote
//! store and filesystem contracts, and the resolver that decides whether a seed
//! is fetched or minted.
//! This crate is intentionally small to keep dependency surface minimal.

pub mod clock;
pub mod filesystem;
pub mod identity;
pub mod resolver;
pub mod seed;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use filesystem::{FilesystemInspector, FilesystemKind, FilesystemKindError};
pub use identity::{InceptionDate, InceptionDateError, LogIdentity};
pub use resolver::{ResolveError, SeedResolver};
pub use seed::{Seed, SeedError, SEED_LEN};
pub use storage::{InMemorySeedStore, SeedStore, SeedStoreError};
