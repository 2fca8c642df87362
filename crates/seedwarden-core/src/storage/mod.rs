mod seed_store;

pub use seed_store::{InMemorySeedStore, SeedStore, SeedStoreError};
