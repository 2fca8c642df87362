use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, instrument};
use zeroize::Zeroizing;

use crate::{
    clock::{Clock, SystemClock},
    identity::{InceptionDate, LogIdentity},
    seed::{Seed, SeedError},
    storage::{SeedStore, SeedStoreError},
};

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The log has no seed and today is not its inception day. Creating one now
    /// could fork the log's identity across deployments.
    #[error("log {name:?} has no seed, but today ({today}) is not its inception date ({inception})")]
    NotInceptionDay {
        name: String,
        inception: InceptionDate,
        today: NaiveDate,
    },
    #[error("stored seed for log {name:?} is {len} bytes, expected 32")]
    InvalidSeedLength { name: String, len: usize },
    #[error("generating seed for log {name:?}: {source}")]
    Generate {
        name: String,
        #[source]
        source: SeedError,
    },
    #[error(transparent)]
    Store(#[from] SeedStoreError),
}

/// Decides, per log, whether to reuse the stored seed or mint the first one.
///
/// Non-empty stored content is always returned as is. Missing or empty content
/// is only filled on the log's inception day; on any other day it is an error
/// and the store is left untouched. Store failures are returned, not retried.
pub struct SeedResolver<S: SeedStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: SeedStore> SeedResolver<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: SeedStore, C: Clock> SeedResolver<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    #[instrument(skip_all, fields(log = %identity.name, inception = %identity.inception))]
    pub async fn resolve(&self, identity: &LogIdentity) -> Result<Seed, ResolveError> {
        let content = self.store.fetch_current(&identity.name).await?;

        match content {
            Some(bytes) if !bytes.is_empty() => {
                let bytes = Zeroizing::new(bytes);
                debug!("found existing seed");
                Seed::from_slice(&bytes).map_err(|_| ResolveError::InvalidSeedLength {
                    name: identity.name.clone(),
                    len: bytes.len(),
                })
            }
            content => {
                let today = self.clock.today();
                if !identity.inception.is(today) {
                    return Err(ResolveError::NotInceptionDay {
                        name: identity.name.clone(),
                        inception: identity.inception,
                        today,
                    });
                }

                debug!(
                    placeholder = content.is_some(),
                    "no seed stored; minting on inception day"
                );
                self.create(identity).await
            }
        }
    }

    async fn create(&self, identity: &LogIdentity) -> Result<Seed, ResolveError> {
        let seed = Seed::generate().map_err(|source| ResolveError::Generate {
            name: identity.name.clone(),
            source,
        })?;
        self.store.create(&identity.name, seed.as_bytes()).await?;
        info!("created new seed");
        Ok(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FixedClock, seed::SEED_LEN, storage::InMemorySeedStore};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    fn identity(name: &str, inception: &str) -> LogIdentity {
        LogIdentity::new(name, inception.parse().expect("inception"))
    }

    fn resolver(
        store: &InMemorySeedStore,
        today: &str,
    ) -> SeedResolver<InMemorySeedStore, FixedClock> {
        SeedResolver::with_clock(store.clone(), FixedClock(day(today)))
    }

    #[tokio::test]
    async fn returns_existing_seed_without_creating() {
        let stored = vec![7u8; SEED_LEN];
        let store = InMemorySeedStore::new().with_entry("log-a", stored.clone());

        for today in ["2023-12-31", "2025-01-01", "2030-06-15"] {
            let seed = resolver(&store, today)
                .resolve(&identity("log-a", "2025-01-01"))
                .await
                .expect("resolve");
            assert_eq!(seed.as_bytes(), stored.as_slice());
        }
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn creates_seed_on_inception_day_when_absent() {
        let store = InMemorySeedStore::new();

        let seed = resolver(&store, "2025-01-01")
            .resolve(&identity("log-a", "2025-01-01"))
            .await
            .expect("resolve");

        assert_eq!(seed.as_bytes().len(), SEED_LEN);
        assert_eq!(store.create_calls(), 1);
        assert_eq!(store.entry("log-a").as_deref(), Some(seed.as_bytes()));
    }

    #[tokio::test]
    async fn fills_placeholder_on_inception_day() {
        let store = InMemorySeedStore::new().with_entry("log-a", Vec::new());

        let seed = resolver(&store, "2025-01-01")
            .resolve(&identity("log-a", "2025-01-01"))
            .await
            .expect("resolve");

        assert_eq!(store.create_calls(), 1);
        assert_eq!(store.entry("log-a").as_deref(), Some(seed.as_bytes()));
    }

    #[tokio::test]
    async fn refuses_to_create_after_inception_day() {
        let store = InMemorySeedStore::new();

        let err = resolver(&store, "2025-06-01")
            .resolve(&identity("log-b", "2024-01-01"))
            .await
            .expect_err("should refuse");

        assert!(matches!(err, ResolveError::NotInceptionDay { .. }));
        assert_eq!(store.create_calls(), 0);
        assert_eq!(store.entry("log-b"), None);
    }

    #[tokio::test]
    async fn refuses_to_fill_placeholder_outside_inception_day() {
        let store = InMemorySeedStore::new().with_entry("log-b", Vec::new());

        for today in ["2023-12-31", "2024-01-02"] {
            let err = resolver(&store, today)
                .resolve(&identity("log-b", "2024-01-01"))
                .await
                .expect_err("should refuse");
            assert!(matches!(err, ResolveError::NotInceptionDay { .. }));
        }
        assert_eq!(store.create_calls(), 0);
        assert_eq!(store.entry("log-b"), Some(Vec::new()));
    }

    #[tokio::test]
    async fn rejects_stored_seed_of_wrong_length() {
        let store = InMemorySeedStore::new().with_entry("log-c", b"hello world".to_vec());

        let err = resolver(&store, "2025-01-01")
            .resolve(&identity("log-c", "2025-01-01"))
            .await
            .expect_err("should reject");

        assert!(matches!(err, ResolveError::InvalidSeedLength { len: 11, .. }));
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn propagates_store_failures_without_creating() {
        let store = InMemorySeedStore::new().failing("throttled");

        let err = resolver(&store, "2025-01-01")
            .resolve(&identity("log-a", "2025-01-01"))
            .await
            .expect_err("should fail");

        assert!(matches!(
            err,
            ResolveError::Store(SeedStoreError::Transport { .. })
        ));
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn surfaces_create_conflicts() {
        struct RacingStore(InMemorySeedStore);

        #[async_trait::async_trait]
        impl SeedStore for RacingStore {
            async fn fetch_current(&self, _id: &str) -> Result<Option<Vec<u8>>, SeedStoreError> {
                Ok(None)
            }

            async fn create(&self, id: &str, content: &[u8]) -> Result<(), SeedStoreError> {
                self.0.create(id, content).await
            }
        }

        let inner = InMemorySeedStore::new().with_entry("log-a", vec![1u8; SEED_LEN]);
        let resolver =
            SeedResolver::with_clock(RacingStore(inner.clone()), FixedClock(day("2025-01-01")));

        let err = resolver
            .resolve(&identity("log-a", "2025-01-01"))
            .await
            .expect_err("should conflict");

        assert!(matches!(
            err,
            ResolveError::Store(SeedStoreError::AlreadyExists { .. })
        ));
        assert_eq!(inner.entry("log-a"), Some(vec![1u8; SEED_LEN]));
    }
}
