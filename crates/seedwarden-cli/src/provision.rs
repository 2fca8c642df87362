use color_eyre::{eyre::WrapErr, Result};
use seedwarden_core::{
    clock::Clock,
    filesystem::{FilesystemInspector, FilesystemKind},
    resolver::SeedResolver,
    storage::SeedStore,
};
use seedwarden_storage::secure_file_writer::SecureFileWriter;
use tracing::info;

use crate::config::LogTarget;

/// Resolve and write the seed for every log, in order. Stops at the first
/// failure; logs already written stay in place.
pub async fn provision_all<S, C, I>(
    targets: &[LogTarget],
    resolver: &SeedResolver<S, C>,
    writer: &SecureFileWriter<I>,
    required: FilesystemKind,
) -> Result<usize>
where
    S: SeedStore,
    C: Clock,
    I: FilesystemInspector,
{
    for target in targets {
        let name = &target.identity.name;
        let seed = resolver
            .resolve(&target.identity)
            .await
            .wrap_err_with(|| format!("getting seed for log {name:?}"))?;

        writer
            .persist(&target.secret, seed.as_bytes(), required)
            .wrap_err_with(|| format!("persisting seed for log {name:?}"))?;

        info!(log = %name, path = %target.secret.display(), "seed provisioned");
    }

    info!(count = targets.len(), "all logs provisioned");
    Ok(targets.len())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use seedwarden_core::{
        clock::FixedClock,
        identity::{InceptionDate, LogIdentity},
        seed::SEED_LEN,
        storage::InMemorySeedStore,
    };
    use seedwarden_storage::fs_inspector::FixedInspector;

    use super::*;

    fn target(dir: &Path, name: &str, inception: &str) -> LogTarget {
        LogTarget {
            identity: LogIdentity::new(name, inception.parse().expect("inception")),
            secret: dir.join(format!("{name}.seed.bin")),
        }
    }

    fn resolver(
        store: &InMemorySeedStore,
        today: &str,
    ) -> SeedResolver<InMemorySeedStore, FixedClock> {
        let today: InceptionDate = today.parse().expect("today");
        SeedResolver::with_clock(store.clone(), FixedClock(today.date()))
    }

    #[tokio::test]
    async fn provisions_existing_and_new_logs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let existing = vec![9u8; SEED_LEN];
        let store = InMemorySeedStore::new().with_entry("log-old", existing.clone());
        let targets = vec![
            target(dir.path(), "log-old", "2024-01-01"),
            target(dir.path(), "log-new", "2025-01-01"),
        ];
        let writer = SecureFileWriter::new(FixedInspector(FilesystemKind::TMPFS));

        let count = provision_all(
            &targets,
            &resolver(&store, "2025-01-01"),
            &writer,
            FilesystemKind::TMPFS,
        )
        .await
        .expect("provision");

        assert_eq!(count, 2);
        assert_eq!(fs::read(&targets[0].secret).expect("read"), existing);
        let minted = fs::read(&targets[1].secret).expect("read");
        assert_eq!(minted.len(), SEED_LEN);
        assert_eq!(store.entry("log-new"), Some(minted));
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn stops_at_first_failure_and_names_the_log() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InMemorySeedStore::new();
        let targets = vec![
            target(dir.path(), "log-b", "2024-01-01"),
            target(dir.path(), "log-c", "2025-06-01"),
        ];
        let writer = SecureFileWriter::new(FixedInspector(FilesystemKind::TMPFS));

        let err = provision_all(
            &targets,
            &resolver(&store, "2025-06-01"),
            &writer,
            FilesystemKind::TMPFS,
        )
        .await
        .expect_err("should fail");

        assert!(err.to_string().contains("log-b"));
        assert_eq!(store.create_calls(), 0);
        assert!(!targets[0].secret.exists());
        assert!(!targets[1].secret.exists());
    }

    #[tokio::test]
    async fn refuses_non_tmpfs_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InMemorySeedStore::new().with_entry("log-a", vec![1u8; SEED_LEN]);
        let targets = vec![target(dir.path(), "log-a", "2025-01-01")];
        let writer = SecureFileWriter::new(FixedInspector(FilesystemKind(0xEF53)));

        let err = provision_all(
            &targets,
            &resolver(&store, "2025-01-01"),
            &writer,
            FilesystemKind::TMPFS,
        )
        .await
        .expect_err("should fail");

        assert!(format!("{err:#}").contains("is required"));
        assert!(!targets[0].secret.exists());
    }

    #[tokio::test]
    async fn second_run_does_not_overwrite_seed_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = InMemorySeedStore::new();
        let targets = vec![target(dir.path(), "log-a", "2025-01-01")];
        let writer = SecureFileWriter::new(FixedInspector(FilesystemKind::TMPFS));
        let resolver = resolver(&store, "2025-01-01");

        provision_all(&targets, &resolver, &writer, FilesystemKind::TMPFS)
            .await
            .expect("first run");
        let first = fs::read(&targets[0].secret).expect("read");

        let err = provision_all(&targets, &resolver, &writer, FilesystemKind::TMPFS)
            .await
            .expect_err("second run must not overwrite");

        assert!(err.to_string().contains("persisting seed"));
        assert_eq!(fs::read(&targets[0].secret).expect("read"), first);
        assert_eq!(store.create_calls(), 1);
    }
}
