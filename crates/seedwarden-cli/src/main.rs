mod cli;
mod config;
mod provision;

use clap::Parser;
use color_eyre::Result;
use seedwarden_aws::SecretsManagerStore;
use seedwarden_core::resolver::SeedResolver;
use seedwarden_storage::{fs_inspector::StatfsInspector, secure_file_writer::SecureFileWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point: load the log list, then fetch or mint each seed and place it on tmpfs.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let targets = config::load_from_path(&cli.config)?;

    let resolver = SeedResolver::new(SecretsManagerStore::from_env().await);
    let writer = SecureFileWriter::new(StatfsInspector);

    // A failed run is reported once, by color-eyre.
    provision::provision_all(&targets, &resolver, &writer, cli.filesystem).await?;

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
