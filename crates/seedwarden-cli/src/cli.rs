use std::path::PathBuf;

use clap::Parser;
use seedwarden_core::filesystem::FilesystemKind;

/// CLI surface definition. One run provisions every log in the config.
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(
    name = "seedwarden",
    about = "Fetch or mint per-log secret seeds and place them on tmpfs",
    version
)]
pub struct Cli {
    /// Path to the YAML config listing each log's name, inception date and secret path.
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,

    /// Filesystem type (statfs magic, decimal or 0x-prefixed) that seed files must land on.
    #[arg(long, value_name = "KIND", default_value_t = FilesystemKind::TMPFS)]
    pub filesystem: FilesystemKind,
}
