use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{
    eyre::{bail, WrapErr},
    Result,
};
use seedwarden_core::identity::{InceptionDate, LogIdentity};
use serde::Deserialize;

/// The subset of a Sunlight config we need. Unknown keys are ignored so the
/// log server's own config file can be passed as is.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub logs: Vec<LogConfig>,
}

/// Per-log entry. Missing fields deserialize as empty and are rejected by `validate`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Fully qualified log name; also the remote secret identifier.
    #[serde(default)]
    pub name: String,
    /// `YYYY-MM-DD` day on which the seed may be created.
    #[serde(default)]
    pub inception: String,
    /// Where the log server expects to find its seed file.
    #[serde(default)]
    pub secret: PathBuf,
}

/// A validated log: who it is and where its seed goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub identity: LogIdentity,
    pub secret: PathBuf,
}

/// Read, parse and validate the config at `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<LogTarget>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config file {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .wrap_err_with(|| format!("parsing config file {}", path.display()))?;
    config
        .validate()
        .wrap_err_with(|| format!("validating config file {}", path.display()))
}

impl Config {
    pub fn validate(&self) -> Result<Vec<LogTarget>> {
        if self.logs.is_empty() {
            bail!("no logs found");
        }

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(self.logs.len());
        for log in &self.logs {
            if log.name.is_empty() || log.inception.is_empty() || log.secret.as_os_str().is_empty()
            {
                bail!("incomplete config for log {:?}", log.name);
            }

            let inception = log.inception.parse::<InceptionDate>().wrap_err_with(|| {
                format!(
                    "log {:?} has invalid inception date {:?} (want YYYY-MM-DD)",
                    log.name, log.inception
                )
            })?;

            if !seen.insert(log.secret.as_path()) {
                bail!(
                    "log {:?} reuses secret path {}",
                    log.name,
                    log.secret.display()
                );
            }

            targets.push(LogTarget {
                identity: LogIdentity::new(log.name.clone(), inception),
                secret: log.secret.clone(),
            });
        }
        Ok(targets)
    }
}
