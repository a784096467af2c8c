//! Settings of the `lazyhold` demonstration driver.
//!
//! Every field is optional so that several sources (built-in defaults, a
//! config file, the command line) can be layered with [`Config::update`].
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

pub const SUPPORTED_FILE_NAMES: &[&str] = &["lazyhold.toml", ".lazyhold.toml"];

const DEFAULT_THREADS: usize = 8;
const DEFAULT_CALLS: usize = 1;
const DEFAULT_DELAY_MS: u64 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Number of threads racing for the value.
    pub threads: Option<usize>,

    /// Number of `get_value` calls made by each thread.
    pub calls: Option<usize>,

    /// Time spent constructing the value, in milliseconds.
    pub delay_ms: Option<u64>,

    /// Number of construction attempts that fail before one succeeds.
    pub failures: Option<usize>,
}

impl Config {
    pub fn from_dir(cwd: &Path) -> anyhow::Result<Option<Self>> {
        find_project_files(cwd, SUPPORTED_FILE_NAMES)
            .next()
            .map(|file| Self::from_file(&file))
            .transpose()
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config at `{}`", path.display()))?;

        Self::from_toml(&s).with_context(|| format!("could not parse config at `{}`", path.display()))
    }

    pub fn from_toml(data: &str) -> anyhow::Result<Self> {
        toml::from_str(data).map_err(Into::into)
    }

    pub fn from_defaults() -> Self {
        let empty = Self::default();
        Self {
            threads: Some(empty.threads()),
            calls: Some(empty.calls()),
            delay_ms: Some(DEFAULT_DELAY_MS),
            failures: Some(empty.failures()),
        }
    }

    pub fn update(&mut self, source: &Self) {
        if let Some(source) = source.threads {
            self.threads = Some(source);
        }
        if let Some(source) = source.calls {
            self.calls = Some(source);
        }
        if let Some(source) = source.delay_ms {
            self.delay_ms = Some(source);
        }
        if let Some(source) = source.failures {
            self.failures = Some(source);
        }
    }

    /// At least one thread is always used.
    pub fn threads(&self) -> usize {
        self.threads.unwrap_or(DEFAULT_THREADS).max(1)
    }

    pub fn calls(&self) -> usize {
        self.calls.unwrap_or(DEFAULT_CALLS)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.unwrap_or(DEFAULT_DELAY_MS))
    }

    pub fn failures(&self) -> usize {
        self.failures.unwrap_or(0)
    }
}

fn find_project_files<'a>(
    dir: &'a Path,
    names: &'a [&'a str],
) -> impl Iterator<Item = PathBuf> + 'a {
    names
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.exists())
}
