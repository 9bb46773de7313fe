use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use rust_embed::RustEmbed;
use serde::{de, Deserialize, Deserializer};

use crate::testing::TestCommand;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub test: TestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestConfig {
    #[serde(default = "default_shell")]
    pub shell: PathBuf,
    #[serde(deserialize_with = "deserialize_glob")]
    pub include: glob::Pattern,
    #[serde(default = "default_build_time_limit_ms")]
    pub build_time_limit_ms: u64,
    #[serde(default = "default_exec_time_limit_ms")]
    pub exec_time_limit_ms: u64,
    /// Relative to the problem directory.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default)]
    pub command: Vec<TestCommandConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestCommandConfig {
    #[serde(deserialize_with = "deserialize_glob")]
    pub pattern: glob::Pattern,
    pub build: Option<String>,
    pub run: String,
}

fn default_shell() -> PathBuf {
    PathBuf::from("/bin/sh")
}

fn default_build_time_limit_ms() -> u64 {
    30_000
}

fn default_exec_time_limit_ms() -> u64 {
    3_000
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

fn deserialize_glob<'de, D>(deserializer: D) -> Result<glob::Pattern, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    glob::Pattern::new(&s).map_err(de::Error::custom)
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &str = "leetrun.toml";

    pub fn example_toml() -> String {
        Asset::get(Self::FILENAME)
            .map(|file| String::from_utf8_lossy(file.data.as_ref()).into_owned())
            .unwrap_or_default()
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file in ancestor dirs, including `cur_dir` itself.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
        fsutil::find_file_in_ancestors(cur_dir, Self::FILENAME)
            .context("Not in a leetrun directory (run `leetrun init` first)")
    }

    pub fn from_file_finding_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_filepath = Self::find_file_in_ancestors(cur_dir)?;
        Self::from_toml_file(config_filepath)
    }
}

impl TestConfig {
    pub fn find_test_cmd_for_filename(&self, filename: impl AsRef<str>) -> Option<TestCommand> {
        self.command
            .iter()
            .find(|entry| entry.pattern.matches(filename.as_ref()))
            .map(|entry| TestCommand {
                build: entry.build.clone(),
                run: entry.run.clone(),
            })
    }

    pub fn build_time_limit(&self) -> Duration {
        Duration::from_millis(self.build_time_limit_ms)
    }

    pub fn exec_time_limit(&self) -> Duration {
        Duration::from_millis(self.exec_time_limit_ms)
    }
}
