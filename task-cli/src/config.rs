use crate::service::CorruptDataPolicy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

const CONFIG_FILE: &str = "task-cli";
const ENV_PREFIX: &str = "TASK_CLI";

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Location of the task file.
    #[serde(default = "default_file")]
    pub file: PathBuf,
    /// Most verbose level written to stderr, e.g. `warn` or `debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Refuse to operate on a task file that cannot be parsed.
    #[serde(default)]
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: default_file(),
            log_level: default_log_level(),
            strict: false,
        }
    }
}

impl Config {
    /// Loads configuration from an optional `task-cli.toml` (or `.json`, `.yaml`)
    /// in the working directory, then `TASK_CLI_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::build(None)
    }

    /// Same as [`Config::from_env`], reading variables from `env` instead of the
    /// process environment when given.
    pub fn build(env: Option<HashMap<String, String>>) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn corrupt_data_policy(&self) -> CorruptDataPolicy {
        if self.strict {
            CorruptDataPolicy::Abort
        } else {
            CorruptDataPolicy::Recover
        }
    }
}

fn default_file() -> PathBuf {
    PathBuf::from("tasks.json")
}

fn default_log_level() -> String {
    "warn".to_string()
}
