//! Runtime configuration, read from `EMMA_*` environment variables.

use crate::error::ConfigError;
use crate::openai::{DEFAULT_MODEL, OPENAI_API_URL};
use crate::profile::UserProfile;
use std::path::PathBuf;

const DEFAULT_TEMPERATURE: f32 = 0.8;
const DEFAULT_MAX_TOKENS: u32 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    /// Profile used when the database has none yet.
    pub seed_profile: UserProfile,
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("EMMA_API_KEY")
            .or_else(|| get("OPENAI_API_KEY"))
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "EMMA_API_KEY".to_string(),
                hint: "Set EMMA_API_KEY or OPENAI_API_KEY to an API key for the chat completions endpoint."
                    .to_string(),
            })?;

        let data_dir = home_dir().join(".local/share/emma");

        Ok(Self {
            api_key,
            api_url: get("EMMA_API_URL").unwrap_or_else(|| OPENAI_API_URL.to_string()),
            model: get("EMMA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_or(
                "EMMA_TEMPERATURE",
                get("EMMA_TEMPERATURE"),
                DEFAULT_TEMPERATURE,
            )?,
            max_tokens: parse_or("EMMA_MAX_TOKENS", get("EMMA_MAX_TOKENS"), DEFAULT_MAX_TOKENS)?,
            timeout_secs: parse_or(
                "EMMA_TIMEOUT_SECS",
                get("EMMA_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?,
            db_path: get("EMMA_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("emma.db")),
            log_dir: get("EMMA_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("logs")),
            seed_profile: UserProfile {
                nickname: get("EMMA_NICKNAME"),
                age_group: get("EMMA_AGE_GROUP"),
            },
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            api_key: "test-key".to_string(),
            api_url: OPENAI_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: 5,
            db_path: PathBuf::from(":memory:"),
            log_dir: std::env::temp_dir().join("emma-test-logs"),
            seed_profile: UserProfile::default(),
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{:?}: {}", value, e),
        }),
    }
}
