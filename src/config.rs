use std::time::Duration;

pub const SEED_VAR: &str = "NATURE_SEED";
pub const STATUS_EVERY_VAR: &str = "NATURE_STATUS_EVERY";
pub const IDLE_MINUTES_VAR: &str = "NATURE_IDLE_MINUTES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Fixes the quiz and fact shuffles when set.
    pub seed: Option<u64>,
    /// Minimum gap between two edits of a chat's status message.
    pub status_every: Duration,
    /// How long a lobby or results screen may sit untouched before the
    /// chat's session is shut down.
    pub idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            status_every: Duration::from_secs(1),
            idle_timeout: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number, got {value:?}")]
    NotANumber { name: &'static str, value: String },
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

impl Config {
    /// Reads the process environment. The bot token is picked up separately
    /// by teloxide from `TELOXIDE_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(seed) = lookup(SEED_VAR) {
            config.seed = Some(parse_number(SEED_VAR, &seed)?);
        }

        if let Some(every) = lookup(STATUS_EVERY_VAR) {
            let secs = parse_number(STATUS_EVERY_VAR, &every)?;
            if secs == 0 {
                return Err(ConfigError::Zero {
                    name: STATUS_EVERY_VAR,
                });
            }
            config.status_every = Duration::from_secs(secs);
        }

        if let Some(minutes) = lookup(IDLE_MINUTES_VAR) {
            let minutes = parse_number(IDLE_MINUTES_VAR, &minutes)?;
            if minutes == 0 {
                return Err(ConfigError::Zero {
                    name: IDLE_MINUTES_VAR,
                });
            }
            config.idle_timeout = Duration::from_secs(minutes * 60);
        }

        Ok(config)
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::NotANumber {
            name,
            value: value.to_string(),
        })
}
