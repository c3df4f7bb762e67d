use anyhow::{Context, Result};

/// Runtime settings for the intake server, loaded from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backlog: u32,
    pub agencies: usize,
    pub winning_number: u32,
}

impl Config {
    /// Loads every setting from the environment, falling back to defaults
    ///
    /// a variable that is present but malformed is a hard error, never a
    /// silent fallback.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: var_or("SERVER_HOST", "0.0.0.0"),
            port: parse_var("SERVER_PORT", 3600)?,
            backlog: parse_var("SERVER_LISTEN_BACKLOG", 128)?,
            agencies: parse_var("AGENCY_COUNT", 5)?,
            winning_number: parse_var("WINNING_NUMBER", 7574)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("the {} environment variable holds an invalid value", key)),
        Err(_) => Ok(default),
    }
}
