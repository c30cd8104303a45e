use std::str::FromStr;

use log::LevelFilter;

use crate::api::err::{ModelError, ModelResult};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://nilai.db";
const DATABASE_URL: &str = "DATABASE_URL";
const LOG_LEVEL: &str = "NILAI_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// read the process environment, after loading `.env` if there is one
    pub fn from_env() -> ModelResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ModelResult<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(DATABASE_URL).filter(|url| !url.trim().is_empty()) {
            config.database_url = url.trim().to_string();
        }
        if let Some(level) = lookup(LOG_LEVEL) {
            config.log_level = LevelFilter::from_str(level.trim())
                .map_err(|_| ModelError::Config(format!("{}={}", LOG_LEVEL, level)))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://data/grades.db"),
            ("NILAI_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite://data/grades.db");
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_blank_url_keeps_default() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_bad_log_level() {
        let result = Config::from_lookup(lookup(&[("NILAI_LOG", "loud")]));
        assert!(matches!(result, Err(ModelError::Config(_))));
    }
}
