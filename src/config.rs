use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_MAX_CONNECTIONS, DEFAULT_PAGE_SIZE, DEFAULT_SESSION_HOURS,
    MAX_PAGE_SIZE,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{key} is invalid: {info}")]
    Invalid { key: &'static str, info: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub jwt_secret: String,
    pub session_hours: i64,
    pub page_size: i64,
    pub max_connections: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug, PartialEq, Eq)]
struct PartialServerConfig {
    database_url: Option<String>,
    bind_address: Option<String>,
    jwt_secret: Option<String>,
    session_hours: Option<i64>,
    page_size: Option<i64>,
    max_connections: Option<u32>,
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                key,
                info: e.to_string(),
            }),
        None => Ok(None),
    }
}

impl PartialServerConfig {
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::warn!("Config file {path:?} not found, using environment only");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: lookup("DATABASE_URL"),
            bind_address: lookup("BIND_ADDRESS"),
            jwt_secret: lookup("JWT_SECRET"),
            session_hours: parse_var(&lookup, "SESSION_HOURS")?,
            page_size: parse_var(&lookup, "PAGE_SIZE")?,
            max_connections: parse_var(&lookup, "MAX_CONNECTIONS")?,
        })
    }
}

impl ServerConfig {
    /// Defaults, then the optional TOML file, then the environment (including `.env`).
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path) => PartialServerConfig::from_file(path)?,
            None => PartialServerConfig::default(),
        };
        let env_config =
            PartialServerConfig::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))?;

        Self::merge(env_config, file_config)
    }

    fn merge(env: PartialServerConfig, file: PartialServerConfig) -> Result<Self, ConfigError> {
        let bind_address = env
            .bind_address
            .or(file.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned());
        let bind_address = bind_address
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "BIND_ADDRESS",
                info: e.to_string(),
            })?;

        let session_hours = env
            .session_hours
            .or(file.session_hours)
            .unwrap_or(DEFAULT_SESSION_HOURS);
        if session_hours < 1 {
            return Err(ConfigError::Invalid {
                key: "SESSION_HOURS",
                info: "must be at least 1".to_owned(),
            });
        }

        let page_size = env.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::Invalid {
                key: "PAGE_SIZE",
                info: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        Ok(ServerConfig {
            database_url: env
                .database_url
                .or(file.database_url)
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            bind_address,
            jwt_secret: env
                .jwt_secret
                .or(file.jwt_secret)
                .ok_or(ConfigError::Missing("JWT_SECRET"))?,
            session_hours,
            page_size,
            max_connections: env
                .max_connections
                .or(file.max_connections)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> PartialServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PartialServerConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn defaults_fill_the_gaps() {
        let config = ServerConfig::merge(
            env(&[
                ("DATABASE_URL", "postgres://localhost/foodgram"),
                ("JWT_SECRET", "s3cret"),
            ]),
            PartialServerConfig::default(),
        )
        .unwrap();
        assert_eq!(config.bind_address.port(), 8000);
        assert_eq!(config.session_hours, DEFAULT_SESSION_HOURS);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn environment_overrides_file() {
        let file: PartialServerConfig = toml::from_str(
            r#"
            database_url = "postgres://file/foodgram"
            jwt_secret = "from-file"
            page_size = 10
            "#,
        )
        .unwrap();
        let config = ServerConfig::merge(env(&[("PAGE_SIZE", "12")]), file).unwrap();
        assert_eq!(config.database_url, "postgres://file/foodgram");
        assert_eq!(config.jwt_secret, "from-file");
        assert_eq!(config.page_size, 12);
    }

    #[test]
    fn secret_is_required() {
        let error = ServerConfig::merge(
            env(&[("DATABASE_URL", "postgres://localhost/foodgram")]),
            PartialServerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(error, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let error =
            PartialServerConfig::from_lookup(|key| (key == "PAGE_SIZE").then(|| "six".to_owned()))
                .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { key: "PAGE_SIZE", .. }));
    }
}
