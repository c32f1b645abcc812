// Process configuration.
//
// Everything comes from environment variables; `main` loads `.env` first
// through dotenv so local development only needs a file next to the binary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_STATE_FILE: &str = "state.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Where slash commands get registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    /// Registered for every guild (propagation can take a while).
    Global,
    /// Registered in a single guild, updates are instant.
    Guild(u64),
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub command_scope: CommandScope,
    pub http_host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub state_file: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let command_scope = match get("DISCORD_GUILD_ID") {
            Some(raw) => {
                let id = raw.parse::<u64>().ok().filter(|id| *id > 0).ok_or(
                    ConfigError::Invalid {
                        key: "DISCORD_GUILD_ID",
                        value: raw,
                    },
                )?;
                CommandScope::Guild(id)
            }
            None => CommandScope::Global,
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            token,
            command_scope,
            http_host: get("HTTP_HOST").unwrap_or_else(|| DEFAULT_HTTP_HOST.to_string()),
            port,
            data_dir: PathBuf::from(
                get("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            state_file: get("STATE_FILE").unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
        })
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }

    /// Bind address for the HTTP server. `HTTP_HOST` is an IPv4/IPv6 literal
    /// (brackets optional) or `localhost`.
    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.http_host.trim_start_matches('[').trim_end_matches(']');
        let ip = if host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            host.parse::<IpAddr>().map_err(|_| ConfigError::Invalid {
                key: "HTTP_HOST",
                value: self.http_host.clone(),
            })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn token_is_required() {
        assert_eq!(
            config_from(&[]).unwrap_err(),
            ConfigError::Missing("DISCORD_TOKEN")
        );
        assert_eq!(
            config_from(&[("DISCORD_TOKEN", "   ")]).unwrap_err(),
            ConfigError::Missing("DISCORD_TOKEN")
        );
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = config_from(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.command_scope, CommandScope::Global);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.state_path(), PathBuf::from("data").join("state.json"));
        assert_eq!(
            config.http_addr().unwrap(),
            "0.0.0.0:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn guild_id_switches_to_guild_scope() {
        let config = config_from(&[("DISCORD_TOKEN", "abc"), ("DISCORD_GUILD_ID", "42")]).unwrap();
        assert_eq!(config.command_scope, CommandScope::Guild(42));
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = config_from(&[("DISCORD_TOKEN", "abc"), ("PORT", "http")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT",
                value: "http".to_string()
            }
        );

        let err = config_from(&[("DISCORD_TOKEN", "abc"), ("DISCORD_GUILD_ID", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DISCORD_GUILD_ID",
                ..
            }
        ));
    }

    #[test]
    fn custom_paths_and_bind_address() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DATA_DIR", "/var/lib/desk"),
            ("STATE_FILE", "desk.json"),
            ("HTTP_HOST", "127.0.0.1"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(config.state_path(), PathBuf::from("/var/lib/desk/desk.json"));
        assert_eq!(
            config.http_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn ipv6_and_localhost_hosts_are_accepted() {
        for (host, expected) in [
            ("::", "[::]:3000"),
            ("[::1]", "[::1]:3000"),
            ("localhost", "127.0.0.1:3000"),
        ] {
            let config = config_from(&[("DISCORD_TOKEN", "abc"), ("HTTP_HOST", host)]).unwrap();
            assert_eq!(
                config.http_addr().unwrap(),
                expected.parse::<SocketAddr>().unwrap(),
                "{host}"
            );
        }
    }

    #[test]
    fn bad_host_is_reported() {
        let config = config_from(&[("DISCORD_TOKEN", "abc"), ("HTTP_HOST", "not a host")]).unwrap();
        assert!(config.http_addr().is_err());
    }
}
