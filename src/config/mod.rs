//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `CERS_*` environment variables.

pub mod error;
mod miner;
mod validator;


pub use error::ConfigError;
pub use miner::MinerConfig;
pub use validator::ValidatorConfig;

use std::env;
use std::fmt::Display;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

fn parse_port_from_env(var_name: &str, default: u16) -> Result<u16, ConfigError> {
    match env::var(var_name) {
        Ok(value) => {
            let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                value: value.clone(),
                source: e,
            })?;

            if port == 0 {
                return Err(ConfigError::InvalidPort { value });
            }

            Ok(port)
        }
        Err(_) => Ok(default),
    }
}

fn parse_bind_addr_from_env(var_name: &str, default: IpAddr) -> Result<IpAddr, ConfigError> {
    match env::var(var_name) {
        Ok(value) => value
            .parse()
            .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
        Err(_) => Ok(default),
    }
}

/// Parses any `FromStr` value; an unset or blank variable yields `default`.
fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match non_empty_var(var_name) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: var_name,
            value,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_optional_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    non_empty_var(var_name)
        .map(|value| {
            value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: var_name,
                value,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_secs_from_env(var_name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    let Some(value) = non_empty_var(var_name) else {
        return Ok(default);
    };

    let secs: f64 = value.parse().map_err(|e: std::num::ParseFloatError| {
        ConfigError::InvalidValue {
            name: var_name,
            value: value.clone(),
            reason: e.to_string(),
        }
    })?;

    Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::InvalidValue {
        name: var_name,
        value,
        reason: e.to_string(),
    })
}

fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = non_empty_var(var_name) else {
        return Ok(default);
    };

    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: var_name,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
    non_empty_var(var_name).map(PathBuf::from).unwrap_or(default)
}

fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
    non_empty_var(var_name).map(PathBuf::from)
}

fn non_empty_var(var_name: &str) -> Option<String> {
    env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_dir(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn require_positive(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}
