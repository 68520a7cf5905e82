use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_PHOTOS_URL: &str = "https://jsonplaceholder.typicode.com/photos";

#[derive(Debug, Parser)]
#[command(
    name = "photogate",
    version,
    about = "Login-gated photo listing proxy backed by Redis"
)]
pub struct Cli {
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    #[arg(long, short = 'u', value_name = "FILE")]
    pub users_file: Option<PathBuf>,

    #[arg(long, value_name = "URL")]
    pub redis_url: Option<String>,

    #[arg(long, value_name = "URL")]
    pub photos_url: Option<String>,

    /// Session lifetime, e.g. `1h` or `90m`.
    #[arg(long, value_name = "DURATION")]
    pub session_ttl: Option<String>,

    /// How long the shared photo listing stays cached, e.g. `30s`.
    #[arg(long, value_name = "DURATION")]
    pub photo_cache_ttl: Option<String>,

    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub users_file: PathBuf,
    pub redis_url: String,
    pub photos_url: String,
    pub session_ttl_seconds: u64,
    pub photo_cache_ttl_seconds: u64,
    pub upstream_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid duration for {key}: {value}")]
    InvalidDuration { key: String, value: String },
    #[error("non-unicode value for env var {key}")]
    InvalidEnv { key: String },
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind: Option<SocketAddr>,
    users_file: Option<PathBuf>,
    redis_url: Option<String>,
    photos_url: Option<String>,
    session_ttl: Option<String>,
    photo_cache_ttl: Option<String>,
    upstream_timeout: Option<String>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let from_file = read_file_config(cli.config.as_deref())?;

        let bind = cli
            .bind
            .or(from_file.bind)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));
        let users_file = cli
            .users_file
            .or(from_file.users_file)
            .unwrap_or_else(|| PathBuf::from("users.json"));
        let redis_url = cli
            .redis_url
            .or(read_env_string("PHOTOGATE_REDIS_URL")?)
            .or(from_file.redis_url)
            .unwrap_or_else(|| String::from(DEFAULT_REDIS_URL));
        let photos_url = cli
            .photos_url
            .or(read_env_string("PHOTOGATE_PHOTOS_URL")?)
            .or(from_file.photos_url)
            .unwrap_or_else(|| String::from(DEFAULT_PHOTOS_URL));

        let session_ttl = cli.session_ttl.or(from_file.session_ttl);
        let photo_cache_ttl = cli.photo_cache_ttl.or(from_file.photo_cache_ttl);

        Ok(Self {
            bind,
            users_file,
            redis_url,
            photos_url,
            session_ttl_seconds: ttl_seconds("session_ttl", session_ttl.as_deref(), 3600)?,
            photo_cache_ttl_seconds: ttl_seconds(
                "photo_cache_ttl",
                photo_cache_ttl.as_deref(),
                30,
            )?,
            upstream_timeout: parse_duration(
                "upstream_timeout",
                from_file.upstream_timeout.as_deref(),
            )?
            .unwrap_or(Duration::from_secs(60)),
        })
    }
}

fn read_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn read_env_string(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidEnv {
            key: String::from(key),
        }),
    }
}

fn parse_duration(key: &str, raw: Option<&str>) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    humantime::parse_duration(raw.trim())
        .map(Some)
        .map_err(|_| ConfigError::InvalidDuration {
            key: String::from(key),
            value: String::from(raw),
        })
}

/// Redis `EX` takes whole seconds, so sub-second values are clamped to 1.
fn ttl_seconds(key: &str, raw: Option<&str>, default: u64) -> Result<u64, ConfigError> {
    Ok(parse_duration(key, raw)?
        .map(|duration| duration.as_secs())
        .unwrap_or(default)
        .max(1))
}
