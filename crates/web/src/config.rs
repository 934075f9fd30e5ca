use std::{
    env, error, fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

use database::{DatabaseConnectionInfo, DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS};
use geocoding::{DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT};

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_WEB_ADDRESS: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid value '{}' for environment variable {}.",
            self.value, self.variable
        )
    }
}

impl error::Error for ConfigError {}

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConnectionInfo,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub web_address: SocketAddr,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|variable| env::var(variable).ok())
    }

    /// Builds the configuration from `lookup`, which returns the value of a
    /// variable if it is set. Unset variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |variable: &str, default: &str| {
            lookup(variable).unwrap_or_else(|| default.to_owned())
        };

        Ok(Self {
            database: DatabaseConnectionInfo {
                url: text("DATABASE_URL", DEFAULT_DATABASE_URL),
                max_connections: parse_positive(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            },
            upload_dir: text("UPLOAD_DIR", DEFAULT_UPLOAD_DIR).into(),
            max_upload_bytes: parse_positive(
                &lookup,
                "UPLOAD_MAX_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            web_address: parse(&lookup, "WEB_ADDRESS", DEFAULT_WEB_ADDRESS)?,
            geocoder_url: text("GEOCODER_URL", DEFAULT_NOMINATIM_URL),
            geocoder_user_agent: text("GEOCODER_USER_AGENT", DEFAULT_USER_AGENT),
        })
    }
}

fn parse<T, F>(lookup: &F, variable: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError { variable, value }),
    }
}

fn parse_positive<T, F>(
    lookup: &F,
    variable: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    F: Fn(&str) -> Option<String>,
{
    let value = parse(lookup, variable, default)?;
    if value == T::default() {
        return Err(ConfigError {
            variable,
            value: lookup(variable).unwrap_or_default(),
        });
    }
    Ok(value)
}
