use std::{net::IpAddr, path::Path};

use anyhow::Context;
use config::{Environment, File, FileFormat};
use folio_models::email_address::EmailAddressWithName;
use serde::Deserialize;

pub use crate::duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Environment variables prefixed with `FOLIO__` override file values, e.g.
/// `FOLIO__EMAIL__PASSWORD` for `[email] password`.
pub const ENV_PREFIX: &str = "FOLIO";

pub fn load(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub rate_limit: RateLimitConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origin allowed to call the API from a browser. `None` allows any.
    pub frontend_origin: Option<String>,
    pub real_ip: Option<RealIpConfig>,
    /// Registers `GET /api/contact/test`. Leave disabled in production.
    #[serde(default)]
    pub expose_diagnostics: bool,
}

#[derive(Debug, Deserialize)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    /// Use implicit TLS instead of STARTTLS.
    #[serde(default)]
    pub force_tls: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: EmailAddressWithName,
}

impl EmailConfig {
    /// Both user and password must be present for the transport to be
    /// considered configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.user.as_deref().zip(self.password.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    /// Mailbox that receives owner notifications.
    pub email: EmailAddressWithName,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_default_config() {
        let config = load(&[Path::new(DEFAULT_CONFIG_PATH)]).unwrap();
        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.rate_limit.window.as_secs(), 15 * 60);
    }
}
