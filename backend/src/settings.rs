//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `YAMDB_*` environment variables and an
//! optional configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_SECONDS: u64 = 86_400;
const DEFAULT_MAIL_FROM: &str = "from@yamdb.com";
const DEFAULT_SMTP_PORT: u16 = 465;

/// Which store backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

/// Settings errors detected after loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown store backend `{0}`; expected `memory` or `postgres`")]
    UnknownStoreBackend(String),
    #[error("invalid bind address `{value}`: {message}")]
    InvalidBindAddr { value: String, message: String },
    #[error("store backend `postgres` requires YAMDB_DATABASE_URL")]
    MissingDatabaseUrl,
}

/// Runtime configuration for the API server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "YAMDB")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// `memory` or `postgres`.
    pub store_backend: Option<String>,
    /// HMAC key for bearer tokens.
    pub token_secret: Option<String>,
    pub token_ttl_seconds: Option<u64>,
    /// Clear confirmation codes once exchanged.
    #[ortho_config(default = true)]
    pub single_use_codes: bool,
    /// Fail sign-up when the code cannot be delivered.
    #[ortho_config(default = true)]
    pub fail_on_delivery_error: bool,
    pub mail_from: Option<String>,
    /// Enables SMTP delivery when set.
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
}

impl AppSettings {
    /// Parse the bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Resolve the configured store backend, defaulting to memory.
    pub fn store_backend(&self) -> Result<StoreBackend, SettingsError> {
        match self
            .store_backend
            .as_deref()
            .map(|raw| raw.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("memory") => Ok(StoreBackend::Memory),
            Some("postgres") => Ok(StoreBackend::Postgres),
            Some(other) => Err(SettingsError::UnknownStoreBackend(other.to_owned())),
        }
    }

    /// Database URL, required when the postgres backend is selected.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds.unwrap_or(DEFAULT_TOKEN_TTL_SECONDS))
    }

    pub fn mail_from(&self) -> &str {
        self.mail_from.as_deref().unwrap_or(DEFAULT_MAIL_FROM)
    }

    /// Port of the SMTP relay; implicit TLS by default.
    pub fn smtp_port(&self) -> u16 {
        self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 12] = [
        "YAMDB_BIND_ADDR",
        "YAMDB_DATABASE_URL",
        "YAMDB_STORE_BACKEND",
        "YAMDB_TOKEN_SECRET",
        "YAMDB_TOKEN_TTL_SECONDS",
        "YAMDB_SINGLE_USE_CODES",
        "YAMDB_FAIL_ON_DELIVERY_ERROR",
        "YAMDB_MAIL_FROM",
        "YAMDB_SMTP_HOST",
        "YAMDB_SMTP_PORT",
        "YAMDB_SMTP_USERNAME",
        "YAMDB_SMTP_PASSWORD",
    ];

    fn cleared_except(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("yamdb")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared_except(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket addr")
        );
        assert_eq!(settings.store_backend(), Ok(StoreBackend::Memory));
        assert_eq!(settings.token_ttl(), Duration::from_secs(86_400));
        assert!(settings.single_use_codes);
        assert!(settings.fail_on_delivery_error);
        assert_eq!(settings.mail_from(), "from@yamdb.com");
        assert!(settings.smtp_host.is_none());
        assert!(settings.token_secret.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_except(&[
            ("YAMDB_BIND_ADDR", "127.0.0.1:9000"),
            ("YAMDB_STORE_BACKEND", "Postgres"),
            ("YAMDB_DATABASE_URL", "postgres://yamdb@localhost/yamdb"),
            ("YAMDB_TOKEN_TTL_SECONDS", "60"),
            ("YAMDB_SINGLE_USE_CODES", "false"),
            ("YAMDB_SMTP_HOST", "smtp.example.com"),
            ("YAMDB_SMTP_PORT", "2525"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("socket addr")
        );
        assert_eq!(settings.store_backend(), Ok(StoreBackend::Postgres));
        assert_eq!(settings.database_url(), Ok("postgres://yamdb@localhost/yamdb"));
        assert_eq!(settings.token_ttl(), Duration::from_secs(60));
        assert!(!settings.single_use_codes);
        assert_eq!(settings.smtp_host.as_deref(), Some("smtp.example.com"));
        assert_eq!(settings.smtp_port(), 2525);
    }

    #[rstest]
    fn unknown_backends_are_rejected() {
        let _guard = lock_env(cleared_except(&[("YAMDB_STORE_BACKEND", "sqlite")]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.store_backend(),
            Err(SettingsError::UnknownStoreBackend("sqlite".to_owned()))
        );
    }

    #[rstest]
    fn postgres_requires_a_database_url() {
        let _guard = lock_env(cleared_except(&[("YAMDB_STORE_BACKEND", "postgres")]));

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Err(SettingsError::MissingDatabaseUrl));
    }
}
