//! API entry-point: loads settings, wires the store and starts the server.

mod server;

use std::ffi::OsString;

use actix_web::web;
use rand::RngCore as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use ortho_config::OrthoConfig as _;
use yamdb::domain::AuthSettings;
use yamdb::inbound::http::health::HealthState;
use yamdb::outbound::notifier::{ConfiguredNotifier, SmtpConfig};
use yamdb::outbound::persistence::{DbPool, PoolConfig};
use yamdb::settings::{AppSettings, StoreBackend};

use server::{ServerConfig, create_server};

const EPHEMERAL_SECRET_LEN: usize = 32;

/// Read the token secret, or generate a throwaway one in debug builds.
fn token_secret(settings: &AppSettings) -> std::io::Result<Zeroizing<Vec<u8>>> {
    match settings.token_secret.as_deref().filter(|secret| !secret.is_empty()) {
        Some(secret) => Ok(Zeroizing::new(secret.as_bytes().to_vec())),
        None if cfg!(debug_assertions) => {
            warn!("YAMDB_TOKEN_SECRET unset; using an ephemeral token secret (dev only)");
            let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
            rand::thread_rng().fill_bytes(secret.as_mut_slice());
            Ok(secret)
        }
        None => Err(std::io::Error::other(
            "YAMDB_TOKEN_SECRET must be set in release builds",
        )),
    }
}

fn smtp_config(settings: &AppSettings) -> Option<SmtpConfig> {
    settings.smtp_host.as_ref().map(|host| SmtpConfig {
        host: host.clone(),
        port: settings.smtp_port(),
        username: settings.smtp_username.clone(),
        password: settings.smtp_password.clone(),
        from: settings.mail_from().to_owned(),
    })
}

async fn server_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let notifier = ConfiguredNotifier::from_config(smtp_config(settings).as_ref())
        .map_err(std::io::Error::other)?;
    let config = ServerConfig::new(bind_addr, token_secret(settings)?, notifier)
        .with_token_ttl(settings.token_ttl())
        .with_auth_settings(AuthSettings {
            single_use_codes: settings.single_use_codes,
            fail_on_delivery_error: settings.fail_on_delivery_error,
        });

    match settings.store_backend().map_err(std::io::Error::other)? {
        StoreBackend::Memory => {
            info!("using the in-memory store; data is lost on restart");
            Ok(config)
        }
        StoreBackend::Postgres => {
            let url = settings.database_url().map_err(std::io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(std::io::Error::other)?;
            Ok(config.with_db_pool(pool))
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let config = server_config(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}
