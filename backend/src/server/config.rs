//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use zeroize::Zeroizing;

use yamdb::domain::AuthSettings;
use yamdb::outbound::notifier::ConfiguredNotifier;
use yamdb::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: Duration,
    pub(crate) auth: AuthSettings,
    pub(crate) notifier: ConfiguredNotifier,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Configuration with the in-memory store, single-use codes, strict
    /// delivery and a one-day token lifetime.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        token_secret: Zeroizing<Vec<u8>>,
        notifier: ConfiguredNotifier,
    ) -> Self {
        Self {
            bind_addr,
            token_secret,
            token_ttl: Duration::from_secs(86_400),
            auth: AuthSettings::default(),
            notifier,
            db_pool: None,
        }
    }

    /// Back the repositories with PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_auth_settings(mut self, auth: AuthSettings) -> Self {
        self.auth = auth;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
