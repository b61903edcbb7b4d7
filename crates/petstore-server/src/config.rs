//! Server configuration.
//!
//! Built via the builder, with environment overrides for deployment:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `PETSTORE_HTTP_ADDR` | HTTP bind address |
//! | `PETSTORE_DATABASE_URL` | SQLite connection URL |
//! | `PETSTORE_CONTRACT_PATH` | Path to the interface contract document |
//!
//! # Example
//!
//! ```rust
//! use petstore_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("127.0.0.1:3000")
//!     .shutdown_timeout(Duration::from_secs(10))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "127.0.0.1:3000");
//! ```

use std::net::SocketAddr;
use std::time::Duration;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Default SQLite connection URL.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://petstore.db";

/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Server configuration.
///
/// Use [`ServerConfig::builder()`] to construct instances, or
/// [`ServerConfig::from_env()`] to apply environment overrides on top of
/// the defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address (e.g. "0.0.0.0:8080").
    http_addr: String,

    /// SQLite connection URL.
    database_url: String,

    /// Path to an interface contract document; `None` uses the embedded
    /// default.
    contract_path: Option<String>,

    /// How long to wait for in-flight requests during shutdown.
    shutdown_timeout: Duration,

    /// Applies to body collection and handler execution, separately.
    request_timeout: Duration,
}

impl ServerConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    /// Builds a configuration from defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut builder = Self::builder();
        if let Ok(addr) = std::env::var("PETSTORE_HTTP_ADDR") {
            builder = builder.http_addr(addr);
        }
        if let Ok(url) = std::env::var("PETSTORE_DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Ok(path) = std::env::var("PETSTORE_CONTRACT_PATH") {
            builder = builder.contract_path(path);
        }
        builder.build()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses the HTTP address as a `SocketAddr`.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// Returns the SQLite connection URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the contract document path, if one was configured.
    #[must_use]
    pub fn contract_path(&self) -> Option<&str> {
        self.contract_path.as_deref()
    }

    /// Returns the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    http_addr: String,
    database_url: String,
    contract_path: Option<String>,
    shutdown_timeout: Duration,
    request_timeout: Duration,
}

impl ServerConfigBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            contract_path: None,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the SQLite connection URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    /// Sets the path to the interface contract document.
    #[must_use]
    pub fn contract_path(mut self, path: impl Into<String>) -> Self {
        self.contract_path = Some(path.into());
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr,
            database_url: self.database_url,
            contract_path: self.contract_path,
            shutdown_timeout: self.shutdown_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
