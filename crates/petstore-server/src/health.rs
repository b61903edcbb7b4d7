//! Health probing.
//!
//! `GET /health` reports overall status plus the database probe outcome:
//! `{"status": "...", "timestamp": "...", "database": "..."}`. The probe
//! runs a real query through the pool, so a wedged or closed database
//! turns the report unhealthy instead of lying about liveness.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use petstore_store::Database;

/// Health probe over the service's database handle.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    db: Database,
}

impl HealthCheck {
    /// Creates a health check for the given service and database.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>, db: Database) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            db,
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the service version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Probes the database and reports current health.
    pub async fn status(&self) -> HealthStatus {
        let database_ok = self.db.ping().await;
        HealthStatus {
            status: if database_ok { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            database: if database_ok { "connected" } else { "disconnected" }.to_string(),
        }
    }
}

/// Wire shape of the health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Overall status: `healthy` or `unhealthy`.
    pub status: String,
    /// RFC 3339 timestamp of the probe.
    pub timestamp: String,
    /// Database probe outcome: `connected` or `disconnected`.
    pub database: String,
}

impl HealthStatus {
    /// Returns whether the service reported healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
