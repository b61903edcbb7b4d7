//! The HTTP server loop.
//!
//! Built on hyper: a TCP accept loop, one task per connection, and the
//! contract-driven [`Dispatcher`] behind every routed request. Two
//! auxiliary endpoints live outside the contract: `GET /` serves service
//! metadata and `GET /health` probes the database.
//!
//! # Example
//!
//! ```rust,ignore
//! use petstore_server::{Dispatcher, Server, ServerConfig};
//!
//! let server = Server::new(ServerConfig::from_env(), dispatcher, db);
//! server.run().await?;
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use petstore_core::ApiError;
use petstore_store::Database;

use crate::config::ServerConfig;
use crate::dispatch::{DispatchResponse, Dispatcher};
use crate::health::HealthCheck;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Response body type used throughout the server.
pub type ResponseBody = Full<Bytes>;

/// Full HTTP response type.
pub type HttpResponse = Response<ResponseBody>;

/// The petstore HTTP server.
pub struct Server {
    config: ServerConfig,
    dispatcher: Dispatcher,
    health: HealthCheck,
}

impl Server {
    /// Creates a server over a verified dispatcher and an open database.
    #[must_use]
    pub fn new(config: ServerConfig, dispatcher: Dispatcher, db: Database) -> Self {
        let health = HealthCheck::new(
            dispatcher.contract().name().to_string(),
            env!("CARGO_PKG_VERSION"),
            db,
        );
        Self {
            config,
            dispatcher,
            health,
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs the server until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server with a caller-controlled shutdown signal.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!(
                "invalid address '{}': {e}",
                self.config.http_addr()
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        tracing::info!(
            contract = %self.dispatcher.contract().name(),
            operations = self.dispatcher.contract().operations().len(),
            "Server listening on {}",
            addr
        );

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::error!("Connection error from {}: {}", remote_addr, e);
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            "Waiting up to {:?} for {} connection(s) to close",
            shutdown_timeout,
            tracker.active_connections()
        );

        tokio::select! {
            _ = tracker.drained() => {
                tracing::info!("All connections closed");
            }
            _ = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    "Shutdown timeout reached, {} connection(s) still active",
                    tracker.active_connections()
                );
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: tokio::net::TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);

        tokio::select! {
            result = conn => result,
            _ = shutdown.recv() => {
                tracing::debug!("Connection from {} closed due to shutdown", remote_addr);
                Ok(())
            }
        }
    }

    async fn handle_request(
        self: &Arc<Self>,
        req: Request<Incoming>,
    ) -> Result<HttpResponse, Infallible> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(String::from);

        match (method.as_ref(), path.as_str()) {
            ("GET", "/") => return Ok(self.handle_root()),
            ("GET", "/health") => return Ok(self.handle_health().await),
            _ => {}
        }

        let timeout = self.config.request_timeout();

        let body = match tokio::time::timeout(timeout, collect_body(req)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::warn!("Failed to collect request body: {}", e);
                return Ok(error_http_response(&ApiError::bad_request(format!(
                    "Failed to read request body: {e}"
                ))));
            }
            Err(_) => {
                tracing::warn!("Request body collection timed out");
                return Ok(error_http_response(&ApiError::bad_request(
                    "Request body collection timed out",
                )));
            }
        };

        let dispatched = tokio::time::timeout(
            timeout,
            self.dispatcher
                .dispatch(&method, &path, query.as_deref(), body),
        )
        .await;

        match dispatched {
            Ok(response) => Ok(json_response(&response)),
            Err(_) => {
                tracing::error!("Handler timed out for {} {}", method, path);
                Ok(error_http_response(&ApiError::internal(
                    "handler execution timed out",
                )))
            }
        }
    }

    /// `GET /`: service metadata.
    fn handle_root(&self) -> HttpResponse {
        let contract = self.dispatcher.contract();
        let body = serde_json::json!({
            "service": contract.name(),
            "version": env!("CARGO_PKG_VERSION"),
            "contractVersion": contract.version(),
            "operations": contract.operations().len(),
        });
        json_response(&DispatchResponse {
            status: StatusCode::OK,
            body,
        })
    }

    /// `GET /health`: database-backed health probe.
    async fn handle_health(&self) -> HttpResponse {
        let status = self.health.status().await;
        let http_status = if status.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        json_response(&DispatchResponse {
            status: http_status,
            body: serde_json::to_value(&status)
                .unwrap_or_else(|_| serde_json::json!({"status": "unhealthy"})),
        })
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("addr", &self.config.http_addr())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

async fn collect_body(req: Request<Incoming>) -> Result<Bytes, hyper::Error> {
    let collected = req.into_body().collect().await?;
    Ok(collected.to_bytes())
}

fn json_response(response: &DispatchResponse) -> HttpResponse {
    let body = response.body.to_string();
    Response::builder()
        .status(response.status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

fn error_http_response(error: &ApiError) -> HttpResponse {
    let body = serde_json::to_string(&error.to_body())
        .unwrap_or_else(|_| r#"{"code":"INTERNAL_ERROR"}"#.to_string());
    Response::builder()
        .status(error.status_code())
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Server lifecycle errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address could not be bound.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O failure while serving.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
