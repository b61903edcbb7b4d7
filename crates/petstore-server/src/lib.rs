//! Contract-driven HTTP surface for the petstore service.
//!
//! The dispatcher is generic over the interface contract: routes are built
//! from the contract's operation declarations, requests are validated and
//! coerced against the declared schemas, and handlers are invoked through a
//! registry keyed by operation id. At startup the registry is checked for
//! completeness against the contract; a missing handler is a configuration
//! failure and the server refuses to start.
//!
//! # Example
//!
//! ```rust,ignore
//! use petstore_server::{Dispatcher, HandlerRegistry, Server, ServerConfig};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("getPetById", get_pet_by_id);
//! // ... one handler per contract operation ...
//!
//! let dispatcher = Dispatcher::new(contract, registry)?;
//! let server = Server::new(ServerConfig::from_env(), dispatcher, db);
//! server.run().await?;
//! ```

pub mod config;
pub mod dispatch;
pub mod handler;
pub mod health;
pub mod router;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use dispatch::{Dispatcher, DispatchResponse};
pub use handler::{HandlerRegistry, MissingHandlers};
pub use health::{HealthCheck, HealthStatus};
pub use router::{RouteMatch, Router};
pub use server::{Server, ServerError};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
