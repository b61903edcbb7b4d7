//! Binary entry point.
//!
//! Startup order matters: configuration, then storage, then the contract,
//! then the handler registry. Dispatcher construction performs the
//! completeness check, so a contract operation without a handler aborts
//! startup before the listener ever binds.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use petstore::contract::default_contract;
use petstore_core::Contract;
use petstore_server::{Server, ServerConfig};
use petstore_store::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let db = Database::connect(config.database_url())
        .await
        .with_context(|| format!("failed to open database at {}", config.database_url()))?;
    db.init_schema().await.context("failed to apply schema")?;

    let contract = match config.contract_path() {
        Some(path) => Contract::from_file(path)
            .with_context(|| format!("failed to load contract from {path}"))?,
        None => default_contract().context("embedded contract is invalid")?,
    };

    tracing::info!(
        contract = %contract.name(),
        version = %contract.version(),
        operations = contract.operations().len(),
        "Contract loaded"
    );

    let dispatcher = petstore::build_dispatcher(contract, &db)
        .context("handler registry does not cover the contract")?;

    let server = Server::new(config, dispatcher, db.clone());
    let result = server.run().await;

    db.close().await;
    result.context("server terminated with an error")
}
