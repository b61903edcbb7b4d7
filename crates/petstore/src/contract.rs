//! The default interface contract shipped with the binary.

use petstore_core::{Contract, ContractError};

/// The embedded contract document.
pub const DEFAULT_CONTRACT_JSON: &str = include_str!("../contract/petstore.json");

/// Parses the embedded default contract.
pub fn default_contract() -> Result<Contract, ContractError> {
    Contract::from_json_str(DEFAULT_CONTRACT_JSON)
}
