//! Interfaces to the chain: smart queries, and atomic operation groups
//!
//! A group either lands as a whole, in order, or not at all. The reconciler
//! submits one group per changed property.

use async_trait::async_trait;
use cosmwasm_std::Coin;
use eyre::{Result, WrapErr};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read-only access to contract state
#[async_trait(?Send)]
pub trait ContractQuerier {
    /// Smart query; returns the JSON response body
    async fn query_smart(&self, contract: &str, msg: &Value) -> Result<Value>;

    /// Latest block time, unix seconds
    async fn block_time(&self) -> Result<u64>;
}

/// Submits operation groups on behalf of the operator account
#[async_trait(?Send)]
pub trait GroupExecutor {
    /// Returns an identifier of the submission (tx hash or plan index)
    async fn submit(&self, group: &OperationGroup) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Bank transfer covering the storage the next call allocates
    Fund { recipient: String, amount: Coin },
    Execute { contract: String, msg: Value },
}

impl Operation {
    pub fn execute<M: Serialize>(contract: &str, msg: &M) -> Result<Self> {
        Ok(Operation::Execute {
            contract: contract.to_string(),
            msg: serde_json::to_value(msg).wrap_err("Failed to encode execute message")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationGroup {
    /// Property the group converges
    pub label: String,
    pub operations: Vec<Operation>,
}

/// Typed smart query
pub async fn query<Q, M, T>(querier: &Q, contract: &str, msg: &M) -> Result<T>
where
    Q: ContractQuerier + ?Sized,
    M: Serialize,
    T: DeserializeOwned,
{
    let msg = serde_json::to_value(msg)?;
    let raw = querier.query_smart(contract, &msg).await?;
    serde_json::from_value(raw)
        .wrap_err_with(|| format!("Unexpected query response from {}", contract))
}
