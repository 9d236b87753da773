//! Governed properties of a deployment, in the order they are reconciled
//!
//! Each [`Property`] names the query that reads its current value, the value
//! the target wants, and the operations that set it. The reconciler never
//! looks inside; adding a property means adding a descriptor here.

use cosmwasm_std::{coin, Binary, Coin, Uint128};
use eyre::{eyre, Result};
use ntt_common::access_control::MINTER_ROLE;
use ntt_common::rate_limit::{bucket_id_inbound, bucket_id_outbound};
use serde::Serialize;
use serde_json::{json, Value};

use ntt_manager::msg::{ExecuteMsg as ManagerExecuteMsg, QueryMsg as ManagerQueryMsg};
use ntt_token::msg::{ExecuteMsg as TokenExecuteMsg, QueryMsg as TokenQueryMsg};
use transceiver_manager::msg::{ExecuteMsg as TmExecuteMsg, QueryMsg as TmQueryMsg};
use wormhole_transceiver::msg::{
    ExecuteMsg as WormholeExecuteMsg, QueryMsg as WormholeQueryMsg,
};

use crate::ledger::Operation;
use crate::registry::Deployment;
use crate::target::{PeerTarget, Target};

/// Storage deposits, in the funding denom
pub const MINTER_FUNDING: u128 = 27_700;
pub const TRANSCEIVER_FUNDING: u128 = 3_200;
pub const PEER_FUNDING: u128 = 78_200;

/// Normalizes a raw query response into the value compared with `desired`
pub type Select = fn(&Value) -> Result<Value>;

pub type Apply = Box<dyn Fn(&ApplyContext) -> Result<Vec<Operation>>>;

pub struct ApplyContext<'a> {
    /// Raw query response
    pub current: &'a Value,
    /// Latest block time, unix seconds
    pub now: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Funding {
    pub recipient: String,
    pub amount: Coin,
}

pub struct Property {
    pub id: String,
    pub contract: String,
    pub query: Value,
    pub desired: Value,
    pub select: Select,
    /// Treat a permanent query error as "not set yet"
    pub absent_on_error: bool,
    pub funding: Option<Funding>,
    pub apply: Apply,
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("contract", &self.contract)
            .field("query", &self.query)
            .field("desired", &self.desired)
            .field("absent_on_error", &self.absent_on_error)
            .field("funding", &self.funding)
            .finish()
    }
}

#[derive(Debug)]
pub enum Planned {
    Property(Property),
    /// Input rejected before any read or write
    Skipped { id: String, reason: String },
}

impl Planned {
    pub fn id(&self) -> &str {
        match self {
            Planned::Property(p) => &p.id,
            Planned::Skipped { id, .. } => id,
        }
    }
}

// ============================================================================
// Selectors
// ============================================================================

fn identity(raw: &Value) -> Result<Value> {
    Ok(raw.clone())
}

fn select_has_role(raw: &Value) -> Result<Value> {
    raw.get("has_role")
        .filter(|v| v.is_boolean())
        .cloned()
        .ok_or_else(|| eyre!("Invalid has_role response: {}", raw))
}

/// The latest scheduled value; it becomes active on its own
fn select_scheduled_delay(raw: &Value) -> Result<Value> {
    raw.pointer("/value/value_1")
        .filter(|v| v.is_u64())
        .cloned()
        .ok_or_else(|| eyre!("Invalid min_upgrade_delay response: {}", raw))
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn single(contract: &str, msg: impl Serialize) -> Result<Apply> {
    let operation = Operation::execute(contract, &msg)?;
    Ok(Box::new(move |_| Ok(vec![operation.clone()])))
}

// ============================================================================
// Plan
// ============================================================================

pub struct Planner<'a> {
    deployment: &'a Deployment,
    target: &'a Target,
    funding_denom: &'a str,
}

impl<'a> Planner<'a> {
    pub fn new(deployment: &'a Deployment, target: &'a Target, funding_denom: &'a str) -> Self {
        Self {
            deployment,
            target,
            funding_denom,
        }
    }

    fn funding(&self, recipient: &str, amount: u128) -> Option<Funding> {
        self.target.fund_storage.then(|| Funding {
            recipient: recipient.to_string(),
            amount: coin(amount, self.funding_denom),
        })
    }

    /// Properties in reconciliation order: token, transceiver registration,
    /// outbound bucket, upgrade delays, then each peer in target order
    pub fn plan(&self) -> Result<Vec<Planned>> {
        let d = self.deployment;
        let mut planned = vec![
            Planned::Property(self.minter()?),
            Planned::Property(self.transceiver_registration()?),
        ];

        let outbound = Binary::from(bucket_id_outbound().to_vec());
        planned.push(Planned::Property(self.rate_duration(
            "ntt_manager/outbound_duration".to_string(),
            outbound.clone(),
            self.target.outbound.duration,
            ManagerExecuteMsg::SetOutboundRateDuration {
                duration: self.target.outbound.duration,
            },
            false,
        )?));
        planned.push(Planned::Property(self.rate_limit(
            "ntt_manager/outbound_limit".to_string(),
            outbound,
            self.target.outbound.limit,
            ManagerExecuteMsg::SetOutboundRateLimit {
                limit: self.target.outbound.limit,
            },
            false,
        )?));

        if let Some(delay) = self.target.min_upgrade_delay {
            for (name, contract) in [
                ("token", &d.token),
                ("ntt_manager", &d.ntt_manager),
                ("transceiver", &d.transceiver),
            ] {
                planned.push(Planned::Property(min_upgrade_delay(
                    name,
                    contract,
                    delay,
                    self.target.inclusion_margin,
                )?));
            }
        }

        for peer in &self.target.peers {
            planned.extend(self.peer(peer)?);
        }
        Ok(planned)
    }

    fn minter(&self) -> Result<Property> {
        let d = self.deployment;
        Ok(Property {
            id: "token/minter".to_string(),
            contract: d.token.clone(),
            query: to_value(&TokenQueryMsg::HasRole {
                role: Binary::from(MINTER_ROLE.to_vec()),
                account: d.ntt_manager.clone(),
            })?,
            desired: Value::Bool(true),
            select: select_has_role,
            absent_on_error: false,
            funding: self.funding(&d.token, MINTER_FUNDING),
            apply: single(
                &d.token,
                TokenExecuteMsg::SetMinter {
                    minter: d.ntt_manager.clone(),
                },
            )?,
        })
    }

    fn transceiver_registration(&self) -> Result<Property> {
        let d = self.deployment;
        Ok(Property {
            id: "transceiver_manager/transceiver".to_string(),
            contract: d.transceiver_manager.clone(),
            query: to_value(&TmQueryMsg::IsTransceiverConfigured {
                handler: d.ntt_manager.clone(),
                transceiver: d.transceiver.clone(),
            })?,
            desired: Value::Bool(true),
            select: identity,
            absent_on_error: false,
            funding: self.funding(&d.transceiver_manager, TRANSCEIVER_FUNDING),
            apply: single(
                &d.transceiver_manager,
                TmExecuteMsg::AddTransceiver {
                    handler: d.ntt_manager.clone(),
                    transceiver: d.transceiver.clone(),
                },
            )?,
        })
    }

    fn rate_duration(
        &self,
        id: String,
        bucket_id: Binary,
        duration: u64,
        msg: ManagerExecuteMsg,
        absent_on_error: bool,
    ) -> Result<Property> {
        let manager = &self.deployment.ntt_manager;
        Ok(Property {
            id,
            contract: manager.clone(),
            query: to_value(&ManagerQueryMsg::RateDuration { bucket_id })?,
            desired: json!(duration),
            select: identity,
            absent_on_error,
            funding: None,
            apply: single(manager, msg)?,
        })
    }

    fn rate_limit(
        &self,
        id: String,
        bucket_id: Binary,
        limit: Uint128,
        msg: ManagerExecuteMsg,
        absent_on_error: bool,
    ) -> Result<Property> {
        let manager = &self.deployment.ntt_manager;
        Ok(Property {
            id,
            contract: manager.clone(),
            query: to_value(&ManagerQueryMsg::RateLimit { bucket_id })?,
            desired: to_value(&limit)?,
            select: identity,
            absent_on_error,
            funding: None,
            apply: single(manager, msg)?,
        })
    }

    /// Wormhole peer, manager peer, then the peer's inbound bucket. A peer
    /// with a malformed address is skipped as a whole.
    fn peer(&self, peer: &PeerTarget) -> Result<Vec<Planned>> {
        let d = self.deployment;
        let chain_id = peer.wormhole_chain_id;
        let prefix = format!("peer/{}", chain_id);

        let addresses = match peer.addresses() {
            Ok(addresses) => addresses,
            Err(reason) => return Ok(vec![Planned::Skipped { id: prefix, reason }]),
        };

        let wormhole_peer = Binary::from(addresses.wormhole_transceiver.to_vec());
        let manager_peer = Binary::from(addresses.ntt_manager.to_vec());
        let decimals = self.target.peer_decimals(peer);

        let wormhole = Property {
            id: format!("{}/wormhole_peer", prefix),
            contract: d.transceiver.clone(),
            query: to_value(&WormholeQueryMsg::WormholePeer { chain_id })?,
            desired: to_value(&Some(wormhole_peer.clone()))?,
            select: identity,
            absent_on_error: false,
            funding: self.funding(&d.transceiver, PEER_FUNDING),
            apply: single(
                &d.transceiver,
                WormholeExecuteMsg::SetWormholePeer {
                    chain_id,
                    peer: wormhole_peer,
                },
            )?,
        };

        let ntt_manager = Property {
            id: format!("{}/ntt_manager_peer", prefix),
            contract: d.ntt_manager.clone(),
            query: to_value(&ManagerQueryMsg::NttManagerPeer { chain_id })?,
            desired: json!({ "peer_contract": manager_peer, "decimals": decimals }),
            select: identity,
            absent_on_error: false,
            funding: self.funding(&d.ntt_manager, PEER_FUNDING),
            apply: manager_peer_apply(d.ntt_manager.clone(), chain_id, manager_peer, decimals),
        };

        let inbound = Binary::from(bucket_id_inbound(chain_id).to_vec());
        let duration = self.rate_duration(
            format!("{}/inbound_duration", prefix),
            inbound.clone(),
            peer.inbound.duration,
            ManagerExecuteMsg::SetInboundRateDuration {
                chain_id,
                duration: peer.inbound.duration,
            },
            true,
        )?;
        let limit = self.rate_limit(
            format!("{}/inbound_limit", prefix),
            inbound,
            peer.inbound.limit,
            ManagerExecuteMsg::SetInboundRateLimit {
                chain_id,
                limit: peer.inbound.limit,
            },
            true,
        )?;

        Ok(vec![
            Planned::Property(wormhole),
            Planned::Property(ntt_manager),
            Planned::Property(duration),
            Planned::Property(limit),
        ])
    }
}

/// An existing peer keeps its decimals until they are changed explicitly, so
/// a decimals change goes first in the same group
fn manager_peer_apply(manager: String, chain_id: u16, peer: Binary, decimals: u8) -> Apply {
    Box::new(move |ctx| {
        let current_decimals = ctx
            .current
            .get("decimals")
            .and_then(Value::as_u64);

        let mut operations = vec![];
        if let Some(current) = current_decimals {
            if current != u64::from(decimals) {
                operations.push(Operation::execute(
                    &manager,
                    &ManagerExecuteMsg::SetNttManagerPeerDecimals { chain_id, decimals },
                )?);
            }
        }

        let current_peer = ctx.current.get("peer_contract");
        if current_decimals.is_none() || current_peer != Some(&to_value(&peer)?) {
            operations.push(Operation::execute(
                &manager,
                &ManagerExecuteMsg::SetNttManagerPeer {
                    chain_id,
                    peer_contract: peer.clone(),
                    decimals,
                },
            )?);
        }
        Ok(operations)
    })
}

/// Scheduled `margin` seconds past the earliest timestamp the active delay
/// allows at `now`; the group lands in a later block than the one read
fn min_upgrade_delay(name: &str, contract: &str, delay: u64, margin: u64) -> Result<Property> {
    // All timelocked contracts share the same message shape
    let query = to_value(&ManagerQueryMsg::MinUpgradeDelay {})?;
    let contract_owned = contract.to_string();
    Ok(Property {
        id: format!("{}/min_upgrade_delay", name),
        contract: contract.to_string(),
        query,
        desired: json!(delay),
        select: select_scheduled_delay,
        absent_on_error: false,
        funding: None,
        apply: Box::new(move |ctx| {
            let active = ctx
                .current
                .get("active")
                .and_then(Value::as_u64)
                .ok_or_else(|| eyre!("Invalid min_upgrade_delay response: {}", ctx.current))?;
            let msg = ManagerExecuteMsg::UpdateMinUpgradeDelay {
                delay,
                timestamp: ctx.now.saturating_add(active).saturating_add(margin),
            };
            Ok(vec![Operation::execute(&contract_owned, &msg)?])
        }),
    })
}
