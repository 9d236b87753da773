//! Peer managers on remote chains.

use cosmwasm_std::{Binary, DepsMut, Env, MessageInfo, Response, Storage, Uint128};
use ntt_common::access_control::{check_role, NTT_MANAGER_ADMIN_ROLE};
use ntt_common::address::parse_peer_address;
use ntt_common::events::{LogBuilder, NTT_MANAGER_PEER_SET};
use ntt_common::hash::{bytes32_to_hex, parse_bytes32};
use ntt_common::initialisable::check_initialised;
use ntt_common::rate_limit::{add_bucket, bucket_id_inbound};
use ntt_common::ContractError;

use crate::state::{NttManagerPeer, CONFIG, NTT_MANAGER_PEERS};

pub(crate) fn load_peer(
    storage: &dyn Storage,
    chain_id: u16,
) -> Result<NttManagerPeer, ContractError> {
    NTT_MANAGER_PEERS
        .may_load(storage, chain_id)?
        .ok_or(ContractError::PeerChainUnknown { chain_id })
}

fn peer_set_response(
    method: &str,
    chain_id: u16,
    peer: &[u8; 32],
    decimals: u8,
    is_new: bool,
) -> Result<Response, ContractError> {
    let event = LogBuilder::new(&NTT_MANAGER_PEER_SET)
        .uint16(chain_id)
        .byte32(peer)
        .uint8(decimals)
        .boolean(is_new)
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", method)
        .add_attribute("chain_id", chain_id.to_string())
        .add_attribute("peer_contract", bytes32_to_hex(peer))
        .add_attribute("decimals", decimals.to_string()))
}

pub fn execute_set_ntt_manager_peer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    chain_id: u16,
    peer_contract: Binary,
    decimals: u8,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &NTT_MANAGER_ADMIN_ROLE, &info.sender)?;

    let config = CONFIG.load(deps.storage)?;
    if chain_id == config.chain_id {
        return Err(ContractError::PeerCannotBeItself);
    }
    if decimals == 0 {
        return Err(ContractError::InvalidPeerDecimals);
    }
    let peer = parse_peer_address(&peer_contract)?;

    let existing = NTT_MANAGER_PEERS.may_load(deps.storage, chain_id)?;
    if let Some(existing) = &existing {
        if existing.decimals != decimals {
            return Err(ContractError::PeerDecimalsMismatch {
                recorded: existing.decimals,
                requested: decimals,
            });
        }
    }
    let is_new = existing.is_none();
    if is_new {
        add_bucket(
            deps.storage,
            &bucket_id_inbound(chain_id),
            Uint128::zero(),
            0,
            env.block.time.seconds(),
        )?;
    }

    NTT_MANAGER_PEERS.save(
        deps.storage,
        chain_id,
        &NttManagerPeer {
            peer_contract: Binary::from(peer.to_vec()),
            decimals,
        },
    )?;

    peer_set_response("set_ntt_manager_peer", chain_id, &peer, decimals, is_new)
}

/// Rescales future transfers only; queued transfers keep their trimmed amount.
pub fn execute_set_ntt_manager_peer_decimals(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u16,
    decimals: u8,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &NTT_MANAGER_ADMIN_ROLE, &info.sender)?;
    if decimals == 0 {
        return Err(ContractError::InvalidPeerDecimals);
    }

    let mut peer = load_peer(deps.storage, chain_id)?;
    peer.decimals = decimals;
    NTT_MANAGER_PEERS.save(deps.storage, chain_id, &peer)?;

    let address = parse_bytes32(&peer.peer_contract)?;
    peer_set_response(
        "set_ntt_manager_peer_decimals",
        chain_id,
        &address,
        decimals,
        false,
    )
}
