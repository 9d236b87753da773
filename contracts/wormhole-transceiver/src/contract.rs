//! Wormhole Transceiver - Entry Points

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdError,
    StdResult, Uint128, WasmMsg,
};
use cw2::set_contract_version;
use ntt_common::access_control::{
    self, check_role, grant_role, RoleIdsResponse, DEFAULT_ADMIN_ROLE, MANAGER_ROLE,
    UPGRADABLE_ADMIN_ROLE,
};
use ntt_common::address::parse_peer_address;
use ntt_common::codec::{MessageReceived, MessageToSend};
use ntt_common::events::{LogBuilder, RECEIVED_MESSAGE, WORMHOLE_PEER_SET};
use ntt_common::fee::fee_funds;
use ntt_common::hash::bytes32_to_hex;
use ntt_common::initialisable::{check_initialised, is_initialised, mark_initialised, set_creator};
use ntt_common::timelock;
use ntt_common::transceiver::{
    deliver_message, execute_send_message, init_transceiver_base, load_transceiver_base,
    query_quote_delivery_price, Transceiver, TransceiverBase,
};
use ntt_common::ContractError;

use crate::msg::{ConfigResponse, ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::payload;
use crate::state::{Config, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, VAAS_CONSUMED, WORMHOLE_PEERS};
use crate::wormhole::{GetStateResponse, ParsedVaa, WormholeExecuteMsg, WormholeQueryMsg};

pub struct WormholeTransceiver;

impl Transceiver for WormholeTransceiver {
    fn quote_delivery_price(
        &self,
        deps: Deps,
        _env: &Env,
        message: &MessageToSend,
        _transceiver_instruction: &[u8],
    ) -> Result<Uint128, ContractError> {
        if !WORMHOLE_PEERS.has(deps.storage, message.destination_chain_id) {
            return Err(ContractError::PeerChainUnknown {
                chain_id: message.destination_chain_id,
            });
        }

        let config = CONFIG.load(deps.storage)?;
        let state: GetStateResponse = deps
            .querier
            .query_wasm_smart(&config.wormhole_core, &WormholeQueryMsg::GetState {})?;
        Ok(state.fee.amount)
    }

    fn send_message(
        &self,
        deps: DepsMut,
        _env: &Env,
        total_fee: Uint128,
        message: &MessageToSend,
        _transceiver_instruction: &[u8],
    ) -> Result<Response, ContractError> {
        check_initialised(deps.storage)?;

        let config = CONFIG.load(deps.storage)?;
        let base = load_transceiver_base(deps.storage)?;
        let post = WasmMsg::Execute {
            contract_addr: config.wormhole_core.to_string(),
            msg: to_json_binary(&WormholeExecuteMsg::PostMessage {
                message: Binary::from(payload::encode(message)?),
                nonce: 0,
            })?,
            funds: fee_funds(total_fee, &base.fee_denom),
        };

        Ok(Response::new()
            .add_message(post)
            .add_attribute("method", "send_message")
            .add_attribute("destination_chain_id", message.destination_chain_id.to_string())
            .add_attribute("wormhole_fee", total_fee))
    }
}

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let transceiver_manager = deps.api.addr_validate(&msg.transceiver_manager)?;
    let wormhole_core = deps.api.addr_validate(&msg.wormhole_core)?;
    init_transceiver_base(
        deps.storage,
        &TransceiverBase {
            transceiver_manager: transceiver_manager.clone(),
            fee_denom: msg.fee_denom,
        },
    )?;
    CONFIG.save(
        deps.storage,
        &Config {
            wormhole_core: wormhole_core.clone(),
            chain_id: msg.chain_id,
        },
    )?;
    set_creator(deps.storage, &info.sender)?;
    timelock::init_timelock(deps.storage, msg.min_upgrade_delay)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("transceiver_manager", transceiver_manager)
        .add_attribute("wormhole_core", wormhole_core)
        .add_attribute("chain_id", msg.chain_id.to_string()))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Initialise { admin } => execute_initialise(deps, info, admin),
        ExecuteMsg::SendMessage {
            fee_payment,
            message,
            transceiver_instruction,
        } => execute_send_message(
            &WormholeTransceiver,
            deps,
            env,
            info,
            fee_payment,
            message,
            transceiver_instruction,
        ),
        ExecuteMsg::SetWormholePeer { chain_id, peer } => {
            execute_set_wormhole_peer(deps, info, chain_id, peer)
        }
        ExecuteMsg::ReceiveMessage { vaa } => execute_receive_message(deps, env, vaa),
        ExecuteMsg::GrantRole { role, account } => {
            access_control::execute_grant_role(deps, info, role, account)
        }
        ExecuteMsg::RevokeRole { role, account } => {
            access_control::execute_revoke_role(deps, info, role, account)
        }
        ExecuteMsg::RenounceRole { role } => {
            access_control::execute_renounce_role(deps, info, role)
        }
        ExecuteMsg::SetRoleAdmin { role, admin_role } => {
            access_control::execute_set_role_admin(deps, info, role, admin_role)
        }
        ExecuteMsg::UpdateMinUpgradeDelay { delay, timestamp } => {
            timelock::execute_update_min_upgrade_delay(deps, env, info, delay, timestamp)
        }
        ExecuteMsg::ScheduleContractUpgrade { code_id, timestamp } => {
            timelock::execute_schedule_contract_upgrade(deps, env, info, code_id, timestamp)
        }
        ExecuteMsg::CancelContractUpgrade {} => {
            timelock::execute_cancel_contract_upgrade(deps, info)
        }
        ExecuteMsg::CompleteContractUpgrade {} => {
            timelock::execute_complete_contract_upgrade(deps, env, info, &MigrateMsg {})
        }
    }
}

fn execute_initialise(
    deps: DepsMut,
    info: MessageInfo,
    admin: String,
) -> Result<Response, ContractError> {
    mark_initialised(deps.storage, &info.sender)?;
    let admin = deps.api.addr_validate(&admin)?;

    let mut events = vec![];
    for role in [DEFAULT_ADMIN_ROLE, UPGRADABLE_ADMIN_ROLE, MANAGER_ROLE] {
        events.extend(grant_role(deps.storage, &role, &admin, &info.sender)?);
    }

    Ok(Response::new()
        .add_events(events)
        .add_attribute("method", "initialise")
        .add_attribute("admin", admin))
}

fn execute_set_wormhole_peer(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u16,
    peer: Binary,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &MANAGER_ROLE, &info.sender)?;

    let config = CONFIG.load(deps.storage)?;
    if chain_id == config.chain_id {
        return Err(ContractError::PeerCannotBeItself);
    }
    let peer = parse_peer_address(&peer)?;
    WORMHOLE_PEERS.save(deps.storage, chain_id, &peer)?;

    let event = LogBuilder::new(&WORMHOLE_PEER_SET)
        .uint16(chain_id)
        .byte32(&peer)
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "set_wormhole_peer")
        .add_attribute("chain_id", chain_id.to_string())
        .add_attribute("peer", bytes32_to_hex(&peer)))
}

fn execute_receive_message(
    deps: DepsMut,
    env: Env,
    vaa: Binary,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;

    let config = CONFIG.load(deps.storage)?;
    let parsed: ParsedVaa = deps.querier.query_wasm_smart(
        &config.wormhole_core,
        &WormholeQueryMsg::VerifyVaa {
            vaa,
            block_time: env.block.time.seconds(),
        },
    )?;

    let peer = WORMHOLE_PEERS
        .may_load(deps.storage, parsed.emitter_chain)?
        .ok_or(ContractError::PeerChainUnknown {
            chain_id: parsed.emitter_chain,
        })?;
    if parsed.emitter_address.as_slice() != peer.as_slice() {
        return Err(ContractError::PeerAddressUnknown);
    }

    let vaa_digest: [u8; 32] =
        parsed
            .hash
            .as_slice()
            .try_into()
            .map_err(|_| ContractError::MalformedEnvelope {
                reason: format!("VAA hash of {} bytes", parsed.hash.len()),
            })?;
    if VAAS_CONSUMED.has(deps.storage, &vaa_digest) {
        return Err(ContractError::VaaAlreadySeen);
    }
    VAAS_CONSUMED.save(deps.storage, &vaa_digest, &true)?;

    let decoded = payload::decode(&parsed.payload)?;
    let received = MessageReceived {
        id: decoded.message_id,
        user_address: decoded.user_address,
        source_chain_id: parsed.emitter_chain,
        source_address: decoded.source_address,
        handler_address: decoded.handler_address,
        payload: decoded.payload,
    };
    let msg = deliver_message(deps.storage, &received)?;

    let event = LogBuilder::new(&RECEIVED_MESSAGE)
        .byte32(&vaa_digest)
        .byte32(&received.id)
        .build()?;
    Ok(Response::new()
        .add_message(msg)
        .add_event(event)
        .add_attribute("method", "receive_message")
        .add_attribute("source_chain_id", parsed.emitter_chain.to_string())
        .add_attribute("sequence", parsed.sequence.to_string()))
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::QuoteDeliveryPrice {
            message,
            transceiver_instruction,
        } => {
            let quote = query_quote_delivery_price(
                &WormholeTransceiver,
                deps,
                env,
                message,
                transceiver_instruction,
            )
            .map_err(|e| StdError::generic_err(e.to_string()))?;
            to_json_binary(&quote)
        }
        QueryMsg::WormholePeer { chain_id } => {
            let peer = WORMHOLE_PEERS
                .may_load(deps.storage, chain_id)?
                .map(|p| Binary::from(p.to_vec()));
            to_json_binary(&peer)
        }
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::TransceiverType {} => to_json_binary("wormhole"),
        QueryMsg::IsVaaConsumed { vaa_digest } => {
            to_json_binary(&VAAS_CONSUMED.has(deps.storage, vaa_digest.as_slice()))
        }
        QueryMsg::HasRole { role, account } => {
            to_json_binary(&access_control::query_has_role(deps, role, account)?)
        }
        QueryMsg::RoleAdmin { role } => {
            to_json_binary(&access_control::query_role_admin(deps, role)?)
        }
        QueryMsg::RoleIds {} => to_json_binary(&RoleIdsResponse::all()),
        QueryMsg::IsInitialised {} => to_json_binary(&is_initialised(deps.storage)?),
        QueryMsg::MinUpgradeDelay {} => {
            to_json_binary(&timelock::query_min_upgrade_delay(deps, env)?)
        }
        QueryMsg::UpgradeStatus {} => to_json_binary(&timelock::query_upgrade_status(deps)?),
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let base = load_transceiver_base(deps.storage)?;
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        transceiver_manager: base.transceiver_manager,
        fee_denom: base.fee_denom,
        wormhole_core: config.wormhole_core,
        chain_id: config.chain_id,
    })
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let response = timelock::apply_scheduled_upgrade(deps.storage, &env)?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(response)
}
