//! Integration tests for the Wormhole transceiver using cw-multi-test.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    coin, coins, from_json, to_json_binary, Addr, Binary, Coin, Deps, DepsMut, Empty, Env,
    MessageInfo, Response, StdError, StdResult, Uint128,
};
use cw_multi_test::error::AnyResult;
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};
use cw_storage_plus::Item;

use ntt_common::access_control::{HasRoleResponse, MANAGER_ROLE};
use ntt_common::address::universal_address;
use ntt_common::codec::{MessageReceived, MessageToSend};
use ntt_common::fee::FeePayment;
use ntt_common::transceiver::QuoteResponse;
use wormhole_transceiver::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use wormhole_transceiver::payload;
use wormhole_transceiver::wormhole::{
    GetStateResponse, ParsedVaa, WormholeExecuteMsg, WormholeQueryMsg,
};

const DENOM: &str = "uluna";
const CORE_FEE: u128 = 100;
const LOCAL_CHAIN: u16 = 3;
const REMOTE_CHAIN: u16 = 2;
const REMOTE_PEER: [u8; 32] = [7u8; 32];

// ============================================================================
// Mock Wormhole Core
// ============================================================================

mod mock_core {
    use super::*;

    const FEE: Item<Coin> = Item::new("fee");
    const SEQUENCE: Item<u64> = Item::new("sequence");

    /// Stand-in for a signed VAA: the parsed body plus whether its signatures
    /// would verify
    #[cw_serde]
    pub struct MockVaa {
        pub parsed: ParsedVaa,
        pub signed: bool,
    }

    #[cw_serde]
    pub struct InstantiateMsg {
        pub fee: Coin,
    }

    pub fn instantiate(
        deps: DepsMut,
        _env: Env,
        _info: MessageInfo,
        msg: InstantiateMsg,
    ) -> StdResult<Response> {
        FEE.save(deps.storage, &msg.fee)?;
        SEQUENCE.save(deps.storage, &0)?;
        Ok(Response::new())
    }

    pub fn execute(
        deps: DepsMut,
        _env: Env,
        info: MessageInfo,
        msg: WormholeExecuteMsg,
    ) -> StdResult<Response> {
        match msg {
            WormholeExecuteMsg::PostMessage { message, nonce } => {
                let fee = FEE.load(deps.storage)?;
                let paid: Uint128 = info
                    .funds
                    .iter()
                    .filter(|c| c.denom == fee.denom)
                    .map(|c| c.amount)
                    .sum();
                if paid < fee.amount {
                    return Err(StdError::generic_err("insufficient fee"));
                }
                let sequence = SEQUENCE.load(deps.storage)?;
                SEQUENCE.save(deps.storage, &(sequence + 1))?;
                Ok(Response::new()
                    .add_attribute("message.message", hex::encode(message.as_slice()))
                    .add_attribute("message.sender", info.sender)
                    .add_attribute("message.nonce", nonce.to_string())
                    .add_attribute("message.sequence", sequence.to_string()))
            }
        }
    }

    pub fn query(deps: Deps, _env: Env, msg: WormholeQueryMsg) -> StdResult<Binary> {
        match msg {
            WormholeQueryMsg::GetState {} => to_json_binary(&GetStateResponse {
                fee: FEE.load(deps.storage)?,
            }),
            WormholeQueryMsg::VerifyVaa { vaa, .. } => {
                let vaa: MockVaa = from_json(&vaa)?;
                if !vaa.signed {
                    return Err(StdError::generic_err("invalid guardian signatures"));
                }
                to_json_binary(&vaa.parsed)
            }
        }
    }
}

// ============================================================================
// Test Setup
// ============================================================================

fn contract_wormhole_transceiver() -> Box<dyn cw_multi_test::Contract<Empty>> {
    let contract = ContractWrapper::new(
        wormhole_transceiver::contract::execute,
        wormhole_transceiver::contract::instantiate,
        wormhole_transceiver::contract::query,
    );
    Box::new(contract)
}

fn contract_transceiver_manager() -> Box<dyn cw_multi_test::Contract<Empty>> {
    let contract = ContractWrapper::new(
        transceiver_manager::contract::execute,
        transceiver_manager::contract::instantiate,
        transceiver_manager::contract::query,
    );
    Box::new(contract)
}

fn contract_mock_core() -> Box<dyn cw_multi_test::Contract<Empty>> {
    Box::new(ContractWrapper::new(
        mock_core::execute,
        mock_core::instantiate,
        mock_core::query,
    ))
}

struct Suite {
    app: App,
    core: Addr,
    manager: Addr,
    transceiver: Addr,
    admin: Addr,
    /// Account registered as message handler at the transceiver manager
    handler: Addr,
}

/// Core, transceiver manager and an initialised transceiver registered for an
/// account handler. The handler's threshold is 2 so that a single attestation
/// stays pending instead of dispatching to the account.
fn setup() -> Suite {
    let admin = Addr::unchecked("terra1admin");
    let creator = Addr::unchecked("terra1creator");
    let handler = Addr::unchecked("terra1handler");

    let mut app = App::new(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &handler, coins(1_000_000, DENOM))
            .unwrap();
    });

    let core_code = app.store_code(contract_mock_core());
    let core = app
        .instantiate_contract(
            core_code,
            admin.clone(),
            &mock_core::InstantiateMsg {
                fee: coin(CORE_FEE, DENOM),
            },
            &[],
            "wormhole-core",
            None,
        )
        .unwrap();

    let manager_code = app.store_code(contract_transceiver_manager());
    let manager = app
        .instantiate_contract(
            manager_code,
            admin.clone(),
            &transceiver_manager::msg::InstantiateMsg {
                admin: admin.to_string(),
                fee_denom: DENOM.to_string(),
            },
            &[],
            "transceiver-manager",
            None,
        )
        .unwrap();

    let code_id = app.store_code(contract_wormhole_transceiver());
    let transceiver = app
        .instantiate_contract(
            code_id,
            creator.clone(),
            &InstantiateMsg {
                transceiver_manager: manager.to_string(),
                fee_denom: DENOM.to_string(),
                wormhole_core: core.to_string(),
                chain_id: LOCAL_CHAIN,
                min_upgrade_delay: 86_400,
            },
            &[],
            "wormhole-transceiver",
            Some(admin.to_string()),
        )
        .unwrap();
    app.execute_contract(
        creator,
        transceiver.clone(),
        &ExecuteMsg::Initialise {
            admin: admin.to_string(),
        },
        &[],
    )
    .unwrap();

    app.execute_contract(
        handler.clone(),
        manager.clone(),
        &transceiver_manager::msg::ExecuteMsg::AddMessageHandler {
            admin: admin.to_string(),
        },
        &[],
    )
    .unwrap();
    app.execute_contract(
        admin.clone(),
        manager.clone(),
        &transceiver_manager::msg::ExecuteMsg::AddTransceiver {
            handler: handler.to_string(),
            transceiver: transceiver.to_string(),
        },
        &[],
    )
    .unwrap();
    app.execute_contract(
        admin.clone(),
        manager.clone(),
        &transceiver_manager::msg::ExecuteMsg::SetThreshold {
            handler: handler.to_string(),
            threshold: 2,
        },
        &[],
    )
    .unwrap();

    Suite {
        app,
        core,
        manager,
        transceiver,
        admin,
        handler,
    }
}

impl Suite {
    fn set_peer(&mut self, sender: &Addr, chain_id: u16, peer: Vec<u8>) -> AnyResult<AppResponse> {
        self.app.execute_contract(
            sender.clone(),
            self.transceiver.clone(),
            &ExecuteMsg::SetWormholePeer {
                chain_id,
                peer: Binary::from(peer),
            },
            &[],
        )
    }

    fn outbound(&self, destination_chain_id: u16) -> MessageToSend {
        MessageToSend {
            id: [1u8; 32],
            user_address: [2u8; 32],
            source_address: universal_address(&self.handler),
            destination_chain_id,
            handler_address: [4u8; 32],
            payload: b"transfer".to_vec(),
        }
    }

    fn inbound(&self) -> MessageToSend {
        MessageToSend {
            id: [9u8; 32],
            user_address: [2u8; 32],
            source_address: [5u8; 32],
            destination_chain_id: LOCAL_CHAIN,
            handler_address: universal_address(&self.handler),
            payload: b"redeem".to_vec(),
        }
    }

    fn receive(
        &mut self,
        emitter_chain: u16,
        emitter_address: [u8; 32],
        hash: [u8; 32],
        signed: bool,
    ) -> AnyResult<AppResponse> {
        let vaa = mock_core::MockVaa {
            parsed: ParsedVaa {
                version: 1,
                guardian_set_index: 0,
                timestamp: 0,
                nonce: 0,
                len_signers: 1,
                emitter_chain,
                emitter_address: emitter_address.to_vec(),
                sequence: 0,
                consistency_level: 0,
                payload: payload::encode(&self.inbound()).unwrap(),
                hash: hash.to_vec(),
            },
            signed,
        };
        self.app.execute_contract(
            Addr::unchecked("terra1relayer"),
            self.transceiver.clone(),
            &ExecuteMsg::ReceiveMessage {
                vaa: to_json_binary(&vaa).unwrap(),
            },
            &[],
        )
    }
}

// ============================================================================
// Peers
// ============================================================================

#[test]
fn test_initialise_grants_manager_role() {
    let suite = setup();
    let res: HasRoleResponse = suite
        .app
        .wrap()
        .query_wasm_smart(
            &suite.transceiver,
            &QueryMsg::HasRole {
                role: Binary::from(MANAGER_ROLE.to_vec()),
                account: suite.admin.to_string(),
            },
        )
        .unwrap();
    assert!(res.has_role);
}

#[test]
fn test_set_wormhole_peer() {
    let mut suite = setup();
    let admin = suite.admin.clone();

    let err = suite
        .set_peer(&Addr::unchecked("terra1stranger"), REMOTE_CHAIN, REMOTE_PEER.to_vec())
        .unwrap_err();
    assert!(err.root_cause().to_string().contains("Unauthorized"));

    let err = suite
        .set_peer(&admin, LOCAL_CHAIN, REMOTE_PEER.to_vec())
        .unwrap_err();
    assert!(err
        .root_cause()
        .to_string()
        .contains("Cannot set itself as peer chain"));

    let err = suite.set_peer(&admin, REMOTE_CHAIN, vec![7u8; 31]).unwrap_err();
    assert!(err.root_cause().to_string().contains("Invalid address length"));

    let err = suite.set_peer(&admin, REMOTE_CHAIN, vec![0u8; 32]).unwrap_err();
    assert!(err.root_cause().to_string().contains("Invalid address"));

    let before: Option<Binary> = suite
        .app
        .wrap()
        .query_wasm_smart(
            &suite.transceiver,
            &QueryMsg::WormholePeer {
                chain_id: REMOTE_CHAIN,
            },
        )
        .unwrap();
    assert_eq!(before, None);

    let res = suite
        .set_peer(&admin, REMOTE_CHAIN, REMOTE_PEER.to_vec())
        .unwrap();
    assert!(res.events.iter().any(|e| e.ty == "wasm-WormholePeerSet"));

    let after: Option<Binary> = suite
        .app
        .wrap()
        .query_wasm_smart(
            &suite.transceiver,
            &QueryMsg::WormholePeer {
                chain_id: REMOTE_CHAIN,
            },
        )
        .unwrap();
    assert_eq!(after, Some(Binary::from(REMOTE_PEER.to_vec())));
}

// ============================================================================
// Sending
// ============================================================================

#[test]
fn test_quote_requires_peer() {
    let mut suite = setup();
    let message = Binary::from(suite.outbound(REMOTE_CHAIN).encode().unwrap());
    let quote = QueryMsg::QuoteDeliveryPrice {
        message,
        transceiver_instruction: Binary::default(),
    };

    let err = suite
        .app
        .wrap()
        .query_wasm_smart::<QuoteResponse>(&suite.transceiver, &quote)
        .unwrap_err();
    assert!(err.to_string().contains("Unknown peer chain: 2"));

    let admin = suite.admin.clone();
    suite
        .set_peer(&admin, REMOTE_CHAIN, REMOTE_PEER.to_vec())
        .unwrap();
    let res: QuoteResponse = suite
        .app
        .wrap()
        .query_wasm_smart(&suite.transceiver, &quote)
        .unwrap();
    assert_eq!(res.price, Uint128::new(CORE_FEE));
}

#[test]
fn test_send_posts_payload_to_core() {
    let mut suite = setup();
    let admin = suite.admin.clone();
    suite
        .set_peer(&admin, REMOTE_CHAIN, REMOTE_PEER.to_vec())
        .unwrap();

    let outbound = suite.outbound(REMOTE_CHAIN);
    let res = suite
        .app
        .execute_contract(
            suite.handler.clone(),
            suite.manager.clone(),
            &transceiver_manager::msg::ExecuteMsg::SendMessageToTransceivers {
                fee_payment: FeePayment::new(suite.manager.as_str(), Uint128::new(CORE_FEE)),
                message: Binary::from(outbound.encode().unwrap()),
                transceiver_instructions: vec![],
            },
            &coins(CORE_FEE, DENOM),
        )
        .unwrap();
    assert!(res.events.iter().any(|e| e.ty == "wasm-MessageSent"));

    let posted = res
        .events
        .iter()
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == "message.message")
        .unwrap();
    let decoded = payload::decode(&hex::decode(&posted.value).unwrap()).unwrap();
    assert_eq!(decoded.message_id, outbound.id);
    assert_eq!(decoded.source_address, outbound.source_address);
    assert_eq!(decoded.handler_address, outbound.handler_address);
    assert_eq!(decoded.payload, outbound.payload);

    let balance = suite.app.wrap().query_balance(&suite.core, DENOM).unwrap();
    assert_eq!(balance.amount, Uint128::new(CORE_FEE));
}

// ============================================================================
// Receiving
// ============================================================================

#[test]
fn test_receive_delivers_attestation() {
    let mut suite = setup();
    let admin = suite.admin.clone();
    suite
        .set_peer(&admin, REMOTE_CHAIN, REMOTE_PEER.to_vec())
        .unwrap();

    let res = suite
        .receive(REMOTE_CHAIN, REMOTE_PEER, [0xee; 32], true)
        .unwrap();
    assert!(res.events.iter().any(|e| e.ty == "wasm-ReceivedMessage"));
    assert!(res.events.iter().any(|e| e.ty == "wasm-AttestationReceived"));

    let inbound = suite.inbound();
    let received = MessageReceived {
        id: inbound.id,
        user_address: inbound.user_address,
        source_chain_id: REMOTE_CHAIN,
        source_address: inbound.source_address,
        handler_address: inbound.handler_address,
        payload: inbound.payload,
    };
    let attested: bool = suite
        .app
        .wrap()
        .query_wasm_smart(
            &suite.manager,
            &transceiver_manager::msg::QueryMsg::HasTransceiverAttested {
                message_digest: Binary::from(received.digest().to_vec()),
                transceiver: suite.transceiver.to_string(),
            },
        )
        .unwrap();
    assert!(attested);

    let consumed: bool = suite
        .app
        .wrap()
        .query_wasm_smart(
            &suite.transceiver,
            &QueryMsg::IsVaaConsumed {
                vaa_digest: Binary::from(vec![0xee; 32]),
            },
        )
        .unwrap();
    assert!(consumed);

    let err = suite
        .receive(REMOTE_CHAIN, REMOTE_PEER, [0xee; 32], true)
        .unwrap_err();
    assert!(err.root_cause().to_string().contains("VAA already seen"));
}

#[test]
fn test_receive_rejects_unverified_or_foreign_vaa() {
    let mut suite = setup();
    let admin = suite.admin.clone();
    suite
        .set_peer(&admin, REMOTE_CHAIN, REMOTE_PEER.to_vec())
        .unwrap();

    let err = suite
        .receive(REMOTE_CHAIN, REMOTE_PEER, [0x01; 32], false)
        .unwrap_err();
    assert!(err
        .root_cause()
        .to_string()
        .contains("invalid guardian signatures"));

    let err = suite
        .receive(REMOTE_CHAIN + 10, REMOTE_PEER, [0x02; 32], true)
        .unwrap_err();
    assert!(err.root_cause().to_string().contains("Unknown peer chain: 12"));

    let err = suite
        .receive(REMOTE_CHAIN, [8u8; 32], [0x03; 32], true)
        .unwrap_err();
    assert!(err.root_cause().to_string().contains("Unknown peer address"));

    // failed deliveries leave the VAA unconsumed
    suite
        .receive(REMOTE_CHAIN, REMOTE_PEER, [0x01; 32], true)
        .unwrap();
}
