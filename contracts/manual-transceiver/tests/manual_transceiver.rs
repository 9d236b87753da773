//! Integration tests for the manual transceiver using cw-multi-test.

use cosmwasm_std::{coins, Addr, Binary, Empty, Uint128};
use cw_multi_test::error::AnyResult;
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};

use manual_transceiver::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use ntt_common::address::universal_address;
use ntt_common::codec::{MessageReceived, MessageToSend};
use ntt_common::fee::FeePayment;
use ntt_common::transceiver::QuoteResponse;

const DENOM: &str = "uluna";
const FEE: u128 = 100;

fn contract_manual_transceiver() -> Box<dyn cw_multi_test::Contract<Empty>> {
    let contract = ContractWrapper::new(
        manual_transceiver::contract::execute,
        manual_transceiver::contract::instantiate,
        manual_transceiver::contract::query,
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

struct Suite {
    app: App,
    transceiver: Addr,
    manager: Addr,
    admin: Addr,
}

/// Transceiver bound to a plain account standing in for the transceiver manager
fn setup() -> Suite {
    let creator = Addr::unchecked("terra1creator");
    let admin = Addr::unchecked("terra1admin");
    let manager = Addr::unchecked("terra1manager");

    let mut app = App::new(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &manager, coins(1_000_000, DENOM))
            .unwrap();
    });

    let code_id = app.store_code(contract_manual_transceiver());
    let transceiver = app
        .instantiate_contract(
            code_id,
            creator.clone(),
            &InstantiateMsg {
                transceiver_manager: manager.to_string(),
                fee_denom: DENOM.to_string(),
                message_fee: Uint128::new(FEE),
                min_upgrade_delay: 86_400,
            },
            &[],
            "manual-transceiver",
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

    Suite {
        app,
        transceiver,
        manager,
        admin,
    }
}

fn message() -> Binary {
    Binary::from(
        MessageToSend {
            id: [1u8; 32],
            user_address: [2u8; 32],
            source_address: [3u8; 32],
            destination_chain_id: 2,
            handler_address: [4u8; 32],
            payload: b"payload".to_vec(),
        }
        .encode()
        .unwrap(),
    )
}

fn send(
    suite: &mut Suite,
    receiver: &str,
    declared: u128,
    attached: u128,
) -> AnyResult<AppResponse> {
    let funds = if attached == 0 {
        vec![]
    } else {
        coins(attached, DENOM)
    };
    suite.app.execute_contract(
        suite.manager.clone(),
        suite.transceiver.clone(),
        &ExecuteMsg::SendMessage {
            fee_payment: FeePayment::new(receiver, Uint128::new(declared)),
            message: message(),
            transceiver_instruction: Binary::from(vec![0xaa]),
        },
        &funds,
    )
}

// ============================================================================
// Quoting And Sending
// ============================================================================

#[test]
fn test_quote_is_message_fee() {
    let suite = setup();
    let quote: QuoteResponse = suite
        .app
        .wrap()
        .query_wasm_smart(
            &suite.transceiver,
            &QueryMsg::QuoteDeliveryPrice {
                message: message(),
                transceiver_instruction: Binary::default(),
            },
        )
        .unwrap();
    assert_eq!(quote.price, Uint128::new(FEE));
}

#[test]
fn test_exact_fee_is_accepted() {
    let mut suite = setup();
    let receiver = suite.transceiver.to_string();
    let res = send(&mut suite, &receiver, FEE, FEE).unwrap();

    assert!(res.events.iter().any(|e| e.ty == "wasm-MessageSent"));
    assert!(res.events.iter().any(|e| e.ty == "wasm-InternalQuoteDeliveryPrice"));
    let sent = res
        .events
        .iter()
        .find(|e| e.ty == "wasm-InternalSendMessage")
        .unwrap();
    assert!(sent
        .attributes
        .iter()
        .any(|a| a.key == "total_fee" && a.value == FEE.to_string()));

    let balance = suite
        .app
        .wrap()
        .query_balance(&suite.transceiver, DENOM)
        .unwrap();
    assert_eq!(balance.amount, Uint128::new(FEE));
}

#[test]
fn test_fee_off_by_one_is_rejected() {
    let mut suite = setup();
    let receiver = suite.transceiver.to_string();
    for paid in [FEE - 1, FEE + 1] {
        let err = send(&mut suite, &receiver, paid, paid).unwrap_err();
        assert!(err.root_cause().to_string().contains("Incorrect payment"));
    }

    // declared amount disagrees with attached funds
    let err = send(&mut suite, &receiver, FEE, FEE + 1).unwrap_err();
    assert!(err.root_cause().to_string().contains("Incorrect payment"));
}

#[test]
fn test_wrong_payment_receiver_is_rejected() {
    let mut suite = setup();
    let err = send(&mut suite, "terra1elsewhere", FEE, FEE).unwrap_err();
    assert!(err
        .root_cause()
        .to_string()
        .contains("Unknown fee payment receiver"));
}

#[test]
fn test_only_transceiver_manager_sends() {
    let mut suite = setup();
    suite.manager = Addr::unchecked("terra1admin");
    let receiver = suite.transceiver.to_string();
    let err = send(&mut suite, &receiver, 0, 0).unwrap_err();
    assert!(err.root_cause().to_string().contains("Unauthorized caller"));
}

#[test]
fn test_set_message_fee() {
    let mut suite = setup();
    let err = suite
        .app
        .execute_contract(
            Addr::unchecked("terra1stranger"),
            suite.transceiver.clone(),
            &ExecuteMsg::SetMessageFee {
                message_fee: Uint128::zero(),
            },
            &[],
        )
        .unwrap_err();
    assert!(err.root_cause().to_string().contains("Unauthorized"));

    suite
        .app
        .execute_contract(
            suite.admin.clone(),
            suite.transceiver.clone(),
            &ExecuteMsg::SetMessageFee {
                message_fee: Uint128::new(250),
            },
            &[],
        )
        .unwrap();
    let fee: Uint128 = suite
        .app
        .wrap()
        .query_wasm_smart(&suite.transceiver, &QueryMsg::MessageFee {})
        .unwrap();
    assert_eq!(fee, Uint128::new(250));
}

// ============================================================================
// Delivery
// ============================================================================

#[test]
fn test_relayer_delivers_to_transceiver_manager() {
    // the manager contract is instantiated first so its address is known
    let mut app = App::default();
    let admin = Addr::unchecked("terra1admin");
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

    let creator = Addr::unchecked("terra1creator");
    let code_id = app.store_code(contract_manual_transceiver());
    let transceiver = app
        .instantiate_contract(
            code_id,
            creator.clone(),
            &InstantiateMsg {
                transceiver_manager: manager.to_string(),
                fee_denom: DENOM.to_string(),
                message_fee: Uint128::zero(),
                min_upgrade_delay: 86_400,
            },
            &[],
            "manual-transceiver",
            None,
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

    // an account registers as handler; threshold 2 keeps the message pending
    let handler = Addr::unchecked("terra1handler");
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

    let received = MessageReceived {
        id: [8u8; 32],
        user_address: [2u8; 32],
        source_chain_id: 2,
        source_address: [3u8; 32],
        handler_address: universal_address(&handler),
        payload: b"payload".to_vec(),
    };
    let deliver = ExecuteMsg::DeliverMessage {
        message: Binary::from(received.encode().unwrap()),
    };

    let err = app
        .execute_contract(
            Addr::unchecked("terra1stranger"),
            transceiver.clone(),
            &deliver,
            &[],
        )
        .unwrap_err();
    assert!(err.root_cause().to_string().contains("Unauthorized"));

    let res = app
        .execute_contract(admin, transceiver.clone(), &deliver, &[])
        .unwrap();
    assert!(res.events.iter().any(|e| e.ty == "wasm-AttestationReceived"));

    let attested: bool = app
        .wrap()
        .query_wasm_smart(
            &manager,
            &transceiver_manager::msg::QueryMsg::HasTransceiverAttested {
                message_digest: Binary::from(received.digest().to_vec()),
                transceiver: transceiver.to_string(),
            },
        )
        .unwrap();
    assert!(attested);
}
