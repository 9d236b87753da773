//! cw-multi-test ledger adapter and a deployed NTT stack to reconcile

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use cosmwasm_std::{coins, to_json_binary, Addr, BankMsg, CosmosMsg, Empty, WasmMsg};
use cw_multi_test::{App, ContractWrapper, Executor};
use eyre::{eyre, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use ntt_deployer::{
    ContractQuerier, DeployedContracts, DeploymentRegistry, GroupExecutor, InMemoryRegistry,
    Network, Operation, OperationGroup,
};

pub const DENOM: &str = "uluna";
pub const DAY: u64 = 86_400;
pub const LOCAL_CHAIN: u16 = 3;
pub const OPERATOR_FUNDS: u128 = 10_000_000;
pub const BLOCK_SECONDS: u64 = 6;

pub type SharedApp = Rc<RefCell<App>>;

// ============================================================================
// Ledger Adapter
// ============================================================================

pub struct MultiTestQuerier {
    app: SharedApp,
}

impl MultiTestQuerier {
    pub fn new(app: SharedApp) -> Self {
        Self { app }
    }
}

#[async_trait(?Send)]
impl ContractQuerier for MultiTestQuerier {
    async fn query_smart(&self, contract: &str, msg: &Value) -> Result<Value> {
        let app = self.app.borrow();
        let response: Value = app.wrap().query_wasm_smart(contract, msg)?;
        Ok(response)
    }

    async fn block_time(&self) -> Result<u64> {
        Ok(self.app.borrow().block_info().time.seconds())
    }
}

/// Runs each group with `execute_multi`, which commits all messages or none,
/// in a fresh block
pub struct MultiTestExecutor {
    app: SharedApp,
    sender: Addr,
    submitted: Cell<usize>,
}

impl MultiTestExecutor {
    pub fn new(app: SharedApp, sender: Addr) -> Self {
        Self {
            app,
            sender,
            submitted: Cell::new(0),
        }
    }

    /// Groups that landed
    pub fn submitted(&self) -> usize {
        self.submitted.get()
    }
}

fn to_cosmos_msg(operation: &Operation) -> Result<CosmosMsg> {
    Ok(match operation {
        Operation::Fund { recipient, amount } => BankMsg::Send {
            to_address: recipient.clone(),
            amount: vec![amount.clone()],
        }
        .into(),
        Operation::Execute { contract, msg } => WasmMsg::Execute {
            contract_addr: contract.clone(),
            msg: to_json_binary(msg)?,
            funds: vec![],
        }
        .into(),
    })
}

#[async_trait(?Send)]
impl GroupExecutor for MultiTestExecutor {
    async fn submit(&self, group: &OperationGroup) -> Result<String> {
        let msgs = group
            .operations
            .iter()
            .map(to_cosmos_msg)
            .collect::<Result<Vec<_>>>()?;

        // A group lands in a later block than the one the reconciler read
        let mut app = self.app.borrow_mut();
        app.update_block(|block| {
            block.height += 1;
            block.time = block.time.plus_seconds(BLOCK_SECONDS);
        });
        app.execute_multi(self.sender.clone(), msgs)
            .map_err(|e| eyre!("{:#}", e))?;

        self.submitted.set(self.submitted.get() + 1);
        Ok(format!("{}-{}", app.block_info().height, group.label))
    }
}

// ============================================================================
// Deployment
// ============================================================================

pub struct Stack {
    pub app: SharedApp,
    pub operator: Addr,
    pub token: Addr,
    pub ntt_manager: Addr,
    pub transceiver_manager: Addr,
    pub transceiver: Addr,
}

fn contract_token() -> Box<dyn cw_multi_test::Contract<Empty>> {
    Box::new(ContractWrapper::new(
        ntt_token::contract::execute,
        ntt_token::contract::instantiate,
        ntt_token::contract::query,
    ))
}

fn contract_transceiver_manager() -> Box<dyn cw_multi_test::Contract<Empty>> {
    Box::new(ContractWrapper::new(
        transceiver_manager::contract::execute,
        transceiver_manager::contract::instantiate,
        transceiver_manager::contract::query,
    ))
}

fn contract_wormhole_transceiver() -> Box<dyn cw_multi_test::Contract<Empty>> {
    Box::new(ContractWrapper::new(
        wormhole_transceiver::contract::execute,
        wormhole_transceiver::contract::instantiate,
        wormhole_transceiver::contract::query,
    ))
}

fn contract_ntt_manager() -> Box<dyn cw_multi_test::Contract<Empty>> {
    Box::new(ContractWrapper::new(
        ntt_manager::contract::execute,
        ntt_manager::contract::instantiate,
        ntt_manager::contract::query,
    ))
}

/// Token, transceiver manager, Wormhole transceiver and manager, each
/// initialised with the operator as admin, and nothing else configured
pub fn deploy() -> Stack {
    let operator = Addr::unchecked("terra1operator");
    let mut app = App::new(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &operator, coins(OPERATOR_FUNDS, DENOM))
            .unwrap();
    });

    let token_code = app.store_code(contract_token());
    let tm_code = app.store_code(contract_transceiver_manager());
    let transceiver_code = app.store_code(contract_wormhole_transceiver());
    let manager_code = app.store_code(contract_ntt_manager());

    let token = app
        .instantiate_contract(
            token_code,
            operator.clone(),
            &ntt_token::msg::InstantiateMsg {
                name: "Wrapped Token".to_string(),
                symbol: "WTKN".to_string(),
                decimals: 6,
                initial_balances: vec![],
                min_upgrade_delay: DAY,
                existing_asset: None,
            },
            &[],
            "ntt-token",
            None,
        )
        .unwrap();
    app.execute_contract(
        operator.clone(),
        token.clone(),
        &ntt_token::msg::ExecuteMsg::Initialise {
            admin: operator.to_string(),
        },
        &[],
    )
    .unwrap();

    let transceiver_manager = app
        .instantiate_contract(
            tm_code,
            operator.clone(),
            &transceiver_manager::msg::InstantiateMsg {
                admin: operator.to_string(),
                fee_denom: DENOM.to_string(),
            },
            &[],
            "transceiver-manager",
            None,
        )
        .unwrap();

    let transceiver = app
        .instantiate_contract(
            transceiver_code,
            operator.clone(),
            &wormhole_transceiver::msg::InstantiateMsg {
                transceiver_manager: transceiver_manager.to_string(),
                fee_denom: DENOM.to_string(),
                wormhole_core: "terra1wormholecore".to_string(),
                chain_id: LOCAL_CHAIN,
                min_upgrade_delay: DAY,
            },
            &[],
            "wormhole-transceiver",
            None,
        )
        .unwrap();
    app.execute_contract(
        operator.clone(),
        transceiver.clone(),
        &wormhole_transceiver::msg::ExecuteMsg::Initialise {
            admin: operator.to_string(),
        },
        &[],
    )
    .unwrap();

    let ntt_manager = app
        .instantiate_contract(
            manager_code,
            operator.clone(),
            &ntt_manager::msg::InstantiateMsg {
                token: token.to_string(),
                transceiver_manager: transceiver_manager.to_string(),
                chain_id: LOCAL_CHAIN,
                fee_denom: DENOM.to_string(),
                bech32_prefix: "terra".to_string(),
                min_upgrade_delay: DAY,
            },
            &[],
            "ntt-manager",
            None,
        )
        .unwrap();
    app.execute_contract(
        operator.clone(),
        ntt_manager.clone(),
        &ntt_manager::msg::ExecuteMsg::Initialise {
            admin: operator.to_string(),
        },
        &[],
    )
    .unwrap();

    Stack {
        app: Rc::new(RefCell::new(app)),
        operator,
        token,
        ntt_manager,
        transceiver_manager,
        transceiver,
    }
}

impl Stack {
    pub fn registry(&self) -> InMemoryRegistry {
        let mut registry = InMemoryRegistry::new();
        registry
            .put(
                Network::Localnet,
                DeployedContracts {
                    token: Some(self.token.to_string()),
                    ntt_manager: Some(self.ntt_manager.to_string()),
                    transceiver_manager: Some(self.transceiver_manager.to_string()),
                    transceiver: Some(self.transceiver.to_string()),
                },
            )
            .unwrap();
        registry
    }

    pub fn querier(&self) -> MultiTestQuerier {
        MultiTestQuerier::new(self.app.clone())
    }

    pub fn executor(&self) -> MultiTestExecutor {
        MultiTestExecutor::new(self.app.clone(), self.operator.clone())
    }

    pub fn query<T: DeserializeOwned>(&self, contract: &Addr, msg: &impl Serialize) -> T {
        self.app
            .borrow()
            .wrap()
            .query_wasm_smart(contract, msg)
            .unwrap()
    }

    /// Direct execution as the operator, outside the reconciler
    pub fn execute(&self, contract: &Addr, msg: &(impl Serialize + std::fmt::Debug)) {
        self.app
            .borrow_mut()
            .execute_contract(self.operator.clone(), contract.clone(), msg, &[])
            .unwrap();
    }

    pub fn balance(&self, address: &Addr) -> u128 {
        self.app
            .borrow()
            .wrap()
            .query_balance(address, DENOM)
            .unwrap()
            .amount
            .u128()
    }
}
