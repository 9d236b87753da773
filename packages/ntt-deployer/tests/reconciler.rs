//! Reconciler runs against a full NTT stack in cw-multi-test.

mod common;

use std::cell::Cell;

use async_trait::async_trait;
use cosmwasm_std::{Binary, Uint128};
use ntt_common::access_control::{
    HasRoleResponse, DEFAULT_ADMIN_ROLE, MINTER_ROLE, RATE_LIMITER_MANAGER_ROLE,
};
use ntt_common::rate_limit::{bucket_id_inbound, bucket_id_outbound};
use ntt_common::timelock::MinUpgradeDelayResponse;
use ntt_deployer::plan::PlanRecorder;
use ntt_deployer::properties::{MINTER_FUNDING, PEER_FUNDING, TRANSCEIVER_FUNDING};
use ntt_deployer::retry::RetryConfig;
use ntt_deployer::target::{RateLimitTarget, DEFAULT_INCLUSION_MARGIN};
use ntt_deployer::{
    GroupExecutor, Network, Operation, OperationGroup, Outcome, PeerTarget, ReconcileError,
    Reconciler, Target,
};
use ntt_manager::state::NttManagerPeer;

use common::{deploy, MultiTestExecutor, Stack, DAY, OPERATOR_FUNDS};

const PEER_A: u16 = 2;
const PEER_B: u16 = 4;

fn hex32(byte: u8) -> String {
    format!("0x{}", hex::encode([byte; 32]))
}

fn target() -> Target {
    Target {
        decimals: 6,
        outbound: RateLimitTarget {
            duration: DAY,
            limit: Uint128::new(500_000_000),
        },
        min_upgrade_delay: Some(2 * DAY),
        inclusion_margin: DEFAULT_INCLUSION_MARGIN,
        fund_storage: true,
        peers: vec![
            PeerTarget {
                wormhole_chain_id: PEER_A,
                ntt_manager: hex32(0xaa),
                wormhole_transceiver: hex32(0xbb),
                decimals: Some(18),
                inbound: RateLimitTarget::default(),
            },
            PeerTarget {
                wormhole_chain_id: PEER_B,
                ntt_manager: hex32(0xcc),
                wormhole_transceiver: hex32(0xdd),
                decimals: None,
                inbound: RateLimitTarget {
                    duration: 3_600,
                    limit: Uint128::new(1_000),
                },
            },
        ],
    }
}

/// 4 local properties, 3 upgrade delays, 4 per peer
const PROPERTY_COUNT: usize = 4 + 3 + 2 * 4;

fn reconciler(
    stack: &Stack,
) -> Reconciler<common::MultiTestQuerier, common::MultiTestExecutor> {
    Reconciler::new(stack.querier(), stack.executor(), common::DENOM)
        .with_retry(RetryConfig::none())
}

fn is_minter(stack: &Stack) -> bool {
    let response: HasRoleResponse = stack.query(
        &stack.token,
        &ntt_token::msg::QueryMsg::HasRole {
            role: Binary::from(MINTER_ROLE.to_vec()),
            account: stack.ntt_manager.to_string(),
        },
    );
    response.has_role
}

fn outbound_limit(stack: &Stack) -> Uint128 {
    stack.query(
        &stack.ntt_manager,
        &ntt_manager::msg::QueryMsg::RateLimit {
            bucket_id: Binary::from(bucket_id_outbound().to_vec()),
        },
    )
}

// ============================================================================
// Convergence
// ============================================================================

#[tokio::test]
async fn test_first_run_applies_second_run_holds() {
    let stack = deploy();
    let registry = stack.registry();
    let target = target();
    let reconciler = reconciler(&stack);

    let report = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap();
    assert_eq!(report.properties.len(), PROPERTY_COUNT);
    assert_eq!(report.changed(), PROPERTY_COUNT);
    assert_eq!(reconciler.executor().submitted(), PROPERTY_COUNT);

    // Token and transceiver registration
    assert!(is_minter(&stack));
    let configured: bool = stack.query(
        &stack.transceiver_manager,
        &transceiver_manager::msg::QueryMsg::IsTransceiverConfigured {
            handler: stack.ntt_manager.to_string(),
            transceiver: stack.transceiver.to_string(),
        },
    );
    assert!(configured);

    // Outbound bucket
    let duration: u64 = stack.query(
        &stack.ntt_manager,
        &ntt_manager::msg::QueryMsg::RateDuration {
            bucket_id: Binary::from(bucket_id_outbound().to_vec()),
        },
    );
    assert_eq!(duration, DAY);
    assert_eq!(outbound_limit(&stack), Uint128::new(500_000_000));

    // Upgrade delay scheduled, not yet active
    let delay: MinUpgradeDelayResponse = stack.query(
        &stack.ntt_manager,
        &ntt_manager::msg::QueryMsg::MinUpgradeDelay {},
    );
    assert_eq!(delay.active, DAY);
    assert_eq!(delay.value.value_1, 2 * DAY);

    // Peers
    let peer: Option<NttManagerPeer> = stack.query(
        &stack.ntt_manager,
        &ntt_manager::msg::QueryMsg::NttManagerPeer { chain_id: PEER_A },
    );
    assert_eq!(
        peer,
        Some(NttManagerPeer {
            peer_contract: Binary::from([0xaa; 32].to_vec()),
            decimals: 18,
        })
    );
    let peer: Option<NttManagerPeer> = stack.query(
        &stack.ntt_manager,
        &ntt_manager::msg::QueryMsg::NttManagerPeer { chain_id: PEER_B },
    );
    assert_eq!(peer.unwrap().decimals, 6);

    let wormhole_peer: Option<Binary> = stack.query(
        &stack.transceiver,
        &wormhole_transceiver::msg::QueryMsg::WormholePeer { chain_id: PEER_B },
    );
    assert_eq!(wormhole_peer, Some(Binary::from([0xdd; 32].to_vec())));

    let inbound_limit: Uint128 = stack.query(
        &stack.ntt_manager,
        &ntt_manager::msg::QueryMsg::RateLimit {
            bucket_id: Binary::from(bucket_id_inbound(PEER_B).to_vec()),
        },
    );
    assert_eq!(inbound_limit, Uint128::new(1_000));

    // Storage funding landed with the calls
    assert_eq!(stack.balance(&stack.token), MINTER_FUNDING);
    assert_eq!(stack.balance(&stack.transceiver_manager), TRANSCEIVER_FUNDING);
    assert_eq!(stack.balance(&stack.transceiver), 2 * PEER_FUNDING);
    assert_eq!(stack.balance(&stack.ntt_manager), 2 * PEER_FUNDING);
    assert_eq!(
        stack.balance(&stack.operator),
        OPERATOR_FUNDS - MINTER_FUNDING - TRANSCEIVER_FUNDING - 4 * PEER_FUNDING
    );

    // Second run: nothing to do
    let report = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap();
    assert!(report.is_converged());
    assert_eq!(report.already_set(), PROPERTY_COUNT);
    assert_eq!(reconciler.executor().submitted(), PROPERTY_COUNT);
}

#[tokio::test]
async fn test_resumes_partially_applied_state() {
    let stack = deploy();
    let registry = stack.registry();
    let target = target();

    // Applied by an earlier run that stopped part way
    stack.execute(
        &stack.token,
        &ntt_token::msg::ExecuteMsg::SetMinter {
            minter: stack.ntt_manager.to_string(),
        },
    );
    stack.execute(
        &stack.ntt_manager,
        &ntt_manager::msg::ExecuteMsg::SetOutboundRateDuration { duration: DAY },
    );
    stack.execute(
        &stack.transceiver,
        &wormhole_transceiver::msg::ExecuteMsg::SetWormholePeer {
            chain_id: PEER_A,
            peer: Binary::from([0xbb; 32].to_vec()),
        },
    );

    let reconciler = reconciler(&stack);
    let report = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap();

    for id in [
        "token/minter",
        "ntt_manager/outbound_duration",
        "peer/2/wormhole_peer",
    ] {
        assert_eq!(report.outcome(id), Some(&Outcome::AlreadySet), "{}", id);
    }
    assert_eq!(report.changed(), PROPERTY_COUNT - 3);
    // No storage deposit for what was already set
    assert_eq!(stack.balance(&stack.token), 0);
}

#[tokio::test]
async fn test_peer_decimals_change_in_one_group() {
    let stack = deploy();
    let registry = stack.registry();

    stack.execute(
        &stack.ntt_manager,
        &ntt_manager::msg::ExecuteMsg::SetNttManagerPeer {
            chain_id: PEER_A,
            peer_contract: Binary::from([0x01; 32].to_vec()),
            decimals: 8,
        },
    );

    let reconciler = reconciler(&stack);
    let report = reconciler
        .run(&registry, Network::Localnet, &target())
        .await
        .unwrap();
    assert!(matches!(
        report.outcome("peer/2/ntt_manager_peer"),
        Some(Outcome::Changed { .. })
    ));

    let peer: Option<NttManagerPeer> = stack.query(
        &stack.ntt_manager,
        &ntt_manager::msg::QueryMsg::NttManagerPeer { chain_id: PEER_A },
    );
    assert_eq!(
        peer,
        Some(NttManagerPeer {
            peer_contract: Binary::from([0xaa; 32].to_vec()),
            decimals: 18,
        })
    );
}

// ============================================================================
// Invalid Input And Failures
// ============================================================================

#[tokio::test]
async fn test_malformed_peer_is_skipped() {
    let stack = deploy();
    let registry = stack.registry();
    let mut target = target();
    target.peers.insert(
        0,
        PeerTarget {
            wormhole_chain_id: 5,
            // 20 bytes
            ntt_manager: format!("0x{}", hex::encode([0xee; 20])),
            wormhole_transceiver: hex32(0xef),
            decimals: None,
            inbound: RateLimitTarget::default(),
        },
    );

    let reconciler = reconciler(&stack);
    let report = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap();

    assert!(matches!(report.outcome("peer/5"), Some(Outcome::Skipped { .. })));
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.changed(), PROPERTY_COUNT);

    // Nothing written for the skipped peer, not even the valid address
    let wormhole_peer: Option<Binary> = stack.query(
        &stack.transceiver,
        &wormhole_transceiver::msg::QueryMsg::WormholePeer { chain_id: 5 },
    );
    assert!(wormhole_peer.is_none());

    // A skipped peer keeps the run from reporting convergence
    let report = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap();
    assert_eq!(report.changed(), 0);
    assert!(!report.is_converged());
}

#[tokio::test]
async fn test_failed_group_halts_and_rerun_resumes() {
    let stack = deploy();
    let registry = stack.registry();
    let target = target();

    stack.execute(
        &stack.ntt_manager,
        &ntt_manager::msg::ExecuteMsg::RenounceRole {
            role: Binary::from(RATE_LIMITER_MANAGER_ROLE.to_vec()),
        },
    );

    let reconciler = reconciler(&stack);
    let err = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap_err();
    match &err {
        ReconcileError::GroupFailed { property, reason } => {
            assert_eq!(property, "ntt_manager/outbound_duration");
            assert!(reason.contains("Unauthorized"), "{}", reason);
        }
        other => panic!("unexpected error: {}", other),
    }
    // Earlier properties stay applied, later ones were not attempted
    assert!(is_minter(&stack));
    assert_eq!(reconciler.executor().submitted(), 2);
    assert_eq!(outbound_limit(&stack), Uint128::zero());

    stack.execute(
        &stack.ntt_manager,
        &ntt_manager::msg::ExecuteMsg::GrantRole {
            role: Binary::from(RATE_LIMITER_MANAGER_ROLE.to_vec()),
            account: stack.operator.to_string(),
        },
    );
    let report = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap();
    assert_eq!(report.already_set(), 2);
    assert_eq!(report.changed(), PROPERTY_COUNT - 2);
}

#[tokio::test]
async fn test_failed_group_rolls_back_funding() {
    let stack = deploy();
    let registry = stack.registry();

    // Without DEFAULT_ADMIN on the token the operator cannot grant MINTER
    stack.execute(
        &stack.token,
        &ntt_token::msg::ExecuteMsg::RenounceRole {
            role: Binary::from(DEFAULT_ADMIN_ROLE.to_vec()),
        },
    );

    let reconciler = reconciler(&stack);
    let err = reconciler
        .run(&registry, Network::Localnet, &target())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::GroupFailed { ref property, .. } if property == "token/minter"
    ));

    // The funding transfer was rolled back with the call
    assert_eq!(stack.balance(&stack.token), 0);
    assert_eq!(stack.balance(&stack.operator), OPERATOR_FUNDS);
}

#[tokio::test]
async fn test_upgrade_delay_needs_inclusion_margin() {
    let stack = deploy();
    let registry = stack.registry();
    let mut target = target();
    target.inclusion_margin = 0;

    // Scheduled against the block that was read, rejected in the next one
    let reconciler = reconciler(&stack);
    let err = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap_err();
    match &err {
        ReconcileError::GroupFailed { property, reason } => {
            assert_eq!(property, "token/min_upgrade_delay");
            assert!(reason.contains("before the earliest allowed"), "{}", reason);
        }
        other => panic!("unexpected error: {}", other),
    }

    target.inclusion_margin = DEFAULT_INCLUSION_MARGIN;
    let report = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap();
    for name in ["token", "ntt_manager", "transceiver"] {
        let id = format!("{}/min_upgrade_delay", name);
        assert!(matches!(report.outcome(&id), Some(Outcome::Changed { .. })), "{}", id);
    }
}

/// Lands the first group it is given but reports a timeout for it
struct LostReplyExecutor {
    inner: MultiTestExecutor,
    replies_lost: Cell<usize>,
}

#[async_trait(?Send)]
impl GroupExecutor for LostReplyExecutor {
    async fn submit(&self, group: &OperationGroup) -> eyre::Result<String> {
        let submission = self.inner.submit(group).await?;
        if self.replies_lost.get() == 0 {
            self.replies_lost.set(1);
            return Err(eyre::eyre!("broadcast {}: timed out waiting for tx", submission));
        }
        Ok(submission)
    }
}

#[tokio::test]
async fn test_lost_reply_is_read_back_not_resubmitted() {
    let stack = deploy();
    let registry = stack.registry();
    let target = target();

    let executor = LostReplyExecutor {
        inner: stack.executor(),
        replies_lost: Cell::new(0),
    };
    let reconciler = Reconciler::new(stack.querier(), executor, common::DENOM)
        .with_retry(RetryConfig::new(2, 0));
    let report = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap();

    assert_eq!(
        report.outcome("token/minter"),
        Some(&Outcome::Changed {
            submission: "unconfirmed".to_string()
        })
    );
    assert_eq!(report.changed(), PROPERTY_COUNT);
    // One group per property, the lost one included
    assert_eq!(reconciler.executor().inner.submitted(), PROPERTY_COUNT);
    assert!(is_minter(&stack));
    // Storage paid once
    assert_eq!(stack.balance(&stack.token), MINTER_FUNDING);
}

// ============================================================================
// Dry Run
// ============================================================================

#[tokio::test]
async fn test_plan_recorder_leaves_state_untouched() {
    let stack = deploy();
    let registry = stack.registry();
    let target = target();

    let reconciler = Reconciler::new(stack.querier(), PlanRecorder::new(), common::DENOM)
        .with_retry(RetryConfig::none());
    let report = reconciler
        .run(&registry, Network::Localnet, &target)
        .await
        .unwrap();
    assert_eq!(report.changed(), PROPERTY_COUNT);

    let (_, recorder) = reconciler.into_parts();
    let groups = recorder.into_groups();
    assert_eq!(groups.len(), PROPERTY_COUNT);
    assert_eq!(groups[0].label, "token/minter");
    assert!(matches!(
        &groups[0].operations[0],
        Operation::Fund { recipient, .. } if recipient == stack.token.as_str()
    ));

    assert!(!is_minter(&stack));
    assert_eq!(stack.balance(&stack.operator), OPERATOR_FUNDS);
}
