//! NTT Deployer
//!
//! Reads the configuration of a deployed NTT stack (token, manager,
//! transceiver manager, transceiver), compares it to a declared target and
//! submits only the changes needed to converge. Every change is one atomic
//! operation group, optionally led by a funding transfer.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`target`] - Declarative target loaded from JSON
//! - [`registry`] - Deployed addresses per network
//! - [`ledger`] - Query and atomic-group execution interfaces
//! - [`lcd`] - LCD smart-query client
//! - [`plan`] - Executor that records groups instead of submitting them
//! - [`properties`] - Governed property descriptors, in reconciliation order
//! - [`reconciler`] - The convergence loop
//! - [`retry`] - Backoff and error classification

pub mod config;
pub mod lcd;
pub mod ledger;
pub mod plan;
pub mod properties;
pub mod reconciler;
pub mod registry;
pub mod retry;
pub mod target;

pub use ledger::{ContractQuerier, GroupExecutor, Operation, OperationGroup};
pub use reconciler::{Outcome, PropertyReport, ReconcileError, ReconcileReport, Reconciler};
pub use registry::{
    DeployedContracts, DeploymentRegistry, InMemoryRegistry, JsonFileRegistry, Network,
};
pub use target::{PeerTarget, Target};
