//! Read, compare, apply
//!
//! For every planned property the reconciler reads the current value and
//! submits one atomic group only when it differs from the target. A run
//! stops at the first failed group; groups already submitted stay applied,
//! so a rerun resumes where the last one stopped.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ledger::{ContractQuerier, GroupExecutor, Operation, OperationGroup};
use crate::properties::{ApplyContext, Planned, Planner, Property};
use crate::registry::{DeploymentRegistry, Network};
use crate::retry::{classify_error, with_retry, ErrorClass, RetryConfig};
use crate::target::Target;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("No deployment recorded for {network}")]
    NotDeployed { network: Network },

    #[error("Deployment for {network} is missing {}", .missing.join(", "))]
    IncompleteDeployment {
        network: Network,
        missing: Vec<&'static str>,
    },

    #[error("Failed to read {property}: {reason}")]
    Read { property: String, reason: String },

    #[error("Failed to build operations for {property}: {reason}")]
    Build { property: String, reason: String },

    #[error("Group for {property} failed: {reason}")]
    GroupFailed { property: String, reason: String },

    #[error("Registry error: {0}")]
    Registry(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    AlreadySet,
    Changed { submission: String },
    /// Input rejected; nothing was read or written
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyReport {
    pub id: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub properties: Vec<PropertyReport>,
}

impl ReconcileReport {
    pub fn changed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Changed { .. }))
    }

    pub fn already_set(&self) -> usize {
        self.count(|o| matches!(o, Outcome::AlreadySet))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    /// Every property matched the target without a change
    pub fn is_converged(&self) -> bool {
        self.changed() == 0 && self.skipped() == 0
    }

    pub fn outcome(&self, id: &str) -> Option<&Outcome> {
        self.properties
            .iter()
            .find(|p| p.id == id)
            .map(|p| &p.outcome)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.properties.iter().filter(|p| pred(&p.outcome)).count()
    }

    fn push(&mut self, id: &str, outcome: Outcome) {
        self.properties.push(PropertyReport {
            id: id.to_string(),
            outcome,
        });
    }
}

pub struct Reconciler<Q, E> {
    querier: Q,
    executor: E,
    retry: RetryConfig,
    funding_denom: String,
}

impl<Q: ContractQuerier, E: GroupExecutor> Reconciler<Q, E> {
    pub fn new(querier: Q, executor: E, funding_denom: &str) -> Self {
        Self {
            querier,
            executor,
            retry: RetryConfig::default(),
            funding_denom: funding_denom.to_string(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn querier(&self) -> &Q {
        &self.querier
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_parts(self) -> (Q, E) {
        (self.querier, self.executor)
    }

    /// Converge the deployment recorded for `network` to `target`
    pub async fn run(
        &self,
        registry: &dyn DeploymentRegistry,
        network: Network,
        target: &Target,
    ) -> Result<ReconcileReport, ReconcileError> {
        let contracts = registry
            .get(network)
            .map_err(|e| ReconcileError::Registry(format!("{:#}", e)))?
            .ok_or(ReconcileError::NotDeployed { network })?;
        let deployment = contracts
            .complete()
            .ok_or_else(|| ReconcileError::IncompleteDeployment {
                network,
                missing: contracts.missing(),
            })?;

        info!(
            %network,
            ntt_manager = %deployment.ntt_manager,
            peers = target.peers.len(),
            "Reconciling deployment"
        );

        let planned = Planner::new(&deployment, target, &self.funding_denom)
            .plan()
            .map_err(|e| ReconcileError::Build {
                property: "plan".to_string(),
                reason: format!("{:#}", e),
            })?;

        let mut report = ReconcileReport::default();
        for entry in &planned {
            match entry {
                Planned::Skipped { id, reason } => {
                    warn!(property = %id, %reason, "Skipped");
                    report.push(id, Outcome::Skipped {
                        reason: reason.clone(),
                    });
                }
                Planned::Property(property) => {
                    let outcome = self.converge(property).await?;
                    report.push(&property.id, outcome);
                }
            }
        }

        info!(
            changed = report.changed(),
            already_set = report.already_set(),
            skipped = report.skipped(),
            "Reconciliation complete"
        );
        Ok(report)
    }

    /// A failed submission is never resent as is. Whether or not it landed,
    /// the property is read again and a new group is built from what is
    /// there now, up to the retry budget.
    async fn converge(&self, property: &Property) -> Result<Outcome, ReconcileError> {
        let mut attempt = 0u32;
        let mut unconfirmed = false;
        loop {
            let raw = self.read(property).await?;
            let current = (property.select)(&raw).map_err(|e| ReconcileError::Read {
                property: property.id.clone(),
                reason: format!("{:#}", e),
            })?;

            if current == property.desired {
                if unconfirmed {
                    info!(property = %property.id, "Changed by an unconfirmed submission");
                    return Ok(Outcome::Changed {
                        submission: "unconfirmed".to_string(),
                    });
                }
                info!(property = %property.id, "Already set");
                return Ok(Outcome::AlreadySet);
            }
            debug!(
                property = %property.id,
                current = %current,
                desired = %property.desired,
                attempt,
                "Out of date"
            );

            let group = self.build_group(property, &raw).await?;
            let err = match self.executor.submit(&group).await {
                Ok(submission) => {
                    info!(property = %property.id, %submission, "Changed");
                    return Ok(Outcome::Changed { submission });
                }
                Err(err) => err,
            };

            let reason = format!("{:#}", err);
            if classify_error(&reason) == ErrorClass::Permanent || !self.retry.should_retry(attempt)
            {
                warn!(property = %property.id, error = %reason, "Group failed");
                return Err(ReconcileError::GroupFailed {
                    property: property.id.clone(),
                    reason,
                });
            }
            let backoff = self.retry.backoff_for_attempt(attempt);
            warn!(
                property = %property.id,
                attempt,
                ?backoff,
                error = %reason,
                "Submission outcome unknown, reading again"
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
            unconfirmed = true;
        }
    }

    /// Funding first, then the property's calls, planned against the latest block
    async fn build_group(
        &self,
        property: &Property,
        raw: &Value,
    ) -> Result<OperationGroup, ReconcileError> {
        let now = with_retry(&self.retry, "block_time", || self.querier.block_time())
            .await
            .map_err(|e| ReconcileError::Read {
                property: property.id.clone(),
                reason: format!("{:#}", e),
            })?;

        let mut operations = vec![];
        if let Some(funding) = &property.funding {
            operations.push(Operation::Fund {
                recipient: funding.recipient.clone(),
                amount: funding.amount.clone(),
            });
        }
        let calls = (property.apply)(&ApplyContext { current: raw, now }).map_err(|e| {
            ReconcileError::Build {
                property: property.id.clone(),
                reason: format!("{:#}", e),
            }
        })?;
        operations.extend(calls);

        Ok(OperationGroup {
            label: property.id.clone(),
            operations,
        })
    }

    async fn read(&self, property: &Property) -> Result<Value, ReconcileError> {
        let result = with_retry(&self.retry, &property.id, || {
            self.querier.query_smart(&property.contract, &property.query)
        })
        .await;

        match result {
            Ok(raw) => Ok(raw),
            Err(e)
                if property.absent_on_error
                    && classify_error(&format!("{:#}", e)) == ErrorClass::Permanent =>
            {
                debug!(property = %property.id, error = %e, "Not set yet");
                Ok(Value::Null)
            }
            Err(e) => Err(ReconcileError::Read {
                property: property.id.clone(),
                reason: format!("{:#}", e),
            }),
        }
    }
}
