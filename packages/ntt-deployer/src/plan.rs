//! Dry-run executor: records groups instead of submitting them

use std::cell::RefCell;

use async_trait::async_trait;
use eyre::Result;
use tracing::info;

use crate::ledger::{GroupExecutor, OperationGroup};

#[derive(Debug, Default)]
pub struct PlanRecorder {
    groups: RefCell<Vec<OperationGroup>>,
}

impl PlanRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.borrow().is_empty()
    }

    pub fn groups(&self) -> Vec<OperationGroup> {
        self.groups.borrow().clone()
    }

    pub fn into_groups(self) -> Vec<OperationGroup> {
        self.groups.into_inner()
    }
}

#[async_trait(?Send)]
impl GroupExecutor for PlanRecorder {
    async fn submit(&self, group: &OperationGroup) -> Result<String> {
        let mut groups = self.groups.borrow_mut();
        groups.push(group.clone());
        info!(
            label = %group.label,
            operations = group.operations.len(),
            "Planned group"
        );
        Ok(format!("plan-{}", groups.len() - 1))
    }
}
