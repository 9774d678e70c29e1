//! # Access Registry
//!
//! Owner-managed allow-lists for reporters and reviewers. Authorization is
//! idempotent and there is no revoke.

use super::errors::{LedgerError, LedgerResult};
use super::value_objects::{Address, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Allow-lists for the two roles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessRegistry {
    owner: Address,
    reporters: HashSet<Address>,
    reviewers: HashSet<Address>,
}

impl AccessRegistry {
    /// Create a registry administered by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            reporters: HashSet::new(),
            reviewers: HashSet::new(),
        }
    }

    /// The privileged owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Reject anyone but the owner.
    pub fn require_owner(&self, caller: &Address) -> LedgerResult<()> {
        if *caller != self.owner {
            return Err(LedgerError::NotOwner);
        }
        Ok(())
    }

    /// Reject callers without the reporter role.
    pub fn require_reporter(&self, caller: &Address) -> LedgerResult<()> {
        if !self.is_reporter(caller) {
            return Err(LedgerError::NotReporter);
        }
        Ok(())
    }

    /// Reject callers without the reviewer role.
    pub fn require_reviewer(&self, caller: &Address) -> LedgerResult<()> {
        if !self.is_reviewer(caller) {
            return Err(LedgerError::NotReviewer);
        }
        Ok(())
    }

    /// Grant `role` to `id`. Returns `true` only the first time.
    pub fn authorize(&mut self, caller: &Address, role: Role, id: Address) -> LedgerResult<bool> {
        self.require_owner(caller)?;
        let added = match role {
            Role::Reporter => self.reporters.insert(id),
            Role::Reviewer => self.reviewers.insert(id),
        };
        Ok(added)
    }

    /// Pure lookup.
    pub fn is_reporter(&self, id: &Address) -> bool {
        self.reporters.contains(id)
    }

    /// Pure lookup.
    pub fn is_reviewer(&self, id: &Address) -> bool {
        self.reviewers.contains(id)
    }

    /// Number of holders of `role`.
    pub fn count(&self, role: Role) -> usize {
        match role {
            Role::Reporter => self.reporters.len(),
            Role::Reviewer => self.reviewers.len(),
        }
    }
}
