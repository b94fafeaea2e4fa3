//! Validation override gate.
//!
//! Splits classified actions into those that may proceed and those that
//! block deployment. Actions without a validation id (restarts) always
//! proceed. Gated actions (refeeds) proceed only when a live override
//! approves their id; otherwise they block. Allowed actions are reported in
//! either case, since they still have to be carried out after deployment.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::action::RequiredAction;
use crate::domain::validation_id::ValidationId;
use crate::obs;
use crate::overrides::{OverridesFile, ValidationOverrides};

/// Days an auto-generated override request stays valid.
pub const OVERRIDE_REQUEST_DAYS: i64 = 7;

/// Actions split by the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateOutcome {
    pub allowed: Vec<RequiredAction>,
    pub blocking: Vec<RequiredAction>,
}

impl GateOutcome {
    pub fn passed(&self) -> bool {
        self.blocking.is_empty()
    }

    /// `Ok(allowed)` when nothing blocks, otherwise the blocked change.
    pub fn into_result(self) -> Result<Vec<RequiredAction>, BlockedChange> {
        if self.blocking.is_empty() {
            Ok(self.allowed)
        } else {
            Err(BlockedChange {
                blocking: self.blocking,
                allowed: self.allowed,
            })
        }
    }
}

/// Apply `overrides` to `actions` at time `now`.
pub fn gate(
    actions: Vec<RequiredAction>,
    overrides: &ValidationOverrides,
    now: DateTime<Utc>,
) -> GateOutcome {
    let mut outcome = GateOutcome::default();

    for action in actions {
        match action.validation_id() {
            Some(id) if !overrides.allows(id, now) => {
                obs::emit_change_blocked(&action);
                outcome.blocking.push(action);
            }
            _ => outcome.allowed.push(action),
        }
    }

    obs::emit_gate_evaluated(outcome.allowed.len(), outcome.blocking.len());
    outcome
}

/// Refeed-class changes that lack an approving override.
///
/// Carries every blocking action with its message, validation id and
/// services, plus the allowed actions that would also be required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedChange {
    pub blocking: Vec<RequiredAction>,
    pub allowed: Vec<RequiredAction>,
}

impl BlockedChange {
    /// Distinct ids an operator would have to approve.
    pub fn validation_ids(&self) -> BTreeSet<ValidationId> {
        self.blocking
            .iter()
            .filter_map(RequiredAction::validation_id)
            .collect()
    }

    /// An override file approving every blocking id for
    /// [`OVERRIDE_REQUEST_DAYS`] days from `now`.
    pub fn override_request(&self, now: DateTime<Utc>) -> OverridesFile {
        let until = now.date_naive() + Duration::days(OVERRIDE_REQUEST_DAYS);
        let messages: Vec<&str> = self.blocking.iter().map(RequiredAction::message).collect();
        OverridesFile::for_ids(self.validation_ids(), until, &messages.join("; "))
    }
}

impl fmt::Display for BlockedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deployment blocked: {} change(s) require a validation override",
            self.blocking.len()
        )?;
        for action in &self.blocking {
            write!(f, "\n  {}", action)?;
        }
        Ok(())
    }
}
