//! Client-side withdrawal state machine
//!
//! ```text
//! Unconfigured -> Idle -> Checking -> Locked | Eligible -> Submitting -> Submitted
//! ```
//!
//! Any failed fetch drops back to `Idle` with the error surfaced; a failed
//! withdraw request returns to `Eligible`. The flow only predicts what the
//! contract will accept; the contract's own guard is authoritative.

use alloy_primitives::{Address, U256};
use thiserror::Error;
use tracing::debug;

use crate::domain::vault::{
    is_withdrawal_eligible, ErrorKind, TransactionIntent, VaultError,
};
use crate::infrastructure::gateway::Gateway;
use crate::modules::vault::Vault;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalState {
    /// Configuration gate has not passed yet
    Unconfigured,
    Idle,
    /// Unlock time requested, not yet known
    Checking,
    Locked { unlock_time: U256 },
    Eligible { unlock_time: U256 },
    Submitting { unlock_time: U256 },
    /// Intent handed to the wallet; awaiting its outcome
    Submitted {
        unlock_time: U256,
        intent: TransactionIntent,
    },
}

impl WithdrawalState {
    pub fn name(&self) -> &'static str {
        match self {
            WithdrawalState::Unconfigured => "unconfigured",
            WithdrawalState::Idle => "idle",
            WithdrawalState::Checking => "checking",
            WithdrawalState::Locked { .. } => "locked",
            WithdrawalState::Eligible { .. } => "eligible",
            WithdrawalState::Submitting { .. } => "submitting",
            WithdrawalState::Submitted { .. } => "submitted",
        }
    }

    pub fn unlock_time(&self) -> Option<U256> {
        match self {
            WithdrawalState::Locked { unlock_time }
            | WithdrawalState::Eligible { unlock_time }
            | WithdrawalState::Submitting { unlock_time }
            | WithdrawalState::Submitted { unlock_time, .. } => Some(*unlock_time),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Most recent failure, kept as a display message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfacedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&VaultError> for SurfacedError {
    fn from(err: &VaultError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct WithdrawalFlow {
    state: WithdrawalState,
    last_error: Option<SurfacedError>,
}

impl WithdrawalFlow {
    pub fn new() -> Self {
        Self {
            state: WithdrawalState::Unconfigured,
            last_error: None,
        }
    }

    pub fn state(&self) -> &WithdrawalState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&SurfacedError> {
        self.last_error.as_ref()
    }

    fn transition(&mut self, next: WithdrawalState) {
        debug!(from = self.state.name(), to = next.name(), "withdrawal flow");
        self.state = next;
    }

    fn surface(&mut self, err: &VaultError) {
        self.last_error = Some(err.into());
    }

    /// Fetch the unlock time and classify it against `now`.
    ///
    /// Allowed from any state so a dropped in-flight request can be retried.
    pub async fn fetch<G: Gateway>(
        &mut self,
        vault: &Vault<G>,
        now: u64,
    ) -> Result<&WithdrawalState, FlowError> {
        self.last_error = None;

        if !vault.is_configured() {
            let err = VaultError::NotConfigured;
            self.surface(&err);
            self.transition(WithdrawalState::Unconfigured);
            return Err(err.into());
        }
        if self.state == WithdrawalState::Unconfigured {
            self.transition(WithdrawalState::Idle);
        }

        self.transition(WithdrawalState::Checking);
        match vault.unlock_time().await {
            Ok(unlock_time) => {
                self.transition(classify(unlock_time, now));
                Ok(&self.state)
            }
            Err(err) => {
                self.surface(&err);
                self.transition(WithdrawalState::Idle);
                Err(err.into())
            }
        }
    }

    /// Re-evaluate `Locked`/`Eligible` against a fresh timestamp
    pub fn refresh_eligibility(&mut self, now: u64) -> &WithdrawalState {
        if let WithdrawalState::Locked { unlock_time } | WithdrawalState::Eligible { unlock_time } =
            self.state
        {
            let next = classify(unlock_time, now);
            if next != self.state {
                self.transition(next);
            }
        }
        &self.state
    }

    /// Request the withdrawal transaction for the connected wallet.
    ///
    /// Only honoured in `Eligible` after re-checking eligibility at `now`.
    pub async fn withdraw<G: Gateway>(
        &mut self,
        vault: &Vault<G>,
        caller: Option<Address>,
        now: u64,
    ) -> Result<TransactionIntent, FlowError> {
        self.refresh_eligibility(now);
        let WithdrawalState::Eligible { unlock_time } = self.state else {
            return Err(FlowError::InvalidTransition {
                state: self.state.name(),
                action: "withdraw",
            });
        };

        self.last_error = None;
        self.transition(WithdrawalState::Submitting { unlock_time });
        match vault.withdraw(caller).await {
            Ok(intent) => {
                self.transition(WithdrawalState::Submitted {
                    unlock_time,
                    intent: intent.clone(),
                });
                Ok(intent)
            }
            Err(err) => {
                self.surface(&err);
                self.transition(WithdrawalState::Eligible { unlock_time });
                Err(err.into())
            }
        }
    }

    /// The wallet reported that the submitted transaction reverted.
    ///
    /// Eligibility was evidently wrong, so the flow returns to `Idle` and
    /// the unlock time has to be fetched again.
    pub fn record_revert(&mut self, reason: impl Into<String>) -> Result<(), FlowError> {
        if !matches!(self.state, WithdrawalState::Submitted { .. }) {
            return Err(FlowError::InvalidTransition {
                state: self.state.name(),
                action: "record a revert",
            });
        }
        let err = VaultError::OnChainRevert {
            reason: reason.into(),
        };
        self.surface(&err);
        self.transition(WithdrawalState::Idle);
        Ok(())
    }
}

impl Default for WithdrawalFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(unlock_time: U256, now: u64) -> WithdrawalState {
    if is_withdrawal_eligible(unlock_time, now) {
        WithdrawalState::Eligible { unlock_time }
    } else {
        WithdrawalState::Locked { unlock_time }
    }
}
