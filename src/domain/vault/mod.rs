//! Vault domain models
//!
//! Everything here is transport-agnostic: the gateway produces these values
//! and the facade and withdrawal flow consume them.

pub mod binding;
mod error;
mod types;

pub use error::{ErrorKind, VaultError};
pub use types::{
    is_withdrawal_eligible, now_secs, CallResult, ChainStatus, TransactionIntent,
    WithdrawalEvent,
};
