//! lockbox: client for a single time-lock vault behind a MultiBaas gateway
//!
//! Layers, leaves first:
//! - `domain`: value types, the error taxonomy and the Lock contract binding
//! - `infrastructure`: gateway client, envelope discrimination, numeric decoding
//! - `modules`: the vault facade
//! - `core`: the withdrawal state machine driven by the facade

pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod modules;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::config::{Config, ConfigError};
pub use crate::core::{FlowError, WithdrawalFlow, WithdrawalState};
pub use crate::domain::vault::{
    is_withdrawal_eligible, now_secs, CallResult, ChainStatus, ErrorKind, TransactionIntent,
    VaultError, WithdrawalEvent,
};
pub use crate::infrastructure::gateway::{decode_unsigned_integer, discriminate, Gateway, HttpGateway};
pub use crate::modules::Vault;
