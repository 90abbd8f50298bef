//! Vault value types shared by the gateway, the facade and the flow

use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use super::binding::withdraw_selector;

/// Gateway view of the target chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    #[serde(rename = "chainID")]
    pub chain_id: u64,
    pub block_number: u64,
}

/// Result of a contract method invocation, tagged by the gateway
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    /// Output of a read-only call, still in the gateway's loose JSON form
    MethodCallOutput(serde_json::Value),
    /// Unsigned transaction produced by a state-mutating call
    TransactionToSign(TransactionIntent),
}

/// Unsigned transaction that the connected wallet signs and broadcasts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
    pub to: Address,
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

impl TransactionIntent {
    /// Whether the calldata targets `withdraw()`
    pub fn is_withdraw_call(&self) -> bool {
        self.data.starts_with(&withdraw_selector())
    }
}

/// A decoded `Withdrawal(amount, when)` log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalEvent {
    pub amount: U256,
    pub when: U256,
    pub tx_hash: Option<String>,
    pub block_number: Option<u64>,
    pub triggered_at: Option<String>,
}

/// Optimistic pre-check; the contract enforces the real guard on-chain.
pub fn is_withdrawal_eligible(unlock_time: U256, now_secs: u64) -> bool {
    U256::from(now_secs) >= unlock_time
}

/// Current wall-clock time in unix seconds
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
