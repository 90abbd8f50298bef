//! Solidity binding for the Lock contract

use alloy_sol_types::{sol, SolCall, SolEvent};

sol! {
    interface Lock {
        function unlockTime() external view returns (uint256);
        function withdraw() external;

        event Withdrawal(uint256 amount, uint256 when);
    }
}

/// Method name the gateway resolves for the unlock timestamp read
pub const UNLOCK_TIME_METHOD: &str = "unlockTime";

/// Method name the gateway resolves for the withdrawal send
pub const WITHDRAW_METHOD: &str = "withdraw";

/// Page size used when listing withdrawal events
pub const EVENT_PAGE_SIZE: u32 = 50;

/// Canonical signature of the withdrawal event, e.g. for gateway filters
pub fn withdrawal_event_signature() -> &'static str {
    Lock::Withdrawal::SIGNATURE
}

/// 4-byte selector of `withdraw()`
pub fn withdraw_selector() -> [u8; 4] {
    Lock::withdrawCall::SELECTOR
}
