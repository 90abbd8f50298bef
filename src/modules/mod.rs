//! Feature modules
//!
//! - vault: the time-lock facade (unlock time, withdraw, events, chain status)

pub mod vault;

pub use vault::Vault;
