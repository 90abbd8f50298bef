//! Error taxonomy for every step between the gateway and the caller

use thiserror::Error;

/// Coarse classification of a [`VaultError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotConfigured,
    WalletNotConnected,
    InvalidRequest,
    GatewayUnreachable,
    GatewayRejected,
    MalformedResponse,
    UnexpectedResponseKind,
    DecodeFailure,
    OnChainRevert,
}

#[derive(Debug, Error)]
pub enum VaultError {
    #[error(
        "gateway is not configured: endpoint, API key, contract label, address alias and chain are all required"
    )]
    NotConfigured,

    #[error("wallet not connected")]
    WalletNotConnected,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("gateway unreachable during {operation}: {source}")]
    GatewayUnreachable {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("gateway rejected {operation}: {status} {status_text} ({message})")]
    GatewayRejected {
        operation: String,
        status: u16,
        status_text: String,
        message: String,
    },

    #[error("malformed gateway response: {detail}")]
    MalformedResponse {
        detail: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("unexpected gateway response kind: {kind}")]
    UnexpectedResponseKind { kind: String },

    #[error("cannot decode unsigned integer from {rendered}")]
    DecodeFailure { rendered: String },

    #[error("transaction reverted on-chain: {reason}")]
    OnChainRevert { reason: String },
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::NotConfigured => ErrorKind::NotConfigured,
            VaultError::WalletNotConnected => ErrorKind::WalletNotConnected,
            VaultError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            VaultError::GatewayUnreachable { .. } => ErrorKind::GatewayUnreachable,
            VaultError::GatewayRejected { .. } => ErrorKind::GatewayRejected,
            VaultError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            VaultError::UnexpectedResponseKind { .. } => ErrorKind::UnexpectedResponseKind,
            VaultError::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            VaultError::OnChainRevert { .. } => ErrorKind::OnChainRevert,
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        VaultError::MalformedResponse {
            detail: detail.into(),
            source: None,
        }
    }
}
