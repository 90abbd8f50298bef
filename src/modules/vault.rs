//! Vault interaction facade
//!
//! Every operation passes the configuration gate before touching the
//! gateway, performs exactly one round trip and returns the first error it
//! meets. Nothing is cached: callers re-fetch before trusting eligibility.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::domain::vault::binding::{
    withdrawal_event_signature, EVENT_PAGE_SIZE, UNLOCK_TIME_METHOD, WITHDRAW_METHOD,
};
use crate::domain::vault::{
    CallResult, ChainStatus, TransactionIntent, VaultError, WithdrawalEvent,
};
use crate::infrastructure::gateway::{
    decode_unsigned_integer, Gateway, GatewayEvent, HttpGateway, METHOD_CALL_KIND,
    TRANSACTION_TO_SIGN_KIND,
};

/// Facade over the time-lock contract
#[derive(Debug)]
pub struct Vault<G = HttpGateway> {
    config: Arc<Config>,
    gateway: G,
}

impl Vault<HttpGateway> {
    /// Build a vault talking to the configured gateway over HTTP.
    ///
    /// An incomplete config is accepted here; every operation then fails
    /// with [`VaultError::NotConfigured`] without any network access.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let config = Arc::new(config);
        let gateway = HttpGateway::new(Arc::clone(&config))?;
        Ok(Self { config, gateway })
    }
}

impl<G: Gateway> Vault<G> {
    pub fn with_gateway(config: impl Into<Arc<Config>>, gateway: G) -> Self {
        Self {
            config: config.into(),
            gateway,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    fn ensure_configured(&self) -> Result<(), VaultError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(VaultError::NotConfigured)
        }
    }

    pub async fn chain_status(&self) -> Result<ChainStatus, VaultError> {
        self.ensure_configured()?;
        let status = self.gateway.chain_status().await?;
        info!(
            chain_id = status.chain_id,
            block = status.block_number,
            "chain status"
        );
        Ok(status)
    }

    /// Chain status probe collapsed to reachable / not reachable
    pub async fn test_connection(&self) -> bool {
        match self.chain_status().await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "connection test failed");
                false
            }
        }
    }

    /// Read the contract's unlock timestamp (unix seconds)
    pub async fn unlock_time(&self) -> Result<U256, VaultError> {
        self.ensure_configured()?;
        let output = match self.gateway.call_read(UNLOCK_TIME_METHOD, &[]).await? {
            CallResult::MethodCallOutput(output) => output,
            CallResult::TransactionToSign(_) => {
                return Err(VaultError::UnexpectedResponseKind {
                    kind: TRANSACTION_TO_SIGN_KIND.to_string(),
                })
            }
        };
        let unlock_time = decode_unsigned_integer(&output)?;
        info!(%unlock_time, "unlock time");
        Ok(unlock_time)
    }

    /// Ask the gateway for an unsigned `withdraw()` transaction for `caller`.
    ///
    /// Signing and broadcasting belong to the wallet.
    pub async fn withdraw(&self, caller: Option<Address>) -> Result<TransactionIntent, VaultError> {
        self.ensure_configured()?;
        let caller = caller.ok_or(VaultError::WalletNotConnected)?;
        match self
            .gateway
            .call_send(WITHDRAW_METHOD, &[], Some(caller))
            .await?
        {
            CallResult::TransactionToSign(intent) => {
                info!(to = %intent.to, %caller, "withdraw transaction ready to sign");
                Ok(intent)
            }
            CallResult::MethodCallOutput(_) => Err(VaultError::UnexpectedResponseKind {
                kind: METHOD_CALL_KIND.to_string(),
            }),
        }
    }

    /// Latest page of `Withdrawal(amount, when)` events
    pub async fn withdrawal_events(&self) -> Result<Vec<WithdrawalEvent>, VaultError> {
        self.ensure_configured()?;
        let events = self
            .gateway
            .list_events(withdrawal_event_signature(), EVENT_PAGE_SIZE)
            .await?;
        events.iter().map(decode_withdrawal).collect()
    }
}

fn decode_withdrawal(event: &GatewayEvent) -> Result<WithdrawalEvent, VaultError> {
    let field = |name: &str, position: usize| {
        event.input(name, position).ok_or_else(|| {
            VaultError::malformed(format!(
                "{} event has no `{name}` input",
                event.event.name
            ))
        })
    };
    let amount = decode_unsigned_integer(field("amount", 0)?)?;
    let when = decode_unsigned_integer(field("when", 1)?)?;
    let transaction = event.transaction.as_ref();

    Ok(WithdrawalEvent {
        amount,
        when,
        tx_hash: transaction.and_then(|tx| tx.tx_hash.clone()),
        block_number: transaction.and_then(|tx| tx.block_number),
        triggered_at: event.triggered_at.clone(),
    })
}
