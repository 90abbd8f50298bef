//! MultiBaas REST client
//!
//! One round trip per call, no retries. Transport failures, non-success
//! statuses and unparsable bodies each map to their own error kind.

use std::sync::Arc;

use alloy_primitives::Address;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::{discriminate, ApiEnvelope, ApiErrorBody, GatewayEvent, MethodArgs};
use crate::config::{Config, ConfigError};
use crate::domain::vault::{CallResult, ChainStatus, VaultError};

/// Longest slice of a non-JSON error body quoted back in an error
const MAX_ERROR_BODY_LEN: usize = 200;

/// Contract-call gateway
///
/// Implementations attach the contract identity (chain, address alias,
/// contract label) themselves; callers only name the method.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Liveness probe for the configured chain
    async fn chain_status(&self) -> Result<ChainStatus, VaultError>;

    /// Read-only invocation; never carries a caller address
    async fn call_read(&self, method: &str, args: &[Value]) -> Result<CallResult, VaultError>;

    /// State-mutating invocation on behalf of `from`
    async fn call_send(
        &self,
        method: &str,
        args: &[Value],
        from: Option<Address>,
    ) -> Result<CallResult, VaultError>;

    /// Events of the contract matching `signature`, newest page only
    async fn list_events(
        &self,
        signature: &str,
        limit: u32,
    ) -> Result<Vec<GatewayEvent>, VaultError>;
}

/// [`Gateway`] over HTTP(S) with bearer authentication
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: Client,
    config: Arc<Config>,
}

impl HttpGateway {
    pub fn new(config: Arc<Config>) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { http, config })
    }

    /// `{endpoint}/api/v0/{segments...}` with each segment percent-encoded
    fn api_url(&self, segments: &[&str]) -> Result<Url, VaultError> {
        let mut url = Url::parse(&self.config.endpoint).map_err(|err| {
            VaultError::InvalidRequest(format!(
                "endpoint `{}` is not a valid URL: {err}",
                self.config.endpoint
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                VaultError::InvalidRequest(format!(
                    "endpoint `{}` cannot be a base URL",
                    self.config.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(["api", "v0"])
            .extend(segments);
        Ok(url)
    }

    fn method_url(&self, method: &str) -> Result<Url, VaultError> {
        self.api_url(&[
            "chains",
            &self.config.chain,
            "addresses",
            &self.config.address_alias,
            "contracts",
            &self.config.contract_label,
            "methods",
            method,
        ])
    }

    async fn invoke(
        &self,
        method: &str,
        args: &[Value],
        from: Option<Address>,
    ) -> Result<CallResult, VaultError> {
        ensure_method(method)?;
        let url = self.method_url(method)?;
        let operation = format!("POST methods/{method}");
        debug!(
            chain = %self.config.chain,
            alias = %self.config.address_alias,
            label = %self.config.contract_label,
            method,
            args = args.len(),
            from = ?from,
            "calling contract method"
        );

        let body = MethodArgs {
            args,
            contract_override: true,
            from,
        };
        let result: Value = self
            .execute(&operation, self.http.post(url).json(&body))
            .await?;
        discriminate(&result)
    }

    /// Send an authenticated request and unwrap the `result` of the envelope
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, VaultError> {
        let unreachable = |source| VaultError::GatewayUnreachable {
            operation: operation.to_string(),
            source,
        };

        let response = request
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(unreachable)?;
        let status = response.status();
        let body = response.text().await.map_err(unreachable)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| truncate(&body, MAX_ERROR_BODY_LEN));
            warn!(operation, status = status.as_u16(), %message, "gateway rejected request");
            return Err(VaultError::GatewayRejected {
                operation: operation.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                message,
            });
        }

        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&body).map_err(|source| VaultError::MalformedResponse {
                detail: format!("{operation}: {source}"),
                source: Some(source),
            })?;
        debug!(operation, message = envelope.message.as_deref(), "gateway replied");
        Ok(envelope.result)
    }
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn chain_status(&self) -> Result<ChainStatus, VaultError> {
        let url = self.api_url(&["chains", &self.config.chain, "status"])?;
        debug!(chain = %self.config.chain, "fetching chain status");
        self.execute("GET chain status", self.http.get(url)).await
    }

    async fn call_read(&self, method: &str, args: &[Value]) -> Result<CallResult, VaultError> {
        self.invoke(method, args, None).await
    }

    async fn call_send(
        &self,
        method: &str,
        args: &[Value],
        from: Option<Address>,
    ) -> Result<CallResult, VaultError> {
        let from = from.ok_or(VaultError::WalletNotConnected)?;
        self.invoke(method, args, Some(from)).await
    }

    async fn list_events(
        &self,
        signature: &str,
        limit: u32,
    ) -> Result<Vec<GatewayEvent>, VaultError> {
        let url = self.api_url(&["events"])?;
        debug!(signature, limit, "listing events");
        let limit = limit.to_string();
        let request = self.http.get(url).query(&[
            ("chain", self.config.chain.as_str()),
            ("contract_address", self.config.address_alias.as_str()),
            ("contract_label", self.config.contract_label.as_str()),
            ("event_signature", signature),
            ("limit", limit.as_str()),
        ]);
        self.execute("GET events", request).await
    }
}

fn ensure_method(method: &str) -> Result<(), VaultError> {
    if method.trim().is_empty() {
        return Err(VaultError::InvalidRequest(
            "method name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn truncate(body: &str, max: usize) -> String {
    if body.chars().count() <= max {
        return body.to_string();
    }
    let head: String = body.chars().take(max).collect();
    format!("{head}…")
}
