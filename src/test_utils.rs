//! Scripted in-memory gateway for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::Address;
use serde_json::{json, Value};

use crate::config::Config;
use crate::domain::vault::{CallResult, ChainStatus, VaultError};
use crate::infrastructure::gateway::{discriminate, Gateway, GatewayEvent};

pub(crate) const DEAD: &str = "0x000000000000000000000000000000000000dEaD";
pub(crate) const CALLER: &str = "0x00000000000000000000000000000000000000Aa";

pub(crate) fn complete_config() -> Config {
    Config {
        endpoint: "https://abc.multibaas.com".into(),
        api_key: "key".into(),
        contract_label: "lock".into(),
        address_alias: "lock".into(),
        chain: "ethereum".into(),
        request_timeout_secs: None,
    }
}

pub(crate) fn caller() -> Address {
    CALLER.parse().unwrap()
}

pub(crate) fn method_output(output: Value) -> Value {
    json!({"kind": "MethodCallResponse", "output": output})
}

pub(crate) fn withdraw_tx() -> Value {
    json!({
        "kind": "TransactionToSignResponse",
        "submitted": false,
        "tx": {"to": DEAD, "data": "0x3ccfd60b"}
    })
}

/// Recorded invocation: method name and caller, if any
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Invocation {
    pub method: String,
    pub from: Option<Address>,
}

/// Replays queued raw `result` payloads through the real discriminator
#[derive(Default)]
pub(crate) struct FakeGateway {
    calls: AtomicUsize,
    invocations: Mutex<Vec<Invocation>>,
    responses: Mutex<VecDeque<Result<Value, VaultError>>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, raw: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(raw));
        self
    }

    pub(crate) fn fail(self, err: VaultError) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    fn next(&self) -> Result<Value, VaultError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")
    }

    fn record(&self, method: &str, from: Option<Address>) {
        self.invocations.lock().unwrap().push(Invocation {
            method: method.to_string(),
            from,
        });
    }
}

#[async_trait::async_trait]
impl Gateway for FakeGateway {
    async fn chain_status(&self) -> Result<ChainStatus, VaultError> {
        let raw = self.next()?;
        Ok(serde_json::from_value(raw).unwrap())
    }

    async fn call_read(&self, method: &str, _args: &[Value]) -> Result<CallResult, VaultError> {
        self.record(method, None);
        discriminate(&self.next()?)
    }

    async fn call_send(
        &self,
        method: &str,
        _args: &[Value],
        from: Option<Address>,
    ) -> Result<CallResult, VaultError> {
        self.record(method, from);
        discriminate(&self.next()?)
    }

    async fn list_events(
        &self,
        _signature: &str,
        _limit: u32,
    ) -> Result<Vec<GatewayEvent>, VaultError> {
        let raw = self.next()?;
        Ok(serde_json::from_value(raw).unwrap())
    }
}
