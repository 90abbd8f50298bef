//! Gateway wire envelopes and the `kind` discriminator

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::numeric::{decode_unsigned_integer, parse_hex_u256};
use crate::domain::vault::{CallResult, TransactionIntent, VaultError};

pub const METHOD_CALL_KIND: &str = "MethodCallResponse";
pub const TRANSACTION_TO_SIGN_KIND: &str = "TransactionToSignResponse";

/// Every gateway body wraps its payload as `{status, message, result}`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    pub result: T,
}

/// Error bodies carry at least a message; the rest is ignored
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a contract method invocation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MethodArgs<'a> {
    pub args: &'a [Value],
    pub contract_override: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
}

/// One entry of the event listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    #[serde(default)]
    pub triggered_at: Option<String>,
    pub event: EventDetail,
    #[serde(default)]
    pub transaction: Option<EventTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDetail {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<EventInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTransaction {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
}

impl GatewayEvent {
    /// Input by name, falling back to position for gateways that drop names
    pub fn input(&self, name: &str, position: usize) -> Option<&Value> {
        self.event
            .inputs
            .iter()
            .find(|input| input.name == name)
            .or_else(|| self.event.inputs.get(position))
            .map(|input| &input.value)
    }
}

/// Route a method-call `result` object by its declared `kind`.
///
/// Only the two known kinds are accepted; any other tag is an error rather
/// than a guess at which variant the payload resembles.
pub fn discriminate(raw: &Value) -> Result<CallResult, VaultError> {
    let kind = raw
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| VaultError::malformed("call result has no `kind` tag"))?;

    match kind {
        METHOD_CALL_KIND => {
            let output = raw
                .get("output")
                .ok_or_else(|| VaultError::malformed("method call response has no `output`"))?;
            Ok(CallResult::MethodCallOutput(output.clone()))
        }
        TRANSACTION_TO_SIGN_KIND => {
            let tx = raw
                .get("tx")
                .ok_or_else(|| VaultError::malformed("transaction response has no `tx`"))?;
            Ok(CallResult::TransactionToSign(parse_transaction(tx)?))
        }
        other => Err(VaultError::UnexpectedResponseKind {
            kind: other.to_string(),
        }),
    }
}

fn parse_transaction(tx: &Value) -> Result<TransactionIntent, VaultError> {
    let to = prefixed_field(tx, "to")?;
    let to: Address = to
        .parse()
        .map_err(|err| VaultError::malformed(format!("tx.to `{to}` is not an address: {err}")))?;

    let data = prefixed_field(tx, "data")?;
    let data: Bytes = data
        .parse()
        .map_err(|err| VaultError::malformed(format!("tx.data is not hex: {err}")))?;

    let value = match tx.get("value") {
        None | Some(Value::Null) => None,
        Some(value) => decode_value(value)?,
    };

    Ok(TransactionIntent { to, data, value })
}

/// `0x` values must be valid hex; any other shape the decoder rejects
/// (e.g. `""`) is treated as no value rather than a failed intent.
fn decode_value(value: &Value) -> Result<Option<U256>, VaultError> {
    match value.as_str() {
        Some(s) if s.starts_with("0x") => parse_hex_u256(s)
            .map(Some)
            .ok_or_else(|| VaultError::DecodeFailure {
                rendered: value.to_string(),
            }),
        _ => Ok(decode_unsigned_integer(value).ok()),
    }
}

fn prefixed_field<'a>(tx: &'a Value, field: &str) -> Result<&'a str, VaultError> {
    match tx.get(field).and_then(Value::as_str) {
        Some(s) if s.starts_with("0x") => Ok(s),
        Some(s) => Err(VaultError::malformed(format!(
            "tx.{field} `{s}` is not 0x-prefixed"
        ))),
        None => Err(VaultError::malformed(format!("tx.{field} is missing"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vault::ErrorKind;
    use serde_json::json;

    const DEAD: &str = "0x000000000000000000000000000000000000dEaD";

    #[test]
    fn test_method_call_output() {
        let result = discriminate(&json!({
            "kind": "MethodCallResponse",
            "output": "42",
            "input": "0x"
        }))
        .unwrap();
        assert_eq!(result, CallResult::MethodCallOutput(json!("42")));
    }

    #[test]
    fn test_null_output_is_passed_through() {
        // the decoder, not the discriminator, rejects a null output
        let result = discriminate(&json!({"kind": "MethodCallResponse", "output": null})).unwrap();
        assert_eq!(result, CallResult::MethodCallOutput(Value::Null));
    }

    #[test]
    fn test_missing_output_is_malformed() {
        let err = discriminate(&json!({"kind": "MethodCallResponse"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_transaction_to_sign() {
        let result = discriminate(&json!({
            "kind": "TransactionToSignResponse",
            "submitted": false,
            "tx": {"to": DEAD, "data": "0x"}
        }))
        .unwrap();

        let CallResult::TransactionToSign(intent) = result else {
            panic!("expected transaction to sign");
        };
        assert_eq!(intent.to, DEAD.parse::<Address>().unwrap());
        assert!(intent.data.is_empty());
        assert_eq!(intent.value, None);
    }

    #[test]
    fn test_transaction_value_forms() {
        for (value, expected) in [
            (json!("0x0"), U256::ZERO),
            (json!("0xde0b6b3a7640000"), U256::from(1_000_000_000_000_000_000u64)),
            (json!("1000"), U256::from(1000u64)),
        ] {
            let result = discriminate(&json!({
                "kind": "TransactionToSignResponse",
                "tx": {"to": DEAD, "data": "0x3ccfd60b", "value": value}
            }))
            .unwrap();
            let CallResult::TransactionToSign(intent) = result else {
                panic!("expected transaction to sign");
            };
            assert_eq!(intent.value, Some(expected));
        }
    }

    #[test]
    fn test_unparsable_plain_value_is_dropped() {
        for value in [json!(""), json!("ten"), json!(true)] {
            let result = discriminate(&json!({
                "kind": "TransactionToSignResponse",
                "tx": {"to": DEAD, "data": "0x3ccfd60b", "value": value}
            }))
            .unwrap();
            let CallResult::TransactionToSign(intent) = result else {
                panic!("expected transaction to sign");
            };
            assert_eq!(intent.value, None);
            assert!(intent.is_withdraw_call());
        }
    }

    #[test]
    fn test_bad_transaction_value() {
        let err = discriminate(&json!({
            "kind": "TransactionToSignResponse",
            "tx": {"to": DEAD, "data": "0x", "value": "0xnothex"}
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    }

    #[test]
    fn test_transaction_fields_must_be_prefixed() {
        for tx in [
            json!({"data": "0x"}),
            json!({"to": DEAD}),
            json!({"to": "000000000000000000000000000000000000dEaD", "data": "0x"}),
            json!({"to": DEAD, "data": "3ccfd60b"}),
            json!({"to": "0x1234", "data": "0x"}),
            json!({"to": DEAD, "data": "0xzz"}),
        ] {
            let err = discriminate(&json!({"kind": "TransactionToSignResponse", "tx": tx}))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedResponse, "accepted {tx}");
        }
    }

    #[test]
    fn test_unknown_kind() {
        let err = discriminate(&json!({"kind": "SomethingElse"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedResponseKind);
        assert!(err.to_string().contains("SomethingElse"));
    }

    #[test]
    fn test_missing_kind() {
        let err = discriminate(&json!({"output": "42"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_method_args_shape() {
        let read = serde_json::to_value(MethodArgs {
            args: &[],
            contract_override: true,
            from: None,
        })
        .unwrap();
        assert_eq!(read, json!({"args": [], "contractOverride": true}));

        let from: Address = DEAD.parse().unwrap();
        let send = serde_json::to_value(MethodArgs {
            args: &[json!("1")],
            contract_override: true,
            from: Some(from),
        })
        .unwrap();
        assert_eq!(send["from"], json!(from));
        assert_eq!(send["args"], json!(["1"]));
    }

    #[test]
    fn test_event_input_lookup() {
        let event: GatewayEvent = serde_json::from_value(json!({
            "triggeredAt": "2024-01-01T00:00:00Z",
            "event": {
                "name": "Withdrawal",
                "inputs": [
                    {"name": "", "value": "5"},
                    {"name": "when", "value": "1700000000"}
                ]
            },
            "transaction": {"txHash": "0xabc", "blockNumber": 7}
        }))
        .unwrap();
        assert_eq!(event.input("amount", 0), Some(&json!("5")));
        assert_eq!(event.input("when", 1), Some(&json!("1700000000")));
        assert_eq!(event.transaction.unwrap().block_number, Some(7));
    }
}
