//! Decoding of gateway scalars into exact unsigned integers
//!
//! The same `uint256` can come back as a decimal string, as an ethers-style
//! big-number object (`{"type": "BigNumber", "hex": "0x64"}`) or as a plain
//! JSON integer, depending on the gateway version and call path.

use alloy_primitives::U256;
use serde_json::Value;

use crate::domain::vault::VaultError;

/// Longest rendering of an offending value carried in a decode error
const MAX_RENDERED_LEN: usize = 128;

/// Decode a gateway scalar, trying decimal string, then hex wrapper, then
/// native integer. Anything else is a [`VaultError::DecodeFailure`].
pub fn decode_unsigned_integer(value: &Value) -> Result<U256, VaultError> {
    let decoded = match value {
        Value::String(s) => parse_decimal_u256(s),
        Value::Object(map) => map
            .get("hex")
            .and_then(Value::as_str)
            .and_then(parse_hex_u256),
        Value::Number(n) => n.as_u64().map(U256::from),
        _ => None,
    };

    decoded.ok_or_else(|| VaultError::DecodeFailure {
        rendered: render_bounded(value),
    })
}

/// Parse a string of ASCII decimal digits; rejects signs, whitespace and overflow.
pub(crate) fn parse_decimal_u256(s: &str) -> Option<U256> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_str_radix(s, 10).ok()
}

/// Parse a base-16 string with or without `0x`.
pub(crate) fn parse_hex_u256(s: &str) -> Option<U256> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

fn render_bounded(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= MAX_RENDERED_LEN {
        return rendered;
    }
    let head: String = rendered.chars().take(MAX_RENDERED_LEN).collect();
    format!("{head}…")
}
