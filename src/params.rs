//! Caller parameter extraction
//!
//! Parameters arrive as one JSON object from the CLI. Every accessor fails
//! with `ConfigurationError` so malformed caller input is rejected before
//! the first network call.

use std::str::FromStr;

use serde_json::Value;
use solana_sdk::pubkey::Pubkey;

use crate::error::{OrbitError, Result};

/// Required string parameter
pub fn req_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| OrbitError::configuration(format!("missing or non-string parameter '{key}'")))
}

/// Optional string parameter
pub fn opt_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Required unsigned integer parameter; accepts JSON numbers and numeric
/// strings (amounts above 2^53 must be strings to survive JSON)
pub fn req_u64(params: &Value, key: &str) -> Result<u64> {
    match params.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| OrbitError::configuration(format!("parameter '{key}' is not a u64"))),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| OrbitError::configuration(format!("parameter '{key}' is not numeric: {s}"))),
        _ => Err(OrbitError::configuration(format!("missing numeric parameter '{key}'"))),
    }
}

/// Required 128-bit identifier parameter (sequence/request numbers)
pub fn req_u128(params: &Value, key: &str) -> Result<u128> {
    match params.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| OrbitError::configuration(format!("parameter '{key}' is not numeric"))),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| OrbitError::configuration(format!("parameter '{key}' is not numeric: {s}"))),
        _ => Err(OrbitError::configuration(format!("missing numeric parameter '{key}'"))),
    }
}

/// Required base58 pubkey parameter
pub fn req_pubkey(params: &Value, key: &str) -> Result<Pubkey> {
    let raw = req_str(params, key)?;
    Pubkey::from_str(raw)
        .map_err(|_| OrbitError::configuration(format!("parameter '{key}' is not a valid pubkey: {raw}")))
}

/// Required list of base58 pubkeys
pub fn req_pubkey_list(params: &Value, key: &str) -> Result<Vec<Pubkey>> {
    let list = params
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| OrbitError::configuration(format!("missing list parameter '{key}'")))?;
    list.iter()
        .map(|item| {
            let raw = item.as_str().ok_or_else(|| {
                OrbitError::configuration(format!("parameter '{key}' must be a list of strings"))
            })?;
            Pubkey::from_str(raw).map_err(|_| {
                OrbitError::configuration(format!("'{raw}' in parameter '{key}' is not a valid pubkey"))
            })
        })
        .collect()
}

/// Required list of strings
pub fn req_str_list(params: &Value, key: &str) -> Result<Vec<String>> {
    let list = params
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| OrbitError::configuration(format!("missing list parameter '{key}'")))?;
    list.iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                OrbitError::configuration(format!("parameter '{key}' must be a list of strings"))
            })
        })
        .collect()
}

/// Hex-encoded payload parameter (`0x` prefix optional); absent or empty
/// means an empty payload
pub fn hex_payload(params: &Value, key: &str) -> Result<Vec<u8>> {
    let raw = match opt_str(params, key) {
        Some(s) => s,
        None => return Ok(Vec::new()),
    };
    let stripped = raw.strip_prefix("0x").unwrap_or(raw);
    if stripped.is_empty() {
        return Ok(Vec::new());
    }
    hex::decode(stripped)
        .map_err(|_| OrbitError::configuration(format!("parameter '{key}' is not valid hex: {raw}")))
}

/// Split a chain-qualified address (`<network-id>/<address>`) into its
/// network id, used for per-network fee-record derivation
pub fn network_of(to: &str) -> Result<&str> {
    let (network, address) = to
        .split_once('/')
        .ok_or_else(|| OrbitError::configuration(format!("'{to}' is not a chain-qualified address (<nid>/<address>)")))?;
    if network.is_empty() || address.is_empty() {
        return Err(OrbitError::configuration(format!(
            "'{to}' is not a chain-qualified address (<nid>/<address>)"
        )));
    }
    Ok(network)
}
