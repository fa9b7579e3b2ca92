//! Ledger call payloads
//!
//! A payload is `functionName@hexArg1@hexArg2@...`: the function name in
//! plain ASCII, every argument as lowercase hex without a `0x` prefix and
//! always of even length.

use std::fmt;

use num_bigint::BigUint;

use crate::config::Capabilities;
use crate::errors::{DeployError, DeployResult};

/// Segment separator, never valid inside a segment
pub const DELIMITER: char = '@';

/// Function called on the token to move it between accounts
pub const TRANSFER_FUNCTION: &str = "ESDTTransfer";

pub const ISSUE_FUNCTION: &str = "issue";

/// A single call argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Unsigned integer, encoded big-endian with the minimal byte count
    Int(BigUint),
    /// UTF-8 text, encoded byte by byte
    Text(String),
    /// Fixed-length binary value already in hex (decoded addresses)
    Raw(String),
}

impl Arg {
    pub fn int(value: impl Into<BigUint>) -> Self {
        Arg::Int(value.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Arg::Text(value.into())
    }

    /// Accepts the output of an address decoder; validates and lowercases it
    pub fn raw(hex_value: &str) -> DeployResult<Self> {
        let trimmed = hex_value.trim().trim_start_matches("0x");
        if trimmed.is_empty() {
            return Err(DeployError::InvalidPayload("empty binary argument".to_string()));
        }
        if trimmed.len() % 2 != 0 || hex::decode(trimmed).is_err() {
            return Err(DeployError::InvalidPayload(format!(
                "'{}' is not an even-length hex value",
                hex_value
            )));
        }
        Ok(Arg::Raw(trimmed.to_ascii_lowercase()))
    }

    pub fn to_hex(&self) -> String {
        match self {
            Arg::Int(value) => encode_int(value),
            Arg::Text(value) => encode_text(value),
            Arg::Raw(value) => value.clone(),
        }
    }
}

/// Minimal big-endian hex; zero encodes as `00`
pub fn encode_int(value: &BigUint) -> String {
    hex::encode(value.to_bytes_be())
}

pub fn encode_text(value: &str) -> String {
    hex::encode(value.as_bytes())
}

/// Inverse of [`encode_int`]
pub fn decode_int(hex_value: &str) -> DeployResult<BigUint> {
    let bytes = hex::decode(hex_value)
        .map_err(|e| DeployError::InvalidPayload(format!("bad hex '{}': {}", hex_value, e)))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

/// A function call with its ordered arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    function: String,
    args: Vec<Arg>,
}

impl Payload {
    pub fn new(function: &str) -> DeployResult<Self> {
        if function.is_empty() || !function.is_ascii() || function.contains(DELIMITER) {
            return Err(DeployError::InvalidPayload(format!(
                "invalid function name '{}'",
                function
            )));
        }
        Ok(Self {
            function: function.to_string(),
            args: Vec::new(),
        })
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn encode(&self) -> String {
        std::iter::once(self.function.clone())
            .chain(self.args.iter().map(Arg::to_hex))
            .collect::<Vec<_>>()
            .join(&DELIMITER.to_string())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// =============================================================================
// CALL BUILDERS
// =============================================================================

/// `issue@name@ticker@supply@decimals@flag@bool...`
pub fn issue(
    name: &str,
    ticker: &str,
    supply: &BigUint,
    decimals: u32,
    capabilities: &Capabilities,
) -> DeployResult<Payload> {
    let mut payload = Payload::new(ISSUE_FUNCTION)?
        .arg(Arg::text(name))
        .arg(Arg::text(ticker))
        .arg(Arg::Int(supply.clone()))
        .arg(Arg::int(decimals));
    for (flag, enabled) in capabilities.as_pairs() {
        payload = payload
            .arg(Arg::text(flag))
            .arg(Arg::text(if enabled { "true" } else { "false" }));
    }
    Ok(payload)
}

/// `ESDTTransfer@token@amount`
pub fn transfer(token_identifier: &str, amount: &BigUint) -> DeployResult<Payload> {
    Ok(Payload::new(TRANSFER_FUNCTION)?
        .arg(Arg::text(token_identifier))
        .arg(Arg::Int(amount.clone())))
}

/// `<createXVesting>@beneficiary@amount`
pub fn create_vesting(function: &str, beneficiary_hex: &str, amount: &BigUint) -> DeployResult<Payload> {
    Ok(Payload::new(function)?
        .arg(Arg::raw(beneficiary_hex)?)
        .arg(Arg::Int(amount.clone())))
}
