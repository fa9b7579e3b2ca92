//! Ledger client port
//!
//! The pipeline never talks to the network directly. It hands a
//! [`Transaction`] to a [`LedgerClient`] and gets back whether the client
//! considered the submission successful, plus its raw diagnostic text.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::errors::{DeployError, DeployResult};
use crate::payload::{Arg, Payload};

/// Target network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Devnet,
    Testnet,
    Mainnet,
}

/// Fixed endpoint table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub proxy: &'static str,
    pub chain_id: &'static str,
    pub explorer: &'static str,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Devnet, Network::Testnet, Network::Mainnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    pub fn config(&self) -> NetworkConfig {
        match self {
            Network::Devnet => NetworkConfig {
                proxy: "https://devnet-gateway.multiversx.com",
                chain_id: "D",
                explorer: "https://devnet-explorer.multiversx.com",
            },
            Network::Testnet => NetworkConfig {
                proxy: "https://testnet-gateway.multiversx.com",
                chain_id: "T",
                explorer: "https://testnet-explorer.multiversx.com",
            },
            Network::Mainnet => NetworkConfig {
                proxy: "https://gateway.multiversx.com",
                chain_id: "1",
                explorer: "https://explorer.multiversx.com",
            },
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(DeployError::InvalidConfig(format!(
                "Unknown network: '{}'. Supported: devnet, testnet, mainnet",
                other
            ))),
        }
    }
}

/// What the pipeline asks the client to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Plain transaction carrying a call payload
    Call {
        receiver: String,
        value: BigUint,
        gas_limit: u64,
        data: Payload,
    },
    /// Contract deployment from a compiled artifact
    Deploy {
        bytecode: PathBuf,
        gas_limit: u64,
        arguments: Vec<Arg>,
    },
}

impl Transaction {
    /// Short human label used in logs and diagnostics
    pub fn describe(&self) -> String {
        match self {
            Transaction::Call { receiver, data, .. } => {
                format!("{} -> {}", data.function(), receiver)
            }
            Transaction::Deploy { bytecode, .. } => format!("deploy {}", bytecode.display()),
        }
    }
}

/// Result of a submission as reported by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub ok: bool,
    pub output: String,
}

impl SubmitOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            ok: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            ok: false,
            output: output.into(),
        }
    }
}

/// Transaction submission and address decoding
pub trait LedgerClient {
    /// Submit and wait for the client's verdict. Timeouts and transport errors
    /// are reported as `ok: false`, never as a panic or an `Err`.
    fn submit(&self, tx: &Transaction) -> SubmitOutcome;

    /// Decode a human-readable address into its raw hex form
    fn decode_address(&self, address: &str) -> DeployResult<String>;
}

impl<T: LedgerClient + ?Sized> LedgerClient for &T {
    fn submit(&self, tx: &Transaction) -> SubmitOutcome {
        (**self).submit(tx)
    }

    fn decode_address(&self, address: &str) -> DeployResult<String> {
        (**self).decode_address(address)
    }
}
