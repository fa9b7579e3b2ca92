//! `mxpy` command lines
//!
//! Pure argv construction for the external ledger client. The client
//! itself spawns these; the `plan` command only renders them.

use std::path::Path;

use lib_deploy::{Network, Transaction};

pub const MXPY_BINARY: &str = "mxpy";

/// Arguments (without the binary) that submit `tx` on `network`
pub fn transaction_args(tx: &Transaction, credential: &Path, network: Network) -> Vec<String> {
    let endpoints = network.config();
    let mut args: Vec<String> = match tx {
        Transaction::Call {
            receiver,
            value,
            gas_limit,
            data,
        } => vec![
            "tx".into(),
            "new".into(),
            "--receiver".into(),
            receiver.clone(),
            "--value".into(),
            value.to_string(),
            "--gas-limit".into(),
            gas_limit.to_string(),
            "--data".into(),
            data.encode(),
            "--pem".into(),
            credential.display().to_string(),
        ],
        Transaction::Deploy {
            bytecode,
            gas_limit,
            arguments,
        } => {
            let mut deploy = vec![
                "contract".into(),
                "deploy".into(),
                "--bytecode".into(),
                bytecode.display().to_string(),
                "--pem".into(),
                credential.display().to_string(),
                "--gas-limit".into(),
                gas_limit.to_string(),
            ];
            if !arguments.is_empty() {
                deploy.push("--arguments".into());
                deploy.extend(arguments.iter().map(|a| format!("0x{}", a.to_hex())));
            }
            deploy
        }
    };
    args.extend([
        "--chain".to_string(),
        endpoints.chain_id.to_string(),
        "--proxy".to_string(),
        endpoints.proxy.to_string(),
        "--recall-nonce".to_string(),
        "--send".to_string(),
    ]);
    args
}

pub fn decode_address_args(address: &str) -> Vec<String> {
    vec![
        "wallet".into(),
        "bech32".into(),
        "--decode".into(),
        address.to_string(),
    ]
}

/// Shell-pasteable form, one flag per line
pub fn render_command(args: &[String]) -> String {
    let mut out = String::from(MXPY_BINARY);
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            out.push_str(" \\\n    ");
        } else {
            out.push(' ');
        }
        out.push_str(&quote(arg));
        // keep a flag and its value on one line
        if arg.starts_with("--") {
            while let Some(value) = iter.peek() {
                if value.starts_with("--") {
                    break;
                }
                out.push(' ');
                out.push_str(&quote(value));
                iter.next();
            }
        }
    }
    out
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}
