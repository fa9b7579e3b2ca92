//! Ledger client backed by the `mxpy` executable
//!
//! Every submission is one blocking child process. Spawn failures,
//! non-zero exits and timeouts all come back as `ok: false` carrying the
//! process's own diagnostic text.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use lib_deploy::errors::{DeployError, DeployResult};
use lib_deploy::{LedgerClient, Network, SubmitOutcome, Transaction};
use tracing::{debug, warn};

use crate::logic::mxpy::{decode_address_args, transaction_args, MXPY_BINARY};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct MxpyClient {
    binary: PathBuf,
    network: Network,
    credential: PathBuf,
    timeout: Duration,
}

impl MxpyClient {
    pub fn new(network: Network, credential: impl Into<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from(MXPY_BINARY),
            network,
            credential: credential.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, args: &[String]) -> SubmitOutcome {
        debug!("Running {} {}", self.binary.display(), args.join(" "));
        let mut child = match Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return SubmitOutcome::failure(format!(
                    "Failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            }
        };

        // both pipes drain on their own threads while the child runs
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                warn!("{} timed out after {:?}", self.binary.display(), self.timeout);
                let _ = child.kill();
                let _ = child.wait();
                return SubmitOutcome::failure(format!(
                    "Command timed out after {}s",
                    self.timeout.as_secs()
                ));
            }
            Err(e) => return SubmitOutcome::failure(format!("Failed to wait for command: {}", e)),
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if status.success() {
            SubmitOutcome::success(stdout)
        } else {
            let diagnostic = if stderr.trim().is_empty() { stdout } else { stderr };
            SubmitOutcome::failure(format!("{} ({})", diagnostic.trim(), status))
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Hex on the last non-empty output line
fn parse_decoded_address(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(|l| l.trim_start_matches("0x").to_string())
        .filter(|l| l.len() % 2 == 0 && l.chars().all(|c| c.is_ascii_hexdigit()))
}

impl LedgerClient for MxpyClient {
    fn submit(&self, tx: &Transaction) -> SubmitOutcome {
        let args = transaction_args(tx, &self.credential, self.network);
        self.run(&args)
    }

    fn decode_address(&self, address: &str) -> DeployResult<String> {
        let outcome = self.run(&decode_address_args(address));
        let action = format!("Decode address {}", address);
        if !outcome.ok {
            return Err(DeployError::ExternalCall {
                action,
                output: outcome.output,
            });
        }
        parse_decoded_address(&outcome.output).ok_or(DeployError::ExternalCall {
            action,
            output: outcome.output,
        })
    }
}
