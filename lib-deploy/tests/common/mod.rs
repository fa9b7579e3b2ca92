//! Deterministic doubles for the ledger and the operator

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use lib_deploy::config::BeneficiaryShare;
use lib_deploy::errors::DeployResult;
use lib_deploy::payload::Arg;
use lib_deploy::{
    DeployConfig, LedgerClient, Operator, PendingEvent, Percentage, Step, SubmitOutcome,
    Transaction,
};
use num_bigint::BigUint;

/// Records every submission; calls listed in `failing` report `ok: false`
#[derive(Default)]
pub struct FakeLedger {
    calls: Mutex<Vec<Transaction>>,
    failing: Mutex<HashSet<usize>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the n-th submission (0-based) fail
    pub fn fail_call(self, index: usize) -> Self {
        self.failing.lock().unwrap().insert(index);
        self
    }

    pub fn calls(&self) -> Vec<Transaction> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Amounts carried by every `ESDTTransfer` submitted so far
    pub fn transferred_amounts(&self) -> Vec<BigUint> {
        self.calls()
            .iter()
            .filter_map(|tx| match tx {
                Transaction::Call { data, .. } if data.function() == "ESDTTransfer" => {
                    match data.args().get(1) {
                        Some(Arg::Int(amount)) => Some(amount.clone()),
                        _ => None,
                    }
                }
                _ => None,
            })
            .collect()
    }
}

impl LedgerClient for FakeLedger {
    fn submit(&self, tx: &Transaction) -> SubmitOutcome {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(tx.clone());
        if self.failing.lock().unwrap().contains(&index) {
            SubmitOutcome::failure("ERROR: insufficient funds for gas")
        } else {
            SubmitOutcome::success(format!("{{\"emittedTransactionHash\": \"{:064x}\"}}", index))
        }
    }

    fn decode_address(&self, address: &str) -> DeployResult<String> {
        Ok(hex::encode(address.as_bytes()))
    }
}

/// Canned answers; once `confirms` runs out every question is answered yes
#[derive(Default)]
pub struct ScriptedOperator {
    answers: Mutex<VecDeque<Option<String>>>,
    confirms: Mutex<VecDeque<bool>>,
    notes: Mutex<Vec<String>>,
    started: Mutex<Vec<Step>>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, value: &str) -> Self {
        self.answers.lock().unwrap().push_back(Some(value.to_string()));
        self
    }

    pub fn no_answer(self) -> Self {
        self.answers.lock().unwrap().push_back(None);
        self
    }

    pub fn confirm_with(self, value: bool) -> Self {
        self.confirms.lock().unwrap().push_back(value);
        self
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<Step> {
        self.started.lock().unwrap().clone()
    }
}

impl Operator for ScriptedOperator {
    fn resolve(&self, _event: &PendingEvent) -> DeployResult<Option<String>> {
        Ok(self.answers.lock().unwrap().pop_front().flatten())
    }

    fn confirm(&self, _question: &str) -> DeployResult<bool> {
        Ok(self.confirms.lock().unwrap().pop_front().unwrap_or(true))
    }

    fn step_started(&self, step: Step) {
        self.started.lock().unwrap().push(step);
    }

    fn notify(&self, message: &str) {
        self.notes.lock().unwrap().push(message.to_string());
    }
}

/// Default ecosystem config with both contract artifacts present under `dir`
pub fn config_with_artifacts(dir: &Path) -> DeployConfig {
    let mut config = DeployConfig::default();
    config.artifacts.staking = dir.join("xcirclex-staking.wasm");
    config.artifacts.vesting = dir.join("xcirclex-vesting.wasm");
    fs::write(&config.artifacts.staking, b"\0asm").unwrap();
    fs::write(&config.artifacts.vesting, b"\0asm").unwrap();
    config
}

pub fn share(address: &str, percentage: u32) -> BeneficiaryShare {
    BeneficiaryShare {
        address: address.to_string(),
        percentage: Percentage::whole(percentage).unwrap(),
        name: format!("beneficiary {}", address),
    }
}
