//! Persisted deployment progress
//!
//! The state file is the only record of what has already happened on the
//! ledger. Fields are only ever filled in, never cleared, and nothing in
//! here is re-derived from the network.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allocation::{AllocationPlan, Category, DistributionReportEntry};
use crate::errors::{DeployError, DeployResult};
use crate::ledger::Network;

/// Contracts deployed by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractRole {
    Staking,
    Vesting,
}

impl ContractRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractRole::Staking => "staking",
            ContractRole::Vesting => "vesting",
        }
    }
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contracts {
    #[serde(default)]
    pub staking: Option<String>,
    #[serde(default)]
    pub vesting: Option<String>,
}

impl Contracts {
    pub fn get(&self, role: ContractRole) -> Option<&str> {
        match role {
            ContractRole::Staking => self.staking.as_deref(),
            ContractRole::Vesting => self.vesting.as_deref(),
        }
    }

    fn slot(&mut self, role: ContractRole) -> &mut Option<String> {
        match role {
            ContractRole::Staking => &mut self.staking,
            ContractRole::Vesting => &mut self.vesting,
        }
    }
}

/// A vesting schedule the ledger accepted
///
/// Keyed by category and list position, so one address may hold several
/// tranches in the same category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleReceipt {
    pub category: Category,
    pub position: usize,
    pub beneficiary: String,
    pub amount_raw: String,
}

/// Completed transfers and schedule creations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipts {
    #[serde(default)]
    pub staking_funded: Option<String>,
    #[serde(default)]
    pub vesting_funded: Option<String>,
    #[serde(default)]
    pub vesting_schedules: Vec<ScheduleReceipt>,
}

impl Receipts {
    pub fn funded(&self, role: ContractRole) -> Option<&str> {
        match role {
            ContractRole::Staking => self.staking_funded.as_deref(),
            ContractRole::Vesting => self.vesting_funded.as_deref(),
        }
    }

    pub fn has_schedule(&self, category: Category, position: usize, beneficiary: &str) -> bool {
        self.vesting_schedules.iter().any(|r| {
            r.category == category && r.position == position && r.beneficiary == beneficiary
        })
    }
}

/// The single aggregate the pipeline mutates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentState {
    pub network: Network,
    /// Signing credential handle (a wallet file path, never its contents)
    pub credential: PathBuf,
    token_identifier: Option<String>,
    contracts: Contracts,
    receipts: Receipts,
}

impl DeploymentState {
    pub fn new(network: Network, credential: impl Into<PathBuf>) -> Self {
        Self {
            network,
            credential: credential.into(),
            token_identifier: None,
            contracts: Contracts::default(),
            receipts: Receipts::default(),
        }
    }

    pub fn token_identifier(&self) -> Option<&str> {
        self.token_identifier.as_deref()
    }

    pub fn contract(&self, role: ContractRole) -> Option<&str> {
        self.contracts.get(role)
    }

    pub fn contracts(&self) -> &Contracts {
        &self.contracts
    }

    pub fn receipts(&self) -> &Receipts {
        &self.receipts
    }

    pub fn record_token(&mut self, identifier: String) {
        if self.token_identifier.is_none() {
            self.token_identifier = Some(identifier);
        }
    }

    pub fn record_contract(&mut self, role: ContractRole, address: String) {
        let slot = self.contracts.slot(role);
        if slot.is_none() {
            *slot = Some(address);
        }
    }

    pub fn record_funding(&mut self, role: ContractRole, amount_raw: String) {
        let slot = match role {
            ContractRole::Staking => &mut self.receipts.staking_funded,
            ContractRole::Vesting => &mut self.receipts.vesting_funded,
        };
        if slot.is_none() {
            *slot = Some(amount_raw);
        }
    }

    pub fn record_schedule(&mut self, receipt: ScheduleReceipt) {
        if !self
            .receipts
            .has_schedule(receipt.category, receipt.position, &receipt.beneficiary)
        {
            self.receipts.vesting_schedules.push(receipt);
        }
    }
}

/// On-disk layout of the state file
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    network: Network,
    #[serde(default)]
    token_identifier: Option<String>,
    #[serde(default)]
    contracts: Contracts,
    #[serde(default)]
    receipts: Receipts,
    /// Derived audit snapshot; ignored when loading
    #[serde(default, skip_deserializing)]
    distribution: BTreeMap<Category, DistributionReportEntry>,
}

/// Loads and atomically saves [`DeploymentState`]
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields an empty state for `network`
    pub fn load(&self, network: Network, credential: impl Into<PathBuf>) -> DeployResult<DeploymentState> {
        let mut state = DeploymentState::new(network, credential);
        if !self.path.exists() {
            debug!("No state file at {}, starting fresh", self.path.display());
            return Ok(state);
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| self.corrupt(e.to_string()))?;
        let file: StateFile = serde_json::from_str(&raw).map_err(|e| self.corrupt(e.to_string()))?;

        if file.network != network {
            return Err(DeployError::NetworkMismatch {
                recorded: file.network.to_string(),
                requested: network.to_string(),
            });
        }

        state.token_identifier = file.token_identifier;
        state.contracts = file.contracts;
        state.receipts = file.receipts;
        info!("📂 Loaded state from {}", self.path.display());
        Ok(state)
    }

    /// Write the state plus the allocation snapshot via temp file + rename
    pub fn save(&self, state: &DeploymentState, plan: &AllocationPlan) -> DeployResult<()> {
        let file = StateFile {
            network: state.network,
            token_identifier: state.token_identifier.clone(),
            contracts: state.contracts.clone(),
            receipts: state.receipts.clone(),
            distribution: plan.report(),
        };
        let bytes = serde_json::to_vec_pretty(&file).map_err(|e| self.persistence(e.to_string()))?;
        atomic_write(&self.path, &bytes).map_err(|e| self.persistence(e.to_string()))?;
        info!("💾 State saved to {}", self.path.display());
        Ok(())
    }

    fn corrupt(&self, reason: String) -> DeployError {
        DeployError::StateCorrupt {
            path: self.path.clone(),
            reason,
        }
    }

    fn persistence(&self, reason: String) -> DeployError {
        DeployError::Persistence {
            path: self.path.clone(),
            reason,
        }
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("state path has no file name"))?;
    let tmp = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    sync_dir(&dir);
    Ok(())
}

/// Flush the directory entry so the rename survives a crash (POSIX)
fn sync_dir(dir: &Path) {
    match fs::File::open(dir).and_then(|d| d.sync_all()) {
        Ok(()) => {}
        // Not every platform can open or fsync a directory
        Err(e) => debug!("Directory sync skipped for {}: {}", dir.display(), e),
    }
}
