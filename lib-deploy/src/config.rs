//! Deployment configuration
//!
//! Everything the pipeline needs to know up front: token metadata, gas
//! limits, artifact locations, the distribution table and the vesting
//! beneficiary lists. The defaults reproduce the X-CIRCLE-X ecosystem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bigdecimal::BigDecimal;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::allocation::{derive_total_supply, plain_decimal, AllocationPlan, Category, Percentage};
use crate::errors::{DeployError, DeployResult};
use crate::state::ContractRole;

/// Largest decimals value accepted for the issued asset
pub const MAX_DECIMALS: u32 = 36;

/// Native-currency cost of an issuance (0.05 EGLD)
pub const DEFAULT_ISSUE_COST: &str = "50000000000000000";

/// System contract receiving issuance calls
pub const DEFAULT_SYSTEM_CONTRACT: &str =
    "erd1qqqqqqqqqqqqqqqpqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqzllls8a5w6u";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub token: TokenConfig,
    pub gas: GasLimits,
    pub artifacts: ArtifactPaths,
    pub distribution: Vec<DistributionEntry>,
    pub vesting: VestingLists,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    pub ticker: String,
    pub decimals: u32,
    /// Decimal constant the supply is derived from
    pub supply_constant: String,
    pub supply_multiplier: String,
    /// Raw native amount attached to the issuance call
    pub issue_cost: String,
    pub system_contract: String,
    pub capabilities: Capabilities,
}

/// Capability flags sent with the issuance, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub can_freeze: bool,
    pub can_wipe: bool,
    pub can_pause: bool,
    pub can_mint: bool,
    pub can_burn: bool,
    pub can_change_owner: bool,
    pub can_upgrade: bool,
    pub can_add_special_roles: bool,
}

impl Capabilities {
    pub fn as_pairs(&self) -> [(&'static str, bool); 8] {
        [
            ("canFreeze", self.can_freeze),
            ("canWipe", self.can_wipe),
            ("canPause", self.can_pause),
            ("canMint", self.can_mint),
            ("canBurn", self.can_burn),
            ("canChangeOwner", self.can_change_owner),
            ("canUpgrade", self.can_upgrade),
            ("canAddSpecialRoles", self.can_add_special_roles),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GasLimits {
    pub issue: u64,
    pub deploy: u64,
    pub transfer: u64,
    pub vesting: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub staking: PathBuf,
    pub vesting: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub category: Category,
    pub percentage: Percentage,
    #[serde(default)]
    pub label: String,
    /// Free-text release policy, shown in reports only
    #[serde(default)]
    pub vesting: String,
}

/// One beneficiary share inside a vested category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeneficiaryShare {
    pub address: String,
    pub percentage: Percentage,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VestingLists {
    pub team: Vec<BeneficiaryShare>,
    pub advisors: Vec<BeneficiaryShare>,
    pub marketing: Vec<BeneficiaryShare>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            token: TokenConfig::default(),
            gas: GasLimits::default(),
            artifacts: ArtifactPaths::default(),
            distribution: default_distribution(),
            vesting: VestingLists::default(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "XCIRCLEX".to_string(),
            ticker: "XCIRCLEX".to_string(),
            decimals: 18,
            supply_constant: "3.141592653589793238462643383279502884197".to_string(),
            supply_multiplier: "100000000".to_string(),
            issue_cost: DEFAULT_ISSUE_COST.to_string(),
            system_contract: DEFAULT_SYSTEM_CONTRACT.to_string(),
            capabilities: Capabilities::default(),
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            can_freeze: true,
            can_wipe: true,
            can_pause: true,
            can_mint: false,
            can_burn: true,
            can_change_owner: true,
            can_upgrade: true,
            can_add_special_roles: true,
        }
    }
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            issue: 60_000_000,
            deploy: 100_000_000,
            transfer: 500_000,
            vesting: 10_000_000,
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            staking: PathBuf::from("contracts/xcirclex-staking/output/xcirclex-staking.wasm"),
            vesting: PathBuf::from("contracts/xcirclex-vesting/output/xcirclex-vesting.wasm"),
        }
    }
}

fn default_distribution() -> Vec<DistributionEntry> {
    let rows: [(Category, u32, &str, &str); 8] = [
        (Category::CircleOfLife, 35, "Circle of Life rewards (SC0)", "4 years, progressive"),
        (Category::LiquidityPool, 20, "Liquidity pool EGLD/XCIRCLEX", "immediate"),
        (Category::StakingRewards, 15, "Staking rewards", "over the staking lifetime"),
        (Category::Team, 10, "Founding team", "24 months, 6 month cliff"),
        (Category::Treasury, 10, "DAO treasury", "governance controlled"),
        (Category::Marketing, 5, "Marketing & growth", "12 months"),
        (Category::Advisors, 3, "Advisors", "12 months, 3 month cliff"),
        (Category::Airdrop, 2, "Initial airdrop", "immediate"),
    ];
    rows.iter()
        .map(|(category, pct, label, vesting)| DistributionEntry {
            category: *category,
            percentage: Percentage(BigDecimal::from(*pct)),
            label: label.to_string(),
            vesting: vesting.to_string(),
        })
        .collect()
}

impl TokenConfig {
    pub fn total_supply_raw(&self) -> DeployResult<BigUint> {
        derive_total_supply(&self.supply_constant, &self.supply_multiplier, self.decimals)
    }

    pub fn issue_cost_raw(&self) -> DeployResult<BigUint> {
        self.issue_cost.trim().parse::<BigUint>().map_err(|e| {
            DeployError::InvalidConfig(format!("invalid issue cost '{}': {}", self.issue_cost, e))
        })
    }

    /// Supply as a decimal in display units (constant × multiplier)
    pub fn total_supply_display(&self) -> DeployResult<String> {
        let parse = |s: &str| {
            s.trim()
                .parse::<BigDecimal>()
                .map_err(|e| DeployError::InvalidConfig(format!("invalid decimal '{}': {}", s, e)))
        };
        let display = parse(&self.supply_constant)? * parse(&self.supply_multiplier)?;
        Ok(plain_decimal(&display))
    }
}

impl ArtifactPaths {
    pub fn path(&self, role: ContractRole) -> &Path {
        match role {
            ContractRole::Staking => &self.staking,
            ContractRole::Vesting => &self.vesting,
        }
    }
}

impl VestingLists {
    pub fn entries(&self, category: Category) -> &[BeneficiaryShare] {
        match category {
            Category::Team => &self.team,
            Category::Advisors => &self.advisors,
            Category::Marketing => &self.marketing,
            _ => &[],
        }
    }
}

impl DeployConfig {
    /// Check every table once; the pipeline refuses to start on failure
    pub fn validate(&self) -> DeployResult<()> {
        self.token.validate()?;
        self.validate_distribution()?;
        self.validate_vesting()?;
        Ok(())
    }

    /// Validate and compute the per-category amounts
    pub fn plan(&self) -> DeployResult<AllocationPlan> {
        self.validate()?;
        AllocationPlan::new(
            self.token.total_supply_raw()?,
            self.token.decimals,
            &self.distribution,
        )
    }

    pub fn distribution_entry(&self, category: Category) -> Option<&DistributionEntry> {
        self.distribution.iter().find(|e| e.category == category)
    }

    fn validate_distribution(&self) -> DeployResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.distribution {
            if !seen.insert(entry.category) {
                return Err(DeployError::InvalidConfig(format!(
                    "category '{}' listed more than once",
                    entry.category
                )));
            }
        }
        if let Some(missing) = Category::ALL.iter().find(|c| !seen.contains(*c)) {
            return Err(DeployError::InvalidConfig(format!(
                "category '{}' missing from distribution",
                missing
            )));
        }

        let sum = sum_percentages(self.distribution.iter().map(|e| &e.percentage));
        if sum != BigDecimal::from(100u32) {
            return Err(DeployError::InvalidConfig(format!(
                "distribution percentages sum to {}, expected 100",
                plain_decimal(&sum)
            )));
        }
        Ok(())
    }

    fn validate_vesting(&self) -> DeployResult<()> {
        for category in Category::VESTED {
            let entries = self.vesting.entries(category);
            if let Some(bad) = entries.iter().find(|e| e.address.trim().is_empty()) {
                return Err(DeployError::InvalidConfig(format!(
                    "{} beneficiary '{}' has no address",
                    category, bad.name
                )));
            }
            let sum = sum_percentages(entries.iter().map(|e| &e.percentage));
            if sum > BigDecimal::from(100u32) {
                return Err(DeployError::InvalidConfig(format!(
                    "{} beneficiaries claim {}% of the category",
                    category,
                    plain_decimal(&sum)
                )));
            }
        }
        Ok(())
    }
}

impl TokenConfig {
    fn validate(&self) -> DeployResult<()> {
        if self.name.trim().is_empty() || self.ticker.trim().is_empty() {
            return Err(DeployError::InvalidConfig(
                "token name and ticker must not be empty".to_string(),
            ));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(DeployError::InvalidConfig(format!(
                "decimals {} exceeds {}",
                self.decimals, MAX_DECIMALS
            )));
        }
        if self.system_contract.trim().is_empty() {
            return Err(DeployError::InvalidConfig(
                "issuance system contract address must not be empty".to_string(),
            ));
        }
        self.issue_cost_raw()?;
        if self.total_supply_raw()?.is_zero() {
            return Err(DeployError::InvalidConfig("total supply is zero".to_string()));
        }
        Ok(())
    }
}

fn sum_percentages<'a>(items: impl Iterator<Item = &'a Percentage>) -> BigDecimal {
    items.fold(BigDecimal::zero(), |acc, p| acc + p.as_decimal())
}
