//! Supply derivation and allocation arithmetic
//!
//! The total supply is derived once from a decimal constant (π for the
//! reference ecosystem) multiplied by a fixed scale and by `10^decimals`.
//! Every category amount is `floor(total × percentage / 100)`, computed on
//! arbitrary-precision decimals and truncated only at the final integer
//! conversion.
//!
//! # Invariants
//!
//! - sum(category amounts) ≤ total supply (no value creation)
//! - total supply − sum(category amounts) < number of categories
//! - the leftover dust is never folded back into any category

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::DistributionEntry;
use crate::errors::{DeployError, DeployResult};

/// Significant digits kept while deriving the supply
pub const SUPPLY_PRECISION: u64 = 50;

/// Fractional digits shown in human-readable amounts
pub const DISPLAY_DECIMALS: i64 = 6;

// =============================================================================
// CATEGORY
// =============================================================================

/// Allocation bucket of the total supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CircleOfLife,
    LiquidityPool,
    StakingRewards,
    Team,
    Treasury,
    Marketing,
    Advisors,
    Airdrop,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::CircleOfLife,
        Category::LiquidityPool,
        Category::StakingRewards,
        Category::Team,
        Category::Treasury,
        Category::Marketing,
        Category::Advisors,
        Category::Airdrop,
    ];

    /// Categories whose tokens are routed to the vesting contract
    pub const VESTED: [Category; 3] = [Category::Team, Category::Advisors, Category::Marketing];

    pub fn key(&self) -> &'static str {
        match self {
            Category::CircleOfLife => "circle_of_life",
            Category::LiquidityPool => "liquidity_pool",
            Category::StakingRewards => "staking_rewards",
            Category::Team => "team",
            Category::Treasury => "treasury",
            Category::Marketing => "marketing",
            Category::Advisors => "advisors",
            Category::Airdrop => "airdrop",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// PERCENTAGE
// =============================================================================

/// A percentage in `[0, 100]`, kept as an exact decimal
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(pub(crate) BigDecimal);

impl Percentage {
    pub fn new(value: BigDecimal) -> DeployResult<Self> {
        if value < BigDecimal::zero() || value > BigDecimal::from(100u32) {
            return Err(DeployError::InvalidPercentage {
                value: plain_decimal(&value),
            });
        }
        Ok(Percentage(value))
    }

    pub fn whole(value: u32) -> DeployResult<Self> {
        Self::new(BigDecimal::from(value))
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    fn is_whole(&self) -> bool {
        self.0.with_scale(0) == self.0
    }
}

impl FromStr for Percentage {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = BigDecimal::from_str(s.trim()).map_err(|_| DeployError::InvalidPercentage {
            value: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&plain_decimal(&self.0))
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.to_u64() {
            Some(whole) if self.is_whole() => serializer.serialize_u64(whole),
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PercentageRepr {
    Whole(i64),
    Fraction(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match PercentageRepr::deserialize(deserializer)? {
            PercentageRepr::Whole(v) => Percentage::new(BigDecimal::from(v)),
            // Shortest round-trip text keeps 12.5 as 12.5 instead of its binary expansion
            PercentageRepr::Fraction(v) => Percentage::from_str(&v.to_string()),
            PercentageRepr::Text(s) => Percentage::from_str(&s),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// ARITHMETIC
// =============================================================================

/// Derive the raw total supply: `trunc(constant × multiplier × 10^decimals)`
pub fn derive_total_supply(constant: &str, multiplier: &str, decimals: u32) -> DeployResult<BigUint> {
    let constant = parse_decimal("supply constant", constant)?;
    let multiplier = parse_decimal("supply multiplier", multiplier)?;
    let scale = BigDecimal::new(BigInt::from(1u32), -(decimals as i64));

    let display = (constant * multiplier).with_prec(SUPPLY_PRECISION);
    let scaled = (display * scale).with_prec(SUPPLY_PRECISION);
    truncate_to_raw(&scaled)
}

/// `floor(total × percentage / 100)`
pub fn allocate(total: &BigUint, percentage: &Percentage) -> BigUint {
    let total = BigDecimal::from(BigInt::from(total.clone()));
    let (digits, scale) = (total * percentage.as_decimal()).into_bigint_and_exponent();
    // Dividing by 100 is a scale shift, so nothing is rounded before truncation
    let share = BigDecimal::new(digits, scale + 2);
    // Inputs are non-negative, so the conversion cannot fail
    truncate_to_raw(&share).unwrap_or_default()
}

fn truncate_to_raw(value: &BigDecimal) -> DeployResult<BigUint> {
    let (int, _) = value.with_scale(0).into_bigint_and_exponent();
    int.to_biguint()
        .ok_or_else(|| DeployError::InvalidConfig(format!("negative amount: {}", value)))
}

/// Render without exponent notation and without trailing fractional zeros
pub(crate) fn plain_decimal(value: &BigDecimal) -> String {
    let normalized = value.normalized();
    let (_, scale) = normalized.as_bigint_and_exponent();
    if scale < 0 {
        normalized.with_scale(0).to_string()
    } else {
        normalized.to_string()
    }
}

fn parse_decimal(what: &str, raw: &str) -> DeployResult<BigDecimal> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| DeployError::InvalidConfig(format!("invalid {} '{}': {}", what, raw, e)))
}

/// Format a raw amount as `1,234.567890` (6 fractional digits, half-even)
pub fn format_amount(raw: &BigUint, decimals: u32) -> String {
    let value = BigDecimal::new(BigInt::from(raw.clone()), decimals as i64)
        .with_scale_round(DISPLAY_DECIMALS, RoundingMode::HalfEven);
    let (digits, _) = value.into_bigint_and_exponent();

    let width = DISPLAY_DECIMALS as usize + 1;
    let digits = format!("{:0>width$}", digits.to_string(), width = width);
    let (int_part, frac_part) = digits.split_at(digits.len() - DISPLAY_DECIMALS as usize);

    format!("{}.{}", group_thousands(int_part), frac_part)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// CALCULATOR & PLAN
// =============================================================================

/// Splits a fixed total supply by percentage
#[derive(Debug, Clone)]
pub struct AllocationCalculator {
    total_supply_raw: BigUint,
}

impl AllocationCalculator {
    pub fn new(total_supply_raw: BigUint) -> Self {
        Self { total_supply_raw }
    }

    pub fn total_supply_raw(&self) -> &BigUint {
        &self.total_supply_raw
    }

    pub fn amount(&self, percentage: &Percentage) -> BigUint {
        allocate(&self.total_supply_raw, percentage)
    }
}

/// One computed category of the plan
#[derive(Debug, Clone)]
pub struct Allocation {
    pub category: Category,
    pub label: String,
    pub percentage: Percentage,
    pub raw: BigUint,
}

/// Audit row written next to the deployment state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionReportEntry {
    pub percentage: Percentage,
    pub amount_raw: String,
    pub amount_display: String,
}

/// Per-category amounts, recomputed on every run from the distribution table
#[derive(Debug, Clone)]
pub struct AllocationPlan {
    calculator: AllocationCalculator,
    decimals: u32,
    allocations: Vec<Allocation>,
}

impl AllocationPlan {
    pub fn new(
        total_supply_raw: BigUint,
        decimals: u32,
        table: &[DistributionEntry],
    ) -> DeployResult<Self> {
        let hundred = BigDecimal::from(100u32);
        let sum = table
            .iter()
            .fold(BigDecimal::zero(), |acc, e| acc + e.percentage.as_decimal());
        if sum != hundred {
            return Err(DeployError::InvalidConfig(format!(
                "distribution percentages sum to {}, expected 100",
                plain_decimal(&sum)
            )));
        }

        let calculator = AllocationCalculator::new(total_supply_raw);
        let allocations = table
            .iter()
            .map(|entry| Allocation {
                category: entry.category,
                label: entry.label.clone(),
                percentage: entry.percentage.clone(),
                raw: calculator.amount(&entry.percentage),
            })
            .collect();

        Ok(Self {
            calculator,
            decimals,
            allocations,
        })
    }

    pub fn total_supply_raw(&self) -> &BigUint {
        self.calculator.total_supply_raw()
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn amount(&self, category: Category) -> DeployResult<BigUint> {
        self.allocations
            .iter()
            .find(|a| a.category == category)
            .map(|a| a.raw.clone())
            .ok_or_else(|| {
                DeployError::InvalidConfig(format!("category '{}' missing from distribution", category))
            })
    }

    /// Sum of independently truncated category amounts
    pub fn sum_of(&self, categories: &[Category]) -> DeployResult<BigUint> {
        categories
            .iter()
            .try_fold(BigUint::zero(), |acc, c| Ok(acc + self.amount(*c)?))
    }

    pub fn allocated_total(&self) -> BigUint {
        self.allocations.iter().map(|a| &a.raw).sum()
    }

    /// Raw units left unallocated by per-category truncation
    pub fn dust(&self) -> BigUint {
        self.total_supply_raw() - self.allocated_total()
    }

    pub fn display(&self, raw: &BigUint) -> String {
        format_amount(raw, self.decimals)
    }

    pub fn report(&self) -> BTreeMap<Category, DistributionReportEntry> {
        self.allocations
            .iter()
            .map(|a| {
                (
                    a.category,
                    DistributionReportEntry {
                        percentage: a.percentage.clone(),
                        amount_raw: a.raw.to_string(),
                        amount_display: self.display(&a.raw),
                    },
                )
            })
            .collect()
    }
}
