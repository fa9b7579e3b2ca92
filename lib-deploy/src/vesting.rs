//! Vesting schedule entries
//!
//! Schedules are created only from the explicitly configured beneficiary
//! lists. Each entry receives `floor(categoryTotal × share / 100)`.

use num_bigint::BigUint;

use crate::allocation::{allocate, AllocationPlan, Category};
use crate::config::VestingLists;
use crate::errors::{DeployError, DeployResult};
use crate::state::ScheduleReceipt;

/// Vested allocation kinds and their contract endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VestingCategory {
    Team,
    Advisor,
    Marketing,
}

impl VestingCategory {
    pub const ALL: [VestingCategory; 3] = [
        VestingCategory::Team,
        VestingCategory::Advisor,
        VestingCategory::Marketing,
    ];

    pub fn category(&self) -> Category {
        match self {
            VestingCategory::Team => Category::Team,
            VestingCategory::Advisor => Category::Advisors,
            VestingCategory::Marketing => Category::Marketing,
        }
    }

    /// Endpoint on the vesting contract
    pub fn function(&self) -> &'static str {
        match self {
            VestingCategory::Team => "createTeamVesting",
            VestingCategory::Advisor => "createAdvisorVesting",
            VestingCategory::Marketing => "createMarketingVesting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VestingScheduleEntry {
    pub kind: VestingCategory,
    /// Index within the category's beneficiary list
    pub position: usize,
    /// Human-readable beneficiary address
    pub beneficiary: String,
    pub name: String,
    pub amount: BigUint,
}

impl VestingScheduleEntry {
    /// Receipt recorded once the ledger accepts this entry
    pub fn receipt(&self) -> ScheduleReceipt {
        ScheduleReceipt {
            category: self.kind.category(),
            position: self.position,
            beneficiary: self.beneficiary.clone(),
            amount_raw: self.amount.to_string(),
        }
    }
}

/// Expand the configured lists into per-beneficiary amounts, in list order
pub fn schedule_entries(
    lists: &VestingLists,
    plan: &AllocationPlan,
) -> DeployResult<Vec<VestingScheduleEntry>> {
    let mut entries = Vec::new();
    for kind in VestingCategory::ALL {
        let category = kind.category();
        let shares = lists.entries(category);
        if shares.is_empty() {
            continue;
        }
        let total = plan.amount(category)?;
        for (position, share) in shares.iter().enumerate() {
            if share.address.trim().is_empty() {
                return Err(DeployError::InvalidConfig(format!(
                    "{} beneficiary '{}' has no address",
                    category, share.name
                )));
            }
            entries.push(VestingScheduleEntry {
                kind,
                position,
                beneficiary: share.address.trim().to_string(),
                name: share.name.clone(),
                amount: allocate(&total, &share.percentage),
            });
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::Percentage;
    use crate::config::{BeneficiaryShare, DeployConfig};
    use std::str::FromStr;

    fn share(address: &str, pct: u32) -> BeneficiaryShare {
        BeneficiaryShare {
            address: address.to_string(),
            percentage: Percentage::whole(pct).unwrap(),
            name: format!("holder {}", address),
        }
    }

    #[test]
    fn test_empty_lists_produce_no_entries() {
        let config = DeployConfig::default();
        let plan = config.plan().unwrap();
        assert!(schedule_entries(&config.vesting, &plan).unwrap().is_empty());
    }

    #[test]
    fn test_sixty_forty_split() {
        let mut config = DeployConfig::default();
        config.vesting.team = vec![share("erd1a", 60), share("erd1b", 40)];
        let plan = config.plan().unwrap();
        let entries = schedule_entries(&config.vesting, &plan).unwrap();

        let team_total = plan.amount(Category::Team).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].position, entries[1].position), (0, 1));
        assert_eq!(entries[0].amount, &team_total * 60u32 / 100u32);
        assert_eq!(entries[1].amount, &team_total * 40u32 / 100u32);
        assert_eq!(
            entries[0].amount,
            BigUint::from_str("18849555921538759430775859").unwrap()
        );

        let sum = &entries[0].amount + &entries[1].amount;
        assert!(sum <= team_total);
        assert!(&team_total - &sum <= BigUint::from(1u32));
    }

    #[test]
    fn test_entries_follow_category_order() {
        let mut config = DeployConfig::default();
        config.vesting.marketing = vec![share("erd1m", 100)];
        config.vesting.team = vec![share("erd1t", 100)];
        config.vesting.advisors = vec![share("erd1v", 50)];
        let plan = config.plan().unwrap();
        let entries = schedule_entries(&config.vesting, &plan).unwrap();

        let kinds: Vec<VestingCategory> = entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![VestingCategory::Team, VestingCategory::Advisor, VestingCategory::Marketing]
        );
        assert_eq!(entries[2].amount, plan.amount(Category::Marketing).unwrap());
    }

    #[test]
    fn test_function_names() {
        assert_eq!(VestingCategory::Team.function(), "createTeamVesting");
        assert_eq!(VestingCategory::Advisor.function(), "createAdvisorVesting");
        assert_eq!(VestingCategory::Marketing.function(), "createMarketingVesting");
    }
}
