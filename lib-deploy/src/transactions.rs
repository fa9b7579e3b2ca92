//! Transactions submitted by each step
//!
//! Built from configuration and recorded state only, so the same values
//! can be previewed without submitting anything.

use num_bigint::BigUint;

use crate::allocation::{AllocationPlan, Category};
use crate::config::DeployConfig;
use crate::errors::DeployResult;
use crate::ledger::Transaction;
use crate::payload::{self, Arg};
use crate::state::ContractRole;
use crate::vesting::VestingScheduleEntry;

/// Asset issuance, paid to the system contract
pub fn issue_transaction(config: &DeployConfig, plan: &AllocationPlan) -> DeployResult<Transaction> {
    let token = &config.token;
    Ok(Transaction::Call {
        receiver: token.system_contract.clone(),
        value: token.issue_cost_raw()?,
        gas_limit: config.gas.issue,
        data: payload::issue(
            &token.name,
            &token.ticker,
            plan.total_supply_raw(),
            token.decimals,
            &token.capabilities,
        )?,
    })
}

/// Contract deployment with the token identifier as constructor argument
pub fn deploy_transaction(config: &DeployConfig, role: ContractRole, token_identifier: &str) -> Transaction {
    Transaction::Deploy {
        bytecode: config.artifacts.path(role).to_path_buf(),
        gas_limit: config.gas.deploy,
        arguments: vec![Arg::text(token_identifier)],
    }
}

/// Raw amount routed to a contract: staking rewards, or the three vested categories together
pub fn funding_amount(plan: &AllocationPlan, role: ContractRole) -> DeployResult<BigUint> {
    match role {
        ContractRole::Staking => plan.amount(Category::StakingRewards),
        ContractRole::Vesting => plan.sum_of(&Category::VESTED),
    }
}

pub fn funding_transaction(
    config: &DeployConfig,
    contract: &str,
    token_identifier: &str,
    amount: &BigUint,
) -> DeployResult<Transaction> {
    Ok(Transaction::Call {
        receiver: contract.to_string(),
        value: BigUint::from(0u32),
        gas_limit: config.gas.transfer,
        data: payload::transfer(token_identifier, amount)?,
    })
}

/// `beneficiary_hex` is the decoded form of `entry.beneficiary`
pub fn schedule_transaction(
    config: &DeployConfig,
    contract: &str,
    entry: &VestingScheduleEntry,
    beneficiary_hex: &str,
) -> DeployResult<Transaction> {
    Ok(Transaction::Call {
        receiver: contract.to_string(),
        value: BigUint::from(0u32),
        gas_limit: config.gas.vesting,
        data: payload::create_vesting(entry.kind.function(), beneficiary_hex, &entry.amount)?,
    })
}
