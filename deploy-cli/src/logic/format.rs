//! Report and status rendering

use std::str::FromStr;

use lib_deploy::pipeline::Step;
use lib_deploy::{AllocationPlan, ContractRole, DeployConfig, DeploymentState};
use serde_json::{json, Value};

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Distribution report, one line per printed row
pub fn report_lines(config: &DeployConfig, plan: &AllocationPlan) -> Vec<String> {
    let token = &config.token;
    let total = plan.total_supply_raw();
    let mut lines = vec![
        format!("Token:        {} ({})", token.name, token.ticker),
        format!("Decimals:     {}", plan.decimals()),
        format!("Total supply: {} {}", plan.display(total), token.ticker),
        format!("Raw supply:   {}", total),
        format!(
            "Derivation:   {} × {} × 10^{}",
            token.supply_constant, token.supply_multiplier, plan.decimals()
        ),
        String::new(),
    ];

    for allocation in plan.allocations() {
        let vesting = config
            .distribution_entry(allocation.category)
            .map(|e| e.vesting.as_str())
            .unwrap_or_default();
        lines.push(format!(
            "{:<32} {:>5}%  {:>24} {}",
            allocation.label,
            allocation.percentage,
            plan.display(&allocation.raw),
            token.ticker
        ));
        lines.push(format!("    raw {}", allocation.raw));
        if !vesting.is_empty() {
            lines.push(format!("    vesting: {}", vesting));
        }
    }

    lines.push(String::new());
    lines.push("Total allocated: 100%".to_string());
    lines.push(format!("Unallocated rounding dust: {} raw", plan.dust()));
    lines
}

pub fn report_json(config: &DeployConfig, plan: &AllocationPlan) -> Value {
    let distribution: Vec<Value> = plan
        .allocations()
        .iter()
        .map(|a| {
            json!({
                "category": a.category,
                "label": a.label,
                "percentage": a.percentage,
                "amount_raw": a.raw.to_string(),
                "amount_display": plan.display(&a.raw),
                "vesting": config
                    .distribution_entry(a.category)
                    .map(|e| e.vesting.clone())
                    .unwrap_or_default(),
            })
        })
        .collect();

    json!({
        "token": {
            "name": config.token.name,
            "ticker": config.token.ticker,
            "decimals": plan.decimals(),
        },
        "total_supply": {
            "raw": plan.total_supply_raw().to_string(),
            "display": plan.display(plan.total_supply_raw()),
            "constant": config.token.supply_constant,
            "multiplier": config.token.supply_multiplier,
        },
        "distribution": distribution,
        "allocated_raw": plan.allocated_total().to_string(),
        "dust_raw": plan.dust().to_string(),
    })
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

pub fn status_lines(state: &DeploymentState, next: Option<Step>) -> Vec<String> {
    let receipts = state.receipts();
    let mut lines = vec![
        format!("Network:          {}", state.network),
        format!("Token identifier: {}", or_dash(state.token_identifier())),
        format!("Staking contract: {}", or_dash(state.contract(ContractRole::Staking))),
        format!("Vesting contract: {}", or_dash(state.contract(ContractRole::Vesting))),
        format!("Staking funded:   {}", or_dash(receipts.funded(ContractRole::Staking))),
        format!("Vesting funded:   {}", or_dash(receipts.funded(ContractRole::Vesting))),
        format!("Vesting schedules created: {}", receipts.vesting_schedules.len()),
    ];
    for receipt in &receipts.vesting_schedules {
        lines.push(format!(
            "    {} {} {} raw",
            receipt.category, receipt.beneficiary, receipt.amount_raw
        ));
    }
    lines.push(match next {
        Some(step) => format!("Next step: {}", step),
        None => "All steps complete".to_string(),
    });
    lines
}

pub fn status_json(state: &DeploymentState, next: Option<Step>) -> Value {
    json!({
        "network": state.network,
        "token_identifier": state.token_identifier(),
        "contracts": state.contracts(),
        "receipts": state.receipts(),
        "next_step": next.map(|s| s.index()),
    })
}
