//! Deployment state machine
//!
//! Six steps run in a fixed order. Whether a step has already happened is
//! read from [`DeploymentState`] alone, so any step can be re-run by index
//! and a completed one performs no external action.
//!
//! Invariants:
//! - Every step attempt is followed by a save, whatever its outcome
//! - The ledger is called at most once per logical action
//! - A step never undoes an earlier one

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::allocation::AllocationPlan;
use crate::config::DeployConfig;
use crate::errors::{DeployError, DeployResult};
use crate::ledger::{LedgerClient, Transaction};
use crate::operator::{Operator, PendingEvent};
use crate::state::{ContractRole, DeploymentState, StateStore};
use crate::transactions;
use crate::vesting::{schedule_entries, VestingScheduleEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    IssueAsset,
    DeployStaking,
    DeployVesting,
    DistributeStaking,
    DistributeVesting,
    CreateVestingSchedules,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::IssueAsset,
        Step::DeployStaking,
        Step::DeployVesting,
        Step::DistributeStaking,
        Step::DistributeVesting,
        Step::CreateVestingSchedules,
    ];

    /// 1-based position, as the operator types it
    pub fn index(&self) -> usize {
        match self {
            Step::IssueAsset => 1,
            Step::DeployStaking => 2,
            Step::DeployVesting => 3,
            Step::DistributeStaking => 4,
            Step::DistributeVesting => 5,
            Step::CreateVestingSchedules => 6,
        }
    }

    pub fn from_index(index: usize) -> DeployResult<Step> {
        index
            .checked_sub(1)
            .and_then(|i| Step::ALL.get(i).copied())
            .ok_or(DeployError::InvalidStep(index))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::IssueAsset => "Issue Token",
            Step::DeployStaking => "Deploy Staking",
            Step::DeployVesting => "Deploy Vesting",
            Step::DistributeStaking => "Distribute to Staking",
            Step::DistributeVesting => "Distribute to Vesting",
            Step::CreateVestingSchedules => "Create Vesting Schedules",
        }
    }

    pub fn next(&self) -> Option<Step> {
        Step::ALL.get(self.index()).copied()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({})", self.index(), self.name())
    }
}

/// Result of a single step that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Target state was already recorded; nothing was submitted
    AlreadyDone,
    /// Operator supplied no value; the step can be re-run later
    Aborted,
}

/// Result of a full-sequence run that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Finished,
    /// Operator declined the initial confirmation
    Declined,
    /// Operator declined to continue after `after`
    Paused { after: Step },
    Aborted { at: Step },
}

/// True when `step` has nothing left to do according to `state`
pub fn step_complete(step: Step, state: &DeploymentState, schedules: &[VestingScheduleEntry]) -> bool {
    match step {
        Step::IssueAsset => state.token_identifier().is_some(),
        Step::DeployStaking => state.contract(ContractRole::Staking).is_some(),
        Step::DeployVesting => state.contract(ContractRole::Vesting).is_some(),
        Step::DistributeStaking => state.receipts().funded(ContractRole::Staking).is_some(),
        Step::DistributeVesting => state.receipts().funded(ContractRole::Vesting).is_some(),
        Step::CreateVestingSchedules => {
            state.contract(ContractRole::Vesting).is_some()
                && schedules
                    .iter()
                    .all(|e| schedule_recorded(state, e))
        }
    }
}

/// First step in order that still has work to do
fn schedule_recorded(state: &DeploymentState, entry: &VestingScheduleEntry) -> bool {
    state
        .receipts()
        .has_schedule(entry.kind.category(), entry.position, &entry.beneficiary)
}

pub fn next_pending_step(state: &DeploymentState, schedules: &[VestingScheduleEntry]) -> Option<Step> {
    Step::ALL
        .into_iter()
        .find(|step| !step_complete(*step, state, schedules))
}

pub struct DeploymentPipeline<L: LedgerClient, O: Operator> {
    config: DeployConfig,
    plan: AllocationPlan,
    schedules: Vec<VestingScheduleEntry>,
    state: DeploymentState,
    store: StateStore,
    ledger: L,
    operator: O,
}

impl<L: LedgerClient, O: Operator> DeploymentPipeline<L, O> {
    /// Validates the configuration once; a bad table never reaches the ledger
    pub fn new(
        config: DeployConfig,
        state: DeploymentState,
        store: StateStore,
        ledger: L,
        operator: O,
    ) -> DeployResult<Self> {
        let plan = config.plan()?;
        let schedules = schedule_entries(&config.vesting, &plan)?;
        debug!(
            "Pipeline ready: supply {} raw, {} vesting schedule(s)",
            plan.total_supply_raw(),
            schedules.len()
        );
        Ok(Self {
            config,
            plan,
            schedules,
            state,
            store,
            ledger,
            operator,
        })
    }

    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    pub fn plan(&self) -> &AllocationPlan {
        &self.plan
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn schedules(&self) -> &[VestingScheduleEntry] {
        &self.schedules
    }

    pub fn next_pending_step(&self) -> Option<Step> {
        next_pending_step(&self.state, &self.schedules)
    }

    /// Run one step and persist the state, whatever happened.
    ///
    /// A save failure after a successful step is reported as the step's
    /// failure: the ledger may hold something the state file does not.
    pub fn run_step(&mut self, step: Step) -> DeployResult<StepOutcome> {
        info!("▶️  {}", step);
        self.operator.step_started(step);

        let result = self.execute(step);
        let saved = self.store.save(&self.state, &self.plan);

        let wrap = |source: DeployError| DeployError::StepFailed {
            index: step.index(),
            name: step.name(),
            source: Box::new(source),
        };

        match (result, saved) {
            (Ok(outcome), Ok(())) => {
                info!("✅ {} -> {:?}", step, outcome);
                Ok(outcome)
            }
            (Ok(_), Err(save_err)) => {
                error!("{} reached the ledger but the state was not saved", step);
                Err(wrap(save_err))
            }
            (Err(step_err), Ok(())) => {
                warn!("❌ {} failed: {}", step, step_err);
                Err(wrap(step_err))
            }
            (Err(step_err), Err(save_err)) => {
                error!("State save after failed {} also failed: {}", step, save_err);
                Err(wrap(step_err))
            }
        }
    }

    /// Run every step in order, asking before the first and between each
    pub fn run_all(&mut self) -> DeployResult<RunOutcome> {
        let question = format!(
            "This will deploy the full ecosystem to {}. Proceed?",
            self.state.network
        );
        if !self.operator.confirm(&question)? {
            info!("Deployment declined by operator");
            return Ok(RunOutcome::Declined);
        }

        for step in Step::ALL {
            if self.run_step(step)? == StepOutcome::Aborted {
                return Ok(RunOutcome::Aborted { at: step });
            }
            if let Some(next) = step.next() {
                let question = format!("Continue to step {} ({})?", next.index(), next.name());
                if !self.operator.confirm(&question)? {
                    info!("Paused after {}", step);
                    return Ok(RunOutcome::Paused { after: step });
                }
            }
        }

        info!("🎉 Deployment complete");
        Ok(RunOutcome::Finished)
    }

    fn execute(&mut self, step: Step) -> DeployResult<StepOutcome> {
        match step {
            Step::IssueAsset => self.issue_asset(),
            Step::DeployStaking => self.deploy_contract(ContractRole::Staking),
            Step::DeployVesting => self.deploy_contract(ContractRole::Vesting),
            Step::DistributeStaking => self.distribute(ContractRole::Staking),
            Step::DistributeVesting => self.distribute(ContractRole::Vesting),
            Step::CreateVestingSchedules => self.create_vesting_schedules(),
        }
    }

    fn issue_asset(&mut self) -> DeployResult<StepOutcome> {
        if let Some(existing) = self.state.token_identifier() {
            info!("Token already issued: {}", existing);
            self.operator.notify(&format!("Token already issued: {}", existing));
            return Ok(StepOutcome::AlreadyDone);
        }

        let tx = transactions::issue_transaction(&self.config, &self.plan)?;
        self.submit("Issue token", &tx)?;

        let event = PendingEvent::AssetIssued {
            ticker: self.config.token.ticker.clone(),
            explorer: self.state.network.config().explorer.to_string(),
        };
        match self.resolve(&event)? {
            Some(identifier) => {
                info!("Token identifier recorded: {}", identifier);
                self.state.record_token(identifier);
                Ok(StepOutcome::Completed)
            }
            None => Ok(StepOutcome::Aborted),
        }
    }

    fn deploy_contract(&mut self, role: ContractRole) -> DeployResult<StepOutcome> {
        if let Some(existing) = self.state.contract(role) {
            info!("{} contract already deployed: {}", role, existing);
            self.operator
                .notify(&format!("{} contract already deployed: {}", role, existing));
            return Ok(StepOutcome::AlreadyDone);
        }

        let token_identifier = self
            .state
            .token_identifier()
            .ok_or_else(|| DeployError::Precondition("Token not issued yet. Run step 1 first".to_string()))?
            .to_string();

        let artifact = self.config.artifacts.path(role);
        if !artifact.exists() {
            return Err(DeployError::MissingArtifact {
                path: artifact.to_path_buf(),
            });
        }

        let tx = transactions::deploy_transaction(&self.config, role, &token_identifier);
        self.submit(&format!("Deploy {} contract", role), &tx)?;

        let event = PendingEvent::ContractDeployed {
            role,
            explorer: self.state.network.config().explorer.to_string(),
        };
        match self.resolve(&event)? {
            Some(address) => {
                info!("{} contract recorded: {}", role, address);
                self.state.record_contract(role, address);
                Ok(StepOutcome::Completed)
            }
            None => Ok(StepOutcome::Aborted),
        }
    }

    fn distribute(&mut self, role: ContractRole) -> DeployResult<StepOutcome> {
        if let Some(amount) = self.state.receipts().funded(role) {
            info!("{} contract already funded with {} raw", role, amount);
            self.operator
                .notify(&format!("{} contract already funded", role));
            return Ok(StepOutcome::AlreadyDone);
        }

        let address = self
            .state
            .contract(role)
            .ok_or_else(|| DeployError::Precondition(format!("{} contract not deployed", role)))?
            .to_string();
        let token_identifier = self
            .state
            .token_identifier()
            .ok_or_else(|| DeployError::Precondition("Token not issued yet. Run step 1 first".to_string()))?
            .to_string();

        let amount = transactions::funding_amount(&self.plan, role)?;
        self.operator.notify(&format!(
            "Transferring {} {} to {} contract",
            self.plan.display(&amount),
            self.config.token.ticker,
            role
        ));

        let tx = transactions::funding_transaction(&self.config, &address, &token_identifier, &amount)?;
        self.submit(&format!("Distribute to {} contract", role), &tx)?;

        self.state.record_funding(role, amount.to_string());
        Ok(StepOutcome::Completed)
    }

    fn create_vesting_schedules(&mut self) -> DeployResult<StepOutcome> {
        let address = self
            .state
            .contract(ContractRole::Vesting)
            .ok_or_else(|| DeployError::Precondition("Vesting contract not deployed".to_string()))?
            .to_string();

        if self.schedules.is_empty() {
            warn!("No vesting beneficiaries configured, nothing to create");
            self.operator
                .notify("No vesting beneficiaries configured. Add them to the config and re-run this step.");
            return Ok(StepOutcome::Completed);
        }

        let pending: Vec<VestingScheduleEntry> = self
            .schedules
            .iter()
            .filter(|e| !schedule_recorded(&self.state, e))
            .cloned()
            .collect();
        if pending.is_empty() {
            info!("All {} vesting schedules already created", self.schedules.len());
            return Ok(StepOutcome::AlreadyDone);
        }

        for entry in pending {
            let beneficiary_hex = self.ledger.decode_address(&entry.beneficiary)?;
            let tx = transactions::schedule_transaction(&self.config, &address, &entry, &beneficiary_hex)?;
            self.operator.notify(&format!(
                "Creating {} vesting for {} ({}): {}",
                entry.kind.category(),
                entry.name,
                entry.beneficiary,
                self.plan.display(&entry.amount)
            ));
            self.submit(
                &format!("Create {} vesting for {}", entry.kind.category(), entry.beneficiary),
                &tx,
            )?;
            self.state.record_schedule(entry.receipt());
        }
        Ok(StepOutcome::Completed)
    }

    fn submit(&self, action: &str, tx: &Transaction) -> DeployResult<()> {
        debug!("Submitting {}", tx.describe());
        let outcome = self.ledger.submit(tx);
        if !outcome.ok {
            return Err(DeployError::ExternalCall {
                action: action.to_string(),
                output: outcome.output,
            });
        }
        debug!("{} accepted: {}", action, outcome.output.trim());
        self.operator.notify(&format!("{}: submitted", action));
        Ok(())
    }

    /// Blank answers count as no answer
    fn resolve(&self, event: &PendingEvent) -> DeployResult<Option<String>> {
        self.operator.notify(&format!("Check the transaction on {}", event.explorer()));
        let answer = self
            .operator
            .resolve(event)?
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if answer.is_none() {
            warn!("No value supplied for {:?}, stopping", event);
        }
        Ok(answer)
    }
}
