mod common;

use std::fs;
use std::str::FromStr;

use common::{config_with_artifacts, share, FakeLedger, ScriptedOperator};
use lib_deploy::pipeline::step_complete;
use lib_deploy::{
    Category, ContractRole, DeployConfig, DeployError, DeploymentPipeline, DeploymentState,
    Network, RunOutcome, StateStore, Step, StepOutcome, Transaction,
};
use num_bigint::BigUint;
use tempfile::TempDir;

const TOKEN: &str = "XCIRCLEX-3b9d57";
const STAKING: &str = "erd1qqqqqqqqqqqqqpgqstaking";
const VESTING: &str = "erd1qqqqqqqqqqqqqpgqvesting";

fn raw(value: &str) -> BigUint {
    BigUint::from_str(value).unwrap()
}

fn fresh_state() -> DeploymentState {
    DeploymentState::new(Network::Devnet, "wallet.pem")
}

fn deployed_state() -> DeploymentState {
    let mut state = fresh_state();
    state.record_token(TOKEN.to_string());
    state.record_contract(ContractRole::Staking, STAKING.to_string());
    state.record_contract(ContractRole::Vesting, VESTING.to_string());
    state
}

fn failed_with(err: &DeployError) -> &DeployError {
    match err {
        DeployError::StepFailed { source, .. } => source.as_ref(),
        other => panic!("expected StepFailed, got {:?}", other),
    }
}

#[test]
fn test_full_run_routes_exact_amounts() {
    let dir = TempDir::new().unwrap();
    let mut config = config_with_artifacts(dir.path());
    config.vesting.team = vec![share("erd1alice", 60), share("erd1bob", 40)];
    let store = StateStore::new(dir.path().join("state.json"));
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new().answer(TOKEN).answer(STAKING).answer(VESTING);

    let mut pipeline =
        DeploymentPipeline::new(config, fresh_state(), store.clone(), &ledger, &operator).unwrap();
    assert_eq!(pipeline.run_all().unwrap(), RunOutcome::Finished);

    // issue + 2 deploys + 2 transfers + 2 schedules
    assert_eq!(ledger.call_count(), 7);
    assert_eq!(operator.started(), Step::ALL.to_vec());
    assert!(operator
        .notes()
        .iter()
        .any(|n| n.starts_with("Creating team vesting for")));

    let s = pipeline.plan().total_supply_raw().clone();
    assert_eq!(s, raw("314159265358979323846264338"));
    let floor = |p: u32| &s * p / 100u32;

    let amounts = ledger.transferred_amounts();
    assert_eq!(amounts[0], floor(15));
    assert_eq!(amounts[1], floor(10) + floor(3) + floor(5));
    assert_eq!(amounts[1], raw("56548667764616278292327579"));

    let state = pipeline.state();
    assert_eq!(state.token_identifier(), Some(TOKEN));
    assert_eq!(state.contract(ContractRole::Vesting), Some(VESTING));
    assert_eq!(state.receipts().vesting_schedules.len(), 2);
    assert_eq!(pipeline.next_pending_step(), None);

    let reloaded = store.load(Network::Devnet, "wallet.pem").unwrap();
    assert_eq!(&reloaded, state);
}

#[test]
fn test_issue_payload_goes_to_system_contract() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let store = StateStore::new(dir.path().join("state.json"));
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new().answer(TOKEN);

    let mut pipeline =
        DeploymentPipeline::new(config.clone(), fresh_state(), store, &ledger, &operator).unwrap();
    assert_eq!(pipeline.run_step(Step::IssueAsset).unwrap(), StepOutcome::Completed);

    match &ledger.calls()[0] {
        Transaction::Call {
            receiver,
            value,
            gas_limit,
            data,
        } => {
            assert_eq!(receiver, &config.token.system_contract);
            assert_eq!(value, &raw("50000000000000000"));
            assert_eq!(*gas_limit, 60_000_000);
            assert!(data
                .encode()
                .starts_with("issue@58434952434c4558@58434952434c4558@0103ddcfe682c3200d750612@12@"));
        }
        other => panic!("unexpected transaction {:?}", other),
    }
}

#[test]
fn test_deploy_passes_token_identifier() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let mut state = fresh_state();
    state.record_token(TOKEN.to_string());
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new().answer(VESTING);

    let mut pipeline = DeploymentPipeline::new(
        config,
        state,
        StateStore::new(dir.path().join("state.json")),
        &ledger,
        &operator,
    )
    .unwrap();
    // vesting does not depend on the staking contract
    assert_eq!(pipeline.run_step(Step::DeployVesting).unwrap(), StepOutcome::Completed);
    assert!(pipeline.state().contract(ContractRole::Staking).is_none());

    match &ledger.calls()[0] {
        Transaction::Deploy {
            gas_limit, arguments, ..
        } => {
            assert_eq!(*gas_limit, 100_000_000);
            assert_eq!(arguments[0].to_hex(), "58434952434c45582d336239643537");
        }
        other => panic!("unexpected transaction {:?}", other),
    }
}

#[test]
fn test_completed_steps_make_no_calls() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new();

    let mut pipeline = DeploymentPipeline::new(
        config,
        deployed_state(),
        StateStore::new(dir.path().join("state.json")),
        &ledger,
        &operator,
    )
    .unwrap();

    assert_eq!(pipeline.run_step(Step::IssueAsset).unwrap(), StepOutcome::AlreadyDone);
    assert_eq!(pipeline.run_step(Step::DeployStaking).unwrap(), StepOutcome::AlreadyDone);
    assert_eq!(pipeline.run_step(Step::DeployStaking).unwrap(), StepOutcome::AlreadyDone);
    assert_eq!(ledger.call_count(), 0);

    assert_eq!(pipeline.run_step(Step::DistributeStaking).unwrap(), StepOutcome::Completed);
    assert_eq!(pipeline.run_step(Step::DistributeStaking).unwrap(), StepOutcome::AlreadyDone);
    assert_eq!(ledger.call_count(), 1);
}

#[test]
fn test_missing_artifact_fails_before_any_call() {
    let dir = TempDir::new().unwrap();
    let mut config = DeployConfig::default();
    config.artifacts.staking = dir.path().join("absent.wasm");
    let mut state = fresh_state();
    state.record_token(TOKEN.to_string());
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new();

    let mut pipeline = DeploymentPipeline::new(
        config,
        state,
        StateStore::new(dir.path().join("state.json")),
        &ledger,
        &operator,
    )
    .unwrap();
    let err = pipeline.run_step(Step::DeployStaking).unwrap_err();

    assert!(matches!(failed_with(&err), DeployError::MissingArtifact { .. }));
    assert!(err.to_string().starts_with("Step 2 (Deploy Staking) failed"));
    assert_eq!(ledger.call_count(), 0);
}

#[test]
fn test_preconditions_are_enforced() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let store = StateStore::new(dir.path().join("state.json"));
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new();

    let mut pipeline =
        DeploymentPipeline::new(config, fresh_state(), store.clone(), &ledger, &operator).unwrap();

    for step in [
        Step::DeployStaking,
        Step::DistributeStaking,
        Step::DistributeVesting,
        Step::CreateVestingSchedules,
    ] {
        let err = pipeline.run_step(step).unwrap_err();
        assert!(matches!(failed_with(&err), DeployError::Precondition(_)), "{}", step);
    }
    assert_eq!(ledger.call_count(), 0);
    // saved even though every attempt failed
    assert!(store.path().exists());
}

#[test]
fn test_ledger_failure_keeps_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let store = StateStore::new(dir.path().join("state.json"));
    let ledger = FakeLedger::new().fail_call(0);
    let operator = ScriptedOperator::new().answer(TOKEN);

    let mut pipeline =
        DeploymentPipeline::new(config, fresh_state(), store.clone(), &ledger, &operator).unwrap();
    let err = pipeline.run_step(Step::IssueAsset).unwrap_err();

    match failed_with(&err) {
        DeployError::ExternalCall { output, .. } => assert!(output.contains("insufficient funds")),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(pipeline.state().token_identifier().is_none());
    let on_disk = store.load(Network::Devnet, "wallet.pem").unwrap();
    assert!(on_disk.token_identifier().is_none());
}

#[test]
fn test_blank_operator_answer_aborts() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new().answer("   ");

    let mut pipeline = DeploymentPipeline::new(
        config,
        fresh_state(),
        StateStore::new(dir.path().join("state.json")),
        &ledger,
        &operator,
    )
    .unwrap();

    assert_eq!(pipeline.run_all().unwrap(), RunOutcome::Aborted { at: Step::IssueAsset });
    assert_eq!(ledger.call_count(), 1);
    assert!(pipeline.state().token_identifier().is_none());
}

#[test]
fn test_declined_run_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let store = StateStore::new(dir.path().join("state.json"));
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new().confirm_with(false);

    let mut pipeline =
        DeploymentPipeline::new(config, fresh_state(), store.clone(), &ledger, &operator).unwrap();

    assert_eq!(pipeline.run_all().unwrap(), RunOutcome::Declined);
    assert_eq!(ledger.call_count(), 0);
    assert!(!store.path().exists());
}

#[test]
fn test_pause_between_steps() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new()
        .answer(TOKEN)
        .confirm_with(true)
        .confirm_with(false);

    let mut pipeline = DeploymentPipeline::new(
        config,
        fresh_state(),
        StateStore::new(dir.path().join("state.json")),
        &ledger,
        &operator,
    )
    .unwrap();

    assert_eq!(
        pipeline.run_all().unwrap(),
        RunOutcome::Paused { after: Step::IssueAsset }
    );
    assert_eq!(ledger.call_count(), 1);
    assert_eq!(pipeline.next_pending_step(), Some(Step::DeployStaking));
}

#[test]
fn test_empty_vesting_lists_make_no_calls() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new();

    let mut pipeline = DeploymentPipeline::new(
        config,
        deployed_state(),
        StateStore::new(dir.path().join("state.json")),
        &ledger,
        &operator,
    )
    .unwrap();

    assert_eq!(
        pipeline.run_step(Step::CreateVestingSchedules).unwrap(),
        StepOutcome::Completed
    );
    assert_eq!(ledger.call_count(), 0);
}

#[test]
fn test_vesting_resumes_after_partial_failure() {
    let dir = TempDir::new().unwrap();
    let mut config = config_with_artifacts(dir.path());
    config.vesting.team = vec![share("erd1alice", 60), share("erd1bob", 40)];
    config.vesting.advisors = vec![share("erd1carol", 100)];
    let store = StateStore::new(dir.path().join("state.json"));

    let ledger = FakeLedger::new().fail_call(1);
    let operator = ScriptedOperator::new();
    let mut pipeline = DeploymentPipeline::new(
        config.clone(),
        deployed_state(),
        store.clone(),
        &ledger,
        &operator,
    )
    .unwrap();
    let err = pipeline.run_step(Step::CreateVestingSchedules).unwrap_err();
    assert!(matches!(failed_with(&err), DeployError::ExternalCall { .. }));
    assert_eq!(ledger.call_count(), 2);

    let state = store.load(Network::Devnet, "wallet.pem").unwrap();
    assert_eq!(state.receipts().vesting_schedules.len(), 1);
    assert!(state.receipts().has_schedule(Category::Team, 0, "erd1alice"));

    let retry_ledger = FakeLedger::new();
    let mut pipeline =
        DeploymentPipeline::new(config, state, store.clone(), &retry_ledger, &operator).unwrap();
    assert_eq!(
        pipeline.run_step(Step::CreateVestingSchedules).unwrap(),
        StepOutcome::Completed
    );
    assert_eq!(retry_ledger.call_count(), 2);

    let team_total = pipeline.plan().amount(Category::Team).unwrap();
    match &retry_ledger.calls()[0] {
        Transaction::Call { data, .. } => {
            let expected_amount = &team_total * 40u32 / 100u32;
            assert_eq!(data.function(), "createTeamVesting");
            assert!(data.encode().ends_with(&format!("@{}", hex_int(&expected_amount))));
        }
        other => panic!("unexpected transaction {:?}", other),
    }

    assert_eq!(
        pipeline.run_step(Step::CreateVestingSchedules).unwrap(),
        StepOutcome::AlreadyDone
    );
    assert_eq!(retry_ledger.call_count(), 2);
}

#[test]
fn test_repeated_beneficiary_tranches_resume_independently() {
    let dir = TempDir::new().unwrap();
    let mut config = config_with_artifacts(dir.path());
    config.vesting.team = vec![share("erd1alice", 50), share("erd1alice", 50)];
    let store = StateStore::new(dir.path().join("state.json"));

    let ledger = FakeLedger::new().fail_call(1);
    let operator = ScriptedOperator::new();
    let mut pipeline = DeploymentPipeline::new(
        config.clone(),
        deployed_state(),
        store.clone(),
        &ledger,
        &operator,
    )
    .unwrap();
    assert!(pipeline.run_step(Step::CreateVestingSchedules).is_err());
    assert_eq!(ledger.call_count(), 2);

    let state = store.load(Network::Devnet, "wallet.pem").unwrap();
    assert!(state.receipts().has_schedule(Category::Team, 0, "erd1alice"));
    assert!(!state.receipts().has_schedule(Category::Team, 1, "erd1alice"));

    let retry_ledger = FakeLedger::new();
    let mut pipeline =
        DeploymentPipeline::new(config, state, store.clone(), &retry_ledger, &operator).unwrap();
    assert!(!step_complete(Step::CreateVestingSchedules, pipeline.state(), pipeline.schedules()));
    assert_eq!(
        pipeline.run_step(Step::CreateVestingSchedules).unwrap(),
        StepOutcome::Completed
    );
    assert_eq!(retry_ledger.call_count(), 1);
    assert_eq!(pipeline.state().receipts().vesting_schedules.len(), 2);
    assert!(step_complete(Step::CreateVestingSchedules, pipeline.state(), pipeline.schedules()));
}

#[test]
fn test_save_failure_is_reported_after_ledger_success() {
    let dir = TempDir::new().unwrap();
    let config = config_with_artifacts(dir.path());
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();
    let store = StateStore::new(blocker.join("state.json"));
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new().answer(TOKEN);

    let mut pipeline =
        DeploymentPipeline::new(config, fresh_state(), store, &ledger, &operator).unwrap();
    let err = pipeline.run_step(Step::IssueAsset).unwrap_err();

    assert!(err.is_persistence());
    assert_eq!(ledger.call_count(), 1);
    assert_eq!(pipeline.state().token_identifier(), Some(TOKEN));
}

#[test]
fn test_invalid_distribution_rejected_at_construction() {
    let dir = TempDir::new().unwrap();
    let mut config = config_with_artifacts(dir.path());
    config.distribution.pop();
    let ledger = FakeLedger::new();
    let operator = ScriptedOperator::new();

    let result = DeploymentPipeline::new(
        config,
        fresh_state(),
        StateStore::new(dir.path().join("state.json")),
        &ledger,
        &operator,
    );
    assert!(matches!(result, Err(DeployError::InvalidConfig(_))));
}

fn hex_int(value: &BigUint) -> String {
    lib_deploy::payload::encode_int(value)
}
