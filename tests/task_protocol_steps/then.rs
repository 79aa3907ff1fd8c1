//! Then steps for task protocol BDD scenarios.

use super::world::{TaskProtocolWorld, run_async};
use rstest_bdd_macros::then;
use taskbot::{bot::services::RouteOutcome, task::domain::TaskStatus, task::ports::TaskRepository};

fn last_outcome(world: &TaskProtocolWorld) -> Result<RouteOutcome, eyre::Report> {
    world
        .last_outcome
        .ok_or_else(|| eyre::eyre!("no event was routed"))
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskProtocolWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let id = world.current_task()?.id();
    let stored = run_async(world.repository.find_by_id(id))?
        .ok_or_else(|| eyre::eyre!("task {id} vanished"))?;
    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then(r#"the task carries the proof "{proof}""#)]
fn task_carries_proof(world: &TaskProtocolWorld, proof: String) -> Result<(), eyre::Report> {
    let id = world.current_task()?.id();
    let stored = run_async(world.repository.find_by_id(id))?
        .ok_or_else(|| eyre::eyre!("task {id} vanished"))?;
    let found = stored.evidence().and_then(|evidence| evidence.proof_text());
    if found != Some(proof.as_str()) {
        return Err(eyre::eyre!("expected proof {proof:?}, found {found:?}"));
    }
    Ok(())
}

#[then("the last action was denied")]
fn last_action_denied(world: &TaskProtocolWorld) -> Result<(), eyre::Report> {
    let outcome = last_outcome(world)?;
    if !matches!(outcome, RouteOutcome::Denied { .. }) {
        return Err(eyre::eyre!("expected a denial, got {outcome:?}"));
    }
    Ok(())
}

#[then("the last action received guidance")]
fn last_action_guidance(world: &TaskProtocolWorld) -> Result<(), eyre::Report> {
    let outcome = last_outcome(world)?;
    if outcome != RouteOutcome::Guidance {
        return Err(eyre::eyre!("expected guidance, got {outcome:?}"));
    }
    Ok(())
}

#[then("the dispatcher handled {count:u64} notifications")]
fn dispatcher_handled(world: &TaskProtocolWorld, count: u64) -> Result<(), eyre::Report> {
    run_async(world.dispatcher.shutdown());
    let stats = world.dispatcher.stats();
    if stats.deliveries != count {
        return Err(eyre::eyre!(
            "expected {count} deliveries, dispatcher saw {stats:?}"
        ));
    }
    if stats.failed != 0 || stats.dropped != 0 {
        return Err(eyre::eyre!("unexpected delivery failures: {stats:?}"));
    }
    let sent = world.transport.calls()?.iter().filter(|call| call.is_send()).count();
    if sent == 0 {
        return Err(eyre::eyre!("no messages reached the transport"));
    }
    Ok(())
}
