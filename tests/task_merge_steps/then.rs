//! Then steps for task merge BDD scenarios.

use super::world::MergeWorld;
use flowplan::dataflow::domain::{ConnectionPolicy, DataflowError, PortName, PortPair};
use flowplan::merge::{MergeError, MergeReport};
use rstest_bdd_macros::then;

fn last_result(world: &MergeWorld) -> Result<&Result<MergeReport, MergeError>, eyre::Report> {
    world
        .last_merge_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing merge result in scenario world"))
}

#[then("the merge succeeds")]
fn merge_succeeds(world: &MergeWorld) -> Result<(), eyre::Report> {
    match last_result(world)? {
        Ok(report) if report.moved_edges() == 1 => Ok(()),
        Ok(report) => Err(eyre::eyre!(
            "expected one moved edge, got {}",
            report.moved_edges()
        )),
        Err(err) => Err(eyre::eyre!("unexpected merge failure: {err}")),
    }
}

#[then(r#"the source feeds the surviving task on port "{port}" with a buffer of {size:u32}"#)]
fn source_feeds_survivor(world: &MergeWorld, port: String, size: u32) -> Result<(), eyre::Report> {
    let source = world
        .source
        .ok_or_else(|| eyre::eyre!("no source task in scenario world"))?;
    let survivor = world
        .survivor
        .ok_or_else(|| eyre::eyre!("no merge was attempted"))?;
    let pair = PortPair::new(PortName::new("out1")?, PortName::new(port.as_str())?);
    let policy = world
        .graph
        .edge(&source, &survivor)
        .and_then(|mappings| mappings.get(&pair));
    if policy != Some(&ConnectionPolicy::buffer(size)) {
        return Err(eyre::eyre!(
            "expected {pair} with buffer {size}, found {policy:?}"
        ));
    }
    Ok(())
}

#[then("the plan holds {count:usize} tasks")]
fn plan_holds_tasks(world: &MergeWorld, count: usize) -> Result<(), eyre::Report> {
    if world.plan.len() != count {
        return Err(eyre::eyre!(
            "expected {count} tasks, found {}",
            world.plan.len()
        ));
    }
    Ok(())
}

#[then("the merge fails with a policy conflict")]
fn merge_fails_with_conflict(world: &MergeWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(
        result,
        Err(MergeError::Dataflow(DataflowError::PolicyConflict(_)))
    ) {
        return Err(eyre::eyre!("expected policy conflict, got {result:?}"));
    }
    Ok(())
}

#[then("the merge fails as ambiguous")]
fn merge_fails_as_ambiguous(world: &MergeWorld) -> Result<(), eyre::Report> {
    let result = last_result(world)?;
    if !matches!(result, Err(MergeError::AmbiguousMerge { .. })) {
        return Err(eyre::eyre!("expected ambiguous merge, got {result:?}"));
    }
    Ok(())
}
