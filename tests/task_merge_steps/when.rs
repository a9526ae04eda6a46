//! When steps for task merge BDD scenarios.

use super::world::MergeWorld;
use flowplan::dataflow::domain::TaskId;
use rstest_bdd_macros::when;

fn task_of(world: &MergeWorld, model: &str) -> Result<TaskId, eyre::Report> {
    world
        .sinks
        .get(model)
        .copied()
        .ok_or_else(|| eyre::eyre!("no task of model '{model}' in scenario world"))
}

#[when(r#"the "{merged}" task is merged into the "{survivor}" task"#)]
fn merge_tasks(world: &mut MergeWorld, merged: String, survivor: String) -> Result<(), eyre::Report> {
    let other = task_of(world, &merged)?;
    let candidate = task_of(world, &survivor)?;

    let result = world
        .engine
        .merge(&mut world.plan, &mut world.graph, candidate, other);
    world.survivor = Some(candidate);
    world.last_merge_result = Some(result);
    Ok(())
}
