//! Given steps for task merge BDD scenarios.

use super::world::{MergeWorld, populate_catalog};
use eyre::WrapErr;
use flowplan::dataflow::domain::ConnectionPolicy;
use rstest_bdd_macros::given;

#[given("a catalog with an image source and two image sinks")]
fn catalog_with_sinks(world: &mut MergeWorld) -> Result<(), eyre::Report> {
    populate_catalog(&mut world.catalog).wrap_err("populate component catalog")?;
    Ok(())
}

#[given(r#"a source task feeding sink "{model}" on port "{port}" with a buffer of {size:u32}"#)]
fn source_feeds_sink_buffered(
    world: &mut MergeWorld,
    model: String,
    port: String,
    size: u32,
) -> Result<(), eyre::Report> {
    let sink = world.sink_task(&model)?;
    world
        .feed(sink, &port, ConnectionPolicy::buffer(size))
        .wrap_err("connect source to sink")
}

#[given(r#"the source task also feeds sink "{model}" on port "{port}" as data"#)]
fn source_feeds_sink_data(
    world: &mut MergeWorld,
    model: String,
    port: String,
) -> Result<(), eyre::Report> {
    let sink = world.sink_task(&model)?;
    world
        .feed(sink, &port, ConnectionPolicy::data())
        .wrap_err("connect source to sink")
}

#[given(r#"a task of sink "{model}""#)]
fn task_of_sink(world: &mut MergeWorld, model: String) -> Result<(), eyre::Report> {
    world.sink_task(&model)?;
    Ok(())
}
