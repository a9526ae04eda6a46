//! Shared world state for task merge BDD scenarios.

use std::collections::{BTreeMap, HashMap};

use flowplan::dataflow::domain::{ConnectionGraph, ConnectionPolicy, PortName, PortPair, TaskId};
use flowplan::merge::{MergeEngine, MergeError, MergeReport};
use flowplan::model::{
    adapters::memory::InMemoryComponentCatalog,
    domain::{Capability, CapabilityName, ModelError, PortMapping, PortSet, TaskModel, TaskModelName},
};
use flowplan::plan::domain::Plan;
use rstest::fixture;

/// Scenario world for task merge behaviour tests.
pub struct MergeWorld {
    /// Catalog the tasks are instantiated from.
    pub catalog: InMemoryComponentCatalog,
    /// Plan under test.
    pub plan: Plan,
    /// Required dataflow between the plan's tasks.
    pub graph: ConnectionGraph<TaskId>,
    /// Engine performing the merges.
    pub engine: MergeEngine,
    /// The image source task, once instantiated.
    pub source: Option<TaskId>,
    /// Sink tasks by model name.
    pub sinks: HashMap<String, TaskId>,
    /// Task that survived the last merge.
    pub survivor: Option<TaskId>,
    /// Result of the last merge attempt.
    pub last_merge_result: Option<Result<MergeReport, MergeError>>,
}

impl MergeWorld {
    /// Creates a world with an empty catalog and plan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: InMemoryComponentCatalog::new(),
            plan: Plan::new(),
            graph: ConnectionGraph::new(),
            engine: MergeEngine::new(),
            source: None,
            sinks: HashMap::new(),
            survivor: None,
            last_merge_result: None,
        }
    }

    /// Returns the source task, instantiating it on first use.
    pub fn source_task(&mut self) -> Result<TaskId, eyre::Report> {
        if let Some(source) = self.source {
            return Ok(source);
        }
        let source = self.plan.instantiate(&self.catalog, &TaskModelName::new("Source")?)?;
        self.source = Some(source);
        Ok(source)
    }

    /// Returns the task of sink model `model`, instantiating it on first use.
    pub fn sink_task(&mut self, model: &str) -> Result<TaskId, eyre::Report> {
        if let Some(task) = self.sinks.get(model) {
            return Ok(*task);
        }
        let task = self.plan.instantiate(&self.catalog, &TaskModelName::new(model)?)?;
        self.sinks.insert(model.to_owned(), task);
        Ok(task)
    }

    /// Connects the source's `out1` to `sink.input` with `policy`.
    pub fn feed(
        &mut self,
        sink: TaskId,
        input: &str,
        policy: ConnectionPolicy,
    ) -> Result<(), eyre::Report> {
        let source = self.source_task()?;
        self.graph.connect(
            source,
            sink,
            BTreeMap::from([(PortPair::new(PortName::new("out1")?, PortName::new(input)?), policy)]),
        )?;
        Ok(())
    }
}

impl Default for MergeWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MergeWorld {
    MergeWorld::default()
}

fn sink_model(
    name: &str,
    ports: PortSet,
    services: &[(&str, &str)],
    consumer: &std::sync::Arc<Capability>,
) -> Result<TaskModel, ModelError> {
    let mut model = TaskModel::component(TaskModelName::new(name)?, ports);
    for (service, input) in services {
        model.provide(
            service,
            std::sync::Arc::clone(consumer),
            &PortMapping::from_pairs([("frame", *input)])?,
        )?;
    }
    Ok(model)
}

/// Registers `Source` (`out1`), the single-input sinks `Sink1` (`inX`) and
/// `Sink2` (`in1`) and the two-service sink `Stereo` (`left`, `right`).
pub fn populate_catalog(catalog: &mut InMemoryComponentCatalog) -> Result<(), ModelError> {
    let consumer = catalog.declare_capability(Capability::declare(
        CapabilityName::new("ImageConsumer")?,
        PortSet::new().with_input("frame", "Image")?,
    ))?;

    catalog.register_task_model(TaskModel::component(
        TaskModelName::new("Source")?,
        PortSet::new().with_output("out1", "Image")?,
    ))?;
    catalog.register_task_model(sink_model(
        "Sink1",
        PortSet::new().with_input("inX", "Image")?,
        &[("display", "inX")],
        &consumer,
    )?)?;
    catalog.register_task_model(sink_model(
        "Sink2",
        PortSet::new().with_input("in1", "Image")?,
        &[("display", "in1")],
        &consumer,
    )?)?;
    catalog.register_task_model(sink_model(
        "Stereo",
        PortSet::new()
            .with_input("left", "Image")?
            .with_input("right", "Image")?,
        &[("left", "left"), ("right", "right")],
        &consumer,
    )?)?;
    Ok(())
}
