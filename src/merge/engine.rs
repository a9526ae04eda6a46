//! Merge engine: checks and performs task merges.

use super::{
    MergeError, MergeResult,
    pairing::{self, ServicePair},
    rename::PortRenames,
};
use crate::dataflow::domain::{
    ConnectionGraph, ConnectionMappings, DataflowError, PortName, PortPair, TaskId,
};
use crate::model::domain::{ServiceId, ServiceModel};
use crate::plan::domain::{Plan, Task};
use std::collections::BTreeMap;
use tracing::info;

/// Outcome of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    candidate: TaskId,
    removed: TaskId,
    service_pairs: Vec<(String, String)>,
    renamed_inputs: BTreeMap<PortName, PortName>,
    renamed_outputs: BTreeMap<PortName, PortName>,
    moved_edges: usize,
}

impl MergeReport {
    /// Returns the task that remains.
    #[must_use]
    pub const fn candidate(&self) -> TaskId {
        self.candidate
    }

    /// Returns the task that left the plan.
    #[must_use]
    pub const fn removed(&self) -> TaskId {
        self.removed
    }

    /// Returns `(merged service, taking-over service)` full name pairs.
    #[must_use]
    pub fn service_pairs(&self) -> &[(String, String)] {
        &self.service_pairs
    }

    /// Returns how inputs of the removed task were renamed.
    #[must_use]
    pub const fn renamed_inputs(&self) -> &BTreeMap<PortName, PortName> {
        &self.renamed_inputs
    }

    /// Returns how outputs of the removed task were renamed.
    #[must_use]
    pub const fn renamed_outputs(&self) -> &BTreeMap<PortName, PortName> {
        &self.renamed_outputs
    }

    /// Returns how many edges were moved onto the candidate.
    #[must_use]
    pub const fn moved_edges(&self) -> usize {
        self.moved_edges
    }
}

/// Decides whether tasks can be collapsed and collapses them.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine;

impl MergeEngine {
    /// Creates a merge engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns whether `other` can be merged into `candidate`.
    #[must_use]
    pub fn can_merge(&self, plan: &Plan, candidate: TaskId, other: TaskId) -> bool {
        self.check_mergeable(plan, candidate, other).is_ok()
    }

    /// Explains why `other` cannot be merged into `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::StructuralMergeViolation`] when the tasks are
    /// the same, differ in composite-ness, are ancestors of one another,
    /// disagree on an argument or would create a composition cycle, and
    /// [`MergeError::NoCompatibleService`] when a root service of `other`
    /// has no counterpart on `candidate`.
    pub fn check_mergeable(
        &self,
        plan: &Plan,
        candidate: TaskId,
        other: TaskId,
    ) -> MergeResult<()> {
        let (candidate, other) = structural_check(plan, candidate, other)?;
        pairing::check_services(candidate, other)
    }

    /// Merges `other` into `candidate`.
    ///
    /// Edges of `other` are rewritten onto `candidate` through the port
    /// renames implied by the service pairing and reconciled with the
    /// candidate's existing edges. Then the hierarchy links, arguments and
    /// resources of `other` move to `candidate` and `other` leaves the plan.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::check_mergeable`] plus
    /// [`MergeError::AmbiguousMerge`] when a service cannot be paired,
    /// [`MergeError::Model`] when a port cannot be renamed and
    /// [`MergeError::Dataflow`] when rewritten policies conflict. Neither
    /// the plan nor the graph is modified on error.
    pub fn merge(
        &self,
        plan: &mut Plan,
        graph: &mut ConnectionGraph<TaskId>,
        candidate: TaskId,
        other: TaskId,
    ) -> MergeResult<MergeReport> {
        let (staged, resources, report) = {
            let (candidate_task, other_task) = structural_check(plan, candidate, other)?;
            let pairs = pairing::pair_services(candidate_task, other_task)?;
            let renames = PortRenames::from_pairs(&pairs)?;
            let allow_dynamic = plan.config().allow_dynamic_ports;
            let (staged, moved_edges) =
                rewrite_edges(graph, candidate_task, other_task, &renames, allow_dynamic)?;
            let resources = transferred_resources(candidate_task, other_task, &pairs);
            let report = MergeReport {
                candidate,
                removed: other,
                service_pairs: pairs
                    .iter()
                    .map(|pair| {
                        (
                            pair.other.full_name().to_owned(),
                            pair.candidate.full_name().to_owned(),
                        )
                    })
                    .collect(),
                renamed_inputs: renames.inputs().clone(),
                renamed_outputs: renames.outputs().clone(),
                moved_edges,
            };
            (staged, resources, report)
        };

        plan.absorb(candidate, other, resources)?;
        *graph = staged;
        info!(
            %candidate,
            removed = %other,
            services = report.service_pairs.len(),
            moved_edges = report.moved_edges,
            "tasks merged"
        );
        Ok(report)
    }
}

fn structural_check(
    plan: &Plan,
    candidate: TaskId,
    other: TaskId,
) -> MergeResult<(&Task, &Task)> {
    let violation = |reason: String| MergeError::StructuralMergeViolation {
        candidate,
        other,
        reason,
    };

    if candidate == other {
        return Err(violation("a task cannot be merged into itself".to_owned()));
    }
    let candidate_task = plan.require(&candidate)?;
    let other_task = plan.require(&other)?;

    if candidate_task.is_composite() != other_task.is_composite() {
        return Err(violation(
            "only tasks of the same kind (component or composite) merge".to_owned(),
        ));
    }
    if plan.is_ancestor(&candidate, &other) || plan.is_ancestor(&other, &candidate) {
        return Err(violation("one task contains the other".to_owned()));
    }
    if let Some(name) = candidate_task.arguments().iter().find_map(|(name, value)| {
        other_task
            .argument(name)
            .filter(|theirs| *theirs != value)
            .map(|_| name)
    }) {
        return Err(violation(format!("argument {name} differs")));
    }
    if other_task
        .parents()
        .iter()
        .any(|parent| plan.is_ancestor(&candidate, parent))
        || other_task
            .children()
            .iter()
            .any(|child| plan.is_ancestor(child, &candidate))
    {
        return Err(violation(
            "moving the hierarchy links would create a composition cycle".to_owned(),
        ));
    }
    if other_task.model().services().is_empty()
        && other_task.model().name() != candidate_task.model().name()
    {
        return Err(violation(format!(
            "{} provides no service and {} is another model",
            other_task.model().name(),
            candidate_task.model().name()
        )));
    }
    Ok((candidate_task, other_task))
}

/// Moves every edge of `other` onto `candidate` in a copy of `graph`.
fn rewrite_edges(
    graph: &ConnectionGraph<TaskId>,
    candidate: &Task,
    other_task: &Task,
    renames: &PortRenames,
    allow_dynamic: bool,
) -> MergeResult<(ConnectionGraph<TaskId>, usize)> {
    let other = other_task.id();
    let mut staged = graph.clone();
    let removed = staged.remove_node(&other);
    let moved = removed.len();

    for (source, sink, mappings) in removed {
        let mut rewritten = ConnectionMappings::new();
        for (pair, policy) in mappings {
            let source_port = if source == other {
                renames.output(&pair.source, other_task, candidate, allow_dynamic)?
            } else {
                pair.source
            };
            let sink_port = if sink == other {
                renames.input(&pair.sink, other_task, candidate, allow_dynamic)?
            } else {
                pair.sink
            };
            let rewritten_pair = PortPair::new(source_port, sink_port);
            let reconciled = match rewritten.remove(&rewritten_pair) {
                Some(existing) => existing
                    .merge(&policy)
                    .map_err(|conflict| DataflowError::from(conflict.along([&rewritten_pair])))?,
                None => policy,
            };
            rewritten.insert(rewritten_pair, reconciled);
        }

        let new_source = if source == other { candidate.id() } else { source };
        let new_sink = if sink == other { candidate.id() } else { sink };
        staged.connect(new_source, new_sink, rewritten)?;
    }
    Ok((staged, moved))
}

/// Resources of `other` re-keyed onto the candidate services taking them
/// over. Assignments the candidate already has are kept.
fn transferred_resources(
    candidate: &Task,
    other: &Task,
    pairs: &[ServicePair<'_>],
) -> BTreeMap<ServiceId, String> {
    other
        .resources()
        .iter()
        .filter_map(|(service, resource)| {
            let target = pairs
                .iter()
                .find(|pair| pair.other.id() == *service)
                .map(|pair| pair.candidate.id())
                .or_else(|| {
                    other
                        .model()
                        .service(*service)
                        .and_then(|own| candidate.model().find_service(own.full_name()))
                        .map(ServiceModel::id)
                })?;
            candidate
                .resource(target)
                .is_none()
                .then(|| (target, resource.clone()))
        })
        .collect()
}
