//! Port rename tables built from service pairs.

use super::{MergeResult, pairing::ServicePair};
use crate::dataflow::domain::PortName;
use crate::model::domain::{CapabilityName, ModelError, PortDeclaration, PortDirection};
use crate::plan::domain::Task;
use std::collections::BTreeMap;

/// Real port names of the merged task mapped onto the candidate's.
#[derive(Debug, Clone, Default)]
pub(super) struct PortRenames {
    inputs: BTreeMap<PortName, PortName>,
    outputs: BTreeMap<PortName, PortName>,
}

impl PortRenames {
    /// Builds the tables from the capability ports of each pair.
    pub(super) fn from_pairs(pairs: &[ServicePair<'_>]) -> MergeResult<Self> {
        let mut renames = Self::default();
        for pair in pairs {
            let capability = pair.other.capability();
            let Some(target) = pair.candidate.mapping_for(capability.name()) else {
                continue;
            };
            for declared in capability.ports().iter() {
                let Some(from) = pair.other.real_port(declared.name().as_str()) else {
                    continue;
                };
                let to = target.get(declared.name().as_str()).ok_or_else(|| {
                    ModelError::PortNotFound {
                        owner: pair.candidate.full_name().to_owned(),
                        port: declared.name().to_string(),
                    }
                })?;
                renames.record(declared.direction(), capability.name(), from, to)?;
            }
        }
        Ok(renames)
    }

    fn record(
        &mut self,
        direction: PortDirection,
        capability: &CapabilityName,
        from: &PortName,
        to: &PortName,
    ) -> MergeResult<()> {
        let table = match direction {
            PortDirection::Input => &mut self.inputs,
            PortDirection::Output => &mut self.outputs,
        };
        if let Some(existing) = table.get(from)
            && existing != to
        {
            return Err(ModelError::PortMappingConflict {
                capability: capability.clone(),
                port: from.clone(),
                existing: existing.clone(),
                requested: to.clone(),
            }
            .into());
        }
        table.insert(from.clone(), to.clone());
        Ok(())
    }

    /// Returns the input renames.
    pub(super) const fn inputs(&self) -> &BTreeMap<PortName, PortName> {
        &self.inputs
    }

    /// Returns the output renames.
    pub(super) const fn outputs(&self) -> &BTreeMap<PortName, PortName> {
        &self.outputs
    }

    /// Translates an input of `other` into an input of `candidate`.
    pub(super) fn input(
        &self,
        port: &PortName,
        other: &Task,
        candidate: &Task,
        allow_dynamic: bool,
    ) -> MergeResult<PortName> {
        Self::translate(
            &self.inputs,
            port,
            PortDirection::Input,
            (other, candidate),
            allow_dynamic,
        )
    }

    /// Translates an output of `other` into an output of `candidate`.
    pub(super) fn output(
        &self,
        port: &PortName,
        other: &Task,
        candidate: &Task,
        allow_dynamic: bool,
    ) -> MergeResult<PortName> {
        Self::translate(
            &self.outputs,
            port,
            PortDirection::Output,
            (other, candidate),
            allow_dynamic,
        )
    }

    /// Ports outside every service keep their name when the candidate
    /// declares a port of that name with the same type.
    fn translate(
        table: &BTreeMap<PortName, PortName>,
        port: &PortName,
        direction: PortDirection,
        (other, candidate): (&Task, &Task),
        allow_dynamic: bool,
    ) -> MergeResult<PortName> {
        if let Some(renamed) = table.get(port) {
            return Ok(renamed.clone());
        }
        let model = candidate.model();
        let declared = declared_port(candidate, port, direction);
        if let Some(own) = declared
            && let Some(theirs) = declared_port(other, port, direction)
            && own.type_name() != theirs.type_name()
        {
            return Err(ModelError::PortTypeMismatch {
                owner: format!("{} ({})", model.name(), candidate.id()),
                port: port.clone(),
                expected: theirs.signature(),
                actual: own.signature(),
            }
            .into());
        }

        let dynamic = match direction {
            PortDirection::Input => model.has_dynamic_input(port.as_str()),
            PortDirection::Output => model.has_dynamic_output(port.as_str()),
        };
        if declared.is_some() || (allow_dynamic && dynamic) {
            return Ok(port.clone());
        }
        Err(ModelError::PortNotFound {
            owner: format!("{} ({})", model.name(), candidate.id()),
            port: port.to_string(),
        }
        .into())
    }
}

/// The port `port` of `task` usable in `direction`. Composite ports forward
/// both ways.
fn declared_port<'t>(
    task: &'t Task,
    port: &PortName,
    direction: PortDirection,
) -> Option<&'t PortDeclaration> {
    let model = task.model();
    if model.is_composite() {
        model.ports().get(port.as_str())
    } else {
        model.port(port.as_str(), direction)
    }
}
