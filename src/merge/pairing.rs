//! Pairing of the merged task's services with candidate services.

use super::{MergeError, MergeResult};
use crate::model::domain::{ServiceId, ServiceModel};
use crate::plan::domain::Task;

/// A service of the merged task and the candidate service taking it over.
#[derive(Debug, Clone, Copy)]
pub(super) struct ServicePair<'m> {
    pub(super) other: &'m ServiceModel,
    pub(super) candidate: &'m ServiceModel,
}

/// Resources conflict only when both sides have one and they differ.
fn resources_compatible(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(mine), Some(theirs)) => mine == theirs,
        _ => true,
    }
}

fn single<T>(mut items: impl Iterator<Item = T>) -> Option<T> {
    match (items.next(), items.next()) {
        (Some(item), None) => Some(item),
        _ => None,
    }
}

/// Direct slaves of `master` on `task`'s model.
fn slaves(task: &Task, master: ServiceId) -> Vec<&ServiceModel> {
    task.model()
        .services()
        .iter()
        .filter(|service| service.master() == Some(master))
        .collect()
}

/// Whether `host` on `candidate` can take over `service` of `other`,
/// slaves included.
fn can_host(candidate: &Task, other: &Task, service: &ServiceModel, host: &ServiceModel) -> bool {
    host.fullfills(service.capability().name())
        && resources_compatible(candidate.resource(host.id()), other.resource(service.id()))
        && slaves(other, service.id()).into_iter().all(|slave| {
            slaves(candidate, host.id())
                .into_iter()
                .any(|own| can_host(candidate, other, slave, own))
        })
}

/// Services among `hosts` able to take over `service` of `other`.
fn compatible_services<'m>(
    candidate: &Task,
    other: &Task,
    service: &ServiceModel,
    hosts: &[&'m ServiceModel],
) -> Vec<&'m ServiceModel> {
    hosts
        .iter()
        .copied()
        .filter(|own| can_host(candidate, other, service, own))
        .collect()
}

fn no_compatible_service(candidate: &Task, service: &ServiceModel) -> MergeError {
    MergeError::NoCompatibleService {
        candidate: candidate.id(),
        service: service.full_name().to_owned(),
        capability: service.capability().name().clone(),
    }
}

/// Checks that every root service of `other` has at least one service on
/// `candidate` able to take it over together with its slaves.
pub(super) fn check_services(candidate: &Task, other: &Task) -> MergeResult<()> {
    let hosts: Vec<&ServiceModel> = candidate.model().services().iter().collect();
    for service in other.model().root_services() {
        if compatible_services(candidate, other, service, &hosts).is_empty() {
            return Err(no_compatible_service(candidate, service));
        }
    }
    Ok(())
}

/// Picks exactly one candidate service per service of `other`.
///
/// Root services are paired first; the slaves of each are then paired
/// among the slaves of the chosen candidate service. Among several
/// compatible services the one with the same full name wins, then the one
/// with the same local name, then the only root service.
pub(super) fn pair_services<'m>(
    candidate: &'m Task,
    other: &'m Task,
) -> MergeResult<Vec<ServicePair<'m>>> {
    let hosts: Vec<&ServiceModel> = candidate.model().services().iter().collect();
    let mut pairs = Vec::new();
    for service in other.model().root_services() {
        pair_service(candidate, other, service, &hosts, &mut pairs)?;
    }
    Ok(pairs)
}

fn pair_service<'m>(
    candidate: &'m Task,
    other: &'m Task,
    service: &'m ServiceModel,
    hosts: &[&'m ServiceModel],
    pairs: &mut Vec<ServicePair<'m>>,
) -> MergeResult<()> {
    let compatible = compatible_services(candidate, other, service, hosts);
    let chosen = match compatible.as_slice() {
        [] => return Err(no_compatible_service(candidate, service)),
        [only] => *only,
        _ => single(
            compatible
                .iter()
                .filter(|own| own.full_name() == service.full_name()),
        )
        .or_else(|| single(compatible.iter().filter(|own| own.name() == service.name())))
        .or_else(|| single(compatible.iter().filter(|own| own.is_root())))
        .copied()
        .ok_or_else(|| MergeError::AmbiguousMerge {
            service: service.full_name().to_owned(),
            candidates: compatible
                .iter()
                .map(|own| own.full_name().to_owned())
                .collect(),
        })?,
    };
    pairs.push(ServicePair {
        other: service,
        candidate: chosen,
    });

    let own_slaves = slaves(candidate, chosen.id());
    for slave in slaves(other, service.id()) {
        pair_service(candidate, other, slave, &own_slaves, pairs)?;
    }
    Ok(())
}
