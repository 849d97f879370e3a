//! Work-in-progress view: the latest iteration of the latest revision

use crate::entities::link::PartLink;
use crate::entities::part::{IterationRef, PartMaster};
use crate::structure::audit::PolicyAudit;
use crate::structure::policy::{AccessPredicate, ConfigurationPolicy};

/// Shows what `principal` would see when opening each part right now
///
/// Only the last revision is consulted. If its latest iteration is not
/// accessible the part is unresolved, even when an older revision would be.
#[derive(Debug, Clone)]
pub struct WorkInProgressPolicy<A> {
    principal: String,
    access: A,
}

impl<A: AccessPredicate> WorkInProgressPolicy<A> {
    pub fn new(principal: impl Into<String>, access: A) -> Self {
        Self {
            principal: principal.into(),
            access,
        }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }
}

impl<A: AccessPredicate> ConfigurationPolicy for WorkInProgressPolicy<A> {
    fn name(&self) -> &'static str {
        "wip"
    }

    fn filter_iterations(&self, part: &PartMaster, audit: &mut PolicyAudit) -> Vec<IterationRef> {
        let Some(revision) = part.last_revision() else {
            return Vec::new();
        };
        let Some(iteration) = revision.last_iteration() else {
            return Vec::new();
        };

        if !self.access.can_access(&self.principal, iteration) {
            tracing::trace!(part = %part.key, principal = %self.principal, "latest iteration not accessible");
            return Vec::new();
        }

        let reference = part.iteration_ref(revision, iteration);
        audit.record_iteration(reference.clone());
        vec![reference]
    }

    /// Links are taken as modeled; optional links stay in
    fn filter_links(&self, path: &[PartLink], _audit: &mut PolicyAudit) -> Vec<PartLink> {
        path.last().cloned().into_iter().collect()
    }
}
