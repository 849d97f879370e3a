//! Policy audit - provenance of the choices made during one traversal

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::identity::EntityId;
use crate::entities::part::IterationRef;

/// Iterations, optional links and substitutes a policy retained
///
/// One audit is created per traversal and returned with its result. Audits
/// of sharded traversals are combined with [`PolicyAudit::merge`] once every
/// traversal has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyAudit {
    #[serde(default)]
    pub retained_iterations: BTreeSet<IterationRef>,

    /// Optional usage links kept
    #[serde(default)]
    pub retained_optional_links: BTreeSet<EntityId>,

    /// Substitute links chosen in place of their usage link
    #[serde(default)]
    pub retained_substitute_links: BTreeSet<EntityId>,
}

impl PolicyAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_iteration(&mut self, iteration: IterationRef) {
        self.retained_iterations.insert(iteration);
    }

    pub fn record_optional_link(&mut self, link: EntityId) {
        self.retained_optional_links.insert(link);
    }

    pub fn record_substitute_link(&mut self, link: EntityId) {
        self.retained_substitute_links.insert(link);
    }

    pub fn merge(&mut self, other: PolicyAudit) {
        self.retained_iterations.extend(other.retained_iterations);
        self.retained_optional_links
            .extend(other.retained_optional_links);
        self.retained_substitute_links
            .extend(other.retained_substitute_links);
    }

    pub fn is_empty(&self) -> bool {
        self.retained_iterations.is_empty()
            && self.retained_optional_links.is_empty()
            && self.retained_substitute_links.is_empty()
    }
}
