//! Baseline entity - a frozen snapshot of a resolved configured structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix, PartKey};
use crate::entities::part::IterationRef;
use crate::structure::audit::PolicyAudit;

/// Iterations and link choices frozen from one traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Unique identifier (BSL-...)
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Root part the baseline was taken from
    pub root: PartKey,

    /// Policy that produced the frozen choices
    pub source_policy: String,

    #[serde(default)]
    pub iterations: BTreeSet<IterationRef>,

    /// Optional usage links included
    #[serde(default)]
    pub optional_links: BTreeSet<EntityId>,

    /// Substitute links used in place of their usage link
    #[serde(default)]
    pub substitute_links: BTreeSet<EntityId>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author name
    pub author: String,
}

impl Entity for Baseline {
    type Id = EntityId;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}

impl Baseline {
    /// Create an empty baseline
    pub fn new(
        name: impl Into<String>,
        root: PartKey,
        source_policy: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Bsl),
            name: name.into(),
            description: None,
            root,
            source_policy: source_policy.into(),
            iterations: BTreeSet::new(),
            optional_links: BTreeSet::new(),
            substitute_links: BTreeSet::new(),
            created: Utc::now(),
            author: author.into(),
        }
    }

    /// Freeze the choices recorded during a traversal
    pub fn from_audit(
        name: impl Into<String>,
        root: PartKey,
        source_policy: impl Into<String>,
        author: impl Into<String>,
        audit: PolicyAudit,
    ) -> Self {
        let mut baseline = Self::new(name, root, source_policy, author);
        baseline.iterations = audit.retained_iterations;
        baseline.optional_links = audit.retained_optional_links;
        baseline.substitute_links = audit.retained_substitute_links;
        baseline
    }

    /// Frozen iterations of one part
    pub fn iterations_of<'a>(&'a self, part: &'a PartKey) -> impl Iterator<Item = &'a IterationRef> {
        self.iterations.iter().filter(move |r| &r.part == part)
    }
}
