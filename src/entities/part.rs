//! Part entities - masters, revisions and iterations
//!
//! A [`PartMaster`] is the identity of a part. It owns an ordered list of
//! [`PartRevision`]s (major versions: A, B, C...), each of which owns an
//! ordered list of [`PartIteration`]s (minor versions: 1, 2, 3...). Only
//! iterations carry structure, as an ordered list of outgoing usage links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::identity::PartKey;
use crate::entities::effectivity::Effectivity;
use crate::entities::link::UsageLink;

/// Minor version of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartIteration {
    /// Iteration number, starting at 1
    pub iteration: u32,

    /// User currently editing this iteration, if checked out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_out_by: Option<String>,

    /// Outgoing usage links, in BOM order
    #[serde(default)]
    pub components: Vec<UsageLink>,

    /// CAD geometry files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometries: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PartIteration {
    pub fn new(iteration: u32) -> Self {
        Self {
            iteration,
            checked_out_by: None,
            components: Vec::new(),
            geometries: Vec::new(),
            attributes: BTreeMap::new(),
            note: None,
        }
    }

    pub fn with_link(mut self, link: UsageLink) -> Self {
        self.components.push(link);
        self
    }

    pub fn checked_out_by(mut self, user: impl Into<String>) -> Self {
        self.checked_out_by = Some(user.into());
        self
    }

    /// Leaf iterations have no outgoing links
    pub fn is_leaf(&self) -> bool {
        self.components.is_empty()
    }
}

/// Major version of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRevision {
    /// Version label (e.g., "A", "B")
    pub version: String,

    /// Conditions under which this revision is in effect
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effectivities: Vec<Effectivity>,

    #[serde(default)]
    pub iterations: Vec<PartIteration>,
}

impl PartRevision {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            effectivities: Vec::new(),
            iterations: Vec::new(),
        }
    }

    pub fn with_iteration(mut self, iteration: PartIteration) -> Self {
        self.iterations.push(iteration);
        self
    }

    pub fn with_effectivity(mut self, effectivity: Effectivity) -> Self {
        self.effectivities.push(effectivity);
        self
    }

    pub fn last_iteration(&self) -> Option<&PartIteration> {
        self.iterations.last()
    }

    pub fn iteration(&self, number: u32) -> Option<&PartIteration> {
        self.iterations.iter().find(|i| i.iteration == number)
    }
}

/// Part identity with its full version history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartMaster {
    /// Workspace and part number
    pub key: PartKey,

    /// Part name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Standard (catalog) parts such as fasteners
    #[serde(default)]
    pub standard_part: bool,

    /// Revisions in creation order
    #[serde(default)]
    pub revisions: Vec<PartRevision>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author name
    pub author: String,
}

impl PartMaster {
    /// Create a new part master with no revisions
    pub fn new(key: PartKey, name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            description: None,
            standard_part: false,
            revisions: Vec::new(),
            created: Utc::now(),
            author: author.into(),
        }
    }

    pub fn with_revision(mut self, revision: PartRevision) -> Self {
        self.revisions.push(revision);
        self
    }

    pub fn key(&self) -> &PartKey {
        &self.key
    }

    pub fn last_revision(&self) -> Option<&PartRevision> {
        self.revisions.last()
    }

    pub fn revision(&self, version: &str) -> Option<&PartRevision> {
        self.revisions.iter().find(|r| r.version == version)
    }

    /// Resolve a reference to one of this part's iterations
    pub fn iteration(&self, reference: &IterationRef) -> Option<&PartIteration> {
        if reference.part != self.key {
            return None;
        }
        self.revision(&reference.version)?
            .iteration(reference.iteration)
    }

    /// Reference to an iteration of one of this part's revisions
    pub fn iteration_ref(&self, revision: &PartRevision, iteration: &PartIteration) -> IterationRef {
        IterationRef::new(self.key.clone(), &revision.version, iteration.iteration)
    }
}

/// Stable reference to a part iteration: `workspace/number-VERSION.ITERATION`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IterationRef {
    pub part: PartKey,
    pub version: String,
    pub iteration: u32,
}

impl IterationRef {
    pub fn new(part: PartKey, version: impl Into<String>, iteration: u32) -> Self {
        Self {
            part,
            version: version.into(),
            iteration,
        }
    }
}

impl fmt::Display for IterationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}.{}", self.part, self.version, self.iteration)
    }
}
