//! Product configuration - the choices an effectivity view applies to links

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::identity::EntityId;

/// Named set of optional-link and substitute-link choices
///
/// Loaded from a YAML file such as:
///
/// ```yaml
/// name: sport-pack
/// optional_links: [LNK-01...]
/// substitute_links: [LNK-01...]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfiguration {
    #[serde(default)]
    pub name: String,

    /// Optional usage links kept in this configuration
    #[serde(default)]
    pub optional_links: BTreeSet<EntityId>,

    /// Usage links that must be replaced by their substitute
    #[serde(default)]
    pub substitute_links: BTreeSet<EntityId>,
}

impl ProductConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn retain_optional(mut self, link_id: EntityId) -> Self {
        self.optional_links.insert(link_id);
        self
    }

    pub fn use_substitute(mut self, link_id: EntityId) -> Self {
        self.substitute_links.insert(link_id);
        self
    }

    pub fn is_optional_link_retained(&self, link_id: &EntityId) -> bool {
        self.optional_links.contains(link_id)
    }

    pub fn has_substitute_link(&self, link_id: &EntityId) -> bool {
        self.substitute_links.contains(link_id)
    }
}
