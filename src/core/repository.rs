//! Part repository - read-only lookup of part masters by identity

use miette::Result;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::core::identity::PartKey;
use crate::core::loader;
use crate::core::Project;
use crate::entities::part::PartMaster;

/// Resolves a part identity to its full revision/iteration/link data
///
/// Lookups are synchronous and assumed cheap (indexed or cached).
pub trait PartRepository {
    fn lookup(&self, key: &PartKey) -> Option<Arc<PartMaster>>;
}

impl<T: PartRepository + ?Sized> PartRepository for &T {
    fn lookup(&self, key: &PartKey) -> Option<Arc<PartMaster>> {
        (**self).lookup(key)
    }
}

impl<T: PartRepository + ?Sized> PartRepository for Arc<T> {
    fn lookup(&self, key: &PartKey) -> Option<Arc<PartMaster>> {
        (**self).lookup(key)
    }
}

/// Repository holding every part in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    parts: BTreeMap<PartKey, Arc<PartMaster>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a part, returning the previous one
    pub fn insert(&mut self, part: PartMaster) -> Option<Arc<PartMaster>> {
        self.parts.insert(part.key.clone(), Arc::new(part))
    }

    pub fn with_part(mut self, part: PartMaster) -> Self {
        self.insert(part);
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// All parts ordered by key
    pub fn parts(&self) -> impl Iterator<Item = &Arc<PartMaster>> {
        self.parts.values()
    }

    /// Load every part YAML file below `dir`
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut repository = Self::new();
        for part in loader::load_all::<PartMaster>(dir)? {
            if let Some(previous) = repository.insert(part) {
                tracing::warn!(part = %previous.key, "duplicate part definition, keeping the last one");
            }
        }
        tracing::debug!(parts = repository.len(), dir = %dir.display(), "loaded part repository");
        Ok(repository)
    }

    /// Load the parts of a project
    pub fn load_project(project: &Project) -> Result<Self> {
        Self::load_dir(&project.parts_dir())
    }
}

impl PartRepository for InMemoryRepository {
    fn lookup(&self, key: &PartKey) -> Option<Arc<PartMaster>> {
        self.parts.get(key).cloned()
    }
}
