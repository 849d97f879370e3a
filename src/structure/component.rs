//! Component - a node of a resolved product structure
//!
//! Components are built by the traversal engine and never mutated after the
//! tree is returned, so the type only exposes read accessors.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::identity::PartKey;
use crate::entities::link::{path_to_string, PartLink};
use crate::entities::part::{IterationRef, PartIteration, PartMaster};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    #[serde(rename = "part", serialize_with = "serialize_part")]
    part: Arc<PartMaster>,

    link: PartLink,

    #[serde(serialize_with = "serialize_path")]
    path: Vec<PartLink>,

    #[serde(skip_serializing_if = "Option::is_none")]
    retained_iteration: Option<IterationRef>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<Component>,
}

fn serialize_part<S: Serializer>(part: &Arc<PartMaster>, serializer: S) -> Result<S::Ok, S::Error> {
    part.key.serialize(serializer)
}

fn serialize_path<S: Serializer>(path: &[PartLink], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path_to_string(path))
}

impl Component {
    pub(crate) fn new(
        part: Arc<PartMaster>,
        path: Vec<PartLink>,
        retained_iteration: Option<IterationRef>,
        components: Vec<Component>,
    ) -> Self {
        let link = path
            .last()
            .cloned()
            .unwrap_or_else(|| PartLink::root(part.key.clone()));
        Self {
            part,
            link,
            path,
            retained_iteration,
            components,
        }
    }

    /// The link this component was reached through
    pub fn link(&self) -> &PartLink {
        &self.link
    }

    pub fn part(&self) -> &PartMaster {
        &self.part
    }

    pub fn key(&self) -> &PartKey {
        &self.part.key
    }

    /// Links from the traversal root down to this component
    pub fn path(&self) -> &[PartLink] {
        &self.path
    }

    pub fn path_string(&self) -> String {
        path_to_string(&self.path)
    }

    /// The single iteration selected for this node, if exactly one was
    pub fn retained_iteration(&self) -> Option<&IterationRef> {
        self.retained_iteration.as_ref()
    }

    /// Resolved data of the retained iteration
    pub fn retained(&self) -> Option<&PartIteration> {
        self.retained_iteration
            .as_ref()
            .and_then(|r| self.part.iteration(r))
    }

    /// Children in source order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn is_leaf(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of links on the path from the traversal's first link
    ///
    /// A root reached through `visit` has depth 1. A root resumed by
    /// `visit_path` has the length of the starting path.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Pre-order iterator over this component and its descendants
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Component> {
        self.iter().filter(|c| c.is_leaf())
    }

    /// Every occurrence of a part in this subtree
    pub fn find(&self, key: &PartKey) -> Vec<&Component> {
        self.iter().filter(|c| c.key() == key).collect()
    }

    /// Amount of this component per one unit of the traversal root
    pub fn quantity(&self) -> f64 {
        self.path.iter().map(PartLink::amount).product()
    }

    /// Total quantity of every part below this component, by part and unit
    pub fn rollup(&self) -> Vec<RollupLine> {
        let mut lines: BTreeMap<(PartKey, Option<String>), RollupLine> = BTreeMap::new();
        let base = self.quantity();

        for component in self.iter().skip(1) {
            let unit = component.link.unit().map(str::to_string);
            let quantity = if base == 0.0 {
                0.0
            } else {
                component.quantity() / base
            };
            let line = lines
                .entry((component.key().clone(), unit.clone()))
                .or_insert_with(|| RollupLine {
                    part: component.key().clone(),
                    name: component.part.name.clone(),
                    quantity: 0.0,
                    unit,
                    occurrences: 0,
                });
            line.quantity += quantity;
            line.occurrences += 1;
        }

        lines.into_values().collect()
    }
}

/// Pre-order component iterator
pub struct Iter<'a> {
    stack: Vec<&'a Component>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Component;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.components.iter().rev());
        Some(next)
    }
}

/// One line of a quantity rollup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupLine {
    pub part: PartKey,
    pub name: String,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Number of tree nodes contributing to the quantity
    pub occurrences: usize,
}
