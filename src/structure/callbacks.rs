//! Callback protocol - hooks invoked while a structure is walked
//!
//! Callbacks run strictly in pre-order, never concurrently. They gate
//! descent ([`StructureCallbacks::on_path_walk`]), receive advisory
//! diagnostics, and receive leaves of the configured tree. Returning an
//! error from any hook aborts the traversal with that error.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::core::identity::PartKey;
use crate::entities::link::{path_to_string, PartLink};
use crate::entities::part::{IterationRef, PartMaster};
use crate::structure::error::StructureError;

pub trait StructureCallbacks {
    /// Called on entering a node; `false` prunes the node's children
    fn on_path_walk(
        &mut self,
        _path: &[PartLink],
        _parts: &[Arc<PartMaster>],
    ) -> Result<bool, StructureError> {
        Ok(true)
    }

    /// More than one iteration is visible; every candidate is explored
    fn on_indeterminate_version(
        &mut self,
        _part: &PartMaster,
        _candidates: &[IterationRef],
    ) -> Result<(), StructureError> {
        Ok(())
    }

    /// No iteration is visible
    fn on_unresolved_version(&mut self, _part: &PartMaster) -> Result<(), StructureError> {
        Ok(())
    }

    /// More than one link is eligible for a single usage
    fn on_indeterminate_path(
        &mut self,
        _path: &[PartLink],
        _eligible: &[PartLink],
    ) -> Result<(), StructureError> {
        Ok(())
    }

    /// A mandatory usage has no eligible link
    fn on_unresolved_path(&mut self, _path: &[PartLink]) -> Result<(), StructureError> {
        Ok(())
    }

    /// A single optional link was kept
    fn on_optional_path(
        &mut self,
        _path: &[PartLink],
        _chosen: &PartLink,
    ) -> Result<(), StructureError> {
        Ok(())
    }

    /// A leaf of the configured tree: an iteration with no outgoing links
    fn on_branch_discovered(
        &mut self,
        _path: &[PartLink],
        _iterations: &[IterationRef],
    ) -> Result<(), StructureError> {
        Ok(())
    }
}

impl<T: StructureCallbacks + ?Sized> StructureCallbacks for &mut T {
    fn on_path_walk(&mut self, path: &[PartLink], parts: &[Arc<PartMaster>]) -> Result<bool, StructureError> {
        (**self).on_path_walk(path, parts)
    }

    fn on_indeterminate_version(&mut self, part: &PartMaster, candidates: &[IterationRef]) -> Result<(), StructureError> {
        (**self).on_indeterminate_version(part, candidates)
    }

    fn on_unresolved_version(&mut self, part: &PartMaster) -> Result<(), StructureError> {
        (**self).on_unresolved_version(part)
    }

    fn on_indeterminate_path(&mut self, path: &[PartLink], eligible: &[PartLink]) -> Result<(), StructureError> {
        (**self).on_indeterminate_path(path, eligible)
    }

    fn on_unresolved_path(&mut self, path: &[PartLink]) -> Result<(), StructureError> {
        (**self).on_unresolved_path(path)
    }

    fn on_optional_path(&mut self, path: &[PartLink], chosen: &PartLink) -> Result<(), StructureError> {
        (**self).on_optional_path(path, chosen)
    }

    fn on_branch_discovered(&mut self, path: &[PartLink], iterations: &[IterationRef]) -> Result<(), StructureError> {
        (**self).on_branch_discovered(path, iterations)
    }
}

/// Callbacks that accept everything and record nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallbacks;

impl StructureCallbacks for NoopCallbacks {}

/// An advisory condition met during a traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureDiagnostic {
    IndeterminateVersion {
        part: PartKey,
        candidates: Vec<IterationRef>,
    },
    UnresolvedVersion {
        part: PartKey,
    },
    IndeterminatePath {
        path: String,
        eligible: Vec<PartKey>,
    },
    UnresolvedPath {
        path: String,
        part: PartKey,
    },
    OptionalPath {
        path: String,
        part: PartKey,
    },
}

impl fmt::Display for StructureDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureDiagnostic::IndeterminateVersion { part, candidates } => {
                let names: Vec<String> = candidates.iter().map(ToString::to_string).collect();
                write!(f, "{}: several iterations visible ({})", part, names.join(", "))
            }
            StructureDiagnostic::UnresolvedVersion { part } => {
                write!(f, "{}: no visible iteration", part)
            }
            StructureDiagnostic::IndeterminatePath { path, eligible } => {
                let names: Vec<String> = eligible.iter().map(ToString::to_string).collect();
                write!(f, "{}: several links eligible ({})", path, names.join(", "))
            }
            StructureDiagnostic::UnresolvedPath { path, part } => {
                write!(f, "{}: no eligible link to {}", path, part)
            }
            StructureDiagnostic::OptionalPath { path, part } => {
                write!(f, "{}: optional {} retained", path, part)
            }
        }
    }
}

/// A leaf reached by the traversal together with its iteration chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub path: String,
    pub iterations: Vec<IterationRef>,
}

/// Callbacks recording every diagnostic and branch, optionally refusing
/// to walk into denied parts
#[derive(Debug, Default, Clone)]
pub struct DiagnosticsCollector {
    pub diagnostics: Vec<StructureDiagnostic>,
    pub branches: Vec<Branch>,
    denied: BTreeSet<PartKey>,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reaching `key` aborts the traversal with a policy violation
    pub fn deny(mut self, key: PartKey) -> Self {
        self.denied.insert(key);
        self
    }

    /// No advisory diagnostics were recorded
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

fn tail_target(path: &[PartLink]) -> PartKey {
    path.last()
        .map(|link| link.target().clone())
        .unwrap_or_else(|| PartKey::new("", ""))
}

impl StructureCallbacks for DiagnosticsCollector {
    fn on_path_walk(&mut self, path: &[PartLink], parts: &[Arc<PartMaster>]) -> Result<bool, StructureError> {
        if let Some(part) = parts.last() {
            if self.denied.contains(&part.key) {
                return Err(StructureError::policy_violation(format!(
                    "{} may not appear in this structure ({})",
                    part.key,
                    path_to_string(path)
                )));
            }
        }
        Ok(true)
    }

    fn on_indeterminate_version(&mut self, part: &PartMaster, candidates: &[IterationRef]) -> Result<(), StructureError> {
        self.diagnostics.push(StructureDiagnostic::IndeterminateVersion {
            part: part.key.clone(),
            candidates: candidates.to_vec(),
        });
        Ok(())
    }

    fn on_unresolved_version(&mut self, part: &PartMaster) -> Result<(), StructureError> {
        self.diagnostics.push(StructureDiagnostic::UnresolvedVersion {
            part: part.key.clone(),
        });
        Ok(())
    }

    fn on_indeterminate_path(&mut self, path: &[PartLink], eligible: &[PartLink]) -> Result<(), StructureError> {
        self.diagnostics.push(StructureDiagnostic::IndeterminatePath {
            path: path_to_string(path),
            eligible: eligible.iter().map(|l| l.target().clone()).collect(),
        });
        Ok(())
    }

    fn on_unresolved_path(&mut self, path: &[PartLink]) -> Result<(), StructureError> {
        self.diagnostics.push(StructureDiagnostic::UnresolvedPath {
            path: path_to_string(path),
            part: tail_target(path),
        });
        Ok(())
    }

    fn on_optional_path(&mut self, path: &[PartLink], chosen: &PartLink) -> Result<(), StructureError> {
        self.diagnostics.push(StructureDiagnostic::OptionalPath {
            path: path_to_string(path),
            part: chosen.target().clone(),
        });
        Ok(())
    }

    fn on_branch_discovered(&mut self, path: &[PartLink], iterations: &[IterationRef]) -> Result<(), StructureError> {
        self.branches.push(Branch {
            path: path_to_string(path),
            iterations: iterations.to_vec(),
        });
        Ok(())
    }
}
