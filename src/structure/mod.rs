//! Structure module - configured traversal of product structures
//!
//! - [`TraversalEngine`] walks a part's usage links depth-first
//! - [`ConfigurationPolicy`] decides which iterations and links are visible
//! - [`StructureCallbacks`] observes the walk and may prune or abort it
//! - [`Component`] is a node of the resulting tree
//! - [`PolicyAudit`] records the choices made, for baselining

pub mod audit;
pub mod callbacks;
pub mod component;
pub mod engine;
pub mod error;
pub mod policy;

pub use audit::PolicyAudit;
pub use callbacks::{Branch, DiagnosticsCollector, NoopCallbacks, StructureCallbacks, StructureDiagnostic};
pub use component::{Component, RollupLine};
pub use engine::{Resolution, StopHandle, TraversalEngine};
pub use error::StructureError;
pub use policy::{
    AccessPredicate, AllowAll, BaselinePolicy, ConfigurationPolicy, EffectivityPolicy,
    WorkInProgressPolicy,
};
