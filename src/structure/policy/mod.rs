//! Configuration policies - which iterations and links are visible
//!
//! A policy answers two questions during a traversal:
//!
//! - [`ConfigurationPolicy::filter_iterations`]: which iterations of a part
//!   are visible
//! - [`ConfigurationPolicy::filter_links`]: which link (the original, a
//!   substitute, or none) stands for the usage at the end of a path
//!
//! Policies hold no per-traversal state. Every choice worth keeping as
//! provenance is recorded into the [`PolicyAudit`] the engine passes in.

pub mod baseline;
pub mod effectivity;
pub mod wip;

pub use baseline::BaselinePolicy;
pub use effectivity::EffectivityPolicy;
pub use wip::WorkInProgressPolicy;

use crate::entities::link::PartLink;
use crate::entities::part::{IterationRef, PartIteration, PartMaster};
use crate::structure::audit::PolicyAudit;

pub trait ConfigurationPolicy {
    /// Short name used in logs and baselines (e.g., "wip")
    fn name(&self) -> &'static str;

    /// Visible iterations of `part`, in revision order
    ///
    /// An empty result is the legitimate "nothing matches" answer.
    fn filter_iterations(&self, part: &PartMaster, audit: &mut PolicyAudit) -> Vec<IterationRef>;

    /// Eligible links for the usage at the tail of `path`
    fn filter_links(&self, path: &[PartLink], audit: &mut PolicyAudit) -> Vec<PartLink>;

    /// Whether `filter_links` looks at the tail link only
    ///
    /// When true, the engine probes the structure below each part beyond
    /// the depth budget once per traversal. Policies that inspect earlier
    /// links of the path must return false.
    fn links_depend_on_tail_only(&self) -> bool {
        true
    }
}

impl<T: ConfigurationPolicy + ?Sized> ConfigurationPolicy for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn filter_iterations(&self, part: &PartMaster, audit: &mut PolicyAudit) -> Vec<IterationRef> {
        (**self).filter_iterations(part, audit)
    }

    fn filter_links(&self, path: &[PartLink], audit: &mut PolicyAudit) -> Vec<PartLink> {
        (**self).filter_links(path, audit)
    }

    fn links_depend_on_tail_only(&self) -> bool {
        (**self).links_depend_on_tail_only()
    }
}

/// External authorization check: may `principal` read `iteration`?
pub trait AccessPredicate {
    fn can_access(&self, principal: &str, iteration: &PartIteration) -> bool;
}

impl<F> AccessPredicate for F
where
    F: Fn(&str, &PartIteration) -> bool,
{
    fn can_access(&self, principal: &str, iteration: &PartIteration) -> bool {
        self(principal, iteration)
    }
}

/// Grants access to every iteration
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AccessPredicate for AllowAll {
    fn can_access(&self, _principal: &str, _iteration: &PartIteration) -> bool {
        true
    }
}
