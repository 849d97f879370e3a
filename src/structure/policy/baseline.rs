//! Baseline view: replays the choices frozen in a [`Baseline`]

use crate::entities::baseline::Baseline;
use crate::entities::link::PartLink;
use crate::entities::part::{IterationRef, PartMaster};
use crate::structure::audit::PolicyAudit;
use crate::structure::policy::ConfigurationPolicy;

#[derive(Debug, Clone)]
pub struct BaselinePolicy {
    baseline: Baseline,
}

impl BaselinePolicy {
    pub fn new(baseline: Baseline) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }
}

impl ConfigurationPolicy for BaselinePolicy {
    fn name(&self) -> &'static str {
        "baseline"
    }

    /// Frozen iterations of the part; parts added after the baseline was
    /// taken are unresolved
    fn filter_iterations(&self, part: &PartMaster, audit: &mut PolicyAudit) -> Vec<IterationRef> {
        let candidates: Vec<IterationRef> = self.baseline.iterations_of(&part.key).cloned().collect();
        for candidate in &candidates {
            audit.record_iteration(candidate.clone());
        }
        candidates
    }

    fn filter_links(&self, path: &[PartLink], audit: &mut PolicyAudit) -> Vec<PartLink> {
        let Some(link) = path.last() else {
            return Vec::new();
        };

        if link.is_optional() {
            match link.id() {
                Some(id) if self.baseline.optional_links.contains(id) => {
                    audit.record_optional_link(id.clone());
                }
                _ => return Vec::new(),
            }
        }

        let frozen_substitute = link
            .substitutes()
            .iter()
            .find(|s| self.baseline.substitute_links.contains(&s.id));
        if let Some(substitute) = frozen_substitute {
            audit.record_substitute_link(substitute.id.clone());
            return vec![PartLink::Substitute(substitute.clone())];
        }

        vec![link.clone()]
    }
}
