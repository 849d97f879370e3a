//! Effectivity view: revisions in effect for a date, serial number or lot

use crate::entities::configuration::ProductConfiguration;
use crate::entities::effectivity::EffectivityContext;
use crate::entities::link::PartLink;
use crate::entities::part::{IterationRef, PartMaster};
use crate::structure::audit::PolicyAudit;
use crate::structure::policy::ConfigurationPolicy;

/// Selects revisions whose effectivities hold for `context`, and applies the
/// optional/substitute choices of an optional product configuration
#[derive(Debug, Clone, Default)]
pub struct EffectivityPolicy {
    context: EffectivityContext,
    configuration: Option<ProductConfiguration>,
}

impl EffectivityPolicy {
    pub fn new(context: EffectivityContext) -> Self {
        Self {
            context,
            configuration: None,
        }
    }

    pub fn with_configuration(mut self, configuration: ProductConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn context(&self) -> &EffectivityContext {
        &self.context
    }

    pub fn configuration(&self) -> Option<&ProductConfiguration> {
        self.configuration.as_ref()
    }
}

impl ConfigurationPolicy for EffectivityPolicy {
    fn name(&self) -> &'static str {
        "effectivity"
    }

    /// One candidate per effective revision: that revision's last iteration
    fn filter_iterations(&self, part: &PartMaster, audit: &mut PolicyAudit) -> Vec<IterationRef> {
        let mut candidates = Vec::new();

        for revision in &part.revisions {
            let effective = revision
                .effectivities
                .iter()
                .any(|e| e.is_effective(&self.context));
            if !effective {
                continue;
            }
            if let Some(iteration) = revision.last_iteration() {
                let reference = part.iteration_ref(revision, iteration);
                audit.record_iteration(reference.clone());
                candidates.push(reference);
            }
        }

        candidates
    }

    fn filter_links(&self, path: &[PartLink], audit: &mut PolicyAudit) -> Vec<PartLink> {
        let Some(link) = path.last() else {
            return Vec::new();
        };

        if !link.is_optional() {
            return vec![link.clone()];
        }

        let (Some(configuration), Some(id)) = (&self.configuration, link.id()) else {
            return Vec::new();
        };

        if !configuration.is_optional_link_retained(id) {
            return Vec::new();
        }
        audit.record_optional_link(id.clone());

        // With or without an explicit override the first substitute wins
        if let Some(substitute) = link.substitutes().first() {
            if configuration.has_substitute_link(id) {
                tracing::trace!(link = %id, substitute = %substitute.id, "substitute override");
            }
            audit.record_substitute_link(substitute.id.clone());
            return vec![PartLink::Substitute(substitute.clone())];
        }

        vec![link.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::PartKey;
    use crate::entities::effectivity::{Effectivity, ItemUnit};
    use crate::entities::link::{SubstituteLink, UsageLink};
    use crate::entities::part::{PartIteration, PartRevision};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn from(y: i32) -> Effectivity {
        Effectivity::Date {
            start: Some(date(y, 1, 1)),
            end: None,
        }
    }

    fn until(y: i32) -> Effectivity {
        Effectivity::Date {
            start: None,
            end: Some(date(y, 12, 31)),
        }
    }

    fn engine() -> PartMaster {
        PartMaster::new(PartKey::new("acme", "ENGINE"), "Engine", "alice")
            .with_revision(
                PartRevision::new("A")
                    .with_effectivity(until(2023))
                    .with_iteration(PartIteration::new(1))
                    .with_iteration(PartIteration::new(2)),
            )
            .with_revision(
                PartRevision::new("B")
                    .with_effectivity(from(2023))
                    .with_iteration(PartIteration::new(1)),
            )
            .with_revision(PartRevision::new("C").with_iteration(PartIteration::new(1)))
    }

    fn at(y: i32, m: u32, d: u32) -> EffectivityPolicy {
        EffectivityPolicy::new(EffectivityContext::at_date(date(y, m, d)))
    }

    #[test]
    fn test_no_effective_revision() {
        let part = engine();
        let policy = EffectivityPolicy::new(EffectivityContext::for_serial(ItemUnit::new("CAR", "1")));
        assert!(policy
            .filter_iterations(&part, &mut PolicyAudit::new())
            .is_empty());
    }

    #[test]
    fn test_single_effective_revision_uses_last_iteration() {
        let part = engine();
        let mut audit = PolicyAudit::new();
        let result = at(2021, 6, 1).filter_iterations(&part, &mut audit);
        assert_eq!(result, vec![IterationRef::new(part.key.clone(), "A", 2)]);
        assert_eq!(audit.retained_iterations.len(), 1);
    }

    #[test]
    fn test_overlapping_revisions_both_returned() {
        let part = engine();
        let result = at(2023, 6, 1).filter_iterations(&part, &mut PolicyAudit::new());
        assert_eq!(
            result,
            vec![
                IterationRef::new(part.key.clone(), "A", 2),
                IterationRef::new(part.key.clone(), "B", 1),
            ]
        );
    }

    #[test]
    fn test_several_effectivities_on_one_revision_count_once() {
        let part = PartMaster::new(PartKey::new("acme", "ENGINE"), "Engine", "alice").with_revision(
            PartRevision::new("A")
                .with_effectivity(from(2020))
                .with_effectivity(from(2021))
                .with_iteration(PartIteration::new(1)),
        );
        let result = at(2022, 1, 1).filter_iterations(&part, &mut PolicyAudit::new());
        assert_eq!(result.len(), 1);
    }

    fn car_path(link: UsageLink) -> Vec<PartLink> {
        vec![PartLink::root(PartKey::new("acme", "CAR")), link.into()]
    }

    #[test]
    fn test_mandatory_link_unchanged() {
        let link = UsageLink::new(PartKey::new("acme", "WHEEL"))
            .with_substitute(SubstituteLink::new(PartKey::new("acme", "WHEEL-ALT")));
        let path = car_path(link);
        let mut audit = PolicyAudit::new();
        let result = at(2024, 1, 1).filter_links(&path, &mut audit);
        assert_eq!(result, vec![path[1].clone()]);
        assert!(audit.is_empty());
    }

    #[test]
    fn test_optional_link_without_configuration_dropped() {
        let path = car_path(UsageLink::new(PartKey::new("acme", "ROOF")).optional());
        assert!(at(2024, 1, 1)
            .filter_links(&path, &mut PolicyAudit::new())
            .is_empty());
    }

    #[test]
    fn test_optional_link_not_retained_dropped() {
        let path = car_path(UsageLink::new(PartKey::new("acme", "ROOF")).optional());
        let policy = at(2024, 1, 1).with_configuration(ProductConfiguration::new("base"));
        assert!(policy
            .filter_links(&path, &mut PolicyAudit::new())
            .is_empty());
    }

    #[test]
    fn test_optional_link_retained_without_substitutes() {
        let link = UsageLink::new(PartKey::new("acme", "ROOF")).optional();
        let id = link.id.clone();
        let path = car_path(link);
        let policy = at(2024, 1, 1)
            .with_configuration(ProductConfiguration::new("sport").retain_optional(id.clone()));

        let mut audit = PolicyAudit::new();
        let result = policy.filter_links(&path, &mut audit);
        assert_eq!(result, vec![path[1].clone()]);
        assert!(audit.retained_optional_links.contains(&id));
        assert!(audit.retained_substitute_links.is_empty());
    }

    #[test]
    fn test_optional_link_retained_with_override_returns_first_substitute() {
        let first = SubstituteLink::new(PartKey::new("acme", "ROOF-GLASS"));
        let second = SubstituteLink::new(PartKey::new("acme", "ROOF-CANVAS"));
        let link = UsageLink::new(PartKey::new("acme", "ROOF"))
            .optional()
            .with_substitute(first.clone())
            .with_substitute(second);
        let id = link.id.clone();
        let path = car_path(link);
        let policy = at(2024, 1, 1).with_configuration(
            ProductConfiguration::new("sport")
                .retain_optional(id.clone())
                .use_substitute(id),
        );

        let mut audit = PolicyAudit::new();
        let result = policy.filter_links(&path, &mut audit);
        assert_eq!(result, vec![PartLink::Substitute(first.clone())]);
        assert_ne!(result[0], path[1]);
        assert!(audit.retained_substitute_links.contains(&first.id));
    }

    #[test]
    fn test_filter_links_does_not_mutate_input() {
        let link = UsageLink::new(PartKey::new("acme", "ROOF"))
            .optional()
            .with_substitute(SubstituteLink::new(PartKey::new("acme", "ROOF-GLASS")));
        let id = link.id.clone();
        let path = car_path(link);
        let before = path.clone();
        let policy = at(2024, 1, 1)
            .with_configuration(ProductConfiguration::new("sport").retain_optional(id));

        let first = policy.filter_links(&path, &mut PolicyAudit::new());
        let second = policy.filter_links(&path, &mut PolicyAudit::new());
        assert_eq!(path, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_path() {
        assert!(at(2024, 1, 1)
            .filter_links(&[], &mut PolicyAudit::new())
            .is_empty());
    }
}
