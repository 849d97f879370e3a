//! Integration tests for configured structure resolution
//!
//! These tests drive the traversal engine through the public API with each
//! policy, over repositories built in memory or loaded from a project.

use chrono::NaiveDate;
use tempfile::TempDir;

use tps::core::loader;
use tps::core::{InMemoryRepository, PartKey, Project, Role, TeamMember, TeamRoster};
use tps::entities::{
    Baseline, Effectivity, EffectivityContext, ItemUnit, IterationRef, PartIteration, PartLink,
    PartMaster, PartRevision, ProductConfiguration, SubstituteLink, UsageLink,
};
use tps::structure::{
    AllowAll, BaselinePolicy, Component, ConfigurationPolicy, DiagnosticsCollector,
    EffectivityPolicy, NoopCallbacks, PolicyAudit, StructureDiagnostic, StructureError,
    TraversalEngine, WorkInProgressPolicy,
};

fn key(number: &str) -> PartKey {
    PartKey::new("acme", number)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn leaf(number: &str) -> PartMaster {
    PartMaster::new(key(number), number, "alice")
        .with_revision(PartRevision::new("A").with_iteration(PartIteration::new(1)))
}

fn assembly(number: &str, links: Vec<UsageLink>) -> PartMaster {
    let mut iteration = PartIteration::new(1);
    iteration.components = links;
    PartMaster::new(key(number), number, "alice")
        .with_revision(PartRevision::new("A").with_iteration(iteration))
}

fn numbers(root: &Component) -> Vec<String> {
    root.iter().map(|c| c.key().number().to_string()).collect()
}

fn wip() -> WorkInProgressPolicy<AllowAll> {
    WorkInProgressPolicy::new("alice", AllowAll)
}

/// Five levels: L1 -> L2 -> L3 -> L4 -> L5, each level also using a leaf
fn ladder() -> InMemoryRepository {
    let mut repository = InMemoryRepository::new();
    for level in 1..=4 {
        repository.insert(assembly(
            &format!("L{}", level),
            vec![
                UsageLink::new(key(&format!("L{}", level + 1))),
                UsageLink::new(key(&format!("BOLT{}", level))),
            ],
        ));
        repository.insert(leaf(&format!("BOLT{}", level)));
    }
    repository.insert(leaf("L5"));
    repository
}

// ============================================================================
// Depth and cycles
// ============================================================================

#[test]
fn test_path_length_bounded_by_stop_depth() {
    let repository = ladder();
    let engine = TraversalEngine::new(&repository);

    for depth in 0..6 {
        let root = engine
            .visit(&key("L1"), &wip(), Some(depth), &mut NoopCallbacks)
            .unwrap()
            .root;
        let deepest = root.iter().map(|c| c.path().len()).max().unwrap();
        assert!(deepest <= depth + 1, "depth {}: deepest path {}", depth, deepest);
        assert_eq!(deepest, (depth + 1).min(5).max(1));
    }

    let unbounded = engine
        .visit(&key("L1"), &wip(), None, &mut NoopCallbacks)
        .unwrap()
        .root;
    assert_eq!(unbounded.size(), 9);
}

#[test]
fn test_cycle_deep_below_budget_is_reported() {
    let mut repository = ladder();
    repository.insert(assembly("L5", vec![UsageLink::new(key("L2"))]));
    let engine = TraversalEngine::new(&repository);

    for depth in [None, Some(0), Some(1), Some(3), Some(10)] {
        let err = engine
            .visit(&key("L1"), &wip(), depth, &mut NoopCallbacks)
            .unwrap_err();
        assert!(err.is_cycle(), "depth {:?}: {:?}", depth, err);
    }
}

#[test]
fn test_cycle_only_through_unselected_revision_is_ignored() {
    // the old revision of B used A; the current one does not
    let mut old = PartIteration::new(1);
    old.components = vec![UsageLink::new(key("A"))];
    let b = PartMaster::new(key("B"), "B", "alice")
        .with_revision(PartRevision::new("A").with_iteration(old))
        .with_revision(PartRevision::new("B").with_iteration(PartIteration::new(1)));
    let repository = InMemoryRepository::new()
        .with_part(assembly("A", vec![UsageLink::new(key("B"))]))
        .with_part(b);

    let engine = TraversalEngine::new(&repository);
    let root = engine
        .visit(&key("A"), &wip(), None, &mut NoopCallbacks)
        .unwrap()
        .root;
    assert_eq!(numbers(&root), vec!["A", "B"]);
}

// ============================================================================
// Effectivity
// ============================================================================

/// CAR (serial-effective) -> ENGINE (date-effective revisions), optional ROOF
fn effectivity_repository() -> (InMemoryRepository, UsageLink) {
    let roof = UsageLink::new(key("ROOF"))
        .optional()
        .with_substitute(SubstituteLink::new(key("ROOF-GLASS")));

    let mut car_iteration = PartIteration::new(1);
    car_iteration.components = vec![UsageLink::new(key("ENGINE")), roof.clone()];
    let car = PartMaster::new(key("CAR"), "Car", "alice").with_revision(
        PartRevision::new("A")
            .with_effectivity(Effectivity::Serial {
                configuration_item: "CAR".into(),
                start: "1".into(),
                end: Some("100".into()),
            })
            .with_effectivity(Effectivity::Date {
                start: None,
                end: None,
            })
            .with_iteration(car_iteration),
    );

    let engine = PartMaster::new(key("ENGINE"), "Engine", "alice")
        .with_revision(
            PartRevision::new("A")
                .with_effectivity(Effectivity::Date {
                    start: None,
                    end: Some(date(2023, 12, 31)),
                })
                .with_iteration(PartIteration::new(1)),
        )
        .with_revision(
            PartRevision::new("B")
                .with_effectivity(Effectivity::Date {
                    start: Some(date(2024, 1, 1)),
                    end: None,
                })
                .with_iteration(PartIteration::new(1))
                .with_iteration(PartIteration::new(2)),
        );

    let always = |number: &str| {
        PartMaster::new(key(number), number, "alice").with_revision(
            PartRevision::new("A")
                .with_effectivity(Effectivity::Date {
                    start: None,
                    end: None,
                })
                .with_iteration(PartIteration::new(1)),
        )
    };

    let repository = InMemoryRepository::new()
        .with_part(car)
        .with_part(engine)
        .with_part(always("ROOF"))
        .with_part(always("ROOF-GLASS"));
    (repository, roof)
}

#[test]
fn test_effectivity_date_selects_revision() {
    let (repository, _) = effectivity_repository();
    let engine = TraversalEngine::new(&repository);

    let policy = EffectivityPolicy::new(EffectivityContext::at_date(date(2023, 6, 1)));
    let root = engine
        .visit(&key("CAR"), &policy, None, &mut NoopCallbacks)
        .unwrap()
        .root;
    let version = root.components()[0].retained_iteration().unwrap();
    assert_eq!((version.version.as_str(), version.iteration), ("A", 1));

    let policy = EffectivityPolicy::new(EffectivityContext::at_date(date(2024, 6, 1)));
    let root = engine
        .visit(&key("CAR"), &policy, None, &mut NoopCallbacks)
        .unwrap()
        .root;
    let version = root.components()[0].retained_iteration().unwrap();
    assert_eq!((version.version.as_str(), version.iteration), ("B", 2));
}

#[test]
fn test_overlapping_effective_revisions_explored_as_branches() {
    let dated = |start, end| Effectivity::Date {
        start: Some(start),
        end,
    };
    let mut first = PartIteration::new(1);
    first.components = vec![UsageLink::new(key("SHAFT-A"))];
    let mut second = PartIteration::new(1);
    second.components = vec![UsageLink::new(key("SHAFT-B"))];

    let gearbox = PartMaster::new(key("GEARBOX"), "Gearbox", "alice")
        .with_revision(
            PartRevision::new("A")
                .with_effectivity(dated(date(2024, 1, 1), Some(date(2024, 12, 31))))
                .with_iteration(first),
        )
        .with_revision(
            PartRevision::new("B")
                .with_effectivity(dated(date(2024, 6, 1), None))
                .with_iteration(second),
        );
    let effective = |number: &str| {
        PartMaster::new(key(number), number, "alice").with_revision(
            PartRevision::new("A")
                .with_effectivity(dated(date(2020, 1, 1), None))
                .with_iteration(PartIteration::new(1)),
        )
    };
    let repository = InMemoryRepository::new()
        .with_part(gearbox)
        .with_part(effective("SHAFT-A"))
        .with_part(effective("SHAFT-B"));

    let engine = TraversalEngine::new(&repository);
    let policy = EffectivityPolicy::new(EffectivityContext::at_date(date(2024, 8, 1)));
    let mut collector = DiagnosticsCollector::new();
    let root = engine
        .visit(&key("GEARBOX"), &policy, None, &mut collector)
        .unwrap()
        .root;

    assert!(root.retained_iteration().is_none());
    assert_eq!(numbers(&root), vec!["GEARBOX", "SHAFT-A", "SHAFT-B"]);
    assert_eq!(
        collector.diagnostics,
        vec![StructureDiagnostic::IndeterminateVersion {
            part: key("GEARBOX"),
            candidates: vec![
                IterationRef::new(key("GEARBOX"), "A", 1),
                IterationRef::new(key("GEARBOX"), "B", 1),
            ],
        }]
    );
    let chains: Vec<(&str, &str)> = collector
        .branches
        .iter()
        .map(|b| (b.iterations[0].version.as_str(), b.iterations[1].part.number()))
        .collect();
    assert_eq!(chains, vec![("A", "SHAFT-A"), ("B", "SHAFT-B")]);

    // outside the overlap only one revision is in effect
    let policy = EffectivityPolicy::new(EffectivityContext::at_date(date(2024, 3, 1)));
    let root = engine
        .visit(&key("GEARBOX"), &policy, None, &mut NoopCallbacks)
        .unwrap()
        .root;
    assert_eq!(root.retained_iteration().map(|r| r.version.as_str()), Some("A"));
    assert_eq!(numbers(&root), vec!["GEARBOX", "SHAFT-A"]);
}

#[test]
fn test_effectivity_serial_without_date_leaves_engine_unresolved() {
    let (repository, _) = effectivity_repository();
    let engine = TraversalEngine::new(&repository);
    let policy = EffectivityPolicy::new(EffectivityContext::for_serial(ItemUnit::new("CAR", "42")));
    let mut collector = DiagnosticsCollector::new();

    let root = engine
        .visit(&key("CAR"), &policy, None, &mut collector)
        .unwrap()
        .root;

    assert!(root.retained_iteration().is_some());
    assert!(root.components()[0].retained_iteration().is_none());
    assert!(collector
        .diagnostics
        .contains(&StructureDiagnostic::UnresolvedVersion { part: key("ENGINE") }));
}

#[test]
fn test_optional_link_dropped_without_configuration() {
    let (repository, _) = effectivity_repository();
    let engine = TraversalEngine::new(&repository);
    let policy = EffectivityPolicy::new(EffectivityContext::at_date(date(2024, 6, 1)));
    let mut collector = DiagnosticsCollector::new();

    let root = engine
        .visit(&key("CAR"), &policy, None, &mut collector)
        .unwrap()
        .root;

    assert_eq!(numbers(&root), vec!["CAR", "ENGINE"]);
    // dropping an optional link is not worth a diagnostic
    assert!(collector.is_clean());
}

#[test]
fn test_configuration_swaps_in_substitute() {
    let (repository, roof) = effectivity_repository();
    let engine = TraversalEngine::new(&repository);
    let configuration = ProductConfiguration::new("glass-roof")
        .retain_optional(roof.id.clone())
        .use_substitute(roof.id.clone());
    let policy = EffectivityPolicy::new(EffectivityContext::at_date(date(2024, 6, 1)))
        .with_configuration(configuration);

    let resolution = engine
        .visit(&key("CAR"), &policy, None, &mut NoopCallbacks)
        .unwrap();

    assert_eq!(numbers(&resolution.root), vec!["CAR", "ENGINE", "ROOF-GLASS"]);
    assert!(matches!(
        resolution.root.components()[1].link(),
        PartLink::Substitute(_)
    ));
    assert!(resolution.audit.retained_optional_links.contains(&roof.id));
    assert_eq!(resolution.audit.retained_substitute_links.len(), 1);
}

// ============================================================================
// Baselines
// ============================================================================

#[test]
fn test_baseline_replays_resolution() {
    let (repository, roof) = effectivity_repository();
    let engine = TraversalEngine::new(&repository);
    let policy = EffectivityPolicy::new(EffectivityContext::at_date(date(2024, 6, 1)))
        .with_configuration(ProductConfiguration::new("sport").retain_optional(roof.id.clone()));

    let original = engine
        .visit(&key("CAR"), &policy, None, &mut NoopCallbacks)
        .unwrap();
    let baseline = Baseline::from_audit("v1", key("CAR"), "effectivity", "alice", original.audit.clone());

    let replayed = engine
        .visit(&key("CAR"), &BaselinePolicy::new(baseline), None, &mut NoopCallbacks)
        .unwrap();

    assert_eq!(replayed.root, original.root);
    assert_eq!(replayed.audit, original.audit);
}

#[test]
fn test_baseline_ignores_later_iterations() {
    let (mut repository, _) = effectivity_repository();
    let engine_policy = EffectivityPolicy::new(EffectivityContext::at_date(date(2024, 6, 1)));
    let original = TraversalEngine::new(&repository)
        .visit(&key("CAR"), &engine_policy, None, &mut NoopCallbacks)
        .unwrap();
    let baseline = Baseline::from_audit("v1", key("CAR"), "effectivity", "alice", original.audit);

    // a third iteration of ENGINE-B appears after the baseline was taken
    let mut engine = PartMaster::clone(repository.parts().find(|p| p.key == key("ENGINE")).unwrap());
    engine.revisions[1].iterations.push(PartIteration::new(3));
    repository.insert(engine);

    let replayed = TraversalEngine::new(&repository)
        .visit(&key("CAR"), &BaselinePolicy::new(baseline), None, &mut NoopCallbacks)
        .unwrap();
    let version = replayed.root.components()[0].retained_iteration().unwrap();
    assert_eq!(version.iteration, 2);
}

#[test]
fn test_sharded_audits_merge_into_full_audit() {
    let repository = ladder();
    let engine = TraversalEngine::new(&repository);
    let full = engine
        .visit(&key("L1"), &wip(), None, &mut NoopCallbacks)
        .unwrap();

    let mut merged = PolicyAudit::new();
    merged.record_iteration(full.root.retained_iteration().unwrap().clone());
    for child in full.root.components() {
        let shard = engine
            .visit_path(child.path(), &wip(), None, &mut NoopCallbacks)
            .unwrap();
        assert_eq!(&shard.root, child);
        merged.merge(shard.audit);
    }

    assert_eq!(merged, full.audit);
}

// ============================================================================
// Access and callbacks
// ============================================================================

#[test]
fn test_team_roster_hides_checked_out_iterations() {
    let mut roster = TeamRoster::default();
    roster.add_member(TeamMember::new("Alice", "alice", vec![Role::Engineering]));
    roster.add_member(TeamMember::new("Bob", "bob", vec![Role::Engineering]));
    roster.add_member(TeamMember::new("Carol", "carol", vec![Role::Admin]));

    let mut wheel = leaf("WHEEL");
    wheel.revisions[0].iterations[0].checked_out_by = Some("alice".into());
    let repository = InMemoryRepository::new()
        .with_part(assembly("CAR", vec![UsageLink::new(key("WHEEL"))]))
        .with_part(wheel);
    let engine = TraversalEngine::new(&repository);

    for (principal, visible) in [("alice", true), ("bob", false), ("carol", true), ("mallory", false)] {
        let policy = WorkInProgressPolicy::new(principal, roster.clone());
        let mut collector = DiagnosticsCollector::new();
        let root = engine
            .visit(&key("CAR"), &policy, None, &mut collector)
            .unwrap()
            .root;
        assert_eq!(
            root.components()[0].retained_iteration().is_some(),
            visible,
            "principal {}",
            principal
        );
        assert_eq!(collector.is_clean(), visible, "principal {}", principal);
    }
}

#[test]
fn test_unresolved_path_for_mandatory_link_dropped_by_policy() {
    struct DropAll;
    impl ConfigurationPolicy for DropAll {
        fn name(&self) -> &'static str {
            "drop-all"
        }
        fn filter_iterations(&self, part: &PartMaster, audit: &mut PolicyAudit) -> Vec<IterationRef> {
            wip().filter_iterations(part, audit)
        }
        fn filter_links(&self, _path: &[PartLink], _audit: &mut PolicyAudit) -> Vec<PartLink> {
            Vec::new()
        }
    }

    let repository = InMemoryRepository::new()
        .with_part(assembly(
            "CAR",
            vec![UsageLink::new(key("WHEEL")), UsageLink::new(key("ROOF")).optional()],
        ))
        .with_part(leaf("WHEEL"))
        .with_part(leaf("ROOF"));
    let mut collector = DiagnosticsCollector::new();
    let root = TraversalEngine::new(&repository)
        .visit(&key("CAR"), &DropAll, None, &mut collector)
        .unwrap()
        .root;

    assert_eq!(root.size(), 1);
    assert_eq!(collector.diagnostics.len(), 1);
    assert!(matches!(
        &collector.diagnostics[0],
        StructureDiagnostic::UnresolvedPath { part, .. } if *part == key("WHEEL")
    ));
    // CAR has links, so it is not a leaf
    assert!(collector.branches.is_empty());
}

#[test]
fn test_denied_part_aborts_with_policy_violation() {
    let repository = ladder();
    let mut collector = DiagnosticsCollector::new().deny(key("L4"));
    let err = TraversalEngine::new(&repository)
        .visit(&key("L1"), &wip(), None, &mut collector)
        .unwrap_err();
    assert!(matches!(err, StructureError::PolicyViolation(_)));
}

// ============================================================================
// Project-backed repository
// ============================================================================

#[test]
fn test_repository_loaded_from_project_files() {
    let tmp = TempDir::new().unwrap();
    let project = Project::init(tmp.path()).unwrap();
    for part in [
        assembly("CAR", vec![UsageLink::new(key("WHEEL")).with_amount(4.0, None)]),
        leaf("WHEEL"),
    ] {
        loader::save_entity(&project.part_path(&part.key), &part).unwrap();
    }

    let repository = InMemoryRepository::load_project(&project).unwrap();
    assert_eq!(repository.len(), 2);

    let root = TraversalEngine::new(repository)
        .visit(&key("CAR"), &wip(), None, &mut NoopCallbacks)
        .unwrap()
        .root;
    let rollup = root.rollup();
    assert_eq!(rollup.len(), 1);
    assert_eq!(rollup[0].quantity, 4.0);
}
