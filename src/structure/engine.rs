//! Traversal engine - resolves a configured tree from a product structure
//!
//! The walk is depth-first and pre-order. At every node the policy picks the
//! visible iterations; every candidate is explored, so an ambiguous part
//! yields diverging branches rather than an arbitrary pick. For every usage
//! link of a candidate the policy then picks the eligible links, and each
//! eligible link is followed while the depth budget allows.
//!
//! Depth counts parts: the root is at depth 1, and a node at depth `d` is
//! expanded while `stop_depth` is `None` or `d <= stop_depth`. Below the
//! budget the structure is still probed for cycles, so a part using itself
//! is reported whatever the budget.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::identity::PartKey;
use crate::core::repository::PartRepository;
use crate::entities::link::PartLink;
use crate::entities::part::{IterationRef, PartIteration, PartMaster};
use crate::structure::audit::PolicyAudit;
use crate::structure::callbacks::StructureCallbacks;
use crate::structure::component::Component;
use crate::structure::error::StructureError;
use crate::structure::policy::ConfigurationPolicy;

/// Result of one traversal
#[derive(Debug, Clone)]
pub struct Resolution {
    pub root: Component,

    /// Choices the policy recorded during this traversal only
    pub audit: PolicyAudit,

    /// The traversal was cut short by a stop request
    pub stopped: bool,
}

/// Cooperative cancellation flag shared with an engine
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Walks product structures read from a repository
///
/// A stop request is permanent: once stopped, every later `visit` returns
/// a bare root. Use a new engine per traversal when stopping is needed.
pub struct TraversalEngine<R> {
    repository: R,
    stop: StopHandle,
}

/// Per-traversal state
struct Walk<'a, P: ?Sized, C: ?Sized> {
    policy: &'a P,
    callbacks: &'a mut C,
    stop_depth: Option<usize>,
    audit: PolicyAudit,
    /// Parts whose policy-selected substructure is known to be cycle free.
    /// Only filled for policies whose link choice ignores the path prefix.
    acyclic: HashSet<PartKey>,
    nodes: usize,
}

impl<R: PartRepository> TraversalEngine<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            stop: StopHandle::default(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Request the traversal to stop; already-built subtrees are kept
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Handle for stopping from a callback or another thread
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Resolve the structure below `root`
    pub fn visit<P, C>(
        &self,
        root: &PartKey,
        policy: &P,
        stop_depth: Option<usize>,
        callbacks: &mut C,
    ) -> Result<Resolution, StructureError>
    where
        P: ConfigurationPolicy + ?Sized,
        C: StructureCallbacks + ?Sized,
    {
        let part = self.fetch(root)?;
        let path = vec![PartLink::root(root.clone())];
        self.run(path, vec![part], policy, stop_depth, callbacks)
    }

    /// Resolve the structure below the target of the last link of
    /// `starting_path`; depth restarts at 1 for that target
    pub fn visit_path<P, C>(
        &self,
        starting_path: &[PartLink],
        policy: &P,
        stop_depth: Option<usize>,
        callbacks: &mut C,
    ) -> Result<Resolution, StructureError>
    where
        P: ConfigurationPolicy + ?Sized,
        C: StructureCallbacks + ?Sized,
    {
        if starting_path.is_empty() {
            return Err(StructureError::EmptyPath);
        }

        let mut parts: Vec<Arc<PartMaster>> = Vec::with_capacity(starting_path.len());
        for link in starting_path {
            let part = self.fetch(link.target())?;
            if parts.iter().any(|p| p.key == part.key) {
                return Err(StructureError::cycle(parts.iter().map(|p| &p.key), &part.key));
            }
            parts.push(part);
        }

        self.run(starting_path.to_vec(), parts, policy, stop_depth, callbacks)
    }

    fn run<P, C>(
        &self,
        path: Vec<PartLink>,
        mut parts: Vec<Arc<PartMaster>>,
        policy: &P,
        stop_depth: Option<usize>,
        callbacks: &mut C,
    ) -> Result<Resolution, StructureError>
    where
        P: ConfigurationPolicy + ?Sized,
        C: StructureCallbacks + ?Sized,
    {
        let mut walk = Walk {
            policy,
            callbacks,
            stop_depth,
            audit: PolicyAudit::new(),
            acyclic: HashSet::new(),
            nodes: 0,
        };
        let mut chain = Vec::new();

        let root = self.walk_node(&mut walk, path, &mut parts, &mut chain, 1)?;
        let stopped = self.is_stopped();

        tracing::info!(
            root = %root.key(),
            policy = policy.name(),
            nodes = walk.nodes,
            stopped,
            "structure resolved"
        );

        Ok(Resolution {
            root,
            audit: walk.audit,
            stopped,
        })
    }

    fn fetch(&self, key: &PartKey) -> Result<Arc<PartMaster>, StructureError> {
        self.repository
            .lookup(key)
            .ok_or_else(|| StructureError::PartNotFound(key.clone()))
    }

    /// Build the component for the last part of `parts`, reached via `path`
    fn walk_node<P, C>(
        &self,
        walk: &mut Walk<'_, P, C>,
        path: Vec<PartLink>,
        parts: &mut Vec<Arc<PartMaster>>,
        chain: &mut Vec<IterationRef>,
        depth: usize,
    ) -> Result<Component, StructureError>
    where
        P: ConfigurationPolicy + ?Sized,
        C: StructureCallbacks + ?Sized,
    {
        let Some(part) = parts.last().cloned() else {
            return Err(StructureError::EmptyPath);
        };
        walk.nodes += 1;

        if self.is_stopped() {
            return Ok(Component::new(part, path, None, Vec::new()));
        }

        tracing::debug!(part = %part.key, depth, "visiting");

        if !walk.callbacks.on_path_walk(&path, parts)? {
            tracing::trace!(part = %part.key, "pruned by callback");
            return Ok(Component::new(part, path, None, Vec::new()));
        }
        if self.is_stopped() {
            return Ok(Component::new(part, path, None, Vec::new()));
        }

        let candidates = walk.policy.filter_iterations(&part, &mut walk.audit);
        let retained = match candidates.len() {
            0 => {
                tracing::debug!(part = %part.key, "no visible iteration");
                walk.callbacks.on_unresolved_version(&part)?;
                None
            }
            1 => Some(candidates[0].clone()),
            n => {
                tracing::debug!(part = %part.key, candidates = n, "several visible iterations");
                walk.callbacks.on_indeterminate_version(&part, &candidates)?;
                None
            }
        };

        let mut children = Vec::new();
        for candidate in &candidates {
            if self.is_stopped() {
                break;
            }
            let iteration = part
                .iteration(candidate)
                .ok_or_else(|| StructureError::IterationNotFound(candidate.clone()))?;

            chain.push(candidate.clone());
            let expanded =
                self.walk_iteration(walk, &path, iteration, parts, chain, depth, &mut children);
            chain.pop();
            expanded?;
        }

        Ok(Component::new(part, path, retained, children))
    }

    /// Follow the usage links of one candidate iteration, appending the
    /// resulting subtrees to `children`
    #[allow(clippy::too_many_arguments)]
    fn walk_iteration<P, C>(
        &self,
        walk: &mut Walk<'_, P, C>,
        path: &[PartLink],
        iteration: &PartIteration,
        parts: &mut Vec<Arc<PartMaster>>,
        chain: &mut Vec<IterationRef>,
        depth: usize,
        children: &mut Vec<Component>,
    ) -> Result<(), StructureError>
    where
        P: ConfigurationPolicy + ?Sized,
        C: StructureCallbacks + ?Sized,
    {
        if iteration.is_leaf() {
            return walk.callbacks.on_branch_discovered(path, chain);
        }

        let expand = walk.stop_depth.map_or(true, |max| depth <= max);

        for usage in &iteration.components {
            if self.is_stopped() {
                break;
            }

            let mut extended = path.to_vec();
            extended.push(PartLink::Usage(usage.clone()));
            let eligible = walk.policy.filter_links(&extended, &mut walk.audit);

            match eligible.len() {
                0 if !usage.optional => {
                    tracing::debug!(link = %usage.id, target = %usage.component, "no eligible link");
                    walk.callbacks.on_unresolved_path(&extended)?;
                }
                1 if eligible[0].is_optional() => {
                    walk.callbacks.on_optional_path(&extended, &eligible[0])?;
                }
                n if n > 1 => {
                    tracing::debug!(link = %usage.id, eligible = n, "several eligible links");
                    walk.callbacks.on_indeterminate_path(&extended, &eligible)?;
                }
                _ => {}
            }

            for chosen in eligible {
                if self.is_stopped() {
                    break;
                }

                let mut child_path = path.to_vec();
                child_path.push(chosen);

                if !expand {
                    let mut ancestors: Vec<PartKey> = parts.iter().map(|p| p.key.clone()).collect();
                    self.probe_cycle(walk, &mut child_path, &mut ancestors)?;
                    continue;
                }

                let target = match child_path.last() {
                    Some(link) => self.fetch(link.target())?,
                    None => continue,
                };
                if parts.iter().any(|p| p.key == target.key) {
                    return Err(StructureError::cycle(parts.iter().map(|p| &p.key), &target.key));
                }

                parts.push(target);
                let child = self.walk_node(walk, child_path, parts, chain, depth + 1);
                parts.pop();
                children.push(child?);
            }
        }

        Ok(())
    }

    /// Search the policy-selected structure below the tail of `path` for a
    /// part already in `ancestors`, without building components or firing
    /// callbacks. Parts missing from the repository end the probe quietly.
    fn probe_cycle<P, C>(
        &self,
        walk: &mut Walk<'_, P, C>,
        path: &mut Vec<PartLink>,
        ancestors: &mut Vec<PartKey>,
    ) -> Result<(), StructureError>
    where
        P: ConfigurationPolicy + ?Sized,
        C: StructureCallbacks + ?Sized,
    {
        let Some(key) = path.last().map(|l| l.target().clone()) else {
            return Ok(());
        };
        if ancestors.contains(&key) {
            return Err(StructureError::cycle(ancestors.iter(), &key));
        }
        if walk.acyclic.contains(&key) || self.is_stopped() {
            return Ok(());
        }
        let Some(part) = self.repository.lookup(&key) else {
            return Ok(());
        };

        // probing choices are not provenance
        let mut scratch = PolicyAudit::new();
        ancestors.push(key.clone());

        for candidate in walk.policy.filter_iterations(&part, &mut scratch) {
            let Some(iteration) = part.iteration(&candidate) else {
                continue;
            };
            for usage in &iteration.components {
                path.push(PartLink::Usage(usage.clone()));
                let eligible = walk.policy.filter_links(path, &mut scratch);
                path.pop();

                for chosen in eligible {
                    path.push(chosen);
                    let probed = self.probe_cycle(walk, path, ancestors);
                    path.pop();
                    probed?;
                }
            }
        }

        ancestors.pop();
        if walk.policy.links_depend_on_tail_only() {
            walk.acyclic.insert(key);
        }
        Ok(())
    }
}
