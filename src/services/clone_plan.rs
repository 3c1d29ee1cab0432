//! Two-phase clone scheduling
//!
//! Discovery walks the whole dependency graph below a load balancer before
//! anything is created and groups the copyable objects by depth. Copying then
//! runs level by level, deepest first, so health checks land before the pools
//! that use them and every dependency lands before the load balancer. Objects
//! inside one level are independent of each other and can be created
//! concurrently.
//!
//! Direct dependencies already present at the destination are set aside
//! without fetching them, so nothing below an existing pool is scheduled.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use tracing::{debug, info};

use super::reference_extractor::ReferenceExtractor;
use crate::domain::{ConfigObject, Kind, ObjectKey, ObjectReference};
use crate::errors::{CloneError, Result};
use crate::store::ObjectStore;

/// One object to copy, with its source body when discovery already fetched it
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub reference: ObjectReference,
    pub source: Option<ConfigObject>,
    /// Discovery found no object with this name at the destination
    pub absent: bool,
}

impl PlanNode {
    fn unchecked(reference: ObjectReference) -> Self {
        Self { reference, source: None, absent: false }
    }
}

/// Dependencies of one load balancer, grouped by depth
#[derive(Debug, Clone, Default)]
pub struct ClonePlan {
    /// `levels[0]` holds direct dependencies of the load balancer,
    /// `levels[1]` their dependencies
    pub levels: Vec<Vec<PlanNode>>,
    /// Shared references encountered, in discovery order; never copied
    pub shared: Vec<ObjectReference>,
    /// Direct dependencies already present at the destination
    pub existing: Vec<ObjectReference>,
}

enum Discovered {
    Existing(ObjectReference),
    Missing(PlanNode),
}

impl ClonePlan {
    /// Discover every dependency reachable from `root_dependencies`.
    ///
    /// Each direct dependency is looked up in `destination` first. Missing
    /// origin pools are then fetched (up to `concurrency` at a time) to find
    /// their health checks. Each identity appears at most once in the plan.
    pub async fn discover(
        store: &dyn ObjectStore,
        destination: &str,
        root_dependencies: Vec<ObjectReference>,
        concurrency: usize,
    ) -> Result<Self> {
        let mut plan = ClonePlan::default();
        let mut seen = HashSet::new();

        let direct = plan.admit(&mut seen, root_dependencies);

        let discovered: Vec<Discovered> = stream::iter(direct)
            .map(|reference| async move {
                if store.exists(reference.kind, destination, &reference.name).await? {
                    info!(object = %reference, destination, "Skipping (already exists)");
                    return Ok(Discovered::Existing(reference));
                }
                let source = match reference.kind {
                    Kind::OriginPool => {
                        Some(store.fetch(reference.kind, &reference.namespace, &reference.name).await?)
                    }
                    _ => None,
                };
                Ok::<_, CloneError>(Discovered::Missing(PlanNode { reference, source, absent: true }))
            })
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        let mut missing = Vec::new();
        for entry in discovered {
            match entry {
                Discovered::Existing(reference) => plan.existing.push(reference),
                Discovered::Missing(node) => missing.push(node),
            }
        }

        let mut nested = Vec::new();
        for node in &missing {
            if let Some(source) = &node.source {
                let owner_namespace = source.namespace().unwrap_or(&node.reference.namespace);
                nested.extend(ReferenceExtractor::extract(node.reference.kind, &source.spec, owner_namespace));
            }
        }
        let nested = plan.admit(&mut seen, nested);

        plan.levels.push(missing);
        if !nested.is_empty() {
            plan.levels.push(nested.into_iter().map(PlanNode::unchecked).collect());
        }

        info!(
            objects = plan.len(),
            existing = plan.existing.len(),
            shared = plan.shared.len(),
            depth = plan.levels.len(),
            "Dependency discovery complete"
        );
        Ok(plan)
    }

    /// Split off shared references and drop identities already planned
    fn admit(&mut self, seen: &mut HashSet<ObjectKey>, references: Vec<ObjectReference>) -> Vec<ObjectReference> {
        let mut admitted = Vec::new();
        for reference in references {
            if reference.is_shared() {
                debug!(dependency = %reference, "Shared dependency will not be copied");
                if !self.shared.contains(&reference) {
                    self.shared.push(reference);
                }
                continue;
            }
            if seen.insert(reference.key()) {
                admitted.push(reference);
            }
        }
        admitted
    }

    /// Number of objects to copy
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Levels in copy order: deepest first
    pub fn copy_order(self) -> impl Iterator<Item = Vec<PlanNode>> {
        self.levels.into_iter().rev()
    }
}
