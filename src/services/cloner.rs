//! Clone Orchestrator
//!
//! Copies a load balancer and everything it depends on from one namespace to
//! another. Dependencies are always created before their dependents:
//!
//! - sequentially (the default) by recursing into an object's dependencies
//!   right before sanitizing and creating it, or
//! - concurrently via a [`ClonePlan`] that is copied level by level.
//!
//! Dependencies already present at the destination are skipped, which makes
//! re-running a failed clone safe. The load balancer itself is never
//! existence-checked: a second run fails on its create instead of silently
//! reporting success.

use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, Instrument};

use super::certificate_verifier::CertificateVerifier;
use super::clone_plan::{ClonePlan, PlanNode};
use super::reference_extractor::ReferenceExtractor;
use super::sanitizer::Sanitizer;
use crate::domain::{CloneRequest, ConfigObject, Kind, ObjectKey, ObjectReference, TlsMode};
use crate::errors::Result;
use crate::store::ObjectStore;

/// Execution options for a clone run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneOptions {
    /// Maximum creates in flight; 1 selects the sequential traversal
    pub concurrency: usize,
    /// Sanitize everything but create nothing
    pub dry_run: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self { concurrency: 1, dry_run: false }
    }
}

/// What happened to one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyOutcome {
    Created,
    SkippedShared,
    SkippedExisting,
    /// Dry run: would have been created
    Planned,
}

/// One object visited during a run, identified by its source location
#[derive(Debug, Clone, Serialize)]
pub struct CopyRecord {
    #[serde(flatten)]
    pub key: ObjectKey,
    pub outcome: CopyOutcome,
    /// Sanitized body, kept for dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ConfigObject>,
}

impl CopyRecord {
    fn new(reference: &ObjectReference, outcome: CopyOutcome) -> Self {
        Self { key: reference.key(), outcome, body: None }
    }
}

/// Result of a clone run
#[derive(Debug, Clone, Serialize)]
pub struct CloneReport {
    pub load_balancer: String,
    pub source_namespace: String,
    pub destination_namespace: String,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_suffix: Option<u16>,
    /// Records in the order objects were settled; the load balancer is last
    pub records: Vec<CopyRecord>,
}

impl CloneReport {
    /// Records with the given outcome, in order
    pub fn with_outcome(&self, outcome: CopyOutcome) -> impl Iterator<Item = &CopyRecord> {
        self.records.iter().filter(move |record| record.outcome == outcome)
    }

    /// Names of the objects created (or planned, for dry runs), in order
    pub fn copied_names(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, CopyOutcome::Created | CopyOutcome::Planned))
            .map(|r| r.key.name.as_str())
            .collect()
    }
}

/// Per-identity guards for one run.
///
/// The existence check and create for an identity happen under its guard, and
/// the flag records that the identity was settled so a second path to it
/// only reports it as existing.
#[derive(Default)]
struct KeyLocks {
    slots: DashMap<ObjectKey, Arc<Mutex<bool>>>,
}

impl KeyLocks {
    fn slot(&self, key: ObjectKey) -> Arc<Mutex<bool>> {
        self.slots.entry(key).or_default().clone()
    }
}

/// State scoped to one clone run
struct RunContext<'a> {
    sanitizer: Sanitizer<'a>,
    locks: KeyLocks,
}

/// Drives fetch → sanitize → create for a load balancer and its dependencies
pub struct Cloner {
    store: Arc<dyn ObjectStore>,
    request: CloneRequest,
    options: CloneOptions,
}

impl Cloner {
    pub fn new(store: Arc<dyn ObjectStore>, request: CloneRequest) -> Self {
        Self { store, request, options: CloneOptions::default() }
    }

    pub fn with_options(mut self, options: CloneOptions) -> Self {
        self.options = options;
        self
    }

    /// Clone `load_balancer` from the request's source namespace.
    ///
    /// Aborts on the first failed fetch or create; objects created before the
    /// failure stay in place.
    pub async fn clone_load_balancer(&self, load_balancer: &str) -> Result<CloneReport> {
        self.request.validate()?;

        let span = crate::clone_span!(
            load_balancer,
            self.request.source_namespace,
            self.request.destination_namespace,
            dry_run = self.options.dry_run
        );
        self.run(load_balancer).instrument(span).await
    }

    async fn run(&self, load_balancer: &str) -> Result<CloneReport> {
        let source_namespace = self.request.source_namespace.as_str();
        let destination = self.request.destination_namespace.as_str();

        if let TlsMode::ManualCertificate { certificate, .. } = self.request.tls_mode() {
            CertificateVerifier::verify(self.store.as_ref(), certificate, destination).await?;
        }

        info!("Fetching load balancer");
        let root = self.store.fetch(Kind::LoadBalancer, source_namespace, load_balancer).await?;

        info!("Discovering dependencies");
        let owner_namespace = root.namespace().unwrap_or(source_namespace);
        let dependencies = ReferenceExtractor::extract(Kind::LoadBalancer, &root.spec, owner_namespace);
        info!(count = dependencies.len(), "Found direct dependencies");

        let ctx = RunContext { sanitizer: Sanitizer::new(&self.request), locks: KeyLocks::default() };

        let mut records = if self.options.concurrency > 1 {
            self.copy_planned(&ctx, dependencies).await?
        } else {
            let mut records = Vec::new();
            for dependency in dependencies {
                records.extend(self.copy_object(&ctx, dependency).await?);
            }
            records
        };

        info!("Copying load balancer");
        let root_reference = ObjectReference::new(Kind::LoadBalancer, load_balancer, source_namespace);
        records.push(self.create(&ctx, &root_reference, &root).await?);

        if self.options.dry_run {
            info!("Dry run complete; nothing was created");
        } else {
            info!("Load balancer copy complete");
        }

        Ok(CloneReport {
            load_balancer: load_balancer.to_string(),
            source_namespace: source_namespace.to_string(),
            destination_namespace: destination.to_string(),
            dry_run: self.options.dry_run,
            domain_suffix: ctx.sanitizer.domain_suffix(),
            records,
        })
    }

    /// Copy one dependency after copying its own dependencies.
    ///
    /// Skips shared objects and objects already present at the destination.
    fn copy_object<'a>(
        &'a self,
        ctx: &'a RunContext<'a>,
        reference: ObjectReference,
    ) -> BoxFuture<'a, Result<Vec<CopyRecord>>> {
        Box::pin(self.copy_object_with_dependencies(ctx, reference))
    }

    #[instrument(
        skip_all,
        level = "debug",
        fields(kind = %reference.kind, name = %reference.name, namespace = %reference.namespace)
    )]
    async fn copy_object_with_dependencies(
        &self,
        ctx: &RunContext<'_>,
        reference: ObjectReference,
    ) -> Result<Vec<CopyRecord>> {
        if reference.is_shared() {
            info!(object = %reference, "Skipping (in shared namespace)");
            return Ok(vec![CopyRecord::new(&reference, CopyOutcome::SkippedShared)]);
        }

        let slot = ctx.locks.slot(self.destination_key(&reference));
        let mut settled = slot.lock().await;
        if *settled {
            debug!(object = %reference, "Already settled in this run");
            return Ok(vec![CopyRecord::new(&reference, CopyOutcome::SkippedExisting)]);
        }

        if self.exists_at_destination(&reference).await? {
            *settled = true;
            return Ok(vec![CopyRecord::new(&reference, CopyOutcome::SkippedExisting)]);
        }

        info!(object = %reference, "Copying");
        let source = self.store.fetch(reference.kind, &reference.namespace, &reference.name).await?;

        let mut records = Vec::new();
        let owner_namespace = source.namespace().unwrap_or(&reference.namespace).to_string();
        for dependency in ReferenceExtractor::extract(reference.kind, &source.spec, &owner_namespace) {
            records.extend(self.copy_object(ctx, dependency).await?);
        }

        records.push(self.create(ctx, &reference, &source).await?);
        *settled = true;
        Ok(records)
    }

    /// Discover the whole graph, then copy it level by level with up to
    /// `concurrency` objects in flight per level
    async fn copy_planned(&self, ctx: &RunContext<'_>, dependencies: Vec<ObjectReference>) -> Result<Vec<CopyRecord>> {
        let concurrency = self.options.concurrency;
        let destination = self.request.destination_namespace.as_str();
        let plan = ClonePlan::discover(self.store.as_ref(), destination, dependencies, concurrency).await?;

        let mut records: Vec<CopyRecord> = plan
            .shared
            .iter()
            .map(|reference| {
                info!(object = %reference, "Skipping (in shared namespace)");
                CopyRecord::new(reference, CopyOutcome::SkippedShared)
            })
            .collect();
        records.extend(
            plan.existing.iter().map(|reference| CopyRecord::new(reference, CopyOutcome::SkippedExisting)),
        );

        for level in plan.copy_order() {
            let settled: Vec<CopyRecord> = stream::iter(level)
                .map(|node| self.copy_node(ctx, node))
                .buffer_unordered(concurrency)
                .try_collect()
                .await?;
            records.extend(settled);
        }

        Ok(records)
    }

    /// Copy one planned object; its dependencies were settled by earlier levels.
    ///
    /// Objects discovery already found missing are not looked up again.
    #[instrument(
        skip_all,
        level = "debug",
        fields(kind = %node.reference.kind, name = %node.reference.name, namespace = %node.reference.namespace)
    )]
    async fn copy_node(&self, ctx: &RunContext<'_>, node: PlanNode) -> Result<CopyRecord> {
        let PlanNode { reference, source, absent } = node;

        let slot = ctx.locks.slot(self.destination_key(&reference));
        let mut settled = slot.lock().await;
        if *settled {
            debug!(object = %reference, "Already settled in this run");
            return Ok(CopyRecord::new(&reference, CopyOutcome::SkippedExisting));
        }

        if !absent && self.exists_at_destination(&reference).await? {
            *settled = true;
            return Ok(CopyRecord::new(&reference, CopyOutcome::SkippedExisting));
        }

        info!(object = %reference, "Copying");
        let source = match source {
            Some(source) => source,
            None => self.store.fetch(reference.kind, &reference.namespace, &reference.name).await?,
        };

        let record = self.create(ctx, &reference, &source).await?;
        *settled = true;
        Ok(record)
    }

    /// Sanitize `source` and create it at the destination (or plan it)
    async fn create(&self, ctx: &RunContext<'_>, reference: &ObjectReference, source: &ConfigObject) -> Result<CopyRecord> {
        let destination = self.request.destination_namespace.as_str();
        let cleaned = ctx.sanitizer.sanitize(reference.kind, source);

        if self.options.dry_run {
            info!(object = %reference, "Would copy");
            return Ok(CopyRecord { key: reference.key(), outcome: CopyOutcome::Planned, body: Some(cleaned) });
        }

        self.store.create(reference.kind, destination, &cleaned).await?;
        info!(object = %reference, destination, "Copied");
        Ok(CopyRecord::new(reference, CopyOutcome::Created))
    }

    #[instrument(skip(self), level = "debug")]
    async fn exists_at_destination(&self, reference: &ObjectReference) -> Result<bool> {
        let destination = self.request.destination_namespace.as_str();
        let exists = self.store.exists(reference.kind, destination, &reference.name).await?;
        if exists {
            info!(object = %reference, destination, "Skipping (already exists)");
        }
        Ok(exists)
    }

    fn destination_key(&self, reference: &ObjectReference) -> ObjectKey {
        ObjectKey::new(reference.kind, reference.name.clone(), self.request.destination_namespace.clone())
    }
}
