//! Data-access seams for the entitlement engine.
//!
//! The engine itself is pure; these traits are how it learns about an owner's
//! plan ceiling and current usage. Feature slices that own countable records
//! implement [`ResourceCounter`] and [`ResourceCatalog`] on their repositories.

use crate::engine::{self, Policy};
use crate::error::EntitlementError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;
use vhub_domain::config::PlansConfig;
use vhub_domain::model::{
    EntitlementDecision, LimitSnapshot, PlanLimit, ResourceInstance, ResourceKind,
};

/// Source of plan ceilings per owner and resource kind.
#[async_trait]
pub trait PlanLimitProvider: Debug + Send + Sync {
    async fn limit(
        &self,
        owner_id: &str,
        kind: ResourceKind,
    ) -> Result<PlanLimit, EntitlementError>;
}

/// Counts an owner's live resources of one kind.
#[async_trait]
pub trait ResourceCounter: Debug + Send + Sync {
    async fn count(&self, owner_id: &str, kind: ResourceKind) -> Result<u64, EntitlementError>;
}

/// Lists an owner's resources of one kind, in canonical order.
#[async_trait]
pub trait ResourceCatalog: Debug + Send + Sync {
    async fn list(
        &self,
        owner_id: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceInstance>, EntitlementError>;
}

/// [`PlanLimitProvider`] backed by static configuration.
///
/// Billing and plan assignment live outside this service; the deployment's
/// config carries one ceiling per resource kind that applies to every owner.
#[derive(Debug, Clone)]
pub struct ConfigPlanLimits {
    plans: PlansConfig,
}

impl ConfigPlanLimits {
    #[must_use]
    pub const fn new(plans: PlansConfig) -> Self {
        Self { plans }
    }
}

#[async_trait]
impl PlanLimitProvider for ConfigPlanLimits {
    async fn limit(
        &self,
        _owner_id: &str,
        kind: ResourceKind,
    ) -> Result<PlanLimit, EntitlementError> {
        let max = match kind {
            ResourceKind::VCard => self.plans.limits.vcards,
            ResourceKind::Project => self.plans.limits.projects,
            ResourceKind::Pixel => self.plans.limits.pixels,
            ResourceKind::CustomDomain => self.plans.limits.custom_domains,
        };
        Ok(PlanLimit::new(kind, max))
    }
}

/// Facade tying limits, usage, and the pure engine together.
#[derive(Debug, Clone)]
pub struct EntitlementService {
    limits: Arc<dyn PlanLimitProvider>,
    policy: Policy,
}

impl EntitlementService {
    #[must_use]
    pub fn new(limits: Arc<dyn PlanLimitProvider>, policy: Policy) -> Self {
        Self { limits, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> Policy {
        self.policy
    }

    /// The plan ceiling for one kind, without touching usage.
    ///
    /// # Errors
    /// Returns an error if the limit provider fails.
    pub async fn plan_limit(
        &self,
        owner_id: &str,
        kind: ResourceKind,
    ) -> Result<PlanLimit, EntitlementError> {
        self.limits.limit(owner_id, kind).await
    }

    /// A consistent view of usage against the ceiling, taken once per request.
    ///
    /// # Errors
    /// Returns an error if the limit or usage provider fails.
    pub async fn snapshot(
        &self,
        counter: &dyn ResourceCounter,
        owner_id: &str,
        kind: ResourceKind,
    ) -> Result<LimitSnapshot, EntitlementError> {
        let limit = self.limits.limit(owner_id, kind).await?;
        let current = counter.count(owner_id, kind).await?;

        debug!(owner = %owner_id, kind = %kind, current, max = limit.max, "Entitlement snapshot");

        Ok(LimitSnapshot::new(current, limit))
    }

    /// Whether one more resource of this kind fits under the ceiling.
    ///
    /// # Errors
    /// Returns an error if the limit or usage provider fails.
    pub async fn can_add(
        &self,
        counter: &dyn ResourceCounter,
        owner_id: &str,
        kind: ResourceKind,
    ) -> Result<bool, EntitlementError> {
        let snapshot = self.snapshot(counter, owner_id, kind).await?;
        Ok(fits(&snapshot, self.policy))
    }

    /// Classifies every resource of the kind the owner has, oldest first.
    ///
    /// # Errors
    /// Returns an error if the limit provider or the catalog fails.
    pub async fn classify_all(
        &self,
        catalog: &dyn ResourceCatalog,
        owner_id: &str,
        kind: ResourceKind,
    ) -> Result<Vec<EntitlementDecision>, EntitlementError> {
        let limit = self.limits.limit(owner_id, kind).await?;
        let mut resources = catalog.list(owner_id, kind).await?;
        engine::sort_canonical(&mut resources);

        Ok(engine::classify(&resources, limit.max, self.policy))
    }
}

/// Whether a snapshot leaves room for one more resource under the policy.
#[must_use]
pub fn fits(snapshot: &LimitSnapshot, policy: Policy) -> bool {
    policy.effective_cap(snapshot.limit.max).is_none_or(|cap| snapshot.current < cap)
}
