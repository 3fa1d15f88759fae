//! Plan-countable resource model shared by the entitlement engine and the
//! feature slices that own the actual records.

use crate::constants::UNLIMITED;
use serde::{Deserialize, Serialize};

/// Kinds of resources a subscription plan puts a ceiling on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    VCard,
    Project,
    Pixel,
    CustomDomain,
}

impl ResourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VCard => "vcard",
            Self::Project => "project",
            Self::Pixel => "pixel",
            Self::CustomDomain => "custom_domain",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything the entitlement engine can rank. Ordering between two resources of
/// an owner is by `created_at` ascending, then `id` ascending as a tiebreaker.
pub trait Resource {
    fn id(&self) -> &str;
    fn owner_id(&self) -> &str;
    /// Creation instant as unix milliseconds.
    fn created_at(&self) -> i64;
}

/// A minimal owned resource handle, for callers that only track identity and age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInstance {
    pub id: String,
    pub owner_id: String,
    pub created_at: i64,
}

impl Resource for ResourceInstance {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

/// The ceiling a plan grants for one resource kind. `max == -1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimit {
    pub kind: ResourceKind,
    pub max: i64,
}

impl PlanLimit {
    #[must_use]
    pub const fn new(kind: ResourceKind, max: i64) -> Self {
        Self { kind, max }
    }

    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.max == UNLIMITED
    }
}

/// A point-in-time view of usage against a plan ceiling. All gating decisions
/// for one request are made against a single snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitSnapshot {
    pub current: u64,
    pub limit: PlanLimit,
}

impl LimitSnapshot {
    #[must_use]
    pub const fn new(current: u64, limit: PlanLimit) -> Self {
        Self { current, limit }
    }
}

/// The engine's verdict for one resource: retained resources keep working,
/// disabled ones are frozen until the owner upgrades or deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementDecision {
    pub resource_id: String,
    pub is_disabled: bool,
}
