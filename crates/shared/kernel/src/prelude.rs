//! Convenience re-exports for slice crates.

pub use crate::safe_nanoid;
pub use crate::security::resource::ResourceGuard;
pub use vhub_domain::config::ApiConfig;
pub use vhub_domain::model::{
    EntitlementDecision, LimitSnapshot, PlanLimit, Resource, ResourceInstance, ResourceKind,
};
pub use vhub_domain::registry::{FeatureSlice, InitializedSlice};

#[cfg(feature = "server")]
pub use crate::server::state::ApiState;
