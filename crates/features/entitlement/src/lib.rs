//! # Plan Entitlement
//!
//! This crate decides which of an owner's resources remain usable under their
//! subscription plan. Downgrades are non-destructive: resources over the
//! ceiling are disabled, never deleted, and the oldest resources always win.
//!
//! ## Architecture
//!
//! 1. **Engine ([`engine`]):** pure classification over an ordered resource
//!    list. No I/O, trivially testable.
//! 2. **Providers ([`provider`]):** seams through which other slices expose
//!    their counts and records, plus the config-backed plan limit source.

pub mod engine;
mod error;
pub mod provider;

pub use crate::error::{EntitlementError, EntitlementErrorExt};
use crate::engine::Policy;
use crate::provider::{ConfigPlanLimits, EntitlementService};
use std::sync::Arc;
use vhub_kernel::domain::config::PlansConfig;
use vhub_kernel::domain::registry::InitializedSlice;

/// Entitlement feature inner state.
#[vhub_derive::vhub_slice]
pub struct Entitlement {
    pub service: EntitlementService,
}

/// Initialize the entitlement feature.
///
/// # Errors
/// Currently infallible; kept fallible for parity with other slices.
pub fn init(plans: PlansConfig) -> Result<InitializedSlice, EntitlementError> {
    let service = EntitlementService::new(Arc::new(ConfigPlanLimits::new(plans)), Policy::Standard);

    tracing::info!("Entitlement slice initialized");

    let slice = Entitlement::new(EntitlementInner { service });
    Ok(InitializedSlice::new(slice))
}
