//! # Custom Domains
//!
//! Lets owners publish their vCards under their own domain names. A domain is
//! registered, proven via a DNS challenge (CNAME to the platform target or a
//! TXT record with a one-time token), and activated. Every mutating operation
//! except deletion is gated by the owner's plan entitlement.
//!
//! ## Architecture
//!
//! * [`record`]: the persisted `CustomDomain` shape and its status enum.
//! * [`repository`]: SurrealDB persistence, owner-scoped.
//! * [`dns`]: the resolver seam and its production implementation.
//! * [`verifier`]: the state machine; the only writer of `status`.
//! * [`coordinator`]: entitlement gating in front of the verifier.
//! * [`api`]: the HTTP surface consumed by the frontend.

pub mod api;
pub mod coordinator;
pub mod dns;
mod error;
pub mod record;
pub mod repository;
pub mod verifier;

use crate::coordinator::DomainLifecycleCoordinator;
use crate::dns::HickoryProbe;
use crate::repository::CustomDomainRepository;
use crate::verifier::{DomainVerifier, SystemTokenSource};
pub use error::{DomainError, DomainErrorExt};
use std::sync::Arc;
use std::time::Duration;
use vhub_database::Database;
use vhub_domain::config::ApiConfig;
use vhub_domain::registry::InitializedSlice;
use vhub_entitlement::engine::Policy;
use vhub_entitlement::provider::{ConfigPlanLimits, EntitlementService};

/// Custom domains feature inner state.
#[vhub_derive::vhub_slice]
pub struct Domains {
    pub coordinator: DomainLifecycleCoordinator,
}

/// Initialize the custom domains feature.
///
/// # Errors
/// Currently infallible; kept fallible for parity with other slices.
pub fn init(db: Database, config: &ApiConfig) -> Result<InitializedSlice, DomainError> {
    let repo = CustomDomainRepository::new(db);
    let probe = Arc::new(HickoryProbe::new(Duration::from_millis(config.domains.dns_timeout_ms)));
    let verifier = DomainVerifier::new(
        repo.clone(),
        probe,
        Arc::new(SystemTokenSource),
        config.domains.cname_target.clone(),
    );

    // Domains grandfather the oldest instance; see the entitlement engine.
    let entitlement = EntitlementService::new(
        Arc::new(ConfigPlanLimits::new(config.plans.clone())),
        Policy::Grandfathered,
    );

    let coordinator = DomainLifecycleCoordinator::new(repo, verifier, entitlement);

    tracing::info!(cname_target = %config.domains.cname_target, "Domains slice initialized");

    let slice = Domains::new(DomainsInner { coordinator });
    Ok(InitializedSlice::new(slice))
}
