//! Entitlement gating for every domain operation.
//!
//! The coordinator is the only entry point the API layer talks to. It decides,
//! per call, whether the owner's plan still covers the domain being touched,
//! and only then lets the verifier act. Deletion is the one ungated operation:
//! owners can always remove excess resources.

use crate::error::DomainError;
use crate::record::CustomDomain;
use crate::repository::CustomDomainRepository;
use crate::verifier::{DomainVerifier, VerifyOutcome};
use tracing::debug;
use vhub_domain::model::ResourceKind;
use vhub_entitlement::engine;
use vhub_entitlement::provider::{EntitlementService, fits};

/// A domain plus its entitlement flag for one snapshot. The flag is never
/// persisted; it is recomputed on every read.
#[derive(Debug, Clone)]
pub struct AnnotatedDomain {
    pub domain: CustomDomain,
    pub is_disabled: bool,
}

#[derive(Debug, Clone)]
pub struct DomainLifecycleCoordinator {
    repo: CustomDomainRepository,
    verifier: DomainVerifier,
    entitlement: EntitlementService,
}

impl DomainLifecycleCoordinator {
    #[must_use]
    pub const fn new(
        repo: CustomDomainRepository,
        verifier: DomainVerifier,
        entitlement: EntitlementService,
    ) -> Self {
        Self { repo, verifier, entitlement }
    }

    /// All of the owner's domains, oldest first, annotated against one limit
    /// snapshot. Both the list and the limit are read once so every flag in
    /// the response is judged against the same ceiling.
    ///
    /// # Errors
    /// Database or provider failures.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<AnnotatedDomain>, DomainError> {
        Ok(self.annotated_list(owner_id).await?.0)
    }

    /// Registers a new domain if the plan has room for one more.
    ///
    /// The ceiling check and the insert are separate statements; two racing
    /// creates can overshoot the ceiling by one. The overshoot is transient:
    /// the next classification disables the youngest extra domain.
    ///
    /// # Errors
    /// [`DomainError::PlanLimitExceeded`] when the ceiling is reached, plus
    /// everything [`DomainVerifier::create`] can return.
    pub async fn create(
        &self,
        owner_id: &str,
        domain: &str,
        landing_url: String,
        not_found_url: String,
        linked_vcard_id: Option<String>,
    ) -> Result<CustomDomain, DomainError> {
        let snapshot = self
            .entitlement
            .snapshot(&self.repo, owner_id, ResourceKind::CustomDomain)
            .await?;

        if !fits(&snapshot, self.entitlement.policy()) {
            return Err(DomainError::PlanLimitExceeded {
                message: format!(
                    "Plan allows {} custom domains, {} already registered",
                    snapshot.limit.max, snapshot.current
                )
                .into(),
                context: None,
            });
        }

        self.verifier.create(owner_id, domain, landing_url, not_found_url, linked_vcard_id).await
    }

    /// Runs the DNS challenge for one domain, unless entitlement says the
    /// domain is disabled under the current plan. The gate fires before any
    /// DNS I/O: a disabled domain fails fast even when its records are
    /// perfectly correct.
    ///
    /// # Errors
    /// [`DomainError::NotFound`], [`DomainError::PlanLimitExceeded`], plus
    /// everything [`DomainVerifier::verify`] can return.
    pub async fn verify(&self, owner_id: &str, id: &str) -> Result<VerifyOutcome, DomainError> {
        let annotated = self.gated_fetch(owner_id, id, "verify").await?;
        self.verifier.verify(&annotated.domain).await
    }

    /// Edits a domain's owner-facing settings, under the same gate as verify.
    ///
    /// # Errors
    /// [`DomainError::NotFound`], [`DomainError::PlanLimitExceeded`],
    /// database failures.
    pub async fn update(
        &self,
        owner_id: &str,
        id: &str,
        landing_url: Option<String>,
        not_found_url: Option<String>,
        linked_vcard_id: Option<Option<String>>,
    ) -> Result<CustomDomain, DomainError> {
        let annotated = self.gated_fetch(owner_id, id, "update").await?;
        let mut domain = annotated.domain;

        if let Some(landing_url) = landing_url {
            domain.landing_url = landing_url;
        }
        if let Some(not_found_url) = not_found_url {
            domain.not_found_url = not_found_url;
        }
        if let Some(linked_vcard_id) = linked_vcard_id {
            domain.linked_vcard_id = linked_vcard_id;
        }

        self.repo
            .update_settings(
                &domain.id,
                domain.landing_url.clone(),
                domain.not_found_url.clone(),
                domain.linked_vcard_id.clone(),
            )
            .await?;

        Ok(domain)
    }

    /// Deletes a domain. Never gated: an owner over their limit must be able
    /// to trim their own resources.
    ///
    /// # Errors
    /// [`DomainError::NotFound`], database failures.
    pub async fn delete(&self, owner_id: &str, id: &str) -> Result<(), DomainError> {
        let domain = self.fetch(owner_id, id).await?;
        self.verifier.delete(&domain).await
    }

    async fn fetch(&self, owner_id: &str, id: &str) -> Result<CustomDomain, DomainError> {
        self.repo.get(owner_id, id).await?.ok_or_else(|| DomainError::NotFound {
            message: format!("Custom domain '{id}' not found").into(),
            context: None,
        })
    }

    /// Fetches one domain together with its entitlement flag, and refuses the
    /// operation when the flag is set.
    async fn gated_fetch(
        &self,
        owner_id: &str,
        id: &str,
        operation: &'static str,
    ) -> Result<AnnotatedDomain, DomainError> {
        let (annotated, limit) = self.annotated_list(owner_id).await?;

        let Some(entry) = annotated.into_iter().find(|entry| entry.domain.id == id) else {
            return Err(DomainError::NotFound {
                message: format!("Custom domain '{id}' not found").into(),
                context: None,
            });
        };

        if entry.is_disabled {
            debug!(owner = %owner_id, %id, operation, "Entitlement gate refused operation");
            return Err(DomainError::PlanLimitExceeded {
                message: format!(
                    "Domain '{}' is disabled under the current plan (limit {limit})",
                    entry.domain.domain
                )
                .into(),
                context: None,
            });
        }

        Ok(entry)
    }

    /// One snapshot: the limit is read once, the list is read once, and the
    /// whole list is classified in a single pass.
    async fn annotated_list(
        &self,
        owner_id: &str,
    ) -> Result<(Vec<AnnotatedDomain>, i64), DomainError> {
        let limit =
            self.entitlement.plan_limit(owner_id, ResourceKind::CustomDomain).await?;
        let domains = self.repo.list_for_owner(owner_id).await?;

        let annotated = engine::annotate(domains, limit.max, self.entitlement.policy())
            .into_iter()
            .map(|(domain, is_disabled)| AnnotatedDomain { domain, is_disabled })
            .collect();

        Ok((annotated, limit.max))
    }
}
