//! The custom domain state machine and its DNS challenge.
//!
//! Ownership of a domain is proven by publishing either a CNAME record that
//! points at the platform's `cname_target`, or a TXT record equal to the
//! domain's `verification_token`. The verifier checks both mechanisms and
//! accepts whichever matches.
//!
//! Transitions:
//!
//! ```text
//! pending ── verify ok ──> active
//! pending ── verify mismatch ──> failed
//! failed  ── verify ok ──> active        (recovery after the owner fixes DNS)
//! active  ── verify ──> active           (idempotent no-op)
//! blocked ── verify ──> refused          (terminal, no DNS I/O)
//! ```
//!
//! A transient DNS failure never changes state; the caller retries.

use crate::dns::DnsProbe;
use crate::error::DomainError;
use crate::record::{CustomDomain, DomainStatus};
use crate::repository::CustomDomainRepository;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use vhub_kernel::safe_nanoid;

/// Source of verification tokens, swappable for deterministic tests.
pub trait TokenSource: Debug + Send + Sync {
    /// A fresh 64-hex-character token.
    ///
    /// # Errors
    /// Returns an error when the entropy source is unavailable.
    fn issue(&self) -> Result<String, DomainError>;
}

/// Production token source: 32 bytes from the OS CSPRNG, hex-encoded.
#[derive(Debug, Default)]
pub struct SystemTokenSource;

impl TokenSource for SystemTokenSource {
    fn issue(&self) -> Result<String, DomainError> {
        let mut bytes = [0_u8; 32];
        getrandom::fill(&mut bytes).map_err(|e| DomainError::Internal {
            message: format!("CSPRNG unavailable: {e}").into(),
            context: Some("Issuing verification token".into()),
        })?;

        Ok(hex::encode(bytes))
    }
}

/// Outcome of a successful (or idempotent) verification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub status: DomainStatus,
    pub message: String,
}

/// Checks an FQDN is plausible before it hits persistence or DNS.
///
/// # Errors
/// [`DomainError::Validation`] with a caller-readable reason.
pub fn validate_fqdn(domain: &str) -> Result<(), DomainError> {
    let reject = |reason: &'static str| {
        Err(DomainError::Validation { message: reason.into(), context: None })
    };

    if domain.len() < 4 || domain.len() > 253 {
        return reject("Domain must be between 4 and 253 characters");
    }
    if !domain.contains('.') {
        return reject("Domain must be fully qualified");
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return reject("Domain has empty labels");
    }
    for label in domain.split('.') {
        if label.len() > 63 {
            return reject("Domain label exceeds 63 characters");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return reject("Domain label cannot start or end with a hyphen");
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return reject("Domain contains invalid characters");
        }
    }

    Ok(())
}

/// Owns every `status` mutation of a [`CustomDomain`].
#[derive(Debug, Clone)]
pub struct DomainVerifier {
    repo: CustomDomainRepository,
    probe: Arc<dyn DnsProbe>,
    tokens: Arc<dyn TokenSource>,
    cname_target: String,
}

impl DomainVerifier {
    #[must_use]
    pub fn new(
        repo: CustomDomainRepository,
        probe: Arc<dyn DnsProbe>,
        tokens: Arc<dyn TokenSource>,
        cname_target: impl Into<String>,
    ) -> Self {
        Self { repo, probe, tokens, cname_target: cname_target.into() }
    }

    /// Registers a new domain in `pending` state with a fresh token.
    ///
    /// # Errors
    /// [`DomainError::Validation`] for a malformed FQDN,
    /// [`DomainError::Conflict`] when the name is already registered.
    pub async fn create(
        &self,
        owner_id: &str,
        domain: &str,
        landing_url: String,
        not_found_url: String,
        linked_vcard_id: Option<String>,
    ) -> Result<CustomDomain, DomainError> {
        let domain = domain.trim().to_ascii_lowercase();
        validate_fqdn(&domain)?;

        let record = CustomDomain {
            id: safe_nanoid!(),
            owner_id: owner_id.to_owned(),
            domain,
            status: DomainStatus::Pending,
            verification_token: self.tokens.issue()?,
            cname_target: self.cname_target.clone(),
            landing_url,
            not_found_url,
            linked_vcard_id,
            created_at: now_millis(),
        };

        let record = self.repo.create(record).await?;
        info!(domain = %record.domain, owner = %record.owner_id, "Custom domain registered");

        Ok(record)
    }

    /// Runs the DNS challenge for a domain and applies the resulting
    /// transition.
    ///
    /// # Errors
    /// * [`DomainError::Validation`] for a `blocked` domain; nothing is looked up.
    /// * [`DomainError::DnsTransient`] when DNS gave no usable answer; state unchanged.
    /// * [`DomainError::DnsFailed`] when records exist but match neither
    ///   mechanism; the domain is moved to `failed` first.
    pub async fn verify(&self, domain: &CustomDomain) -> Result<VerifyOutcome, DomainError> {
        match domain.status {
            DomainStatus::Active => {
                return Ok(VerifyOutcome {
                    status: DomainStatus::Active,
                    message: format!("Domain '{}' is already verified", domain.domain),
                });
            }
            DomainStatus::Blocked => {
                return Err(DomainError::Validation {
                    message: format!("Domain '{}' is blocked", domain.domain).into(),
                    context: None,
                });
            }
            DomainStatus::Pending | DomainStatus::Failed => {}
        }

        if self.challenge_satisfied(domain).await? {
            self.repo.set_status(&domain.id, DomainStatus::Active).await?;
            info!(domain = %domain.domain, from = %domain.status, "Custom domain verified");

            return Ok(VerifyOutcome {
                status: DomainStatus::Active,
                message: format!("Domain '{}' verified successfully", domain.domain),
            });
        }

        // Definitive negative: DNS answered, nothing matched.
        self.repo.set_status(&domain.id, DomainStatus::Failed).await?;
        warn!(domain = %domain.domain, "Custom domain verification failed");

        Err(DomainError::DnsFailed {
            message: format!(
                "No CNAME record pointing to '{}' and no TXT record with the verification \
                 token found for '{}'",
                domain.cname_target, domain.domain
            )
            .into(),
            context: None,
        })
    }

    /// # Errors
    /// Database failures.
    pub async fn delete(&self, domain: &CustomDomain) -> Result<(), DomainError> {
        self.repo.delete(&domain.id).await?;
        info!(domain = %domain.domain, owner = %domain.owner_id, "Custom domain deleted");
        Ok(())
    }

    /// True when either challenge mechanism matches. A transient error from
    /// the CNAME probe aborts early; the TXT probe is not consulted because
    /// the answer would be inconclusive anyway.
    async fn challenge_satisfied(&self, domain: &CustomDomain) -> Result<bool, DomainError> {
        let expected_target = domain.cname_target.to_ascii_lowercase();
        let cnames = self.probe.cname_targets(&domain.domain).await?;
        if cnames.iter().any(|target| *target == expected_target) {
            return Ok(true);
        }

        let txts = self.probe.txt_values(&domain.domain).await?;
        Ok(txts.iter().any(|value| *value == domain.verification_token))
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_fqdns() {
        for domain in ["cards.example.com", "a.io", "sub-domain.example.co.uk"] {
            assert!(validate_fqdn(domain).is_ok(), "{domain} should validate");
        }
    }

    #[test]
    fn rejects_malformed_fqdns() {
        for domain in
            ["", "localhost", "'); DROP", ".example.com", "example.com.", "a..b", "-x.example.com"]
        {
            assert!(validate_fqdn(domain).is_err(), "{domain} should be rejected");
        }
    }

    #[test]
    fn system_tokens_are_64_hex_chars_and_unique() {
        let source = SystemTokenSource;
        let a = source.issue().unwrap();
        let b = source.issue().unwrap();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
