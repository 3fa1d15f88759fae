//! DNS lookups behind a narrow seam.
//!
//! The verifier only needs two questions answered: "what does this name's
//! CNAME point at" and "what TXT values does it publish". [`DnsProbe`] keeps
//! the resolver swappable so tests never touch the network.
//!
//! An authoritative empty answer (`NoRecordsFound`) is a real answer and comes
//! back as an empty list. Timeouts and transport failures become
//! [`DomainError::DnsTransient`] so callers can retry without state changes.

use crate::error::DomainError;
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::RecordType;
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait DnsProbe: Debug + Send + Sync {
    /// CNAME targets of `domain`, normalized to lowercase without the
    /// trailing dot. Empty when the name publishes no CNAME.
    async fn cname_targets(&self, domain: &str) -> Result<Vec<String>, DomainError>;

    /// TXT values published at `domain`. Empty when none exist.
    async fn txt_values(&self, domain: &str) -> Result<Vec<String>, DomainError>;
}

/// Production probe backed by the system's recursive resolvers.
#[derive(Debug)]
pub struct HickoryProbe {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl HickoryProbe {
    /// Builds a probe with a hard per-lookup deadline.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 2;

        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), opts);
        Self { resolver, timeout }
    }

    /// Runs a lookup under the hard deadline. `Ok(None)` means the authority
    /// answered that no such records exist.
    async fn bounded<F, T>(&self, domain: &str, lookup: F) -> Result<Option<T>, DomainError>
    where
        F: Future<Output = Result<T, ResolveError>>,
    {
        // The resolver has its own timeout, the outer one is the hard bound.
        let result = tokio::time::timeout(self.timeout, lookup).await;

        match result {
            Ok(Ok(answer)) => Ok(Some(answer)),
            Ok(Err(err)) => classify_resolve_error(domain, &err),
            Err(_) => Err(DomainError::DnsTransient {
                message: format!("DNS lookup for '{domain}' timed out").into(),
                context: None,
            }),
        }
    }
}

fn classify_resolve_error<T>(domain: &str, err: &ResolveError) -> Result<Option<T>, DomainError> {
    match err.kind() {
        // The authority answered: the records simply do not exist.
        ResolveErrorKind::NoRecordsFound { .. } => {
            debug!(%domain, "DNS answered with no records");
            Ok(None)
        }
        _ => Err(DomainError::DnsTransient {
            message: format!("DNS lookup for '{domain}' failed: {err}").into(),
            context: None,
        }),
    }
}

/// Lowercases and strips the trailing root dot from a DNS name.
fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

#[async_trait]
impl DnsProbe for HickoryProbe {
    async fn cname_targets(&self, domain: &str) -> Result<Vec<String>, DomainError> {
        let Some(lookup) = self
            .bounded(domain, self.resolver.lookup(domain.to_owned(), RecordType::CNAME))
            .await?
        else {
            return Ok(Vec::new());
        };

        Ok(lookup
            .iter()
            .filter_map(|rdata| rdata.as_cname())
            .map(|cname| normalize_name(&cname.0.to_utf8()))
            .collect())
    }

    async fn txt_values(&self, domain: &str) -> Result<Vec<String>, DomainError> {
        let Some(lookup) =
            self.bounded(domain, self.resolver.txt_lookup(domain.to_owned())).await?
        else {
            return Ok(Vec::new());
        };

        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|part| String::from_utf8_lossy(part).into_owned())
                    .collect::<String>()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_normalized() {
        assert_eq!(normalize_name("Domains.VHub.App."), "domains.vhub.app");
        assert_eq!(normalize_name("edge.example.net"), "edge.example.net");
    }
}
