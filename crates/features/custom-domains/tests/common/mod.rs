//! Shared fixtures: an in-memory database and a scriptable DNS probe.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use vhub_custom_domains::coordinator::DomainLifecycleCoordinator;
use vhub_custom_domains::DomainError;
use vhub_custom_domains::dns::DnsProbe;
use vhub_custom_domains::repository::CustomDomainRepository;
use vhub_custom_domains::verifier::{DomainVerifier, SystemTokenSource};
use vhub_database::Database;
use vhub_domain::config::{PlanLimitsConfig, PlansConfig};
use vhub_entitlement::engine::Policy;
use vhub_entitlement::provider::{ConfigPlanLimits, EntitlementService};

/// DNS probe with scriptable answers and a call counter.
#[derive(Debug, Default)]
pub struct FakeProbe {
    cname: Mutex<HashMap<String, Vec<String>>>,
    txt: Mutex<HashMap<String, Vec<String>>>,
    transient: Mutex<bool>,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn set_cname(&self, domain: &str, target: &str) {
        self.cname.lock().unwrap().insert(domain.to_owned(), vec![target.to_owned()]);
    }

    pub fn set_txt(&self, domain: &str, value: &str) {
        self.txt.lock().unwrap().insert(domain.to_owned(), vec![value.to_owned()]);
    }

    pub fn clear(&self, domain: &str) {
        self.cname.lock().unwrap().remove(domain);
        self.txt.lock().unwrap().remove(domain);
    }

    pub fn set_transient(&self, transient: bool) {
        *self.transient.lock().unwrap() = transient;
    }

    pub fn lookups(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(
        &self,
        table: &Mutex<HashMap<String, Vec<String>>>,
        domain: &str,
    ) -> Result<Vec<String>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.transient.lock().unwrap() {
            return Err(DomainError::DnsTransient {
                message: "simulated network failure".into(),
                context: None,
            });
        }
        Ok(table.lock().unwrap().get(domain).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl DnsProbe for FakeProbe {
    async fn cname_targets(&self, domain: &str) -> Result<Vec<String>, DomainError> {
        self.answer(&self.cname, domain)
    }

    async fn txt_values(&self, domain: &str) -> Result<Vec<String>, DomainError> {
        self.answer(&self.txt, domain)
    }
}

pub const CNAME_TARGET: &str = "domains.vhub.test";

pub struct Fixture {
    pub coordinator: DomainLifecycleCoordinator,
    pub probe: Arc<FakeProbe>,
    repo: CustomDomainRepository,
    verifier: DomainVerifier,
}

impl Fixture {
    /// A second coordinator over the same records with a different ceiling,
    /// as if the owner's plan changed between requests.
    pub fn coordinator_with_limit(&self, domain_limit: i64) -> DomainLifecycleCoordinator {
        DomainLifecycleCoordinator::new(
            self.repo.clone(),
            self.verifier.clone(),
            entitlement(domain_limit),
        )
    }
}

fn entitlement(domain_limit: i64) -> EntitlementService {
    let plans = PlansConfig {
        limits: PlanLimitsConfig { custom_domains: domain_limit, ..Default::default() },
    };
    EntitlementService::new(Arc::new(ConfigPlanLimits::new(plans)), Policy::Grandfathered)
}

/// A fresh in-memory coordinator with the given custom-domain ceiling.
pub async fn fixture(domain_limit: i64) -> Fixture {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "domains_db")
        .init()
        .await
        .expect("connect to mem://");

    let repo = CustomDomainRepository::new(db);
    let probe = Arc::new(FakeProbe::default());
    let verifier = DomainVerifier::new(
        repo.clone(),
        probe.clone(),
        Arc::new(SystemTokenSource),
        CNAME_TARGET,
    );

    let coordinator =
        DomainLifecycleCoordinator::new(repo.clone(), verifier.clone(), entitlement(domain_limit));

    Fixture { coordinator, probe, repo, verifier }
}
