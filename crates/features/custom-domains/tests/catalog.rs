//! The generic listing seam: the repository serving as the entitlement
//! catalog, directly and through the registered entitlement slice.

use std::sync::Arc;
use vhub_custom_domains::record::{CustomDomain, DomainStatus};
use vhub_custom_domains::repository::CustomDomainRepository;
use vhub_database::Database;
use vhub_domain::config::{ApiConfig, PlanLimitsConfig, PlansConfig};
use vhub_domain::model::ResourceKind;
use vhub_entitlement::engine::Policy;
use vhub_entitlement::provider::{ConfigPlanLimits, EntitlementService};
use vhub_entitlement::{Entitlement, EntitlementError};
use vhub_kernel::server::ApiState;

async fn harness() -> (Database, CustomDomainRepository) {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "catalog_db")
        .init()
        .await
        .expect("connect to mem://");
    (db.clone(), CustomDomainRepository::new(db))
}

fn plans(custom_domains: i64) -> PlansConfig {
    PlansConfig { limits: PlanLimitsConfig { custom_domains, ..Default::default() } }
}

fn record(key: &str, domain: &str, created_at: i64) -> CustomDomain {
    CustomDomain {
        id: key.to_owned(),
        owner_id: "owner-1".to_owned(),
        domain: domain.to_owned(),
        status: DomainStatus::Pending,
        verification_token: "ab".repeat(32),
        cname_target: "domains.vhub.test".to_owned(),
        landing_url: String::new(),
        not_found_url: String::new(),
        linked_vcard_id: None,
        created_at,
    }
}

#[tokio::test]
async fn catalog_classification_follows_creation_order() {
    let (_db, repo) = harness().await;

    // Inserted out of creation order on purpose: the catalog contract is
    // `created_at` ascending, not insertion order.
    repo.create(record("d-b", "b.example.com", 20)).await.expect("create b");
    repo.create(record("d-c", "c.example.com", 30)).await.expect("create c");
    repo.create(record("d-a", "a.example.com", 10)).await.expect("create a");

    let service =
        EntitlementService::new(Arc::new(ConfigPlanLimits::new(plans(2))), Policy::Standard);
    let decisions = service
        .classify_all(&repo, "owner-1", ResourceKind::CustomDomain)
        .await
        .expect("classify");

    let ids: Vec<&str> = decisions.iter().map(|d| d.resource_id.as_str()).collect();
    assert_eq!(ids, ["d-a", "d-b", "d-c"], "oldest first");

    let disabled: Vec<bool> = decisions.iter().map(|d| d.is_disabled).collect();
    assert_eq!(disabled, [false, false, true]);
}

#[tokio::test]
async fn registered_slice_classifies_through_the_catalog() {
    let (db, repo) = harness().await;
    repo.create(record("d-a", "a.example.com", 10)).await.expect("create a");
    repo.create(record("d-b", "b.example.com", 20)).await.expect("create b");

    // The same path a listing handler takes: read the slice back from the
    // state, then classify through the repository as the catalog.
    let slice = vhub_entitlement::init(plans(1)).expect("init entitlement");
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .db(db)
        .register_slice(slice)
        .build()
        .expect("build state");

    let entitlement = state.try_get_slice::<Entitlement>().expect("entitlement slice");
    let decisions = entitlement
        .service
        .classify_all(&repo, "owner-1", ResourceKind::CustomDomain)
        .await
        .expect("classify");

    assert_eq!(decisions.len(), 2);
    assert!(!decisions[0].is_disabled);
    assert!(decisions[1].is_disabled);
}

#[tokio::test]
async fn catalog_refuses_foreign_resource_kinds() {
    let (_db, repo) = harness().await;

    let service =
        EntitlementService::new(Arc::new(ConfigPlanLimits::new(plans(1))), Policy::Standard);
    let err = service
        .classify_all(&repo, "owner-1", ResourceKind::VCard)
        .await
        .unwrap_err();

    assert!(matches!(err, EntitlementError::Validation { .. }));
}
