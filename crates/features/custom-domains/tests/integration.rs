//! State machine behavior: creation, the DNS challenge, recovery, deletion.

mod common;

use common::{CNAME_TARGET, fixture};
use vhub_custom_domains::DomainError;
use vhub_custom_domains::record::DomainStatus;

#[tokio::test]
async fn create_starts_pending_with_a_64_hex_token() {
    let fx = fixture(5).await;

    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    assert_eq!(domain.status, DomainStatus::Pending);
    assert_eq!(domain.cname_target, CNAME_TARGET);
    assert_eq!(domain.verification_token.len(), 64);
    assert!(domain.verification_token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn domain_names_are_normalized_and_validated() {
    let fx = fixture(5).await;

    let domain = fx
        .coordinator
        .create("owner-1", "  Cards.Example.COM ", String::new(), String::new(), None)
        .await
        .expect("create");
    assert_eq!(domain.domain, "cards.example.com");

    for bad in ["localhost", "http://x.example.com", "a..b.com"] {
        let err = fx
            .coordinator
            .create("owner-1", bad, String::new(), String::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }), "{bad}");
    }
}

#[tokio::test]
async fn duplicate_domains_conflict_across_owners() {
    let fx = fixture(5).await;

    fx.coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("first create");

    let err = fx
        .coordinator
        .create("owner-2", "x.example.com", String::new(), String::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));
}

#[tokio::test]
async fn verify_without_matching_records_transitions_to_failed() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    // No DNS records exist anywhere: definitive negative.
    let err = fx.coordinator.verify("owner-1", &domain.id).await.unwrap_err();
    assert!(matches!(err, DomainError::DnsFailed { .. }));

    let listed = fx.coordinator.list("owner-1").await.expect("list");
    assert_eq!(listed[0].domain.status, DomainStatus::Failed);
}

#[tokio::test]
async fn verify_succeeds_via_cname() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    fx.probe.set_cname("x.example.com", CNAME_TARGET);

    let outcome = fx.coordinator.verify("owner-1", &domain.id).await.expect("verify");
    assert_eq!(outcome.status, DomainStatus::Active);
}

#[tokio::test]
async fn verify_succeeds_via_txt_token() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    fx.probe.set_txt("x.example.com", &domain.verification_token);

    let outcome = fx.coordinator.verify("owner-1", &domain.id).await.expect("verify");
    assert_eq!(outcome.status, DomainStatus::Active);
}

#[tokio::test]
async fn wrong_txt_value_is_a_definitive_failure() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    fx.probe.set_txt("x.example.com", "not-the-token");

    let err = fx.coordinator.verify("owner-1", &domain.id).await.unwrap_err();
    assert!(matches!(err, DomainError::DnsFailed { .. }));
}

#[tokio::test]
async fn failed_domain_recovers_once_dns_is_fixed() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    let _ = fx.coordinator.verify("owner-1", &domain.id).await.unwrap_err();

    // The owner corrects their DNS and retries.
    fx.probe.set_cname("x.example.com", CNAME_TARGET);
    let outcome = fx.coordinator.verify("owner-1", &domain.id).await.expect("re-verify");
    assert_eq!(outcome.status, DomainStatus::Active);
}

#[tokio::test]
async fn verify_is_idempotent_on_active_domains() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    fx.probe.set_cname("x.example.com", CNAME_TARGET);
    fx.coordinator.verify("owner-1", &domain.id).await.expect("first verify");

    let lookups_after_first = fx.probe.lookups();
    let outcome = fx.coordinator.verify("owner-1", &domain.id).await.expect("second verify");

    assert_eq!(outcome.status, DomainStatus::Active);
    // Already-active domains are answered without touching DNS.
    assert_eq!(fx.probe.lookups(), lookups_after_first);
}

#[tokio::test]
async fn transient_dns_failure_leaves_state_unchanged() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    fx.probe.set_transient(true);
    let err = fx.coordinator.verify("owner-1", &domain.id).await.unwrap_err();
    assert!(matches!(err, DomainError::DnsTransient { .. }));

    let listed = fx.coordinator.list("owner-1").await.expect("list");
    assert_eq!(listed[0].domain.status, DomainStatus::Pending, "no transition on transient");

    // Retry works once DNS answers again.
    fx.probe.set_transient(false);
    fx.probe.set_cname("x.example.com", CNAME_TARGET);
    let outcome = fx.coordinator.verify("owner-1", &domain.id).await.expect("retry");
    assert_eq!(outcome.status, DomainStatus::Active);
}

#[tokio::test]
async fn update_edits_settings_only() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", "https://a".to_owned(), String::new(), None)
        .await
        .expect("create");

    let updated = fx
        .coordinator
        .update(
            "owner-1",
            &domain.id,
            Some("https://b".to_owned()),
            None,
            Some(Some("vcard-1".to_owned())),
        )
        .await
        .expect("update");

    assert_eq!(updated.landing_url, "https://b");
    assert_eq!(updated.not_found_url, "");
    assert_eq!(updated.linked_vcard_id.as_deref(), Some("vcard-1"));
    assert_eq!(updated.verification_token, domain.verification_token, "token is immutable");
}

#[tokio::test]
async fn delete_removes_the_record() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    fx.coordinator.delete("owner-1", &domain.id).await.expect("delete");

    assert!(fx.coordinator.list("owner-1").await.expect("list").is_empty());

    let err = fx.coordinator.delete("owner-1", &domain.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn foreign_domains_are_invisible() {
    let fx = fixture(5).await;
    let domain = fx
        .coordinator
        .create("owner-1", "x.example.com", String::new(), String::new(), None)
        .await
        .expect("create");

    let err = fx.coordinator.verify("owner-2", &domain.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let err = fx.coordinator.delete("owner-2", &domain.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}
