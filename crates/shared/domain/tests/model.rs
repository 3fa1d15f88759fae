use vhub_domain::constants::UNLIMITED;
use vhub_domain::model::{PlanLimit, Resource, ResourceInstance, ResourceKind};

#[test]
fn resource_kind_strings_match_table_names() {
    assert_eq!(ResourceKind::VCard.as_str(), "vcard");
    assert_eq!(ResourceKind::Project.as_str(), "project");
    assert_eq!(ResourceKind::Pixel.as_str(), "pixel");
    assert_eq!(ResourceKind::CustomDomain.as_str(), "custom_domain");
    assert_eq!(ResourceKind::CustomDomain.to_string(), "custom_domain");
}

#[test]
fn plan_limit_unlimited_sentinel() {
    assert!(PlanLimit::new(ResourceKind::VCard, UNLIMITED).is_unlimited());
    assert!(!PlanLimit::new(ResourceKind::VCard, 0).is_unlimited());
    assert!(!PlanLimit::new(ResourceKind::VCard, 3).is_unlimited());
}

#[test]
fn resource_instance_exposes_fields_through_trait() {
    let r = ResourceInstance {
        id: "vcard:abc".to_owned(),
        owner_id: "owner-1".to_owned(),
        created_at: 1_700_000_000_000,
    };
    assert_eq!(r.id(), "vcard:abc");
    assert_eq!(r.owner_id(), "owner-1");
    assert_eq!(r.created_at(), 1_700_000_000_000);
}

#[test]
fn resource_kind_serializes_snake_case() {
    let json = serde_json::to_string(&ResourceKind::CustomDomain).expect("serialize");
    assert_eq!(json, "\"custom_domain\"");
    let back: ResourceKind = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, ResourceKind::CustomDomain);
}
