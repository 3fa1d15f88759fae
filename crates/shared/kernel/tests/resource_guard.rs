use vhub_kernel::security::resource::ResourceGuard;

#[test]
fn resource_guard_validates_and_prefixes() {
    assert_eq!(
        ResourceGuard::verify("custom_domain:k7Yq2", "custom_domain").unwrap(),
        "custom_domain:k7Yq2"
    );

    assert_eq!(ResourceGuard::verify("k7Yq2", "custom_domain").unwrap(), "custom_domain:k7Yq2");

    assert!(ResourceGuard::verify("system:k7Yq2", "custom_domain").is_err());
}
