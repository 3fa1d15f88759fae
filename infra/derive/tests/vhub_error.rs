#[test]
fn vhub_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/vhub_error_pass.rs");
}
