use vhub_database::*;

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .init()
        .await
        .expect("connect to mem://");

    // Health should be OK for mem://
    db.health().await.expect("health check");
    db.use_ns("test_ns").use_db("test_db").await.expect("session switch");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn migrations_define_custom_domain_schema() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "migrations_db")
        .init()
        .await
        .expect("connect to mem://");

    // Unique index must reject a second record with the same domain.
    db.query(
        "CREATE custom_domain SET
            owner_id = 'owner-1',
            domain = 'cards.example.com',
            status = 'pending',
            verification_token = 'aa',
            cname_target = 'domains.vhub.app',
            landing_url = '',
            not_found_url = '',
            created_at = 1",
    )
    .await
    .expect("query")
    .check()
    .expect("first insert");

    let duplicate = db
        .query(
            "CREATE custom_domain SET
                owner_id = 'owner-2',
                domain = 'cards.example.com',
                status = 'pending',
                verification_token = 'bb',
                cname_target = 'domains.vhub.app',
                landing_url = '',
                not_found_url = '',
                created_at = 2",
        )
        .await
        .expect("query")
        .check();
    assert!(duplicate.is_err(), "unique domain index should reject duplicates");
}

#[tokio::test]
async fn migrations_are_idempotent_across_restarts() {
    // Two sequential inits on the same engine URL must not fail on re-apply.
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "idempotent_db")
        .init()
        .await
        .expect("first init");
    drop(db);

    Database::builder()
        .url("mem://")
        .session("test_ns", "idempotent_db")
        .init()
        .await
        .expect("second init");
}
