use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    // Health check
    flyerforge_db::health_check(&pool).await.unwrap();

    // Verify the core tables exist and start empty
    let tables = ["accounts", "projects", "project_images", "generated_images", "billing_events"];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty, got {} rows", count.0);
    }
}

/// updated_at must be trigger-maintained, not stuck at insert time.
#[sqlx::test(migrations = "./migrations")]
async fn test_updated_at_trigger_fires(pool: PgPool) {
    let (id, created, updated): (i64, chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) =
        sqlx::query_as(
            "INSERT INTO accounts (email, password_hash) VALUES ('t@example.com', 'x') \
             RETURNING id, created_at, updated_at",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(created, updated);

    sqlx::query("UPDATE accounts SET phone = '555-0100' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let (after,): (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("SELECT updated_at FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(after > created, "updated_at should advance on UPDATE");
}
