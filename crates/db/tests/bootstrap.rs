use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify seed data.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    shule_db::health_check(&pool).await.unwrap();

    for table in ["roles", "assessment_types"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert!(count.0 > 0, "{table} should have seed data, got 0 rows");
    }
}

/// Role ids are fixed by seed order and referenced from code.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_role_seed_order(pool: PgPool) {
    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM roles ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|(_, n)| n.as_str()).collect();
    assert_eq!(
        names,
        [
            shule_core::roles::ROLE_HEADTEACHER,
            shule_core::roles::ROLE_CLASSTEACHER,
            shule_core::roles::ROLE_TEACHER,
            shule_core::roles::ROLE_PARENT,
        ]
    );
}
