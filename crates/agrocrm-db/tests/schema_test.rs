//! Migration runner integration tests using in-memory SurrealDB.

use agrocrm_core::models::user::{CreateUser, Role};
use agrocrm_core::repository::UserRepository;
use agrocrm_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn rerunning_migrations_applies_nothing() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    agrocrm_db::run_migrations(&db).await.unwrap();
    agrocrm_db::run_migrations(&db).await.unwrap();

    // Exactly one applied-version record despite the double run.
    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let rows: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(rows.len(), 1);

    // The schema is still usable afterwards.
    let repo = SurrealUserRepository::new(db);
    repo.create(CreateUser {
        name: "Ana".into(),
        email: "ana@example.com".into(),
        password: "senha123".into(),
        role: Role::Manager,
        created_by: None,
    })
    .await
    .unwrap();
}
