//! Integration tests for the authentication service.

use agrocrm_auth::config::AuthConfig;
use agrocrm_auth::service::{AuthService, BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD};
use agrocrm_auth::token;
use agrocrm_core::error::CrmError;
use agrocrm_core::models::user::{CreateUser, Role};
use agrocrm_core::repository::UserRepository;
use agrocrm_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

fn test_config() -> AuthConfig {
    AuthConfig {
        secret_key: "test-secret".into(),
        token_lifetime_secs: 3600,
        pepper: None,
    }
}

/// Spin up in-memory DB, run migrations, create one active user.
async fn setup() -> (
    AuthService<SurrealUserRepository<surrealdb::engine::local::Db>>,
    SurrealUserRepository<surrealdb::engine::local::Db>,
    Uuid,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    agrocrm_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let user = user_repo
        .create(CreateUser {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "senha123".into(),
            role: Role::Salesperson,
            created_by: None,
        })
        .await
        .unwrap();

    let service = AuthService::new(SurrealUserRepository::new(db), test_config());
    (service, user_repo, user.id)
}

#[tokio::test]
async fn login_with_valid_credentials() {
    let (service, _repo, user_id) = setup().await;

    let output = service.login("alice@example.com", "senha123").await.unwrap();
    assert_eq!(output.user.id, user_id);
    assert_eq!(output.expires_in, 3600);

    let claims = token::decode_token(&output.token, &test_config()).unwrap();
    assert_eq!(claims.sub, user_id.to_string());
}

#[tokio::test]
async fn login_failures_are_uniform() {
    let (service, repo, user_id) = setup().await;

    // Unknown email.
    let err = service.login("nobody@example.com", "senha123").await.unwrap_err();
    let unknown = err.to_string();

    // Wrong password.
    let err = service.login("alice@example.com", "errada").await.unwrap_err();
    let wrong = err.to_string();

    // Deactivated account.
    repo.deactivate(user_id).await.unwrap();
    let err = service.login("alice@example.com", "senha123").await.unwrap_err();
    let inactive = err.to_string();

    // All three read identically to the caller.
    assert_eq!(unknown, wrong);
    assert_eq!(wrong, inactive);
    assert!(matches!(
        service.login("alice@example.com", "senha123").await.unwrap_err(),
        CrmError::AuthenticationFailed { .. }
    ));
}

#[tokio::test]
async fn authenticate_resolves_token_to_user() {
    let (service, _repo, user_id) = setup().await;

    let output = service.login("alice@example.com", "senha123").await.unwrap();
    let user = service.authenticate(&output.token).await.unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.email, "alice@example.com");
}

#[tokio::test]
async fn token_stops_working_after_deactivation() {
    let (service, repo, user_id) = setup().await;

    let output = service.login("alice@example.com", "senha123").await.unwrap();
    service.authenticate(&output.token).await.unwrap();

    repo.deactivate(user_id).await.unwrap();
    let err = service.authenticate(&output.token).await.unwrap_err();
    assert!(matches!(err, CrmError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn authenticate_rejects_garbage_and_foreign_tokens() {
    let (service, _repo, _user_id) = setup().await;

    let err = service.authenticate("not.a.jwt").await.unwrap_err();
    assert!(matches!(err, CrmError::AuthenticationFailed { .. }));

    // Valid signature but unknown subject.
    let foreign = token::issue_token(Uuid::new_v4(), &test_config()).unwrap();
    let err = service.authenticate(&foreign).await.unwrap_err();
    assert!(matches!(err, CrmError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn init_admin_bootstraps_once() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    agrocrm_db::run_migrations(&db).await.unwrap();

    let service = AuthService::new(SurrealUserRepository::new(db), test_config());

    let admin = service.init_admin().await.unwrap();
    assert_eq!(admin.email, BOOTSTRAP_ADMIN_EMAIL);
    assert_eq!(admin.role, Role::Manager);
    assert!(admin.active);

    // Second bootstrap is refused.
    let err = service.init_admin().await.unwrap_err();
    assert!(matches!(err, CrmError::AlreadyExists { .. }));

    // The bootstrap credentials can log in.
    service
        .login(BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_PASSWORD)
        .await
        .unwrap();
}
