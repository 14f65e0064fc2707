//! End-to-end API tests driving the real router over in-memory
//! SurrealDB.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;

use agrocrm_auth::AuthConfig;
use agrocrm_server::{AppState, build_router};

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        secret_key: "test-secret".into(),
        token_lifetime_secs: 3600,
        pepper: None,
    }
}

async fn app() -> Router {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    agrocrm_db::run_migrations(&db).await.unwrap();

    build_router(AppState::new(db, test_auth_config()))
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Bootstrap the admin account and log in, returning the token.
async fn admin_token(app: &Router) -> String {
    let (status, _) = send(app, request("POST", "/api/init-admin", None, None)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "admin@agrocrm.com", "senha": "admin123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Register a salesperson through the admin and log them in.
async fn salesperson_token(app: &Router, admin: &str) -> String {
    let (status, _) = send(
        app,
        request(
            "POST",
            "/api/auth/register",
            Some(admin),
            Some(json!({
                "nome": "João",
                "email": "joao@example.com",
                "senha": "senha123",
                "tipo": "vendedor",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "joao@example.com", "senha": "senha123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn init_admin_is_one_shot() {
    let app = app().await;

    let (status, body) = send(&app, request("POST", "/api/init-admin", None, None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "admin@agrocrm.com");
    assert_eq!(body["senha"], "admin123");

    let (status, body) = send(&app, request("POST", "/api/init-admin", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Administrador já existe!");
}

#[tokio::test]
async fn login_validation_and_failures() {
    let app = app().await;
    admin_token(&app).await;

    let (status, body) = send(
        &app,
        request("POST", "/api/auth/login", None, Some(json!({"email": "admin@agrocrm.com"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email e senha são obrigatórios!");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "admin@agrocrm.com", "senha": "errada"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Credenciais inválidas!");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app().await;

    let (status, body) = send(&app, request("GET", "/api/clientes", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token é necessário!");

    let (status, body) = send(&app, request("GET", "/api/clientes", Some("garbage"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token inválido!");

    // A present-but-wrong-scheme header is malformed, not missing.
    let req = Request::builder()
        .method("GET")
        .uri("/api/clientes")
        .header("authorization", "Basic abc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token inválido!");

    // So is a bare one-word header.
    let req = Request::builder()
        .method("GET")
        .uri("/api/clientes")
        .header("authorization", "sometoken")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token inválido!");
}

#[tokio::test]
async fn user_payloads_carry_only_wire_fields() {
    let app = app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(&app, request("GET", "/api/auth/me", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tipo"], "gerente");
    assert_eq!(body["ativo"], true);
    // Hash and registration bookkeeping stay server-side.
    assert!(body.get("password_hash").is_none());
    assert!(body.get("criado_por").is_none());
}

#[tokio::test]
async fn manager_routes_reject_salespeople() {
    let app = app().await;
    let admin = admin_token(&app).await;
    let seller = salesperson_token(&app, &admin).await;

    let (status, body) = send(&app, request("GET", "/api/auth/users", Some(&seller), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Acesso negado! Apenas gerentes podem acessar.");

    let (status, body) = send(&app, request("GET", "/api/auth/users", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn register_validates_input() {
    let app = app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            Some(&admin),
            Some(json!({"nome": "X", "email": "x@example.com"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Nome, email, senha e tipo são obrigatórios!");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            Some(&admin),
            Some(json!({
                "nome": "X",
                "email": "x@example.com",
                "senha": "pw",
                "tipo": "supervisor",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Tipo deve ser \"gerente\" ou \"vendedor\"!");

    // Duplicate email registers as 400, not 409.
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            Some(&admin),
            Some(json!({
                "nome": "Outro Admin",
                "email": "admin@agrocrm.com",
                "senha": "pw",
                "tipo": "gerente",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email já cadastrado!");

    // The rejected registration left no row behind.
    let (_, body) = send(&app, request("GET", "/api/auth/users", Some(&admin), None)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deactivation_locks_out_the_user_and_their_token() {
    let app = app().await;
    let admin = admin_token(&app).await;
    let seller = salesperson_token(&app, &admin).await;

    let (_, body) = send(&app, request("GET", "/api/auth/me", Some(&seller), None)).await;
    let seller_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request("DELETE", &format!("/api/auth/users/{seller_id}"), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The deactivated account can no longer log in...
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "joao@example.com", "senha": "senha123"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // ...and its still-unexpired token is rejected on the next request.
    let (status, body) = send(&app, request("GET", "/api/clientes", Some(&seller), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token inválido!");
}

#[tokio::test]
async fn managers_cannot_delete_themselves() {
    let app = app().await;
    let admin = admin_token(&app).await;

    let (_, body) = send(&app, request("GET", "/api/auth/me", Some(&admin), None)).await;
    let admin_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request("DELETE", &format!("/api/auth/users/{admin_id}"), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Não é possível excluir seu próprio usuário!");
}

#[tokio::test]
async fn customer_crud_round_trip() {
    let app = app().await;
    let admin = admin_token(&app).await;
    let seller = salesperson_token(&app, &admin).await;

    // Missing required fields.
    let (status, body) = send(
        &app,
        request("POST", "/api/clientes", Some(&seller), Some(json!({"nome": "Fazenda X"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Nome, telefone, cidade, área e máquinas são obrigatórios!"
    );

    // Create with defaults.
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/clientes",
            Some(&seller),
            Some(json!({
                "nome": "Fazenda Alvorada",
                "telefone": "(16) 98888-7777",
                "cidade": "Barretos",
                "area": 340.0,
                "maquinas": "3 tratores",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["temperatura"], "Fria");
    assert_eq!(body["status"], "Início de Relacionamento");
    let customer_id = body["id"].as_str().unwrap().to_string();

    // Update refreshes fields.
    let (status, body) = send(
        &app,
        request(
            "PUT",
            &format!("/api/clientes/{customer_id}"),
            Some(&seller),
            Some(json!({"temperatura": "Quente", "valor": 180000.0})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temperatura"], "Quente");
    assert_eq!(body["valor"], 180000.0);

    // History and photos land on the eager read.
    let (status, body) = send(
        &app,
        request(
            "POST",
            &format!("/api/clientes/{customer_id}/historico"),
            Some(&seller),
            Some(json!({"evento": "Visita técnica", "descricao": "Avaliação do solo"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let history_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["usuario_nome"], "João");

    let (status, _) = send(
        &app,
        request(
            "POST",
            &format!("/api/clientes/{customer_id}/fotos"),
            Some(&seller),
            Some(json!({"nome_arquivo": "talhao.jpg", "caminho": "uploads/talhao.jpg"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/clientes/{customer_id}"), Some(&seller), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["historico"].as_array().unwrap().len(), 1);
    assert_eq!(body["fotos"].as_array().unwrap().len(), 1);

    // History entries can be removed individually.
    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/clientes/{customer_id}/historico/{history_id}"),
            Some(&seller),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Delete cascades; the record is gone afterwards.
    let (status, body) = send(
        &app,
        request("DELETE", &format!("/api/clientes/{customer_id}"), Some(&seller), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cliente excluído com sucesso!");

    let (status, body) = send(
        &app,
        request("GET", &format!("/api/clientes/{customer_id}"), Some(&seller), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cliente não encontrado!");
}
