use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use serde_json::{Value, json};

use itematic_client::types::{AdminUserUpdate, BranchInput, ItemForm, ItemImage, UserUpdate};
use itematic_client::{
    ApiClient, ClientConfig, ClientContext, ErrorCode, Failure, MemoryStore, Role, SessionState, StaticToken,
    translate,
};
use itematic_core::{BranchId, CategoryId, ItemId, UserId};

const TOKEN: &str = "tok123";

/// Bodies received by the write endpoints, as `("METHOD /path", body)`.
type Seen = Arc<Mutex<Vec<(String, Value)>>>;

struct TestServer {
    base_url: String,
    seen: Seen,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api/v1", addr);

        let seen = Seen::default();
        let app = backend(seen.clone());
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, seen, handle }
    }

    fn last_body(&self, request: &str) -> Option<Value> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(r, _)| r == request)
            .map(|(_, body)| body.clone())
    }

    fn context(&self) -> ClientContext {
        let config = ClientConfig {
            api_base_url: self.base_url.clone(),
            session_file: None,
            request_timeout_secs: 5,
            landing_path: "/login".to_string(),
        };
        ClientContext::with_store(config, Arc::new(MemoryStore::new())).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fake backend
// ─────────────────────────────────────────────────────────────────────────────

fn backend(seen: Seen) -> Router {
    let routes = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/branches", get(list_branches))
        .route("/branches/:id", delete(delete_branch).put(update_branch))
        .route("/users", post(create_user))
        .route("/users/:id", put(update_user))
        .route("/users/:id/admin", put(update_user))
        .route("/company", get(company))
        .route("/items", post(save_item))
        .route("/items/:id", put(save_item))
        .route("/items/:id/image", get(item_image))
        .route("/items/:id/categories", post(assign_categories).get(item_categories))
        .route("/health", get(health))
        .with_state(seen);
    Router::new().nest("/api/v1", routes)
}

fn record(seen: &Seen, method: &Method, path: &str, body: Value) {
    let path = path.strip_prefix("/api/v1").unwrap_or(path);
    seen.lock().unwrap().push((format!("{method} {path}"), body));
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"}))).into_response()
}

async fn login(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.contains_key("authorization") {
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": "login must be anonymous"}))).into_response();
    }
    if body["username"] == "alice" && body["password"] == "pw" {
        Json(json!({"access_token": TOKEN, "token_type": "bearer"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "INVALID_CREDENTIALS"}))).into_response()
    }
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "id": 1,
        "name": "Alice",
        "username": "alice",
        "role": "admin",
        "company_id": 9,
        "is_active": true,
    }))
    .into_response()
}

async fn list_branches(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        {"id": 1, "name": "North", "address": "1 North St", "company_id": 9},
        {"id": 2, "name": "South", "address": "2 South St", "company_id": 9},
    ]))
    .into_response()
}

async fn delete_branch(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({"code": "BRANCH_NOT_FOUND"}))).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_user() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": "USERNAME_ALREADY_EXISTS: alice is taken"})),
    )
        .into_response()
}

async fn update_branch(
    State(seen): State<Seen>,
    method: Method,
    uri: axum::http::Uri,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    record(&seen, &method, uri.path(), body.clone());
    Json(json!({"id": id, "name": body["name"], "address": body["address"], "company_id": 9})).into_response()
}

async fn update_user(
    State(seen): State<Seen>,
    method: Method,
    uri: axum::http::Uri,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    record(&seen, &method, uri.path(), body);
    Json(json!({"id": id, "name": "Bob", "username": "bob", "role": "EMPLOYEE", "company_id": 9, "branch_id": null}))
        .into_response()
}

async fn save_item(State(seen): State<Seen>, method: Method, uri: axum::http::Uri, mut multipart: Multipart) -> Response {
    let mut fields = serde_json::Map::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = if name == "image" {
            json!(field.bytes().await.map(|b| b.len()).unwrap_or_default())
        } else {
            json!(field.text().await.unwrap_or_default())
        };
        fields.insert(name, value);
    }
    let item = json!({
        "id": 4,
        "name": fields.get("name").cloned().unwrap_or_default(),
        "sku": fields.get("sku").cloned().unwrap_or_default(),
        "unit": fields.get("unit").cloned().unwrap_or_default(),
    });
    record(&seen, &method, uri.path(), Value::Object(fields));
    Json(item).into_response()
}

async fn assign_categories(
    State(seen): State<Seen>,
    method: Method,
    uri: axum::http::Uri,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    record(&seen, &method, uri.path(), body.clone());
    Json(json!({"item_id": id, "category_ids": body})).into_response()
}

async fn item_categories() -> Response {
    Json(json!([{"id": 1, "name": "Tools", "color": "#ff0000"}])).into_response()
}

async fn company() -> Response {
    (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
}

async fn item_image(Path(id): Path<i64>) -> Response {
    (StatusCode::OK, [("content-type", "image/png")], vec![id as u8, 1, 2, 3]).into_response()
}

async fn health(headers: HeaderMap) -> Response {
    if !headers.contains_key("x-request-id") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!({"status": "ok"})).into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_exchanges_credentials_and_fetches_profile() {
    let server = TestServer::spawn().await;
    let ctx = server.context();

    let user = ctx.session.login("alice", "pw").await.unwrap();

    assert_eq!(user.role, Some(Role::ADMIN));
    assert_eq!(user.extra.get("is_active"), Some(&json!(true)));
    assert_eq!(ctx.session.token().as_deref(), Some(TOKEN));
    assert!(ctx.capabilities().manage_users);
}

#[tokio::test]
async fn requests_carry_the_session_token_after_login() {
    let server = TestServer::spawn().await;
    let ctx = server.context();

    let err = ctx.branches.list().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    ctx.session.login("alice", "pw").await.unwrap();
    let branches = ctx.branches.list().await.unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].id, BranchId::new(1));

    ctx.branches.delete(BranchId::new(2)).await.unwrap();

    ctx.session.logout().await;
    assert_eq!(ctx.branches.list().await.unwrap_err().status(), Some(401));
}

#[tokio::test]
async fn invalid_credentials_are_translated() {
    let server = TestServer::spawn().await;
    let ctx = server.context();

    let err = ctx.session.login("alice", "wrong").await.unwrap_err();

    assert_eq!(err.display(), "Invalid credentials");
    assert_eq!(ctx.session.snapshot().state, SessionState::Anonymous);
}

#[tokio::test]
async fn backend_errors_are_classified() {
    let server = TestServer::spawn().await;
    let ctx = server.context();
    ctx.session.login("alice", "pw").await.unwrap();

    let err = ctx.branches.delete(BranchId::new(404)).await.unwrap_err();
    assert_eq!(err.failure(), Failure::Coded(ErrorCode::BranchNotFound));

    let api = ctx.api.clone();
    let err = api
        .post_json::<_, Value>("/users", &json!({"username": "alice"}))
        .await
        .unwrap_err();
    assert_eq!(err.failure(), Failure::Coded(ErrorCode::UsernameAlreadyExists));

    let err = ctx.company.current().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(translate(&err), "upstream unavailable");
}

#[tokio::test]
async fn explicit_token_source_and_binary_bodies() {
    let server = TestServer::spawn().await;
    let api = ApiClient::new(server.base_url.clone(), std::time::Duration::from_secs(5))
        .unwrap()
        .with_token_source(Arc::new(StaticToken(TOKEN.to_string())));

    let branches: Value = api.get_json("/branches").await.unwrap();
    assert_eq!(branches.as_array().map(Vec::len), Some(2));

    let ctx = server.context();
    let image = ctx.items.image(ItemId::new(7)).await.unwrap();
    assert_eq!(image, vec![7, 1, 2, 3]);
}

#[tokio::test]
async fn health_check_sends_request_id() {
    let server = TestServer::spawn().await;
    let ctx = server.context();

    let status = ctx.health.check().await.unwrap();
    assert!(status.is_ok());
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApiClient::new(format!("http://{addr}"), std::time::Duration::from_secs(2)).unwrap();
    let err = api.get_json::<Value>("/health").await.unwrap_err();
    assert!(matches!(err.failure(), Failure::Transport(_)));
}

#[tokio::test]
async fn guard_uses_configured_landing() {
    let server = TestServer::spawn().await;
    let ctx = server.context();

    let guard = ctx.guard(Some("ADMIN".into()));
    assert_eq!(
        guard.evaluate(&ctx.session.snapshot()),
        itematic_client::GuardDecision::Redirect {
            to: "/login".to_string()
        }
    );

    ctx.session.login("alice", "pw").await.unwrap();
    assert_eq!(
        guard.evaluate(&ctx.session.snapshot()),
        itematic_client::GuardDecision::Render
    );
}

#[tokio::test]
async fn items_are_sent_as_multipart() {
    let server = TestServer::spawn().await;
    let ctx = server.context();
    ctx.session.login("alice", "pw").await.unwrap();

    let form = ItemForm {
        name: "Drill".to_string(),
        sku: "DRL01".to_string(),
        unit: "unit".to_string(),
        price: Some(19.5),
        image_url: Some("https://img.example/drill.png".to_string()),
        image: Some(ItemImage {
            file_name: "drill.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }),
        is_active: Some(false),
        ..ItemForm::default()
    };

    let created = ctx.items.create(form.clone()).await.unwrap();
    assert_eq!(created.sku, "DRL01");
    assert_eq!(
        server.last_body("POST /items"),
        Some(json!({"name": "Drill", "sku": "DRL01", "unit": "unit", "price": "19.5", "image": 3}))
    );

    let update = ItemForm { image: None, ..form };
    ctx.items.update(ItemId::new(4), update).await.unwrap();
    assert_eq!(
        server.last_body("PUT /items/4"),
        Some(json!({
            "name": "Drill",
            "sku": "DRL01",
            "unit": "unit",
            "price": "19.5",
            "image_url_form": "https://img.example/drill.png",
            "is_active": "false",
        }))
    );
}

#[tokio::test]
async fn user_updates_send_only_changed_fields() {
    let server = TestServer::spawn().await;
    let ctx = server.context();
    ctx.session.login("alice", "pw").await.unwrap();

    let update = AdminUserUpdate::default()
        .branch_if_changed(Some(BranchId::new(2)), None)
        .active_if_changed(Some(true), true);
    let account = ctx.users.admin_update(UserId::new(3), &update).await.unwrap();
    assert_eq!(account.branch_id, None);
    assert_eq!(server.last_body("PUT /users/3/admin"), Some(json!({"branch_id": null})));

    let own = UserUpdate {
        name: Some("Alicia".to_string()),
        ..UserUpdate::default()
    };
    ctx.users.update(UserId::new(1), &own).await.unwrap();
    assert_eq!(server.last_body("PUT /users/1"), Some(json!({"name": "Alicia"})));
}

#[tokio::test]
async fn branch_update_and_category_assignment() {
    let server = TestServer::spawn().await;
    let ctx = server.context();
    ctx.session.login("alice", "pw").await.unwrap();

    let input = BranchInput {
        name: "East".to_string(),
        address: "3 East St".to_string(),
    };
    let branch = ctx.branches.update(BranchId::new(3), &input).await.unwrap();
    assert_eq!(branch.name, "East");
    assert_eq!(
        server.last_body("PUT /branches/3"),
        Some(json!({"name": "East", "address": "3 East St"}))
    );

    ctx.categories
        .assign_to_item(ItemId::new(4), &[CategoryId::new(1), CategoryId::new(3)])
        .await
        .unwrap();
    assert_eq!(server.last_body("POST /items/4/categories"), Some(json!([1, 3])));

    let categories = ctx.categories.for_item(ItemId::new(4)).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].id, CategoryId::new(1));
}
