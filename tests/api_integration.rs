//! Resource Client integration tests.
//!
//! Starts an axum mock of the Kasi API and exercises the clients, list
//! view-model, mutation coordinator and form submission against it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use serde_json::{Value, json};

use kasi_manager::api::{
    ApiClient, AuthClient, Categories, FilesClient, Orders, Products, ResourceClient, UploadFile,
    UploadOptions,
};
use kasi_manager::errors::{ApiError, SubmitError};
use kasi_manager::form::category::CategoryDraft;
use kasi_manager::form::{FormViewModel, SUBMIT_FIELD};
use kasi_manager::list::criteria::{MatchAll, Unsorted};
use kasi_manager::list::{FetchOutcome, ListViewModel, LoadState};
use kasi_manager::models::product::{ProductFilter, ProductSort};
use kasi_manager::models::{FileRecord, Order, OrderStatus, Product, Record};
use kasi_manager::mutation::MutationCoordinator;
use kasi_manager::session::Session;

const TOKEN: &str = "tok-admin";

/// Requests the mock has seen, for asserting on what the client sent.
#[derive(Default)]
struct Seen {
    product_pages: Vec<String>,
    upload_body: Vec<u8>,
}

type Shared = Arc<Mutex<Seen>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Token expired"})),
    )
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let user = match (email, password) {
        ("admin@kasi.market", "secret1") => {
            json!({"_id": "u1", "email": email, "fullName": "Awa", "role": "admin", "isActive": true})
        }
        ("client@kasi.market", "secret1") => {
            json!({"_id": "u2", "email": email, "fullName": "Moussa", "role": "user", "isActive": true})
        }
        ("retired@kasi.market", "secret1") => {
            json!({"_id": "u3", "email": email, "fullName": "Ali", "role": "admin", "isActive": false})
        }
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Invalid credentials"})),
            );
        }
    };
    (
        StatusCode::OK,
        Json(json!({"access_token": TOKEN, "user": user})),
    )
}

async fn list_products(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let page = query.get("page").cloned().unwrap_or_default();
    seen.lock().unwrap().product_pages.push(page.clone());
    (
        StatusCode::OK,
        Json(json!({
            "products": [
                {"_id": "p1", "name": "Oud Royal", "price": 45000, "stock": 3,
                 "categories": [{"_id": "c1", "name": "Homme"}]},
                {"_id": "p2", "name": "bois de santal", "price": 30000, "stock": 0,
                 "categories": ["c2"]}
            ],
            "total": 12,
            "page": page.parse::<u32>().unwrap_or(1),
            "limit": 5
        })),
    )
}

async fn get_product(headers: HeaderMap, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    match id.as_str() {
        "p1" => (
            StatusCode::OK,
            Json(json!({"_id": "p1", "id": "p1", "name": "Oud Royal", "price": 45000})),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Product not found"})),
        ),
    }
}

async fn delete_product(headers: HeaderMap, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    match id.as_str() {
        "p-fail" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Database unavailable"})),
        ),
        _ => (StatusCode::OK, Json(json!({"message": "Product deleted"}))),
    }
}

async fn create_category(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["slug"] == "homme" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": ["slug must be unique"]})),
        );
    }
    let mut created = body.clone();
    created["_id"] = json!("c9");
    (StatusCode::CREATED, Json(created))
}

async fn list_orders() -> (StatusCode, Json<Value>) {
    unauthorized()
}

async fn order_status(Path(id): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "_id": id,
            "orderNumber": "CMD-0001",
            "status": body["status"],
            "statusHistory": [{"_id": "h1", "status": body["status"], "timestamp": "2026-10-01T10:00:00Z", "note": body["note"]}]
        })),
    )
}

async fn upload(State(seen): State<Shared>, body: Bytes) -> (StatusCode, &'static str) {
    seen.lock().unwrap().upload_body = body.to_vec();
    (StatusCode::CREATED, "OK")
}

async fn list_files(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let files: Vec<Value> = (0..12)
        .map(|i| json!({"_id": format!("f{}", i), "fileName": format!("f{}.jpg", i), "url": format!("/uploads/f{}.jpg", i)}))
        .collect();
    (StatusCode::OK, Json(json!({"files": files})))
}

/// Bind to port 0 and return the API base URL.
async fn start_server(seen: Shared) -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product).delete(delete_product))
        .route("/api/categories", post(create_category))
        .route("/api/orders", get(list_orders))
        .route("/api/orders/{id}/status", patch(order_status))
        .route("/api/file-management", get(list_files))
        .route("/api/file-management/upload", post(upload))
        .with_state(seen);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

async fn signed_in_client() -> (ApiClient, Shared) {
    let seen = Shared::default();
    let base = start_server(seen.clone()).await;
    let api = ApiClient::new(&base, None, None, Session::in_memory()).unwrap();
    AuthClient::new(api.clone())
        .login("admin@kasi.market", "secret1")
        .await
        .unwrap();
    (api, seen)
}

// =============================================================================
// Authentication
// =============================================================================

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_login_establishes_session() {
        let (api, _) = signed_in_client().await;
        assert!(api.session().is_authenticated());
        let user = api.session().current_user().unwrap();
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(user.role, "admin");
    }

    #[tokio::test]
    async fn test_login_rejects_non_admin_and_inactive() {
        let base = start_server(Shared::default()).await;
        let api = ApiClient::new(&base, None, None, Session::in_memory()).unwrap();
        let auth = AuthClient::new(api.clone());

        let err = auth.login("client@kasi.market", "secret1").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
        assert!(!api.session().is_authenticated());

        let err = auth.login("retired@kasi.market", "secret1").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
        assert!(!api.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_bad_credentials_surface_server_message() {
        let base = start_server(Shared::default()).await;
        let api = ApiClient::new(&base, None, None, Session::in_memory()).unwrap();
        let err = AuthClient::new(api)
            .login("admin@kasi.market", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_401_on_protected_call_tears_session_down() {
        let (api, _) = signed_in_client().await;
        let orders = ResourceClient::<Orders>::new(api.clone());

        let mut list: ListViewModel<Order, MatchAll, Unsorted> = ListViewModel::new(10);
        assert_eq!(list.load(&orders).await, FetchOutcome::Failed);
        assert_eq!(list.state(), LoadState::Errored);
        assert_eq!(list.error(), Some("Token expired"));
        assert!(!api.session().is_authenticated());

        // Subsequent calls fail locally without a token.
        let products = ResourceClient::<Products>::new(api);
        let err = products.get("p1").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_protected_call_without_session_fails_before_network() {
        let api = ApiClient::new("http://127.0.0.1:9/api", None, None, Session::in_memory()).unwrap();
        let err = ResourceClient::<Products>::new(api).get("p1").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }
}

// =============================================================================
// Lists and mutations
// =============================================================================

mod lists {
    use super::*;

    #[tokio::test]
    async fn test_list_normalizes_identity_and_reads_envelope() {
        let (api, _) = signed_in_client().await;
        let products = ResourceClient::<Products>::new(api);

        let mut list: ListViewModel<Product, ProductFilter, ProductSort> = ListViewModel::new(5);
        assert_eq!(list.load(&products).await, FetchOutcome::Applied);
        assert_eq!(list.state(), LoadState::Ready);
        assert_eq!(list.items().len(), 2);
        assert_eq!(list.total(), 12);
        assert_eq!(list.total_pages(), 3);
        assert_eq!(list.items()[0].id(), Some("p1"));
        assert_eq!(list.items()[0].categories[0].id(), Some("c1"));
        assert_eq!(list.items()[1].categories[0].id(), Some("c2"));
    }

    #[tokio::test]
    async fn test_sort_and_filter_are_local() {
        let (api, seen) = signed_in_client().await;
        let products = ResourceClient::<Products>::new(api);

        let mut list: ListViewModel<Product, ProductFilter, ProductSort> = ListViewModel::new(5);
        list.load(&products).await;

        list.set_sort(Some(ProductSort::Name));
        let names: Vec<&str> = list.visible_items().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["bois de santal", "Oud Royal"]);

        list.set_filter(ProductFilter {
            search: "OUD".into(),
            category: None,
        });
        assert_eq!(list.visible_items().count(), 1);
        assert_eq!(seen.lock().unwrap().product_pages.len(), 1);
        assert_eq!(list.page(), 1);
    }

    #[tokio::test]
    async fn test_set_page_is_clamped_before_request() {
        let (api, seen) = signed_in_client().await;
        let products = ResourceClient::<Products>::new(api);

        let mut list: ListViewModel<Product, MatchAll, Unsorted> = ListViewModel::new(5);
        list.load(&products).await;
        assert_eq!(list.set_page(10, &products).await, FetchOutcome::Applied);
        assert_eq!(list.page(), 3);
        assert_eq!(seen.lock().unwrap().product_pages, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_get_missing_record_is_not_found() {
        let (api, _) = signed_in_client().await;
        let products = ResourceClient::<Products>::new(api);

        assert_eq!(products.get("p1").await.unwrap().id(), Some("p1"));
        let err = products.get("p404").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Product not found.");
    }

    #[tokio::test]
    async fn test_bulk_delete_removes_only_confirmed_ids() {
        let (api, _) = signed_in_client().await;
        let products = ResourceClient::<Products>::new(api);

        let mut list: ListViewModel<Product, MatchAll, Unsorted> = ListViewModel::new(5);
        list.load(&products).await;

        let ids = vec!["p1".to_string(), "p-fail".to_string()];
        let outcome = MutationCoordinator::new(&mut list)
            .bulk_remove(&products, &ids)
            .await;

        assert!(!outcome.is_complete_success());
        assert_eq!(outcome.succeeded, vec!["p1".to_string()]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "p-fail");
        assert_eq!(outcome.failed[0].1.user_message(), "Database unavailable");

        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].id(), Some("p2"));
        assert_eq!(list.total(), 11);
    }

    #[tokio::test]
    async fn test_media_library_is_paged_locally() {
        let (api, _) = signed_in_client().await;
        let files = FilesClient::new(api);

        let mut list: ListViewModel<FileRecord, MatchAll, Unsorted> = ListViewModel::new(10);
        assert_eq!(list.load(&files).await, FetchOutcome::Applied);
        assert_eq!(list.visible_items().count(), 10);
        assert_eq!(list.total(), 12);
        assert_eq!(list.total_pages(), 2);

        assert_eq!(list.set_page(2, &files).await, FetchOutcome::Applied);
        assert_eq!(list.page(), 2);
        let ids: Vec<&str> = list.visible_items().filter_map(|f| f.id()).collect();
        assert_eq!(ids, vec!["f10", "f11"]);
    }

    #[tokio::test]
    async fn test_order_status_update_returns_record() {
        let (api, _) = signed_in_client().await;
        let orders = ResourceClient::<Orders>::new(api);

        let order = orders
            .update_status("o1", OrderStatus::Shipped, Some("  via DHL "))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.status_history[0].id.as_deref(), Some("h1"));
        assert_eq!(order.status_history[0].note.as_deref(), Some("via DHL"));
    }
}

// =============================================================================
// Forms and uploads
// =============================================================================

mod forms {
    use super::*;

    #[tokio::test]
    async fn test_server_rejection_lands_on_submit_field() {
        let (api, _) = signed_in_client().await;
        let categories = ResourceClient::<Categories>::new(api);

        let mut form = FormViewModel::create(CategoryDraft::default());
        form.set_field("name", "Homme").unwrap();
        form.set_field("slug", "homme").unwrap();

        let client = categories.clone();
        let err = form
            .submit(|_, payload| async move { client.create(&payload).await })
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Api(_)));
        assert_eq!(form.errors().get(SUBMIT_FIELD), Some("slug must be unique"));
        assert!(!form.is_busy());

        form.set_field("slug", "homme-2").unwrap();
        assert!(form.errors().get(SUBMIT_FIELD).is_none());
        let created = form
            .submit(|_, payload| async move { categories.create(&payload).await })
            .await
            .unwrap();
        assert_eq!(created.id(), Some("c9"));
        assert_eq!(created.slug, "homme-2");
    }

    #[tokio::test]
    async fn test_non_json_upload_ack_is_synthesized() {
        let (api, seen) = signed_in_client().await;
        let files = FilesClient::new(api);

        let file = UploadFile {
            file_name: "flacon.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };
        let options = UploadOptions {
            custom_filename: Some(" flacon-oud ".into()),
            is_public: false,
        };
        let record = files.upload(file, &options).await.unwrap();

        assert!(record.synthesized);
        assert_eq!(record.id(), None);
        assert_eq!(record.display_name(), "flacon-oud");
        assert!(!record.is_public);

        let body = String::from_utf8_lossy(&seen.lock().unwrap().upload_body).into_owned();
        assert!(body.contains("name=\"file\"; filename=\"flacon.png\""));
        assert!(body.contains("name=\"customFilename\""));
        assert!(body.contains("flacon-oud"));
        assert!(body.contains("name=\"isPublic\""));
    }
}
