use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use rusty_library_catalog::adapters::memory::InMemoryCatalogStore;
use rusty_library_catalog::api::handlers::AppState;
use rusty_library_catalog::api::router::create_router;
use rusty_library_catalog::api::types::*;
use rusty_library_catalog::application::catalog::CatalogDependencies;
use rusty_library_catalog::domain::{Book, BookId, NewBook, SurrogateId};
use rusty_library_catalog::ports::catalog_store::{self, CatalogStore, StorageError, StoredPage};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// E2Eテスト用のアプリケーションセットアップ
///
/// インメモリのカタログストアと実際のAPIルーターを使用します。
/// テストごとに新しいストアを作るため、テスト間でデータは共有されません。
fn setup_e2e_app() -> axum::Router {
    let service_deps = CatalogDependencies {
        catalog_store: Arc::new(InMemoryCatalogStore::new()),
    };

    let app_state = Arc::new(AppState { service_deps });

    create_router(app_state)
}

/// 常に接続エラーを返すカタログストア
struct UnreachableCatalogStore;

fn connection_refused() -> StorageError {
    StorageError::Unavailable("connection refused (10.0.0.7:5432)".into())
}

#[async_trait::async_trait]
impl CatalogStore for UnreachableCatalogStore {
    async fn find_by_book_id(&self, _book_id: BookId) -> catalog_store::Result<Option<Book>> {
        Err(connection_refused())
    }

    async fn find_by_surrogate_id(
        &self,
        _surrogate_id: SurrogateId,
    ) -> catalog_store::Result<Option<Book>> {
        Err(connection_refused())
    }

    async fn insert(&self, _book: NewBook) -> catalog_store::Result<Book> {
        Err(connection_refused())
    }

    async fn update(&self, _book: &Book) -> catalog_store::Result<Book> {
        Err(connection_refused())
    }

    async fn delete(&self, _book: &Book) -> catalog_store::Result<()> {
        Err(connection_refused())
    }

    async fn list_all(&self) -> catalog_store::Result<Vec<Book>> {
        Err(connection_refused())
    }

    async fn list_page(&self, _offset: u64, _limit: u64) -> catalog_store::Result<StoredPage> {
        Err(connection_refused())
    }

    async fn search(&self, _query: &str) -> catalog_store::Result<Vec<Book>> {
        Err(connection_refused())
    }
}

/// ストアに到達できない状態のアプリケーション
fn setup_unreachable_app() -> axum::Router {
    let service_deps = CatalogDependencies {
        catalog_store: Arc::new(UnreachableCatalogStore),
    };

    create_router(Arc::new(AppState { service_deps }))
}

async fn read_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> axum::response::Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_book(app: &axum::Router, body: Value) -> BookResponse {
    let response = send(app, "POST", "/books", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

fn dune() -> Value {
    json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "isbn": "9780441013593",
        "publishedYear": 1965,
    })
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_full_book_flow() {
    let app = setup_e2e_app();

    // Step 1: 登録（POST /books）
    let response = send(&app, "POST", "/books", Some(dune())).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_string();
    let created: BookResponse = read_json(response).await;
    assert_eq!(location, format!("/books/{}", created.book_id));
    assert!(created.available);
    assert_eq!(created.published_year, Some(1965));

    // Step 2: 取得（GET /books/:id）
    let response = send(&app, "GET", &location, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: BookResponse = read_json(response).await;
    assert_eq!(fetched, created);

    // Step 3: 貸出可否の反転（PUT /books/:id/availability）
    let response = send(&app, "PUT", &format!("{}/availability", location), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let toggled: BookResponse = read_json(response).await;
    assert!(!toggled.available);

    // Step 4: 削除（DELETE /books/:id）
    let response = send(&app, "DELETE", &location, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Step 5: 削除後は404
    let response = send(&app, "GET", &location, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.status, 404);
    assert_eq!(error.message, "Book not found");
}

#[tokio::test]
async fn test_e2e_response_never_exposes_internal_fields() {
    let app = setup_e2e_app();
    create_book(&app, dune()).await;

    let response = send(&app, "GET", "/books", None).await;
    let books: Value = read_json(response).await;
    let book = books[0].as_object().unwrap();

    assert!(book.contains_key("bookId"));
    assert!(!book.contains_key("id"));
    assert!(!book.contains_key("surrogateId"));
    assert!(!book.contains_key("createdAt"));
    assert!(!book.contains_key("modifiedAt"));
}

#[tokio::test]
async fn test_e2e_client_supplied_book_id_is_ignored() {
    let app = setup_e2e_app();
    let supplied = "00000000-0000-4000-8000-000000000000";
    let mut body = dune();
    body["bookId"] = json!(supplied);

    let created = create_book(&app, body).await;

    assert_ne!(created.book_id, supplied);
}

#[tokio::test]
async fn test_e2e_partial_update() {
    let app = setup_e2e_app();
    let created = create_book(&app, dune()).await;
    let uri = format!("/books/{}", created.book_id);

    // available を false にしておく
    send(&app, "PUT", &format!("{}/availability", uri), None).await;

    let response = send(
        &app,
        "PUT",
        &uri,
        Some(json!({ "title": "Dune Messiah", "isbn": null })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated: BookResponse = read_json(response).await;
    assert_eq!(updated.book_id, created.book_id);
    assert_eq!(updated.title, "Dune Messiah");
    assert_eq!(updated.author, "Frank Herbert");
    assert_eq!(updated.isbn.as_deref(), Some("9780441013593"));
    assert_eq!(updated.published_year, Some(1965));
    assert!(!updated.available);
}

// ============================================================================
// E2Eテスト: 一覧・ページ・検索
// ============================================================================

#[tokio::test]
async fn test_e2e_list_page_and_search() {
    let app = setup_e2e_app();
    create_book(&app, json!({ "title": "The Hobbit", "author": "J.R.R. Tolkien" })).await;
    create_book(&app, dune()).await;
    for i in 0..3 {
        create_book(&app, json!({ "title": format!("Book {}", i), "author": "Someone" })).await;
    }

    // 全件
    let response = send(&app, "GET", "/books", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let all: Vec<BookResponse> = read_json(response).await;
    assert_eq!(all.len(), 5);

    // ページ
    let response = send(&app, "GET", "/books?page=0&size=2", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page: BookPageResponse = read_json(response).await;
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);

    let response = send(&app, "GET", "/books?page=10&size=2", None).await;
    let page: BookPageResponse = read_json(response).await;
    assert!(page.content.is_empty());
    assert_eq!(page.total_elements, 5);

    // 検索
    let response = send(&app, "GET", "/books?q=tolkien", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let found: Vec<BookResponse> = read_json(response).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "The Hobbit");

    // 空の q は全件にフォールバック
    let response = send(&app, "GET", "/books?q=", None).await;
    let fallback: Vec<BookResponse> = read_json(response).await;
    assert_eq!(fallback.len(), 5);
}

#[tokio::test]
async fn test_e2e_malformed_query_string_returns_error_body() {
    let app = setup_e2e_app();

    let response = send(&app, "GET", "/books?page=abc", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/json"));

    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.status, 400);
    assert_eq!(error.error, "BAD_REQUEST");
    assert!(!error.message.is_empty());
}

#[tokio::test]
async fn test_e2e_zero_page_size_is_bad_request() {
    let app = setup_e2e_app();

    let response = send(&app, "GET", "/books?page=0&size=0", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// E2Eテスト: エラーケース
// ============================================================================

#[tokio::test]
async fn test_e2e_create_with_invalid_isbn_is_bad_request() {
    let app = setup_e2e_app();
    let mut body = dune();
    body["isbn"] = json!("12345");

    let response = send(&app, "POST", "/books", Some(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.status, 400);
    assert_eq!(error.error, "VALIDATION_FAILED");
    assert!(error.message.starts_with("isbn:"));
}

#[tokio::test]
async fn test_e2e_create_without_author_is_bad_request() {
    let app = setup_e2e_app();

    let response = send(&app, "POST", "/books", Some(json!({ "title": "Dune" }))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.message, "author: must not be null");
}

#[tokio::test]
async fn test_e2e_malformed_body_is_bad_request() {
    let app = setup_e2e_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/books")
                .header("content-type", "application/json")
                .body(Body::from("{\"title\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "POST", "/books", Some(json!({ "publishedYear": "1965" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_e2e_unknown_book_returns_404() {
    let app = setup_e2e_app();
    let unknown = "6d3f4c8e-6b1a-4b9e-9a43-1f0e2a7c5d11";

    for (method, uri, body) in [
        ("GET", format!("/books/{}", unknown), None),
        ("PUT", format!("/books/{}", unknown), Some(json!({ "title": "X" }))),
        ("PUT", format!("/books/{}/availability", unknown), None),
        ("DELETE", format!("/books/{}", unknown), None),
        ("GET", "/books/not-a-uuid".to_string(), None),
    ] {
        let response = send(&app, method, &uri, body).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_e2e_update_with_invalid_field_is_bad_request() {
    let app = setup_e2e_app();
    let created = create_book(&app, dune()).await;

    let response = send(
        &app,
        "PUT",
        &format!("/books/{}", created.book_id),
        Some(json!({ "publishedYear": -1 })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_e2e_health_check() {
    let app = setup_e2e_app();

    let response = send(&app, "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// E2Eテスト: ストア障害
// ============================================================================

#[tokio::test]
async fn test_e2e_storage_failure_hides_internal_detail() {
    let app = setup_unreachable_app();
    let book_uri = "/books/6d3f4c8e-6b1a-4b9e-9a43-1f0e2a7c5d11";

    for (method, uri, body) in [
        ("GET", "/books".to_string(), None),
        ("GET", "/books?page=0&size=2".to_string(), None),
        ("GET", "/books?q=dune".to_string(), None),
        ("GET", book_uri.to_string(), None),
        ("POST", "/books".to_string(), Some(dune())),
        ("PUT", book_uri.to_string(), Some(json!({ "title": "X" }))),
        ("PUT", format!("{}/availability", book_uri), None),
        ("DELETE", book_uri.to_string(), None),
    ] {
        let response = send(&app, method, &uri, body).await;
        assert_eq!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "{} {}",
            method,
            uri
        );

        let text = read_text(response).await;
        assert!(!text.contains("10.0.0.7:5432"), "{} {}", method, uri);
        assert!(!text.contains("connection refused"), "{} {}", method, uri);

        let error: ErrorResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(error.status, 500);
        assert_eq!(error.error, "STORAGE_ERROR");
        assert_eq!(error.message, "Internal server error");
    }
}
