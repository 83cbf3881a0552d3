use crate::application::catalog::{
    CatalogDependencies, get_book as execute_get_book, list_books as execute_list_books,
    list_books_page as execute_list_books_page, register_book as execute_register_book,
    remove_book as execute_remove_book, revise_book as execute_revise_book,
    search_books as execute_search_books, toggle_availability as execute_toggle_availability,
};
use crate::domain::{
    BookId,
    commands::{RegisterBook, RemoveBook, ReviseBook, ToggleAvailability},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{BookPageResponse, BookRequest, BookResponse, ListBooksQuery},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: CatalogDependencies,
}

/// パスの公開IDを解釈する
///
/// 形式が不正なIDに該当する書籍は存在しないため、404として扱う。
fn parse_book_id(raw: &str) -> Result<BookId, ApiError> {
    raw.parse::<BookId>()
        .map_err(|_| ApiError::UnknownBookId(raw.to_string()))
}

/// JSONボディを解釈する（不正なボディは400）
fn parse_body(body: Result<Json<BookRequest>, JsonRejection>) -> Result<BookRequest, ApiError> {
    body.map(|Json(req)| req)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// クエリ文字列を解釈する（不正な値は400）
fn parse_query(
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<ListBooksQuery, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /books - 書籍一覧
///
/// クエリパラメータ:
/// - q: タイトル・著者の部分一致検索（大文字小文字を区別しない）
/// - page, size: ページ取得（0始まり、size の既定値は20）
///
/// q が優先され、次にページ指定、どちらもなければ全件を返す。
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = parse_query(query)?;

    if let Some(q) = query.search_query() {
        let books = execute_search_books(&state.service_deps, q).await?;
        let body: Vec<BookResponse> = books.into_iter().map(BookResponse::from).collect();
        return Ok(Json(body).into_response());
    }

    if let Some(request) = query.page_request() {
        let page = execute_list_books_page(&state.service_deps, request).await?;
        return Ok(Json(BookPageResponse::from(page)).into_response());
    }

    let books = execute_list_books(&state.service_deps).await?;
    let body: Vec<BookResponse> = books.into_iter().map(BookResponse::from).collect();
    Ok(Json(body).into_response())
}

/// GET /books/:id - 公開IDで書籍を取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = parse_book_id(&book_id)?;
    let book = execute_get_book(&state.service_deps, book_id).await?;
    Ok(Json(BookResponse::from(book)))
}

// ============================================================================
// Command handlers (POST / PUT / DELETE)
// ============================================================================

/// POST /books - 書籍を登録
///
/// 201と、新しい書籍を指すLocationヘッダーを返す。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BookRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = parse_body(body)?;

    let cmd = RegisterBook {
        draft: req.into_draft(),
        requested_at: chrono::Utc::now(),
    };

    let book = execute_register_book(&state.service_deps, cmd).await?;
    let location = format!("/books/{}", book.book_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(BookResponse::from(book)),
    )
        .into_response())
}

/// PUT /books/:id - 書籍を部分更新
///
/// 指定されたフィールドのみ更新する。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
    body: Result<Json<BookRequest>, JsonRejection>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = parse_book_id(&book_id)?;
    let req = parse_body(body)?;

    let cmd = ReviseBook {
        book_id,
        draft: req.into_draft(),
        requested_at: chrono::Utc::now(),
    };

    let book = execute_revise_book(&state.service_deps, cmd).await?;
    Ok(Json(BookResponse::from(book)))
}

/// PUT /books/:id/availability - 貸出可否を反転
pub async fn toggle_availability(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = parse_book_id(&book_id)?;

    let cmd = ToggleAvailability {
        book_id,
        requested_at: chrono::Utc::now(),
    };

    let book = execute_toggle_availability(&state.service_deps, cmd).await?;
    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id - 書籍を削除
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let book_id = parse_book_id(&book_id)?;

    execute_remove_book(&state.service_deps, RemoveBook { book_id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
