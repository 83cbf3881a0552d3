use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::catalog::{BookPage, BookView, PageRequest};
use crate::domain::BookDraft;

/// 書籍一覧取得のクエリパラメータ
///
/// - q: 検索クエリ（空白以外が指定されていれば検索を優先）
/// - page, size: どちらかが指定されていればページ取得
#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl ListBooksQuery {
    /// 空白以外の検索クエリ
    pub fn search_query(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.trim().is_empty())
    }

    /// ページ指定があればページ要求に変換する
    pub fn page_request(&self) -> Option<PageRequest> {
        if self.page.is_none() && self.size.is_none() {
            return None;
        }
        Some(PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(PageRequest::DEFAULT_SIZE),
        ))
    }
}

/// 書籍の登録・更新リクエスト（POST /books, PUT /books/:id）
///
/// すべて省略可能。`null`は省略と同じ扱い。
/// 公開IDのフィールドは持たない（指定されても無視される）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
    pub available: Option<bool>,
}

impl BookRequest {
    pub fn into_draft(self) -> BookDraft {
        BookDraft {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            published_year: self.published_year,
            available: self.available,
        }
    }
}

/// 書籍レスポンス
///
/// サロゲートキーとタイムスタンプは含めない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
    pub available: bool,
}

impl From<BookView> for BookResponse {
    fn from(view: BookView) -> Self {
        Self {
            book_id: view.book_id.to_string(),
            title: view.title,
            author: view.author,
            isbn: view.isbn,
            published_year: view.published_year,
            available: view.available,
        }
    }
}

/// 書籍ページレスポンス（GET /books?page&size）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPageResponse {
    pub content: Vec<BookResponse>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl From<BookPage> for BookPageResponse {
    fn from(page: BookPage) -> Self {
        let total_pages = page.total_pages();
        Self {
            content: page.books.into_iter().map(BookResponse::from).collect(),
            page: page.page,
            size: page.size,
            total_elements: page.total,
            total_pages,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status,
            error: error.into(),
            message: message.into(),
        }
    }
}
