use chrono::{DateTime, Utc};

use crate::domain::{Book, BookId};

/// 書籍ビュー
///
/// サービスが呼び出し側に返す書籍の形。サロゲートキーは含まない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookView {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        let core = book.core;
        Self {
            book_id: core.book_id,
            title: core.title,
            author: core.author,
            isbn: core.isbn,
            published_year: core.published_year,
            available: core.available,
            created_at: core.created_at,
            modified_at: core.modified_at,
        }
    }
}

/// ページ要求（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    /// 既定のページサイズ
    pub const DEFAULT_SIZE: u64 = 20;

    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    /// 先頭からの読み飛ばし件数
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// 書籍のページ
///
/// 範囲外のページでは`books`が空になり、`total`は全件数のまま。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub books: Vec<BookView>,
    pub page: u64,
    pub size: u64,
    pub total: u64,
}

impl BookPage {
    /// 総ページ数
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(self.size)
    }
}
