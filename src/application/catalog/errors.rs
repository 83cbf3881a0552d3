use crate::domain::{BookId, ValidationError};
use crate::ports::StorageError;
use thiserror::Error;

/// カタログ管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogApplicationError {
    /// 入力が制約に違反している（違反したフィールドを含む）
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// 指定された公開IDの書籍が存在しない
    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    /// ストレージのエラー（再試行せずにそのまま返す）
    #[error("Storage error")]
    StorageError(#[source] StorageError),
}

impl CatalogApplicationError {
    /// 特定の書籍に対する操作のストレージエラーを変換する
    ///
    /// 対象行が消えていた場合（同時削除）は BookNotFound として扱う。
    pub(super) fn from_storage(book_id: BookId) -> impl Fn(StorageError) -> Self {
        move |err| match err {
            StorageError::Missing => CatalogApplicationError::BookNotFound(book_id),
            other => CatalogApplicationError::StorageError(other),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CatalogApplicationError>;
