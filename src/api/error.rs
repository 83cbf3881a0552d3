use crate::application::catalog::CatalogApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーとリクエストの解釈エラーを、HTTPレスポンスへマッピングする。
#[derive(Debug)]
pub enum ApiError {
    /// アプリケーション層のエラー
    Application(CatalogApplicationError),
    /// リクエストボディ・クエリが解釈できない
    BadRequest(String),
    /// パスの公開IDが書籍IDとして解釈できない（該当する書籍は存在し得ない）
    UnknownBookId(String),
}

impl From<CatalogApplicationError> for ApiError {
    fn from(err: CatalogApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 400 Bad Request - 入力が不正
            ApiError::Application(CatalogApplicationError::ValidationFailed(ref e)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", e.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),

            // 404 Not Found - リクエストされた書籍が存在しない
            ApiError::Application(CatalogApplicationError::BookNotFound(_))
            | ApiError::UnknownBookId(_) => (
                StatusCode::NOT_FOUND,
                "BOOK_NOT_FOUND",
                "Book not found".to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Application(CatalogApplicationError::StorageError(ref e)) => {
                tracing::error!(error = ?e, "Catalog store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(status.as_u16(), error_type, message));
        (status, body).into_response()
    }
}
