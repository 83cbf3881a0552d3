use crate::domain::{Book, BookId, NewBook, SurrogateId};
use async_trait::async_trait;
use thiserror::Error;

/// ストレージのエラー
///
/// サービス層は「利用不可」と「制約違反」以上の原因を解釈しない。
#[derive(Debug, Error)]
pub enum StorageError {
    /// バックエンドに到達できない、または書き込みに失敗した
    #[error("Storage unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 一意制約などの制約違反
    #[error("Storage constraint violated: {0}")]
    ConstraintViolated(String),

    /// 更新・削除対象の行がすでに存在しない（同時削除による）
    #[error("Stored record no longer exists")]
    Missing,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// ページ取得の結果
///
/// `total`は範囲外のページでも全件数を返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    pub books: Vec<Book>,
    pub total: u64,
}

/// カタログストアポート
///
/// 書籍の永続化を抽象化する。ビジネスルールは持たない。
/// 各呼び出しはバックエンドに対して単一操作としてアトミックに実行される。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// 公開IDで書籍を検索する
    ///
    /// 主キーではなく公開IDのインデックスを経由する。
    async fn find_by_book_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// サロゲートキーで書籍を検索する
    async fn find_by_surrogate_id(&self, surrogate_id: SurrogateId) -> Result<Option<Book>>;

    /// 新しい書籍を挿入する
    ///
    /// サロゲートキーはここで採番される。公開IDは呼び出し側で採番済み。
    async fn insert(&self, book: NewBook) -> Result<Book>;

    /// サロゲートキーが一致する行を置き換える
    async fn update(&self, book: &Book) -> Result<Book>;

    /// 書籍を削除する（物理削除）
    async fn delete(&self, book: &Book) -> Result<()>;

    /// 全件を取得する
    ///
    /// 順序は保証しない（実装は挿入順を返す）。
    async fn list_all(&self) -> Result<Vec<Book>>;

    /// `offset`から最大`limit`件と全件数を取得する
    async fn list_page(&self, offset: u64, limit: u64) -> Result<StoredPage>;

    /// タイトルまたは著者に部分文字列を含む書籍を検索する（大文字小文字を区別しない）
    async fn search(&self, query: &str) -> Result<Vec<Book>>;
}
