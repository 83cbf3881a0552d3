use crate::domain::{self, BookId, commands::*, validation};
use crate::ports::CatalogStore;
use std::sync::Arc;

use super::errors::{CatalogApplicationError, Result};
use super::views::{BookPage, BookView, PageRequest};

/// サービスの依存関係
///
/// 振る舞いは持たず、各関数に明示的に渡す。
/// サービスは呼び出しをまたいで書籍を保持しないため、
/// 任意の数のタスクから同時に呼び出してよい。
#[derive(Clone)]
pub struct CatalogDependencies {
    pub catalog_store: Arc<dyn CatalogStore>,
}

/// 公開IDで書籍を読み込むヘルパー関数
///
/// # エラー
/// - StorageError: 読み込み失敗
/// - BookNotFound: 該当する書籍がない
async fn load_book(
    catalog_store: &Arc<dyn CatalogStore>,
    book_id: BookId,
) -> Result<domain::Book> {
    catalog_store
        .find_by_book_id(book_id)
        .await
        .map_err(CatalogApplicationError::StorageError)?
        .ok_or(CatalogApplicationError::BookNotFound(book_id))
}

// ============================================================================
// Query
// ============================================================================

/// 全書籍を取得する（順序は保証しない）
pub async fn list_books(deps: &CatalogDependencies) -> Result<Vec<BookView>> {
    let books = deps
        .catalog_store
        .list_all()
        .await
        .map_err(CatalogApplicationError::StorageError)?;

    tracing::debug!(count = books.len(), "Listed books");
    Ok(books.into_iter().map(BookView::from).collect())
}

/// 書籍をページ単位で取得する
///
/// ページ番号は0始まり。範囲外のページは空のページと全件数を返す（エラーではない）。
///
/// # エラー
/// - ValidationFailed: ページサイズが0
pub async fn list_books_page(deps: &CatalogDependencies, request: PageRequest) -> Result<BookPage> {
    validation::validate_page_size(request.size)?;

    let stored = deps
        .catalog_store
        .list_page(request.offset(), request.size)
        .await
        .map_err(CatalogApplicationError::StorageError)?;

    tracing::debug!(
        page = request.page,
        size = request.size,
        total = stored.total,
        "Listed book page"
    );

    Ok(BookPage {
        books: stored.books.into_iter().map(BookView::from).collect(),
        page: request.page,
        size: request.size,
        total: stored.total,
    })
}

/// タイトルまたは著者の部分一致で検索する（大文字小文字を区別しない）
///
/// # エラー
/// - ValidationFailed: クエリが空白のみ
pub async fn search_books(deps: &CatalogDependencies, query: &str) -> Result<Vec<BookView>> {
    validation::validate_query(query)?;

    let books = deps
        .catalog_store
        .search(query)
        .await
        .map_err(CatalogApplicationError::StorageError)?;

    tracing::debug!(query, count = books.len(), "Searched books");
    Ok(books.into_iter().map(BookView::from).collect())
}

/// 公開IDで書籍を取得する
pub async fn get_book(deps: &CatalogDependencies, book_id: BookId) -> Result<BookView> {
    let book = load_book(&deps.catalog_store, book_id).await?;
    Ok(BookView::from(book))
}

// ============================================================================
// Command
// ============================================================================

/// 書籍を登録する
///
/// ビジネスルール：
/// - 公開IDはここで生成する（利用者の指定は受け付けない）
/// - available が未指定なら true
/// - 制約表の検査はストレージへのアクセスより前に行う
pub async fn register_book(deps: &CatalogDependencies, cmd: RegisterBook) -> Result<BookView> {
    // 1. ドメイン層の純粋関数を呼び出し（検査・採番・既定値）
    let new_book = domain::book::register_book(cmd.draft, cmd.requested_at)?;

    // 2. ストアに挿入（サロゲートキーはストアが採番）
    let book = deps
        .catalog_store
        .insert(new_book)
        .await
        .map_err(CatalogApplicationError::StorageError)?;

    tracing::info!(book_id = %book.book_id, "Book registered");
    Ok(BookView::from(book))
}

/// 書籍を部分更新する
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 指定されたフィールドのみ上書きする（未指定は既存値を維持）
/// - available の未指定は「変更なし」であり true へのリセットではない
pub async fn revise_book(deps: &CatalogDependencies, cmd: ReviseBook) -> Result<BookView> {
    // 1. 既存の書籍を読み込む
    let book = load_book(&deps.catalog_store, cmd.book_id).await?;

    // 2. ドメイン層でマージ
    let revised = domain::book::revise_book(book, cmd.draft, cmd.requested_at)?;

    // 3. ストアを更新（後勝ち）
    let book = deps
        .catalog_store
        .update(&revised)
        .await
        .map_err(CatalogApplicationError::from_storage(cmd.book_id))?;

    tracing::info!(book_id = %book.book_id, "Book revised");
    Ok(BookView::from(book))
}

/// 貸出可否を反転する
pub async fn toggle_availability(
    deps: &CatalogDependencies,
    cmd: ToggleAvailability,
) -> Result<BookView> {
    let book = load_book(&deps.catalog_store, cmd.book_id).await?;

    let toggled = domain::book::toggle_availability(book, cmd.requested_at);

    let book = deps
        .catalog_store
        .update(&toggled)
        .await
        .map_err(CatalogApplicationError::from_storage(cmd.book_id))?;

    tracing::info!(
        book_id = %book.book_id,
        available = book.available,
        "Book availability toggled"
    );
    Ok(BookView::from(book))
}

/// 書籍を削除する（物理削除）
///
/// 削除した書籍の公開IDが再び割り当てられることはない。
pub async fn remove_book(deps: &CatalogDependencies, cmd: RemoveBook) -> Result<()> {
    let book = load_book(&deps.catalog_store, cmd.book_id).await?;

    deps.catalog_store
        .delete(&book)
        .await
        .map_err(CatalogApplicationError::from_storage(cmd.book_id))?;

    tracing::info!(book_id = %cmd.book_id, "Book removed");
    Ok(())
}
