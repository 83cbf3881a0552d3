use crate::domain::{Book, BookCore, BookId, NewBook, SurrogateId};
use crate::ports::catalog_store::{
    CatalogStore as CatalogStoreTrait, Result, StorageError, StoredPage,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

/// SELECT句で共通に使う列
const BOOK_COLUMNS: &str = r#"
    id,
    book_id,
    title,
    author,
    isbn,
    published_year,
    available,
    created_at,
    modified_at
"#;

/// sqlxのエラーをStorageErrorに変換する
///
/// 一意制約違反のみ区別し、それ以外はすべて利用不可として扱う。
fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() || db.is_check_violation() {
            return StorageError::ConstraintViolated(db.message().to_string());
        }
    }
    StorageError::Unavailable(Box::new(err))
}

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        surrogate_id: SurrogateId::from_i64(row.get("id")),
        core: BookCore {
            book_id: BookId::from_uuid(row.get("book_id")),
            title: row.get("title"),
            author: row.get("author"),
            isbn: row.get("isbn"),
            published_year: row.get("published_year"),
            available: row.get("available"),
            created_at: row.get("created_at"),
            modified_at: row.get("modified_at"),
        },
    }
}

/// LIKE パターンのメタ文字をエスケープする
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// u64をBIGINTの範囲に丸める
fn to_bigint(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// CatalogStoreのPostgreSQL実装
///
/// `books`テーブルの`id`（IDENTITY列）をサロゲートキー、
/// 一意インデックス付きの`book_id`を公開IDとして扱う。
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    /// PostgreSQLコネクションプールから新しいCatalogStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    /// 公開IDで書籍を取得（book_idの一意インデックスを使用）
    async fn find_by_book_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM books WHERE book_id = $1",
            BOOK_COLUMNS
        ))
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn find_by_surrogate_id(&self, surrogate_id: SurrogateId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(surrogate_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    /// 書籍を挿入し、採番されたサロゲートキー付きで返す
    ///
    /// 時刻は保存後の値（マイクロ秒精度）を返すため、以降の読み取りと一致する。
    async fn insert(&self, book: NewBook) -> Result<Book> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO books (
                book_id,
                title,
                author,
                isbn,
                published_year,
                available,
                created_at,
                modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_year)
        .bind(book.available)
        .bind(book.created_at)
        .bind(book.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(map_row_to_book(&row))
    }

    /// サロゲートキーが一致する行を上書き（後勝ち）
    ///
    /// book_id と created_at は更新対象に含めない。
    async fn update(&self, book: &Book) -> Result<Book> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE books
            SET
                title = $2,
                author = $3,
                isbn = $4,
                published_year = $5,
                available = $6,
                modified_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.surrogate_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.published_year)
        .bind(book.available)
        .bind(book.modified_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref()
            .map(map_row_to_book)
            .ok_or(StorageError::Missing)
    }

    async fn delete(&self, book: &Book) -> Result<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book.surrogate_id.value())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Missing);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!("SELECT {} FROM books ORDER BY id ASC", BOOK_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }

    /// 件数とページを同一トランザクションで取得する
    async fn list_page(&self, offset: u64, limit: u64) -> Result<StoredPage> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM books ORDER BY id ASC LIMIT $1 OFFSET $2",
            BOOK_COLUMNS
        ))
        .bind(to_bigint(limit))
        .bind(to_bigint(offset))
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(StoredPage {
            books: rows.iter().map(map_row_to_book).collect(),
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    /// タイトル・著者の部分一致検索（ILIKE）
    async fn search(&self, query: &str) -> Result<Vec<Book>> {
        let pattern = format!("%{}%", escape_like(query));

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM books
            WHERE title ILIKE $1 ESCAPE '\' OR author ILIKE $1 ESCAPE '\'
            ORDER BY id ASC
            "#,
            BOOK_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }
}
