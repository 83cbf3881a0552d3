use chrono::{DateTime, Utc};

use super::{
    BookId, SurrogateId,
    validation::{Mode, Rule, ValidationError, field, validate_draft},
};

// ============================================================================
// 入力
// ============================================================================

/// 書籍ドラフト - 登録・更新時に利用者が指定するフィールド
///
/// `None`は「指定なし」を意味する。
/// 登録時は既定値が適用され、更新時は既存の値がそのまま残る。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
    pub available: Option<bool>,
}

// ============================================================================
// エンティティ
// ============================================================================

/// 書籍の共通フィールド
///
/// 永続化前（NewBook）と永続化後（Book）で共有されるデータ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCore {
    // 公開識別子
    pub book_id: BookId,

    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
    pub available: bool,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl BookCore {
    /// 変更時刻を更新する
    ///
    /// modified_at は単調非減少で、created_at を下回らない。
    fn touch(&mut self, at: DateTime<Utc>) {
        self.modified_at = at.max(self.modified_at);
    }
}

/// 未永続化の書籍
///
/// 公開IDは採番済みだが、サロゲートキーはまだない。
/// ストレージへの挿入でのみ`Book`になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub core: BookCore,
}

impl std::ops::Deref for NewBook {
    type Target = BookCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 永続化済みの書籍
///
/// サロゲートキーはストレージ内部の行キーで、作成後に変わらない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub surrogate_id: SurrogateId,
    pub core: BookCore,
}

impl std::ops::Deref for Book {
    type Target = BookCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

impl NewBook {
    /// ストレージが採番したサロゲートキーを付与する
    pub fn persisted(self, surrogate_id: SurrogateId) -> Book {
        Book {
            surrogate_id,
            core: self.core,
        }
    }
}

// ============================================================================
// ドメインロジック（純粋関数）
// ============================================================================

/// 書籍を登録する
///
/// ビジネスルール：
/// - title, author は必須
/// - 公開IDはここで一度だけ生成する（利用者からは受け付けない）
/// - available の既定値は true
/// - created_at = modified_at = registered_at
///
/// # エラー
/// 制約表の最初の違反を`ValidationError`として返す
pub fn register_book(
    draft: BookDraft,
    registered_at: DateTime<Utc>,
) -> Result<NewBook, ValidationError> {
    validate_draft(&draft, Mode::Create)?;

    let title = draft
        .title
        .ok_or(ValidationError::new(field::TITLE, Rule::Required))?;
    let author = draft
        .author
        .ok_or(ValidationError::new(field::AUTHOR, Rule::Required))?;

    Ok(NewBook {
        core: BookCore {
            book_id: BookId::new(),
            title,
            author,
            isbn: draft.isbn,
            published_year: draft.published_year,
            available: draft.available.unwrap_or(true),
            created_at: registered_at,
            modified_at: registered_at,
        },
    })
}

/// 書籍を部分更新する
///
/// 指定されたフィールドのみ上書きする（マージであり置換ではない）。
/// 公開ID・サロゲートキー・created_at は変更しない。
pub fn revise_book(
    book: Book,
    draft: BookDraft,
    revised_at: DateTime<Utc>,
) -> Result<Book, ValidationError> {
    validate_draft(&draft, Mode::Update)?;

    let mut book = book;
    let core = &mut book.core;

    if let Some(title) = draft.title {
        core.title = title;
    }
    if let Some(author) = draft.author {
        core.author = author;
    }
    if let Some(isbn) = draft.isbn {
        core.isbn = Some(isbn);
    }
    if let Some(year) = draft.published_year {
        core.published_year = Some(year);
    }
    if let Some(available) = draft.available {
        core.available = available;
    }
    core.touch(revised_at);

    Ok(book)
}

/// 貸出可否を反転する
pub fn toggle_availability(book: Book, toggled_at: DateTime<Utc>) -> Book {
    let mut book = book;
    book.core.available = !book.core.available;
    book.core.touch(toggled_at);
    book
}
