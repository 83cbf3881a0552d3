use chrono::{DateTime, Utc};

use super::{BookDraft, BookId};

/// コマンド：書籍を登録する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBook {
    pub draft: BookDraft,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：書籍を部分更新する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviseBook {
    pub book_id: BookId,
    pub draft: BookDraft,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：貸出可否を反転する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleAvailability {
    pub book_id: BookId,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：書籍を削除する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveBook {
    pub book_id: BookId,
}
