use crate::domain::{Book, BookId, NewBook, SurrogateId};
use crate::ports::catalog_store::{
    CatalogStore as CatalogStoreTrait, Result, StorageError, StoredPage,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<SurrogateId, Book>,
    /// 公開ID → サロゲートキーのインデックス
    book_ids: HashMap<BookId, SurrogateId>,
}

/// CatalogStoreのインメモリ実装
///
/// 行はサロゲートキー順に保持するため、走査は挿入順になる。
/// サロゲートキーの採番は単調増加で、削除後も再利用しない。
/// 全操作を単一のMutexで直列化する（後勝ち）。
pub struct CatalogStore {
    state: Mutex<State>,
}

impl CatalogStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string().into()))
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_ignore_case(book: &Book, needle: &str) -> bool {
    book.title.to_lowercase().contains(needle) || book.author.to_lowercase().contains(needle)
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn find_by_book_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let state = self.lock()?;
        Ok(state
            .book_ids
            .get(&book_id)
            .and_then(|surrogate_id| state.rows.get(surrogate_id))
            .cloned())
    }

    async fn find_by_surrogate_id(&self, surrogate_id: SurrogateId) -> Result<Option<Book>> {
        let state = self.lock()?;
        Ok(state.rows.get(&surrogate_id).cloned())
    }

    async fn insert(&self, book: NewBook) -> Result<Book> {
        let mut state = self.lock()?;

        if state.book_ids.contains_key(&book.book_id) {
            return Err(StorageError::ConstraintViolated(format!(
                "duplicate book_id {}",
                book.book_id
            )));
        }

        state.next_id += 1;
        let surrogate_id = SurrogateId::from_i64(state.next_id);
        let stored = book.persisted(surrogate_id);
        state.rows.insert(surrogate_id, stored.clone());
        state.book_ids.insert(stored.book_id, surrogate_id);

        Ok(stored)
    }

    async fn update(&self, book: &Book) -> Result<Book> {
        let mut state = self.lock()?;
        let row = state
            .rows
            .get_mut(&book.surrogate_id)
            .ok_or(StorageError::Missing)?;

        if row.book_id != book.book_id {
            return Err(StorageError::ConstraintViolated(
                "book_id is immutable".to_string(),
            ));
        }

        *row = book.clone();
        Ok(book.clone())
    }

    async fn delete(&self, book: &Book) -> Result<()> {
        let mut state = self.lock()?;
        let removed = state
            .rows
            .remove(&book.surrogate_id)
            .ok_or(StorageError::Missing)?;
        state.book_ids.remove(&removed.book_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Book>> {
        let state = self.lock()?;
        Ok(state.rows.values().cloned().collect())
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<StoredPage> {
        let state = self.lock()?;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(StoredPage {
            books: state.rows.values().skip(skip).take(take).cloned().collect(),
            total: state.rows.len() as u64,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<Book>> {
        let state = self.lock()?;
        let needle = query.to_lowercase();
        Ok(state
            .rows
            .values()
            .filter(|b| contains_ignore_case(b, &needle))
            .cloned()
            .collect())
    }
}
