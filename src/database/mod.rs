pub mod connection;
pub mod quiz_items;

use crate::date_provider::{DateProvider, SystemDateProvider};
use crate::error::Result as QuizResult;
use crate::geometry::BoundingBox;
use crate::quiz_item::{GameMode, GeometryType, QuizItem};
use chrono::{DateTime, Local};
use rusqlite::{Connection, Result};
use std::sync::Arc;

pub use quiz_items::QuizItemsRepository;

/// Main Database struct providing access to all repositories
pub struct Database {
    pub conn: Connection,
    date_provider: Arc<dyn DateProvider>,
}

impl Database {
    pub fn new(db_path: &str) -> QuizResult<Self> {
        Self::init(db_path, Arc::new(SystemDateProvider))
    }

    pub fn with_date_provider(
        db_path: &str,
        date_provider: Arc<dyn DateProvider>,
    ) -> QuizResult<Self> {
        Self::init(db_path, date_provider)
    }

    fn init(db_path: &str, date_provider: Arc<dyn DateProvider>) -> QuizResult<Self> {
        let conn = connection::init_connection(db_path)?;
        Ok(Database {
            conn,
            date_provider,
        })
    }

    /// Current time according to the configured date provider
    pub fn current_time(&self) -> DateTime<Local> {
        self.date_provider.get_current_time()
    }

    // ===== Quiz Items Repository Access =====

    pub fn insert_quiz_item(&self, item: &QuizItem) -> Result<()> {
        let repo = QuizItemsRepository::new(&self.conn);
        repo.insert(item)
    }

    /// Inserts all items or none of them
    pub fn insert_quiz_items(&self, items: &[QuizItem]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let repo = QuizItemsRepository::new(&tx);
        for item in items {
            repo.insert(item)?;
        }
        tx.commit()?;
        Ok(items.len())
    }

    /// Persists content and both mastery records of an existing item
    pub fn save_quiz_item(&self, item: &QuizItem) -> Result<()> {
        let repo = QuizItemsRepository::new(&self.conn);
        repo.update(item)
    }

    pub fn get_quiz_item(&self, id: &str) -> Result<Option<QuizItem>> {
        let repo = QuizItemsRepository::new(&self.conn);
        repo.get(id)
    }

    pub fn get_all_quiz_items(&self) -> Result<Vec<QuizItem>> {
        let repo = QuizItemsRepository::new(&self.conn);
        repo.get_all()
    }

    pub fn get_nearby_quiz_items(
        &self,
        geometry_type: GeometryType,
        exclude_id: &str,
        bounds: &BoundingBox,
        limit: usize,
    ) -> Result<Vec<QuizItem>> {
        let repo = QuizItemsRepository::new(&self.conn);
        repo.get_nearby(geometry_type, exclude_id, bounds, limit)
    }

    pub fn count_quiz_items(&self) -> Result<i64> {
        let repo = QuizItemsRepository::new(&self.conn);
        repo.count()
    }

    /// Items due for `mode` at the provider's current time
    pub fn get_due_items(&self, mode: GameMode) -> Result<Vec<QuizItem>> {
        let now = self.current_time().timestamp_millis();
        let repo = QuizItemsRepository::new(&self.conn);
        repo.get_due(mode, now)
    }

    pub fn count_due_items(&self, mode: GameMode) -> Result<i64> {
        let now = self.current_time().timestamp_millis();
        let repo = QuizItemsRepository::new(&self.conn);
        repo.count_due(mode, now)
    }
}
