use crate::geometry::BoundingBox;
use crate::quiz_item::{GameMode, GeometryType, QuizItem};
use crate::row_factories::{QUIZ_ITEM_COLUMNS, QuizItemRowFactory};
use log::debug;
use rusqlite::{Connection, Result, params};

pub struct QuizItemsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> QuizItemsRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        QuizItemsRepository { conn }
    }

    pub fn insert(&self, item: &QuizItem) -> Result<()> {
        debug!("Inserting quiz item id={} ({})", item.id, item.name);
        self.conn.execute(
            &format!(
                "INSERT INTO quiz_items ({})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                         ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                QUIZ_ITEM_COLUMNS
            ),
            params![
                item.id,
                item.name,
                item.description,
                item.image_name,
                item.latitude,
                item.longitude,
                item.geometry_type.as_str(),
                item.geometry_data,
                item.min_zoom,
                item.max_zoom,
                item.base_radius,
                item.map_mastery.next_review_date,
                item.map_mastery.interval,
                item.map_mastery.ease_factor,
                item.map_mastery.successful_reviews,
                item.image_mastery.next_review_date,
                item.image_mastery.interval,
                item.image_mastery.ease_factor,
                item.image_mastery.successful_reviews,
            ],
        )?;
        Ok(())
    }

    /// Overwrites every column of the row with the same id
    pub fn update(&self, item: &QuizItem) -> Result<()> {
        debug!(
            "Updating quiz item id={}: map(streak={}, interval={}, ease={:.2}) image(streak={}, interval={}, ease={:.2})",
            item.id,
            item.map_mastery.successful_reviews,
            item.map_mastery.interval,
            item.map_mastery.ease_factor,
            item.image_mastery.successful_reviews,
            item.image_mastery.interval,
            item.image_mastery.ease_factor,
        );
        self.conn.execute(
            "UPDATE quiz_items
             SET name = ?2, description = ?3, image_name = ?4, latitude = ?5, longitude = ?6,
                 geometry_type = ?7, geometry_data = ?8, min_zoom = ?9, max_zoom = ?10,
                 base_radius = ?11,
                 map_next_review_date = ?12, map_interval = ?13, map_ease_factor = ?14,
                 map_successful_reviews = ?15,
                 image_next_review_date = ?16, image_interval = ?17, image_ease_factor = ?18,
                 image_successful_reviews = ?19
             WHERE id = ?1",
            params![
                item.id,
                item.name,
                item.description,
                item.image_name,
                item.latitude,
                item.longitude,
                item.geometry_type.as_str(),
                item.geometry_data,
                item.min_zoom,
                item.max_zoom,
                item.base_radius,
                item.map_mastery.next_review_date,
                item.map_mastery.interval,
                item.map_mastery.ease_factor,
                item.map_mastery.successful_reviews,
                item.image_mastery.next_review_date,
                item.image_mastery.interval,
                item.image_mastery.ease_factor,
                item.image_mastery.successful_reviews,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<QuizItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM quiz_items WHERE id = ?1",
            QUIZ_ITEM_COLUMNS
        ))?;

        let mut rows = stmt.query([id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(QuizItemRowFactory::from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn get_all(&self) -> Result<Vec<QuizItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM quiz_items ORDER BY id",
            QUIZ_ITEM_COLUMNS
        ))?;
        let items = stmt.query_map([], QuizItemRowFactory::from_row)?;
        items.collect()
    }

    /// Items whose mastery record for `mode` is due at `now_millis`, most overdue first
    pub fn get_due(&self, mode: GameMode, now_millis: i64) -> Result<Vec<QuizItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {columns} FROM quiz_items
             WHERE {due} <= ?1
             ORDER BY {due} ASC, id ASC",
            columns = QUIZ_ITEM_COLUMNS,
            due = next_review_column(mode),
        ))?;

        let items = stmt.query_map([now_millis], QuizItemRowFactory::from_row)?;

        let mut result = Vec::new();
        for item in items {
            result.push(item?);
        }

        debug!(
            "Retrieved {} due {} item(s) from database",
            result.len(),
            mode.as_str()
        );
        Ok(result)
    }

    pub fn count_due(&self, mode: GameMode, now_millis: i64) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM quiz_items WHERE {} <= ?1",
                next_review_column(mode)
            ),
            [now_millis],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Items of `geometry_type` inside `bounds`, other than `exclude_id`
    pub fn get_nearby(
        &self,
        geometry_type: GeometryType,
        exclude_id: &str,
        bounds: &BoundingBox,
        limit: usize,
    ) -> Result<Vec<QuizItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM quiz_items
             WHERE geometry_type = ?1 AND id != ?2
               AND latitude BETWEEN ?3 AND ?4
               AND longitude BETWEEN ?5 AND ?6
             ORDER BY id
             LIMIT ?7",
            QUIZ_ITEM_COLUMNS
        ))?;

        let items = stmt.query_map(
            params![
                geometry_type.as_str(),
                exclude_id,
                bounds.min_lat,
                bounds.max_lat,
                bounds.min_lon,
                bounds.max_lon,
                limit as i64,
            ],
            QuizItemRowFactory::from_row,
        )?;
        items.collect()
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quiz_items", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn next_review_column(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Map => "map_next_review_date",
        GameMode::Image => "image_next_review_date",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::init_connection;
    use crate::geometry::GeoPoint;
    use crate::spaced_repetition::MasteryState;

    fn create_test_db() -> Connection {
        init_connection(":memory:").expect("Failed to create test database")
    }

    fn due_at(millis: i64) -> MasteryState {
        MasteryState {
            next_review_date: millis,
            ..MasteryState::default()
        }
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let conn = create_test_db();
        let repo = QuizItemsRepository::new(&conn);

        let mut item = QuizItem::new("embankment", "Embankment", 55.7301, 36.8502);
        item.geometry_type = GeometryType::Line;
        item.geometry_data = "[[55.73,36.85],[55.731,36.86]]".to_string();
        item.image_name = Some("embankment.jpg".to_string());
        item.description = "Kind: street, Group: center. ".to_string();
        item.min_zoom = 16.0;
        item.base_radius = 80;
        item.map_mastery = MasteryState {
            next_review_date: 1_741_600_000_123,
            interval: 15,
            ease_factor: 2.36,
            successful_reviews: 3,
        };

        repo.insert(&item).unwrap();

        assert_eq!(repo.get("embankment").unwrap(), Some(item));
    }

    #[test]
    fn test_get_nonexistent_item() {
        let conn = create_test_db();
        let repo = QuizItemsRepository::new(&conn);
        assert_eq!(repo.get("missing").unwrap(), None);
    }

    #[test]
    fn test_insert_duplicate_id_fails() {
        let conn = create_test_db();
        let repo = QuizItemsRepository::new(&conn);
        let item = QuizItem::new("a", "A", 55.0, 36.0);

        repo.insert(&item).unwrap();
        assert!(repo.insert(&item).is_err());
    }

    #[test]
    fn test_update_overwrites_mastery() {
        let conn = create_test_db();
        let repo = QuizItemsRepository::new(&conn);
        let mut item = QuizItem::new("a", "A", 55.0, 36.0);
        repo.insert(&item).unwrap();

        item.image_mastery = MasteryState {
            next_review_date: 99,
            interval: 6,
            ease_factor: 2.6,
            successful_reviews: 2,
        };
        repo.update(&item).unwrap();

        let stored = repo.get("a").unwrap().unwrap();
        assert_eq!(stored.image_mastery, item.image_mastery);
        assert_eq!(stored.map_mastery, MasteryState::default());
    }

    #[test]
    fn test_get_due_per_mode() {
        let conn = create_test_db();
        let repo = QuizItemsRepository::new(&conn);

        let mut overdue = QuizItem::new("overdue", "Overdue", 55.0, 36.0);
        overdue.map_mastery = due_at(500);
        overdue.image_mastery = due_at(5_000);
        let mut exactly_now = QuizItem::new("now", "Now", 55.0, 36.0);
        exactly_now.map_mastery = due_at(1_000);
        let mut future = QuizItem::new("future", "Future", 55.0, 36.0);
        future.map_mastery = due_at(2_000);

        for item in [&overdue, &exactly_now, &future] {
            repo.insert(item).unwrap();
        }

        let due: Vec<String> = repo
            .get_due(GameMode::Map, 1_000)
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(due, vec!["overdue", "now"]);
        assert_eq!(repo.count_due(GameMode::Map, 1_000).unwrap(), 2);

        // image records of "now" and "future" default to 0, "overdue" is not due yet
        let image_due: Vec<String> = repo
            .get_due(GameMode::Image, 1_000)
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(image_due, vec!["future", "now"]);
    }

    #[test]
    fn test_get_nearby_filters_type_id_and_box() {
        let conn = create_test_db();
        let repo = QuizItemsRepository::new(&conn);

        let target = QuizItem::new("target", "Target", 55.73, 36.85);
        let near = QuizItem::new("near", "Near", 55.74, 36.86);
        let far = QuizItem::new("far", "Far", 55.9, 36.85);
        let mut line = QuizItem::new("line", "Line", 55.73, 36.85);
        line.geometry_type = GeometryType::Line;

        for item in [&target, &near, &far, &line] {
            repo.insert(item).unwrap();
        }

        let bounds = BoundingBox::around(GeoPoint::new(55.73, 36.85), 0.05);
        let nearby = repo
            .get_nearby(GeometryType::Point, "target", &bounds, 10)
            .unwrap();

        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].id, "near");
    }

    #[test]
    fn test_get_nearby_respects_limit() {
        let conn = create_test_db();
        let repo = QuizItemsRepository::new(&conn);
        for i in 0..6 {
            let id = format!("p{}", i);
            repo.insert(&QuizItem::new(&id, &id, 55.73, 36.85)).unwrap();
        }

        let bounds = BoundingBox::around(GeoPoint::new(55.73, 36.85), 0.05);
        let nearby = repo
            .get_nearby(GeometryType::Point, "p0", &bounds, 3)
            .unwrap();

        let ids: Vec<&str> = nearby.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_count_and_get_all() {
        let conn = create_test_db();
        let repo = QuizItemsRepository::new(&conn);
        repo.insert(&QuizItem::new("b", "B", 55.0, 36.0)).unwrap();
        repo.insert(&QuizItem::new("a", "A", 55.0, 36.0)).unwrap();

        assert_eq!(repo.count().unwrap(), 2);
        let ids: Vec<String> = repo.get_all().unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
