use crate::quiz_item::{GeometryType, QuizItem};
use crate::spaced_repetition::MasteryState;
use rusqlite::Row;

/// Column list matching [`QuizItemRowFactory::from_row`]
pub const QUIZ_ITEM_COLUMNS: &str = "id, name, description, image_name, latitude, longitude,
    geometry_type, geometry_data, min_zoom, max_zoom, base_radius,
    map_next_review_date, map_interval, map_ease_factor, map_successful_reviews,
    image_next_review_date, image_interval, image_ease_factor, image_successful_reviews";

/// Factory for creating QuizItem objects from database rows
pub struct QuizItemRowFactory;

impl QuizItemRowFactory {
    /// Creates a QuizItem from a row selected with [`QUIZ_ITEM_COLUMNS`]
    pub fn from_row(row: &Row) -> rusqlite::Result<QuizItem> {
        Ok(QuizItem {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            image_name: row.get(3)?,
            latitude: row.get(4)?,
            longitude: row.get(5)?,
            geometry_type: GeometryType::from(&row.get::<_, String>(6)?)
                .unwrap_or(GeometryType::Point),
            geometry_data: row.get(7)?,
            min_zoom: row.get(8)?,
            max_zoom: row.get(9)?,
            base_radius: row.get(10)?,
            map_mastery: Self::mastery_from(row, 11)?,
            image_mastery: Self::mastery_from(row, 15)?,
        })
    }

    fn mastery_from(row: &Row, first: usize) -> rusqlite::Result<MasteryState> {
        Ok(MasteryState {
            next_review_date: row.get(first)?,
            interval: row.get(first + 1)?,
            ease_factor: row.get(first + 2)?,
            successful_reviews: row.get(first + 3)?,
        })
    }
}
