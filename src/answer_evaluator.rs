use crate::geometry::{GeoPoint, distance_to_item};
use crate::quiz_item::QuizItem;
use crate::spaced_repetition::Quality;

/// The allowed radius never shrinks below this many meters
pub const MIN_ALLOWED_RADIUS_M: f64 = 30.0;

/// Meters removed from the radius per consecutive correct map answer
pub const RADIUS_STEP_PER_REVIEW_M: f64 = 20.0;

/// At most this share of the base radius is removed by mastery
pub const MAX_RADIUS_REDUCTION_RATIO: f64 = 0.8;

/// Misses within this multiple of the allowed radius count as near misses
pub const NEAR_MISS_FACTOR: f64 = 2.5;

/// Outcome of measuring a tap against an item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationVerdict {
    pub distance: f64,
    pub allowed_radius: f64,
    pub quality: Quality,
}

impl LocationVerdict {
    pub fn is_success(&self) -> bool {
        self.quality.is_pass()
    }
}

/// Radius a tap must fall within, shrinking as the map streak grows
pub fn allowed_radius(base_radius: f64, successful_reviews: u32) -> f64 {
    let reduction = (successful_reviews as f64 * RADIUS_STEP_PER_REVIEW_M)
        .min(base_radius * MAX_RADIUS_REDUCTION_RATIO);
    (base_radius - reduction).max(MIN_ALLOWED_RADIUS_M)
}

/// Grades a distance: inside the radius is perfect, up to 2.5x is a near miss
pub fn quality_for_distance(distance: f64, allowed_radius: f64) -> Quality {
    if distance < allowed_radius {
        Quality::PERFECT
    } else if distance < allowed_radius * NEAR_MISS_FACTOR {
        Quality::NEAR_MISS
    } else {
        Quality::BLACKOUT
    }
}

/// Measures a map tap against `item` using its map-mode streak
pub fn evaluate_location(point: GeoPoint, item: &QuizItem) -> LocationVerdict {
    let allowed_radius = allowed_radius(
        item.base_radius as f64,
        item.map_mastery.successful_reviews,
    );
    let distance = distance_to_item(point, item);

    LocationVerdict {
        distance,
        allowed_radius,
        quality: quality_for_distance(distance, allowed_radius),
    }
}

/// Multiple choice answers are all or nothing
pub fn evaluate_choice(item: &QuizItem, selected_name: &str) -> Quality {
    if item.name == selected_name {
        Quality::PERFECT
    } else {
        Quality::BLACKOUT
    }
}
