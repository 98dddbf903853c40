use crate::geometry::GeoPoint;
use crate::spaced_repetition::MasteryState;

/// Tolerance in meters used when the seed does not give one
pub const DEFAULT_BASE_RADIUS_M: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Point,
    Line,
    Polygon,
}

impl GeometryType {
    pub fn as_str(&self) -> &str {
        match self {
            GeometryType::Point => "POINT",
            GeometryType::Line => "LINE",
            GeometryType::Polygon => "POLYGON",
        }
    }

    pub fn from(s: &str) -> Option<Self> {
        match s {
            "POINT" => Some(GeometryType::Point),
            "LINE" => Some(GeometryType::Line),
            "POLYGON" => Some(GeometryType::Polygon),
            _ => None,
        }
    }
}

/// Which of the two mastery records an answer counts towards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Name-the-highlighted-place and tap-the-named-place questions
    Map,
    /// Name-the-photo questions
    Image,
}

impl GameMode {
    pub fn as_str(&self) -> &str {
        match self {
            GameMode::Map => "map",
            GameMode::Image => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub geometry_type: GeometryType,
    /// Bracketed `[[lat,lon],...]` text; empty for plain points
    pub geometry_data: String,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub base_radius: u32,
    pub map_mastery: MasteryState,
    pub image_mastery: MasteryState,
}

impl QuizItem {
    /// A never-reviewed point item
    pub fn new(id: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            image_name: None,
            latitude,
            longitude,
            geometry_type: GeometryType::Point,
            geometry_data: String::new(),
            min_zoom: 0.0,
            max_zoom: 0.0,
            base_radius: DEFAULT_BASE_RADIUS_M,
            map_mastery: MasteryState::default(),
            image_mastery: MasteryState::default(),
        }
    }

    pub fn anchor(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn mastery(&self, mode: GameMode) -> &MasteryState {
        match mode {
            GameMode::Map => &self.map_mastery,
            GameMode::Image => &self.image_mastery,
        }
    }

    pub fn set_mastery(&mut self, mode: GameMode, state: MasteryState) {
        match mode {
            GameMode::Map => self.map_mastery = state,
            GameMode::Image => self.image_mastery = state,
        }
    }

    /// True when any content field the seed controls differs from `other`
    pub fn content_differs(&self, other: &QuizItem) -> bool {
        self.name != other.name
            || self.image_name != other.image_name
            || self.geometry_data != other.geometry_data
            || self.latitude != other.latitude
            || self.longitude != other.longitude
    }

    /// Copies seed-controlled fields from `source`, keeping both mastery records
    pub fn merge_content(&mut self, source: &QuizItem) {
        self.name = source.name.clone();
        self.description = source.description.clone();
        self.image_name = source.image_name.clone();
        self.latitude = source.latitude;
        self.longitude = source.longitude;
        self.geometry_type = source.geometry_type;
        self.geometry_data = source.geometry_data.clone();
        self.min_zoom = source.min_zoom;
        self.max_zoom = source.max_zoom;
        self.base_radius = source.base_radius;
    }
}

/// Id of the `index`-th image variant of a multi-image seed entry
pub fn child_id(base_id: &str, index: usize) -> String {
    format!("{}_{}", base_id, index)
}
