//! One-time import of quiz content from the seed JSON file.
//!
//! The file looks like `{ "items": [ { "id": ..., "name": ..., "lat": ...,
//! "lon": ..., ... } ] }`. Items already present are only touched when their
//! content changed upstream, and their mastery records are never reset.

use crate::database::Database;
use crate::error::{QuizError, Result};
use crate::quiz_item::{DEFAULT_BASE_RADIUS_M, GeometryType, QuizItem, child_id};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SeedFile {
    items: Vec<SeedEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedEntry {
    id: String,
    name: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    group: String,
    #[serde(default)]
    alts: Vec<String>,
    lat: f64,
    lon: f64,
    #[serde(default = "default_answer_radius")]
    answer_radius_m: u32,
    #[serde(default)]
    image_name: Option<String>,
    #[serde(default)]
    geometry_data: Option<Value>,
    #[serde(default)]
    area: Option<SeedArea>,
    #[serde(default)]
    images: Vec<SeedImage>,
    #[serde(default)]
    min_zoom: Option<f64>,
    #[serde(default)]
    max_zoom: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SeedArea {
    #[serde(default)]
    points: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedImage {
    image_name: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

fn default_answer_radius() -> u32 {
    DEFAULT_BASE_RADIUS_M
}

impl SeedEntry {
    fn description(&self) -> String {
        let mut description = format!("Kind: {}, Group: {}. ", self.kind, self.group);
        if !self.alts.is_empty() {
            description.push_str(&format!("Alt names: {}", self.alts.join(", ")));
        }
        description
    }

    /// Geometry text, taken from `geometryData` or else from `area.points`
    fn geometry(&self) -> String {
        let from_field = self.geometry_data.as_ref().map(value_to_geometry);
        match from_field {
            Some(text) if !text.is_empty() => text,
            _ => self
                .area
                .as_ref()
                .and_then(|area| area.points.as_ref())
                .map(value_to_geometry)
                .unwrap_or_default(),
        }
    }

    fn template(&self, id: String, image_name: Option<String>, lat: f64, lon: f64) -> QuizItem {
        let geometry_data = self.geometry();
        QuizItem {
            id,
            name: self.name.clone(),
            description: self.description(),
            image_name,
            latitude: lat,
            longitude: lon,
            geometry_type: infer_geometry_type(&self.kind, &geometry_data),
            geometry_data,
            min_zoom: self.min_zoom.unwrap_or(0.0),
            max_zoom: self.max_zoom.unwrap_or(0.0),
            base_radius: self.answer_radius_m,
            ..QuizItem::new("", "", lat, lon)
        }
    }

    /// One item per image variant, or a single item when there are none
    fn into_items(self) -> Vec<QuizItem> {
        if self.images.is_empty() {
            return vec![self.template(
                self.id.clone(),
                self.image_name.clone(),
                self.lat,
                self.lon,
            )];
        }

        self.images
            .iter()
            .enumerate()
            .map(|(j, image)| {
                self.template(
                    child_id(&self.id, j),
                    Some(image.image_name.clone()),
                    image.lat.unwrap_or(self.lat),
                    image.lon.unwrap_or(self.lon),
                )
            })
            .collect()
    }
}

fn value_to_geometry(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}

/// Streets and roads are lines; bracketed geometry or area-like kinds are polygons
pub fn infer_geometry_type(kind: &str, geometry_data: &str) -> GeometryType {
    // kind wins over bracketed geometry, so streets with traced coordinates stay lines
    match kind {
        "street" | "road" => GeometryType::Line,
        "district_anchor" | "quarter" => GeometryType::Polygon,
        _ if geometry_data.contains('[') => GeometryType::Polygon,
        _ => GeometryType::Point,
    }
}

/// Counts of what an import did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

pub struct DataSeeder<'a> {
    db: &'a Database,
}

impl<'a> DataSeeder<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn import_file(&self, path: &Path) -> Result<ImportReport> {
        let json = fs::read_to_string(path).map_err(|source| QuizError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.import_str(&json)
    }

    pub fn import_str(&self, json: &str) -> Result<ImportReport> {
        let seed: SeedFile = serde_json::from_str(json)?;
        info!("Found {} seed entries", seed.items.len());

        let mut report = ImportReport::default();
        let mut new_items = Vec::new();
        let mut seen_ids = HashSet::new();

        for incoming in seed.items.into_iter().flat_map(SeedEntry::into_items) {
            if !seen_ids.insert(incoming.id.clone()) {
                warn!("Skipping duplicate seed id {}", incoming.id);
                continue;
            }

            match self.db.get_quiz_item(&incoming.id)? {
                None => new_items.push(incoming),
                Some(mut existing) if existing.content_differs(&incoming) => {
                    existing.merge_content(&incoming);
                    self.db.save_quiz_item(&existing)?;
                    report.updated += 1;
                }
                Some(_) => report.unchanged += 1,
            }
        }

        report.inserted = self.db.insert_quiz_items(&new_items)?;
        info!(
            "Seed import: {} inserted, {} updated, {} unchanged",
            report.inserted, report.updated, report.unchanged
        );
        Ok(report)
    }
}
