//! Distance math between a tapped coordinate and a quiz item's shape.
//!
//! Everything here is pure. Lines and polygons arrive as bracketed text
//! (`[[lat,lon],[lat,lon]]`); anything that fails to parse is treated as
//! "no geometry" and the item's anchor point is used instead.

use crate::error::GeometryParseError;
use crate::quiz_item::{GeometryType, QuizItem};
use log::debug;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Axis-aligned latitude/longitude range used for "nearby" queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box extending `delta_degrees` in every direction from `center`
    pub fn around(center: GeoPoint, delta_degrees: f64) -> Self {
        Self {
            min_lat: center.lat - delta_degrees,
            max_lat: center.lat + delta_degrees,
            min_lon: center.lon - delta_degrees,
            max_lon: center.lon + delta_degrees,
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}

/// Parses bracketed coordinate text, returning an empty list for blank or malformed input
pub fn parse_geometry(raw: &str) -> Vec<GeoPoint> {
    try_parse_geometry(raw).unwrap_or_else(|e| {
        debug!("Ignoring malformed geometry {:?}: {}", raw, e);
        Vec::new()
    })
}

/// Strict variant of [`parse_geometry`]
///
/// Fragments holding fewer than two values are skipped; a value that is not
/// a number rejects the whole input.
pub fn try_parse_geometry(raw: &str) -> Result<Vec<GeoPoint>, GeometryParseError> {
    let trimmed = raw.trim();
    let inner = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    let mut points = Vec::new();
    let mut rest = inner;
    let mut consumed = 0;

    while let Some(start) = rest.find('[') {
        let Some(end) = rest.find(']') else {
            break;
        };
        if end < start {
            return Err(GeometryParseError::UnbalancedBrackets {
                offset: consumed + end,
            });
        }

        let values: Vec<&str> = rest[start + 1..end].split(',').collect();
        if values.len() >= 2 {
            points.push(GeoPoint::new(
                parse_coordinate(values[0])?,
                parse_coordinate(values[1])?,
            ));
        }

        consumed += end + 1;
        rest = &rest[end + 1..];
    }

    Ok(points)
}

fn parse_coordinate(value: &str) -> Result<f64, GeometryParseError> {
    let value = value.trim();
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeometryParseError::InvalidCoordinate {
            value: value.to_string(),
        })
}

/// Writes points back in the bracketed form accepted by [`parse_geometry`]
pub fn format_geometry(points: &[GeoPoint]) -> String {
    let pairs: Vec<String> = points
        .iter()
        .map(|p| format!("[{},{}]", p.lat, p.lon))
        .collect();
    format!("[{}]", pairs.join(","))
}

/// Great-circle distance in meters
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lon - a.lon).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Distance in meters from `point` to the shape of `item`
pub fn distance_to_item(point: GeoPoint, item: &QuizItem) -> f64 {
    let anchor = item.anchor();
    match item.geometry_type {
        GeometryType::Point => haversine_distance(point, anchor),
        GeometryType::Line => {
            let vertices = parse_geometry(&item.geometry_data);
            if vertices.is_empty() {
                haversine_distance(point, anchor)
            } else {
                distance_to_polyline(point, &vertices)
            }
        }
        GeometryType::Polygon => {
            let vertices = parse_geometry(&item.geometry_data);
            if vertices.is_empty() {
                haversine_distance(point, anchor)
            } else if is_point_in_polygon(point, &vertices) {
                0.0
            } else {
                distance_to_polygon(point, &vertices)
            }
        }
    }
}

/// Smallest distance from `point` to any segment between consecutive vertices
///
/// A single vertex is measured directly.
pub fn distance_to_polyline(point: GeoPoint, vertices: &[GeoPoint]) -> f64 {
    if let [only] = vertices {
        return haversine_distance(point, *only);
    }
    vertices
        .windows(2)
        .map(|segment| distance_to_segment(point, segment[0], segment[1]))
        .fold(f64::MAX, f64::min)
}

/// Distance from `p` to the segment `a`-`b`
///
/// The foot of the perpendicular is found in an equirectangular projection
/// local to the segment, then measured with haversine.
pub fn distance_to_segment(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lon1 = a.lon.to_radians();
    let lat2 = b.lat.to_radians();
    let lon2 = b.lon.to_radians();
    let lat3 = p.lat.to_radians();
    let lon3 = p.lon.to_radians();

    let x = (lon3 - lon1) * ((lat1 + lat3) / 2.0).cos();
    let y = lat3 - lat1;
    let dx = (lon2 - lon1) * ((lat1 + lat2) / 2.0).cos();
    let dy = lat2 - lat1;

    if dx == 0.0 && dy == 0.0 {
        return haversine_distance(p, a);
    }

    let t = ((x * dx + y * dy) / (dx * dx + dy * dy)).clamp(0.0, 1.0);

    let closest_lat = lat1 + t * dy;
    let closest_lon = lon1 + t * (dx / ((lat1 + closest_lat) / 2.0).cos());

    haversine_distance(
        p,
        GeoPoint::new(closest_lat.to_degrees(), closest_lon.to_degrees()),
    )
}

/// Even-odd ray casting along the point's latitude
pub fn is_point_in_polygon(p: GeoPoint, polygon: &[GeoPoint]) -> bool {
    let mut inside = false;
    let mut j = match polygon.len() {
        0 => return false,
        n => n - 1,
    };

    for (i, vi) in polygon.iter().enumerate() {
        let vj = polygon[j];
        if (vi.lat > p.lat) != (vj.lat > p.lat)
            && p.lon < (vj.lon - vi.lon) * (p.lat - vi.lat) / (vj.lat - vi.lat) + vi.lon
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Distance to the polygon boundary, closing the ring back to its first vertex
pub fn distance_to_polygon(p: GeoPoint, polygon: &[GeoPoint]) -> f64 {
    let mut ring = polygon.to_vec();
    if let Some(first) = polygon.first() {
        ring.push(*first);
    }
    distance_to_polyline(p, &ring)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ]
    }

    fn item(geometry_type: GeometryType, geometry_data: &str) -> QuizItem {
        QuizItem {
            geometry_type,
            geometry_data: geometry_data.to_string(),
            ..QuizItem::new("it", "Item", 55.73, 36.85)
        }
    }

    #[test]
    fn test_parse_two_points_in_order() {
        let points = parse_geometry("[[55.1,36.2],[55.2,36.3]]");
        assert_eq!(
            points,
            vec![GeoPoint::new(55.1, 36.2), GeoPoint::new(55.2, 36.3)]
        );
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let points = parse_geometry("  [ [55.1, 36.2] , [ 55.2 ,36.3 ] ]\n");
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], GeoPoint::new(55.2, 36.3));
    }

    #[test]
    fn test_parse_blank_is_empty() {
        assert!(parse_geometry("").is_empty());
        assert!(parse_geometry("   ").is_empty());
        assert!(parse_geometry("[]").is_empty());
    }

    #[test]
    fn test_parse_malformed_is_empty() {
        assert!(parse_geometry("[[55.1,abc],[55.2,36.3]]").is_empty());
        assert!(parse_geometry("not geometry").is_empty());
        assert!(parse_geometry("[[1,2]]]]").len() == 1);
    }

    #[test]
    fn test_try_parse_reports_invalid_coordinate() {
        let err = try_parse_geometry("[[55.1,abc]]").unwrap_err();
        assert_eq!(
            err,
            GeometryParseError::InvalidCoordinate {
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_try_parse_reports_unbalanced_brackets() {
        let err = try_parse_geometry("[1,2],[3,4]]").unwrap_err();
        assert!(matches!(err, GeometryParseError::UnbalancedBrackets { .. }));
    }

    #[test]
    fn test_parse_skips_short_fragments() {
        let points = parse_geometry("[[55.1],[55.2,36.3]]");
        assert_eq!(points, vec![GeoPoint::new(55.2, 36.3)]);
    }

    #[test]
    fn test_format_then_parse_round_trip() {
        for raw in [
            "[[55.1,36.2],[55.2,36.3]]",
            "[[55.7312345,36.8512345],[55.7320001,36.8600002],[55.74,36.86]]",
            "[[-33.86,151.2]]",
            "[]",
        ] {
            let parsed = parse_geometry(raw);
            assert_eq!(parse_geometry(&format_geometry(&parsed)), parsed);
        }
    }

    #[test]
    fn test_haversine_identity_and_symmetry() {
        let a = GeoPoint::new(55.7296, 36.8556);
        let b = GeoPoint::new(55.7400, 36.8700);

        assert_eq!(haversine_distance(a, a), 0.0);
        assert_eq!(haversine_distance(a, b), haversine_distance(b, a));
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = haversine_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        // pi * R / 180
        assert!((d - 111_194.93).abs() < 0.1);
    }

    #[test]
    fn test_point_in_unit_square() {
        let square = unit_square();
        assert!(is_point_in_polygon(GeoPoint::new(0.5, 0.5), &square));
        assert!(!is_point_in_polygon(GeoPoint::new(2.0, 2.0), &square));
        assert!(!is_point_in_polygon(GeoPoint::new(0.5, -0.1), &square));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape open towards higher latitudes
        let u_shape = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 3.0),
            GeoPoint::new(3.0, 3.0),
            GeoPoint::new(3.0, 2.0),
            GeoPoint::new(1.0, 2.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(3.0, 1.0),
            GeoPoint::new(3.0, 0.0),
        ];
        assert!(is_point_in_polygon(GeoPoint::new(2.0, 0.5), &u_shape));
        assert!(is_point_in_polygon(GeoPoint::new(0.5, 1.5), &u_shape));
        assert!(!is_point_in_polygon(GeoPoint::new(2.0, 1.5), &u_shape));
    }

    #[test]
    fn test_empty_polygon_contains_nothing() {
        assert!(!is_point_in_polygon(GeoPoint::new(0.0, 0.0), &[]));
    }

    #[test]
    fn test_polygon_item_inside_is_zero() {
        let square = item(
            GeometryType::Polygon,
            "[[0,0],[0,1],[1,1],[1,0]]",
        );
        assert_eq!(distance_to_item(GeoPoint::new(0.5, 0.5), &square), 0.0);
        assert!(distance_to_item(GeoPoint::new(2.0, 2.0), &square) > 0.0);
    }

    #[test]
    fn test_polygon_outside_measures_closing_edge() {
        // Nearest edge is the closing one, from (1,0) back to (0,0)
        let square = unit_square();
        let p = GeoPoint::new(0.5, -0.001);

        let d = distance_to_polygon(p, &square);
        let expected = haversine_distance(p, GeoPoint::new(0.5, 0.0));

        assert!((d - expected).abs() < 1.0, "{d} vs {expected}");
    }

    #[test]
    fn test_line_distance_to_perpendicular_foot() {
        // East-west street; point 0.001 degrees north of its middle
        let street = item(GeometryType::Line, "[[55.73,36.85],[55.73,36.87]]");
        let p = GeoPoint::new(55.731, 36.86);

        let d = distance_to_item(p, &street);
        let expected = haversine_distance(p, GeoPoint::new(55.73, 36.86));

        assert!((d - expected).abs() < 0.5, "{d} vs {expected}");
    }

    #[test]
    fn test_line_distance_beyond_endpoint_clamps() {
        let street = item(GeometryType::Line, "[[55.73,36.85],[55.73,36.86]]");
        let p = GeoPoint::new(55.73, 36.87);

        let d = distance_to_item(p, &street);
        let expected = haversine_distance(p, GeoPoint::new(55.73, 36.86));

        assert!((d - expected).abs() < 0.01);
    }

    #[test]
    fn test_polyline_takes_minimum_segment() {
        let path = vec![
            GeoPoint::new(55.73, 36.85),
            GeoPoint::new(55.73, 36.86),
            GeoPoint::new(55.74, 36.86),
        ];
        let p = GeoPoint::new(55.735, 36.8605);

        let d = distance_to_polyline(p, &path);

        assert!(d < distance_to_segment(p, path[0], path[1]));
        assert!(d > 0.0 && d < 40.0);
    }

    #[test]
    fn test_degenerate_segment_falls_back_to_point() {
        let a = GeoPoint::new(55.73, 36.85);
        let p = GeoPoint::new(55.74, 36.85);
        assert_eq!(distance_to_segment(p, a, a), haversine_distance(p, a));
    }

    #[test]
    fn test_empty_geometry_falls_back_to_anchor() {
        let p = GeoPoint::new(55.74, 36.85);
        let anchor = GeoPoint::new(55.73, 36.85);

        for geometry_type in [GeometryType::Line, GeometryType::Polygon] {
            let shapeless = item(geometry_type, "");
            assert_eq!(distance_to_item(p, &shapeless), haversine_distance(p, anchor));

            let broken = item(geometry_type, "[[oops]]");
            assert_eq!(distance_to_item(p, &broken), haversine_distance(p, anchor));
        }
    }

    #[test]
    fn test_point_item_ignores_geometry_data() {
        let p = GeoPoint::new(55.74, 36.85);
        let point = item(GeometryType::Point, "[[0,0],[1,1]]");
        assert_eq!(
            distance_to_item(p, &point),
            haversine_distance(p, GeoPoint::new(55.73, 36.85))
        );
    }

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox::around(GeoPoint::new(55.73, 36.85), 0.05);
        assert!(bbox.contains(GeoPoint::new(55.77, 36.81)));
        assert!(!bbox.contains(GeoPoint::new(55.79, 36.85)));
        assert!(!bbox.contains(GeoPoint::new(55.73, 36.91)));
    }
}
