use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::console_log;
use crate::error::GlobeError;

/// Fallback label for features without a recognised name property.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

// Property keys checked in order for a country label.
const NAME_KEYS: [&str; 3] = ["NAME", "name", "NAME_LONG"];

/// Identifier of one accepted feature. Assigned per feature, never per name,
/// so unnamed features never merge into one country. Zero is reserved for
/// "no country" (ocean) in the membership raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u32);

impl FeatureId {
    pub fn get(self) -> u32 {
        self.0
    }
}

// One country outline from the border dataset, coordinates in (lon, lat)
#[derive(Debug, Clone)]
pub struct GeoFeature {
    pub id: FeatureId,
    pub name: String,
    pub polygons: MultiPolygon<f64>,
}

/// Parse a GeoJSON FeatureCollection from text.
pub fn parse_feature_collection(json: &str) -> Result<Vec<GeoFeature>, GlobeError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(GlobeError::InvalidGeoJson(
            "top-level value must be an object".to_string(),
        ));
    }
    if value.get("features").and_then(Value::as_array).is_none() {
        return Err(GlobeError::InvalidGeoJson(
            "missing 'features' array".to_string(),
        ));
    }
    Ok(features_from_value(&value))
}

/// Extract every usable Polygon/MultiPolygon feature. Features with missing or
/// unsupported geometry are skipped and logged; they never abort ingestion.
pub fn features_from_value(collection: &Value) -> Vec<GeoFeature> {
    let raw_features = match collection.get("features").and_then(Value::as_array) {
        Some(features) => features,
        None => return Vec::new(),
    };

    let mut features = Vec::with_capacity(raw_features.len());
    let mut skipped = 0usize;

    for raw in raw_features {
        let name = feature_name(raw);
        match raw.get("geometry").and_then(parse_geometry) {
            Some(polygons) if !polygons.0.is_empty() => {
                let id = FeatureId(features.len() as u32 + 1);
                features.push(GeoFeature { id, name, polygons });
            }
            _ => {
                skipped += 1;
                console_log!("Skipping feature '{}' with unusable geometry", name);
            }
        }
    }

    console_log!(
        "Parsed {} country features ({} skipped)",
        features.len(),
        skipped
    );
    features
}

fn feature_name(feature: &Value) -> String {
    let properties = feature.get("properties");
    NAME_KEYS
        .iter()
        .find_map(|key| {
            properties
                .and_then(|p| p.get(*key))
                .and_then(Value::as_str)
        })
        .unwrap_or(UNKNOWN_COUNTRY)
        .to_string()
}

fn parse_geometry(geometry: &Value) -> Option<MultiPolygon<f64>> {
    let coordinates = geometry.get("coordinates")?.as_array()?;
    match geometry.get("type")?.as_str()? {
        "Polygon" => {
            let polygon = parse_polygon(coordinates)?;
            Some(MultiPolygon::new(vec![polygon]))
        }
        "MultiPolygon" => {
            let polygons: Vec<Polygon<f64>> = coordinates
                .iter()
                .filter_map(|p| p.as_array().and_then(|rings| parse_polygon(rings)))
                .collect();
            Some(MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

// First ring is the exterior; the rest are holes. A polygon whose exterior
// ring is unusable is dropped entirely.
fn parse_polygon(rings: &[Value]) -> Option<Polygon<f64>> {
    let mut parsed = rings.iter().map(parse_ring);
    let exterior = parsed.next()??;
    let interiors: Vec<LineString<f64>> = parsed.flatten().collect();
    Some(Polygon::new(exterior, interiors))
}

fn parse_ring(ring: &Value) -> Option<LineString<f64>> {
    let coords: Vec<Coord<f64>> = ring
        .as_array()?
        .iter()
        .filter_map(|point| {
            let pair = point.as_array()?;
            if pair.len() < 2 {
                return None;
            }
            let x = pair[0].as_f64()?;
            let y = pair[1].as_f64()?;
            (x.is_finite() && y.is_finite()).then_some(Coord { x, y })
        })
        .collect();

    if coords.len() < 3 {
        return None;
    }
    Some(LineString::new(coords))
}
