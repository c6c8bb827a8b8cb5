// This is the models module containing shared data structures
use serde::{Deserialize, Serialize};

/// A catalogued entity as delivered by `/api/entities`. Only the coordinates
/// feed the globe algorithms; the remaining fields drive filtering and markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoEntity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl GeoEntity {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            latitude,
            longitude,
            risk_level: None,
            category: None,
            entity_type: None,
            country: None,
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcEdge {
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
}

impl ArcEdge {
    pub fn between(start: &GeoEntity, end: &GeoEntity) -> Self {
        Self {
            start_lat: start.latitude,
            start_lng: start.longitude,
            end_lat: end.latitude,
            end_lng: end.longitude,
        }
    }
}

/// Marker rendered for an entity on the globe's point layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobePoint {
    pub lat: f64,
    pub lng: f64,
    pub size: f64,
    pub color: String,
    pub entity_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobeLayer {
    pub points: Vec<GlobePoint>,
    pub arcs: Vec<ArcEdge>,
    pub critical_count: usize,
}

/// Pixel counts per biome for one synthesized texture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureStats {
    pub width: u32,
    pub height: u32,
    pub ocean_pixels: usize,
    pub desert_pixels: usize,
    pub land_pixels: usize,
}

impl TextureStats {
    pub fn total_pixels(&self) -> usize {
        self.ocean_pixels + self.desert_pixels + self.land_pixels
    }
}

/// Membership index cache counters, as reported to JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub index_loaded: bool,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub hit_rate: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BorderLoadResult {
    pub countries: usize,
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_reads_api_shape() {
        let json = r#"{
            "id": "e1",
            "name": "Lagos Research Hub",
            "category": "Research Network",
            "country": "Nigeria",
            "latitude": 6.5244,
            "longitude": 3.3792,
            "type": "Public",
            "riskLevel": "Low",
            "tags": ["Research"],
            "headquarters": "Lagos, Nigeria"
        }"#;
        let entity: GeoEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.entity_type.as_deref(), Some("Public"));
        assert_eq!(entity.risk_level.as_deref(), Some("Low"));
        assert_eq!(entity.tags, vec!["Research".to_string()]);
    }

    #[test]
    fn entity_needs_only_coordinates() {
        let entity: GeoEntity =
            serde_json::from_str(r#"{"latitude": 1.5, "longitude": -2.0}"#).unwrap();
        assert_eq!(entity, GeoEntity::at(1.5, -2.0));
    }

    #[test]
    fn arc_edge_uses_camel_case_keys() {
        let edge = ArcEdge::between(&GeoEntity::at(1.0, 2.0), &GeoEntity::at(3.0, 4.0));
        let value = serde_json::to_value(edge).unwrap();
        assert_eq!(value["startLat"], 1.0);
        assert_eq!(value["startLng"], 2.0);
        assert_eq!(value["endLat"], 3.0);
        assert_eq!(value["endLng"], 4.0);
    }

    #[test]
    fn stats_use_camel_case_keys() {
        let stats = TextureStats {
            width: 4,
            height: 2,
            ocean_pixels: 5,
            desert_pixels: 1,
            land_pixels: 2,
        };
        assert_eq!(stats.total_pixels(), 8);
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["oceanPixels"], 5);
        assert_eq!(value["landPixels"], 2);

        let cache = CacheStats {
            index_loaded: true,
            cache_hits: 1,
            cache_misses: 1,
            hit_rate: 0.5,
        };
        let value = serde_json::to_value(cache).unwrap();
        assert_eq!(value["indexLoaded"], true);
        assert_eq!(value["hitRate"], 0.5);
    }
}
