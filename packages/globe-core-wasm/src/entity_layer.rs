// Entity-side preparation for the globe: filtering, research-network
// separation and point markers. The output of `visible_entities` is what the
// arc generator links.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{GeoEntity, GlobePoint};

pub const RESEARCH_NETWORK: &str = "Research Network";
const ANY: &str = "all";

const RESEARCH_COLOR: &str = "#00d4ff";
const CRITICAL_COLOR: &str = "#ff006e";
const HIGH_COLOR: &str = "#ff6b35";
const MEDIUM_COLOR: &str = "#f7b801";
const DEFAULT_COLOR: &str = "#00ff00";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityFilter {
    /// `None` or `"all"` accepts every risk level.
    pub risk_level: Option<String>,
    /// `None` or `"all"` accepts every entity type.
    pub entity_type: Option<String>,
    pub include_research: bool,
}

impl Default for EntityFilter {
    fn default() -> Self {
        Self {
            risk_level: None,
            entity_type: None,
            include_research: true,
        }
    }
}

fn accepts(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None | Some(ANY) => true,
        Some(wanted) => actual == Some(wanted),
    }
}

impl EntityFilter {
    pub fn matches(&self, entity: &GeoEntity) -> bool {
        accepts(self.risk_level.as_deref(), entity.risk_level.as_deref())
            && accepts(self.entity_type.as_deref(), entity.entity_type.as_deref())
    }
}

pub fn is_research(entity: &GeoEntity) -> bool {
    entity.category.as_deref() == Some(RESEARCH_NETWORK)
}

/// Split into (regular, research) entities, preserving order.
pub fn split_research(entities: &[GeoEntity]) -> (Vec<&GeoEntity>, Vec<&GeoEntity>) {
    entities.iter().partition(|e| !is_research(e))
}

/// Filtered regular entities, then research entities when enabled. Research
/// entities ignore the risk/type filters.
pub fn visible_entities(entities: &[GeoEntity], filter: &EntityFilter) -> Vec<GeoEntity> {
    let (regular, research) = split_research(entities);
    let mut visible: Vec<GeoEntity> = regular
        .into_iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect();
    if filter.include_research {
        visible.extend(research.into_iter().cloned());
    }
    visible
}

pub fn point_size(entity: &GeoEntity) -> f64 {
    match entity.risk_level.as_deref() {
        Some("Critical") => 0.6,
        Some("High") => 0.5,
        _ => 0.4,
    }
}

pub fn point_color(entity: &GeoEntity) -> &'static str {
    if is_research(entity) {
        return RESEARCH_COLOR;
    }
    match entity.risk_level.as_deref() {
        Some("Critical") => CRITICAL_COLOR,
        Some("High") => HIGH_COLOR,
        Some("Medium") => MEDIUM_COLOR,
        _ => DEFAULT_COLOR,
    }
}

pub fn globe_points(entities: &[GeoEntity]) -> Vec<GlobePoint> {
    entities
        .iter()
        .map(|entity| GlobePoint {
            lat: entity.latitude,
            lng: entity.longitude,
            size: point_size(entity),
            color: point_color(entity).to_string(),
            entity_id: entity.id.clone(),
        })
        .collect()
}

/// Critical entities among the filtered regular ones. Research networks are
/// never counted, whether or not they are shown.
pub fn critical_count(entities: &[GeoEntity], filter: &EntityFilter) -> usize {
    entities
        .iter()
        .filter(|e| !is_research(e) && filter.matches(e))
        .filter(|e| e.risk_level.as_deref() == Some("Critical"))
        .count()
}

/// Entity count per risk level; entities without one count as "Unknown".
pub fn risk_summary(entities: &[GeoEntity]) -> BTreeMap<String, usize> {
    let mut summary = BTreeMap::new();
    for entity in entities {
        let level = entity.risk_level.clone().unwrap_or_else(|| "Unknown".to_string());
        *summary.entry(level).or_insert(0) += 1;
    }
    summary
}
