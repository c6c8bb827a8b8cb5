// Utility functions to generate consistent cache keys across the application.
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::config::TextureConfig;

/// Key identifying a border dataset by content: "len_hash".
pub fn make_dataset_key(geojson: &str) -> String {
    let mut hasher = DefaultHasher::new();
    geojson.hash(&mut hasher);
    format!("{}_{:016x}", geojson.len(), hasher.finish())
}

/// Key for a membership index: the dataset plus everything that changes the
/// rasterised result ("datasetKey_WxH_rule").
pub fn make_index_key(dataset_key: &str, config: &TextureConfig) -> String {
    format!(
        "{}_{}x{}_{:?}",
        dataset_key, config.width, config.height, config.fill_rule
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster_surface::FillRule;

    #[test]
    fn dataset_key_depends_on_content() {
        let a = make_dataset_key(r#"{"features": []}"#);
        assert_eq!(a, make_dataset_key(r#"{"features": []}"#));
        assert_ne!(a, make_dataset_key(r#"{"features": [ ]}"#));
        assert!(a.starts_with("16_"));
    }

    #[test]
    fn index_key_tracks_raster_settings() {
        let config = TextureConfig::default();
        assert_eq!(make_index_key("k", &config), "k_2048x1024_ExteriorOnly");

        let even_odd = TextureConfig {
            fill_rule: FillRule::EvenOdd,
            ..TextureConfig::default()
        };
        assert_ne!(make_index_key("k", &config), make_index_key("k", &even_odd));
    }
}
