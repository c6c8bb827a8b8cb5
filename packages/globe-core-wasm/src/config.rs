// Parameter structs passed in from JavaScript. Every field has a default so
// callers can send `{}` (or nothing) and get the reference globe behaviour.
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::GlobeError;
use crate::raster_surface::FillRule;

pub const DEFAULT_TEXTURE_WIDTH: u32 = 2048;
pub const DEFAULT_TEXTURE_HEIGHT: u32 = 1024;
/// Largest raster accepted (16384x8192); keeps the RGBA buffer addressable
/// on wasm32.
pub const MAX_TEXTURE_PIXELS: u64 = 16384 * 8192;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub width: u32,
    pub height: u32,
    /// Number of soft radial patches blended over the finished raster.
    pub overlay_count: u32,
    pub overlay_min_radius: f64,
    pub overlay_max_radius: f64,
    pub fill_rule: FillRule,
    /// Fixed seed for reproducible output; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_TEXTURE_WIDTH,
            height: DEFAULT_TEXTURE_HEIGHT,
            overlay_count: 30,
            overlay_min_radius: 150.0,
            overlay_max_radius: 400.0,
            fill_rule: FillRule::ExteriorOnly,
            seed: None,
        }
    }
}

impl TextureConfig {
    pub fn validate(&self) -> Result<(), GlobeError> {
        if self.width == 0 || self.height == 0 {
            return Err(GlobeError::InvalidConfig(format!(
                "texture size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width as u64 * self.height as u64 > MAX_TEXTURE_PIXELS {
            return Err(GlobeError::InvalidConfig(format!(
                "texture size {}x{} exceeds {} pixels",
                self.width, self.height, MAX_TEXTURE_PIXELS
            )));
        }
        if !(self.overlay_min_radius.is_finite() && self.overlay_max_radius.is_finite())
            || self.overlay_min_radius <= 0.0
            || self.overlay_max_radius < self.overlay_min_radius
        {
            return Err(GlobeError::InvalidConfig(format!(
                "overlay radius range [{}, {}) is invalid",
                self.overlay_min_radius, self.overlay_max_radius
            )));
        }
        Ok(())
    }

    pub fn rng(&self) -> ChaCha8Rng {
        make_rng(self.seed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcConfig {
    /// Candidates at or beyond this planar degree distance are never linked.
    pub max_distance: f64,
    pub min_neighbors: usize,
    pub max_neighbors: usize,
    /// Probability that a selected neighbour actually produces an edge.
    pub keep_probability: f64,
    pub seed: Option<u64>,
}

impl Default for ArcConfig {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            min_neighbors: 2,
            max_neighbors: 4,
            keep_probability: 0.75,
            seed: None,
        }
    }
}

impl ArcConfig {
    pub fn validate(&self) -> Result<(), GlobeError> {
        if self.min_neighbors > self.max_neighbors {
            return Err(GlobeError::InvalidConfig(format!(
                "min_neighbors ({}) exceeds max_neighbors ({})",
                self.min_neighbors, self.max_neighbors
            )));
        }
        if !(0.0..=1.0).contains(&self.keep_probability) {
            return Err(GlobeError::InvalidConfig(format!(
                "keep_probability must be within [0, 1], got {}",
                self.keep_probability
            )));
        }
        if self.max_distance.is_nan() {
            return Err(GlobeError::InvalidConfig("max_distance is NaN".to_string()));
        }
        Ok(())
    }

    pub fn rng(&self) -> ChaCha8Rng {
        make_rng(self.seed)
    }
}

/// Seeded generator when a seed is given, otherwise one seeded from the
/// platform entropy source (crypto.getRandomValues in the browser).
pub fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn defaults_match_reference_globe() {
        let texture = TextureConfig::default();
        assert_eq!((texture.width, texture.height), (2048, 1024));
        assert_eq!(texture.overlay_count, 30);
        assert_eq!(texture.fill_rule, FillRule::ExteriorOnly);
        assert!(texture.validate().is_ok());

        let arcs = ArcConfig::default();
        assert_eq!(arcs.max_distance, 100.0);
        assert_eq!((arcs.min_neighbors, arcs.max_neighbors), (2, 4));
        assert!(arcs.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: TextureConfig =
            serde_json::from_str(r#"{"width": 64, "height": 32, "seed": 7}"#).unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.overlay_count, 30);
        assert_eq!(config.seed, Some(7));

        let config: ArcConfig = serde_json::from_str(r#"{"max_distance": 50.0}"#).unwrap();
        assert_eq!(config.max_distance, 50.0);
        assert_eq!(config.max_neighbors, 4);

        let config: TextureConfig = serde_json::from_str(r#"{"fill_rule": "even_odd"}"#).unwrap();
        assert_eq!(config.fill_rule, FillRule::EvenOdd);
    }

    #[test]
    fn rejects_invalid_values() {
        let zero = TextureConfig { width: 0, ..Default::default() };
        assert!(zero.validate().is_err());

        let huge = TextureConfig { width: 40_000, height: 40_000, ..Default::default() };
        assert!(matches!(huge.validate(), Err(GlobeError::InvalidConfig(_))));
        let largest = TextureConfig { width: 16_384, height: 8_192, ..Default::default() };
        assert!(largest.validate().is_ok());
        let wide = TextureConfig { width: u32::MAX, height: 1, ..Default::default() };
        assert!(wide.validate().is_err());

        let inverted = TextureConfig {
            overlay_min_radius: 50.0,
            overlay_max_radius: 10.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let neighbours = ArcConfig { min_neighbors: 5, ..Default::default() };
        assert!(neighbours.validate().is_err());

        let probability = ArcConfig { keep_probability: 1.5, ..Default::default() };
        assert!(probability.validate().is_err());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = make_rng(Some(42));
        let mut b = make_rng(Some(42));
        let xs: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);

        let config = ArcConfig { seed: Some(42), ..Default::default() };
        assert_eq!(config.rng().gen::<u64>(), make_rng(Some(42)).gen::<u64>());
    }
}
