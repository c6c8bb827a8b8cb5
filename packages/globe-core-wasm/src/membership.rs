//! Country membership index.
//!
//! Every feature is painted into an offscreen raster with its identifier
//! packed into the RGB channels (`r = id & 0xFF`, `g = (id >> 8) & 0xFF`,
//! `b = (id >> 16) & 0xFF`). Lookup projects a (lon, lat) onto that raster
//! and decodes the pixel back into a feature. Untouched pixels decode to 0,
//! which is ocean.
//!
//! Features are painted in input order, so where polygons overlap the last
//! one wins. Interior rings follow the configured [`FillRule`]; the default
//! paints enclaves and lakes as part of the enclosing country.

use std::collections::HashMap;

use geo::MapCoords;
use geo_types::Coord;

use crate::config::TextureConfig;
use crate::console_log;
use crate::geojson_features::{FeatureId, GeoFeature};
use crate::raster_surface::{lon_lat_to_pixel, lon_lat_to_raster, BufferSurface, FillRule, RasterSurface};

/// Largest identifier representable in three 8-bit channels.
pub const MAX_FEATURE_ID: u32 = 0x00FF_FFFF;

// Canvas edges are anti-aliased; mostly-transparent pixels are not owned by
// any feature.
const MIN_OPAQUE_ALPHA: u8 = 128;

pub fn encode_id(id: FeatureId) -> [u8; 4] {
    let id = id.get();
    [
        (id & 0xFF) as u8,
        ((id >> 8) & 0xFF) as u8,
        ((id >> 16) & 0xFF) as u8,
        255,
    ]
}

pub fn decode_id(pixel: [u8; 4]) -> Option<FeatureId> {
    if pixel[3] < MIN_OPAQUE_ALPHA {
        return None;
    }
    let id = pixel[0] as u32 | (pixel[1] as u32) << 8 | (pixel[2] as u32) << 16;
    (id != 0).then_some(FeatureId(id))
}

pub struct MembershipIndex<S: RasterSurface = BufferSurface> {
    surface: S,
    names: HashMap<FeatureId, String>,
}

impl MembershipIndex<BufferSurface> {
    /// Build on an in-memory raster sized by `config`.
    pub fn build(features: &[GeoFeature], config: &TextureConfig) -> Self {
        let surface = BufferSurface::new(config.width, config.height);
        Self::build_on(surface, features, config.fill_rule)
    }
}

impl<S: RasterSurface> MembershipIndex<S> {
    pub fn build_on(mut surface: S, features: &[GeoFeature], rule: FillRule) -> Self {
        let width = surface.width();
        let height = surface.height();
        let mut names = HashMap::with_capacity(features.len());

        for feature in features {
            if feature.id.get() == 0 || feature.id.get() > MAX_FEATURE_ID {
                console_log!(
                    "Feature '{}' has unencodable id {}, skipping",
                    feature.name,
                    feature.id.get()
                );
                continue;
            }
            let color = encode_id(feature.id);
            for polygon in &feature.polygons {
                let projected = polygon.map_coords(|c| {
                    let (x, y) = lon_lat_to_raster(c.x, c.y, width, height);
                    Coord { x, y }
                });
                surface.fill_polygon(&projected, color, rule);
            }
            names.insert(feature.id, feature.name.clone());
        }

        console_log!(
            "Built membership index {}x{} for {} countries",
            width,
            height,
            names.len()
        );
        Self { surface, names }
    }

    /// Feature covering (lon, lat), or `None` for ocean.
    pub fn lookup_id(&self, lon: f64, lat: f64) -> Option<FeatureId> {
        let (x, y) = lon_lat_to_pixel(lon, lat, self.surface.width(), self.surface.height());
        decode_id(self.surface.get_pixel(x, y)).filter(|id| self.names.contains_key(id))
    }

    /// Country name covering (lon, lat), or `None` for ocean.
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<&str> {
        self.lookup_id(lon, lat)
            .and_then(|id| self.names.get(&id))
            .map(String::as_str)
    }

    pub fn name_of(&self, id: FeatureId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn country_count(&self) -> usize {
        self.names.len()
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }
}
