// Host-independent entry points behind the wasm exports. Everything here
// works natively so the same flow can run in tests or server-side.
use std::sync::Arc;

use image::RgbaImage;

use crate::arcs;
use crate::biome::{classify, Biome};
use crate::cache_keys::{make_dataset_key, make_index_key};
use crate::config::{ArcConfig, TextureConfig};
use crate::console_log;
use crate::entity_layer::{critical_count, globe_points, visible_entities, EntityFilter};
use crate::error::GlobeError;
use crate::geojson_features::parse_feature_collection;
use crate::membership::MembershipIndex;
use crate::models::{BorderLoadResult, GeoEntity, GlobeLayer};
use crate::module_state::ModuleState;
use crate::texture::synthesize_image;

/// Build the membership index for a border dataset, reusing the cached one
/// when the same dataset was loaded with the same raster settings.
pub fn load_borders(geojson: &str, config: &TextureConfig) -> Result<BorderLoadResult, GlobeError> {
    config.validate()?;
    let key = make_index_key(&make_dataset_key(geojson), config);

    if let Some(index) = ModuleState::with_mut(|state| state.get_membership(&key)) {
        // Re-store so this dataset is also the current one
        let countries = index.country_count();
        ModuleState::with_mut(|state| state.store_membership(key, index));
        console_log!("Reusing cached membership index ({} countries)", countries);
        return Ok(BorderLoadResult { countries, cached: true });
    }

    let features = parse_feature_collection(geojson)?;
    let index = Arc::new(MembershipIndex::build(&features, config));
    let countries = index.country_count();
    ModuleState::with_mut(|state| state.store_membership(key, index));

    Ok(BorderLoadResult { countries, cached: false })
}

pub fn current_index() -> Result<Arc<MembershipIndex>, GlobeError> {
    ModuleState::with(|state| state.current_membership()).ok_or(GlobeError::IndexNotLoaded)
}

/// Headless texture from the most recently loaded borders.
pub fn render_image(config: &TextureConfig) -> Result<RgbaImage, GlobeError> {
    config.validate()?;
    let index = current_index()?;
    let mut rng = config.rng();
    Ok(synthesize_image(&*index, config, &mut rng))
}

/// Biome at a coordinate; ocean everywhere until borders are loaded.
pub fn biome_at(lon: f64, lat: f64) -> Biome {
    match current_index() {
        Ok(index) => classify(index.lookup(lon, lat), lon, lat),
        Err(_) => Biome::Ocean,
    }
}

/// Points and arcs for the currently visible entities.
pub fn prepare_layer(
    entities: &[GeoEntity],
    filter: &EntityFilter,
    arc_config: &ArcConfig,
) -> Result<GlobeLayer, GlobeError> {
    arc_config.validate()?;
    let visible = visible_entities(entities, filter);
    let mut rng = arc_config.rng();
    let arcs = arcs::generate(&visible, arc_config, &mut rng);

    console_log!(
        "Prepared globe layer: {} of {} entities visible, {} arcs",
        visible.len(),
        entities.len(),
        arcs.len()
    );

    Ok(GlobeLayer {
        points: globe_points(&visible),
        arcs,
        critical_count: critical_count(entities, filter),
    })
}
