use wasm_bindgen::prelude::*;
use serde::de::DeserializeOwned;
use serde_wasm_bindgen::to_value;

// Create a console module for logging
pub mod console;
// Import our error type
pub mod error;
// Import our configuration structs
pub mod config;
// Import our models
pub mod models;
mod cache_keys;
// Import our module state management
mod module_state;
// Import our geojson features module
pub mod geojson_features;
// Import the raster surface abstraction
pub mod raster_surface;
// Import the country membership index
pub mod membership;
// Import the biome classifier
pub mod biome;
// Import the texture synthesizer
pub mod texture;
// Import the proximity arc generator
pub mod arcs;
// Import entity filtering and point markers
pub mod entity_layer;
// Host-independent entry points
pub mod globe;

use config::{ArcConfig, TextureConfig};
use entity_layer::EntityFilter;
use models::GeoEntity;
use module_state::ModuleState;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

// Use the macro from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::console::log(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("Globe WASM module initialized successfully");
    });
}

// Missing or null options mean "use the defaults"
fn options_or_default<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// Parse a GeoJSON FeatureCollection of country borders and build the
/// membership index. Returns `{ countries, cached }`.
#[wasm_bindgen]
pub fn load_country_borders(geojson: &str, config: JsValue) -> Result<JsValue, JsValue> {
    let config: TextureConfig = options_or_default(config)?;
    let result = globe::load_borders(geojson, &config)?;
    Ok(to_value(&result)?)
}

/// Procedural earth texture as a data URL.
///
/// Drawn on a canvas when the page has one; without a DOM (workers, server
/// rendering) the flat fallback texture is returned instead.
#[wasm_bindgen]
pub fn generate_globe_texture(config: JsValue) -> Result<String, JsValue> {
    let config: TextureConfig = options_or_default(config)?;
    config.validate()?;
    generate_texture_url(&config)
}

#[cfg(target_arch = "wasm32")]
fn generate_texture_url(config: &TextureConfig) -> Result<String, JsValue> {
    use crate::raster_surface::CanvasSurface;
    use crate::texture::{fallback_data_url, render_texture, GlobeTexture};

    let surface = CanvasSurface::acquire(config.width, config.height);
    let index = globe::current_index().ok();
    let mut rng = config.rng();
    match render_texture(surface, index.as_deref(), config, &mut rng)? {
        GlobeTexture::Rendered(canvas) => canvas.to_data_url(),
        GlobeTexture::Fallback { width, height } => Ok(fallback_data_url(width, height)),
    }
}

// No canvas outside the browser: render in memory and encode as PNG
#[cfg(not(target_arch = "wasm32"))]
fn generate_texture_url(config: &TextureConfig) -> Result<String, JsValue> {
    let image = globe::render_image(config)?;
    Ok(texture::png_data_url(&image)?)
}

/// Procedural earth texture as PNG bytes, rendered without a canvas.
#[wasm_bindgen]
pub fn generate_globe_texture_png(config: JsValue) -> Result<Vec<u8>, JsValue> {
    let config: TextureConfig = options_or_default(config)?;
    let image = globe::render_image(&config)?;
    let bytes = texture::encode_png(&image)?;
    console_log!("Encoded globe texture: {} bytes", bytes.len());
    Ok(bytes)
}

/// Flat fallback texture as an SVG data URL.
#[wasm_bindgen]
pub fn fallback_globe_texture(width: u32, height: u32) -> String {
    texture::fallback_data_url(width, height)
}

/// "ocean", "desert" or "land" for a coordinate, using the loaded borders.
#[wasm_bindgen]
pub fn classify_point(lon: f64, lat: f64) -> String {
    globe::biome_at(lon, lat).as_str().to_string()
}

/// Proximity arcs for an array of entities.
#[wasm_bindgen]
pub fn generate_arcs(entities: JsValue, config: JsValue) -> Result<JsValue, JsValue> {
    let entities: Vec<GeoEntity> = serde_wasm_bindgen::from_value(entities)?;
    let config: ArcConfig = options_or_default(config)?;
    config.validate()?;

    let mut rng = config.rng();
    let arcs = arcs::generate(&entities, &config, &mut rng);
    console_log!("Generated {} arcs for {} entities", arcs.len(), entities.len());
    Ok(to_value(&arcs)?)
}

/// Filtered points, arcs and critical count for the globe view.
#[wasm_bindgen]
pub fn prepare_globe_layer(entities: JsValue, filter: JsValue, arc_config: JsValue) -> Result<JsValue, JsValue> {
    let entities: Vec<GeoEntity> = serde_wasm_bindgen::from_value(entities)?;
    let filter: EntityFilter = options_or_default(filter)?;
    let arc_config: ArcConfig = options_or_default(arc_config)?;

    let layer = globe::prepare_layer(&entities, &filter, &arc_config)?;
    Ok(to_value(&layer)?)
}

// Function to get cache statistics
#[wasm_bindgen]
pub fn get_cache_stats() -> Result<JsValue, JsValue> {
    let stats = ModuleState::with(|state| state.stats());
    Ok(to_value(&stats)?)
}

// Function to clear all caches
#[wasm_bindgen]
pub fn clear_caches() -> bool {
    ModuleState::with_mut(|state| state.clear_all_caches());
    true
}
