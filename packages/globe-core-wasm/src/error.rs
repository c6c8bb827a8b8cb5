use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors surfaced by the globe core.
///
/// Malformed individual features are not errors: they are skipped during
/// ingestion. These variants cover whole-input and environment failures.
#[derive(Error, Debug)]
pub enum GlobeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("No country borders loaded - call load_country_borders first")]
    IndexNotLoaded,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<GlobeError> for JsValue {
    fn from(err: GlobeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
