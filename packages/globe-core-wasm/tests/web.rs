//! Browser tests for the canvas-backed surface. Run with
//! `wasm-pack test --headless --chrome packages/globe-core-wasm`.
#![cfg(target_arch = "wasm32")]

use geo_types::polygon;
use globe_core_wasm::config::TextureConfig;
use globe_core_wasm::geojson_features::{FeatureId, GeoFeature};
use globe_core_wasm::membership::MembershipIndex;
use globe_core_wasm::raster_surface::{CanvasSurface, FillRule, RasterSurface};
use globe_core_wasm::texture::{render_texture, GlobeTexture};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn algeria() -> GeoFeature {
    GeoFeature {
        id: FeatureId(1),
        name: "Algeria".to_string(),
        polygons: geo_types::MultiPolygon::new(vec![polygon![
            (x: -8.0, y: 19.0),
            (x: 12.0, y: 19.0),
            (x: 12.0, y: 37.0),
            (x: -8.0, y: 37.0)
        ]]),
    }
}

#[wasm_bindgen_test]
fn canvas_is_available_in_browser() {
    assert!(CanvasSurface::acquire(16, 8).is_some());
}

#[wasm_bindgen_test]
fn canvas_index_resolves_interior_points() {
    let surface = CanvasSurface::acquire(512, 256).expect("canvas");
    let index = MembershipIndex::build_on(surface, &[algeria()], FillRule::ExteriorOnly);
    assert_eq!(index.lookup(2.0, 28.0), Some("Algeria"));
    assert_eq!(index.lookup(-40.0, 0.0), None);
}

#[wasm_bindgen_test]
fn canvas_texture_is_opaque() {
    let config = TextureConfig {
        width: 128,
        height: 64,
        overlay_min_radius: 10.0,
        overlay_max_radius: 30.0,
        ..Default::default()
    };
    let index = MembershipIndex::build(&[algeria()], &config);
    let surface = CanvasSurface::acquire(config.width, config.height);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    match render_texture(surface, Some(&index), &config, &mut rng).unwrap() {
        GlobeTexture::Rendered(canvas) => {
            for (x, y) in [(0, 0), (64, 32), (127, 63)] {
                assert_eq!(canvas.get_pixel(x, y)[3], 255);
            }
            assert!(canvas.to_data_url().unwrap().starts_with("data:image/png"));
        }
        GlobeTexture::Fallback { .. } => panic!("expected a canvas texture"),
    }
}
