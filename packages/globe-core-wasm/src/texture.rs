//! Procedural earth texture.
//!
//! Each pixel is classified through the membership index and coloured by
//! biome using cheap trigonometric noise. Ocean pixels also get a small
//! random term, and a final pass blends soft dark/light patches over the
//! whole raster (land included). The random parts draw from the caller's
//! generator, so a seeded generator gives a reproducible texture.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use rand::Rng;

use crate::biome::{classify, Biome};
use crate::config::TextureConfig;
use crate::console_log;
use crate::error::GlobeError;
use crate::membership::MembershipIndex;
use crate::models::TextureStats;
use crate::raster_surface::{pixel_to_lon_lat, RadialGradient, RasterSurface};

/// Flat ocean colour used when no raster surface is available (#002d4d).
pub const FALLBACK_COLOR: [u8; 3] = [0x00, 0x2d, 0x4d];

const DEEP_PATCH_COLOR: [u8; 3] = [0, 26, 51];
const DEEP_PATCH_ALPHA: f64 = 0.4;
const SHALLOW_PATCH_COLOR: [u8; 3] = [45, 90, 135];
const SHALLOW_PATCH_ALPHA: f64 = 0.3;

/// Result of a texture request: either the surface that was painted or a
/// marker that the flat fallback should be used instead.
pub enum GlobeTexture<S> {
    Rendered(S),
    Fallback { width: u32, height: u32 },
}

impl<S> GlobeTexture<S> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, GlobeTexture::Fallback { .. })
    }
}

fn ramp(from: f64, to: f64, t: f64) -> u8 {
    (from + t * (to - from)).floor().clamp(0.0, 255.0) as u8
}

fn ramp3(from: [f64; 3], to: [f64; 3], t: f64) -> [u8; 3] {
    [
        ramp(from[0], to[0], t),
        ramp(from[1], to[1], t),
        ramp(from[2], to[2], t),
    ]
}

// Three-tier ramp split at 0.4 and 0.7
fn tiered(value: f64, stops: [[f64; 3]; 4]) -> [u8; 3] {
    if value < 0.4 {
        ramp3(stops[0], stops[1], value / 0.4)
    } else if value < 0.7 {
        ramp3(stops[1], stops[2], (value - 0.4) / 0.3)
    } else {
        ramp3(stops[2], stops[3], (value - 0.7) / 0.3)
    }
}

fn wave(x: f64, y: f64, frequency: f64) -> f64 {
    (x * frequency).sin() * (y * frequency).cos()
}

/// Ocean depth in [0, 1]; `noise` is a uniform draw in [0, 1).
pub fn ocean_depth(x: f64, y: f64, noise: f64) -> f64 {
    let depth = wave(x, y, 0.01) * 0.3
        + wave(x, y, 0.03) * 0.2
        + wave(x, y, 0.05) * 0.1
        + (noise - 0.5) * 0.2;
    (depth + 1.0) / 2.0
}

/// Deep blue-grey (#001a33) through to light grey-blue (#4a85a5).
pub fn ocean_colour(depth: f64) -> [u8; 3] {
    tiered(
        depth,
        [
            [0.0, 26.0, 51.0],
            [13.0, 47.0, 80.0],
            [45.0, 90.0, 135.0],
            [74.0, 133.0, 165.0],
        ],
    )
}

pub fn land_tone(x: f64, y: f64) -> f64 {
    (wave(x, y, 0.015) * 0.4 + 1.0) / 2.0
}

/// Grey, then grey-green, then dark forest green.
pub fn land_colour(tone: f64) -> [u8; 3] {
    tiered(
        tone,
        [
            [100.0, 100.0, 90.0],
            [130.0, 135.0, 115.0],
            [90.0, 165.0, 95.0],
            [60.0, 115.0, 65.0],
        ],
    )
}

pub fn desert_tone(x: f64, y: f64) -> f64 {
    (wave(x, y, 0.02) * 0.3 + 1.0) / 2.0
}

/// Tan to sandy brown.
pub fn desert_colour(tone: f64) -> [u8; 3] {
    ramp3([160.0, 130.0, 90.0], [200.0, 160.0, 115.0], tone)
}

/// Opaque colour for one pixel. Only ocean pixels consume randomness.
pub fn biome_pixel<R: Rng + ?Sized>(biome: Biome, x: u32, y: u32, rng: &mut R) -> [u8; 4] {
    let (fx, fy) = (x as f64, y as f64);
    let [r, g, b] = match biome {
        Biome::Ocean => ocean_colour(ocean_depth(fx, fy, rng.gen::<f64>())),
        Biome::Land => land_colour(land_tone(fx, fy)),
        Biome::Desert => desert_colour(desert_tone(fx, fy)),
    };
    [r, g, b, 255]
}

/// Randomised deep/shallow patches blended after the base pass.
pub fn overlay_patches<R: Rng + ?Sized>(
    config: &TextureConfig,
    width: u32,
    height: u32,
    rng: &mut R,
) -> Vec<RadialGradient> {
    let radius_span = config.overlay_max_radius - config.overlay_min_radius;
    (0..config.overlay_count)
        .map(|_| {
            let cx = rng.gen::<f64>() * width as f64;
            let cy = rng.gen::<f64>() * height as f64;
            let radius = config.overlay_min_radius + rng.gen::<f64>() * radius_span;
            let (color, alpha) = if rng.gen::<f64>() > 0.5 {
                (DEEP_PATCH_COLOR, DEEP_PATCH_ALPHA)
            } else {
                (SHALLOW_PATCH_COLOR, SHALLOW_PATCH_ALPHA)
            };
            RadialGradient { cx, cy, radius, color, alpha }
        })
        .collect()
}

/// Paint the full texture onto `surface` and report how many pixels fell in
/// each biome.
pub fn synthesize<S, M, R>(
    surface: &mut S,
    index: &MembershipIndex<M>,
    config: &TextureConfig,
    rng: &mut R,
) -> TextureStats
where
    S: RasterSurface,
    M: RasterSurface,
    R: Rng + ?Sized,
{
    let width = surface.width();
    let height = surface.height();
    let mut frame = vec![0u8; width as usize * height as usize * 4];
    let mut stats = TextureStats {
        width,
        height,
        ..Default::default()
    };

    for y in 0..height {
        for x in 0..width {
            let (lon, lat) = pixel_to_lon_lat(x as f64, y as f64, width, height);
            let biome = classify(index.lookup(lon, lat), lon, lat);
            match biome {
                Biome::Ocean => stats.ocean_pixels += 1,
                Biome::Desert => stats.desert_pixels += 1,
                Biome::Land => stats.land_pixels += 1,
            }
            let idx = (y as usize * width as usize + x as usize) * 4;
            frame[idx..idx + 4].copy_from_slice(&biome_pixel(biome, x, y, rng));
        }
    }
    surface.put_pixels(&frame);

    for patch in overlay_patches(config, width, height, rng) {
        surface.fill_radial_gradient(&patch);
    }

    console_log!(
        "Synthesized {}x{} texture: {} ocean, {} desert, {} land pixels",
        width,
        height,
        stats.ocean_pixels,
        stats.desert_pixels,
        stats.land_pixels
    );
    stats
}

/// Headless synthesis into an owned RGBA image.
pub fn synthesize_image<M, R>(index: &MembershipIndex<M>, config: &TextureConfig, rng: &mut R) -> RgbaImage
where
    M: RasterSurface,
    R: Rng + ?Sized,
{
    let mut surface = crate::raster_surface::BufferSurface::new(config.width, config.height);
    synthesize(&mut surface, index, config, rng);
    surface.into_image()
}

/// Synthesize onto `surface` when one is available, else report fallback.
/// Without a surface the index is not consulted; with one, it must be loaded.
pub fn render_texture<S, M, R>(
    surface: Option<S>,
    index: Option<&MembershipIndex<M>>,
    config: &TextureConfig,
    rng: &mut R,
) -> Result<GlobeTexture<S>, GlobeError>
where
    S: RasterSurface,
    M: RasterSurface,
    R: Rng + ?Sized,
{
    match (surface, index) {
        (Some(mut surface), Some(index)) => {
            synthesize(&mut surface, index, config, rng);
            Ok(GlobeTexture::Rendered(surface))
        }
        (Some(_), None) => Err(GlobeError::IndexNotLoaded),
        (None, _) => {
            console_log!("No raster surface available, using flat fallback texture");
            Ok(GlobeTexture::Fallback {
                width: config.width,
                height: config.height,
            })
        }
    }
}

pub fn fallback_image(width: u32, height: u32) -> RgbaImage {
    let [r, g, b] = FALLBACK_COLOR;
    RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]))
}

/// SVG data URL of a flat fallback texture; needs no image encoder.
pub fn fallback_data_url(width: u32, height: u32) -> String {
    let [r, g, b] = FALLBACK_COLOR;
    format!(
        "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}'%3E\
         %3Crect width='{w}' height='{h}' fill='%23{r:02x}{g:02x}{b:02x}'/%3E%3C/svg%3E",
        w = width,
        h = height,
    )
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, GlobeError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(bytes)
}

pub fn png_data_url(image: &RgbaImage) -> Result<String, GlobeError> {
    let bytes = encode_png(image)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}
