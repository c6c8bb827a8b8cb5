//! 2D raster capability used for both the country index and the final texture.
//!
//! `BufferSurface` is a plain RGBA buffer and works everywhere, including
//! native tests and server-side rendering. `CanvasSurface` (wasm32 only)
//! draws through the browser's 2D canvas.
//!
//! Geometry handed to a surface is already in raster coordinates. A pixel
//! `(x, y)` is sampled at its top-left corner, which is exactly the point
//! [`pixel_to_lon_lat`] maps it to, so a filled polygon and a later lookup of
//! the same (lon, lat) always agree.

use geo::BoundingRect;
use geo_types::{LineString, Polygon};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

// Slack when converting projected coordinates back to pixel indices
const PIXEL_EPSILON: f64 = 1e-7;

/// Which rings of a polygon are filled.
///
/// `ExteriorOnly` ignores interior rings, so lakes and enclaves are painted
/// as part of the surrounding country. `EvenOdd` subtracts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    #[default]
    ExteriorOnly,
    EvenOdd,
}

impl FillRule {
    pub fn rings<'a>(&self, polygon: &'a Polygon<f64>) -> Vec<&'a LineString<f64>> {
        match self {
            FillRule::ExteriorOnly => vec![polygon.exterior()],
            FillRule::EvenOdd => std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .collect(),
        }
    }
}

/// Soft circle that fades linearly from `alpha` at the centre to fully
/// transparent at `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub color: [u8; 3],
    pub alpha: f64,
}

impl RadialGradient {
    /// Blend weight at a point, 0 outside the circle.
    pub fn weight_at(&self, x: f64, y: f64) -> f64 {
        let distance = ((x - self.cx).powi(2) + (y - self.cy).powi(2)).sqrt();
        if self.radius <= 0.0 || distance >= self.radius {
            return 0.0;
        }
        self.alpha * (1.0 - distance / self.radius)
    }
}

pub trait RasterSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Fill `polygon` (raster coordinates) with a solid colour, no blending.
    fn fill_polygon(&mut self, polygon: &Polygon<f64>, color: [u8; 4], rule: FillRule);
    /// Pixels outside the surface read as transparent black.
    fn get_pixel(&self, x: u32, y: u32) -> [u8; 4];
    /// Replace the whole surface with a row-major RGBA frame.
    fn put_pixels(&mut self, rgba: &[u8]);
    fn fill_radial_gradient(&mut self, gradient: &RadialGradient);
}

/// Equirectangular projection of a raster position to (lon, lat).
pub fn pixel_to_lon_lat(x: f64, y: f64, width: u32, height: u32) -> (f64, f64) {
    let lon = x / width as f64 * 360.0 - 180.0;
    let lat = 90.0 - y / height as f64 * 180.0;
    (lon, lat)
}

/// Inverse of [`pixel_to_lon_lat`], unclamped.
pub fn lon_lat_to_raster(lon: f64, lat: f64, width: u32, height: u32) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0 * width as f64;
    let y = (90.0 - lat) / 180.0 * height as f64;
    (x, y)
}

/// Pixel containing (lon, lat), clamped onto the raster.
pub fn lon_lat_to_pixel(lon: f64, lat: f64, width: u32, height: u32) -> (u32, u32) {
    let (x, y) = lon_lat_to_raster(lon, lat, width, height);
    let clamp = |v: f64, size: u32| -> u32 {
        if !v.is_finite() {
            return 0;
        }
        (v + PIXEL_EPSILON).floor().clamp(0.0, (size - 1) as f64) as u32
    };
    (clamp(x, width), clamp(y, height))
}

/// In-memory RGBA surface.
pub struct BufferSurface {
    image: RgbaImage,
}

impl BufferSurface {
    /// A fully transparent surface; untouched pixels decode as id 0.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl RasterSurface for BufferSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_polygon(&mut self, polygon: &Polygon<f64>, color: [u8; 4], rule: FillRule) {
        let rings = rule.rings(polygon);
        let bounds = match polygon.exterior().bounding_rect() {
            Some(bounds) => bounds,
            None => return,
        };

        let width = self.image.width();
        let height = self.image.height();
        if width == 0 || height == 0 {
            return;
        }

        let y_start = bounds.min().y.ceil().max(0.0);
        let y_end = bounds.max().y.floor().min((height - 1) as f64);
        if y_start > y_end {
            return;
        }

        let mut crossings: Vec<f64> = Vec::new();
        for py in y_start as u32..=y_end as u32 {
            let sy = py as f64;
            crossings.clear();
            for ring in &rings {
                for line in ring.lines() {
                    let (a, b) = (line.start, line.end);
                    // Half-open test so shared vertices are counted once
                    if (a.y <= sy) != (b.y <= sy) {
                        crossings.push(a.x + (sy - a.y) * (b.x - a.x) / (b.y - a.y));
                    }
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                let x_from = span[0].ceil().max(0.0);
                let x_to = span[1].ceil().min(width as f64);
                if x_from >= x_to {
                    continue;
                }
                for px in x_from as u32..x_to as u32 {
                    self.image.put_pixel(px, py, Rgba(color));
                }
            }
        }
    }

    fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| p.0)
            .unwrap_or([0, 0, 0, 0])
    }

    fn put_pixels(&mut self, rgba: &[u8]) {
        let buffer: &mut [u8] = &mut self.image;
        let len = rgba.len().min(buffer.len());
        buffer[..len].copy_from_slice(&rgba[..len]);
    }

    fn fill_radial_gradient(&mut self, gradient: &RadialGradient) {
        let width = self.image.width() as f64;
        let height = self.image.height() as f64;
        let x_start = (gradient.cx - gradient.radius).floor().max(0.0);
        let x_end = (gradient.cx + gradient.radius).ceil().min(width);
        let y_start = (gradient.cy - gradient.radius).floor().max(0.0);
        let y_end = (gradient.cy + gradient.radius).ceil().min(height);
        if x_start >= x_end || y_start >= y_end {
            return;
        }

        for py in y_start as u32..y_end as u32 {
            for px in x_start as u32..x_end as u32 {
                // Gradients are evaluated at pixel centres, as a canvas does
                let weight = gradient.weight_at(px as f64 + 0.5, py as f64 + 0.5);
                if weight <= 0.0 {
                    continue;
                }
                let pixel = self.image.get_pixel_mut(px, py);
                for channel in 0..3 {
                    let dst = pixel.0[channel] as f64;
                    let src = gradient.color[channel] as f64;
                    pixel.0[channel] = (src * weight + dst * (1.0 - weight)).round() as u8;
                }
                let dst_alpha = pixel.0[3] as f64;
                pixel.0[3] = (255.0 * weight + dst_alpha * (1.0 - weight)).round() as u8;
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

#[cfg(target_arch = "wasm32")]
mod canvas {
    use std::cell::RefCell;

    use geo_types::Polygon;
    use wasm_bindgen::{Clamped, JsCast, JsValue};
    use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement, ImageData};

    use super::{FillRule, RadialGradient, RasterSurface};
    use crate::console_log;

    /// Surface backed by an offscreen `<canvas>` element.
    ///
    /// Canvas fills are anti-aliased, so pixels along polygon edges hold
    /// blended colours. Readers must treat unknown colours as empty.
    pub struct CanvasSurface {
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        width: u32,
        height: u32,
        // Full-frame readback, refreshed lazily after any draw call
        snapshot: RefCell<Option<Vec<u8>>>,
    }

    impl CanvasSurface {
        /// `None` when no DOM is reachable (web worker, server runtime).
        pub fn acquire(width: u32, height: u32) -> Option<Self> {
            let document = web_sys::window()?.document()?;
            let canvas = document
                .create_element("canvas")
                .ok()?
                .dyn_into::<HtmlCanvasElement>()
                .ok()?;
            canvas.set_width(width);
            canvas.set_height(height);
            let ctx = canvas
                .get_context("2d")
                .ok()??
                .dyn_into::<CanvasRenderingContext2d>()
                .ok()?;
            Some(Self {
                canvas,
                ctx,
                width,
                height,
                snapshot: RefCell::new(None),
            })
        }

        pub fn to_data_url(&self) -> Result<String, JsValue> {
            self.canvas.to_data_url()
        }

        fn invalidate(&self) {
            self.snapshot.borrow_mut().take();
        }
    }

    impl RasterSurface for CanvasSurface {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        #[allow(deprecated)]
        fn fill_polygon(&mut self, polygon: &Polygon<f64>, color: [u8; 4], rule: FillRule) {
            self.ctx.begin_path();
            for ring in rule.rings(polygon) {
                let mut coords = ring.coords();
                if let Some(first) = coords.next() {
                    self.ctx.move_to(first.x, first.y);
                    for c in coords {
                        self.ctx.line_to(c.x, c.y);
                    }
                    self.ctx.close_path();
                }
            }
            let style = format!(
                "rgba({}, {}, {}, {})",
                color[0],
                color[1],
                color[2],
                color[3] as f64 / 255.0
            );
            self.ctx.set_fill_style(&JsValue::from_str(&style));
            match rule {
                FillRule::ExteriorOnly => self.ctx.fill(),
                FillRule::EvenOdd => self
                    .ctx
                    .fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd),
            }
            self.invalidate();
        }

        fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
            if x >= self.width || y >= self.height {
                return [0, 0, 0, 0];
            }
            let mut snapshot = self.snapshot.borrow_mut();
            if snapshot.is_none() {
                match self
                    .ctx
                    .get_image_data(0.0, 0.0, self.width as f64, self.height as f64)
                {
                    Ok(data) => *snapshot = Some(data.data().0),
                    Err(_) => {
                        console_log!("Canvas readback failed");
                        return [0, 0, 0, 0];
                    }
                }
            }
            let idx = ((y * self.width + x) * 4) as usize;
            match snapshot.as_ref().and_then(|data| data.get(idx..idx + 4)) {
                Some(px) => [px[0], px[1], px[2], px[3]],
                None => [0, 0, 0, 0],
            }
        }

        fn put_pixels(&mut self, rgba: &[u8]) {
            let result = ImageData::new_with_u8_clamped_array_and_sh(
                Clamped(rgba),
                self.width,
                self.height,
            )
            .and_then(|data| self.ctx.put_image_data(&data, 0.0, 0.0));
            if result.is_err() {
                console_log!("Canvas put_image_data failed for {} bytes", rgba.len());
            }
            self.invalidate();
        }

        #[allow(deprecated)]
        fn fill_radial_gradient(&mut self, gradient: &RadialGradient) {
            let RadialGradient { cx, cy, radius, color, alpha } = *gradient;
            let result = self
                .ctx
                .create_radial_gradient(cx, cy, 0.0, cx, cy, radius)
                .and_then(|grad| {
                    let inner = format!("rgba({}, {}, {}, {})", color[0], color[1], color[2], alpha);
                    grad.add_color_stop(0.0, &inner)?;
                    grad.add_color_stop(1.0, "transparent")?;
                    Ok(grad)
                });
            match result {
                Ok(grad) => {
                    self.ctx.set_fill_style(&grad);
                    self.ctx.fill_rect(cx - radius, cy - radius, radius * 2.0, radius * 2.0);
                }
                Err(_) => console_log!("Canvas gradient creation failed"),
            }
            self.invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, LineString};

    fn square(min: f64, max: f64) -> Polygon<f64> {
        polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max)
        ]
    }

    #[test]
    fn projection_matches_reference_formula() {
        assert_eq!(pixel_to_lon_lat(0.0, 0.0, 2048, 1024), (-180.0, 90.0));
        assert_eq!(pixel_to_lon_lat(1024.0, 512.0, 2048, 1024), (0.0, 0.0));
        let (x, y) = lon_lat_to_raster(0.0, 0.0, 2048, 1024);
        assert_eq!((x, y), (1024.0, 512.0));
    }

    #[test]
    fn pixel_roundtrip_is_exact_for_every_column() {
        for x in 0..2048u32 {
            let (lon, lat) = pixel_to_lon_lat(x as f64, 300.0, 2048, 1024);
            assert_eq!(lon_lat_to_pixel(lon, lat, 2048, 1024), (x, 300));
        }
    }

    #[test]
    fn pixel_lookup_clamps_out_of_range() {
        assert_eq!(lon_lat_to_pixel(180.0, -90.0, 64, 32), (63, 31));
        assert_eq!(lon_lat_to_pixel(-500.0, 500.0, 64, 32), (0, 0));
        assert_eq!(lon_lat_to_pixel(f64::NAN, 0.0, 64, 32).0, 0);
    }

    #[test]
    fn fill_covers_corner_samples_inside_only() {
        let mut surface = BufferSurface::new(16, 16);
        surface.fill_polygon(&square(2.5, 6.5), [9, 0, 0, 255], FillRule::ExteriorOnly);

        for y in 0..16 {
            for x in 0..16 {
                let inside = (3..=6).contains(&x) && (3..=6).contains(&y);
                let px = surface.get_pixel(x, y);
                assert_eq!(px[0] == 9, inside, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn exterior_only_ignores_holes_and_even_odd_subtracts_them() {
        let hole = LineString::from(vec![(4.5, 4.5), (6.5, 4.5), (6.5, 6.5), (4.5, 6.5), (4.5, 4.5)]);
        let donut = Polygon::new(square(0.5, 10.5).exterior().clone(), vec![hole]);

        let mut exterior = BufferSurface::new(12, 12);
        exterior.fill_polygon(&donut, [1, 0, 0, 255], FillRule::ExteriorOnly);
        assert_eq!(exterior.get_pixel(5, 5), [1, 0, 0, 255]);

        let mut even_odd = BufferSurface::new(12, 12);
        even_odd.fill_polygon(&donut, [1, 0, 0, 255], FillRule::EvenOdd);
        assert_eq!(even_odd.get_pixel(5, 5), [0, 0, 0, 0]);
        assert_eq!(even_odd.get_pixel(2, 2), [1, 0, 0, 255]);
    }

    #[test]
    fn fill_clips_to_surface() {
        let mut surface = BufferSurface::new(8, 8);
        surface.fill_polygon(&square(-20.0, 20.0), [5, 5, 5, 255], FillRule::ExteriorOnly);
        assert!(surface.image().pixels().all(|p| p.0 == [5, 5, 5, 255]));
    }

    #[test]
    fn out_of_bounds_reads_are_transparent() {
        let surface = BufferSurface::new(4, 4);
        assert_eq!(surface.get_pixel(10, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn put_pixels_replaces_frame() {
        let mut surface = BufferSurface::new(2, 1);
        surface.put_pixels(&[1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(surface.get_pixel(0, 0), [1, 2, 3, 255]);
        assert_eq!(surface.get_pixel(1, 0), [4, 5, 6, 255]);
    }

    #[test]
    fn radial_gradient_fades_to_edge() {
        let mut surface = BufferSurface::new(41, 41);
        surface.put_pixels(&[200u8; 41 * 41 * 4]);
        let gradient = RadialGradient {
            cx: 20.5,
            cy: 20.5,
            radius: 15.0,
            color: [0, 0, 0],
            alpha: 0.4,
        };
        surface.fill_radial_gradient(&gradient);

        let centre = surface.get_pixel(20, 20);
        let mid = surface.get_pixel(27, 20);
        let outside = surface.get_pixel(0, 0);
        assert_eq!(centre[0], 120);
        assert!(mid[0] > centre[0] && mid[0] < 200);
        assert_eq!(outside, [200, 200, 200, 200]);
        assert!(centre[3] > 200);
    }
}
