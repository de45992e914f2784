//! RGB images ↔ luma plane
//!
//! Full-range BT.601 YCrCb with the coefficients OpenCV uses for
//! `COLOR_RGB2YCrCb`. Only luma is handed to the codec; chroma is kept at
//! full precision and recombined afterwards.

use crate::types::Plane;
use image::{Rgb, RgbImage};

const CR_SCALE: f64 = 0.713;
const CB_SCALE: f64 = 0.564;
const CHROMA_OFFSET: f64 = 128.0;

/// Luma of one RGB pixel
#[inline]
pub fn rgb_to_luma(r: f64, g: f64, b: f64) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Split one pixel into `(y, cr, cb)`
#[inline]
pub fn rgb_to_ycrcb(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let y = rgb_to_luma(r, g, b);
    let cr = (r - y) * CR_SCALE + CHROMA_OFFSET;
    let cb = (b - y) * CB_SCALE + CHROMA_OFFSET;
    (y, cr, cb)
}

/// Recombine `(y, cr, cb)` into unclamped RGB
#[inline]
pub fn ycrcb_to_rgb(y: f64, cr: f64, cb: f64) -> (f64, f64, f64) {
    let dr = cr - CHROMA_OFFSET;
    let db = cb - CHROMA_OFFSET;
    let r = y + 1.403 * dr;
    let g = y - 0.714 * dr - 0.344 * db;
    let b = y + 1.773 * db;
    (r, g, b)
}

#[inline]
fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// An RGB image decomposed into a luma plane and retained chroma
#[derive(Debug, Clone)]
pub struct LumaChroma {
    /// Luma samples handed to the codec
    pub luma: Plane,
    chroma: Vec<(f64, f64)>,
}

impl LumaChroma {
    /// Decompose an RGB image
    pub fn from_rgb(img: &RgbImage) -> Self {
        let (w, h) = img.dimensions();
        let (w, h) = (w as usize, h as usize);
        let mut luma = Vec::with_capacity(w * h);
        let mut chroma = Vec::with_capacity(w * h);

        for px in img.pixels() {
            let (y, cr, cb) = rgb_to_ycrcb(px[0] as f64, px[1] as f64, px[2] as f64);
            luma.push(y);
            chroma.push((cr, cb));
        }

        Self {
            luma: Plane::from_samples(w, h, luma).unwrap_or_else(|| Plane::filled(w, h, 0.0)),
            chroma,
        }
    }

    /// Recombine with a (possibly modified) luma plane of the same size
    pub fn to_rgb_with(&self, luma: &Plane) -> RgbImage {
        let (w, h) = (luma.width(), luma.height());
        debug_assert_eq!(w * h, self.chroma.len());

        RgbImage::from_fn(w as u32, h as u32, |x, y| {
            let idx = y as usize * w + x as usize;
            let (cr, cb) = self.chroma[idx];
            let (r, g, b) = ycrcb_to_rgb(luma.samples()[idx], cr, cb);
            Rgb([to_u8(r), to_u8(g), to_u8(b)])
        })
    }

    /// Recombine with the stored luma
    pub fn to_rgb(&self) -> RgbImage {
        self.to_rgb_with(&self.luma)
    }
}

/// Luma plane of an RGB image
pub fn luma_plane(img: &RgbImage) -> Plane {
    let (w, h) = img.dimensions();
    Plane::from_fn(w as usize, h as usize, |x, y| {
        let px = img.get_pixel(x as u32, y as u32);
        rgb_to_luma(px[0] as f64, px[1] as f64, px[2] as f64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_has_neutral_chroma() {
        let (y, cr, cb) = rgb_to_ycrcb(128.0, 128.0, 128.0);
        assert!((y - 128.0).abs() < 1e-9);
        assert!((cr - 128.0).abs() < 1e-9);
        assert!((cb - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_round_trip() {
        for &(r, g, b) in &[(255.0, 0.0, 0.0), (12.0, 200.0, 99.0), (0.0, 0.0, 255.0)] {
            let (y, cr, cb) = rgb_to_ycrcb(r, g, b);
            let (r2, g2, b2) = ycrcb_to_rgb(y, cr, cb);
            assert!((r - r2).abs() < 1.0, "r {} vs {}", r, r2);
            assert!((g - g2).abs() < 1.0, "g {} vs {}", g, g2);
            assert!((b - b2).abs() < 1.0, "b {} vs {}", b, b2);
        }
    }

    #[test]
    fn test_image_round_trip_unchanged() {
        let img = RgbImage::from_fn(16, 8, |x, y| Rgb([(x * 15) as u8, (y * 30) as u8, 90]));
        let split = LumaChroma::from_rgb(&img);
        assert_eq!(split.luma.width(), 16);
        assert_eq!(split.luma.height(), 8);

        let back = split.to_rgb();
        for (a, b) in img.pixels().zip(back.pixels()) {
            for c in 0..3 {
                assert!((a[c] as i32 - b[c] as i32).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_luma_plane_matches_split() {
        let img = RgbImage::from_fn(4, 4, |x, y| Rgb([(x * 60) as u8, 10, (y * 60) as u8]));
        let plane = luma_plane(&img);
        let split = LumaChroma::from_rgb(&img);
        assert_eq!(plane, split.luma);
    }
}
