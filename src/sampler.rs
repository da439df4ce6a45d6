//! Image sampling: turning a raster image into a particle field.
//!
//! The source is scaled to *cover* the surface (aspect ratio preserved, the
//! overflowing axis centred and cropped), then every `gap`-th pixel on both
//! axes becomes a particle unless it is nearly transparent or nearly black.
//! Dark pixels are tinted towards the accent colour so shadows stay visible
//! against the page background.
//!
//! When no image is available, [`placeholder_field`] scatters particles
//! inside a disk so the rest of the pipeline still has something to reveal.

use std::borrow::Cow;
use std::f32::consts::TAU;
use std::path::Path;

use glam::Vec2;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use rand::Rng;

use crate::config::PortraitConfig;
use crate::error::SourceError;
use crate::particle::Particle;
use crate::surface::{Rgb, SurfaceSize};

/// Placement of the scaled source image on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub draw_width: f32,
    pub draw_height: f32,
    /// Left edge of the drawn image; zero or negative.
    pub offset_x: f32,
    /// Top edge of the drawn image; zero or negative.
    pub offset_y: f32,
}

impl CoverFit {
    /// Scale `image` to fully cover `surface`, centring the overflow.
    pub fn new(image_width: f32, image_height: f32, surface_width: f32, surface_height: f32) -> Self {
        let image_aspect = image_width / image_height;
        let surface_aspect = surface_width / surface_height;

        if image_aspect > surface_aspect {
            // Wider than the surface: fit height, crop the sides.
            let draw_width = surface_height * image_aspect;
            Self {
                draw_width,
                draw_height: surface_height,
                offset_x: (surface_width - draw_width) / 2.0,
                offset_y: 0.0,
            }
        } else {
            let draw_height = surface_width / image_aspect;
            Self {
                draw_width: surface_width,
                draw_height,
                offset_x: 0.0,
                offset_y: (surface_height - draw_height) / 2.0,
            }
        }
    }

    /// Region of the source that lands on the surface, as `(x, y, w, h)` in
    /// source pixels. Always inside the image and at least 1x1.
    pub fn source_crop(
        &self,
        image_width: u32,
        image_height: u32,
        surface_width: f32,
        surface_height: f32,
    ) -> (u32, u32, u32, u32) {
        let scale_x = self.draw_width / image_width as f32;
        let scale_y = self.draw_height / image_height as f32;
        let axis = |offset: f32, visible: f32, scale: f32, len: u32| {
            let start = ((-offset / scale).floor().max(0.0) as u32).min(len - 1);
            let span = ((visible / scale).round().max(1.0) as u32).min(len - start);
            (start, span)
        };
        let (x, w) = axis(self.offset_x, surface_width, scale_x, image_width);
        let (y, h) = axis(self.offset_y, surface_height, scale_y, image_height);
        (x, y, w, h)
    }
}

/// Read and decode an image file.
pub fn load_source(path: impl AsRef<Path>) -> Result<RgbaImage, SourceError> {
    let image = image::open(path.as_ref())?.into_rgba8();
    non_empty(image)
}

/// Decode an in-memory encoded image (PNG, JPEG).
pub fn decode_source(bytes: &[u8]) -> Result<RgbaImage, SourceError> {
    let image = image::load_from_memory(bytes)?.into_rgba8();
    non_empty(image)
}

fn non_empty(image: RgbaImage) -> Result<RgbaImage, SourceError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(SourceError::EmptyImage);
    }
    Ok(image)
}

/// Sample `image` into particles laid out on a surface of `size`.
///
/// Positions are in logical pixels. Returns an empty vector for an
/// undrawable surface or an empty image.
pub fn sample_image<R: Rng + ?Sized>(
    image: &RgbaImage,
    size: SurfaceSize,
    config: &PortraitConfig,
    rng: &mut R,
) -> Vec<Particle> {
    if !size.is_drawable() || image.width() == 0 || image.height() == 0 {
        return Vec::new();
    }
    let width = size.width.floor() as u32;
    let height = size.height.floor() as u32;
    let fit = CoverFit::new(
        image.width() as f32,
        image.height() as f32,
        width as f32,
        height as f32,
    );

    // Only the visible part of the source is scaled, straight to surface size.
    let (crop_x, crop_y, crop_w, crop_h) =
        fit.source_crop(image.width(), image.height(), width as f32, height as f32);
    let scaled: Cow<'_, RgbaImage> = if (crop_x, crop_y, crop_w, crop_h) == (0, 0, width, height) {
        Cow::Borrowed(image)
    } else {
        let visible = imageops::crop_imm(image, crop_x, crop_y, crop_w, crop_h).to_image();
        Cow::Owned(imageops::resize(&visible, width, height, FilterType::Triangle))
    };

    let gap = config.gap.max(1) as usize;
    let mut particles = Vec::with_capacity((width as usize / gap + 1) * (height as usize / gap + 1));

    for y in (0..height).step_by(gap) {
        for x in (0..width).step_by(gap) {
            let [r, g, b, a] = scaled.get_pixel(x, y).0;
            if a < config.alpha_floor {
                continue;
            }
            let source = Rgb::new(r, g, b);
            let brightness = source.brightness();
            if brightness < config.brightness_floor {
                continue;
            }
            let color = if brightness < config.shadow_threshold {
                source.saturating_add(config.shadow_tint)
            } else {
                source
            };

            particles.push(Particle::at_rest(
                Vec2::new(x as f32, y as f32),
                color,
                config.particle_size + brightness / 255.0,
                brightness,
                height as f32,
                rng.gen::<f32>() * TAU,
                float_radius(config, rng),
            ));
        }
    }

    particles
}

/// Fallback field: `placeholder_count` teal particles inside a centred disk.
pub fn placeholder_field<R: Rng + ?Sized>(
    size: SurfaceSize,
    config: &PortraitConfig,
    rng: &mut R,
) -> Vec<Particle> {
    if !size.is_drawable() {
        return Vec::new();
    }
    let center = Vec2::new(size.width / 2.0, size.height / 2.0);
    let radius = size.width.min(size.height) * 0.35;

    (0..config.placeholder_count)
        .map(|_| {
            let angle = rng.gen::<f32>() * TAU;
            // sqrt for uniform disk
            let r = radius * rng.gen::<f32>().sqrt();
            let origin = center + Vec2::new(angle.cos(), angle.sin()) * r;
            let color = Rgb::new(
                0,
                155 + (rng.gen::<f32>() * 100.0) as u8,
                180 + (rng.gen::<f32>() * 50.0) as u8,
            );
            Particle::at_rest(
                origin,
                color,
                1.0 + rng.gen::<f32>() * 2.0,
                150.0,
                size.height,
                rng.gen::<f32>() * TAU,
                float_radius(config, rng),
            )
        })
        .collect()
}

fn float_radius<R: Rng + ?Sized>(config: &PortraitConfig, rng: &mut R) -> f32 {
    config.float_radius * (0.3 + 0.7 * rng.gen::<f32>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(px))
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(1)
    }

    #[test]
    fn test_cover_fit_wide_image_crops_sides() {
        let fit = CoverFit::new(200.0, 100.0, 100.0, 100.0);
        assert_eq!(fit.draw_height, 100.0);
        assert_eq!(fit.draw_width, 200.0);
        assert_eq!(fit.offset_x, -50.0);
        assert_eq!(fit.offset_y, 0.0);
    }

    #[test]
    fn test_cover_fit_tall_image_crops_top_and_bottom() {
        let fit = CoverFit::new(100.0, 400.0, 200.0, 100.0);
        assert_eq!(fit.draw_width, 200.0);
        assert_eq!(fit.draw_height, 800.0);
        assert_eq!(fit.offset_y, -350.0);
    }

    #[test]
    fn test_source_crop_stays_inside_image() {
        let fit = CoverFit::new(200.0, 100.0, 50.0, 50.0);
        assert_eq!(fit.source_crop(200, 100, 50.0, 50.0), (50, 0, 100, 100));

        let sliver = CoverFit::new(1.0, 2000.0, 200.0, 200.0);
        let (x, y, w, h) = sliver.source_crop(1, 2000, 200.0, 200.0);
        assert_eq!((x, w, h), (0, 1, 1));
        assert!(y < 2000);
    }

    #[test]
    fn test_extreme_aspect_samples_like_square() {
        let config = PortraitConfig::default();
        let size = SurfaceSize::new(200.0, 200.0);
        let square = sample_image(&solid(200, 200, [128, 128, 128, 255]), size, &config, &mut rng());

        let start = std::time::Instant::now();
        let strip = sample_image(&solid(1, 2000, [128, 128, 128, 255]), size, &config, &mut rng());
        let elapsed = start.elapsed();

        assert_eq!(strip.len(), square.len());
        assert_eq!(strip.len(), 67 * 67);
        assert!(elapsed < std::time::Duration::from_millis(500), "took {:?}", elapsed);
    }

    #[test]
    fn test_gray_square_stride_four() {
        let image = solid(100, 100, [128, 128, 128, 255]);
        let config = PortraitConfig::default().with_gap(4);
        let particles = sample_image(&image, SurfaceSize::new(100.0, 100.0), &config, &mut rng());

        assert_eq!(particles.len(), 625);
        for p in &particles {
            assert!((0.0..1.0).contains(&p.normalized_y));
            assert_eq!(p.color, Rgb::new(128, 128, 128));
            assert_eq!(p.position, p.origin);
        }
    }

    #[test]
    fn test_skips_transparent_and_black() {
        let config = PortraitConfig::default().with_gap(2);
        let size = SurfaceSize::new(20.0, 20.0);

        let transparent = solid(20, 20, [200, 200, 200, 10]);
        assert!(sample_image(&transparent, size, &config, &mut rng()).is_empty());

        let black = solid(20, 20, [5, 5, 5, 255]);
        assert!(sample_image(&black, size, &config, &mut rng()).is_empty());
    }

    #[test]
    fn test_dark_pixels_are_tinted() {
        let image = solid(10, 10, [40, 40, 40, 255]);
        let config = PortraitConfig::default().with_gap(5);
        let particles = sample_image(&image, SurfaceSize::new(10.0, 10.0), &config, &mut rng());
        assert_eq!(particles.len(), 4);
        assert!(particles.iter().all(|p| p.color == Rgb::new(50, 70, 65)));
    }

    #[test]
    fn test_size_grows_with_brightness() {
        let config = PortraitConfig::default().with_gap(10).with_particle_size(2.0);
        let white = sample_image(&solid(10, 10, [255, 255, 255, 255]), SurfaceSize::new(10.0, 10.0), &config, &mut rng());
        assert_eq!(white.len(), 1);
        assert!((white[0].size - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_sampling_covers_non_matching_surface() {
        // Half red, half blue horizontally; a narrow surface sees only the middle.
        let mut image = solid(200, 100, [255, 0, 0, 255]);
        for y in 0..100 {
            for x in 100..200 {
                image.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let config = PortraitConfig::default().with_gap(1);
        let particles = sample_image(&image, SurfaceSize::new(50.0, 50.0), &config, &mut rng());
        // Cover fit leaves no holes.
        assert_eq!(particles.len(), 50 * 50);
        assert!(particles.iter().all(|p| p.origin.x < 50.0 && p.origin.y < 50.0));
        let left = particles.iter().find(|p| p.origin == Vec2::new(0.0, 25.0)).unwrap();
        let right = particles.iter().find(|p| p.origin == Vec2::new(49.0, 25.0)).unwrap();
        assert!(left.color.r > left.color.b);
        assert!(right.color.b > right.color.r);
    }

    #[test]
    fn test_same_inputs_same_layout() {
        let image = solid(30, 30, [100, 150, 200, 255]);
        let config = PortraitConfig::default();
        let size = SurfaceSize::new(30.0, 30.0);
        let a = sample_image(&image, size, &config, &mut SmallRng::seed_from_u64(1));
        let b = sample_image(&image, size, &config, &mut SmallRng::seed_from_u64(2));
        let layout = |ps: &[Particle]| ps.iter().map(|p| (p.origin, p.color)).collect::<Vec<_>>();
        assert_eq!(layout(&a), layout(&b));
    }

    #[test]
    fn test_undrawable_surface_yields_nothing() {
        let image = solid(10, 10, [255, 255, 255, 255]);
        let config = PortraitConfig::default();
        assert!(sample_image(&image, SurfaceSize::new(0.0, 10.0), &config, &mut rng()).is_empty());
        assert!(placeholder_field(SurfaceSize::new(10.0, 0.0), &config, &mut rng()).is_empty());
    }

    #[test]
    fn test_placeholder_stays_inside_disk() {
        let config = PortraitConfig::default();
        let size = SurfaceSize::new(200.0, 100.0);
        let particles = placeholder_field(size, &config, &mut rng());
        assert_eq!(particles.len(), config.placeholder_count);
        let center = Vec2::new(100.0, 50.0);
        for p in &particles {
            assert!(p.origin.distance(center) <= 35.0 + 1e-3);
            assert_eq!(p.color.r, 0);
            assert!(p.color.g >= 155);
        }
    }

    #[test]
    fn test_decode_garbage_is_error() {
        let err = decode_source(b"not an image").unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(load_source("/no/such/portrait.png").is_err());
    }
}
