use bevy::math::UVec3;
use bevy::prelude::*;
use bevy::render::render_resource::TextureFormat;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use thiserror::Error;

use super::NoiseMapSettings;
use crate::math;

/// Failure to turn an image or raw buffer into a [`Heightmap`].
#[derive(Debug, Error)]
pub enum HeightmapError {
    /// The source has zero width or height.
    #[error("heightmap is empty")]
    Empty,
    /// The number of samples does not match `width * height`.
    #[error("heightmap has {actual} samples, expected {expected}")]
    SizeMismatch {
        /// `width * height`.
        expected: usize,
        /// Samples actually provided.
        actual: usize,
    },
    /// The image uses a pixel format without an 8-bit red channel.
    #[error("unsupported heightmap pixel format {0:?}")]
    UnsupportedFormat(TextureFormat),
    /// The image has no CPU-side pixel data for this coordinate.
    #[error("heightmap pixel ({x}, {y}) is not readable")]
    MissingPixel {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
    },
}

/// Single-channel height samples (0–255), row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heightmap {
    width: u32,
    height: u32,
    values: Vec<u8>,
}

impl Heightmap {
    /// Wraps raw row-major samples.
    pub fn new(width: u32, height: u32, values: Vec<u8>) -> Result<Self, HeightmapError> {
        if width == 0 || height == 0 {
            return Err(HeightmapError::Empty);
        }
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(HeightmapError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Reads the red channel of every pixel of `image`.
    ///
    /// Any unreadable pixel fails the whole read; no partial heightmap is
    /// returned.
    pub fn from_image(image: &Image) -> Result<Self, HeightmapError> {
        let format = image.texture_descriptor.format;
        let red = match format {
            TextureFormat::R8Unorm | TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => 0,
            TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb => 2,
            other => return Err(HeightmapError::UnsupportedFormat(other)),
        };

        let (width, height) = (image.width(), image.height());
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let value = image
                    .pixel_bytes(UVec3::new(x, y, 0))
                    .and_then(|bytes| bytes.get(red).copied())
                    .ok_or(HeightmapError::MissingPixel { x, y })?;
                values.push(value);
            }
        }

        info!(
            "Topography read ({width} x {height}, {} tiles).",
            values.len()
        );
        Self::new(width, height, values)
    }

    /// Generates samples from fractal Perlin noise.
    pub fn from_noise(settings: &NoiseMapSettings) -> Result<Self, HeightmapError> {
        let fbm: Fbm<Perlin> = Fbm::new(settings.seed).set_octaves(settings.octaves);
        let values = (0..settings.height)
            .flat_map(|y| (0..settings.width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let noise_val = fbm.get([
                    f64::from(x) / settings.noise_scale,
                    f64::from(y) / settings.noise_scale,
                ]);
                math::map_noise_to_range(noise_val, 0.0, settings.max_value)
                    .round()
                    .clamp(0.0, 255.0) as u8
            })
            .collect();

        debug!(
            "Generated {} x {} noise heightmap (seed {}).",
            settings.width, settings.height, settings.seed
        );
        Self::new(settings.width, settings.height, values)
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample at `(x, y)`; both must be in range.
    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.values[(x + y * self.width) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::render::render_resource::{Extent3d, TextureDimension};

    fn image(width: u32, height: u32, data: Vec<u8>, format: TextureFormat) -> Image {
        Image::new(
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            data,
            format,
            RenderAssetUsages::default(),
        )
    }

    #[test]
    fn new_rejects_empty_and_mismatched_buffers() {
        assert!(matches!(Heightmap::new(0, 3, vec![]), Err(HeightmapError::Empty)));
        assert!(matches!(
            Heightmap::new(2, 2, vec![1, 2, 3]),
            Err(HeightmapError::SizeMismatch { expected: 4, .. })
        ));
    }

    #[test]
    fn from_image_reads_red_channel() {
        let data = vec![
            10, 200, 200, 255, //
            20, 0, 0, 255, //
            30, 0, 0, 255, //
            40, 9, 9, 255,
        ];
        let map = Heightmap::from_image(&image(2, 2, data, TextureFormat::Rgba8UnormSrgb)).unwrap();
        assert_eq!((map.width(), map.height()), (2, 2));
        assert_eq!(map.value(0, 0), 10);
        assert_eq!(map.value(1, 0), 20);
        assert_eq!(map.value(0, 1), 30);
        assert_eq!(map.value(1, 1), 40);
    }

    #[test]
    fn from_image_reads_red_from_bgra() {
        let data = vec![1, 2, 99, 255];
        let map = Heightmap::from_image(&image(1, 1, data, TextureFormat::Bgra8UnormSrgb)).unwrap();
        assert_eq!(map.value(0, 0), 99);
    }

    #[test]
    fn from_image_rejects_float_formats() {
        let img = image(1, 1, vec![0; 16], TextureFormat::Rgba32Float);
        assert!(matches!(
            Heightmap::from_image(&img),
            Err(HeightmapError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn noise_heightmap_has_requested_size_and_is_deterministic() {
        let settings = NoiseMapSettings {
            width: 8,
            height: 6,
            ..NoiseMapSettings::default()
        };
        let a = Heightmap::from_noise(&settings).unwrap();
        let b = Heightmap::from_noise(&settings).unwrap();
        assert_eq!((a.width(), a.height()), (8, 6));
        assert_eq!(a, b);
    }
}
