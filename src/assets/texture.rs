//! Texture decoding.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::LoadError;

/// How texel values are interpreted when sampled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// sRGB-encoded color, decoded to linear on sampling.
    #[default]
    Srgb,
    /// Raw data (normal maps, masks).
    Linear,
}

/// Decoded RGBA8 image with its declared color space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Source path, used for GPU labels and logs.
    pub label: String,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Tightly packed RGBA8 rows, top row first.
    pub pixels: Vec<u8>,
    /// Color space the renderer must sample it in.
    pub color_space: ColorSpace,
}

impl TextureData {
    /// Decode an encoded image (PNG, JPEG, ...). With `flip_y` the rows are
    /// reversed so the bottom row comes first.
    pub fn decode(
        label: &str,
        bytes: &[u8],
        color_space: ColorSpace,
        flip_y: bool,
    ) -> Result<Self, LoadError> {
        let mut image = image::load_from_memory(bytes)
            .map_err(|e| LoadError::decode(label, e))?
            .to_rgba8();
        if flip_y {
            image::imageops::flip_vertical_in_place(&mut image);
        }
        Ok(Self {
            label: label.to_owned(),
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
            color_space,
        })
    }

    /// 1x1 texture of a single color, used where a material has no map.
    #[must_use]
    pub fn solid(label: &str, rgba: [u8; 4], color_space: ColorSpace) -> Self {
        Self {
            label: label.to_owned(),
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
            color_space,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use super::*;

    /// PNG-encoded 1x2 image: red on top, blue below.
    pub(crate) fn two_row_png() -> Vec<u8> {
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_rows_top_first() {
        let tex =
            TextureData::decode("t.png", &two_row_png(), ColorSpace::Srgb, false)
                .unwrap();
        assert_eq!((tex.width, tex.height), (1, 2));
        assert_eq!(&tex.pixels[..4], &[255, 0, 0, 255]);
        assert_eq!(tex.color_space, ColorSpace::Srgb);
    }

    #[test]
    fn flip_y_reverses_rows() {
        let tex =
            TextureData::decode("t.png", &two_row_png(), ColorSpace::Linear, true)
                .unwrap();
        assert_eq!(&tex.pixels[..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = TextureData::decode("t.jpg", b"not an image", ColorSpace::Srgb, false)
            .unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
        assert!(!err.is_retryable());
    }
}
