//! Header logo. PNG and JPEG sources are decoded and stored as
//! Flate-compressed RGB, plus a grey soft mask when the source has alpha.

use image::DynamicImage;
use miniz_oxide::deflate::compress_to_vec_zlib;

/// Drawn when no logo file is configured.
pub const DEFAULT_LOGO: &[u8] = include_bytes!("../assets/logo.png");

const COMPRESSION: u8 = 6;

#[derive(Debug, Clone)]
pub struct Logo {
    pub width: u32,
    pub height: u32,
    /// zlib-compressed 8-bit RGB samples.
    pub rgb: Vec<u8>,
    /// zlib-compressed 8-bit alpha samples.
    pub alpha: Option<Vec<u8>>,
}

impl Logo {
    pub fn decode(data: &[u8]) -> Result<Self, image::ImageError> {
        let image = image::load_from_memory(data)?;
        Ok(Self::from_image(&image))
    }

    fn from_image(image: &DynamicImage) -> Self {
        let alpha = image.color().has_alpha().then(|| {
            let samples: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
            compress_to_vec_zlib(&samples, COMPRESSION)
        });
        Self {
            width: image.width(),
            height: image.height(),
            rgb: compress_to_vec_zlib(image.to_rgb8().as_raw(), COMPRESSION),
            alpha,
        }
    }
}

#[cfg(test)]
pub(crate) fn jpeg_sample(width: u32, height: u32) -> Vec<u8> {
    use std::io::Cursor;

    let image = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200, 40, 40]),
    ));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

#[cfg(test)]
mod tests {
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    use super::*;

    #[test]
    fn default_logo_is_a_transparent_png() {
        let logo = Logo::decode(DEFAULT_LOGO).unwrap();
        assert_eq!((logo.width, logo.height), (250, 100));
        let rgb = decompress_to_vec_zlib(&logo.rgb).unwrap();
        assert_eq!(rgb.len(), 250 * 100 * 3);
        let alpha = decompress_to_vec_zlib(logo.alpha.as_ref().unwrap()).unwrap();
        assert_eq!(alpha.len(), 250 * 100);
        assert_eq!(alpha[0], 0);
    }

    #[test]
    fn jpeg_has_no_mask() {
        let logo = Logo::decode(&jpeg_sample(120, 48)).unwrap();
        assert_eq!((logo.width, logo.height), (120, 48));
        assert!(logo.alpha.is_none());
    }

    #[test]
    fn other_formats_are_rejected() {
        assert!(Logo::decode(b"GIF89a\x01\x00\x01\x00").is_err());
        assert!(Logo::decode(b"not an image").is_err());
    }
}
