//! Image loading utilities for texture data
//!
//! Decodes PNG files into RGBA8 pixel data ready for GPU upload.

use std::path::Path;

use crate::assets::AssetError;

/// Decoded image data ready for GPU upload
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("loading image from {:?}", path);

        let decoded = image::open(path).map_err(|e| AssetError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::info!("loaded image {}x{} from {:?}", width, height, path);

        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Load an image from memory (useful for embedded resources)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let result = ImageData::from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(matches!(result, Err(AssetError::Decode(_))));
    }

    #[test]
    fn test_minimal_png_round_trips_dimensions() {
        // 1x1 opaque red pixel, encoded with the PNG crate itself so the
        // fixture cannot rot
        let mut encoded = Vec::new();
        {
            use image::ImageEncoder;
            let encoder = image::codecs::png::PngEncoder::new(&mut encoded);
            encoder
                .write_image(&[255u8, 0, 0, 255], 1, 1, image::ExtendedColorType::Rgba8)
                .unwrap();
        }

        let decoded = ImageData::from_bytes(&encoded).unwrap();

        assert_eq!(decoded.width, 1);
        assert_eq!(decoded.height, 1);
        assert_eq!(decoded.data, vec![255, 0, 0, 255]);
    }
}
