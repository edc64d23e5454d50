//! GPU texture resource

use crate::assets::ImageData;
use crate::device::{GraphicsDevice, TextureHandle};

/// Texture resident on the GPU
///
/// Wraps the device handle together with the pixel dimensions it was created
/// with. Copyable; the GPU resource is released only by an explicit
/// [`dispose`](Texture::dispose).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    handle: TextureHandle,
    width: u32,
    height: u32,
}

impl Texture {
    /// Upload decoded image data to the GPU
    pub fn from_image(device: &mut dyn GraphicsDevice, image: &ImageData) -> Self {
        Self::from_rgba(device, image.width, image.height, &image.data)
    }

    /// Upload raw RGBA8 pixels to the GPU
    pub fn from_rgba(
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Self {
        let handle = device.create_texture(width, height, rgba);
        log::debug!("texture uploaded: {}x{}", width, height);
        Self {
            handle,
            width,
            height,
        }
    }

    /// The device handle
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bind as the current texture
    pub fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.bind_texture(Some(self.handle));
    }

    /// Unbind whatever texture is current
    pub fn unbind(device: &mut dyn GraphicsDevice) {
        device.bind_texture(None);
    }

    /// Release the GPU resource
    pub fn dispose(self, device: &mut dyn GraphicsDevice) {
        device.delete_texture(self.handle);
    }
}
