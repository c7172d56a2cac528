//! Image loading through the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage};
use crate::util::{FingerError, FingerResult};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> FingerResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Converts any decoded image to an owned 8-bit grayscale image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> FingerResult<OwnedImage> {
    let gray = img.to_luma8();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads a fingerprint image from disk as grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> FingerResult<OwnedImage> {
    let img = image::open(path).map_err(|err| FingerError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}
