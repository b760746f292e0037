//! CPU port of a pair of GLSL fragment pipelines that were originally used
//! to validate GPU output: packing an RGB image into an NV12-style YUV
//! layout through a single-texture "conversion pass", and a decorative
//! hexagon mosaic filter.
//!
//! The packer is a pure per-texel function. The conversion texture it fills
//! has the same dimensions as the source image and is split into three
//! horizontal bands: the top third carries the luma plane (three Y bytes per
//! texel), the next sixth carries interleaved, 2x2 box-filtered chroma, and
//! the remainder is zero padding. Reading the first `width * height * 3 / 2`
//! bytes of that texture row-major yields a plain NV12 buffer.
//!
//! ```
//! use fragpack::{Nv12ImageMut, RgbImage, rgb_to_nv12};
//!
//! let (width, height) = (8, 6);
//! let rgb = vec![0u8; width * height * 3];
//! let src = RgbImage::new(&rgb, width, height)?;
//!
//! let mut buf = vec![0u8; fragpack::nv12_size(width, height)];
//! let mut dst = Nv12ImageMut::from_buffer(&mut buf, width, height)?;
//!
//! rgb_to_nv12(&src, &mut dst)?;
//! # Ok::<(), fragpack::PackError>(())
//! ```

pub use color::{rgb_to_yuv, yuv_to_rgb};
pub use formats::hex::HexMosaic;
pub use formats::nv12::{nv12_to_rgb, pack_texel, pack_texture, rgb_to_nv12};
pub use image::{Nv12Image, Nv12ImageMut, RgbImage};
#[cfg(feature = "multi-thread")]
pub use multi_thread::{pack_texture_multi_thread, rgb_to_nv12_multi_thread};

mod color;
mod formats;
mod image;
#[cfg(feature = "multi-thread")]
mod multi_thread;

/// Everything that can go wrong when wiring buffers up for a conversion
///
/// The per-texel functions themselves are total and never fail.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("width and height must not be zero")]
    ZeroDimension,

    #[error(
        "unsupported dimensions {width}x{height}, the conversion texture needs an even width and a height divisible by 6"
    )]
    UnsupportedDimensions { width: usize, height: usize },

    #[error("NV12 needs even dimensions, got {width}x{height}")]
    OddDimensions { width: usize, height: usize },

    #[error("source is {src_width}x{src_height} but destination is {dst_width}x{dst_height}")]
    DimensionMismatch {
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
    },

    #[error("invalid {plane} plane size, expected {expected} but got {got}")]
    InvalidPlaneSize {
        plane: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Byte size of the conversion texture for the given image dimensions
pub fn texture_size(width: usize, height: usize) -> usize {
    width * height * 3
}

/// Byte size of an NV12 buffer for the given image dimensions
pub fn nv12_size(width: usize, height: usize) -> usize {
    (width * height * 12).div_ceil(8)
}

/// Check that the three vertical bands of the conversion texture land on
/// whole rows and that chroma pairs land on whole texels
pub(crate) fn verify_pack_dimensions(width: usize, height: usize) -> Result<(), PackError> {
    if width == 0 || height == 0 {
        return Err(PackError::ZeroDimension);
    }

    if width % 2 != 0 || height % 6 != 0 {
        return Err(PackError::UnsupportedDimensions { width, height });
    }

    Ok(())
}
