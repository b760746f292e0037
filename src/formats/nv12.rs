//! The conversion-texture packer and its NV12 views.
//!
//! The texture addressing mirrors what a fragment pass over a full-screen
//! quad evaluates, re-derived as exact integer arithmetic so the band
//! boundaries cannot fall on a rounding edge: a fragment's normalized
//! coordinate is always `(x + 0.5) / width`, and every place the original
//! float math lands on a texel has a closed integer form.

use crate::color::{normalize, quantize, rgb_to_yuv, yuv_to_rgb};
use crate::image::{Nv12Image, Nv12ImageMut, RgbImage};
use crate::{PackError, verify_pack_dimensions};

/// Evaluate one texel of the conversion texture
///
/// The texture has the same dimensions as `src` and is split into three
/// horizontal bands:
///
/// * Rows `0..h / 3` carry the luma plane. The texel at `(x, y)` is
///   reinterpreted as the linear byte index `3 * (y * w + x)` into the Y
///   plane, and the three source texels that index points at are each
///   converted to YUV; their Y values fill the texel's three channels.
/// * Rows `h / 3..h / 2` carry interleaved chroma. Two adjacent 2x2 source
///   blocks are box-filtered to two `(u, v)` pairs, and the four resulting
///   values are squeezed into three channels by column parity: even columns
///   store `(u0, v0, u1)`, odd columns `(v0, u1, v1)`.
/// * Everything below `h / 2` is zero padding.
///
/// Horizontal sampling wraps around within the row, never advancing to the
/// next one. That is a boundary artifact of the coordinate math being
/// taken modulo 1.0 and is kept for bit compatibility with GPU output.
///
/// # Panics
///
/// May panic if `(x, y)` lies outside the texture or if the image
/// dimensions violate the conversion contract (even width, height divisible
/// by 6). The whole-image drivers check both up front.
pub fn pack_texel(src: &RgbImage<'_>, x: usize, y: usize) -> [u8; 3] {
    let h = src.height();

    if y < h / 3 {
        luma_texel(src, x, y)
    } else if y < h / 2 {
        chroma_texel(src, x, y - h / 3)
    } else {
        [0, 0, 0]
    }
}

fn luma_texel(src: &RgbImage<'_>, x: usize, y: usize) -> [u8; 3] {
    let w = src.width();

    // Linear byte index 3 * (y * w + x), split back into a source position.
    // The row is fixed for all three fetches, only the column wraps.
    let row = 3 * y + (3 * x) / w;
    let col = (3 * x) % w;

    let mut out = [0u8; 3];
    for (k, out) in out.iter_mut().enumerate() {
        let yuv = rgb_to_yuv(src.fetch((col + k) % w, row));
        *out = quantize(yuv[0]);
    }

    out
}

fn chroma_texel(src: &RgbImage<'_>, x: usize, dy: usize) -> [u8; 3] {
    let w = src.width();

    // Nearest-texel positions of the scaled band coordinate: the fragment
    // center lands on source row 6 * dy + 3 and columns 3 * x + 1, 3 * x + 2
    let row = 6 * dy + 3;
    let (u0, v0) = chroma_block(src, 3 * x + 1, row);
    let (u1, v1) = chroma_block(src, 3 * x + 2, row);

    if x % 2 == 0 {
        [quantize(u0), quantize(v0), quantize(u1)]
    } else {
        [quantize(v0), quantize(u1), quantize(v1)]
    }
}

/// Box filter the 2x2 block whose top-left texel is `(col, row)`
///
/// Columns wrap around the row end; `row + 1` stays in bounds for every row
/// the chroma band can produce.
fn chroma_block(src: &RgbImage<'_>, col: usize, row: usize) -> (f32, f32) {
    let w = src.width();

    let mut u = 0.0;
    let mut v = 0.0;
    for (dx, dy) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        let yuv = rgb_to_yuv(src.fetch((col + dx) % w, row + dy));
        u += yuv[1];
        v += yuv[2];
    }

    (u * 0.25, v * 0.25)
}

pub(crate) fn pack_luma_rows(src: &RgbImage<'_>, first_row: usize, out: &mut [u8]) {
    let stride = src.width() * 3;

    for (row, out) in out.chunks_exact_mut(stride).enumerate() {
        for (x, texel) in out.chunks_exact_mut(3).enumerate() {
            texel.copy_from_slice(&luma_texel(src, x, first_row + row));
        }
    }
}

pub(crate) fn pack_chroma_rows(src: &RgbImage<'_>, first_row: usize, out: &mut [u8]) {
    let stride = src.width() * 3;

    for (row, out) in out.chunks_exact_mut(stride).enumerate() {
        for (x, texel) in out.chunks_exact_mut(3).enumerate() {
            texel.copy_from_slice(&chroma_texel(src, x, first_row + row));
        }
    }
}

pub(crate) fn verify_texture_args(src: &RgbImage<'_>, dst: &[u8]) -> Result<(), PackError> {
    verify_pack_dimensions(src.width(), src.height())?;

    let expected = crate::texture_size(src.width(), src.height());
    if dst.len() != expected {
        return Err(PackError::InvalidPlaneSize {
            plane: "texture",
            expected,
            got: dst.len(),
        });
    }

    Ok(())
}

pub(crate) fn verify_nv12_args(
    src: &RgbImage<'_>,
    dst: &Nv12ImageMut<'_>,
) -> Result<(), PackError> {
    verify_pack_dimensions(src.width(), src.height())?;

    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(PackError::DimensionMismatch {
            src_width: src.width(),
            src_height: src.height(),
            dst_width: dst.width(),
            dst_height: dst.height(),
        });
    }

    Ok(())
}

/// Fill the complete conversion texture (`width * height * 3` bytes)
pub fn pack_texture(src: &RgbImage<'_>, dst: &mut [u8]) -> Result<(), PackError> {
    verify_texture_args(src, dst)?;

    let (w, h) = (src.width(), src.height());
    let stride = w * 3;

    let (luma, rest) = dst.split_at_mut(h / 3 * stride);
    let (chroma, zero) = rest.split_at_mut(h / 6 * stride);

    pack_luma_rows(src, 0, luma);
    pack_chroma_rows(src, 0, chroma);
    zero.fill(0);

    Ok(())
}

/// Convert an RGB image into NV12 planes
///
/// Equivalent to taking the first `width * height * 3 / 2` bytes of
/// [`pack_texture`]'s output, without materializing the zero band.
pub fn rgb_to_nv12(src: &RgbImage<'_>, dst: &mut Nv12ImageMut<'_>) -> Result<(), PackError> {
    verify_nv12_args(src, dst)?;

    let (y, uv) = dst.planes_mut();

    pack_luma_rows(src, 0, y);
    pack_chroma_rows(src, 0, uv);

    Ok(())
}

/// Reconstruct an RGB image from NV12 planes
///
/// Chroma is upsampled nearest-neighbor, so this is only an approximate
/// inverse of [`rgb_to_nv12`].
pub fn nv12_to_rgb(src: &Nv12Image<'_>, dst: &mut [u8]) -> Result<(), PackError> {
    let (w, h) = (src.width(), src.height());

    let expected = w * h * 3;
    if dst.len() != expected {
        return Err(PackError::InvalidPlaneSize {
            plane: "rgb",
            expected,
            got: dst.len(),
        });
    }

    for (y, out) in dst.chunks_exact_mut(w * 3).enumerate() {
        let luma_row = &src.y[y * w..][..w];
        let uv_row = &src.uv[y / 2 * w..][..w];

        for (x, texel) in out.chunks_exact_mut(3).enumerate() {
            let pair = x / 2 * 2;
            let rgb = yuv_to_rgb([
                normalize(luma_row[x]),
                normalize(uv_row[pair]),
                normalize(uv_row[pair + 1]),
            ]);

            texel[0] = quantize(rgb[0]);
            texel[1] = quantize(rgb[1]);
            texel[2] = quantize(rgb[2]);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: usize, h: usize, rgb: [u8; 3]) -> Vec<u8> {
        rgb.iter().copied().cycle().take(w * h * 3).collect()
    }

    #[test]
    fn zero_band_is_zero() {
        let buf = solid(6, 12, [200, 10, 60]);
        let src = RgbImage::new(&buf, 6, 12).unwrap();

        for y in 6..12 {
            for x in 0..6 {
                assert_eq!(pack_texel(&src, x, y), [0, 0, 0]);
            }
        }
    }

    #[test]
    fn luma_band_reads_three_consecutive_texels() {
        let w = 8;
        let mut buf = solid(w, 6, [0, 0, 0]);
        // Distinct values along row 1, so texel (3, 0) sees indices 9, 10, 11
        for x in 0..w {
            buf[(w + x) * 3] = 10 * x as u8;
        }
        let src = RgbImage::new(&buf, w, 6).unwrap();

        let texel = pack_texel(&src, 3, 0);
        let expected: Vec<u8> = (1..4)
            .map(|x| quantize(rgb_to_yuv(src.fetch(x, 1))[0]))
            .collect();

        assert_eq!(texel, expected[..]);
    }

    #[test]
    fn luma_sampling_wraps_within_the_row() {
        let w = 8;
        let mut buf = solid(w, 6, [0, 0, 0]);
        buf[0] = 255; // texel (0, 0)
        let src = RgbImage::new(&buf, w, 6).unwrap();

        // (3 * 2) % 8 = 6, so the window is columns 6, 7, 0 of row 0
        let texel = pack_texel(&src, 2, 0);

        assert_eq!(texel[2], quantize(rgb_to_yuv(src.fetch(0, 0))[0]));
        assert_eq!(texel[0], texel[1]);
        assert_ne!(texel[2], texel[0]);
    }

    #[test]
    fn nv12_matches_texture_prefix() {
        let w = 10;
        let h = 12;
        let buf: Vec<u8> = (0..w * h * 3).map(|i| (i * 37 % 256) as u8).collect();
        let src = RgbImage::new(&buf, w, h).unwrap();

        let mut texture = vec![0u8; crate::texture_size(w, h)];
        pack_texture(&src, &mut texture).unwrap();

        let mut nv12 = vec![0u8; crate::nv12_size(w, h)];
        let mut dst = Nv12ImageMut::from_buffer(&mut nv12, w, h).unwrap();
        rgb_to_nv12(&src, &mut dst).unwrap();

        assert_eq!(&texture[..nv12.len()], &nv12[..]);
        assert!(texture[nv12.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn dimension_checks() {
        let buf = solid(6, 4, [0, 0, 0]);
        let src = RgbImage::new(&buf, 6, 4).unwrap();
        let mut texture = vec![0u8; crate::texture_size(6, 4)];

        // Height not divisible by 6
        assert!(matches!(
            pack_texture(&src, &mut texture),
            Err(PackError::UnsupportedDimensions {
                width: 6,
                height: 4,
            })
        ));

        let buf = solid(6, 12, [0, 0, 0]);
        let src = RgbImage::new(&buf, 6, 12).unwrap();
        let mut short = vec![0u8; 10];

        assert!(matches!(
            pack_texture(&src, &mut short),
            Err(PackError::InvalidPlaneSize { plane: "texture", .. })
        ));
    }
}
