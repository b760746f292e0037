//! BT.601 studio-range transform, with the exact coefficients the GPU
//! pipeline bakes into its conversion pass.

/// Forward matrix, rows Y/U/V applied to the column vector `(R, G, B, 1)`.
///
/// These constants are the wire contract and are stored verbatim. Note that
/// what this pipeline calls "U" is the Cr formula in BT.601 nomenclature and
/// "V" the Cb formula; the swap is part of the byte layout and must not be
/// normalized away.
pub(crate) const RGB_TO_YUV: [[f32; 4]; 3] = [
    [0.257, 0.504, 0.098, 0.0625],
    [0.439, -0.368, -0.071, 0.500],
    [-0.148, -0.291, 0.439, 0.500],
];

/// Convert one normalized RGB sample to `[y, u, v]`
#[inline]
pub fn rgb_to_yuv([r, g, b]: [f32; 3]) -> [f32; 3] {
    let row = |m: &[f32; 4]| m[0] * r + m[1] * g + m[2] * b + m[3];

    [
        row(&RGB_TO_YUV[0]),
        row(&RGB_TO_YUV[1]),
        row(&RGB_TO_YUV[2]),
    ]
}

/// Convert one normalized `[y, u, v]` sample back to RGB
///
/// Standard studio-range inverse. The Cr coefficients are applied to the u
/// channel and the Cb coefficients to the v channel, mirroring the forward
/// transform's channel order. Only an approximate inverse once chroma has
/// been subsampled.
#[inline]
pub fn yuv_to_rgb([y, u, v]: [f32; 3]) -> [f32; 3] {
    let y = 1.164 * (y - 0.0625);
    let cr = u - 0.5;
    let cb = v - 0.5;

    [
        y + 1.596 * cr,
        y - 0.813 * cr - 0.391 * cb,
        y + 2.018 * cb,
    ]
}

/// Quantize to a byte the way GL stores a clamped float into an UNORM8
/// framebuffer channel
#[inline]
pub(crate) fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
pub(crate) fn normalize(v: u8) -> f32 {
    f32::from(v) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_matches_reference_values() {
        let [y, u, v] = rgb_to_yuv([1.0, 0.0, 0.0]);

        assert!((y - 0.3195).abs() < 1e-6);
        assert!((u - 0.939).abs() < 1e-6);
        assert!((v - 0.352).abs() < 1e-6);
    }

    #[test]
    fn inverse_recovers_primaries() {
        for rgb in [
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.25, 0.5, 0.75],
        ] {
            let back = yuv_to_rgb(rgb_to_yuv(rgb));

            for (a, b) in rgb.iter().zip(back) {
                assert!((a - b).abs() < 2e-3, "{rgb:?} came back as {back:?}");
            }
        }
    }

    #[test]
    fn quantize_clamps_out_of_range() {
        assert_eq!(quantize(-0.5), 0);
        assert_eq!(quantize(1.5), 255);
        assert_eq!(quantize(0.5), 128);
    }
}
