use crate::PackError;
use crate::color::quantize;
use crate::image::RgbImage;
use std::f32::consts::PI;

/// Hexagon mosaic filter
///
/// Pixels near the outline of a hexagonal cell grid are filled with a
/// blurred average of the source image around the cell's center, everything
/// else turns black. The right half of the frame additionally gets a
/// stepped grayscale vignette. The defaults reproduce the decorative filter
/// this was ported from; all knobs are in pixel units.
#[derive(Debug, Clone, Copy)]
pub struct HexMosaic {
    /// Circumradius of the hexagon cells
    pub poly_radius: f32,
    /// Width of the rendered cell outlines
    pub line_width: f32,
    /// Number of samples averaged into a cell's fill color
    pub ring_samples: usize,
    /// Per-step attenuation of the right-half vignette
    pub vignette_decay: f32,
}

impl Default for HexMosaic {
    fn default() -> Self {
        Self {
            poly_radius: 15.0,
            line_width: 2.0,
            ring_samples: 20,
            vignette_decay: 0.947,
        }
    }
}

const NUM_POINTS: usize = 6;

impl HexMosaic {
    /// Evaluate the filter for the pixel at (x, y)
    pub fn filter_pixel(&self, src: &RgbImage<'_>, x: usize, y: usize) -> [u8; 3] {
        let frag = [x as f32 + 0.5, y as f32 + 0.5];
        let origin = self.find_origin(frag);

        if !self.is_in_polygon(frag, origin) {
            return [0, 0, 0];
        }

        let mut color = self.bg_color(src, origin, x);

        let d_phase = 2.0 * PI / self.ring_samples as f32;
        for i in 0..self.ring_samples {
            let phase = i as f32 * d_phase;
            let mult = (i + 1) as f32 / self.ring_samples as f32;
            let sample = self.bg_color(
                src,
                [
                    origin[0] + mult * self.poly_radius * phase.cos(),
                    origin[1] + mult * self.poly_radius * phase.sin(),
                ],
                x,
            );

            for (color, sample) in color.iter_mut().zip(sample) {
                *color += sample;
            }
        }

        let norm = (self.ring_samples + 1) as f32;
        [
            quantize(color[0] / norm),
            quantize(color[1] / norm),
            quantize(color[2] / norm),
        ]
    }

    /// Filter the whole image into a `width * height * 3` byte buffer
    pub fn apply(&self, src: &RgbImage<'_>, dst: &mut [u8]) -> Result<(), PackError> {
        self.verify_args(src, dst)?;
        self.filter_rows(src, 0, dst);

        Ok(())
    }

    pub(crate) fn verify_args(&self, src: &RgbImage<'_>, dst: &[u8]) -> Result<(), PackError> {
        let expected = src.width() * src.height() * 3;
        if dst.len() != expected {
            return Err(PackError::InvalidPlaneSize {
                plane: "rgb",
                expected,
                got: dst.len(),
            });
        }

        Ok(())
    }

    pub(crate) fn filter_rows(&self, src: &RgbImage<'_>, first_row: usize, out: &mut [u8]) {
        let stride = src.width() * 3;

        for (row, out) in out.chunks_exact_mut(stride).enumerate() {
            for (x, texel) in out.chunks_exact_mut(3).enumerate() {
                texel.copy_from_slice(&self.filter_pixel(src, x, first_row + row));
            }
        }
    }

    /// Snap a fragment position to the nearest lattice point of the cell
    /// grid, later candidates winning ties
    fn find_origin(&self, frag: [f32; 2]) -> [f32; 2] {
        let vrad = [2.0 * self.poly_radius, 1.7 * self.poly_radius];

        let down = [
            (frag[0] / vrad[0]).floor() * vrad[0],
            (frag[1] / vrad[1]).floor() * vrad[1],
        ];
        let up = [
            (frag[0] / vrad[0]).ceil() * vrad[0],
            (frag[1] / vrad[1]).ceil() * vrad[1],
        ];
        let du = [down[0], up[1]];
        let ud = [up[0], down[1]];

        let mut origin = down;
        for candidate in [up, du, ud] {
            if distance(candidate, frag) <= distance(origin, frag) {
                origin = candidate;
            }
        }

        origin
    }

    /// Whether `coord` lies on one of the six edges of the cell around
    /// `origin`
    ///
    /// Edges whose slope degenerates (the two horizontal ones) fall through
    /// to the explicit axis-aligned check; the slope test turns into a
    /// comparison against infinity there and stays false.
    fn is_in_polygon(&self, coord: [f32; 2], origin: [f32; 2]) -> bool {
        let half_line_width = 0.5 * self.line_width;
        let d_phase = 2.0 * PI / NUM_POINTS as f32;

        for i in 0..NUM_POINTS {
            let phi0 = i as f32 * d_phase;
            let phi1 = phi0 + d_phase;

            let v0 = [
                origin[0] + self.poly_radius * phi0.cos(),
                origin[1] + self.poly_radius * phi0.sin(),
            ];
            let v1 = [
                origin[0] + self.poly_radius * phi1.cos(),
                origin[1] + self.poly_radius * phi1.sin(),
            ];

            let k = (v1[1] - v0[1]) / (v1[0] - v0[0]);

            let progress = [coord[0] - v0[0], coord[1] - v0[1]];
            let dpoints = [v1[0] - v0[0], v1[1] - v0[1]];
            let vscale = [progress[0] / dpoints[0], progress[1] / dpoints[1]];

            let on_line = vscale[0] == vscale[0].clamp(0.0, 1.0)
                && vscale[1] == vscale[1].clamp(0.0, 1.0);

            let vmin = [v0[0].min(v1[0]), v0[1].min(v1[1])];
            let vmax = [v0[0].max(v1[0]), v0[1].max(v1[1])];
            let clamped = [
                coord[0].clamp(vmin[0], vmax[0]),
                coord[1].clamp(vmin[1], vmax[1]),
            ];

            let mut on_straight_line = false;
            if dpoints[1].abs() < half_line_width
                && progress[1].abs() < half_line_width
                && clamped[0] == coord[0]
            {
                on_straight_line = true;
            }
            if dpoints[0].abs() < half_line_width
                && progress[0].abs() < half_line_width
                && clamped[1] == coord[1]
            {
                on_straight_line = true;
            }

            let dist_to_line = (v0[1] + (coord[0] - v0[0]) * k - coord[1]).abs();
            if (dist_to_line < self.line_width && on_line) || on_straight_line {
                return true;
            }
        }

        false
    }

    /// Source color at a sample position, with the stepped vignette applied
    /// when the fragment itself sits on the right half of the frame
    fn bg_color(&self, src: &RgbImage<'_>, coord: [f32; 2], frag_x: usize) -> [f32; 3] {
        let color = src.sample_clamped(coord[0], coord[1]);

        if frag_x < src.width().div_ceil(2) {
            return color;
        }

        let s = coord[0] / src.width() as f32;
        let t = coord[1] / src.height() as f32;

        let gray = (color[0] + color[1] + color[2]) / 3.0;
        let coeff = (s.max(t) * 50.0).floor();
        let value = gray * self.vignette_decay.powf(coeff);

        [value, value, value]
    }
}

fn distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];

    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_centers_are_black() {
        let buf = vec![128u8; 300 * 200 * 3];
        let src = RgbImage::new(&buf, 300, 200).unwrap();
        let filter = HexMosaic::default();

        // (119.5, 101.5) snaps to the lattice point (120, 102) and sits well
        // inside the cell, far from every edge
        assert_eq!(filter.filter_pixel(&src, 119, 101), [0, 0, 0]);
    }

    #[test]
    fn edge_pixels_keep_a_solid_color() {
        let color = [40u8, 160, 220];
        let buf: Vec<u8> = color.iter().copied().cycle().take(300 * 200 * 3).collect();
        let src = RgbImage::new(&buf, 300, 200).unwrap();
        let filter = HexMosaic::default();

        // Midpoint of the first edge of the cell at (120, 102); every fill
        // sample sees the same color, so the average is the color itself
        let out = filter.filter_pixel(&src, 131, 108);

        assert_eq!(out, color);
    }

    #[test]
    fn right_half_is_grayscale_and_darkened() {
        let color = [40u8, 160, 220];
        let buf: Vec<u8> = color.iter().copied().cycle().take(600 * 200 * 3).collect();
        let src = RgbImage::new(&buf, 600, 200).unwrap();
        let filter = HexMosaic::default();

        // Same edge geometry as on the left, shifted right by a multiple of
        // the lattice pitch (12 * 30 = 360)
        let out = filter.filter_pixel(&src, 491, 108);

        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);

        let gray = (40.0 + 160.0 + 220.0) / 3.0 / 255.0;
        assert!(f32::from(out[0]) / 255.0 < gray);
    }
}
