use crate::PackError;
use crate::color::normalize;

/// Borrowed view of a tightly packed 8-bit interleaved RGB image
///
/// Rows are stored top to bottom exactly as read from a raw `.rgb` file.
/// GL happens to display the first row at the bottom of the window, but the
/// byte order is all the conversions here care about, so no flipping is
/// involved.
#[derive(Debug, Clone, Copy)]
pub struct RgbImage<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> RgbImage<'a> {
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self, PackError> {
        if width == 0 || height == 0 {
            return Err(PackError::ZeroDimension);
        }

        let expected = width * height * 3;
        if data.len() != expected {
            return Err(PackError::InvalidPlaneSize {
                plane: "rgb",
                expected,
                got: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Fetch the texel at (x, y), normalized to 0.0..=1.0
    #[inline]
    pub(crate) fn fetch(&self, x: usize, y: usize) -> [f32; 3] {
        debug_assert!(x < self.width && y < self.height);

        let offset = (y * self.width + x) * 3;
        let texel = &self.data[offset..offset + 3];

        [normalize(texel[0]), normalize(texel[1]), normalize(texel[2])]
    }

    /// Nearest-neighbor sample at a fractional pixel position, clamping to
    /// the image edge like `GL_CLAMP`
    #[inline]
    pub(crate) fn sample_clamped(&self, x: f32, y: f32) -> [f32; 3] {
        let x = (x.floor() as i64).clamp(0, self.width as i64 - 1) as usize;
        let y = (y.floor() as i64).clamp(0, self.height as i64 - 1) as usize;

        self.fetch(x, y)
    }
}

/// Immutable NV12 image, a full resolution Y plane followed by a half
/// height plane of interleaved chroma pairs
#[derive(Debug, Clone, Copy)]
pub struct Nv12Image<'a> {
    pub(crate) y: &'a [u8],
    pub(crate) uv: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> Nv12Image<'a> {
    pub fn new(y: &'a [u8], uv: &'a [u8], width: usize, height: usize) -> Result<Self, PackError> {
        verify_nv12_dimensions(width, height)?;
        check_plane("y", y.len(), width * height)?;
        check_plane("uv", uv.len(), width * height / 2)?;

        Ok(Self {
            y,
            uv,
            width,
            height,
        })
    }

    /// Split a contiguous NV12 buffer into its two planes
    pub fn from_buffer(buf: &'a [u8], width: usize, height: usize) -> Result<Self, PackError> {
        verify_nv12_dimensions(width, height)?;
        check_plane("nv12", buf.len(), crate::nv12_size(width, height))?;

        let (y, uv) = buf.split_at(width * height);

        Ok(Self {
            y,
            uv,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// Mutable NV12 image used as a conversion destination
#[derive(Debug)]
pub struct Nv12ImageMut<'a> {
    y: &'a mut [u8],
    uv: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Nv12ImageMut<'a> {
    pub fn new(
        y: &'a mut [u8],
        uv: &'a mut [u8],
        width: usize,
        height: usize,
    ) -> Result<Self, PackError> {
        verify_nv12_dimensions(width, height)?;
        check_plane("y", y.len(), width * height)?;
        check_plane("uv", uv.len(), width * height / 2)?;

        Ok(Self {
            y,
            uv,
            width,
            height,
        })
    }

    /// Split a contiguous NV12 buffer into its two planes
    pub fn from_buffer(buf: &'a mut [u8], width: usize, height: usize) -> Result<Self, PackError> {
        verify_nv12_dimensions(width, height)?;
        check_plane("nv12", buf.len(), crate::nv12_size(width, height))?;

        let (y, uv) = buf.split_at_mut(width * height);

        Ok(Self {
            y,
            uv,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn planes_mut(&mut self) -> (&mut [u8], &mut [u8]) {
        (&mut *self.y, &mut *self.uv)
    }
}

fn verify_nv12_dimensions(width: usize, height: usize) -> Result<(), PackError> {
    if width == 0 || height == 0 {
        return Err(PackError::ZeroDimension);
    }

    if width % 2 != 0 || height % 2 != 0 {
        return Err(PackError::OddDimensions { width, height });
    }

    Ok(())
}

fn check_plane(plane: &'static str, got: usize, expected: usize) -> Result<(), PackError> {
    if got != expected {
        return Err(PackError::InvalidPlaneSize {
            plane,
            expected,
            got,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_view_rejects_wrong_buffer_size() {
        let buf = vec![0u8; 10];

        assert!(matches!(
            RgbImage::new(&buf, 4, 4),
            Err(PackError::InvalidPlaneSize {
                plane: "rgb",
                expected: 48,
                got: 10,
            })
        ));
    }

    #[test]
    fn nv12_from_buffer_splits_planes() {
        let mut buf = vec![0u8; crate::nv12_size(4, 4)];

        let mut img = Nv12ImageMut::from_buffer(&mut buf, 4, 4).unwrap();
        let (y, uv) = img.planes_mut();

        assert_eq!(y.len(), 16);
        assert_eq!(uv.len(), 8);
    }

    #[test]
    fn nv12_rejects_odd_dimensions() {
        let buf = vec![0u8; 27];

        assert!(matches!(
            Nv12Image::from_buffer(&buf, 3, 6),
            Err(PackError::OddDimensions {
                width: 3,
                height: 6,
            })
        ));
    }

    #[test]
    fn clamped_sampling_stays_in_bounds() {
        let mut buf = vec![0u8; 4 * 2 * 3];
        // Mark the corners
        buf[0] = 255;
        let last = buf.len() - 3;
        buf[last] = 255;

        let img = RgbImage::new(&buf, 4, 2).unwrap();

        assert_eq!(img.sample_clamped(-3.0, -1.0), img.fetch(0, 0));
        assert_eq!(img.sample_clamped(9.5, 4.0), img.fetch(3, 1));
    }
}
