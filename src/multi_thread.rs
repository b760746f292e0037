use crate::formats::nv12::{
    pack_chroma_rows, pack_luma_rows, verify_nv12_args, verify_texture_args,
};
use crate::image::{Nv12ImageMut, RgbImage};
use crate::{HexMosaic, PackError, pack_texture, rgb_to_nv12};
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;

/// Multi threaded variant of [`pack_texture`](crate::pack_texture)
///
/// Every output row only does fixed-offset reads from the source, so the
/// destination is split into per-thread row chunks with no synchronization
/// beyond the final join.
pub fn pack_texture_multi_thread(src: &RgbImage<'_>, dst: &mut [u8]) -> Result<(), PackError> {
    verify_texture_args(src, dst)?;

    let threads = num_cpus::get();
    if threads == 1 {
        return pack_texture(src, dst);
    }

    let (w, h) = (src.width(), src.height());
    let stride = w * 3;

    let (luma, rest) = dst.split_at_mut(h / 3 * stride);
    let (chroma, zero) = rest.split_at_mut(h / 6 * stride);

    par_rows(luma, stride, h / 3, threads, |first_row, chunk| {
        pack_luma_rows(src, first_row, chunk)
    });
    par_rows(chroma, stride, h / 6, threads, |first_row, chunk| {
        pack_chroma_rows(src, first_row, chunk)
    });
    zero.fill(0);

    Ok(())
}

/// Multi threaded variant of [`rgb_to_nv12`](crate::rgb_to_nv12)
pub fn rgb_to_nv12_multi_thread(
    src: &RgbImage<'_>,
    dst: &mut Nv12ImageMut<'_>,
) -> Result<(), PackError> {
    verify_nv12_args(src, dst)?;

    let threads = num_cpus::get();
    if threads == 1 {
        return rgb_to_nv12(src, dst);
    }

    let (w, h) = (src.width(), src.height());
    let stride = w * 3;

    let (y, uv) = dst.planes_mut();

    par_rows(y, stride, h / 3, threads, |first_row, chunk| {
        pack_luma_rows(src, first_row, chunk)
    });
    par_rows(uv, stride, h / 6, threads, |first_row, chunk| {
        pack_chroma_rows(src, first_row, chunk)
    });

    Ok(())
}

impl HexMosaic {
    /// Multi threaded variant of [`HexMosaic::apply`]
    pub fn apply_multi_thread(&self, src: &RgbImage<'_>, dst: &mut [u8]) -> Result<(), PackError> {
        self.verify_args(src, dst)?;

        let threads = num_cpus::get();
        if threads == 1 {
            self.filter_rows(src, 0, dst);
            return Ok(());
        }

        let stride = src.width() * 3;

        par_rows(dst, stride, src.height(), threads, |first_row, chunk| {
            self.filter_rows(src, first_row, chunk)
        });

        Ok(())
    }
}

fn par_rows(
    out: &mut [u8],
    stride: usize,
    rows: usize,
    threads: usize,
    f: impl Fn(usize, &mut [u8]) + Sync,
) {
    let rows_per_chunk = rows.div_ceil(threads).max(1);

    out.par_chunks_mut(rows_per_chunk * stride)
        .enumerate()
        .for_each(|(i, chunk)| f(i * rows_per_chunk, chunk));
}
