//! Scaled transcoding with fixed-point nearest-neighbor sampling.

use crate::format::codec;
use crate::foundation::error::{RasterkitError, RasterkitResult};
use crate::raster::view::{RasterView, RasterViewMut};

/// Fixed-point sampling parameters for [`scale_convert`].
///
/// Output pixel `(i, j)` samples source coordinates
/// `(sx0 + i*sx_inc) >> shift` and `(sy0 + j*sy_inc) >> shift`. The caller
/// pre-clamps origins and increments so every sample stays inside the
/// source bounds; debug builds assert this, release builds do not clamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleParams {
    /// Fixed-point x origin.
    pub sx0: i64,
    /// Fixed-point y origin.
    pub sy0: i64,
    /// Fixed-point x increment per output column.
    pub sx_inc: i64,
    /// Fixed-point y increment per output row.
    pub sy_inc: i64,
    /// Fractional bits of the accumulators.
    pub shift: u32,
}

impl ScaleParams {
    /// 1:1 sampling at the given fractional precision.
    pub fn one_to_one(shift: u32) -> Self {
        Self {
            sx0: 0,
            sy0: 0,
            sx_inc: 1 << shift,
            sy_inc: 1 << shift,
            shift,
        }
    }
}

/// Transcode `src` into `dst` while resampling with integer accumulators.
///
/// Nearest-neighbor only; the accumulators never touch floating point, so
/// long scan lines cannot drift. With [`ScaleParams::one_to_one`] the
/// output is pixel-for-pixel identical to [`crate::engine::blit::convert`].
#[tracing::instrument(skip(src, dst))]
pub fn scale_convert(
    src: &RasterView<'_>,
    dst: &mut RasterViewMut<'_>,
    params: ScaleParams,
) -> RasterkitResult<()> {
    src.ensure_readable()?;
    dst.ensure_writable()?;
    if params.shift >= 32 {
        return Err(RasterkitError::validation(
            "scale shift must leave integer coordinate bits",
        ));
    }

    let sf = src.format();
    let df = dst.format();
    let lut = src.lut();

    let mut sy_acc = params.sy0;
    for j in 0..dst.height() {
        let sy = sy_acc >> params.shift;
        debug_assert!(
            sy >= 0 && (sy as u64) < u64::from(src.height()),
            "row sample {sy} outside source height {}",
            src.height()
        );
        let y = sy as u32;

        let mut sx_acc = params.sx0;
        for i in 0..dst.width() {
            let sx = sx_acc >> params.shift;
            debug_assert!(
                sx >= 0 && (sx as u64) < u64::from(src.width()),
                "column sample {sx} outside source width {}",
                src.width()
            );
            let bits = src.read_bits(sx as u32, y);
            dst.write_bits(i, j, codec::transcode(bits, sf, lut, df));
            sx_acc += params.sx_inc;
        }
        sy_acc += params.sy_inc;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scale.rs"]
mod tests;
