//! XOR drawing for rubber-band and cursor-style inverting blits.

use crate::compose::rule::CompositingContext;
use crate::format::codec;
use crate::foundation::error::{RasterkitError, RasterkitResult};
use crate::raster::view::{RasterView, RasterViewMut};

/// XOR `src` into `dst` through the context's xor pattern.
///
/// For every source pixel passing the format's is-opaque test (non-zero
/// alpha; formats without alpha are always opaque), the source pixel is
/// converted to the destination's packed representation and
/// `(converted ^ xor_pixel) & !alpha_mask` is XORed into the destination
/// in place. Pixels under transparent source pixels are untouched, as is
/// the destination's alpha channel. Applying the same blit twice restores
/// the destination.
pub fn xor_blit(
    src: &RasterView<'_>,
    dst: &mut RasterViewMut<'_>,
    ctx: &CompositingContext,
) -> RasterkitResult<()> {
    src.ensure_readable()?;
    dst.ensure_writable()?;
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(RasterkitError::validation(
            "xor blit requires equal view dimensions",
        ));
    }

    let sf = src.format();
    let df = dst.format();
    let lut = src.lut();
    let src_has_alpha = sf.has_alpha();
    let keep = !ctx.alpha_mask();

    for y in 0..src.height() {
        for x in 0..src.width() {
            let bits = src.read_bits(x, y);
            if src_has_alpha {
                let argb = codec::unpack(sf, bits, lut);
                if argb[0] == 0 {
                    continue;
                }
            }
            let as_dst = codec::transcode(bits, sf, lut, df);
            let cur = dst.read_bits(x, y);
            dst.write_bits(x, y, cur ^ ((as_dst ^ ctx.xor_pixel()) & keep));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/engine/xor.rs"]
mod tests;
