//! Pixel-buffer transcoding without destination compositing: `convert`,
//! windowed `blit`, background-resolving `blit_bg`, and the in-place
//! premultiply pair.

use crate::format::codec;
use crate::foundation::error::{RasterkitError, RasterkitResult};
use crate::foundation::math::mul_div255_u8;
use crate::raster::view::{RasterView, RasterViewMut};

/// Transcode `src` into `dst`, pixel for pixel.
///
/// Views must have equal dimensions. When the premultiply state differs
/// between the two formats, the appropriate premultiply/unpremultiply step
/// is inserted; destination pixels outside the view are untouched.
/// Identical formats take a raw row-copy fast path that assumes canonical
/// pixels (pad bits zero) and is bit-identical to the generic path for
/// them.
#[tracing::instrument(skip(src, dst))]
pub fn convert(src: &RasterView<'_>, dst: &mut RasterViewMut<'_>) -> RasterkitResult<()> {
    src.ensure_readable()?;
    dst.ensure_writable()?;
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(RasterkitError::validation(
            "convert requires equal view dimensions",
        ));
    }
    convert_rows(src, dst);
    Ok(())
}

/// Transcode a `width x height` window from `src` to `dst`.
///
/// Zero-area rectangles are no-ops; out-of-bounds windows are validation
/// errors.
pub fn blit(
    src: &RasterView<'_>,
    dst: &mut RasterViewMut<'_>,
    src_x: u32,
    src_y: u32,
    dst_x: u32,
    dst_y: u32,
    width: u32,
    height: u32,
) -> RasterkitResult<()> {
    if width == 0 || height == 0 {
        return Ok(());
    }
    let src_win = src.sub_view(src_x, src_y, width, height)?;
    let mut dst_win = dst.sub_view_mut(dst_x, dst_y, width, height)?;
    convert(&src_win, &mut dst_win)
}

fn convert_rows(src: &RasterView<'_>, dst: &mut RasterViewMut<'_>) {
    let sf = src.format();
    let df = dst.format();
    let height = src.height();

    if sf == df {
        if src.is_packed_rows() && dst.is_packed_rows() {
            for y in 0..height {
                dst.row_mut(y).copy_from_slice(src.row(y));
            }
        } else {
            for y in 0..height {
                for x in 0..src.width() {
                    let bits = src.read_bits(x, y);
                    dst.write_bits(x, y, bits);
                }
            }
        }
        return;
    }

    let lut = src.lut();
    if src.is_packed_rows() && dst.is_packed_rows() {
        let sbpp = sf.bytes_per_pixel();
        let dbpp = df.bytes_per_pixel();
        for y in 0..height {
            let src_row = src.row(y);
            let dst_row = dst.row_mut(y);
            for (spx, dpx) in src_row
                .chunks_exact(sbpp)
                .zip(dst_row.chunks_exact_mut(dbpp))
            {
                let bits = codec::read_bits(spx, 0, sbpp);
                codec::write_bits(dpx, 0, dbpp, codec::transcode(bits, sf, lut, df));
            }
        }
    } else {
        for y in 0..height {
            for x in 0..src.width() {
                let bits = src.read_bits(x, y);
                dst.write_bits(x, y, codec::transcode(bits, sf, lut, df));
            }
        }
    }
}

/// Transcode `src` into `dst` with translucent pixels resolved against a
/// solid opaque background color first.
///
/// Every output pixel is fully opaque: the source is composited over
/// `bg_color` (straight ARGB, alpha ignored) and the result overwrites the
/// destination. Opaque source pixels take the plain transcode path.
#[tracing::instrument(skip(src, dst))]
pub fn blit_bg(
    src: &RasterView<'_>,
    dst: &mut RasterViewMut<'_>,
    bg_color: u32,
) -> RasterkitResult<()> {
    src.ensure_readable()?;
    dst.ensure_writable()?;
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(RasterkitError::validation(
            "background blit requires equal view dimensions",
        ));
    }

    let sf = src.format();
    let df = dst.format();
    let lut = src.lut();
    let bg = [
        255,
        (bg_color >> 16) as u8,
        (bg_color >> 8) as u8,
        bg_color as u8,
    ];

    for y in 0..src.height() {
        for x in 0..src.width() {
            let bits = src.read_bits(x, y);
            let sp = codec::unpack_straight(sf, bits, lut);
            let out = if sp[0] == 255 {
                codec::transcode(bits, sf, lut, df)
            } else {
                let sa = sp[0];
                let inv = 255 - sa;
                let mut resolved = [255u8; 4];
                for i in 1..4 {
                    resolved[i] =
                        mul_div255_u8(sp[i], sa).saturating_add(mul_div255_u8(bg[i], inv));
                }
                codec::pack_straight(df, resolved)
            };
            dst.write_bits(x, y, out);
        }
    }
    Ok(())
}

/// Premultiply a straight-alpha surface in place.
///
/// This is the documented in-place aliasing exception: the view is both
/// read and written. The format must carry alpha.
pub fn premultiply_in_place(dst: &mut RasterViewMut<'_>) -> RasterkitResult<()> {
    alpha_transform_in_place(dst, codec::premultiply)
}

/// Divide a premultiplied surface by its alpha in place.
///
/// Alpha-0 pixels become transparent black, never a fault.
pub fn unpremultiply_in_place(dst: &mut RasterViewMut<'_>) -> RasterkitResult<()> {
    alpha_transform_in_place(dst, codec::unpremultiply)
}

fn alpha_transform_in_place(
    dst: &mut RasterViewMut<'_>,
    op: fn([u8; 4]) -> [u8; 4],
) -> RasterkitResult<()> {
    dst.ensure_writable()?;
    if !dst.format().has_alpha() {
        return Err(RasterkitError::validation(
            "in-place alpha transform requires an alpha channel",
        ));
    }
    let format = dst.format();
    for y in 0..dst.height() {
        for x in 0..dst.width() {
            let argb = dst.argb_at(x, y);
            dst.write_bits(x, y, codec::pack(format, op(argb)));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/engine/blit.rs"]
mod tests;
