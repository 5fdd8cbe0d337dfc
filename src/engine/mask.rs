//! Coverage-mask compositing: solid fills and source blits through a rule.

use crate::compose::rule::{CompositeRule, CompositingContext, CoverageMask};
use crate::format::catalog::PixelFormat;
use crate::format::codec;
use crate::foundation::error::{RasterkitError, RasterkitResult};
use crate::raster::view::{RasterView, RasterViewMut, RectI};

/// Composite a solid straight-ARGB color into `dst` through an optional
/// coverage mask under the context's rule.
///
/// An absent mask means full coverage. The source alpha is the color's own
/// alpha, or 255 when the destination format carries no alpha channel.
/// Coverage 0 leaves the destination byte-identical; coverage 255 under
/// `SrcOver` with an opaque color is a plain overwrite. Both fast paths
/// produce exactly what the general path would.
#[tracing::instrument(skip(dst, mask))]
pub fn alpha_mask_fill(
    dst: &mut RasterViewMut<'_>,
    mask: Option<&CoverageMask<'_>>,
    color: u32,
    ctx: &CompositingContext,
) -> RasterkitResult<()> {
    dst.ensure_writable()?;
    check_mask(mask, dst.width(), dst.height())?;

    let df = dst.format();
    let src = solid_source(color, df.has_alpha());
    let overwrite = overwrite_bits(ctx, src, df);

    for y in 0..dst.height() {
        for x in 0..dst.width() {
            let cover = mask.map_or(255, |m| m.coverage(x, y));
            if cover == 0 {
                continue;
            }
            if cover == 255 && let Some(bits) = overwrite {
                dst.write_bits(x, y, bits);
                continue;
            }
            blend_at(dst, x, y, src, cover, ctx);
        }
    }
    Ok(())
}

/// Composite `src` into `dst` through an optional coverage mask under the
/// context's rule.
///
/// The per-pixel source is staged through the codec's straight-ARGB
/// representation, so differing source/destination formats compose the
/// same way a direct pairwise conversion would, within the fixed-point
/// rounding.
#[tracing::instrument(skip(src, dst, mask))]
pub fn alpha_mask_blit(
    src: &RasterView<'_>,
    dst: &mut RasterViewMut<'_>,
    mask: Option<&CoverageMask<'_>>,
    ctx: &CompositingContext,
) -> RasterkitResult<()> {
    src.ensure_readable()?;
    dst.ensure_writable()?;
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(RasterkitError::validation(
            "mask blit requires equal view dimensions",
        ));
    }
    check_mask(mask, dst.width(), dst.height())?;

    let sf = src.format();
    let df = dst.format();
    let lut = src.lut();
    let fast_rule = ctx.rule() == CompositeRule::SrcOver && ctx.extra_alpha() == 255;

    for y in 0..src.height() {
        for x in 0..src.width() {
            let cover = mask.map_or(255, |m| m.coverage(x, y));
            if cover == 0 {
                continue;
            }
            let bits = src.read_bits(x, y);
            let sp = codec::unpack_straight(sf, bits, lut);
            if cover == 255 && fast_rule && sp[0] == 255 {
                dst.write_bits(x, y, codec::transcode(bits, sf, lut, df));
                continue;
            }
            blend_at(dst, x, y, sp, cover, ctx);
        }
    }
    Ok(())
}

/// Fill a clipped rectangle of `dst` with a solid color under the rule.
///
/// Maskless [`alpha_mask_fill`] over the rectangle; areas outside the
/// destination bounds are clipped away.
pub fn fill_rect(
    dst: &mut RasterViewMut<'_>,
    rect: RectI,
    color: u32,
    ctx: &CompositingContext,
) -> RasterkitResult<()> {
    let clipped = rect.intersect(dst.bounds());
    if clipped.is_empty() {
        return Ok(());
    }
    let mut window = dst.sub_view_mut(
        clipped.x as u32,
        clipped.y as u32,
        clipped.width as u32,
        clipped.height as u32,
    )?;
    alpha_mask_fill(&mut window, None, color, ctx)
}

fn solid_source(color: u32, dst_has_alpha: bool) -> [u8; 4] {
    let mut argb = [
        (color >> 24) as u8,
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
    ];
    if !dst_has_alpha {
        argb[0] = 255;
    }
    argb
}

/// Packed destination bits for the full-coverage overwrite fast path, when
/// the rule permits one.
fn overwrite_bits(ctx: &CompositingContext, src: [u8; 4], df: PixelFormat) -> Option<u32> {
    (ctx.rule() == CompositeRule::SrcOver && ctx.extra_alpha() == 255 && src[0] == 255)
        .then(|| codec::pack_straight(df, src))
}

fn check_mask(
    mask: Option<&CoverageMask<'_>>,
    width: u32,
    height: u32,
) -> RasterkitResult<()> {
    if let Some(m) = mask
        && (m.width() < width || m.height() < height)
    {
        return Err(RasterkitError::validation(
            "coverage mask smaller than destination",
        ));
    }
    Ok(())
}

/// Blend one straight-ARGB source pixel into the destination at `(x, y)`.
fn blend_at(
    dst: &mut RasterViewMut<'_>,
    x: u32,
    y: u32,
    src: [u8; 4],
    cover: u8,
    ctx: &CompositingContext,
) {
    let df = dst.format();
    let stored = dst.argb_at(x, y);
    let dst_pre = if df.is_premultiplied() {
        stored
    } else {
        codec::premultiply(stored)
    };
    let Some(out) = ctx.blend_pixel(src, dst_pre, cover) else {
        return;
    };
    let argb = if df.is_premultiplied() {
        out.premul_argb()
    } else {
        out.straight_argb()
    };
    dst.write_bits(x, y, codec::pack(df, argb));
}

#[cfg(test)]
#[path = "../../tests/unit/engine/mask.rs"]
mod tests;
