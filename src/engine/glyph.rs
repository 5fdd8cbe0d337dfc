//! Antialiased glyph-run drawing.

use crate::format::codec;
use crate::foundation::error::{RasterkitError, RasterkitResult};
use crate::raster::view::{RasterViewMut, RectI};

/// One rectangular antialiased coverage bitmap and its placement.
///
/// Coverage is one byte per pixel, row-major, 0 (no coverage) to 255
/// (saturated). The compositor only reads it.
#[derive(Clone, Copy, Debug)]
pub struct GlyphRun<'a> {
    /// Left edge in destination coordinates.
    pub x: i32,
    /// Top edge in destination coordinates.
    pub y: i32,
    /// Bitmap width in pixels.
    pub width: u32,
    /// Bitmap height in pixels.
    pub height: u32,
    /// Row-major coverage bytes, at least `width * height` of them.
    pub coverage: &'a [u8],
}

impl GlyphRun<'_> {
    /// Bounding box in destination coordinates.
    pub fn bounds(&self) -> RectI {
        RectI::new(self.x, self.y, self.width as i32, self.height as i32)
    }
}

/// Blend a list of antialiased glyph coverage bitmaps into `dst` with a
/// solid straight-ARGB foreground color, clipped against `clip`.
///
/// Per covered pixel the blend is `(src*c + dst*(255-c) + 127) / 255` on
/// every channel, destination alpha included. Coverage 0 leaves the pixel;
/// coverage 255 stores the precomputed foreground pixel. Both shortcuts
/// yield exactly what the general formula would. Glyphs whose clipped box
/// is empty are skipped; later glyphs may overwrite earlier ones in list
/// order.
/// Premultiplied destinations round-trip through straight alpha around the
/// blend.
#[tracing::instrument(skip(dst, glyphs))]
pub fn draw_glyph_list_aa(
    dst: &mut RasterViewMut<'_>,
    glyphs: &[GlyphRun<'_>],
    clip: RectI,
    color: u32,
) -> RasterkitResult<()> {
    dst.ensure_writable()?;
    let clip = clip.intersect(dst.bounds());

    let df = dst.format();
    let fg = [
        (color >> 24) as u8,
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
    ];
    let fg_bits = codec::pack_straight(df, fg);

    for glyph in glyphs {
        let area = glyph.bounds().intersect(clip);
        if area.is_empty() {
            continue;
        }
        let needed = glyph.width as usize * glyph.height as usize;
        if glyph.coverage.len() < needed {
            return Err(RasterkitError::validation(
                "glyph coverage shorter than width * height",
            ));
        }

        for y in area.y..area.y + area.height {
            let cov_row = (y - glyph.y) as usize * glyph.width as usize;
            for x in area.x..area.x + area.width {
                let c = glyph.coverage[cov_row + (x - glyph.x) as usize];
                if c == 0 {
                    continue;
                }
                let (x, y) = (x as u32, y as u32);
                if c == 255 {
                    dst.write_bits(x, y, fg_bits);
                    continue;
                }
                let stored = dst.argb_at(x, y);
                let d = if df.is_premultiplied() {
                    codec::unpremultiply(stored)
                } else {
                    stored
                };
                let mut out = [0u8; 4];
                for i in 0..4 {
                    out[i] = coverage_mix(fg[i], d[i], c);
                }
                dst.write_bits(x, y, codec::pack_straight(df, out));
            }
        }
    }
    Ok(())
}

fn coverage_mix(s: u8, d: u8, c: u8) -> u8 {
    ((u32::from(s) * u32::from(c) + u32::from(d) * u32::from(255 - c) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/engine/glyph.rs"]
mod tests;
