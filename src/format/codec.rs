//! Per-format pack/unpack between stored pixel bits and ARGB channels.
//!
//! Channels travel as `[a, r, g, b]`, each 0–255. `unpack` returns the
//! channels exactly as stored (premultiplied formats stay premultiplied);
//! the premultiply state fixup is a separate, explicit step so each engine
//! applies it exactly once.

use crate::foundation::math::{div_by_alpha, mul_div255_u8};
use crate::format::catalog::{IndexLut, PixelFormat};

/// Fixed-point luminance weights used when packing RGB into a gray format.
const LUMA_R: u32 = 19672;
const LUMA_G: u32 = 38620;
const LUMA_B: u32 = 7500;

/// Read one pixel's packed bits from a raster row.
///
/// 4/3/2/1-byte widths assemble little-endian: byte `i` lands in bits
/// `8*i..8*i+8`, which makes the byte-order formats' channel masks line up
/// with their memory layout.
pub fn read_bits(bytes: &[u8], offset: usize, bpp: usize) -> u32 {
    match bpp {
        1 => u32::from(bytes[offset]),
        2 => u32::from(u16::from_le_bytes([bytes[offset], bytes[offset + 1]])),
        3 => {
            u32::from(bytes[offset])
                | u32::from(bytes[offset + 1]) << 8
                | u32::from(bytes[offset + 2]) << 16
        }
        4 => u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ]),
        _ => unreachable!("pixel widths are 1-4 bytes"),
    }
}

/// Write one pixel's packed bits into a raster row.
pub fn write_bits(bytes: &mut [u8], offset: usize, bpp: usize, bits: u32) {
    let le = bits.to_le_bytes();
    bytes[offset..offset + bpp].copy_from_slice(&le[..bpp]);
}

/// Unpack stored pixel bits into `[a, r, g, b]` channels.
///
/// Indexed formats resolve through `lut` first and then proceed as packed
/// ARGB. Formats without alpha unpack with `a == 255`.
pub fn unpack(format: PixelFormat, bits: u32, lut: Option<&IndexLut>) -> [u8; 4] {
    match format {
        PixelFormat::IntArgb | PixelFormat::IntArgbPre => argb_from_packed(bits),
        PixelFormat::IntRgb => [
            255,
            (bits >> 16) as u8,
            (bits >> 8) as u8,
            bits as u8,
        ],
        PixelFormat::IntBgr => [
            255,
            bits as u8,
            (bits >> 8) as u8,
            (bits >> 16) as u8,
        ],
        PixelFormat::ThreeByteBgr => [
            255,
            (bits >> 16) as u8,
            (bits >> 8) as u8,
            bits as u8,
        ],
        PixelFormat::FourByteAbgr | PixelFormat::FourByteAbgrPre => [
            bits as u8,
            (bits >> 24) as u8,
            (bits >> 16) as u8,
            (bits >> 8) as u8,
        ],
        PixelFormat::Ushort565Rgb => {
            let r5 = ((bits >> 11) & 0x1f) as u8;
            let g6 = ((bits >> 5) & 0x3f) as u8;
            let b5 = (bits & 0x1f) as u8;
            [255, expand5(r5), expand6(g6), expand5(b5)]
        }
        PixelFormat::Ushort555Rgb => {
            let r5 = ((bits >> 10) & 0x1f) as u8;
            let g5 = ((bits >> 5) & 0x1f) as u8;
            let b5 = (bits & 0x1f) as u8;
            [255, expand5(r5), expand5(g5), expand5(b5)]
        }
        PixelFormat::Ushort4444Argb => {
            let a4 = ((bits >> 12) & 0xf) as u8;
            let r4 = ((bits >> 8) & 0xf) as u8;
            let g4 = ((bits >> 4) & 0xf) as u8;
            let b4 = (bits & 0xf) as u8;
            [expand4(a4), expand4(r4), expand4(g4), expand4(b4)]
        }
        PixelFormat::ByteGray => {
            let g = bits as u8;
            [255, g, g, g]
        }
        PixelFormat::UshortGray => {
            let g = (bits >> 8) as u8;
            [255, g, g, g]
        }
        PixelFormat::ByteIndexed => {
            let entry = lut
                .map(|l| l.lookup(bits as u8))
                .unwrap_or(0);
            argb_from_packed(entry)
        }
    }
}

/// Pack `[a, r, g, b]` channels into stored pixel bits.
///
/// Callers hand premultiplied formats already-premultiplied channels.
/// [`PixelFormat::ByteIndexed`] has no inverse mapping and is unreachable
/// here; destinations are validated before any packing happens.
pub fn pack(format: PixelFormat, argb: [u8; 4]) -> u32 {
    let [a, r, g, b] = argb.map(u32::from);
    match format {
        PixelFormat::IntArgb | PixelFormat::IntArgbPre => a << 24 | r << 16 | g << 8 | b,
        PixelFormat::IntRgb => r << 16 | g << 8 | b,
        PixelFormat::IntBgr => b << 16 | g << 8 | r,
        PixelFormat::ThreeByteBgr => r << 16 | g << 8 | b,
        PixelFormat::FourByteAbgr | PixelFormat::FourByteAbgrPre => {
            r << 24 | g << 16 | b << 8 | a
        }
        PixelFormat::Ushort565Rgb => (r >> 3) << 11 | (g >> 2) << 5 | (b >> 3),
        PixelFormat::Ushort555Rgb => (r >> 3) << 10 | (g >> 3) << 5 | (b >> 3),
        PixelFormat::Ushort4444Argb => {
            (a >> 4) << 12 | (r >> 4) << 8 | (g >> 4) << 4 | (b >> 4)
        }
        PixelFormat::ByteGray => luminance(r, g, b),
        PixelFormat::UshortGray => {
            let y = luminance(r, g, b);
            y << 8 | y
        }
        PixelFormat::ByteIndexed => unreachable!("indexed destinations are rejected up front"),
    }
}

/// Premultiply straight channels by their alpha with round-half-up.
pub fn premultiply(argb: [u8; 4]) -> [u8; 4] {
    let [a, r, g, b] = argb;
    [
        a,
        mul_div255_u8(r, a),
        mul_div255_u8(g, a),
        mul_div255_u8(b, a),
    ]
}

/// Divide premultiplied channels by their alpha via the reciprocal table.
///
/// Alpha 0 yields `(0, 0, 0, 0)`, fully transparent black, never a fault.
pub fn unpremultiply(argb: [u8; 4]) -> [u8; 4] {
    let [a, r, g, b] = argb;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    [a, div_by_alpha(r, a), div_by_alpha(g, a), div_by_alpha(b, a)]
}

/// Unpack and normalize to straight-alpha channels.
pub fn unpack_straight(format: PixelFormat, bits: u32, lut: Option<&IndexLut>) -> [u8; 4] {
    let argb = unpack(format, bits, lut);
    if format.is_premultiplied() {
        unpremultiply(argb)
    } else {
        argb
    }
}

/// Premultiply if the destination stores premultiplied channels, then pack.
pub fn pack_straight(format: PixelFormat, argb: [u8; 4]) -> u32 {
    if format.is_premultiplied() {
        pack(format, premultiply(argb))
    } else {
        pack(format, argb)
    }
}

/// Transcode one pixel's bits from `src` to `dst`, fixing up the
/// premultiply state exactly when the two formats disagree on it.
pub fn transcode(bits: u32, src: PixelFormat, lut: Option<&IndexLut>, dst: PixelFormat) -> u32 {
    let mut argb = unpack(src, bits, lut);
    match (src.is_premultiplied(), dst.is_premultiplied()) {
        (true, false) => argb = unpremultiply(argb),
        (false, true) => argb = premultiply(argb),
        _ => {}
    }
    pack(dst, argb)
}

fn argb_from_packed(bits: u32) -> [u8; 4] {
    [
        (bits >> 24) as u8,
        (bits >> 16) as u8,
        (bits >> 8) as u8,
        bits as u8,
    ]
}

fn expand4(v: u8) -> u8 {
    v << 4 | v
}

fn expand5(v: u8) -> u8 {
    v << 3 | v >> 2
}

fn expand6(v: u8) -> u8 {
    v << 2 | v >> 4
}

// The weights sum to 65792, slightly over one in 16.16, which is what makes
// r == g == b pack back to exactly that gray value.
fn luminance(r: u32, g: u32, b: u32) -> u32 {
    (LUMA_R * r + LUMA_G * g + LUMA_B * b) >> 16
}

#[cfg(test)]
#[path = "../../tests/unit/format/codec.rs"]
mod tests;
