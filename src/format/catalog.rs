//! The catalog of supported pixel encodings.

/// One supported in-memory pixel encoding.
///
/// Packed `Int*` formats store a little-endian `u32` per pixel; byte-order
/// formats (`ThreeByteBgr`, `FourByteAbgr*`) name their channels in memory
/// order; `Ushort*` formats store a little-endian `u16`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum PixelFormat {
    /// Packed 0xAARRGGBB, straight alpha.
    IntArgb,
    /// Packed 0xAARRGGBB, color channels premultiplied by alpha.
    IntArgbPre,
    /// Packed 0x00RRGGBB, no alpha channel.
    IntRgb,
    /// Packed 0x00BBGGRR, no alpha channel.
    IntBgr,
    /// Three bytes per pixel in memory order B, G, R.
    ThreeByteBgr,
    /// Four bytes per pixel in memory order A, B, G, R, straight alpha.
    FourByteAbgr,
    /// Four bytes per pixel in memory order A, B, G, R, premultiplied.
    FourByteAbgrPre,
    /// Packed 16-bit 5-6-5 RGB.
    Ushort565Rgb,
    /// Packed 16-bit X-5-5-5 RGB.
    Ushort555Rgb,
    /// Packed 16-bit 4-4-4-4 ARGB, straight alpha.
    Ushort4444Argb,
    /// One luminance byte per pixel.
    ByteGray,
    /// One little-endian luminance `u16` per pixel.
    UshortGray,
    /// One byte per pixel indexing a 256-entry ARGB lookup table.
    ///
    /// Legal as a source only; the codec defines no inverse mapping, so
    /// indexed destinations are rejected as validation errors.
    ByteIndexed,
}

impl PixelFormat {
    /// Storage width of one pixel in bytes.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::IntArgb | Self::IntArgbPre | Self::IntRgb | Self::IntBgr => 4,
            Self::FourByteAbgr | Self::FourByteAbgrPre => 4,
            Self::ThreeByteBgr => 3,
            Self::Ushort565Rgb | Self::Ushort555Rgb | Self::Ushort4444Argb | Self::UshortGray => 2,
            Self::ByteGray | Self::ByteIndexed => 1,
        }
    }

    /// Whether the encoding carries an alpha channel.
    ///
    /// Indexed pixels carry alpha through their lookup table entries.
    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::IntArgb
                | Self::IntArgbPre
                | Self::FourByteAbgr
                | Self::FourByteAbgrPre
                | Self::Ushort4444Argb
                | Self::ByteIndexed
        )
    }

    /// Whether stored color channels are premultiplied by alpha.
    pub fn is_premultiplied(self) -> bool {
        matches!(self, Self::IntArgbPre | Self::FourByteAbgrPre)
    }

    /// Whether pixels are indices into a lookup table.
    pub fn is_indexed(self) -> bool {
        matches!(self, Self::ByteIndexed)
    }

    /// Alpha-channel bits in this format's packed representation.
    ///
    /// Used by the XOR blit to keep destination alpha untouched. Zero for
    /// formats without a stored alpha channel.
    pub fn alpha_bits(self) -> u32 {
        match self {
            Self::IntArgb | Self::IntArgbPre => 0xff00_0000,
            Self::FourByteAbgr | Self::FourByteAbgrPre => 0x0000_00ff,
            Self::Ushort4444Argb => 0xf000,
            _ => 0,
        }
    }
}

/// 256-entry index → packed 0xAARRGGBB table for [`PixelFormat::ByteIndexed`]
/// sources.
#[derive(Clone)]
pub struct IndexLut {
    entries: [u32; 256],
}

impl IndexLut {
    /// Build a table from packed 0xAARRGGBB entries.
    pub fn new(entries: [u32; 256]) -> Self {
        Self { entries }
    }

    /// Resolve an index to its packed ARGB entry.
    pub fn lookup(&self, index: u8) -> u32 {
        self.entries[usize::from(index)]
    }
}

impl std::fmt::Debug for IndexLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexLut").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/catalog.rs"]
mod tests;
