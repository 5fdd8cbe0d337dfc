//! ICC profile bytes: header and tag table as structured data, all tag
//! payloads opaque.

use crate::foundation::error::{RasterkitError, RasterkitResult, fourcc};

/// Byte length of the fixed ICC profile header.
pub const HEADER_LEN: usize = 128;

/// The pseudo-tag addressing the fixed-size profile header.
pub const TAG_HEAD: u32 = 0x6865_6164; // 'head'

/// Media white point tag.
pub const TAG_WTPT: u32 = 0x7774_7074; // 'wtpt'
/// Red colorant tag.
pub const TAG_R_XYZ: u32 = 0x7258_595a; // 'rXYZ'
/// Green colorant tag.
pub const TAG_G_XYZ: u32 = 0x6758_595a; // 'gXYZ'
/// Blue colorant tag.
pub const TAG_B_XYZ: u32 = 0x6258_595a; // 'bXYZ'
/// Red tone reproduction curve tag.
pub const TAG_R_TRC: u32 = 0x7254_5243; // 'rTRC'
/// Green tone reproduction curve tag.
pub const TAG_G_TRC: u32 = 0x6754_5243; // 'gTRC'
/// Blue tone reproduction curve tag.
pub const TAG_B_TRC: u32 = 0x6254_5243; // 'bTRC'
/// Gray tone reproduction curve tag.
pub const TAG_K_TRC: u32 = 0x6b54_5243; // 'kTRC'

const SIG_ACSP: u32 = 0x6163_7370; // 'acsp'
const SPACE_XYZ: u32 = 0x5859_5a20; // 'XYZ '
const SPACE_LAB: u32 = 0x4c61_6220; // 'Lab '
const SPACE_RGB: u32 = 0x5247_4220; // 'RGB '
const SPACE_GRAY: u32 = 0x4752_4159; // 'GRAY'
const CLASS_MNTR: u32 = 0x6d6e_7472; // 'mntr'

const TAG_TABLE_OFFSET: usize = HEADER_LEN;
const TAG_ENTRY_LEN: usize = 12;

/// An ICC profile held in memory.
///
/// `parse` validates the header and tag table up front and never yields a
/// degenerate profile; everything past the tag table is opaque bytes.
#[derive(Clone, Debug)]
pub struct Profile {
    data: Vec<u8>,
}

impl Profile {
    /// Validate and take ownership of raw profile bytes.
    pub fn parse(bytes: &[u8]) -> RasterkitResult<Self> {
        if bytes.len() < TAG_TABLE_OFFSET + 4 {
            return Err(RasterkitError::invalid_profile("truncated header"));
        }
        let declared = be_u32(bytes, 0) as usize;
        if declared != bytes.len() {
            return Err(RasterkitError::invalid_profile(format!(
                "header size {declared} disagrees with data length {}",
                bytes.len()
            )));
        }
        if be_u32(bytes, 36) != SIG_ACSP {
            return Err(RasterkitError::invalid_profile("missing 'acsp' signature"));
        }
        let count = be_u32(bytes, TAG_TABLE_OFFSET) as usize;
        let table_end = TAG_TABLE_OFFSET + 4 + count * TAG_ENTRY_LEN;
        if table_end > bytes.len() {
            return Err(RasterkitError::invalid_profile("tag table past end of data"));
        }
        for i in 0..count {
            let entry = TAG_TABLE_OFFSET + 4 + i * TAG_ENTRY_LEN;
            let offset = be_u32(bytes, entry + 4) as u64;
            let size = be_u32(bytes, entry + 8) as u64;
            if offset < TAG_TABLE_OFFSET as u64 || offset + size > bytes.len() as u64 {
                return Err(RasterkitError::invalid_profile(format!(
                    "tag {} payload out of bounds",
                    fourcc(be_u32(bytes, entry))
                )));
            }
        }
        Ok(Self {
            data: bytes.to_vec(),
        })
    }

    /// Raw profile bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Total profile size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Profiles are never empty; present for API completeness.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Device class signature from the header.
    pub fn device_class(&self) -> u32 {
        be_u32(&self.data, 12)
    }

    /// Data color space signature from the header.
    pub fn color_space(&self) -> u32 {
        be_u32(&self.data, 16)
    }

    /// Profile connection space signature from the header.
    pub fn pcs(&self) -> u32 {
        be_u32(&self.data, 20)
    }

    /// Whether the profile's data space already is a connection space
    /// (XYZ or Lab). Such profiles are not doubled in long chains.
    pub fn is_pcs_only(&self) -> bool {
        matches!(self.color_space(), SPACE_XYZ | SPACE_LAB)
    }

    /// Number of entries in the tag table.
    pub fn tag_count(&self) -> usize {
        be_u32(&self.data, TAG_TABLE_OFFSET) as usize
    }

    /// First tag-table entry with the given signature.
    pub(crate) fn find_tag(&self, sig: u32) -> Option<(usize, usize)> {
        for i in 0..self.tag_count() {
            let entry = TAG_TABLE_OFFSET + 4 + i * TAG_ENTRY_LEN;
            if be_u32(&self.data, entry) == sig {
                return Some((
                    be_u32(&self.data, entry + 4) as usize,
                    be_u32(&self.data, entry + 8) as usize,
                ));
            }
        }
        None
    }

    /// Byte size of a tag; the header pseudo-tag is fixed at 128.
    pub fn tag_size(&self, sig: u32) -> RasterkitResult<usize> {
        if sig == TAG_HEAD {
            return Ok(HEADER_LEN);
        }
        self.find_tag(sig)
            .map(|(_, size)| size)
            .ok_or_else(|| RasterkitError::tag_not_found(sig))
    }

    /// Raw bytes of a tag; the header pseudo-tag reads the first 128 bytes.
    pub fn tag_data(&self, sig: u32) -> RasterkitResult<&[u8]> {
        if sig == TAG_HEAD {
            return Ok(&self.data[..HEADER_LEN]);
        }
        let (offset, size) = self
            .find_tag(sig)
            .ok_or_else(|| RasterkitError::tag_not_found(sig))?;
        Ok(&self.data[offset..offset + size])
    }

    /// Replace a tag's payload, rebuilding the tag layout.
    ///
    /// The size delta is propagated to every later tag offset and the
    /// header size field is updated. The header pseudo-tag is rejected
    /// here; use [`Profile::set_header`].
    pub fn set_tag_data(&mut self, sig: u32, payload: &[u8]) -> RasterkitResult<()> {
        if sig == TAG_HEAD {
            return Err(RasterkitError::tag_write_rejected(
                "header tag must go through set_header",
            ));
        }
        let (offset, old_size) = self
            .find_tag(sig)
            .ok_or_else(|| RasterkitError::tag_not_found(sig))?;

        let new_len = self.data.len() - old_size + payload.len();
        if u32::try_from(new_len).is_err() {
            return Err(RasterkitError::tag_write_rejected(
                "rebuilt profile exceeds the 32-bit size field",
            ));
        }
        let mut rebuilt = Vec::new();
        rebuilt
            .try_reserve_exact(new_len)
            .map_err(|_| RasterkitError::allocation("profile rebuild buffer"))?;
        rebuilt.extend_from_slice(&self.data[..offset]);
        rebuilt.extend_from_slice(payload);
        rebuilt.extend_from_slice(&self.data[offset + old_size..]);

        rebuilt[0..4].copy_from_slice(&(new_len as u32).to_be_bytes());
        let delta = payload.len() as i64 - old_size as i64;
        let count = be_u32(&rebuilt, TAG_TABLE_OFFSET) as usize;
        for i in 0..count {
            let entry = TAG_TABLE_OFFSET + 4 + i * TAG_ENTRY_LEN;
            let entry_offset = be_u32(&rebuilt, entry + 4) as usize;
            if entry_offset == offset && be_u32(&rebuilt, entry) == sig {
                let size = payload.len() as u32;
                rebuilt[entry + 8..entry + 12].copy_from_slice(&size.to_be_bytes());
            } else if entry_offset > offset {
                let moved = (entry_offset as i64 + delta) as u32;
                rebuilt[entry + 4..entry + 8].copy_from_slice(&moved.to_be_bytes());
            }
        }
        self.data = rebuilt;
        Ok(())
    }

    /// Replace the fixed-size header.
    ///
    /// Exactly 128 bytes; the size field is kept authoritative so the tag
    /// layout bookkeeping stays intact.
    pub fn set_header(&mut self, header: &[u8]) -> RasterkitResult<()> {
        if header.len() != HEADER_LEN {
            return Err(RasterkitError::tag_write_rejected(
                "header tag is fixed at 128 bytes",
            ));
        }
        self.data[..HEADER_LEN].copy_from_slice(header);
        let len = self.data.len() as u32;
        self.data[0..4].copy_from_slice(&len.to_be_bytes());
        Ok(())
    }

    /// Synthesize the standard RGB display profile in memory.
    ///
    /// Matrix/TRC shape: D50 white point, D50-adapted sRGB colorants, and
    /// gamma-2.2 tone curves. Round-trips through [`Profile::parse`].
    pub fn srgb() -> Self {
        let tags: [(u32, Vec<u8>); 7] = [
            (TAG_WTPT, xyz_tag(D50)),
            (TAG_R_XYZ, xyz_tag([0.436_074_7, 0.222_504_5, 0.013_932_2])),
            (TAG_G_XYZ, xyz_tag([0.385_064_9, 0.716_878_6, 0.097_104_5])),
            (TAG_B_XYZ, xyz_tag([0.143_080_4, 0.060_616_9, 0.714_173_3])),
            (TAG_R_TRC, gamma_tag(2.2)),
            (TAG_G_TRC, gamma_tag(2.2)),
            (TAG_B_TRC, gamma_tag(2.2)),
        ];

        let table_len = 4 + tags.len() * TAG_ENTRY_LEN;
        let mut payload_offset = HEADER_LEN + table_len;
        let total: usize = payload_offset + tags.iter().map(|(_, p)| p.len()).sum::<usize>();

        let mut data = vec![0u8; total];
        data[0..4].copy_from_slice(&(total as u32).to_be_bytes());
        data[8..12].copy_from_slice(&0x0240_0000u32.to_be_bytes()); // version 2.4
        data[12..16].copy_from_slice(&CLASS_MNTR.to_be_bytes());
        data[16..20].copy_from_slice(&SPACE_RGB.to_be_bytes());
        data[20..24].copy_from_slice(&SPACE_XYZ.to_be_bytes());
        data[36..40].copy_from_slice(&SIG_ACSP.to_be_bytes());
        for (i, v) in D50.iter().enumerate() {
            data[68 + i * 4..72 + i * 4].copy_from_slice(&s15f16(*v).to_be_bytes());
        }

        data[TAG_TABLE_OFFSET..TAG_TABLE_OFFSET + 4]
            .copy_from_slice(&(tags.len() as u32).to_be_bytes());
        for (i, (sig, payload)) in tags.iter().enumerate() {
            let entry = TAG_TABLE_OFFSET + 4 + i * TAG_ENTRY_LEN;
            data[entry..entry + 4].copy_from_slice(&sig.to_be_bytes());
            data[entry + 4..entry + 8].copy_from_slice(&(payload_offset as u32).to_be_bytes());
            data[entry + 8..entry + 12].copy_from_slice(&(payload.len() as u32).to_be_bytes());
            data[payload_offset..payload_offset + payload.len()].copy_from_slice(payload);
            payload_offset += payload.len();
        }

        Self { data }
    }

    /// Whether the profile's device model is gray.
    pub(crate) fn is_gray(&self) -> bool {
        self.color_space() == SPACE_GRAY
    }

    /// Whether the profile's device model is RGB.
    pub(crate) fn is_rgb(&self) -> bool {
        self.color_space() == SPACE_RGB
    }
}

/// The D50 illuminant the connection space is relative to.
pub(crate) const D50: [f64; 3] = [0.9642, 1.0, 0.8249];

pub(crate) fn be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

pub(crate) fn s15f16(v: f64) -> u32 {
    ((v * 65536.0).round() as i32) as u32
}

fn xyz_tag(xyz: [f64; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(20);
    out.extend_from_slice(&0x5859_5a20u32.to_be_bytes()); // 'XYZ '
    out.extend_from_slice(&[0; 4]);
    for v in xyz {
        out.extend_from_slice(&s15f16(v).to_be_bytes());
    }
    out
}

fn gamma_tag(gamma: f64) -> Vec<u8> {
    let mut out = Vec::with_capacity(14);
    out.extend_from_slice(&0x6375_7276u32.to_be_bytes()); // 'curv'
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&1u32.to_be_bytes());
    out.extend_from_slice(&((gamma * 256.0).round() as u16).to_be_bytes());
    out
}

#[cfg(test)]
#[path = "../../tests/unit/icc/profile.rs"]
mod tests;
