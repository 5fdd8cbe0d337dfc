//! The operation family: whole-surface and windowed transcoding, scaled
//! transcoding, XOR drawing, mask compositing, and AA glyph runs.
//!
//! Every operation is one generic loop over the format catalog and channel
//! codec; there are no per-format-pair specializations.

pub mod blit;
pub mod glyph;
pub mod mask;
pub mod scale;
pub mod xor;
