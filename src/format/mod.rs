//! Pixel format catalog and the per-format channel codec.
//!
//! Every conversion and compositing loop in the crate is generic over one
//! [`catalog::PixelFormat`] descriptor plus the [`codec`] pack/unpack pair;
//! there are no per-format-pair specializations.

pub mod catalog;
pub mod codec;
