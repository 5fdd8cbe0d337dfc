//! Rasterkit is the pixel-level core of a software rasterization path.
//!
//! It transcodes between heterogeneous in-memory pixel encodings,
//! composites with Porter-Duff-style rules, resamples while transcoding,
//! draws antialiased glyph runs, and applies ICC color transforms, all
//! directly over caller-supplied raw framebuffer memory:
//!
//! - Describe buffers with [`RasterView`] / [`RasterViewMut`]
//! - Transcode with [`convert`], [`blit`], [`scale_convert`], [`xor_blit`]
//! - Composite with [`alpha_mask_fill`], [`alpha_mask_blit`], [`fill_rect`]
//! - Draw text with [`draw_glyph_list_aa`]
//! - Color-manage with [`Profile`] and [`ColorTransform`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod compose;
pub mod engine;
pub mod format;
pub mod icc;
pub mod raster;

pub use crate::foundation::error::{RasterkitError, RasterkitResult};

pub use crate::compose::rule::{CompositeRule, CompositingContext, CoverageMask};
pub use crate::engine::blit::{blit, blit_bg, convert, premultiply_in_place, unpremultiply_in_place};
pub use crate::engine::glyph::{GlyphRun, draw_glyph_list_aa};
pub use crate::engine::mask::{alpha_mask_blit, alpha_mask_fill, fill_rect};
pub use crate::engine::scale::{ScaleParams, scale_convert};
pub use crate::engine::xor::xor_blit;
pub use crate::format::catalog::{IndexLut, PixelFormat};
pub use crate::icc::profile::Profile;
pub use crate::icc::transform::{
    ChainComposer, ColorTransform, CompiledPipeline, MatrixTrcComposer, PixelLayout,
    RenderingIntent,
};
pub use crate::raster::view::{RasterView, RasterViewMut, RectI};
