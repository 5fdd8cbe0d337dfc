//! The compositing rule algebra.
//!
//! A rule resolves to two factor triples `(and, xor, add)`; given the
//! current destination alpha `Ad` and source alpha `As`,
//!
//! ```text
//! src_factor = ((Ad & SrcAnd) ^ SrcXor) + SrcAdd
//! dst_factor = ((As & DstAnd) ^ DstXor) + DstAdd
//! ```
//!
//! both in 0–255. The factors weight the premultiplied source and
//! destination contributions, an "extra alpha" scalar pre-scales `As`, and
//! a coverage mask value modulates both factors so that coverage 0
//! reproduces the destination exactly.

use crate::foundation::error::{RasterkitError, RasterkitResult};
use crate::foundation::math::{div_by_alpha, mul_div255_u8};

/// Porter-Duff compositing rule.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum CompositeRule {
    /// Both contributions zero.
    Clear,
    /// Source only.
    Src,
    /// Destination only.
    Dst,
    /// Source over destination.
    SrcOver,
    /// Destination over source.
    DstOver,
    /// Source inside destination.
    SrcIn,
    /// Destination inside source.
    DstIn,
    /// Source outside destination.
    SrcOut,
    /// Destination outside source.
    DstOut,
    /// Source atop destination.
    SrcAtop,
    /// Destination atop source.
    DstAtop,
    /// Source xor destination (the packed-bits variant is
    /// [`crate::engine::xor::xor_blit`]).
    Xor,
}

/// One `((alpha & and) ^ xor) + add` factor derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FactorTriple {
    pub(crate) and: u8,
    pub(crate) xor: u8,
    pub(crate) add: u8,
}

const ZERO: FactorTriple = FactorTriple {
    and: 0,
    xor: 0,
    add: 0,
};
const ONE: FactorTriple = FactorTriple {
    and: 0,
    xor: 0,
    add: 255,
};
const ALPHA: FactorTriple = FactorTriple {
    and: 255,
    xor: 0,
    add: 0,
};
const ONE_MINUS_ALPHA: FactorTriple = FactorTriple {
    and: 255,
    xor: 255,
    add: 0,
};

impl CompositeRule {
    /// `(source factor, destination factor)` triples for this rule.
    pub(crate) fn factors(self) -> (FactorTriple, FactorTriple) {
        match self {
            Self::Clear => (ZERO, ZERO),
            Self::Src => (ONE, ZERO),
            Self::Dst => (ZERO, ONE),
            Self::SrcOver => (ONE, ONE_MINUS_ALPHA),
            Self::DstOver => (ONE_MINUS_ALPHA, ONE),
            Self::SrcIn => (ALPHA, ZERO),
            Self::DstIn => (ZERO, ALPHA),
            Self::SrcOut => (ONE_MINUS_ALPHA, ZERO),
            Self::DstOut => (ZERO, ONE_MINUS_ALPHA),
            Self::SrcAtop => (ALPHA, ONE_MINUS_ALPHA),
            Self::DstAtop => (ONE_MINUS_ALPHA, ALPHA),
            Self::Xor => (ONE_MINUS_ALPHA, ONE_MINUS_ALPHA),
        }
    }
}

pub(crate) fn factor(alpha: u8, f: FactorTriple) -> u8 {
    // Valid triples never sum past 255.
    (u16::from((alpha & f.and) ^ f.xor) + u16::from(f.add)) as u8
}

/// Resolved rule parameters for one compositing operation.
///
/// Built fresh per call and read-only while the operation runs.
#[derive(Clone, Copy, Debug)]
pub struct CompositingContext {
    rule: CompositeRule,
    src_factors: FactorTriple,
    dst_factors: FactorTriple,
    extra_alpha: u8,
    xor_pixel: u32,
    alpha_mask: u32,
}

impl CompositingContext {
    /// Resolve a rule with full extra alpha.
    pub fn new(rule: CompositeRule) -> Self {
        Self::with_extra_alpha(rule, 255)
    }

    /// Resolve a rule with a constant global opacity that pre-scales the
    /// source alpha.
    pub fn with_extra_alpha(rule: CompositeRule, extra_alpha: u8) -> Self {
        let (src_factors, dst_factors) = rule.factors();
        Self {
            rule,
            src_factors,
            dst_factors,
            extra_alpha,
            xor_pixel: 0,
            alpha_mask: 0,
        }
    }

    /// Context for the packed-representation XOR blit: the xor pattern and
    /// the destination's alpha-channel mask, both in destination packed
    /// bits.
    pub fn for_xor(xor_pixel: u32, alpha_mask: u32) -> Self {
        let mut ctx = Self::new(CompositeRule::Xor);
        ctx.xor_pixel = xor_pixel;
        ctx.alpha_mask = alpha_mask;
        ctx
    }

    /// The rule this context resolves.
    pub fn rule(&self) -> CompositeRule {
        self.rule
    }

    /// The extra-alpha scalar.
    pub fn extra_alpha(&self) -> u8 {
        self.extra_alpha
    }

    pub(crate) fn xor_pixel(&self) -> u32 {
        self.xor_pixel
    }

    pub(crate) fn alpha_mask(&self) -> u32 {
        self.alpha_mask
    }

    /// Blend one pixel.
    ///
    /// `src` is straight-alpha; `dst_pre` is the destination in
    /// premultiplied form (for non-premultiplied destinations the caller
    /// premultiplies on read). Returns `None` when the algebra resolves to
    /// the unmodified destination, in which case the caller leaves the
    /// pixel untouched; that is what makes coverage 0 exact.
    pub(crate) fn blend_pixel(
        &self,
        src: [u8; 4],
        dst_pre: [u8; 4],
        cover: u8,
    ) -> Option<Blended> {
        let sa = mul_div255_u8(src[0], self.extra_alpha);
        let da = dst_pre[0];

        let mut src_f = factor(da, self.src_factors);
        let mut dst_f = factor(sa, self.dst_factors);
        if cover != 255 {
            src_f = mul_div255_u8(src_f, cover);
            dst_f = ((u32::from(dst_f) * u32::from(cover)
                + 255 * u32::from(255 - cover)
                + 127)
                / 255) as u8;
        }
        if src_f == 0 && dst_f == 255 {
            return None;
        }

        let alpha = mul_div255_u8(src_f, sa).saturating_add(mul_div255_u8(dst_f, da));
        let mut pre = [0u8; 3];
        let mut straight = [0u8; 3];
        for i in 0..3 {
            let s_pre = mul_div255_u8(src[i + 1], sa);
            let c = mul_div255_u8(s_pre, src_f).saturating_add(mul_div255_u8(dst_pre[i + 1], dst_f));
            pre[i] = c;
            straight[i] = div_by_alpha(c, alpha);
        }
        Some(Blended {
            alpha,
            pre,
            straight,
        })
    }
}

/// Result of one blend: both premultiplied and straight channel forms, so
/// each destination format stores the one it needs without an extra
/// round-trip.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Blended {
    pub(crate) alpha: u8,
    pub(crate) pre: [u8; 3],
    pub(crate) straight: [u8; 3],
}

impl Blended {
    pub(crate) fn premul_argb(&self) -> [u8; 4] {
        [self.alpha, self.pre[0], self.pre[1], self.pre[2]]
    }

    pub(crate) fn straight_argb(&self) -> [u8; 4] {
        [
            self.alpha,
            self.straight[0],
            self.straight[1],
            self.straight[2],
        ]
    }
}

/// Optional per-pixel 0–255 coverage over a destination region.
///
/// `None` at the operation level means full coverage everywhere.
#[derive(Clone, Copy, Debug)]
pub struct CoverageMask<'a> {
    bytes: &'a [u8],
    width: u32,
    height: u32,
    row_stride: usize,
}

impl<'a> CoverageMask<'a> {
    /// View `height` rows of `width` coverage bytes, `row_stride` bytes
    /// apart.
    pub fn new(
        bytes: &'a [u8],
        width: u32,
        height: u32,
        row_stride: usize,
    ) -> RasterkitResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterkitError::validation("coverage mask must be non-empty"));
        }
        if row_stride < width as usize {
            return Err(RasterkitError::validation(
                "coverage mask row stride below width",
            ));
        }
        let need = (height as usize - 1) * row_stride + width as usize;
        if bytes.len() < need {
            return Err(RasterkitError::validation("coverage mask buffer too small"));
        }
        Ok(Self {
            bytes,
            width,
            height,
            row_stride,
        })
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn coverage(&self, x: u32, y: u32) -> u8 {
        self.bytes[y as usize * self.row_stride + x as usize]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/rule.rs"]
mod tests;
