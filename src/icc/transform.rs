//! Transform chain construction and buffer application.

use smallvec::SmallVec;

use crate::foundation::error::{RasterkitError, RasterkitResult};
use crate::icc::pipeline::{DeviceModel, Stage};
use crate::icc::profile::Profile;

/// Strategy for reconciling out-of-gamut colors between profiles.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum RenderingIntent {
    /// Perceptual re-mapping.
    Perceptual,
    /// Media-relative colorimetric.
    RelativeColorimetric,
    /// Saturation-preserving.
    Saturation,
    /// Absolute colorimetric (media white preserved).
    AbsoluteColorimetric,
}

/// Byte layout of one pixel in an `apply` buffer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum PixelLayout {
    /// One gray byte.
    Gray8,
    /// R, G, B bytes.
    Rgb8,
    /// B, G, R bytes.
    Bgr8,
    /// R, G, B, A bytes; alpha passes through untouched.
    Rgba8,
    /// A, R, G, B bytes; alpha passes through untouched.
    Argb8,
}

impl PixelLayout {
    /// Storage width of one pixel in bytes.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 | Self::Bgr8 => 3,
            Self::Rgba8 | Self::Argb8 => 4,
        }
    }

    fn load(self, px: &[u8]) -> ([f64; 3], u8) {
        let f = |b: u8| f64::from(b) / 255.0;
        match self {
            Self::Gray8 => ([f(px[0]), f(px[0]), f(px[0])], 255),
            Self::Rgb8 => ([f(px[0]), f(px[1]), f(px[2])], 255),
            Self::Bgr8 => ([f(px[2]), f(px[1]), f(px[0])], 255),
            Self::Rgba8 => ([f(px[0]), f(px[1]), f(px[2])], px[3]),
            Self::Argb8 => ([f(px[1]), f(px[2]), f(px[3])], px[0]),
        }
    }

    fn store(self, px: &mut [u8], v: [f64; 3], alpha: u8) {
        let q = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
        match self {
            Self::Gray8 => px[0] = q(v[0]),
            Self::Rgb8 => {
                px[0] = q(v[0]);
                px[1] = q(v[1]);
                px[2] = q(v[2]);
            }
            Self::Bgr8 => {
                px[0] = q(v[2]);
                px[1] = q(v[1]);
                px[2] = q(v[0]);
            }
            Self::Rgba8 => {
                px[0] = q(v[0]);
                px[1] = q(v[1]);
                px[2] = q(v[2]);
                px[3] = alpha;
            }
            Self::Argb8 => {
                px[0] = alpha;
                px[1] = q(v[0]);
                px[2] = q(v[1]);
                px[3] = q(v[2]);
            }
        }
    }
}

/// A compiled device-to-device pipeline produced by a [`ChainComposer`].
#[derive(Clone, Debug)]
pub struct CompiledPipeline {
    stages: Vec<Stage>,
    absolute: bool,
}

impl CompiledPipeline {
    fn run(&self, v: [f64; 3]) -> [f64; 3] {
        let mut v = v;
        for stage in &self.stages {
            v = stage.apply(v, self.absolute);
        }
        v
    }
}

/// The seam between chain assembly and stage composition.
///
/// [`ColorTransform::build_with`] hands the composer the fully expanded
/// chain (interior profiles already doubled), so tests can observe the
/// exact chain length the invoker produces.
pub trait ChainComposer {
    /// Compose an expanded profile chain into a runnable pipeline.
    fn compose(
        &self,
        chain: &[&Profile],
        intent: RenderingIntent,
    ) -> RasterkitResult<CompiledPipeline>;
}

/// Default composer: matrix/TRC device models connected through XYZ.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatrixTrcComposer;

impl ChainComposer for MatrixTrcComposer {
    fn compose(
        &self,
        chain: &[&Profile],
        intent: RenderingIntent,
    ) -> RasterkitResult<CompiledPipeline> {
        if chain.len() < 2 {
            return Err(RasterkitError::transform(
                "chain needs at least two profiles",
            ));
        }
        let mut stages = Vec::new();
        stages
            .try_reserve_exact(chain.len())
            .map_err(|_| RasterkitError::allocation("stage chain"))?;

        // Device profiles alternate directions through the connection
        // space; PCS-only profiles ride along without flipping.
        let mut to_pcs = true;
        for profile in chain {
            let model = DeviceModel::from_profile(profile)?;
            if matches!(model, DeviceModel::Pcs) {
                stages.push(Stage::new(model, true));
                continue;
            }
            stages.push(Stage::new(model, to_pcs));
            to_pcs = !to_pcs;
        }
        if !to_pcs {
            return Err(RasterkitError::transform(
                "chain must end with a device-bound profile",
            ));
        }
        Ok(CompiledPipeline {
            stages,
            absolute: intent == RenderingIntent::AbsoluteColorimetric,
        })
    }
}

/// A compiled device-to-device color transform bound to pixel layouts.
///
/// Created once and reused across many buffer applications; dropping it is
/// the single release.
#[derive(Clone, Debug)]
pub struct ColorTransform {
    pipeline: CompiledPipeline,
    src_layout: PixelLayout,
    dst_layout: PixelLayout,
}

impl ColorTransform {
    /// Build a transform over the default [`MatrixTrcComposer`].
    pub fn build(
        profiles: &[&Profile],
        intent: RenderingIntent,
        src_layout: PixelLayout,
        dst_layout: PixelLayout,
    ) -> RasterkitResult<Self> {
        Self::build_with(&MatrixTrcComposer, profiles, intent, src_layout, dst_layout)
    }

    /// Build a transform through an injected composer.
    ///
    /// For chains longer than two profiles, every interior profile whose
    /// data space is not already a connection space is inserted twice as
    /// consecutive chain entries before composition. The doubling is a
    /// compatibility requirement and is preserved bit-for-bit.
    pub fn build_with(
        composer: &dyn ChainComposer,
        profiles: &[&Profile],
        intent: RenderingIntent,
        src_layout: PixelLayout,
        dst_layout: PixelLayout,
    ) -> RasterkitResult<Self> {
        if profiles.len() < 2 {
            return Err(RasterkitError::transform(
                "a transform requires at least two profiles",
            ));
        }
        let mut chain: SmallVec<[&Profile; 8]> = SmallVec::new();
        chain.push(profiles[0]);
        for interior in profiles[1..profiles.len() - 1].iter().copied() {
            chain.push(interior);
            if !interior.is_pcs_only() {
                chain.push(interior);
            }
        }
        chain.push(profiles[profiles.len() - 1]);

        let pipeline = composer.compose(&chain, intent)?;
        Ok(Self {
            pipeline,
            src_layout,
            dst_layout,
        })
    }

    /// Source pixel layout this transform was built for.
    pub fn src_layout(&self) -> PixelLayout {
        self.src_layout
    }

    /// Destination pixel layout this transform was built for.
    pub fn dst_layout(&self) -> PixelLayout {
        self.dst_layout
    }

    /// Transform `width x height` pixels from `src` into `dst`.
    ///
    /// Rows are `src_row_stride`/`dst_row_stride` bytes apart. When both
    /// buffers are contiguous (stride equals `width * bytes_per_pixel`)
    /// the whole image runs as a single pass; either way no caller-managed
    /// scratch is involved.
    #[tracing::instrument(skip_all)]
    pub fn apply(
        &self,
        src: &[u8],
        dst: &mut [u8],
        width: u32,
        height: u32,
        src_row_stride: usize,
        dst_row_stride: usize,
    ) -> RasterkitResult<()> {
        if width == 0 || height == 0 {
            return Err(RasterkitError::validation("apply requires non-empty bounds"));
        }
        let sbpp = self.src_layout.bytes_per_pixel();
        let dbpp = self.dst_layout.bytes_per_pixel();
        let src_row = width as usize * sbpp;
        let dst_row = width as usize * dbpp;
        if src_row_stride < src_row || dst_row_stride < dst_row {
            return Err(RasterkitError::validation("row stride below row width"));
        }
        let rows = height as usize;
        if (rows - 1) * src_row_stride + src_row > src.len()
            || (rows - 1) * dst_row_stride + dst_row > dst.len()
        {
            return Err(RasterkitError::validation("buffer too small for bounds"));
        }

        if src_row_stride == src_row && dst_row_stride == dst_row {
            self.transform_run(&src[..rows * src_row], &mut dst[..rows * dst_row]);
            return Ok(());
        }
        for y in 0..rows {
            let s = &src[y * src_row_stride..y * src_row_stride + src_row];
            let d = &mut dst[y * dst_row_stride..y * dst_row_stride + dst_row];
            self.transform_run(s, d);
        }
        Ok(())
    }

    fn transform_run(&self, src: &[u8], dst: &mut [u8]) {
        let sbpp = self.src_layout.bytes_per_pixel();
        let dbpp = self.dst_layout.bytes_per_pixel();
        for (spx, dpx) in src.chunks_exact(sbpp).zip(dst.chunks_exact_mut(dbpp)) {
            let (v, alpha) = self.src_layout.load(spx);
            let out = self.pipeline.run(v);
            self.dst_layout.store(dpx, out, alpha);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/icc/transform.rs"]
mod tests;
