//! Matrix/TRC device models extracted from profile tags, and the staged
//! pipeline the composer assembles from them.

use crate::foundation::error::{RasterkitError, RasterkitResult};
use crate::icc::profile::{
    D50, Profile, TAG_B_TRC, TAG_B_XYZ, TAG_G_TRC, TAG_G_XYZ, TAG_K_TRC, TAG_R_TRC, TAG_R_XYZ,
    TAG_WTPT, be_u32,
};

const TYPE_XYZ: u32 = 0x5859_5a20; // 'XYZ '
const TYPE_CURV: u32 = 0x6375_7276; // 'curv'

/// 3x3 column-major color matrix over f64.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Mat3 {
    m: [[f64; 3]; 3],
}

impl Mat3 {
    pub(crate) fn from_columns(r: [f64; 3], g: [f64; 3], b: [f64; 3]) -> Self {
        Self {
            m: [
                [r[0], g[0], b[0]],
                [r[1], g[1], b[1]],
                [r[2], g[2], b[2]],
            ],
        }
    }

    pub(crate) fn mul_vec(&self, v: [f64; 3]) -> [f64; 3] {
        let m = &self.m;
        [
            m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
            m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
            m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
        ]
    }

    pub(crate) fn invert(&self) -> Option<Self> {
        let m = &self.m;
        let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        let mut out = [[0.0; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                let (r1, r2) = ((r + 1) % 3, (r + 2) % 3);
                let (c1, c2) = ((c + 1) % 3, (c + 2) % 3);
                // Transposed cofactor.
                out[c][r] = (m[r1][c1] * m[r2][c2] - m[r1][c2] * m[r2][c1]) * inv_det;
            }
        }
        Some(Self { m: out })
    }
}

/// One tone reproduction curve.
#[derive(Clone, Debug)]
pub(crate) enum Curve {
    Identity,
    Gamma(f64),
    /// Sampled curve, values normalized to 0..=1, non-decreasing.
    Table(Vec<f64>),
}

impl Curve {
    pub(crate) fn eval(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Self::Identity => x,
            Self::Gamma(g) => x.powf(*g),
            Self::Table(t) => {
                let n = t.len();
                if n == 1 {
                    return t[0];
                }
                let pos = x * (n - 1) as f64;
                let i = (pos.floor() as usize).min(n - 2);
                let frac = pos - i as f64;
                t[i] + (t[i + 1] - t[i]) * frac
            }
        }
    }

    pub(crate) fn eval_inverse(&self, y: f64) -> f64 {
        let y = y.clamp(0.0, 1.0);
        match self {
            Self::Identity => y,
            Self::Gamma(g) => y.powf(1.0 / g),
            Self::Table(t) => {
                let n = t.len();
                if n == 1 {
                    return 0.0;
                }
                // Monotonic table: binary search the bracketing segment.
                let mut lo = 0usize;
                let mut hi = n - 1;
                while hi - lo > 1 {
                    let mid = (lo + hi) / 2;
                    if t[mid] <= y {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                let span = t[hi] - t[lo];
                let frac = if span > 0.0 { (y - t[lo]) / span } else { 0.0 };
                (lo as f64 + frac) / (n - 1) as f64
            }
        }
    }
}

/// A profile reduced to its device↔PCS mapping.
#[derive(Clone, Debug)]
pub(crate) enum DeviceModel {
    Rgb {
        trc: [Curve; 3],
        to_xyz: Mat3,
        from_xyz: Mat3,
        white: [f64; 3],
    },
    Gray {
        trc: Curve,
        white: [f64; 3],
    },
    /// XYZ/Lab data space: passes the connection space through.
    Pcs,
}

impl DeviceModel {
    pub(crate) fn from_profile(profile: &Profile) -> RasterkitResult<Self> {
        if profile.is_pcs_only() {
            return Ok(Self::Pcs);
        }
        let white = match profile.tag_data(TAG_WTPT) {
            Ok(bytes) => parse_xyz(bytes)?,
            Err(_) => D50,
        };
        if profile.is_rgb() {
            let r = parse_xyz(profile.tag_data(TAG_R_XYZ)?)?;
            let g = parse_xyz(profile.tag_data(TAG_G_XYZ)?)?;
            let b = parse_xyz(profile.tag_data(TAG_B_XYZ)?)?;
            let to_xyz = Mat3::from_columns(r, g, b);
            let from_xyz = to_xyz
                .invert()
                .ok_or_else(|| RasterkitError::transform("singular colorant matrix"))?;
            let trc = [
                parse_curve(profile.tag_data(TAG_R_TRC)?)?,
                parse_curve(profile.tag_data(TAG_G_TRC)?)?,
                parse_curve(profile.tag_data(TAG_B_TRC)?)?,
            ];
            return Ok(Self::Rgb {
                trc,
                to_xyz,
                from_xyz,
                white,
            });
        }
        if profile.is_gray() {
            let trc = parse_curve(profile.tag_data(TAG_K_TRC)?)?;
            return Ok(Self::Gray { trc, white });
        }
        Err(RasterkitError::transform(
            "unsupported device color space for matrix/TRC composition",
        ))
    }

    fn media_white(&self) -> [f64; 3] {
        match self {
            Self::Rgb { white, .. } | Self::Gray { white, .. } => *white,
            Self::Pcs => D50,
        }
    }

    fn to_pcs(&self, v: [f64; 3]) -> [f64; 3] {
        match self {
            Self::Rgb { trc, to_xyz, .. } => {
                let lin = [trc[0].eval(v[0]), trc[1].eval(v[1]), trc[2].eval(v[2])];
                to_xyz.mul_vec(lin)
            }
            Self::Gray { trc, white } => {
                let y = trc.eval(v[0]);
                [white[0] * y, white[1] * y, white[2] * y]
            }
            Self::Pcs => v,
        }
    }

    fn from_pcs(&self, v: [f64; 3]) -> [f64; 3] {
        match self {
            Self::Rgb { trc, from_xyz, .. } => {
                let lin = from_xyz.mul_vec(v);
                [
                    trc[0].eval_inverse(lin[0]),
                    trc[1].eval_inverse(lin[1]),
                    trc[2].eval_inverse(lin[2]),
                ]
            }
            Self::Gray { trc, white } => {
                let y = if white[1] > 0.0 { v[1] / white[1] } else { 0.0 };
                let g = trc.eval_inverse(y);
                [g, g, g]
            }
            Self::Pcs => v,
        }
    }
}

/// One composed pipeline step.
#[derive(Clone, Debug)]
pub(crate) struct Stage {
    model: DeviceModel,
    to_pcs: bool,
}

impl Stage {
    pub(crate) fn new(model: DeviceModel, to_pcs: bool) -> Self {
        Self { model, to_pcs }
    }

    /// Run the stage. Absolute colorimetric scales media-relative XYZ by
    /// the media white over D50 on the way in, and inverts on the way out.
    pub(crate) fn apply(&self, v: [f64; 3], absolute: bool) -> [f64; 3] {
        if self.to_pcs {
            let mut out = self.model.to_pcs(v);
            if absolute {
                let w = self.model.media_white();
                for i in 0..3 {
                    out[i] *= w[i] / D50[i];
                }
            }
            out
        } else {
            let mut v = v;
            if absolute {
                let w = self.model.media_white();
                for i in 0..3 {
                    v[i] *= D50[i] / w[i];
                }
            }
            self.model.from_pcs(v)
        }
    }
}

fn parse_xyz(bytes: &[u8]) -> RasterkitResult<[f64; 3]> {
    if bytes.len() < 20 || be_u32(bytes, 0) != TYPE_XYZ {
        return Err(RasterkitError::transform("malformed XYZ tag"));
    }
    let mut out = [0.0; 3];
    for (i, v) in out.iter_mut().enumerate() {
        *v = f64::from(be_u32(bytes, 8 + i * 4) as i32) / 65536.0;
    }
    Ok(out)
}

fn parse_curve(bytes: &[u8]) -> RasterkitResult<Curve> {
    if bytes.len() < 12 || be_u32(bytes, 0) != TYPE_CURV {
        return Err(RasterkitError::transform("malformed curve tag"));
    }
    let count = be_u32(bytes, 8) as usize;
    if count == 0 {
        return Ok(Curve::Identity);
    }
    if count == 1 {
        if bytes.len() < 14 {
            return Err(RasterkitError::transform("truncated gamma curve"));
        }
        let g = f64::from(u16::from_be_bytes([bytes[12], bytes[13]])) / 256.0;
        return Ok(Curve::Gamma(g));
    }
    if bytes.len() < 12 + count * 2 {
        return Err(RasterkitError::transform("truncated curve table"));
    }
    let mut table = Vec::new();
    table
        .try_reserve_exact(count)
        .map_err(|_| RasterkitError::allocation("curve table"))?;
    let mut prev = -1.0;
    for i in 0..count {
        let raw = u16::from_be_bytes([bytes[12 + i * 2], bytes[13 + i * 2]]);
        let v = f64::from(raw) / 65535.0;
        if v < prev {
            return Err(RasterkitError::transform("curve table is not monotonic"));
        }
        prev = v;
        table.push(v);
    }
    Ok(Curve::Table(table))
}

#[cfg(test)]
#[path = "../../tests/unit/icc/pipeline.rs"]
mod tests;
