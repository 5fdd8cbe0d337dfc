//! Raster views: `(buffer, origin, strides, bounds)` tuples over memory the
//! caller owns. Views never own storage and live only as long as one call.

use crate::format::catalog::{IndexLut, PixelFormat};
use crate::format::codec;
use crate::foundation::error::{RasterkitError, RasterkitResult};

/// Integer pixel rectangle used for clipping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RectI {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels; empty when <= 0.
    pub width: i32,
    /// Height in pixels; empty when <= 0.
    pub height: i32,
}

impl RectI {
    /// Build a rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection of two rectangles; empty results have zero size.
    pub fn intersect(self, other: Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x.saturating_add(self.width)).min(other.x.saturating_add(other.width));
        let y1 = (self.y.saturating_add(self.height)).min(other.y.saturating_add(other.height));
        Self {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0),
            height: (y1 - y0).max(0),
        }
    }
}

/// Shared byte layout behind both view types.
#[derive(Clone, Copy, Debug)]
struct Layout {
    format: PixelFormat,
    width: u32,
    height: u32,
    origin: usize,
    pixel_stride: usize,
    row_stride: isize,
}

impl Layout {
    fn packed(format: PixelFormat, width: u32, height: u32) -> Self {
        let bpp = format.bytes_per_pixel();
        Self {
            format,
            width,
            height,
            origin: 0,
            pixel_stride: bpp,
            row_stride: (width as usize * bpp) as isize,
        }
    }

    fn validate(&self, buf_len: usize) -> RasterkitResult<()> {
        let bpp = self.format.bytes_per_pixel();
        if self.width == 0 || self.height == 0 {
            return Err(RasterkitError::validation("raster view must be non-empty"));
        }
        if self.pixel_stride < bpp {
            return Err(RasterkitError::validation(
                "pixel stride below the format's byte width",
            ));
        }
        if self.width as usize * self.pixel_stride > self.row_stride.unsigned_abs() {
            return Err(RasterkitError::validation(
                "row stride too small for width * pixel stride",
            ));
        }
        // Row starts are linear in y, so the two extreme rows bound them all.
        for y in [0, self.height - 1] {
            let start = self.origin as isize + y as isize * self.row_stride;
            if start < 0 {
                return Err(RasterkitError::validation("row start before buffer origin"));
            }
            let end = start as usize + (self.width as usize - 1) * self.pixel_stride + bpp;
            if end > buf_len {
                return Err(RasterkitError::validation("row extends past buffer end"));
            }
        }
        Ok(())
    }

    fn row_start(&self, y: u32) -> usize {
        (self.origin as isize + y as isize * self.row_stride) as usize
    }

    fn pixel_offset(&self, x: u32, y: u32) -> usize {
        self.row_start(y) + x as usize * self.pixel_stride
    }

    fn window(&self, x: u32, y: u32, width: u32, height: u32) -> RasterkitResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterkitError::validation("sub-view must be non-empty"));
        }
        if x.checked_add(width).is_none_or(|r| r > self.width)
            || y.checked_add(height).is_none_or(|b| b > self.height)
        {
            return Err(RasterkitError::validation("sub-view outside parent bounds"));
        }
        Ok(Self {
            format: self.format,
            width,
            height,
            origin: self.pixel_offset(x, y),
            pixel_stride: self.pixel_stride,
            row_stride: self.row_stride,
        })
    }
}

/// Read-only view over a rectangular pixel buffer.
#[derive(Clone, Copy, Debug)]
pub struct RasterView<'a> {
    buf: &'a [u8],
    layout: Layout,
    lut: Option<&'a IndexLut>,
}

impl<'a> RasterView<'a> {
    /// View a tightly packed, top-down buffer.
    pub fn new(
        buf: &'a [u8],
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> RasterkitResult<Self> {
        let layout = Layout::packed(format, width, height);
        layout.validate(buf.len())?;
        Ok(Self {
            buf,
            layout,
            lut: None,
        })
    }

    /// View an explicitly strided buffer.
    ///
    /// `origin` is the byte offset of the view's top-left pixel;
    /// `row_stride` may be negative for bottom-up surfaces. Every
    /// addressable pixel must fall inside `buf`.
    pub fn with_layout(
        buf: &'a [u8],
        format: PixelFormat,
        width: u32,
        height: u32,
        origin: usize,
        pixel_stride: usize,
        row_stride: isize,
    ) -> RasterkitResult<Self> {
        let layout = Layout {
            format,
            width,
            height,
            origin,
            pixel_stride,
            row_stride,
        };
        layout.validate(buf.len())?;
        Ok(Self {
            buf,
            layout,
            lut: None,
        })
    }

    /// Attach the lookup table an indexed source resolves through.
    pub fn with_lut(mut self, lut: &'a IndexLut) -> Self {
        self.lut = Some(lut);
        self
    }

    /// Pixel format of the view.
    pub fn format(&self) -> PixelFormat {
        self.layout.format
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Attached lookup table, if any.
    pub fn lut(&self) -> Option<&'a IndexLut> {
        self.lut
    }

    /// Window a sub-rectangle of this view.
    pub fn sub_view(&self, x: u32, y: u32, width: u32, height: u32) -> RasterkitResult<Self> {
        Ok(Self {
            buf: self.buf,
            layout: self.layout.window(x, y, width, height)?,
            lut: self.lut,
        })
    }

    /// An indexed view is only readable with its lookup table attached.
    pub(crate) fn ensure_readable(&self) -> RasterkitResult<()> {
        if self.layout.format.is_indexed() && self.lut.is_none() {
            return Err(RasterkitError::validation(
                "indexed source requires a lookup table",
            ));
        }
        Ok(())
    }

    pub(crate) fn read_bits(&self, x: u32, y: u32) -> u32 {
        codec::read_bits(
            self.buf,
            self.layout.pixel_offset(x, y),
            self.layout.format.bytes_per_pixel(),
        )
    }

    /// Stored channels at `(x, y)` (premultiplied formats stay premultiplied).
    pub(crate) fn argb_at(&self, x: u32, y: u32) -> [u8; 4] {
        codec::unpack(self.layout.format, self.read_bits(x, y), self.lut)
    }

    /// Whether rows are contiguous runs of `bytes_per_pixel`-wide pixels.
    pub(crate) fn is_packed_rows(&self) -> bool {
        self.layout.pixel_stride == self.layout.format.bytes_per_pixel()
    }

    /// Byte slice of row `y`, covering exactly `width` pixels.
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let start = self.layout.row_start(y);
        let len = (self.layout.width as usize - 1) * self.layout.pixel_stride
            + self.layout.format.bytes_per_pixel();
        &self.buf[start..start + len]
    }
}

/// Mutable view over a rectangular pixel buffer.
#[derive(Debug)]
pub struct RasterViewMut<'a> {
    buf: &'a mut [u8],
    layout: Layout,
}

impl<'a> RasterViewMut<'a> {
    /// View a tightly packed, top-down buffer mutably.
    pub fn new(
        buf: &'a mut [u8],
        format: PixelFormat,
        width: u32,
        height: u32,
    ) -> RasterkitResult<Self> {
        let layout = Layout::packed(format, width, height);
        layout.validate(buf.len())?;
        Ok(Self { buf, layout })
    }

    /// View an explicitly strided buffer mutably; same rules as
    /// [`RasterView::with_layout`].
    pub fn with_layout(
        buf: &'a mut [u8],
        format: PixelFormat,
        width: u32,
        height: u32,
        origin: usize,
        pixel_stride: usize,
        row_stride: isize,
    ) -> RasterkitResult<Self> {
        let layout = Layout {
            format,
            width,
            height,
            origin,
            pixel_stride,
            row_stride,
        };
        layout.validate(buf.len())?;
        Ok(Self { buf, layout })
    }

    /// Pixel format of the view.
    pub fn format(&self) -> PixelFormat {
        self.layout.format
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Re-borrow a mutable window of this view.
    pub fn sub_view_mut(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> RasterkitResult<RasterViewMut<'_>> {
        let layout = self.layout.window(x, y, width, height)?;
        Ok(RasterViewMut {
            buf: &mut *self.buf,
            layout,
        })
    }

    /// Destinations must not be indexed: the codec has no inverse mapping.
    pub(crate) fn ensure_writable(&self) -> RasterkitResult<()> {
        if self.layout.format.is_indexed() {
            return Err(RasterkitError::validation(
                "indexed formats are not writable destinations",
            ));
        }
        Ok(())
    }

    pub(crate) fn read_bits(&self, x: u32, y: u32) -> u32 {
        codec::read_bits(
            self.buf,
            self.layout.pixel_offset(x, y),
            self.layout.format.bytes_per_pixel(),
        )
    }

    pub(crate) fn write_bits(&mut self, x: u32, y: u32, bits: u32) {
        codec::write_bits(
            self.buf,
            self.layout.pixel_offset(x, y),
            self.layout.format.bytes_per_pixel(),
            bits,
        );
    }

    /// Stored channels at `(x, y)`.
    pub(crate) fn argb_at(&self, x: u32, y: u32) -> [u8; 4] {
        codec::unpack(self.layout.format, self.read_bits(x, y), None)
    }

    pub(crate) fn is_packed_rows(&self) -> bool {
        self.layout.pixel_stride == self.layout.format.bytes_per_pixel()
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = self.layout.row_start(y);
        let len = (self.layout.width as usize - 1) * self.layout.pixel_stride
            + self.layout.format.bytes_per_pixel();
        &mut self.buf[start..start + len]
    }

    /// Full-view bounds as a clip rectangle.
    pub fn bounds(&self) -> RectI {
        RectI::new(0, 0, self.layout.width as i32, self.layout.height as i32)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/view.rs"]
mod tests;
