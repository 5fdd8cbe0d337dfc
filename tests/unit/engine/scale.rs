use super::*;

use crate::engine::blit::convert;
use crate::format::catalog::PixelFormat;

fn argb_buf(pixels: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for p in pixels {
        out.extend_from_slice(&p.to_le_bytes());
    }
    out
}

fn pixels_of(buf: &[u8]) -> Vec<u32> {
    buf.chunks_exact(4)
        .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
        .collect()
}

#[test]
fn one_to_one_scale_matches_convert() {
    let pixels: Vec<u32> = (0..16).map(|i| 0x8000_0000 | i * 17).collect();
    let src_buf = argb_buf(&pixels);
    let src = RasterView::new(&src_buf, PixelFormat::IntArgb, 4, 4).unwrap();

    let mut converted = vec![0u8; 64];
    let mut dst = RasterViewMut::new(&mut converted, PixelFormat::IntArgbPre, 4, 4).unwrap();
    convert(&src, &mut dst).unwrap();

    let mut scaled = vec![0u8; 64];
    let mut dst = RasterViewMut::new(&mut scaled, PixelFormat::IntArgbPre, 4, 4).unwrap();
    scale_convert(&src, &mut dst, ScaleParams::one_to_one(16)).unwrap();

    assert_eq!(scaled, converted);
}

#[test]
fn doubling_repeats_each_source_pixel() {
    let src_buf = argb_buf(&[0xff00_0001, 0xff00_0002]);
    let src = RasterView::new(&src_buf, PixelFormat::IntArgb, 2, 1).unwrap();
    let mut dst_buf = vec![0u8; 16];
    let mut dst = RasterViewMut::new(&mut dst_buf, PixelFormat::IntArgb, 4, 1).unwrap();

    let shift = 16;
    scale_convert(
        &src,
        &mut dst,
        ScaleParams {
            sx0: 0,
            sy0: 0,
            sx_inc: 1 << (shift - 1),
            sy_inc: 1 << shift,
            shift,
        },
    )
    .unwrap();
    assert_eq!(
        pixels_of(&dst_buf),
        vec![0xff00_0001, 0xff00_0001, 0xff00_0002, 0xff00_0002]
    );
}

#[test]
fn halving_skips_every_other_pixel() {
    let pixels: Vec<u32> = (0..8).map(|i| 0xff00_0000 | i).collect();
    let src_buf = argb_buf(&pixels);
    let src = RasterView::new(&src_buf, PixelFormat::IntArgb, 4, 2).unwrap();
    let mut dst_buf = vec![0u8; 8];
    let mut dst = RasterViewMut::new(&mut dst_buf, PixelFormat::IntArgb, 2, 1).unwrap();

    let shift = 12;
    scale_convert(
        &src,
        &mut dst,
        ScaleParams {
            sx0: 0,
            sy0: 1 << shift,
            sx_inc: 2 << shift,
            sy_inc: 2 << shift,
            shift,
        },
    )
    .unwrap();
    // Row 1 of the source, columns 0 and 2.
    assert_eq!(pixels_of(&dst_buf), vec![0xff00_0004, 0xff00_0006]);
}

#[test]
fn fractional_origin_offsets_sampling() {
    let src_buf = argb_buf(&[0xff00_0001, 0xff00_0002]);
    let src = RasterView::new(&src_buf, PixelFormat::IntArgb, 2, 1).unwrap();
    let mut dst_buf = vec![0u8; 8];
    let mut dst = RasterViewMut::new(&mut dst_buf, PixelFormat::IntArgb, 2, 1).unwrap();

    let shift = 16;
    // Start three quarters into pixel 0: samples land on 0 then 1.
    scale_convert(
        &src,
        &mut dst,
        ScaleParams {
            sx0: 3 << (shift - 2),
            sy0: 0,
            sx_inc: 1 << (shift - 1),
            sy_inc: 1 << shift,
            shift,
        },
    )
    .unwrap();
    assert_eq!(pixels_of(&dst_buf), vec![0xff00_0001, 0xff00_0002]);
}

#[test]
fn scale_transcodes_formats() {
    let src_buf = argb_buf(&[0x80ff_0000]);
    let src = RasterView::new(&src_buf, PixelFormat::IntArgb, 1, 1).unwrap();
    let mut dst_buf = vec![0u8; 8];
    let mut dst = RasterViewMut::new(&mut dst_buf, PixelFormat::IntArgbPre, 2, 1).unwrap();

    let shift = 8;
    scale_convert(
        &src,
        &mut dst,
        ScaleParams {
            sx0: 0,
            sy0: 0,
            sx_inc: 0,
            sy_inc: 1 << shift,
            shift,
        },
    )
    .unwrap();
    assert_eq!(pixels_of(&dst_buf), vec![0x8080_0000, 0x8080_0000]);
}

#[test]
fn oversized_shift_is_rejected() {
    let src_buf = vec![0u8; 4];
    let src = RasterView::new(&src_buf, PixelFormat::IntArgb, 1, 1).unwrap();
    let mut dst_buf = vec![0u8; 4];
    let mut dst = RasterViewMut::new(&mut dst_buf, PixelFormat::IntArgb, 1, 1).unwrap();
    assert!(scale_convert(&src, &mut dst, ScaleParams::one_to_one(32)).is_err());
}
