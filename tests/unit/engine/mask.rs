use super::*;

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
fn zero_mask_leaves_destination_byte_identical() {
    let orig = argb_buf(&[0x8012_3456, 0xff65_4321, 0x0000_0000, 0x7fff_ffff]);
    let zeros = [0u8; 4];
    let mask = CoverageMask::new(&zeros, 2, 2, 2).unwrap();
    for rule in [CompositeRule::Src, CompositeRule::SrcOver, CompositeRule::Clear] {
        let mut buf = orig.clone();
        let mut dst = RasterViewMut::new(&mut buf, PixelFormat::IntArgb, 2, 2).unwrap();
        alpha_mask_fill(&mut dst, Some(&mask), 0xff00_00ff, &CompositingContext::new(rule))
            .unwrap();
        assert_eq!(buf, orig, "{rule:?}");
    }
}

#[test]
fn full_mask_opaque_src_over_is_plain_overwrite() {
    let mut buf = argb_buf(&[0x8012_3456, 0xff65_4321]);
    let full = [255u8; 2];
    let mask = CoverageMask::new(&full, 2, 1, 2).unwrap();
    let mut dst = RasterViewMut::new(&mut buf, PixelFormat::IntArgb, 2, 1).unwrap();
    alpha_mask_fill(
        &mut dst,
        Some(&mask),
        0xff11_2233,
        &CompositingContext::new(CompositeRule::SrcOver),
    )
    .unwrap();
    assert_eq!(pixels_of(&buf), vec![0xff11_2233, 0xff11_2233]);
}

#[test]
fn absent_mask_means_full_coverage() {
    let mut masked = argb_buf(&[0xff00_0000; 4]);
    let mut maskless = masked.clone();
    let full = [255u8; 4];
    let mask = CoverageMask::new(&full, 2, 2, 2).unwrap();
    let ctx = CompositingContext::new(CompositeRule::SrcOver);

    let mut dst = RasterViewMut::new(&mut masked, PixelFormat::IntArgb, 2, 2).unwrap();
    alpha_mask_fill(&mut dst, Some(&mask), 0x80ff_0000, &ctx).unwrap();
    let mut dst = RasterViewMut::new(&mut maskless, PixelFormat::IntArgb, 2, 2).unwrap();
    alpha_mask_fill(&mut dst, None, 0x80ff_0000, &ctx).unwrap();

    assert_eq!(masked, maskless);
}

#[test]
fn half_mask_blends_toward_color() {
    // 50% coverage of opaque blue over opaque red.
    let mut buf = argb_buf(&[0xffff_0000]);
    let half = [128u8];
    let mask = CoverageMask::new(&half, 1, 1, 1).unwrap();
    let mut dst = RasterViewMut::new(&mut buf, PixelFormat::IntArgb, 1, 1).unwrap();
    alpha_mask_fill(
        &mut dst,
        Some(&mask),
        0xff00_00ff,
        &CompositingContext::new(CompositeRule::SrcOver),
    )
    .unwrap();
    let out = pixels_of(&buf)[0];
    assert_eq!(out >> 24, 255);
    assert!(((out >> 16 & 0xff) as u8).abs_diff(127) <= 1);
    assert_eq!(out >> 8 & 0xff, 0);
    assert!(((out & 0xff) as u8).abs_diff(128) <= 1);
}

#[test]
fn source_alpha_defaults_to_opaque_without_destination_alpha() {
    // A translucent color filling a no-alpha destination under Src uses
    // alpha 255, so the raw channels land unchanged.
    let mut buf = argb_buf(&[0x0000_0000]);
    let mut dst = RasterViewMut::new(&mut buf, PixelFormat::IntRgb, 1, 1).unwrap();
    alpha_mask_fill(
        &mut dst,
        None,
        0x2011_2233,
        &CompositingContext::new(CompositeRule::SrcOver),
    )
    .unwrap();
    assert_eq!(pixels_of(&buf)[0], 0x0011_2233);
}

#[test]
fn undersized_mask_is_rejected() {
    let mut buf = argb_buf(&[0; 4]);
    let bytes = [255u8; 2];
    let mask = CoverageMask::new(&bytes, 2, 1, 2).unwrap();
    let mut dst = RasterViewMut::new(&mut buf, PixelFormat::IntArgb, 2, 2).unwrap();
    assert!(
        alpha_mask_fill(
            &mut dst,
            Some(&mask),
            0,
            &CompositingContext::new(CompositeRule::Src)
        )
        .is_err()
    );
}

#[test]
fn mask_blit_opaque_src_over_matches_convert() {
    let pixels = [0x80ff_0000u32, 0xff00_ff00, 0xff00_00ff, 0x8080_8080];
    // Force every source pixel opaque.
    let opaque: Vec<u32> = pixels.iter().map(|p| p | 0xff00_0000).collect();
    let src_buf = argb_buf(&opaque);
    let src = RasterView::new(&src_buf, PixelFormat::IntArgb, 2, 2).unwrap();

    let mut converted = vec![0u8; 16];
    let mut dst = RasterViewMut::new(&mut converted, PixelFormat::IntArgbPre, 2, 2).unwrap();
    crate::engine::blit::convert(&src, &mut dst).unwrap();

    let mut blitted = argb_buf(&[0x40aa_bb11; 4]);
    let mut dst = RasterViewMut::new(&mut blitted, PixelFormat::IntArgbPre, 2, 2).unwrap();
    alpha_mask_blit(
        &src,
        &mut dst,
        None,
        &CompositingContext::new(CompositeRule::SrcOver),
    )
    .unwrap();

    assert_eq!(blitted, converted);
}

#[test]
fn mask_blit_composites_translucent_source() {
    // 50%-alpha blue source over opaque red destination.
    let src_buf = argb_buf(&[0x8000_00ff]);
    let src = RasterView::new(&src_buf, PixelFormat::IntArgb, 1, 1).unwrap();
    let mut dst_buf = argb_buf(&[0xffff_0000]);
    let mut dst = RasterViewMut::new(&mut dst_buf, PixelFormat::IntArgb, 1, 1).unwrap();
    alpha_mask_blit(
        &src,
        &mut dst,
        None,
        &CompositingContext::new(CompositeRule::SrcOver),
    )
    .unwrap();
    let out = pixels_of(&dst_buf)[0];
    assert_eq!(out >> 24, 255);
    assert!(((out >> 16 & 0xff) as u8).abs_diff(127) <= 1);
    assert!(((out & 0xff) as u8).abs_diff(128) <= 1);
}

#[test]
fn mask_blit_requires_equal_bounds() {
    let src_buf = vec![0u8; 16];
    let src = RasterView::new(&src_buf, PixelFormat::IntArgb, 2, 2).unwrap();
    let mut dst_buf = vec![0u8; 4];
    let mut dst = RasterViewMut::new(&mut dst_buf, PixelFormat::IntArgb, 1, 1).unwrap();
    assert!(
        alpha_mask_blit(
            &src,
            &mut dst,
            None,
            &CompositingContext::new(CompositeRule::SrcOver)
        )
        .is_err()
    );
}

#[test]
fn clear_rule_erases_under_full_mask() {
    let mut buf = argb_buf(&[0xffff_ffff]);
    let mut dst = RasterViewMut::new(&mut buf, PixelFormat::IntArgb, 1, 1).unwrap();
    alpha_mask_fill(
        &mut dst,
        None,
        0xff12_3456,
        &CompositingContext::new(CompositeRule::Clear),
    )
    .unwrap();
    assert_eq!(pixels_of(&buf)[0], 0);
}

#[test]
fn extra_alpha_scales_fill() {
    let mut buf = argb_buf(&[0xff00_0000]);
    let mut dst = RasterViewMut::new(&mut buf, PixelFormat::IntArgb, 1, 1).unwrap();
    alpha_mask_fill(
        &mut dst,
        None,
        0xffff_ffff,
        &CompositingContext::with_extra_alpha(CompositeRule::SrcOver, 128),
    )
    .unwrap();
    let out = pixels_of(&buf)[0];
    assert_eq!(out >> 24, 255);
    for shift in [0, 8, 16] {
        assert!(((out >> shift & 0xff) as u8).abs_diff(128) <= 1);
    }
}

#[test]
fn fill_rect_clips_to_destination() {
    let mut buf = argb_buf(&[0; 9]);
    let mut dst = RasterViewMut::new(&mut buf, PixelFormat::IntArgb, 3, 3).unwrap();
    fill_rect(
        &mut dst,
        RectI::new(1, 1, 10, 10),
        0xffff_ffff,
        &CompositingContext::new(CompositeRule::Src),
    )
    .unwrap();
    let out = pixels_of(&buf);
    assert_eq!(out[0], 0);
    assert_eq!(out[1], 0);
    assert_eq!(out[3], 0);
    assert_eq!(out[4], 0xffff_ffff);
    assert_eq!(out[8], 0xffff_ffff);
}
