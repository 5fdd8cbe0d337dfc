use super::*;

#[test]
fn rect_intersection_clamps_to_overlap() {
    let a = RectI::new(0, 0, 10, 10);
    let b = RectI::new(5, -2, 10, 6);
    assert_eq!(a.intersect(b), RectI::new(5, 0, 5, 4));
    assert!(a.intersect(RectI::new(20, 20, 4, 4)).is_empty());
}

#[test]
fn zero_sized_views_are_rejected() {
    let buf = [0u8; 16];
    assert!(RasterView::new(&buf, PixelFormat::IntArgb, 0, 1).is_err());
    assert!(RasterView::new(&buf, PixelFormat::IntArgb, 1, 0).is_err());
}

#[test]
fn short_buffer_is_rejected() {
    let buf = [0u8; 15];
    assert!(RasterView::new(&buf, PixelFormat::IntArgb, 2, 2).is_err());
}

#[test]
fn row_stride_must_cover_width() {
    let buf = [0u8; 64];
    // 4 pixels * 4 bytes > 8-byte rows.
    assert!(
        RasterView::with_layout(&buf, PixelFormat::IntArgb, 4, 2, 0, 4, 8).is_err()
    );
}

#[test]
fn pixel_stride_must_cover_format_width() {
    let buf = [0u8; 64];
    assert!(
        RasterView::with_layout(&buf, PixelFormat::IntArgb, 2, 2, 0, 3, 16).is_err()
    );
}

#[test]
fn read_write_round_trip_with_padding() {
    let mut buf = [0u8; 40];
    // 2x2 of 3-byte pixels, 5-byte pixel stride, 20-byte rows.
    let mut view =
        RasterViewMut::with_layout(&mut buf, PixelFormat::ThreeByteBgr, 2, 2, 0, 5, 20)
            .unwrap();
    view.write_bits(1, 1, 0x00aabbcc);
    assert_eq!(view.read_bits(1, 1), 0x00aabbcc);
    assert_eq!(view.read_bits(0, 0), 0);
}

#[test]
fn bottom_up_views_address_rows_backwards() {
    let mut buf = [0u8; 8];
    buf[0] = 1; // bottom row in memory
    buf[4] = 2; // top row in memory
    let view = RasterView::with_layout(&buf, PixelFormat::IntArgb, 1, 2, 4, 4, -4).unwrap();
    assert_eq!(view.read_bits(0, 0) & 0xff, 2);
    assert_eq!(view.read_bits(0, 1) & 0xff, 1);
}

#[test]
fn sub_view_windows_share_layout() {
    let mut buf = vec![0u8; 4 * 4 * 4];
    {
        let mut whole = RasterViewMut::new(&mut buf, PixelFormat::IntArgb, 4, 4).unwrap();
        whole.write_bits(2, 3, 0xdeadbeef);
    }
    let view = RasterView::new(&buf, PixelFormat::IntArgb, 4, 4).unwrap();
    let win = view.sub_view(2, 3, 2, 1).unwrap();
    assert_eq!(win.read_bits(0, 0), 0xdeadbeef);
    assert!(view.sub_view(3, 3, 2, 2).is_err());
    assert!(view.sub_view(0, 0, 0, 1).is_err());
}

#[test]
fn indexed_source_requires_lut() {
    let buf = [0u8; 4];
    let view = RasterView::new(&buf, PixelFormat::ByteIndexed, 2, 2).unwrap();
    assert!(view.ensure_readable().is_err());

    let lut = IndexLut::new([0u32; 256]);
    let view = view.with_lut(&lut);
    assert!(view.ensure_readable().is_ok());
}

#[test]
fn indexed_destination_is_rejected() {
    let mut buf = [0u8; 4];
    let view = RasterViewMut::new(&mut buf, PixelFormat::ByteIndexed, 2, 2).unwrap();
    assert!(view.ensure_writable().is_err());
}
