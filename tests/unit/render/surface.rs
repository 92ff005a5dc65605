use super::*;

fn frame(px: [u8; 4], premultiplied: bool) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: px.repeat(4),
        premultiplied,
    }
}

#[test]
fn flatten_transparent_returns_background() {
    let mut out = Vec::new();
    frame([0, 0, 0, 0], true)
        .flatten_over(Rgba8::rgb(0x0a141e), &mut out)
        .unwrap();
    assert_eq!(&out[..4], &[10, 20, 30, 255]);
}

#[test]
fn flatten_opaque_is_identity() {
    let mut out = Vec::new();
    frame([1, 2, 3, 255], true)
        .flatten_over(Rgba8::rgb(0xffffff), &mut out)
        .unwrap();
    assert_eq!(&out[..4], &[1, 2, 3, 255]);
}

#[test]
fn straight_conversion_undoes_premultiplication() {
    let img = frame([64, 0, 0, 128], true).to_rgba_image().unwrap();
    let p = img.get_pixel(0, 0).0;
    assert_eq!(p[3], 128);
    assert!((i32::from(p[0]) - 128).abs() <= 1);
}

#[test]
fn resize_hits_target_dimensions() {
    let small = frame([255, 0, 0, 255], true).resized(1, 1).unwrap();
    assert_eq!((small.width, small.height), (1, 1));
    assert_eq!(small.data, vec![255, 0, 0, 255]);
    assert!(!small.premultiplied);
    assert!(frame([0; 4], true).resized(0, 3).is_err());
}

#[test]
fn surface_clear_and_snapshot() {
    let mut s = Surface::new(Canvas::new(4, 2).unwrap()).unwrap();
    s.clear(Rgba8::rgb(0x050505));
    let snap = s.snapshot();
    assert_eq!(snap.data.len(), 4 * 2 * 4);
    assert_eq!(snap.pixel(3, 1), Some([5, 5, 5, 255]));
    assert_eq!(snap.pixel(4, 0), None);
}

#[test]
fn surface_rejects_zero_size() {
    assert!(Surface::new(Canvas { width: 0, height: 10 }).is_err());
}

#[test]
fn flatten_onto_makes_near_opaque_pixels_opaque() {
    let mut s = Surface::new(Canvas::new(2, 1).unwrap()).unwrap();
    s.pixmap
        .data_as_u8_slice_mut()
        .copy_from_slice(&[100, 50, 20, 254, 0, 0, 0, 0]);
    s.flatten_onto(Rgba8::rgb(0xffffff));
    let snap = s.snapshot();
    assert_eq!(snap.pixel(0, 0), Some([101, 51, 21, 255]));
    assert_eq!(snap.pixel(1, 0), Some([255, 255, 255, 255]));
}
