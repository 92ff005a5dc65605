use super::*;

#[test]
fn fps_frame_duration_and_validation() {
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frame_duration().as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn canvas_rejects_degenerate_sizes() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    assert_eq!(Canvas::new(4, 2).unwrap(), Canvas { width: 4, height: 2 });
}

#[test]
fn rgb_hex_and_opacity() {
    let pink = Rgba8::rgb(0xFF90E8);
    assert_eq!(pink.to_array(), [0xFF, 0x90, 0xE8, 255]);
    assert_eq!(pink.with_opacity(0.5).a, 128);
    assert_eq!(pink.with_opacity(4.0).a, 255);
    assert_eq!(pink.with_opacity(-1.0).a, 0);
}
