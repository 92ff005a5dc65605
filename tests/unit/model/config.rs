use super::*;

#[test]
fn defaults_validate() {
    let cfg = ReelConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.duration(), Duration::from_secs(30));
    assert_eq!(cfg.gif.width, 480);
    assert_eq!(cfg.gif.height, 270);
}

#[test]
fn validation_catches_bad_values() {
    let mut cfg = ReelConfig::default();
    cfg.canvas.width = 1919;
    assert!(cfg.validate().is_err());

    let mut cfg = ReelConfig::default();
    cfg.duration_ms = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = ReelConfig::default();
    cfg.gif.max_frames = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = ReelConfig::default();
    cfg.gif.frame_delay_ms = 5;
    assert!(cfg.validate().is_err());
}

#[test]
fn partial_json_fills_defaults() {
    let cfg: ReelConfig = serde_json::from_str(
        r#"{"duration_ms": 2000, "clock": "realtime", "gif": {"max_frames": 8}}"#,
    )
    .unwrap();
    assert_eq!(cfg.duration_ms, 2000);
    assert_eq!(cfg.clock, ClockMode::Realtime);
    assert_eq!(cfg.gif.max_frames, 8);
    assert_eq!(cfg.gif.width, 480);
    assert_eq!(cfg.watermark, "prompt2wrapped");
}
