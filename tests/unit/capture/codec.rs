use super::*;

const LISTING: &str = "Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC (codec h264)
 V....D libvpx               libvpx VP8 (codec vp8)
 V....D gif                  GIF (Graphics Interchange Format)
 A....D aac                  AAC (Advanced Audio Coding)
 A....D libopus              libopus Opus (codec opus)
";

#[test]
fn parses_encoder_names_after_separator() {
    let probe = CodecProbe::from_encoder_listing(LISTING);
    assert!(probe.ffmpeg_available());
    assert!(probe.has_encoder("libx264"));
    assert!(probe.has_encoder("gif"));
    assert!(probe.has_encoder("libopus"));
    assert!(!probe.has_encoder("V....."));
    assert!(!probe.has_encoder("libvpx-vp9"));
}

#[test]
fn picks_first_supported_preference() {
    let probe = CodecProbe::from_encoder_listing(LISTING);
    assert!(!probe.is_type_supported(&WEBM_VP9));
    assert_eq!(probe.best_format(), WEBM_VP8);
    assert!(probe.is_supported());
    assert_eq!(probe.audio_encoder_for(Container::WebM), Some("libopus"));
    assert_eq!(probe.audio_encoder_for(Container::Mp4), Some("aac"));
}

#[test]
fn falls_back_to_generic_webm() {
    let probe = CodecProbe::from_encoder_listing(" ------\n V....D mpeg4  MPEG-4 part 2\n");
    assert_eq!(probe.best_format(), WEBM_DEFAULT);
    assert!(!probe.is_supported());
}

#[test]
fn missing_ffmpeg_supports_nothing() {
    let probe = CodecProbe::default();
    assert!(!probe.is_supported());
    assert!(!probe.is_type_supported(&WEBM_DEFAULT));
}
