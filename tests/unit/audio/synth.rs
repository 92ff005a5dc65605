use rand::SeedableRng as _;

use super::*;

fn synth() -> AmbientSynth {
    AmbientSynth::with_sample_rate(1_000)
}

#[test]
fn no_stream_before_start() {
    let mut s = synth();
    assert!(s.stream().is_none());
    assert_eq!(s.state(), SynthState::Idle);
}

#[test]
fn double_start_is_rejected() {
    let mut s = synth();
    s.start().unwrap();
    assert!(s.start().is_err());
    assert_eq!(s.state(), SynthState::Running);
}

#[test]
fn detune_is_within_range_and_fixed_per_start() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut s = synth();
    s.start_with_rng(&mut rng).unwrap();
    let cents = s.detune_cents();
    assert_eq!(cents.len(), 4);
    assert!(cents.iter().all(|c| c.abs() <= MAX_DETUNE_CENTS + 1e-9));
    let _ = s.stream().unwrap().take_frames(100);
    assert_eq!(s.detune_cents(), cents);
}

#[test]
fn fades_in_over_one_second() {
    let mut s = synth();
    s.start().unwrap();
    let samples = s.stream().unwrap().take_frames(2_000);
    assert_eq!(samples.len(), 4_000);
    let peak = |chunk: &[f32]| chunk.iter().fold(0f32, |m, v| m.max(v.abs()));
    let early = peak(&samples[..100]);
    let late = peak(&samples[2_400..4_000]);
    assert!(early < late, "early {early} late {late}");
    assert!(late <= (MASTER_GAIN * PARTIAL_GAIN * 4.0) as f32 + 1e-3);
    // stereo frames duplicate the mono mix
    assert!(samples.chunks_exact(2).all(|f| f[0] == f[1]));
}

#[test]
fn stop_fades_out_then_disposes() {
    let mut s = synth();
    s.start().unwrap();
    let _ = s.stream().unwrap().take_frames(1_500);
    s.stop();
    assert!(matches!(s.state(), SynthState::FadingOut { .. }));
    s.stop();
    let tail = s.stream().unwrap().take_frames(5_000);
    assert_eq!(tail.len(), 2_000);
    assert!(tail[tail.len() - 2].abs() < 0.01);
    assert_eq!(s.state(), SynthState::Idle);
    assert!(s.stream().is_none());

    // a disposed synth can be started again
    s.start().unwrap();
    assert!(s.stream().is_some());
}
