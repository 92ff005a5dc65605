use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn zero_duration_is_rejected() {
    assert!(Timeline::new(Duration::ZERO).is_err());
}

#[test]
fn plays_to_completion_exactly_once() {
    let mut tl = Timeline::new(ms(1000)).unwrap();
    assert_eq!(tl.state(), PlaybackState::Idle);
    let id = tl.play(ms(500));
    assert!(tl.is_playing());

    let Tick::Frame(t) = tl.tick(id, ms(500)) else {
        panic!("expected frame")
    };
    assert_eq!(t.progress, 0.0);

    let Tick::Frame(t) = tl.tick(id, ms(1000)) else {
        panic!("expected frame")
    };
    assert!((t.progress - 0.5).abs() < 1e-9);

    assert!(matches!(tl.tick(id, ms(1600)), Tick::Final(t) if t.progress == 1.0));
    assert_eq!(tl.state(), PlaybackState::Completed);
    assert_eq!(tl.tick(id, ms(1700)), Tick::Inert);
}

#[test]
fn progress_never_decreases() {
    let mut tl = Timeline::new(ms(1000)).unwrap();
    let id = tl.play(ms(0));
    let Tick::Frame(a) = tl.tick(id, ms(400)) else {
        panic!()
    };
    let Tick::Frame(b) = tl.tick(id, ms(100)) else {
        panic!()
    };
    assert!(b.progress >= a.progress);
}

#[test]
fn stop_makes_session_inert_and_is_idempotent() {
    let mut tl = Timeline::new(ms(1000)).unwrap();
    let id = tl.play(ms(0));
    assert!(matches!(tl.tick(id, ms(10)), Tick::Frame(_)));
    tl.stop();
    tl.stop();
    assert_eq!(tl.state(), PlaybackState::Stopped);
    assert_eq!(tl.tick(id, ms(20)), Tick::Inert);
    assert_eq!(tl.tick(id, ms(5000)), Tick::Inert);
}

#[test]
fn stop_handle_is_observed_at_next_tick() {
    let mut tl = Timeline::new(ms(1000)).unwrap();
    let handle = tl.stop_handle();
    let id = tl.play(ms(0));
    handle.stop();
    assert_eq!(tl.state(), PlaybackState::Stopped);
    assert_eq!(tl.tick(id, ms(2000)), Tick::Inert);
    assert!(tl.is_superseded(id));
}

#[test]
fn second_play_supersedes_first_session() {
    let mut tl = Timeline::new(ms(1000)).unwrap();
    let first = tl.play(ms(0));
    assert!(matches!(tl.tick(first, ms(100)), Tick::Frame(_)));

    let second = tl.play(ms(200));
    assert_ne!(first, second);
    assert_eq!(tl.tick(first, ms(300)), Tick::Inert);
    let Tick::Frame(t) = tl.tick(second, ms(300)) else {
        panic!("second session should be live")
    };
    assert!((t.progress - 0.1).abs() < 1e-9);
    assert!(tl.is_playing());
}

#[test]
fn stop_after_completion_does_not_change_state() {
    let mut tl = Timeline::new(ms(10)).unwrap();
    let id = tl.play(ms(0));
    assert!(matches!(tl.tick(id, ms(10)), Tick::Final(_)));
    tl.stop();
    assert_eq!(tl.state(), PlaybackState::Completed);
}
