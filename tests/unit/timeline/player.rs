use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::compose::compositor::ComposeOptions;
use crate::foundation::core::Canvas;
use crate::render::fonts::FontBook;
use crate::timeline::clock::SteppedClock;

fn player(duration_ms: u64, step_ms: u64) -> ReelPlayer<SteppedClock> {
    let surface = Surface::new(Canvas::new(64, 36).unwrap()).unwrap();
    let compositor = Compositor::new(Arc::new(FontBook::empty()), ComposeOptions::default());
    ReelPlayer::new(
        Arc::new(ReelInput::default()),
        surface,
        compositor,
        SteppedClock::with_step(Duration::from_millis(step_ms)),
        Duration::from_millis(duration_ms),
    )
    .unwrap()
}

#[test]
fn play_runs_to_completion_once() {
    let mut p = player(1000, 100);
    let mut progress = Vec::new();
    let mut completions = 0;
    let outcome = p
        .play(
            |_, step| {
                progress.push(step.progress);
                Ok(())
            },
            || completions += 1,
        )
        .unwrap();
    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(completions, 1);
    assert_eq!(progress.len(), 11);
    assert_eq!(progress.first(), Some(&0.0));
    assert_eq!(progress.last(), Some(&1.0));
    assert!(progress.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(p.state(), PlaybackState::Completed);
    assert_eq!(p.step().unwrap(), StepOutcome::Inert);
}

#[test]
fn stop_during_playback_ends_frames_without_completion() {
    let mut p = player(1000, 100);
    let handle = p.stop_handle();
    let mut frames = 0;
    let mut completed = false;
    let outcome = p
        .play(
            |_, step| {
                frames += 1;
                if step.progress >= 0.5 {
                    handle.stop();
                    handle.stop();
                }
                Ok(())
            },
            || completed = true,
        )
        .unwrap();
    assert_eq!(outcome, PlaybackOutcome::Stopped);
    assert!(!completed);
    assert_eq!(frames, 6);
    assert_eq!(p.state(), PlaybackState::Stopped);
}

#[test]
fn stop_during_final_frame_skips_completion() {
    let mut p = player(100, 100);
    let handle = p.stop_handle();
    let mut completed = false;
    let outcome = p
        .play(
            |_, step| {
                if step.progress >= 1.0 {
                    handle.stop();
                }
                Ok(())
            },
            || completed = true,
        )
        .unwrap();
    assert_eq!(outcome, PlaybackOutcome::Stopped);
    assert!(!completed);
}

#[test]
fn frame_callback_error_stops_playback() {
    let mut p = player(1000, 100);
    let err = p
        .play(
            |_, _| Err(crate::foundation::error::ReelError::encoder("boom")),
            || panic!("must not complete"),
        )
        .unwrap_err();
    assert!(err.to_string().contains("boom"));
    assert_eq!(p.state(), PlaybackState::Stopped);
}

#[test]
fn restart_supersedes_previous_session() {
    let mut p = player(1000, 100);
    let first = p.begin();
    assert!(matches!(p.step().unwrap(), StepOutcome::Frame(_)));
    assert!(matches!(p.step().unwrap(), StepOutcome::Frame(_)));
    let second = p.begin();
    assert_ne!(first, second);
    let StepOutcome::Frame(step) = p.step().unwrap() else {
        panic!("restarted session should draw")
    };
    assert_eq!(step.session, second);
    assert_eq!(step.progress, 0.0);
}
