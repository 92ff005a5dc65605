use std::f64::consts::TAU;
use std::time::Duration;

use rand::Rng;

use crate::foundation::error::{ReelError, ReelResult};

pub const SAMPLE_RATE: u32 = 48_000;
pub const CHANNELS: u16 = 2;

/// C4, E4, G4, B4.
pub const CHORD_HZ: [f64; 4] = [261.63, 329.63, 392.00, 493.88];
pub const PARTIAL_GAIN: f64 = 0.15;
pub const MASTER_GAIN: f64 = 0.5;
pub const FADE: Duration = Duration::from_secs(1);
/// Detune range, in cents either side of the nominal pitch.
pub const MAX_DETUNE_CENTS: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SynthState {
    Idle,
    Running,
    /// Ramping to silence; disposed once the sample clock reaches `ends_at`.
    FadingOut { ends_at: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Partial {
    freq: f64,
    phase: f64,
}

/// Linear gain ramp over the sample clock.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Ramp {
    from: f64,
    to: f64,
    start: u64,
    len: u64,
}

impl Ramp {
    fn hold(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            start: 0,
            len: 0,
        }
    }

    fn value_at(&self, pos: u64) -> f64 {
        if self.len == 0 || pos >= self.start + self.len {
            return self.to;
        }
        let t = pos.saturating_sub(self.start) as f64 / self.len as f64;
        self.from + (self.to - self.from) * t
    }
}

/// Four detuned sine partials behind a master gain envelope.
///
/// Explicitly owned: one synth per recording, started and stopped by its owner. Samples are only
/// produced while running or fading out.
#[derive(Debug)]
pub struct AmbientSynth {
    state: SynthState,
    partials: Vec<Partial>,
    master: Ramp,
    pos: u64,
    sample_rate: u32,
}

impl Default for AmbientSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl AmbientSynth {
    pub fn new() -> Self {
        Self::with_sample_rate(SAMPLE_RATE)
    }

    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            state: SynthState::Idle,
            partials: Vec::new(),
            master: Ramp::hold(0.0),
            pos: 0,
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn state(&self) -> SynthState {
        self.state
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_active(&self) -> bool {
        self.state != SynthState::Idle
    }

    /// Detune offsets of the running partials, in cents.
    pub fn detune_cents(&self) -> Vec<f64> {
        self.partials
            .iter()
            .zip(CHORD_HZ)
            .map(|(p, base)| 1200.0 * (p.freq / base).log2())
            .collect()
    }

    fn fade_samples(&self) -> u64 {
        (FADE.as_secs_f64() * f64::from(self.sample_rate)).round() as u64
    }

    /// Start the chord with a fresh random detune and ramp the master gain up over [`FADE`].
    pub fn start(&mut self) -> ReelResult<()> {
        self.start_with_rng(&mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ReelResult<()> {
        if self.state != SynthState::Idle {
            return Err(ReelError::validation("ambient synth is already started"));
        }
        self.partials = CHORD_HZ
            .iter()
            .map(|&hz| {
                let cents = rng.gen_range(-MAX_DETUNE_CENTS..=MAX_DETUNE_CENTS);
                Partial {
                    freq: hz * 2f64.powf(cents / 1200.0),
                    phase: 0.0,
                }
            })
            .collect();
        self.pos = 0;
        self.master = Ramp {
            from: 0.0,
            to: MASTER_GAIN,
            start: 0,
            len: self.fade_samples(),
        };
        self.state = SynthState::Running;
        tracing::debug!(detune = ?self.detune_cents(), "ambient synth started");
        Ok(())
    }

    /// Ramp to silence over [`FADE`]; the synth disposes itself once the fade has played out.
    pub fn stop(&mut self) {
        if self.state != SynthState::Running {
            return;
        }
        let current = self.master.value_at(self.pos);
        let len = self.fade_samples();
        self.master = Ramp {
            from: current,
            to: 0.0,
            start: self.pos,
            len,
        };
        self.state = SynthState::FadingOut {
            ends_at: self.pos + len,
        };
        tracing::debug!("ambient synth fading out");
    }

    fn dispose(&mut self) {
        self.partials.clear();
        self.master = Ramp::hold(0.0);
        self.state = SynthState::Idle;
        tracing::debug!("ambient synth disposed");
    }

    /// Interleaved stereo samples; `None` unless the synth is active.
    pub fn stream(&mut self) -> Option<AudioStream<'_>> {
        if self.is_active() {
            Some(AudioStream {
                synth: self,
                pending_right: None,
            })
        } else {
            None
        }
    }

    fn next_frame(&mut self) -> Option<f32> {
        if let SynthState::FadingOut { ends_at } = self.state
            && self.pos >= ends_at
        {
            self.dispose();
        }
        if self.state == SynthState::Idle {
            return None;
        }
        let gain = self.master.value_at(self.pos);
        let sr = f64::from(self.sample_rate);
        let mut mix = 0.0;
        for p in &mut self.partials {
            mix += p.phase.sin() * PARTIAL_GAIN;
            p.phase = (p.phase + TAU * p.freq / sr) % TAU;
        }
        self.pos += 1;
        Some((mix * gain) as f32)
    }
}

/// Iterator over interleaved stereo `f32` samples from an active synth.
///
/// Ends when the synth finishes fading out.
#[derive(Debug)]
pub struct AudioStream<'a> {
    synth: &'a mut AmbientSynth,
    pending_right: Option<f32>,
}

impl AudioStream<'_> {
    /// Up to `frames` stereo frames (`2 * frames` samples).
    pub fn take_frames(&mut self, frames: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(frames * usize::from(CHANNELS));
        out.extend(self.by_ref().take(frames * usize::from(CHANNELS)));
        out
    }
}

impl Iterator for AudioStream<'_> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if let Some(right) = self.pending_right.take() {
            return Some(right);
        }
        let s = self.synth.next_frame()?;
        self.pending_right = Some(s);
        Some(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/synth.rs"]
mod tests;
