use crate::foundation::math::clamp01;

/// Named segment of a reel's playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intro,
    Months,
    Stats,
    Verdict,
}

/// Half-open `[start, end)` span of normalized progress; the last span also owns `1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSpan {
    pub phase: Phase,
    pub start: f64,
    pub end: f64,
}

impl PhaseSpan {
    pub fn width(self) -> f64 {
        self.end - self.start
    }
}

/// Boundaries are fixed fractions of the total duration, independent of content.
pub const PHASE_TABLE: [PhaseSpan; 4] = [
    PhaseSpan {
        phase: Phase::Intro,
        start: 0.0,
        end: 0.10,
    },
    PhaseSpan {
        phase: Phase::Months,
        start: 0.10,
        end: 0.50,
    },
    PhaseSpan {
        phase: Phase::Stats,
        start: 0.50,
        end: 0.70,
    },
    PhaseSpan {
        phase: Phase::Verdict,
        start: 0.70,
        end: 1.0,
    },
];

/// Active phase and the progress within it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhasePosition {
    pub phase: Phase,
    /// `(progress - start) / width`, in `[0, 1]`.
    pub local: f64,
}

/// Map global progress to its phase. Out-of-range input is clamped to `[0, 1]`.
pub fn phase_at(progress: f64) -> PhasePosition {
    let p = clamp01(progress);
    let last = PHASE_TABLE.len() - 1;
    let span = PHASE_TABLE
        .iter()
        .take(last)
        .find(|s| p < s.end)
        .copied()
        .unwrap_or(PHASE_TABLE[last]);
    PhasePosition {
        phase: span.phase,
        local: clamp01((p - span.start) / span.width()),
    }
}

/// One month entry's share of the months phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonthSlot {
    pub index: usize,
    pub count: usize,
    /// Progress within this entry, in `[0, 1)`.
    pub local: f64,
}

/// Split months-phase progress evenly across `count` entries. `None` when there are no entries.
pub fn month_slot(phase_local: f64, count: usize) -> Option<MonthSlot> {
    if count == 0 {
        return None;
    }
    let scaled = clamp01(phase_local) * count as f64;
    let index = (scaled.floor() as usize).min(count - 1);
    Some(MonthSlot {
        index,
        count,
        local: crate::foundation::math::fract(scaled),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/phase.rs"]
mod tests;
