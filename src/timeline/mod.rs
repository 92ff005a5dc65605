//! Playback timing: the fixed phase table, frame clocks and the play/stop state machine.

/// Display-refresh abstractions.
pub mod clock;
/// Fixed phase boundaries over normalized progress.
pub mod phase;
/// Player binding a timeline to the compositor and a render surface.
pub mod player;
/// Playback session state machine.
pub mod scheduler;
