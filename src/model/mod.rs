/// Runtime configuration for rendering, capture and export.
pub mod config;
/// Result payload consumed by the reel.
pub mod input;
