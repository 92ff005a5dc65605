//! CPU rasterization of composed frames.

/// `vello_cpu` display-list rasterizer.
pub mod cpu;
/// Font discovery and parley text shaping.
pub mod fonts;
/// Render targets and frame buffers.
pub mod surface;
