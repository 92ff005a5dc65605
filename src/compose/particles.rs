use crate::compose::palette;
use crate::compose::scene::{DrawOp, FrameScene};
use crate::foundation::core::{Point, Rgba8};

pub const PARTICLE_COUNT: usize = 100;

const COLORS: [Rgba8; 4] = [palette::PINK, palette::BLUE, palette::GREEN, palette::YELLOW];

/// Position, radius and colour of particle `i` at `elapsed_ms`.
///
/// A pure function of the particle's fixed seed and the elapsed time, never of playback progress,
/// so motion stays continuous at any frame rate.
pub fn particle_at(i: usize, elapsed_ms: f64, width: f64, height: f64) -> (Point, f64, Rgba8) {
    let t = elapsed_ms / 1000.0;
    let seed = (i * 1337) as f64;
    let x = (seed.sin() * 0.5 + 0.5) * width;
    let drift = t * 20.0 * ((i % 3) + 1) as f64;
    let y = ((seed * 0.7).cos() * 0.5 + 0.5) * height + drift;
    let radius = ((i % 4) + 1) as f64;
    let alpha = 0.1 + ((t + i as f64).sin() * 0.5 + 0.5) * 0.3;
    let color = COLORS[i % COLORS.len()].with_opacity(alpha as f32);
    (Point::new(x, y.rem_euclid(height)), radius, color)
}

pub(crate) fn compose_particles(scene: &mut FrameScene, elapsed_ms: f64, width: f64, height: f64) {
    for i in 0..PARTICLE_COUNT {
        let (center, radius, color) = particle_at(i, elapsed_ms, width, height);
        scene.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }
}
