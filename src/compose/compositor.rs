use std::sync::Arc;

use chrono::Datelike as _;

use crate::compose::palette;
use crate::compose::particles::compose_particles;
use crate::compose::phases::{
    LOGICAL_HEIGHT, LOGICAL_WIDTH, compose_intro, compose_month, compose_stats, compose_verdict,
    compose_watermark,
};
use crate::compose::scene::{DrawOp, FrameMeta, FrameScene};
use crate::compose::text::TextMeasure;
use crate::foundation::error::ReelResult;
use crate::model::input::ReelInput;
use crate::render::cpu::CpuRasterizer;
use crate::render::fonts::{FontBook, TextEngine};
use crate::render::surface::Surface;
use crate::timeline::phase::{Phase, month_slot, phase_at};

/// Per-reel settings that do not come from the input payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposeOptions {
    /// Corner label drawn on every frame; empty disables it.
    pub watermark: String,
    /// Year shown on the intro badge.
    pub year: i32,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            watermark: "prompt2wrapped".to_string(),
            year: chrono::Local::now().year(),
        }
    }
}

/// Build the display list for one frame.
///
/// Pure in `data`; particle motion depends only on `elapsed_ms`, everything else on `progress`.
pub fn compose_frame(
    data: &ReelInput,
    elapsed_ms: f64,
    progress: f64,
    measure: &mut dyn TextMeasure,
    opts: &ComposeOptions,
) -> FrameScene {
    let mut scene = FrameScene::default();
    scene.push(DrawOp::Fill(palette::BACKGROUND));
    compose_particles(&mut scene, elapsed_ms.max(0.0), LOGICAL_WIDTH, LOGICAL_HEIGHT);

    let pos = phase_at(progress);
    let mut meta = FrameMeta {
        phase: Some(pos.phase),
        phase_local: pos.local,
        month_count: data.months.len(),
        ..FrameMeta::default()
    };

    match pos.phase {
        Phase::Intro => compose_intro(&mut scene, data, pos.local, opts.year),
        Phase::Months => {
            if let Some(slot) = month_slot(pos.local, data.months.len()) {
                meta.month = Some(slot);
                compose_month(&mut scene, data, slot, measure);
            }
        }
        Phase::Stats => {
            meta.stat_cards = compose_stats(&mut scene, data, pos.local, measure);
        }
        Phase::Verdict => {
            meta.verdict_lines = compose_verdict(&mut scene, data, pos.local, measure);
        }
    }

    if !opts.watermark.is_empty() {
        compose_watermark(&mut scene, &opts.watermark);
        meta.watermark = true;
    }
    scene.meta = meta;
    scene
}

/// Draws reel frames onto a [`Surface`].
#[derive(Debug)]
pub struct Compositor {
    rasterizer: CpuRasterizer,
    text: TextEngine,
    options: ComposeOptions,
}

impl Compositor {
    pub fn new(fonts: Arc<FontBook>, options: ComposeOptions) -> Self {
        Self {
            rasterizer: CpuRasterizer::new(),
            text: TextEngine::new(fonts),
            options,
        }
    }

    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// Render one frame. Only `surface` is written.
    pub fn render_frame(
        &mut self,
        surface: &mut Surface,
        data: &ReelInput,
        elapsed_ms: f64,
        progress: f64,
    ) -> ReelResult<FrameMeta> {
        let scene = compose_frame(data, elapsed_ms, progress, &mut self.text, &self.options);
        self.rasterizer.rasterize(&scene, surface, &mut self.text)?;
        surface.flatten_onto(palette::BACKGROUND);
        Ok(scene.meta)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
