use crate::compose::icons::IconGlyph;
use crate::foundation::core::{Affine, Point, Rect, Rgba8};
use crate::timeline::phase::{MonthSlot, Phase};

/// Typeface role; each role resolves to its own font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontRole {
    /// Heavy headline face.
    Display,
    Mono,
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub role: FontRole,
    /// Font size in logical pixels.
    pub size: f64,
    pub color: Rgba8,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(role: FontRole, size: f64, color: Rgba8) -> Self {
        Self {
            role,
            size,
            color,
            align: TextAlign::Center,
        }
    }

    pub fn aligned(self, align: TextAlign) -> Self {
        Self { align, ..self }
    }
}

/// One entry of a frame's display list, in logical coordinates.
///
/// Coordinates are interpreted under the product of all currently pushed layer transforms.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Cover the whole surface.
    Fill(Rgba8),
    Circle {
        center: Point,
        radius: f64,
        color: Rgba8,
    },
    RoundRect {
        rect: Rect,
        radius: f64,
        color: Rgba8,
    },
    /// Single line of text; `origin.y` is the alphabetic baseline, `origin.x` the anchor chosen by
    /// `style.align`.
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
    },
    /// Outline glyph from the icon table, scaled so its 24-unit box spans `size`.
    Icon {
        glyph: &'static IconGlyph,
        center: Point,
        size: f64,
        color: Rgba8,
    },
    PushLayer {
        transform: Affine,
        opacity: f32,
    },
    PopLayer,
}

/// What a frame showed, for callers and tests that cannot inspect pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameMeta {
    pub phase: Option<Phase>,
    pub phase_local: f64,
    pub month: Option<MonthSlot>,
    pub month_count: usize,
    pub stat_cards: usize,
    /// Wrapped verdict body lines (verdict phase only).
    pub verdict_lines: Vec<String>,
    pub watermark: bool,
}

/// Display list plus metadata for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameScene {
    pub ops: Vec<DrawOp>,
    pub meta: FrameMeta,
}

impl FrameScene {
    pub(crate) fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Run `f` inside a layer; empty layers are dropped.
    pub(crate) fn layer(&mut self, transform: Affine, opacity: f32, f: impl FnOnce(&mut Self)) {
        if opacity <= 0.0 {
            return;
        }
        let mark = self.ops.len();
        self.ops.push(DrawOp::PushLayer { transform, opacity });
        f(self);
        if self.ops.len() == mark + 1 {
            self.ops.truncate(mark);
        } else {
            self.ops.push(DrawOp::PopLayer);
        }
    }

    /// Every text string in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
