//! Per-phase draw routines. All coordinates are in the 1920x1080 logical space.

use crate::compose::icons::resolve_icon;
use crate::compose::palette;
use crate::compose::scene::{DrawOp, FontRole, FrameScene, TextAlign, TextStyle};
use crate::compose::text::{TextMeasure, split_two_lines, take_chars, truncate_chars, wrap_words};
use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::math::{clamp01, lerp};
use crate::model::input::ReelInput;
use crate::timeline::phase::MonthSlot;

pub const LOGICAL_WIDTH: f64 = 1920.0;
pub const LOGICAL_HEIGHT: f64 = 1080.0;

const CENTER: Vec2 = Vec2::new(LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT / 2.0);

pub const MONTH_CONTENT_MAX_CHARS: usize = 80;
pub const MAX_STAT_CARDS: usize = 4;
pub const STAT_LABEL_MAX_CHARS: usize = 30;
pub const STAT_SECOND_LINE_MAX_CHARS: usize = 25;
pub const STAT_STAGGER: f64 = 0.15;
pub const STAT_ENTRANCE: f64 = 0.3;

const STAT_GRID_TOP: f64 = 280.0;
const STAT_CELL_W: f64 = 450.0;
const STAT_CELL_H: f64 = 250.0;
const STAT_CARD_W: f64 = 380.0;
const STAT_CARD_H: f64 = 180.0;

fn text(scene: &mut FrameScene, s: impl Into<String>, x: f64, y: f64, style: TextStyle) {
    let s = s.into();
    if s.is_empty() {
        return;
    }
    scene.push(DrawOp::Text {
        text: s,
        origin: Point::new(x, y),
        style,
    });
}

fn centered_scale(scale: f64) -> Affine {
    Affine::translate(CENTER) * Affine::scale(scale)
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

pub(crate) fn compose_intro(scene: &mut FrameScene, data: &ReelInput, local: f64, year: i32) {
    let scale = lerp(0.5, 1.0, local);
    let opacity = (local * 2.0).min(1.0) as f32;
    scene.layer(centered_scale(scale), opacity, |s| {
        text(
            s,
            format!("{year} WRAPPED"),
            0.0,
            -120.0,
            TextStyle::new(FontRole::Mono, 24.0, palette::PINK),
        );
        text(
            s,
            non_empty(data.user_name.as_deref()).unwrap_or("YOUR YEAR"),
            0.0,
            20.0,
            TextStyle::new(FontRole::Display, 120.0, palette::WHITE),
        );
        if let Some(tagline) = non_empty(data.tagline.as_deref()) {
            text(
                s,
                format!("\"{tagline}\""),
                0.0,
                100.0,
                TextStyle::new(FontRole::Body, 32.0, palette::DIM_WHITE),
            );
        }
    });
}

/// Opacity and horizontal offset of the month card at `local` progress through its slot.
pub fn month_transition(local: f64) -> (f64, f64) {
    let slide = if local < 0.1 {
        (1.0 - local / 0.1) * 200.0
    } else {
        0.0
    };
    let fade_in = (local / 0.1).min(1.0);
    let fade_out = if local > 0.9 {
        1.0 - (local - 0.9) / 0.1
    } else {
        1.0
    };
    (clamp01(fade_in * fade_out), slide)
}

pub(crate) fn compose_month(
    scene: &mut FrameScene,
    data: &ReelInput,
    slot: MonthSlot,
    measure: &mut dyn TextMeasure,
) {
    let Some(month) = data.months.get(slot.index) else {
        return;
    };
    let (opacity, slide) = month_transition(slot.local);
    let transform = Affine::translate(CENTER + Vec2::new(slide, 0.0));

    scene.layer(transform, opacity as f32, |s| {
        s.push(DrawOp::Circle {
            center: Point::new(0.0, -80.0),
            radius: 60.0,
            color: palette::DISC,
        });
        s.push(DrawOp::Icon {
            glyph: resolve_icon(month.icon_name.as_deref()),
            center: Point::new(0.0, -80.0),
            size: 40.0,
            color: palette::PINK,
        });
        text(
            s,
            month.name.as_deref().unwrap_or_default().to_uppercase(),
            0.0,
            40.0,
            TextStyle::new(FontRole::Display, 100.0, palette::WHITE),
        );
        text(
            s,
            format!("\"{}\"", month.title.as_deref().unwrap_or_default()),
            0.0,
            100.0,
            TextStyle::new(FontRole::Body, 36.0, palette::PINK),
        );

        let content = truncate_chars(
            month.content.as_deref().unwrap_or_default(),
            MONTH_CONTENT_MAX_CHARS,
        );
        let body = TextStyle::new(FontRole::Body, 24.0, palette::DIM_WHITE);
        for (i, line) in wrap_words(measure, &content, body.role, body.size, 800.0)
            .into_iter()
            .enumerate()
        {
            text(s, line, 0.0, 160.0 + 32.0 * i as f64, body);
        }

        text(
            s,
            format!(
                "Mood: {}",
                non_empty(month.mood.as_deref()).unwrap_or("vibing")
            ),
            0.0,
            227.0,
            TextStyle::new(FontRole::Mono, 18.0, palette::WHITE),
        );
    });

    compose_progress_dots(scene, slot.index, slot.count);
}

/// Row of dots marking the current month entry.
pub(crate) fn compose_progress_dots(scene: &mut FrameScene, current: usize, total: usize) {
    const DOT: f64 = 8.0;
    const GAP: f64 = 20.0;
    let n = total as f64;
    let start_x = (LOGICAL_WIDTH - (n * DOT + (n - 1.0).max(0.0) * GAP)) / 2.0;
    let y = LOGICAL_HEIGHT - 100.0;
    for i in 0..total {
        let x = start_x + i as f64 * (DOT + GAP);
        scene.push(DrawOp::Circle {
            center: Point::new(x + DOT / 2.0, y),
            radius: DOT / 2.0,
            color: if i == current {
                palette::PINK
            } else {
                palette::DOT_IDLE
            },
        });
    }
}

/// Value font size by character count.
pub fn stat_value_font_size(value: &str) -> f64 {
    match value.chars().count() {
        n if n > 20 => 28.0,
        n if n > 15 => 32.0,
        n if n > 10 => 38.0,
        _ => 48.0,
    }
}

/// Entrance progress of card `index` at stats-phase progress `local`.
pub fn stat_card_progress(index: usize, local: f64) -> f64 {
    clamp01((local - index as f64 * STAT_STAGGER) / STAT_ENTRANCE)
}

/// Returns the number of cards drawn.
pub(crate) fn compose_stats(
    scene: &mut FrameScene,
    data: &ReelInput,
    local: f64,
    measure: &mut dyn TextMeasure,
) -> usize {
    let cx = CENTER.x;
    let title_opacity = (local * 3.0).min(1.0) as f32;
    scene.layer(Affine::IDENTITY, title_opacity, |s| {
        text(
            s,
            "YOUR NUMBERS",
            cx,
            200.0,
            TextStyle::new(FontRole::Display, 80.0, palette::BLUE),
        );
    });

    let grid_left = cx - STAT_CELL_W;
    let mut drawn = 0;
    for (i, stat) in data.stats.iter().take(MAX_STAT_CARDS).enumerate() {
        let entrance = stat_card_progress(i, local);
        if entrance <= 0.0 {
            continue;
        }
        drawn += 1;
        let x = grid_left + (i % 2) as f64 * STAT_CELL_W + STAT_CELL_W / 2.0;
        let y = STAT_GRID_TOP + (i / 2) as f64 * STAT_CELL_H;
        let value = stat.display_value();
        let label = stat.label.as_deref().unwrap_or_default().to_uppercase();

        scene.layer(Affine::IDENTITY, entrance as f32, |s| {
            s.push(DrawOp::RoundRect {
                rect: Rect::new(
                    x - STAT_CARD_W / 2.0,
                    y - 20.0,
                    x + STAT_CARD_W / 2.0,
                    y - 20.0 + STAT_CARD_H,
                ),
                radius: 15.0,
                color: palette::CARD,
            });

            let size = stat_value_font_size(&value);
            let style = TextStyle::new(FontRole::Display, size, palette::WHITE);
            let max_width = STAT_CARD_W - 40.0;
            if measure.measure(&value, style.role, size) > max_width {
                let (first, second) = split_two_lines(measure, &value, style.role, size, max_width);
                if !first.is_empty() {
                    text(s, first, x, y + 50.0, style);
                }
                text(
                    s,
                    take_chars(&second, STAT_SECOND_LINE_MAX_CHARS),
                    x,
                    y + 50.0 + size,
                    TextStyle {
                        size: size - 8.0,
                        ..style
                    },
                );
            } else {
                text(s, value, x, y + 60.0, style);
            }

            text(
                s,
                truncate_chars(&label, STAT_LABEL_MAX_CHARS),
                x,
                y + STAT_CARD_H - 30.0,
                TextStyle::new(FontRole::Mono, 14.0, palette::PINK),
            );
        });
    }
    drawn
}

/// Returns the wrapped verdict lines.
pub(crate) fn compose_verdict(
    scene: &mut FrameScene,
    data: &ReelInput,
    local: f64,
    measure: &mut dyn TextMeasure,
) -> Vec<String> {
    let verdict = non_empty(data.final_verdict.as_deref()).unwrap_or("You are amazing!");
    let body = TextStyle::new(FontRole::Body, 36.0, palette::DIM_WHITE);
    let lines = wrap_words(measure, verdict, body.role, body.size, 900.0);

    let scale = lerp(0.8, 1.0, local);
    let opacity = (local * 2.0).min(1.0) as f32;
    scene.layer(centered_scale(scale), opacity, |s| {
        text(
            s,
            "YOUR MOMENT",
            0.0,
            -80.0,
            TextStyle::new(FontRole::Display, 100.0, palette::WHITE),
        );
        for (i, line) in lines.iter().enumerate() {
            text(s, line.clone(), 0.0, 20.0 + 48.0 * i as f64, body);
        }
    });
    lines
}

pub(crate) fn compose_watermark(scene: &mut FrameScene, label: &str) {
    scene.layer(Affine::IDENTITY, 0.5, |s| {
        text(
            s,
            label,
            LOGICAL_WIDTH - 40.0,
            LOGICAL_HEIGHT - 30.0,
            TextStyle::new(FontRole::Mono, 20.0, palette::WHITE).aligned(TextAlign::Right),
        );
    });
}

#[cfg(test)]
#[path = "../../tests/unit/compose/phases.rs"]
mod tests;
