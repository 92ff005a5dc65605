use std::collections::HashMap;

use crate::compose::icons::{ICON_BOX, ICON_STROKE};
use crate::compose::phases::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::compose::scene::{DrawOp, FrameScene};
use crate::foundation::core::{Affine, BezPath, Rgba8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::fonts::TextEngine;
use crate::render::surface::{Surface, canvas_u16};

/// Turns display lists into pixels with `vello_cpu`.
#[derive(Default)]
pub struct CpuRasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    ctx_size: (u16, u16),
    icon_cache: HashMap<&'static str, BezPath>,
    /// Text ops skipped because their role had no font.
    skipped_text: u64,
}

impl std::fmt::Debug for CpuRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRasterizer")
            .field("ctx_size", &self.ctx_size)
            .field("icons_cached", &self.icon_cache.len())
            .finish_non_exhaustive()
    }
}

struct LayerFrame {
    transform: Affine,
    opacity_layer: bool,
}

impl CpuRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skipped_text(&self) -> u64 {
        self.skipped_text
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            Some(mut ctx) if self.ctx_size == (width, height) => {
                ctx.reset();
                ctx
            }
            _ => vello_cpu::RenderContext::new(width, height),
        };
        self.ctx_size = (width, height);
        let out = f(self, &mut ctx);
        self.ctx = Some(ctx);
        out
    }

    /// Draw `scene` onto `surface`, mapping the logical 1920x1080 space onto the surface size.
    pub fn rasterize(
        &mut self,
        scene: &FrameScene,
        surface: &mut Surface,
        text: &mut TextEngine,
    ) -> ReelResult<()> {
        let canvas = surface.canvas();
        let (w, h) = canvas_u16(canvas)?;
        let root = Affine::scale_non_uniform(
            f64::from(canvas.width) / LOGICAL_WIDTH,
            f64::from(canvas.height) / LOGICAL_HEIGHT,
        );

        self.with_ctx_mut(w, h, |this, ctx| -> ReelResult<()> {
            let mut stack = vec![LayerFrame {
                transform: root,
                opacity_layer: false,
            }];
            for op in &scene.ops {
                let top = stack.last().map(|l| l.transform).unwrap_or(root);
                match op {
                    DrawOp::Fill(color) => {
                        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                        set_color(ctx, *color);
                        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                            0.0,
                            0.0,
                            f64::from(w),
                            f64::from(h),
                        ));
                    }
                    DrawOp::Circle {
                        center,
                        radius,
                        color,
                    } => {
                        use kurbo::Shape as _;
                        ctx.set_transform(affine_to_cpu(top));
                        set_color(ctx, *color);
                        let path = kurbo::Circle::new(*center, *radius).to_path(0.1);
                        ctx.fill_path(&bezpath_to_cpu(&path));
                    }
                    DrawOp::RoundRect {
                        rect,
                        radius,
                        color,
                    } => {
                        use kurbo::Shape as _;
                        ctx.set_transform(affine_to_cpu(top));
                        set_color(ctx, *color);
                        let path = rect.to_rounded_rect(*radius).to_path(0.1);
                        ctx.fill_path(&bezpath_to_cpu(&path));
                    }
                    DrawOp::Text {
                        text: s,
                        origin,
                        style,
                    } => {
                        if !text.draw(ctx, top, s, *origin, style) {
                            this.skipped_text += 1;
                        }
                    }
                    DrawOp::Icon {
                        glyph,
                        center,
                        size,
                        color,
                    } => {
                        let outline = this
                            .icon_cache
                            .entry(glyph.key)
                            .or_insert_with(|| stroke_icon(&glyph.outline()));
                        let k = size / ICON_BOX;
                        let placed = top
                            * Affine::translate((center.x - size / 2.0, center.y - size / 2.0))
                            * Affine::scale(k);
                        ctx.set_transform(affine_to_cpu(placed));
                        set_color(ctx, *color);
                        ctx.fill_path(&bezpath_to_cpu(outline));
                    }
                    DrawOp::PushLayer { transform, opacity } => {
                        let opacity_layer = *opacity < 1.0;
                        if opacity_layer {
                            ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
                        }
                        stack.push(LayerFrame {
                            transform: top * *transform,
                            opacity_layer,
                        });
                    }
                    DrawOp::PopLayer => {
                        if stack.len() <= 1 {
                            return Err(ReelError::evaluation(
                                "unbalanced layer pop in display list",
                            ));
                        }
                        if let Some(layer) = stack.pop()
                            && layer.opacity_layer
                        {
                            ctx.pop_layer();
                        }
                    }
                }
            }
            if stack.len() != 1 {
                return Err(ReelError::evaluation("unclosed layer in display list"));
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut surface.pixmap);
            Ok(())
        })
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

/// Fillable outline of a stroked icon, in design units.
fn stroke_icon(centerline: &BezPath) -> BezPath {
    let style = kurbo::Stroke::new(ICON_STROKE)
        .with_caps(kurbo::Cap::Round)
        .with_join(kurbo::Join::Round);
    kurbo::stroke(
        centerline.iter(),
        &style,
        &kurbo::StrokeOpts::default(),
        0.01,
    )
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
