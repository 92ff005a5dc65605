use std::sync::Arc;

use super::*;
use crate::compose::icons::resolve_icon;
use crate::compose::scene::{FontRole, TextStyle};
use crate::foundation::core::{Canvas, Point, Rect};
use crate::render::fonts::FontBook;

fn small_surface() -> Surface {
    Surface::new(Canvas::new(192, 108).unwrap()).unwrap()
}

fn engine() -> TextEngine {
    TextEngine::new(Arc::new(FontBook::empty()))
}

fn scene(ops: Vec<DrawOp>) -> FrameScene {
    FrameScene {
        ops,
        ..FrameScene::default()
    }
}

#[test]
fn fill_and_circle_land_in_scaled_space() {
    let mut surface = small_surface();
    let s = scene(vec![
        DrawOp::Fill(Rgba8::rgb(0x050505)),
        DrawOp::Circle {
            center: Point::new(960.0, 540.0),
            radius: 100.0,
            color: Rgba8::rgb(0xffffff),
        },
    ]);
    CpuRasterizer::new()
        .rasterize(&s, &mut surface, &mut engine())
        .unwrap();
    let frame = surface.snapshot();
    assert_eq!(frame.pixel(0, 0), Some([5, 5, 5, 255]));
    let center = frame.pixel(96, 54).unwrap();
    assert!(center[0] > 250 && center[3] == 255, "{center:?}");
    assert_eq!(frame.pixel(96, 30), Some([5, 5, 5, 255]));
}

#[test]
fn opacity_layer_blends() {
    let mut surface = small_surface();
    let s = scene(vec![
        DrawOp::Fill(Rgba8::rgb(0x000000)),
        DrawOp::PushLayer {
            transform: Affine::IDENTITY,
            opacity: 0.5,
        },
        DrawOp::RoundRect {
            rect: Rect::new(0.0, 0.0, 1920.0, 1080.0),
            radius: 0.0,
            color: Rgba8::rgb(0xffffff),
        },
        DrawOp::PopLayer,
    ]);
    CpuRasterizer::new()
        .rasterize(&s, &mut surface, &mut engine())
        .unwrap();
    let px = surface.snapshot().pixel(50, 50).unwrap();
    assert!((120..=135).contains(&px[0]), "{px:?}");
}

#[test]
fn icons_draw_pixels() {
    let mut surface = small_surface();
    let s = scene(vec![
        DrawOp::Fill(Rgba8::rgb(0x000000)),
        DrawOp::Icon {
            glyph: resolve_icon(Some("target")),
            center: Point::new(960.0, 540.0),
            size: 400.0,
            color: Rgba8::rgb(0xff0000),
        },
    ]);
    let mut raster = CpuRasterizer::new();
    raster.rasterize(&s, &mut surface, &mut engine()).unwrap();
    let lit = surface
        .pixels()
        .chunks_exact(4)
        .filter(|px| px[0] > 100)
        .count();
    assert!(lit > 20, "only {lit} icon pixels");
}

#[test]
fn text_without_fonts_is_skipped_not_fatal() {
    let mut surface = small_surface();
    let s = scene(vec![
        DrawOp::Fill(Rgba8::rgb(0x000000)),
        DrawOp::Text {
            text: "hello".into(),
            origin: Point::new(100.0, 100.0),
            style: TextStyle::new(FontRole::Body, 24.0, Rgba8::rgb(0xffffff)),
        },
    ]);
    let mut raster = CpuRasterizer::new();
    raster.rasterize(&s, &mut surface, &mut engine()).unwrap();
    assert_eq!(raster.skipped_text(), 1);
}

#[test]
fn unbalanced_layers_are_rejected() {
    let mut surface = small_surface();
    let mut raster = CpuRasterizer::new();
    let pop = scene(vec![DrawOp::PopLayer]);
    assert!(raster.rasterize(&pop, &mut surface, &mut engine()).is_err());
    let push = scene(vec![DrawOp::PushLayer {
        transform: Affine::IDENTITY,
        opacity: 1.0,
    }]);
    assert!(raster.rasterize(&push, &mut surface, &mut engine()).is_err());
}
