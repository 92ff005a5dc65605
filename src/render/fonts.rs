use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::compose::scene::{FontRole, TextAlign, TextStyle};
use crate::compose::text::{EstimateMeasure, TextMeasure};
use crate::foundation::core::{Affine, Point};
use crate::foundation::error::{ReelError, ReelResult};
use crate::model::config::FontPaths;

/// Raw bytes of one font face.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
}

/// Font face per [`FontRole`]. A role without a face is measured by estimate and not drawn.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    display: Option<FontFace>,
    mono: Option<FontFace>,
    body: Option<FontFace>,
}

const ROLES: [FontRole; 3] = [FontRole::Display, FontRole::Mono, FontRole::Body];

fn preferred_families(role: FontRole) -> &'static [&'static str] {
    match role {
        FontRole::Display => &["Bebas Neue", "Arial Black", "Impact", "DejaVu Sans"],
        FontRole::Mono => &["Space Mono", "Courier New", "DejaVu Sans Mono", "Liberation Mono"],
        FontRole::Body => &["Inter", "Arial", "Helvetica", "DejaVu Sans", "Liberation Sans"],
    }
}

impl FontBook {
    /// No faces at all; every role degrades to the width estimate.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn face(&self, role: FontRole) -> Option<&FontFace> {
        match role {
            FontRole::Display => self.display.as_ref(),
            FontRole::Mono => self.mono.as_ref(),
            FontRole::Body => self.body.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: FontRole) -> &mut Option<FontFace> {
        match role {
            FontRole::Display => &mut self.display,
            FontRole::Mono => &mut self.mono,
            FontRole::Body => &mut self.body,
        }
    }

    /// Explicit files first, then the system font database.
    #[tracing::instrument(skip_all)]
    pub fn load(paths: &FontPaths) -> ReelResult<Self> {
        let mut book = Self::default();
        let explicit = [
            (FontRole::Display, paths.display.as_deref()),
            (FontRole::Mono, paths.mono.as_deref()),
            (FontRole::Body, paths.body.as_deref()),
        ];
        for (role, path) in explicit {
            if let Some(path) = path {
                *book.slot_mut(role) = Some(read_font_file(path)?);
            }
        }

        if ROLES.iter().any(|r| book.face(*r).is_none()) {
            let system = Self::system();
            for role in ROLES {
                let slot = book.slot_mut(role);
                if slot.is_none() {
                    *slot = system.face(role).cloned();
                }
            }
        }

        for role in ROLES {
            if book.face(role).is_none() {
                tracing::warn!(?role, "no font available; text for this role will not be drawn");
            }
        }
        Ok(book)
    }

    /// Faces resolved from installed system fonts, loaded once per process.
    pub fn system() -> &'static FontBook {
        static SYSTEM: OnceLock<FontBook> = OnceLock::new();
        SYSTEM.get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system font database");

            let mut book = FontBook::default();
            for role in ROLES {
                *book.slot_mut(role) = query_system_face(&db, role);
            }
            book
        })
    }
}

fn read_font_file(path: &Path) -> ReelResult<FontFace> {
    let bytes = std::fs::read(path).map_err(|e| {
        ReelError::resource_load(format!("failed to read font '{}': {e}", path.display()))
    })?;
    Ok(FontFace {
        bytes: Arc::new(bytes),
        index: 0,
    })
}

fn query_system_face(db: &usvg::fontdb::Database, role: FontRole) -> Option<FontFace> {
    use usvg::fontdb::{Family, Query, Weight};

    let generic = match role {
        FontRole::Mono => Family::Monospace,
        _ => Family::SansSerif,
    };
    let mut families: Vec<Family<'_>> = preferred_families(role)
        .iter()
        .map(|name| Family::Name(*name))
        .collect();
    families.push(generic);

    let weight = match role {
        FontRole::Body => Weight::NORMAL,
        _ => Weight::BOLD,
    };
    let id = db
        .query(&Query {
            families: &families,
            weight,
            ..Default::default()
        })
        .or_else(|| db.faces().next().map(|f| f.id))?;

    db.with_face_data(id, |data, index| FontFace {
        bytes: Arc::new(data.to_vec()),
        index,
    })
}

/// Brush colour carried through parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Shapes and draws text for the three font roles.
pub struct TextEngine {
    book: Arc<FontBook>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    families: HashMap<FontRole, Option<String>>,
    draw_fonts: HashMap<FontRole, vello_cpu::peniko::FontData>,
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("book", &self.book)
            .finish_non_exhaustive()
    }
}

impl TextEngine {
    pub fn new(book: Arc<FontBook>) -> Self {
        Self {
            book,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
            draw_fonts: HashMap::new(),
        }
    }

    pub fn has_font(&self, role: FontRole) -> bool {
        self.book.face(role).is_some()
    }

    fn family_for(&mut self, role: FontRole) -> Option<String> {
        if let Some(name) = self.families.get(&role) {
            return name.clone();
        }
        let name = self.book.face(role).and_then(|face| {
            let families = self
                .font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(face.bytes.as_ref().clone()), None);
            let (id, _) = families.first()?;
            self.font_ctx
                .collection
                .family_name(*id)
                .map(str::to_string)
        });
        if name.is_none() && self.book.face(role).is_some() {
            tracing::warn!(?role, "font bytes did not register a family");
        }
        self.families.insert(role, name.clone());
        name
    }

    fn layout(
        &mut self,
        text: &str,
        role: FontRole,
        size: f64,
        brush: TextBrush,
    ) -> Option<parley::Layout<TextBrush>> {
        let family = self.family_for(role)?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size as f32));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Some(layout)
    }

    fn draw_font(&mut self, role: FontRole) -> Option<vello_cpu::peniko::FontData> {
        if let Some(font) = self.draw_fonts.get(&role) {
            return Some(font.clone());
        }
        let face = self.book.face(role)?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
            face.index,
        );
        self.draw_fonts.insert(role, font.clone());
        Some(font)
    }

    /// Draw one line of text under `transform`. Returns `false` when the role has no font.
    pub(crate) fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        transform: Affine,
        text: &str,
        origin: Point,
        style: &TextStyle,
    ) -> bool {
        let c = style.color;
        let brush = TextBrush {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        };
        let Some(layout) = self.layout(text, style.role, style.size, brush) else {
            return false;
        };
        let Some(font) = self.draw_font(style.role) else {
            return false;
        };

        let width = f64::from(layout.width());
        let dx = match style.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => -width / 2.0,
            TextAlign::Right => -width,
        };
        let baseline = layout
            .lines()
            .next()
            .map(|line| f64::from(line.metrics().baseline))
            .unwrap_or(style.size * 0.8);
        let placed = transform * Affine::translate((origin.x + dx, origin.y - baseline));
        ctx.set_transform(crate::render::cpu::affine_to_cpu(placed));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        true
    }
}

impl TextMeasure for TextEngine {
    fn measure(&mut self, text: &str, role: FontRole, size: f64) -> f64 {
        match self.layout(text, role, size, TextBrush::default()) {
            Some(layout) => f64::from(layout.width()),
            None => EstimateMeasure.measure(text, role, size),
        }
    }
}
