//! Built-in outline icon table.
//!
//! Glyphs are drawn in a 24x24 unit box and stroked with round caps and joins. Lookup is by
//! normalized name (lowercase ASCII alphanumerics), so `calendar-days`, `CalendarDays` and
//! `calendar_days` all hit the same entry.

use kurbo::{BezPath, Circle, Line, Point, RoundedRect, Shape};

use self::IconPrimitive::{
    Circle as C, Line as L, Path as P, Polygon as PG, Polyline as PL, Rect as R,
};

/// Side of the square glyph design box.
pub const ICON_BOX: f64 = 24.0;
/// Stroke width in design units.
pub const ICON_STROKE: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IconPrimitive {
    /// SVG path data.
    Path(&'static str),
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        rx: f64,
    },
    /// Space/comma separated coordinate pairs, left open.
    Polyline(&'static str),
    /// Like [`IconPrimitive::Polyline`] but closed.
    Polygon(&'static str),
}

#[derive(Debug, PartialEq)]
pub struct IconGlyph {
    pub key: &'static str,
    pub primitives: &'static [IconPrimitive],
}

impl IconGlyph {
    /// Centre-line geometry of the glyph in design units.
    pub fn outline(&self) -> BezPath {
        let mut out = BezPath::new();
        for prim in self.primitives {
            match *prim {
                IconPrimitive::Path(d) => match BezPath::from_svg(d) {
                    Ok(p) => out.extend(p.iter()),
                    Err(e) => tracing::debug!(icon = self.key, "skipping bad path data: {e}"),
                },
                IconPrimitive::Circle { cx, cy, r } => {
                    out.extend(Circle::new((cx, cy), r).path_elements(0.05));
                }
                IconPrimitive::Line { x1, y1, x2, y2 } => {
                    out.extend(Line::new((x1, y1), (x2, y2)).path_elements(0.05));
                }
                IconPrimitive::Rect { x, y, w, h, rx } => {
                    out.extend(RoundedRect::new(x, y, x + w, y + h, rx).path_elements(0.05));
                }
                IconPrimitive::Polyline(pts) => push_points(&mut out, pts, false),
                IconPrimitive::Polygon(pts) => push_points(&mut out, pts, true),
            }
        }
        out
    }
}

fn push_points(out: &mut BezPath, pts: &str, close: bool) {
    let nums: Vec<f64> = pts
        .split([' ', ','])
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    let mut pairs = nums.chunks_exact(2).map(|c| Point::new(c[0], c[1]));
    let Some(first) = pairs.next() else {
        return;
    };
    out.move_to(first);
    for p in pairs {
        out.line_to(p);
    }
    if close {
        out.close_path();
    }
}

/// Drawn whenever a name does not resolve.
pub static FALLBACK_ICON: IconGlyph = IconGlyph {
    key: "sparkles",
    primitives: &[
        P(concat!(
            "M9.937 15.5A2 2 0 0 0 8.5 14.063l-6.135-1.582a.5.5 0 0 1 0-.962L8.5 9.936",
            "A2 2 0 0 0 9.937 8.5l1.582-6.135a.5.5 0 0 1 .963 0L14.063 8.5",
            "A2 2 0 0 0 15.5 9.937l6.135 1.581a.5.5 0 0 1 0 .964L15.5 14.063",
            "a2 2 0 0 0-1.437 1.437l-1.582 6.135a.5.5 0 0 1-.963 0z",
        )),
        P("M20 3v4"),
        P("M22 5h-4"),
        P("M4 17v2"),
        P("M5 18H3"),
    ],
};

static ICONS: &[IconGlyph] = &[
    IconGlyph {
        key: "star",
        primitives: &[PG(concat!(
            "12 2 15.09 8.26 22 9.27 17 14.14 18.18 21.02 ",
            "12 17.77 5.82 21.02 7 14.14 2 9.27 8.91 8.26 12 2",
        ))],
    },
    IconGlyph {
        key: "heart",
        primitives: &[P(concat!(
            "M19 14c1.49-1.46 3-3.21 3-5.5A5.5 5.5 0 0 0 16.5 3c-1.76 0-3 .5-4.5 2",
            "-1.5-1.5-2.74-2-4.5-2A5.5 5.5 0 0 0 2 8.5c0 2.3 1.5 4.05 3 5.5l7 7Z",
        ))],
    },
    IconGlyph {
        key: "sun",
        primitives: &[
            C { cx: 12.0, cy: 12.0, r: 4.0 },
            P("M12 2v2"),
            P("M12 20v2"),
            P("m4.93 4.93 1.41 1.41"),
            P("m17.66 17.66 1.41 1.41"),
            P("M2 12h2"),
            P("M20 12h2"),
            P("m6.34 17.66-1.41 1.41"),
            P("m19.07 4.93-1.41 1.41"),
        ],
    },
    IconGlyph {
        key: "moon",
        primitives: &[P("M12 3a6 6 0 0 0 9 9 9 9 0 1 1-9-9Z")],
    },
    IconGlyph {
        key: "zap",
        primitives: &[PG("13 2 3 14 12 14 11 22 21 10 12 10 13 2")],
    },
    IconGlyph {
        key: "music",
        primitives: &[
            P("M9 18V5l12-2v13"),
            C { cx: 6.0, cy: 18.0, r: 3.0 },
            C { cx: 18.0, cy: 16.0, r: 3.0 },
        ],
    },
    IconGlyph {
        key: "coffee",
        primitives: &[
            P("M17 8h1a4 4 0 1 1 0 8h-1"),
            P("M3 8h14v9a4 4 0 0 1-4 4H7a4 4 0 0 1-4-4Z"),
            L { x1: 6.0, y1: 2.0, x2: 6.0, y2: 4.0 },
            L { x1: 10.0, y1: 2.0, x2: 10.0, y2: 4.0 },
            L { x1: 14.0, y1: 2.0, x2: 14.0, y2: 4.0 },
        ],
    },
    IconGlyph {
        key: "calendar",
        primitives: &[
            R { x: 3.0, y: 4.0, w: 18.0, h: 18.0, rx: 2.0 },
            L { x1: 16.0, y1: 2.0, x2: 16.0, y2: 6.0 },
            L { x1: 8.0, y1: 2.0, x2: 8.0, y2: 6.0 },
            L { x1: 3.0, y1: 10.0, x2: 21.0, y2: 10.0 },
        ],
    },
    IconGlyph {
        key: "code",
        primitives: &[PL("16 18 22 12 16 6"), PL("8 6 2 12 8 18")],
    },
    IconGlyph {
        key: "book",
        primitives: &[P("M4 19.5v-15A2.5 2.5 0 0 1 6.5 2H20v20H6.5a2.5 2.5 0 0 1 0-5H20")],
    },
    IconGlyph {
        key: "trophy",
        primitives: &[
            P("M6 9H4.5a2.5 2.5 0 0 1 0-5H6"),
            P("M18 9h1.5a2.5 2.5 0 0 0 0-5H18"),
            P("M4 22h16"),
            P("M10 14.66V17c0 .55-.47.98-.97 1.21C7.85 18.75 7 20.24 7 22"),
            P("M14 14.66V17c0 .55.47.98.97 1.21C16.15 18.75 17 20.24 17 22"),
            P("M18 2H6v7a6 6 0 0 0 12 0V2Z"),
        ],
    },
    IconGlyph {
        key: "rocket",
        primitives: &[
            P(concat!(
                "M4.5 16.5c-1.5 1.26-2 5-2 5s3.74-.5 5-2c.71-.84.7-2.13-.09-2.91",
                "a2.18 2.18 0 0 0-2.91-.09z",
            )),
            P(concat!(
                "m12 15-3-3a22 22 0 0 1 2-3.95A12.88 12.88 0 0 1 22 2c0 2.72-.78 7.5-6 11",
                "a22.35 22.35 0 0 1-4 2z",
            )),
            P("M9 12H4s.55-3.03 2-4c1.62-1.08 5 0 5 0"),
            P("M12 15v5s3.03-.55 4-2c1.08-1.62 0-5 0-5"),
        ],
    },
    IconGlyph {
        key: "camera",
        primitives: &[
            P(concat!(
                "M14.5 4h-5L7 7H4a2 2 0 0 0-2 2v9a2 2 0 0 0 2 2h16a2 2 0 0 0 2-2V9",
                "a2 2 0 0 0-2-2h-3l-2.5-3z",
            )),
            C { cx: 12.0, cy: 13.0, r: 3.0 },
        ],
    },
    IconGlyph {
        key: "plane",
        primitives: &[P(concat!(
            "M17.8 19.2 16 11l3.5-3.5C21 6 21.5 4 21 3c-1-.5-3 0-4.5 1.5L13 8 4.8 6.2",
            "c-.5-.1-.9.1-1.1.5l-.3.5c-.2.5-.1 1 .3 1.3L9 12l-2 3H4l-1 1 3 2 2 3 1-1v-3l3-2",
            " 3.5 5.3c.3.4.8.5 1.3.3l.5-.2c.4-.3.6-.7.5-1.2z",
        ))],
    },
    IconGlyph {
        key: "smile",
        primitives: &[
            C { cx: 12.0, cy: 12.0, r: 10.0 },
            P("M8 14s1.5 2 4 2 4-2 4-2"),
            L { x1: 9.0, y1: 9.0, x2: 9.01, y2: 9.0 },
            L { x1: 15.0, y1: 9.0, x2: 15.01, y2: 9.0 },
        ],
    },
    IconGlyph {
        key: "target",
        primitives: &[
            C { cx: 12.0, cy: 12.0, r: 10.0 },
            C { cx: 12.0, cy: 12.0, r: 6.0 },
            C { cx: 12.0, cy: 12.0, r: 2.0 },
        ],
    },
    IconGlyph {
        key: "flame",
        primitives: &[P(concat!(
            "M8.5 14.5A2.5 2.5 0 0 0 11 12c0-1.38-.5-2-1-3-1.072-2.143-.224-4.054 2-6",
            " .5 2.5 2 4.9 4 6.5 2 1.6 3 3.5 3 5.5a7 7 0 1 1-14 0c0-1.153.433-2.294 1-3",
            "a2.5 2.5 0 0 0 2.5 2.5z",
        ))],
    },
    IconGlyph {
        key: "lightbulb",
        primitives: &[
            P(concat!(
                "M15 14c.2-1 .7-1.7 1.5-2.5 1-.9 1.5-2.2 1.5-3.5A6 6 0 0 0 6 8",
                "c0 1 .2 2.2 1.5 3.5.7.7 1.3 1.5 1.5 2.5",
            )),
            P("M9 18h6"),
            P("M10 22h4"),
        ],
    },
    IconGlyph {
        key: "message",
        primitives: &[P("M7.9 20A9 9 0 1 0 4 16.1L2 22Z")],
    },
];

/// Synonyms, keyed by normalized name.
const ALIASES: &[(&str, &str)] = &[
    ("sparkle", "sparkles"),
    ("calendardays", "calendar"),
    ("calendarcheck", "calendar"),
    ("lightning", "zap"),
    ("bolt", "zap"),
    ("fire", "flame"),
    ("airplane", "plane"),
    ("travel", "plane"),
    ("terminal", "code"),
    ("laptop", "code"),
    ("bookopen", "book"),
    ("award", "trophy"),
    ("medal", "trophy"),
    ("photo", "camera"),
    ("idea", "lightbulb"),
    ("bulb", "lightbulb"),
    ("chat", "message"),
    ("messagecircle", "message"),
    ("messagesquare", "message"),
    ("happy", "smile"),
    ("goal", "target"),
    ("cup", "coffee"),
    ("night", "moon"),
    ("sunny", "sun"),
    ("love", "heart"),
];

const MIN_PREFIX: usize = 3;

pub fn normalize_icon_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn by_key(key: &str) -> Option<&'static IconGlyph> {
    if key == FALLBACK_ICON.key {
        return Some(&FALLBACK_ICON);
    }
    ICONS.iter().find(|g| g.key == key)
}

/// Resolve an icon name to a glyph; unknown or missing names give [`FALLBACK_ICON`].
pub fn resolve_icon(name: Option<&str>) -> &'static IconGlyph {
    lookup_icon(name.unwrap_or_default()).unwrap_or(&FALLBACK_ICON)
}

/// Resolve without falling back.
///
/// Tries an exact key, then the alias table, then the longest table key that prefixes the name
/// (`heartpulse` -> `heart`).
pub fn lookup_icon(name: &str) -> Option<&'static IconGlyph> {
    let key = normalize_icon_name(name);
    if key.is_empty() {
        return None;
    }
    if let Some(g) = by_key(&key) {
        return Some(g);
    }
    if let Some((_, target)) = ALIASES.iter().find(|(alias, _)| *alias == key) {
        return by_key(target);
    }
    ICONS
        .iter()
        .chain(std::iter::once(&FALLBACK_ICON))
        .filter(|g| g.key.len() >= MIN_PREFIX && key.starts_with(g.key))
        .max_by_key(|g| g.key.len())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/icons.rs"]
mod tests;
