use super::*;

#[test]
fn normalization_ignores_case_and_separators() {
    assert_eq!(normalize_icon_name("Calendar-Days"), "calendardays");
    assert_eq!(normalize_icon_name("calendar_days"), "calendardays");
    assert_eq!(resolve_icon(Some("CalendarDays")).key, "calendar");
    assert_eq!(resolve_icon(Some("calendar-days")).key, "calendar");
}

#[test]
fn aliases_and_prefixes_resolve() {
    assert_eq!(resolve_icon(Some("fire")).key, "flame");
    assert_eq!(resolve_icon(Some("Lightning")).key, "zap");
    assert_eq!(resolve_icon(Some("heart-pulse")).key, "heart");
    assert_eq!(resolve_icon(Some("music-2")).key, "music");
}

#[test]
fn unknown_or_missing_names_fall_back() {
    assert_eq!(resolve_icon(None).key, FALLBACK_ICON.key);
    assert_eq!(resolve_icon(Some("")).key, FALLBACK_ICON.key);
    assert_eq!(resolve_icon(Some("--")).key, FALLBACK_ICON.key);
    assert_eq!(resolve_icon(Some("definitely-not-an-icon")).key, FALLBACK_ICON.key);
    assert!(lookup_icon("definitely-not-an-icon").is_none());
}

#[test]
fn every_glyph_has_geometry_inside_its_box() {
    use kurbo::Shape;

    for glyph in ICONS.iter().chain(std::iter::once(&FALLBACK_ICON)) {
        let path = glyph.outline();
        assert!(!path.elements().is_empty(), "{} has no geometry", glyph.key);
        let bbox = path.bounding_box();
        assert!(bbox.x0 >= -0.5 && bbox.y0 >= -0.5, "{} bbox {bbox:?}", glyph.key);
        assert!(
            bbox.x1 <= ICON_BOX + 0.5 && bbox.y1 <= ICON_BOX + 0.5,
            "{} bbox {bbox:?}",
            glyph.key
        );
    }
}

#[test]
fn keys_are_unique_and_normalized() {
    let mut keys: Vec<_> = ICONS.iter().map(|g| g.key).collect();
    keys.push(FALLBACK_ICON.key);
    for k in &keys {
        assert_eq!(normalize_icon_name(k), *k);
    }
    let n = keys.len();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), n);
}
