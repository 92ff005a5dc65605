use crate::compose::scene::FontRole;

/// Width of a single line of text, in logical pixels.
pub trait TextMeasure {
    fn measure(&mut self, text: &str, role: FontRole, size: f64) -> f64;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &mut T {
    fn measure(&mut self, text: &str, role: FontRole, size: f64) -> f64 {
        (**self).measure(text, role, size)
    }
}

/// Font-free width estimate: average advance per character, per role.
///
/// Deterministic, so layout decisions are reproducible on hosts without the reel's fonts.
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimateMeasure;

impl EstimateMeasure {
    pub fn advance_factor(role: FontRole) -> f64 {
        match role {
            FontRole::Display => 0.45,
            FontRole::Mono => 0.6,
            FontRole::Body => 0.52,
        }
    }
}

impl TextMeasure for EstimateMeasure {
    fn measure(&mut self, text: &str, role: FontRole, size: f64) -> f64 {
        text.chars().count() as f64 * size * Self::advance_factor(role)
    }
}

/// Cut `text` to at most `max` characters, appending `...` when anything was removed.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// First `max` characters of `text`, without an ellipsis.
pub fn take_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Greedy word wrap: a line breaks before the word that would push it past `max_width`.
///
/// Words are never split; a single word wider than `max_width` gets a line of its own.
pub fn wrap_words(
    measure: &mut dyn TextMeasure,
    text: &str,
    role: FontRole,
    size: f64,
    max_width: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure.measure(&candidate, role, size) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split an over-wide value into two lines.
///
/// Words fill the first line in order while it stays narrower than `max_width`; the first word
/// that does not fit and everything after it go to the second line. A first word wider than
/// `max_width` leaves the first line empty.
pub fn split_two_lines(
    measure: &mut dyn TextMeasure,
    text: &str,
    role: FontRole,
    size: f64,
    max_width: f64,
) -> (String, String) {
    let mut first = String::new();
    let mut rest: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        if rest.is_empty() {
            let candidate = if first.is_empty() {
                word.to_string()
            } else {
                format!("{first} {word}")
            };
            if measure.measure(&candidate, role, size) < max_width {
                first = candidate;
                continue;
            }
        }
        rest.push(word);
    }
    (first, rest.join(" "))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/text.rs"]
mod tests;
