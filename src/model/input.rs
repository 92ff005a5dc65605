use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::foundation::error::{ReelError, ReelResult};

/// Read-only payload driving one reel.
///
/// Every field is optional and `null` is accepted wherever a value is; the compositor substitutes
/// fallbacks for anything missing. A reel never mutates its input: playback code shares it behind
/// an `Arc` and builds a fresh player per pass.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReelInput {
    pub user_name: Option<String>,
    pub tagline: Option<String>,
    /// Display order, not necessarily calendar order.
    #[serde(deserialize_with = "null_as_default")]
    pub months: Vec<MonthEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub stats: Vec<StatEntry>,
    pub final_verdict: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthEntry {
    pub name: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
    pub icon_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatEntry {
    pub label: Option<String>,
    pub value: Option<StatValue>,
}

/// A stat value as produced upstream: numeric or pre-formatted text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl StatValue {
    /// Display form. Text is returned verbatim, integral numbers drop the fractional part.
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Other(v) => v.to_string(),
        }
    }
}

impl StatEntry {
    pub fn display_value(&self) -> String {
        self.value
            .as_ref()
            .map(StatValue::display)
            .unwrap_or_else(|| "0".to_string())
    }
}

impl ReelInput {
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s).map_err(|e| ReelError::serde(format!("invalid reel input: {e}")))
    }

    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReelError::validation(format!("failed to read reel input '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "../../tests/unit/model/input.rs"]
mod tests;
