//! Application settings model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Built-in color themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Dark theme
    #[default]
    Dark,
    /// Light theme
    Light,
    /// Warm paper-like theme
    Journaling,
}

impl ThemeName {
    /// Every selectable theme, in display order
    pub const ALL: [Self; 3] = [Self::Dark, Self::Light, Self::Journaling];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Journaling => "journaling",
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("unknown theme '{}'", s.trim())))
    }
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Selected theme
    #[serde(default, deserialize_with = "theme_or_default")]
    pub theme: ThemeName,
}

impl Settings {
    /// Parse settings JSON, falling back to defaults for unknown values
    pub fn from_json(payload: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

fn theme_or_default<'de, D>(deserializer: D) -> Result<ThemeName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| value.parse().ok())
        .unwrap_or_default())
}
