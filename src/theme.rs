// 🎨 Themes - One set of panels, two palettes
//
// Light "corporate" and dark "cyberpunk" share every renderer; only the
// palette differs.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 24-bit colour, converted to the terminal backend's colour type by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Corporate,
    #[default]
    Cyberpunk,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Corporate => "corporate",
            Theme::Cyberpunk => "cyberpunk",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Corporate => Theme::Cyberpunk,
            Theme::Cyberpunk => Theme::Corporate,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Corporate => Palette {
                background: Rgb(249, 250, 251),
                panel: Rgb(255, 255, 255),
                border: Rgb(209, 213, 219),
                text: Rgb(17, 24, 39),
                muted: Rgb(107, 114, 128),
                primary: Rgb(2, 132, 199),
                accent: Rgb(124, 58, 237),
                success: Rgb(22, 163, 74),
                warning: Rgb(217, 119, 6),
                danger: Rgb(220, 38, 38),
            },
            Theme::Cyberpunk => Palette {
                background: Rgb(10, 10, 20),
                panel: Rgb(22, 22, 38),
                border: Rgb(55, 55, 90),
                text: Rgb(235, 235, 245),
                muted: Rgb(140, 140, 165),
                primary: Rgb(0, 229, 255),
                accent: Rgb(168, 85, 247),
                success: Rgb(16, 255, 160),
                warning: Rgb(251, 191, 36),
                danger: Rgb(248, 113, 113),
            },
        }
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "corporate" | "light" => Ok(Theme::Corporate),
            "cyberpunk" | "dark" => Ok(Theme::Cyberpunk),
            other => Err(ConfigError::InvalidTheme(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub panel: Rgb,
    pub border: Rgb,
    pub text: Rgb,
    pub muted: Rgb,
    pub primary: Rgb,
    pub accent: Rgb,
    pub success: Rgb,
    pub warning: Rgb,
    pub danger: Rgb,
}
