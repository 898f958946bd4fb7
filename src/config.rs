use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// An RGB colour with components in `0.0..=1.0`.
pub type Rgb = [f32; 3];

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub code: CodeConfig,
    pub links: LinksConfig,
    pub bullets: BulletsConfig,
    pub rule: RuleConfig,
    pub table: TableConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound on edits sent in one batch update call.
    pub max_edits_per_call: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_edits_per_call: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub font_family: String,
    pub inline_size: f32,
    pub block_size: f32,
    pub foreground: Rgb,
    pub background: Rgb,
    /// Space above and below a code block, in points.
    pub spacing: f32,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            font_family: "Roboto Mono".to_string(),
            inline_size: 9.0,
            block_size: 8.0,
            foreground: [0.2, 0.2, 0.2],
            background: [0.95, 0.95, 0.95],
            spacing: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub color: Rgb,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            color: [0.06, 0.46, 0.88],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BulletsConfig {
    pub preset: String,
    /// Extra indentation per nesting level, in points.
    pub indent_per_level: f32,
}

impl Default for BulletsConfig {
    fn default() -> Self {
        Self {
            preset: "BULLET_DISC_CIRCLE_SQUARE".to_string(),
            indent_per_level: 36.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Glyphs standing in for a horizontal rule.
    pub text: String,
    pub color: Rgb,
    pub size: f32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            text: "─".repeat(40),
            color: [0.7, 0.7, 0.7],
            size: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub font_size: f32,
    pub code_size: f32,
    pub header_background: Rgb,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            font_size: 9.0,
            code_size: 8.0,
            header_background: [0.85, 0.85, 0.92],
        }
    }
}

impl Config {
    /// Load config from a TOML file, or return defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
