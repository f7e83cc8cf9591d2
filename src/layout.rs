//! Printable-page geometry. All distances are points; the y axis grows
//! downward from the top-left corner, matching the renderer's placement
//! instructions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

// Embedded so a fresh data directory renders out of the box; a copy is
// written next to the data so users can adjust offsets and branding.
const DEFAULT_LAYOUT: &str = include_str!("../layout.toml");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Name printed in the title block.
    pub issuer_name: String,
    pub page_width: f64,
    pub page_height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub title_size: f64,
    pub body_size: f64,
    /// Vertical step between successive text lines and item rows.
    pub line_height: f64,
    /// Fixed y offset of the item table's header row.
    pub table_top: f64,
    /// Gap between the last item row and the totals block.
    pub totals_gap: f64,
    pub col_description: f64,
    pub col_quantity: f64,
    pub col_price: f64,
    pub col_total: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        // US letter, matching the embedded layout.toml.
        Self {
            issuer_name: "Company Name".to_string(),
            page_width: 612.0,
            page_height: 792.0,
            margin_left: 40.0,
            margin_top: 40.0,
            margin_bottom: 40.0,
            title_size: 20.0,
            body_size: 11.0,
            line_height: 18.0,
            table_top: 220.0,
            totals_gap: 36.0,
            col_description: 40.0,
            col_quantity: 330.0,
            col_price: 410.0,
            col_total: 500.0,
        }
    }
}

impl LayoutConfig {
    /// Read `layout.toml` from the data root, seeding it with the
    /// embedded default on first run.
    pub fn load_or_init(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join("layout.toml");
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
        } else {
            fs::write(&path, DEFAULT_LAYOUT).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(Self::default())
        }
    }
}
