use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::interpreter::MacroOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Delay after each typed fragment
    pub type_delay_ms: u64,
    /// Delay after the last action of a macro
    pub settle_delay_ms: u64,
    /// Stop a run at the first device channel failure
    pub abort_on_error: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            type_delay_ms: 400,
            settle_delay_ms: 800,
            abort_on_error: false,
        }
    }
}

impl Settings {
    /// Load from a JSON file, falling back to defaults if it is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn macro_options(&self) -> MacroOptions {
        MacroOptions {
            type_delay_ms: self.type_delay_ms,
            settle_delay_ms: self.settle_delay_ms,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing settings to {}", path.display()))
    }
}
