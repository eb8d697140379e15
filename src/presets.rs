//! Fixed catalog of time controls and the selection handed back to the
//! screen that asked for it.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub time: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset { id: "1", name: "Blitz", time: "1 min" },
    Preset { id: "2", name: "Rapid", time: "10 min" },
    Preset { id: "3", name: "Classical", time: "30 min" },
    Preset { id: "4", name: "Custom 1", time: "5 min" },
    Preset { id: "5", name: "Custom 2", time: "15 min" },
];

impl Preset {
    pub fn seconds(&self) -> Result<u32> {
        parse_preset_label(self.time)
    }
}

/// `"10 min"` → `600`. Only the leading whitespace-separated token is read,
/// as whole minutes.
pub fn parse_preset_label(label: &str) -> Result<u32> {
    let token = label
        .split_whitespace()
        .next()
        .ok_or_else(|| anyhow!("empty preset label"))?;
    let minutes: u32 = token
        .parse()
        .with_context(|| format!("preset label {label:?} does not start with a number"))?;
    if minutes == 0 {
        bail!("preset label {label:?} has no time");
    }
    minutes
        .checked_mul(60)
        .ok_or_else(|| anyhow!("preset label {label:?} is too long"))
}

/// Which screen opened the preset list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PresetSource {
    Practice,
    Game,
}

impl Default for PresetSource {
    fn default() -> Self {
        PresetSource::Practice
    }
}

/// Navigation parameter passed back from the preset list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresetSelection {
    #[serde(default)]
    pub source: PresetSource,
    pub selected_time: String,
}

impl PresetSelection {
    pub fn new(source: PresetSource, preset: &Preset) -> Self {
        Self {
            source,
            selected_time: preset.time.to_string(),
        }
    }

    pub fn seconds(&self) -> Result<u32> {
        parse_preset_label(&self.selected_time)
    }
}
