use crate::participant::STARTING_LIFE;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Duel-wide knobs. Every field has a default so a config file only needs
/// to mention what it changes.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(default)]
pub struct DuelConfig {
    pub starting_life: u32,
    /// Cards each side draws when the duel starts.
    pub opening_draw: usize,
    /// Skip the draw-phase draw on the very first turn of the duel.
    pub skip_first_turn_draw: bool,
    pub shuffle_on_start: bool,
    /// Fixes the shuffle order when present.
    pub seed: Option<u64>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        DuelConfig {
            starting_life: STARTING_LIFE,
            opening_draw: 1,
            skip_first_turn_draw: false,
            shuffle_on_start: true,
            seed: None,
        }
    }
}

impl DuelConfig {
    pub fn from_toml(source: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(toml::from_str(source)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let source = String::from_utf8(fs::read(path)?)?;
        Self::from_toml(&source)
    }
}
