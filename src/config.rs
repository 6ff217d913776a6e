use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/stackcraft.toml";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StackcraftConfig {
    /// Item definitions (JSON array).
    pub items_path: PathBuf,
    /// Recipe definitions (JSON array).
    pub recipes_path: PathBuf,
    /// Block identifiers; a block's numeric id is its position in this list.
    pub blocks: Vec<String>,
    /// Seed for the damage roll when `--seed` is absent.
    pub seed: u64,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for StackcraftConfig {
    fn default() -> Self {
        Self {
            items_path: PathBuf::from("config/items.json"),
            recipes_path: PathBuf::from("config/recipes.json"),
            blocks: ["air", "stone", "dirt", "grass", "cobblestone", "obsidian"]
                .into_iter()
                .map(String::from)
                .collect(),
            seed: 0,
            log_filter: "warn".to_string(),
        }
    }
}

impl StackcraftConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<StackcraftConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    StackcraftConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                StackcraftConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
