//! Command-line settings merged with the optional rules file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use grid_conquest_core::{is_valid_grid_size, SeededChance, MAX_GRID_SIZE, MIN_GRID_SIZE};
use grid_conquest_world::RulesConfig;
use serde::Deserialize;

/// Save directory used when neither a flag nor the rules file names one.
pub(crate) const DEFAULT_SAVE_DIR: &str = ".grid-conquest";

/// Contents of a rules file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    seed: Option<u64>,
    save_dir: Option<PathBuf>,
    rules: RulesConfig,
}

/// Values given on the command line, which win over the rules file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    /// Board side length.
    pub(crate) size: Option<u32>,
    /// Randomness seed.
    pub(crate) seed: Option<u64>,
    /// Save directory.
    pub(crate) save_dir: Option<PathBuf>,
}

/// Fully resolved settings of a run.
#[derive(Debug)]
pub(crate) struct Settings {
    /// Rules every new match is played with.
    pub(crate) rules: RulesConfig,
    /// Randomness seed; entropy when absent.
    pub(crate) seed: Option<u64>,
    /// Directory holding the save slot.
    pub(crate) save_dir: PathBuf,
}

impl Settings {
    /// Reads the rules file at `path`, if any, and applies `overrides`.
    pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let file = match path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read rules file {}", path.display()))?;
                parse(&contents)
                    .with_context(|| format!("failed to parse rules file {}", path.display()))?
            }
            None => FileConfig::default(),
        };
        resolve(file, overrides)
    }

    /// Randomness source for the run.
    pub(crate) fn chance(&self) -> SeededChance {
        match self.seed {
            Some(seed) => SeededChance::from_seed(seed),
            None => SeededChance::from_entropy(),
        }
    }
}

fn parse(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("rules file is not valid toml")
}

fn resolve(file: FileConfig, overrides: Overrides) -> Result<Settings> {
    let mut rules = file.rules;
    if let Some(size) = overrides.size {
        rules.map.size = size;
    }
    if !is_valid_grid_size(rules.map.size) {
        bail!(
            "grid size {} is outside {MIN_GRID_SIZE}..={MAX_GRID_SIZE}",
            rules.map.size
        );
    }

    Ok(Settings {
        rules,
        seed: overrides.seed.or(file.seed),
        save_dir: overrides
            .save_dir
            .or(file.save_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_DIR)),
    })
}
