use std::path::{Path, PathBuf};

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::background::FieldRng;
use crate::simulation::{FieldParams, ParticleField};

pub const PRESETS_FILE: &str = "presets.json";

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldPreset {
    pub name: String,
    #[serde(default)]
    pub params: FieldParams,
    /// Fixed seed for a reproducible pool. Entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for FieldPreset {
    fn default() -> Self {
        Self {
            name: "Default".into(),
            params: FieldParams::default(),
            seed: None,
        }
    }
}

/// Where presets are read from at startup.
#[derive(Resource, Clone, Debug)]
pub struct PresetSource {
    pub path: PathBuf,
}

impl Default for PresetSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from(PRESETS_FILE),
        }
    }
}

#[derive(Resource, Default)]
pub struct PresetManager {
    pub presets: Vec<FieldPreset>,
    pub current: usize,
}

impl PresetManager {
    pub fn current_preset(&self) -> Option<&FieldPreset> {
        self.presets.get(self.current)
    }

    pub fn next(&mut self) {
        if !self.presets.is_empty() {
            self.current = (self.current + 1) % self.presets.len();
        }
    }

    pub fn select(&mut self, index: usize) -> Option<&FieldPreset> {
        if index < self.presets.len() {
            self.current = index;
        }
        self.current_preset()
    }
}

pub fn load_presets(path: &Path) -> Result<Vec<FieldPreset>, PresetError> {
    let data = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| PresetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the params, reseed when the preset pins a seed, and rebuild the
/// pool if one is live.
pub fn apply_preset(
    preset: &FieldPreset,
    params: &mut FieldParams,
    rng: &mut FieldRng,
    field: Option<&mut ParticleField>,
) {
    *params = preset.params.clone();
    if let Some(seed) = preset.seed {
        rng.0 = StdRng::seed_from_u64(seed);
    }
    if let Some(field) = field {
        field.reinitialize(params, &mut rng.0);
    }
    info!("Applied preset '{}' ({} particles)", preset.name, params.particle_count);
}

// Load presets file and apply the first one
pub fn load_presets_system(
    source: Res<PresetSource>,
    mut manager: ResMut<PresetManager>,
    mut params: ResMut<FieldParams>,
    mut rng: ResMut<FieldRng>,
) {
    if manager.presets.is_empty() {
        manager.presets = match load_presets(&source.path) {
            Ok(presets) if !presets.is_empty() => {
                info!("Loaded {} presets from {}", presets.len(), source.path.display());
                presets
            }
            Ok(_) => {
                warn!("{} has no presets, using defaults", source.path.display());
                vec![FieldPreset::default()]
            }
            Err(PresetError::Io { .. }) => {
                debug!("No preset file at {}, using defaults", source.path.display());
                vec![FieldPreset::default()]
            }
            Err(err) => {
                warn!("{err}; using defaults");
                vec![FieldPreset::default()]
            }
        };
        manager.current = 0;
    }

    if let Some(preset) = manager.current_preset() {
        apply_preset(preset, &mut params, &mut rng, None);
    }
}
