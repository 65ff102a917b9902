//! Checkpoint store
//!
//! Saves and loads the model's full named parameter set as a single JSON
//! file under `saved_models/`. Saves overwrite; loads validate every
//! parameter name and length before writing anything into the model, so a
//! mismatched checkpoint is never partially applied.

mod state;

pub use state::{CheckpointState, ParameterInfo};

use crate::error::{Error, Result};
use crate::model::ImageClassifier;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed checkpoint directory, relative to the working directory
pub const CHECKPOINT_DIR: &str = "saved_models";

/// Path of a named checkpoint under the default directory
pub fn path(name: &str) -> PathBuf {
    Path::new(CHECKPOINT_DIR).join(name)
}

/// Whether a named checkpoint exists under the default directory
pub fn exists(name: &str) -> bool {
    path(name).exists()
}

/// Save the model's parameters under `name`, creating the directory if absent
pub fn save(model: &ImageClassifier, name: &str) -> Result<()> {
    save_in(model, name, Path::new(CHECKPOINT_DIR))
}

/// Save under an explicit directory (test seam)
pub fn save_in(model: &ImageClassifier, name: &str, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    save_to_path(model, &dir.join(name))
}

/// Serialize the model's parameter set to an exact path
pub fn save_to_path(model: &ImageClassifier, path: &Path) -> Result<()> {
    let state = CheckpointState::from_model(model);
    let data = serde_json::to_string(&state)
        .map_err(|e| Error::Serialization(format!("checkpoint serialization failed: {e}")))?;
    fs::write(path, data)?;
    Ok(())
}

/// Load parameters from the named checkpoint into an existing model
pub fn load(model: &mut ImageClassifier, name: &str) -> Result<()> {
    load_in(model, name, Path::new(CHECKPOINT_DIR))
}

/// Load from an explicit directory (test seam)
pub fn load_in(model: &mut ImageClassifier, name: &str, dir: &Path) -> Result<()> {
    load_from_path(model, &dir.join(name))
}

/// Deserialize a checkpoint file into an existing model of matching architecture
pub fn load_from_path(model: &mut ImageClassifier, path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::CheckpointNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let state: CheckpointState = serde_json::from_str(&content)
        .map_err(|e| Error::Serialization(format!("checkpoint deserialization failed: {e}")))?;

    state.apply_to(model)
}
