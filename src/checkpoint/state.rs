//! Serializable checkpoint state

use crate::error::{Error, Result};
use crate::model::ImageClassifier;
use serde::{Deserialize, Serialize};

/// Information about one stored parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name (e.g. "fc1.weight")
    pub name: String,
    /// Number of values
    pub len: usize,
    /// Whether the parameter tracks gradients
    pub requires_grad: bool,
}

/// On-disk checkpoint layout: parameter table plus flattened data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointState {
    /// Backbone name the snapshot was taken from
    pub model_name: String,
    /// Backbone version
    pub model_version: String,
    /// Parameter table, in model order
    pub parameters: Vec<ParameterInfo>,
    /// Concatenated parameter values, in table order
    pub data: Vec<f32>,
}

impl CheckpointState {
    /// Snapshot a model's full parameter set
    pub fn from_model(model: &ImageClassifier) -> Self {
        let mut data = Vec::new();
        let parameters: Vec<ParameterInfo> = model
            .named_parameters()
            .into_iter()
            .map(|(name, tensor)| {
                data.extend_from_slice(tensor.data().as_slice().unwrap());
                ParameterInfo {
                    name: name.to_string(),
                    len: tensor.len(),
                    requires_grad: tensor.requires_grad(),
                }
            })
            .collect();

        Self {
            model_name: model.name().to_string(),
            model_version: model.version().to_string(),
            parameters,
            data,
        }
    }

    /// Write the stored values into an existing model
    ///
    /// Validates every parameter against the target before the first write,
    /// so a mismatch never leaves the model half-loaded.
    pub fn apply_to(&self, model: &mut ImageClassifier) -> Result<()> {
        let mut expected_total = 0;
        for info in &self.parameters {
            let target = model.get_parameter_mut(&info.name).ok_or_else(|| {
                Error::ShapeMismatch {
                    name: info.name.clone(),
                    expected: 0,
                    found: info.len,
                }
            })?;
            if target.len() != info.len {
                return Err(Error::ShapeMismatch {
                    name: info.name.clone(),
                    expected: target.len(),
                    found: info.len,
                });
            }
            expected_total += info.len;
        }
        if expected_total != self.data.len() {
            return Err(Error::Serialization(format!(
                "checkpoint data length {} does not match parameter table total {}",
                self.data.len(),
                expected_total
            )));
        }

        let mut offset = 0;
        for info in &self.parameters {
            let values = &self.data[offset..offset + info.len];
            let target = model
                .get_parameter_mut(&info.name)
                .unwrap_or_else(|| unreachable!("validated above"));
            target
                .data_mut()
                .as_slice_mut()
                .unwrap()
                .copy_from_slice(values);
            offset += info.len;
        }

        Ok(())
    }
}
