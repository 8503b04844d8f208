//! Model-backed scoring
//!
//! [`MlpPredictor`] evaluates a small dense network exported as JSON, wrapped in
//! standard scaling on both the inputs and the output:
//!
//! - `model.json`: `{"feature_names": [...], "layers": [{"weights": [[..]], "biases": [..], "activation": "relu"}]}`
//!   with `weights` laid out as `out x in`
//! - `scaler_x.json`, `scaler_y.json`: `{"mean": [..], "scale": [..]}`

use super::{FeatureSet, clamp_score};
use crate::{ForecastError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A trained regressor over a pinned feature vector
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

#[derive(Clone)]
pub struct ModelScorer {
    feature_set: FeatureSet,
    predictor: Arc<dyn Predictor>,
}

impl ModelScorer {
    pub fn new(feature_set: FeatureSet, predictor: Arc<dyn Predictor>) -> Self {
        Self {
            feature_set,
            predictor,
        }
    }

    #[must_use]
    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    /// Score a feature vector already ordered per [`FeatureSet::order`]
    pub fn score(&self, features: &[f64]) -> Result<f64> {
        let raw = self.predictor.predict(features)?;
        if !raw.is_finite() {
            return Err(ForecastError::config(format!(
                "Model produced a non-finite prediction ({raw}) for {features:?}"
            )));
        }
        Ok(clamp_score(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Activation {
    Relu,
    Linear,
}

#[derive(Debug, Clone, Deserialize)]
struct DenseLayer {
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
    activation: Activation,
}

impl DenseLayer {
    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let z = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias;
                match self.activation {
                    Activation::Relu => z.max(0.0),
                    Activation::Linear => z,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ModelArtifact {
    feature_names: Vec<String>,
    layers: Vec<DenseLayer>,
}

#[derive(Debug, Clone, Deserialize)]
struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self, expected_len: usize, name: &str) -> Result<()> {
        if self.mean.len() != expected_len || self.scale.len() != expected_len {
            return Err(ForecastError::config(format!(
                "{name} has {} means and {} scales, expected {expected_len}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ForecastError::config(format!("{name} contains a zero scale")));
        }
        Ok(())
    }

    fn transform(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    fn inverse(&self, value: f64) -> f64 {
        value * self.scale[0] + self.mean[0]
    }
}

/// Dense network with standard-scaled input and output
#[derive(Debug, Clone)]
pub struct MlpPredictor {
    layers: Vec<DenseLayer>,
    scaler_x: StandardScaler,
    scaler_y: StandardScaler,
}

impl MlpPredictor {
    /// Load and validate the three artifacts against the pinned feature order.
    pub fn load(
        model_path: &Path,
        scaler_x_path: &Path,
        scaler_y_path: &Path,
        feature_set: FeatureSet,
    ) -> Result<Self> {
        let model: ModelArtifact = read_artifact(model_path)?;
        let scaler_x: StandardScaler = read_artifact(scaler_x_path)?;
        let scaler_y: StandardScaler = read_artifact(scaler_y_path)?;

        let expected = feature_set.order();
        if model.feature_names.iter().map(String::as_str).ne(expected.iter().copied()) {
            return Err(ForecastError::config(format!(
                "Model features {:?} do not match the {:?} order {:?}",
                model.feature_names, feature_set, expected
            )));
        }

        scaler_x.validate(expected.len(), "scaler_x")?;
        scaler_y.validate(1, "scaler_y")?;
        check_layer_shapes(&model.layers, expected.len())?;

        debug!(
            "Model has {} layers over {} features",
            model.layers.len(),
            expected.len()
        );

        Ok(Self {
            layers: model.layers,
            scaler_x,
            scaler_y,
        })
    }
}

impl Predictor for MlpPredictor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.scaler_x.mean.len() {
            return Err(ForecastError::validation(format!(
                "Expected {} features, got {}",
                self.scaler_x.mean.len(),
                features.len()
            )));
        }
        let mut activations = self.scaler_x.transform(features);
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        Ok(self.scaler_y.inverse(activations[0]))
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| {
        ForecastError::config(format!("Cannot read model artifact {}: {e}", path.display()))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        ForecastError::config(format!("Invalid model artifact {}: {e}", path.display()))
    })
}

/// Layers must chain from `inputs` down to a single output
fn check_layer_shapes(layers: &[DenseLayer], inputs: usize) -> Result<()> {
    if layers.is_empty() {
        return Err(ForecastError::config("Model has no layers"));
    }
    let mut width = inputs;
    for (index, layer) in layers.iter().enumerate() {
        if layer.weights.is_empty()
            || layer.weights.len() != layer.biases.len()
            || layer.weights.iter().any(|row| row.len() != width)
        {
            return Err(ForecastError::config(format!(
                "Layer {index} does not accept {width} inputs"
            )));
        }
        width = layer.weights.len();
    }
    if width != 1 {
        return Err(ForecastError::config(format!(
            "Model must produce one output, produces {width}"
        )));
    }
    Ok(())
}
