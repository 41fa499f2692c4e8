//! Fixed-weight feed-forward network agent.
//!
//! Weights come from outside (a search process, a file, a test); this module
//! only evaluates them. Every layer uses `tanh`, so the single output lies in
//! `[-1, 1]` and the +/-0.5 action threshold splits it into thirds.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Agent, Observation};
use crate::error::NetworkError;

/// Number of observation inputs
pub const INPUTS: usize = 3;

/// One dense layer; `weights` is row-major `[output][input]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
}

impl Layer {
    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .chunks_exact(self.inputs)
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                (sum + bias).tanh()
            })
            .collect()
    }
}

/// Dense tanh network from the 3 observation inputs to 1 output
///
/// Deserializing goes through [`FeedForwardNet::new`], so a loaded network
/// has passed the same shape checks as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNet")]
pub struct FeedForwardNet {
    layers: Vec<Layer>,
}

/// Unchecked wire form of [`FeedForwardNet`]
#[derive(Deserialize)]
struct RawNet {
    layers: Vec<Layer>,
}

impl TryFrom<RawNet> for FeedForwardNet {
    type Error = NetworkError;

    fn try_from(raw: RawNet) -> Result<Self, Self::Error> {
        Self::new(raw.layers)
    }
}

impl FeedForwardNet {
    /// Check that consecutive layers chain from 3 inputs to 1 output.
    pub fn new(layers: Vec<Layer>) -> Result<Self, NetworkError> {
        if layers.is_empty() {
            return Err(NetworkError::Empty);
        }

        let mut fan_in = INPUTS;
        for (i, layer) in layers.iter().enumerate() {
            if layer.outputs == 0 {
                return Err(NetworkError::ShapeMismatch {
                    layer: i,
                    expected: 1,
                    found: 0,
                });
            }
            if layer.inputs != fan_in {
                return Err(NetworkError::ShapeMismatch {
                    layer: i,
                    expected: fan_in,
                    found: layer.inputs,
                });
            }
            if layer.weights.len() != layer.inputs * layer.outputs {
                return Err(NetworkError::ShapeMismatch {
                    layer: i,
                    expected: layer.inputs * layer.outputs,
                    found: layer.weights.len(),
                });
            }
            if layer.biases.len() != layer.outputs {
                return Err(NetworkError::ShapeMismatch {
                    layer: i,
                    expected: layer.outputs,
                    found: layer.biases.len(),
                });
            }
            fan_in = layer.outputs;
        }

        if fan_in != 1 {
            return Err(NetworkError::ShapeMismatch {
                layer: layers.len() - 1,
                expected: 1,
                found: fan_in,
            });
        }
        Ok(Self { layers })
    }

    /// Build from hidden layer sizes and a flat parameter vector
    /// (per layer: weights, then biases).
    pub fn from_params(hidden: &[usize], params: &[f64]) -> Result<Self, NetworkError> {
        let expected = param_count(hidden);
        if params.len() != expected {
            return Err(NetworkError::ShapeMismatch {
                layer: 0,
                expected,
                found: params.len(),
            });
        }

        Self::new(build_layers(hidden, params))
    }

    /// Random parameters drawn uniformly from `[-1, 1]`
    pub fn random<R: Rng + ?Sized>(hidden: &[usize], rng: &mut R) -> Result<Self, NetworkError> {
        let params: Vec<f64> = (0..param_count(hidden))
            .map(|_| rng.random_range(-1.0..=1.0))
            .collect();
        Self::new(build_layers(hidden, &params))
    }

    pub fn forward(&self, inputs: &[f64; INPUTS]) -> f64 {
        let mut activations = inputs.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        activations[0]
    }

    pub fn params(&self) -> Vec<f64> {
        self.layers
            .iter()
            .flat_map(|l| l.weights.iter().chain(&l.biases).copied())
            .collect()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

impl Agent for FeedForwardNet {
    fn activate(&self, obs: &Observation) -> f64 {
        self.forward(&obs.as_inputs())
    }

    fn name(&self) -> &str {
        "network"
    }
}

/// Split a flat parameter vector into layers; `params` must hold exactly
/// `param_count(hidden)` values.
fn build_layers(hidden: &[usize], params: &[f64]) -> Vec<Layer> {
    let sizes = layer_sizes(hidden);
    let mut rest = params;
    let mut layers = Vec::with_capacity(sizes.len() - 1);
    for pair in sizes.windows(2) {
        let (inputs, outputs) = (pair[0], pair[1]);
        let (weights, tail) = rest.split_at(inputs * outputs);
        let (biases, tail) = tail.split_at(outputs);
        layers.push(Layer {
            inputs,
            outputs,
            weights: weights.to_vec(),
            biases: biases.to_vec(),
        });
        rest = tail;
    }
    layers
}

fn layer_sizes(hidden: &[usize]) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(hidden.len() + 2);
    sizes.push(INPUTS);
    sizes.extend_from_slice(hidden);
    sizes.push(1);
    sizes
}

/// Parameters needed for the given hidden sizes
pub fn param_count(hidden: &[usize]) -> usize {
    layer_sizes(hidden)
        .windows(2)
        .map(|pair| pair[0] * pair[1] + pair[1])
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Action;
    use crate::sim::RngState;

    #[test]
    fn test_param_count() {
        assert_eq!(param_count(&[]), 4);
        assert_eq!(param_count(&[4]), 3 * 4 + 4 + 4 + 1);
    }

    #[test]
    fn test_single_layer_output() {
        // 0.01 * ball_y - 0.01 * paddle_y = -2
        let net = FeedForwardNet::from_params(&[], &[0.0, 0.01, -0.01, 0.0]).unwrap();
        let obs = Observation {
            ball_x: 500.0,
            ball_y: 100.0,
            paddle_y: 300.0,
        };
        let out = net.activate(&obs);
        assert!((out - (-2.0f64).tanh()).abs() < 1e-12);
        assert_eq!(net.act(&obs), Action::MoveDown);
    }

    #[test]
    fn test_shape_errors() {
        assert_eq!(FeedForwardNet::new(Vec::new()), Err(NetworkError::Empty));

        let bad = Layer {
            inputs: 2,
            outputs: 1,
            weights: vec![0.0; 2],
            biases: vec![0.0],
        };
        assert_eq!(
            FeedForwardNet::new(vec![bad]),
            Err(NetworkError::ShapeMismatch {
                layer: 0,
                expected: 3,
                found: 2
            })
        );

        assert!(FeedForwardNet::from_params(&[2], &[0.0; 3]).is_err());

        let mut rng = RngState::new(1).to_rng();
        assert!(matches!(
            FeedForwardNet::random(&[0], &mut rng),
            Err(NetworkError::ShapeMismatch { layer: 0, found: 0, .. })
        ));
    }

    #[test]
    fn test_params_roundtrip_through_flat_vector() {
        let mut rng = RngState::new(11).to_rng();
        let net = FeedForwardNet::random(&[5, 3], &mut rng).unwrap();
        let rebuilt = FeedForwardNet::from_params(&[5, 3], &net.params()).unwrap();
        assert_eq!(net, rebuilt);
        assert!(net.params().iter().all(|p| (-1.0..=1.0).contains(p)));

        let sizes: Vec<(usize, usize)> = net
            .layers()
            .iter()
            .map(|l| (l.inputs, l.outputs))
            .collect();
        assert_eq!(sizes, [(3, 5), (5, 3), (3, 1)]);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut rng = RngState::new(12).to_rng();
        let net = FeedForwardNet::random(&[2], &mut rng).unwrap();
        let json = serde_json::to_string(&net).unwrap();
        let back: FeedForwardNet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, net);
    }

    #[test]
    fn test_deserialize_rejects_bad_shapes() {
        let no_output = r#"{"layers":[{"inputs":3,"outputs":0,"weights":[],"biases":[]}]}"#;
        let err = serde_json::from_str::<FeedForwardNet>(no_output).unwrap_err();
        assert!(err.to_string().contains("layer 0"));

        let no_inputs = r#"{"layers":[{"inputs":0,"outputs":1,"weights":[],"biases":[0.0]}]}"#;
        assert!(serde_json::from_str::<FeedForwardNet>(no_inputs).is_err());

        assert!(serde_json::from_str::<FeedForwardNet>(r#"{"layers":[]}"#).is_err());
    }
}
