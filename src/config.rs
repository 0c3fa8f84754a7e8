//! Training session files.
//!
//! A session describes one network, its single example and how to train it,
//! written in [RON](https://github.com/ron-rs/ron):
//!
//! ```text
//! (
//!     layers: [2, 2, 1],
//!     activation: "Sigmoid",
//!     loss: "Cross Entropy",
//!     learning_rate: 0.5,
//!     epochs: 500,
//!     target: [1.0],
//!     seed: Some(7),
//! )
//! ```
//!
//! When `parameters` is omitted they are randomized.

use crate::activator::Activator;
use crate::error::{Error, Result};
use crate::feed_forward::{Network, DEFAULT_LEARNING_RATE};
use crate::loss::Loss;
use crate::matrix::Vector;
use crate::topology::{Parameters, Topology};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

fn default_activation() -> String {
    Activator::ReLU.name().to_string()
}

fn default_loss() -> String {
    Loss::MeanSquareError.name().to_string()
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

fn default_epochs() -> usize {
    100
}

/// A single training session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    /// The width of every layer, input first.
    pub layers: Vec<usize>,
    /// Registry name of the activation function.
    #[serde(default = "default_activation")]
    pub activation: String,
    /// Registry name of the loss function.
    #[serde(default = "default_loss")]
    pub loss: String,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// The desired output for the session's input.
    pub target: Vec<f64>,
    #[serde(default)]
    pub parameters: Option<Parameters>,
    /// Seeds parameter randomization.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// A network ready to be trained along with its example.
#[derive(Debug)]
pub struct Prepared {
    pub network: Network,
    pub input: Vector,
    pub target: Vector,
    pub parameters: Parameters,
}

impl Session {
    /// Parses a session from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn topology(&self) -> Result<Topology> {
        Topology::new(self.layers.clone())
    }

    /// Checks every setting that can be checked without building the
    /// network.
    pub fn validate(&self) -> Result<Topology> {
        let topology = self.topology()?;
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive, found {}",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be positive".to_string()));
        }
        if self.target.len() != topology.output_len() {
            return Err(Error::mismatch(
                "target vector",
                topology.output_len(),
                self.target.len(),
            ));
        }
        if let Some(params) = &self.parameters {
            params.check(&topology)?;
        }
        Ok(topology)
    }

    /// Resolves the session's parameters, randomizing them when none are
    /// given.
    pub fn parameters(&self, topology: &Topology) -> Result<Parameters> {
        match &self.parameters {
            Some(params) => Ok(params.clone()),
            None => {
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                debug!(seed = ?self.seed, "randomizing parameters");
                Parameters::random(topology, &mut rng)
            }
        }
    }

    /// Validates the session and builds its network.
    pub fn prepare(&self) -> Result<Prepared> {
        let topology = self.validate()?;
        let activator: Activator = self.activation.parse()?;
        let loss: Loss = self.loss.parse()?;
        let parameters = self.parameters(&topology)?;
        let network =
            Network::with_topology(&topology, &parameters, activator, loss, self.learning_rate)?;
        Ok(Prepared {
            network,
            input: parameters.inputs.clone(),
            target: Vector::from(self.target.clone()),
            parameters,
        })
    }
}
