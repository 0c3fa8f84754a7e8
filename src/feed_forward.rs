//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network).
//!
//! # Example
//!
//! Let's fit a tiny network to a single example:
//!
//! ```
//! # use backprop::*;
//! # use ndarray::{arr1, arr2};
//! let mut network = Network::new(
//!     vec![arr2(&[[0.1, 0.1], [0.1, 0.1]]), arr2(&[[0.1, 0.1]])],
//!     vec![arr1(&[0.1, 0.1]), arr1(&[0.1])],
//!     Activator::ReLU,
//!     Loss::MeanSquareError,
//!     0.1,
//! )
//! .unwrap();
//!
//! let x = arr1(&[1.0, 1.0]);
//! let y = arr1(&[0.0]);
//! let history = network.train(&x, &y, 200).unwrap();
//!
//! assert_eq!(history.len(), 200);
//! assert!(history[199] < history[0]);
//! ```

use crate::activator::Activator;
use crate::error::{Error, Result};
use crate::layer::{Layer, Update};
use crate::loss::Loss;
use crate::matrix::{check_len, same_bits, Mat, Vector};
use crate::topology::{Parameters, Topology};
use crate::utils::{Back, Front};

use itertools::multizip;
use tracing::{debug, instrument, trace};

/// The learning rate used when the caller has no preference.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// The values recorded by a forward pass.
#[derive(Clone, Debug)]
pub struct Activations {
    /// Pre-activation sums, one per layer transition.
    pub layer_inputs: Vec<Vector>,
    /// Activated values, starting with the network input.
    pub layer_outputs: Vec<Vector>,
}

/// One output neuron's prediction next to its target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Comparison {
    pub prediction: f64,
    pub target: f64,
    /// `|prediction - target|`
    pub difference: f64,
}

/// Whether a forward pass is waiting for its backward pass.
#[derive(Clone, Debug)]
enum Cache {
    Idle,
    AwaitingBackward(Activations),
}

/// A Feedforward neural network
///
/// The network exclusively owns its weights and biases; training updates them
/// in place, so clone the network first if the untrained values are needed
/// afterwards.
#[derive(Clone, Debug)]
pub struct Network {
    layers: Vec<Layer>,
    activator: Activator,
    loss: Loss,
    learning_rate: f64,
    cache: Cache,
}

impl Network {
    /// Creates a network from existing parameters.
    ///
    /// Arguments:
    ///  * `weights` - one matrix per layer transition, shaped
    ///                `(outputs, inputs)`.
    ///  * `biases` - one vector per layer transition, one bias per output.
    ///  * `activator` - the activation function used by every layer.
    ///  * `loss` - the loss function minimized by training.
    ///  * `learning_rate` - the gradient descent step size. It is not
    ///                      validated here.
    pub fn new(
        weights: Vec<Mat>,
        biases: Vec<Vector>,
        activator: Activator,
        loss: Loss,
        learning_rate: f64,
    ) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidTopology("no weight matrices".to_string()));
        }
        if biases.len() != weights.len() {
            return Err(Error::mismatch("bias vectors", weights.len(), biases.len()));
        }

        let mut layers: Vec<Layer> = Vec::with_capacity(weights.len());
        for (i, (w, b)) in weights.into_iter().zip(biases).enumerate() {
            if let Some(previous) = layers.last() {
                if w.ncols() != previous.output_len() {
                    return Err(Error::mismatch(
                        format!("columns of weights[{}]", i),
                        previous.output_len(),
                        w.ncols(),
                    ));
                }
            }
            layers.push(Layer::new(i, w, b)?);
        }

        let network = Network {
            layers,
            activator,
            loss,
            learning_rate,
            cache: Cache::Idle,
        };
        debug!(
            sizes = ?network.layer_sizes(),
            %activator,
            %loss,
            learning_rate,
            "built network"
        );
        Ok(network)
    }

    /// Creates a network, looking up the activation and loss functions by
    /// their registry names, e.g. `"ReLU"` and `"Mean Square Error"`.
    pub fn from_names(
        weights: Vec<Mat>,
        biases: Vec<Vector>,
        activation: &str,
        loss: &str,
        learning_rate: f64,
    ) -> Result<Self> {
        Network::new(weights, biases, activation.parse()?, loss.parse()?, learning_rate)
    }

    /// Creates a network for `topology` out of `params`, checking every shape
    /// against it.
    pub fn with_topology(
        topology: &Topology,
        params: &Parameters,
        activator: Activator,
        loss: Loss,
        learning_rate: f64,
    ) -> Result<Self> {
        params.check(topology)?;
        Network::new(
            params.weights.clone(),
            params.biases.clone(),
            activator,
            loss,
            learning_rate,
        )
    }

    /// Returns the size of the input layer to the network.
    pub fn input_len(&self) -> usize {
        self.layers.front().input_len()
    }

    /// Returns the size of the output layer from the network.
    pub fn output_len(&self) -> usize {
        self.layers.back().output_len()
    }

    /// Returns the width of every layer, input first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        sizes.push(self.input_len());
        sizes.extend(self.layers.iter().map(Layer::output_len));
        sizes
    }

    pub fn activator(&self) -> Activator {
        self.activator
    }

    pub fn loss_function(&self) -> Loss {
        self.loss
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// The weight matrices, one per layer transition.
    pub fn weights(&self) -> Vec<&Mat> {
        self.layers.iter().map(Layer::weights).collect()
    }

    /// The bias vectors, one per layer transition.
    pub fn biases(&self) -> Vec<&Vector> {
        self.layers.iter().map(Layer::biases).collect()
    }

    /// Consumes the network, returning its weights and biases.
    pub fn into_parameters(self) -> (Vec<Mat>, Vec<Vector>) {
        self.layers.into_iter().map(Layer::into_parts).unzip()
    }

    /// The values recorded by the last forward pass, if it has not been
    /// consumed by a backward pass yet.
    pub fn activations(&self) -> Option<&Activations> {
        match &self.cache {
            Cache::AwaitingBackward(activations) => Some(activations),
            Cache::Idle => None,
        }
    }

    /// The activated output of every layer from the last forward pass,
    /// starting with the input itself.
    pub fn layer_outputs(&self) -> Option<&[Vector]> {
        self.activations().map(|a| a.layer_outputs.as_slice())
    }

    /// Evaluates the configured loss of `pred` against `target`.
    pub fn loss(&self, pred: &Vector, target: &Vector) -> Result<f64> {
        self.loss.evaluate(pred, target)
    }

    /// Compares the prediction for `input` against `target`, output by
    /// output.
    pub fn compare(&self, input: &Vector, target: &Vector) -> Result<Vec<Comparison>> {
        check_len("target vector", target, self.output_len())?;
        let prediction = self.run(input)?;
        Ok(prediction
            .iter()
            .zip(target)
            .map(|(&prediction, &target)| Comparison {
                prediction,
                target,
                difference: (prediction - target).abs(),
            })
            .collect())
    }

    /// Feeds the provided `input` through the network, returning the output
    /// layer without touching the forward cache.
    pub fn run(&self, input: &Vector) -> Result<Vector> {
        let activations = self.feed_forward(input)?;
        Ok(activations.layer_outputs.back().clone())
    }

    /// Feeds the provided `input` through the network, returning the output
    /// layer.
    ///
    /// The recorded activations are kept for the next call to
    /// `backward_propagation`. On failure the cache is cleared and no
    /// parameter is modified.
    pub fn forward_propagation(&mut self, input: &Vector) -> Result<Vector> {
        self.cache = Cache::Idle;
        let activations = self.feed_forward(input)?;
        let prediction = activations.layer_outputs.back().clone();
        self.cache = Cache::AwaitingBackward(activations);
        Ok(prediction)
    }

    /// Computes the gradients of the loss of the last forward pass against
    /// `expected`, then applies one gradient descent step to every layer.
    ///
    /// `input` must be the input of the last forward pass. The gradients of
    /// all layers are computed before any of them is updated.
    pub fn backward_propagation(&mut self, input: &Vector, expected: &Vector) -> Result<()> {
        check_len("input vector", input, self.input_len())?;
        check_len("target vector", expected, self.output_len())?;
        let activations = match std::mem::replace(&mut self.cache, Cache::Idle) {
            Cache::AwaitingBackward(a) if same_bits(a.layer_outputs.front(), input) => a,
            _ => return Err(Error::InvalidState),
        };

        let updates = self.feed_backwards(&activations, expected)?;
        self.update(&updates);
        Ok(())
    }

    /// Runs `epochs` iterations of forward propagation, loss evaluation and
    /// backward propagation on the same example.
    ///
    /// Returns the loss of every epoch, measured before that epoch's update.
    #[instrument(level = "debug", skip(self, input, expected), err)]
    pub fn train(&mut self, input: &Vector, expected: &Vector, epochs: usize) -> Result<Vec<f64>> {
        let mut history = Vec::with_capacity(epochs);
        for _ in 0..epochs {
            history.push(self.step(input, expected)?);
        }
        Ok(history)
    }

    /// Runs a single training epoch, returning its loss.
    pub fn step(&mut self, input: &Vector, expected: &Vector) -> Result<f64> {
        let prediction = self.forward_propagation(input)?;
        let loss = self.loss(&prediction, expected)?;
        self.backward_propagation(input, expected)?;
        trace!(loss, "epoch");
        Ok(loss)
    }

    fn feed_forward(&self, input: &Vector) -> Result<Activations> {
        check_len("input vector", input, self.input_len())?;
        let mut layer_inputs = Vec::with_capacity(self.layers.len());
        let mut layer_outputs = Vec::with_capacity(self.layers.len() + 1);
        layer_outputs.push(input.clone());
        for layer in &self.layers {
            let (z, y) = layer.forward(self.activator, layer_outputs.back())?;
            layer_inputs.push(z);
            layer_outputs.push(y);
        }
        Ok(Activations {
            layer_inputs,
            layer_outputs,
        })
    }

    /// Feeds the provided `expected` value back through the network, returning
    /// the gradients of every layer.
    fn feed_backwards(&self, activations: &Activations, expected: &Vector) -> Result<Vec<Update>> {
        let Activations {
            layer_inputs,
            layer_outputs,
        } = activations;

        let mut delta = self.loss.gradient(layer_outputs.back(), expected)?
            * self.activator.derivative(layer_inputs.back());
        let mut updates = Vec::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate().rev() {
            let input_sums = if i > 0 { Some(&layer_inputs[i - 1]) } else { None };
            let (update, propagated) =
                layer.backward(self.activator, &delta, &layer_outputs[i], input_sums);
            updates.push(update);
            if let Some(propagated) = propagated {
                delta = propagated;
            }
        }
        updates.reverse();
        Ok(updates)
    }

    /// Applies weight updates to the network.
    fn update(&mut self, updates: &[Update]) {
        let rate = self.learning_rate;
        for (layer, update) in multizip((self.layers.iter_mut(), updates.iter())) {
            layer.apply_update(rate, update);
        }
    }
}
