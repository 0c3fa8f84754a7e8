//! Layer size sequences and the parameters that fit them.

use crate::error::{Error, Result};
use crate::matrix::{self, check_len, Mat, Vector};

use rand::Rng;
use rand_distr::{Normal, Uniform};
use std::convert::TryFrom;

/// The widths of every layer, input first and output last.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    sizes: Vec<usize>,
}

impl Topology {
    /// Validates a layer size sequence.
    ///
    /// There must be at least an input and an output layer, and no layer may
    /// be empty.
    pub fn new(sizes: Vec<usize>) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::InvalidTopology(format!(
                "expected at least 2 layers, found {}",
                sizes.len()
            )));
        }
        if let Some(i) = sizes.iter().position(|&n| n == 0) {
            return Err(Error::InvalidTopology(format!("layer {} is empty", i)));
        }
        Ok(Topology { sizes })
    }

    /// Builds a topology from an input width, any number of hidden layer
    /// widths and an output width.
    pub fn from_parts(inputs: usize, hidden: &[usize], outputs: usize) -> Result<Self> {
        let mut sizes = Vec::with_capacity(hidden.len() + 2);
        sizes.push(inputs);
        sizes.extend_from_slice(hidden);
        sizes.push(outputs);
        Topology::new(sizes)
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn input_len(&self) -> usize {
        self.sizes[0]
    }

    pub fn output_len(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    /// Number of weight matrices, one per layer transition.
    pub fn depth(&self) -> usize {
        self.sizes.len() - 1
    }

    /// Iterates `(inputs, outputs)` for every layer transition.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.sizes.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Everything needed to run a network on its single example: the input
/// vector plus one weight matrix and bias vector per layer transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterTable", into = "ParameterTable")]
pub struct Parameters {
    pub inputs: Vector,
    pub weights: Vec<Mat>,
    pub biases: Vec<Vector>,
}

impl Parameters {
    /// All inputs, weights and biases set to zero.
    pub fn zeros(topology: &Topology) -> Self {
        Parameters {
            inputs: Vector::zeros(topology.input_len()),
            weights: topology
                .transitions()
                .map(|(n_in, n_out)| Mat::zeros((n_out, n_in)))
                .collect(),
            biases: topology
                .transitions()
                .map(|(_, n_out)| Vector::zeros(n_out))
                .collect(),
        }
    }

    /// Randomized parameters.
    ///
    /// Inputs are drawn from `U(-1, 1)` and biases from `U(0, 0.1)`. Weights
    /// of a transition from `n_in` to `n_out` neurons are drawn from
    /// `N(0, sqrt(2 / (n_in + n_out)))`.
    pub fn random<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> Result<Self> {
        let inputs = matrix::random_vector(Uniform::new(-1.0, 1.0), topology.input_len(), rng);
        let mut weights = Vec::with_capacity(topology.depth());
        let mut biases = Vec::with_capacity(topology.depth());
        for (n_in, n_out) in topology.transitions() {
            let scale = (2.0 / (n_in + n_out) as f64).sqrt();
            weights.push(matrix::random(Normal::new(0.0, scale)?, n_out, n_in, rng));
            biases.push(matrix::random_vector(Uniform::new(0.0, 0.1), n_out, rng));
        }
        Ok(Parameters {
            inputs,
            weights,
            biases,
        })
    }

    /// Verifies that every array has the shape `topology` calls for.
    pub fn check(&self, topology: &Topology) -> Result<()> {
        check_len("input vector", &self.inputs, topology.input_len())?;
        if self.weights.len() != topology.depth() {
            return Err(Error::mismatch(
                "weight matrices",
                topology.depth(),
                self.weights.len(),
            ));
        }
        if self.biases.len() != topology.depth() {
            return Err(Error::mismatch(
                "bias vectors",
                topology.depth(),
                self.biases.len(),
            ));
        }
        for (i, ((n_in, n_out), (w, b))) in topology
            .transitions()
            .zip(self.weights.iter().zip(&self.biases))
            .enumerate()
        {
            if w.nrows() != n_out {
                return Err(Error::mismatch(format!("rows of weights[{}]", i), n_out, w.nrows()));
            }
            if w.ncols() != n_in {
                return Err(Error::mismatch(format!("columns of weights[{}]", i), n_in, w.ncols()));
            }
            check_len(&format!("biases[{}]", i), b, n_out)?;
        }
        Ok(())
    }
}

/// The serialized form of `Parameters`: plain nested lists, weights row by
/// row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterTable {
    pub inputs: Vec<f64>,
    pub weights: Vec<Vec<Vec<f64>>>,
    pub biases: Vec<Vec<f64>>,
}

impl TryFrom<ParameterTable> for Parameters {
    type Error = Error;

    fn try_from(table: ParameterTable) -> Result<Self> {
        Ok(Parameters {
            inputs: Vector::from(table.inputs),
            weights: table
                .weights
                .iter()
                .map(|rows| matrix::from_rows(rows))
                .collect::<Result<_>>()?,
            biases: table.biases.into_iter().map(Vector::from).collect(),
        })
    }
}

impl From<Parameters> for ParameterTable {
    fn from(params: Parameters) -> Self {
        ParameterTable {
            inputs: params.inputs.to_vec(),
            weights: params.weights.iter().map(matrix::to_rows).collect(),
            biases: params.biases.iter().map(|b| b.to_vec()).collect(),
        }
    }
}
