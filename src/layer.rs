use crate::activator::Activator;
use crate::error::{Error, Result};
use crate::matrix::{check_len, outer, Mat, Vector};

/// A wrapper for a single fully connected transition of the neural network
///
/// This performs efficient network updates by storing the weights for every
/// neuron as a single Matrix.
#[derive(Clone, Debug)]
pub struct Layer {
    /// The network weights, with each neuron's weights stored as a row.
    weights: Mat,
    /// One bias per destination neuron.
    biases: Vector,
}

/// The gradients of a single layer, computed by `Layer::backward`.
#[derive(Debug)]
pub struct Update {
    weight_delta: Mat,
    bias_delta: Vector,
}

impl Layer {
    /// Wraps an existing weight matrix and bias vector.
    ///
    /// Fails if the bias vector does not have one element per row, or if
    /// either dimension of the weights is zero.
    pub fn new(index: usize, weights: Mat, biases: Vector) -> Result<Self> {
        if weights.nrows() == 0 || weights.ncols() == 0 {
            return Err(Error::InvalidTopology(format!(
                "weights[{}] has shape {:?}",
                index,
                weights.dim()
            )));
        }
        check_len(&format!("biases[{}]", index), &biases, weights.nrows())?;
        Ok(Layer { weights, biases })
    }

    /// Returns the number of inputs to this layer.
    pub fn input_len(&self) -> usize {
        self.weights.ncols()
    }

    /// Returns the number of outputs from this layer.
    pub fn output_len(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> &Mat {
        &self.weights
    }

    pub fn biases(&self) -> &Vector {
        &self.biases
    }

    pub fn into_parts(self) -> (Mat, Vector) {
        (self.weights, self.biases)
    }

    /// Feeds the provided `inputs` forward through the layer.
    ///
    /// Returns the pre-activation sums and the activated outputs.
    pub fn forward(&self, activator: Activator, inputs: &Vector) -> Result<(Vector, Vector)> {
        check_len("layer input", inputs, self.input_len())?;
        let z = self.weights.dot(inputs) + &self.biases;
        let y = activator.apply(&z);
        Ok((z, y))
    }

    /// Computes the gradients of this layer from its error term `delta`.
    ///
    /// `inputs` are the activated outputs of the previous layer. When
    /// `input_sums` holds the previous layer's pre-activation sums, the error
    /// term of that layer is returned as well.
    pub fn backward(
        &self,
        activator: Activator,
        delta: &Vector,
        inputs: &Vector,
        input_sums: Option<&Vector>,
    ) -> (Update, Option<Vector>) {
        let propagated =
            input_sums.map(|z| self.weights.t().dot(delta) * activator.derivative(z));
        let update = Update {
            weight_delta: outer(delta, inputs),
            bias_delta: delta.clone(),
        };
        (update, propagated)
    }

    /// Applies the provided `update`, scaling by the gradient descent `rate`.
    pub fn apply_update(&mut self, rate: f64, update: &Update) {
        self.weights.scaled_add(-rate, &update.weight_delta);
        self.biases.scaled_add(-rate, &update.bias_delta);
    }
}

#[cfg(test)]
impl Update {
    pub fn weight_delta(&self) -> &Mat {
        &self.weight_delta
    }

    pub fn bias_delta(&self) -> &Vector {
        &self.bias_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn forward_adds_bias_after_product() {
        let layer = Layer::new(0, arr2(&[[1.0, 2.0], [-1.0, 0.5]]), arr1(&[0.5, 0.0])).unwrap();
        let (z, y) = layer.forward(Activator::ReLU, &arr1(&[1.0, 1.0])).unwrap();
        assert_eq!(z, arr1(&[3.5, -0.5]));
        assert_eq!(y, arr1(&[3.5, 0.0]));
    }

    #[test]
    fn forward_rejects_wrong_input_width() {
        let layer = Layer::new(0, arr2(&[[1.0, 2.0]]), arr1(&[0.0])).unwrap();
        assert!(matches!(
            layer.forward(Activator::ReLU, &arr1(&[1.0, 2.0, 3.0])),
            Err(Error::DimensionMismatch { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn bias_length_must_match_rows() {
        assert!(matches!(
            Layer::new(1, arr2(&[[1.0], [2.0]]), arr1(&[0.0])),
            Err(Error::DimensionMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn update_moves_against_gradient() {
        let mut layer = Layer::new(0, arr2(&[[1.0, 1.0]]), arr1(&[0.0])).unwrap();
        let (update, propagated) =
            layer.backward(Activator::ReLU, &arr1(&[2.0]), &arr1(&[1.0, 3.0]), None);
        assert!(propagated.is_none());
        assert_eq!(update.weight_delta(), &arr2(&[[2.0, 6.0]]));
        layer.apply_update(0.5, &update);
        assert_eq!(layer.weights(), &arr2(&[[0.0, -2.0]]));
        assert_eq!(layer.biases(), &arr1(&[-1.0]));
    }
}
