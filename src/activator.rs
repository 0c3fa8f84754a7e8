//! Activation function types.

use crate::error::Error;
use crate::matrix::Vector;

use std::fmt;
use std::str::FromStr;

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
///
/// A single activation is shared by every layer of a network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activator {
    /// Rectified Linear Unit
    ReLU,
    /// Sigmoid function
    Sigmoid,
}

impl Activator {
    /// Every registered activation function.
    pub const ALL: [Activator; 2] = [Activator::ReLU, Activator::Sigmoid];

    /// The registry name of the activation function.
    pub fn name(&self) -> &'static str {
        match self {
            Activator::ReLU => "ReLU",
            Activator::Sigmoid => "Sigmoid",
        }
    }

    /// Evaluates `f(x)` for the selected activation function.
    ///
    /// NaN propagates through every activation.
    pub fn f(&self, x: f64) -> f64 {
        match self {
            Activator::ReLU => if x.is_nan() || x > 0.0 { x } else { 0.0 },
            Activator::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }

    /// Evaluates the derivative `f'(x)`.
    ///
    /// Unlike the output-based shortcut, this takes the pre-activation sum
    /// `x`, which is what the forward cache stores. The ReLU derivative at
    /// exactly zero is zero.
    pub fn fprime(&self, x: f64) -> f64 {
        match self {
            Activator::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            Activator::Sigmoid => {
                let s = self.f(x);
                s * (1.0 - s)
            }
        }
    }

    /// Applies `f` element-wise.
    pub fn apply(&self, z: &Vector) -> Vector {
        z.mapv(|x| self.f(x))
    }

    /// Applies `f'` element-wise.
    pub fn derivative(&self, z: &Vector) -> Vector {
        z.mapv(|x| self.fprime(x))
    }
}

impl fmt::Display for Activator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activator {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Activator::ALL
            .iter()
            .copied()
            .find(|a| a.name() == name)
            .ok_or_else(|| Error::UnknownFunction {
                kind: "activation",
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;
    use test_strategy::proptest;

    #[test]
    fn relu_clamps_negatives() {
        assert_eq!(
            Activator::ReLU.apply(&arr1(&[-2.0, 0.0, 3.5])),
            arr1(&[0.0, 0.0, 3.5])
        );
    }

    #[test]
    fn relu_propagates_nan() {
        let y = Activator::ReLU.apply(&arr1(&[f64::NAN, -1.0]));
        assert!(y[0].is_nan());
        assert_eq!(y[1], 0.0);
    }

    #[test]
    fn relu_derivative_is_zero_at_zero() {
        assert_eq!(
            Activator::ReLU.derivative(&arr1(&[-1.0, 0.0, 1e-9])),
            arr1(&[0.0, 0.0, 1.0])
        );
    }

    #[test]
    fn sigmoid_saturates_without_nan() {
        let y = Activator::Sigmoid.apply(&arr1(&[-1000.0, 0.0, 1000.0]));
        assert_eq!(y, arr1(&[0.0, 0.5, 1.0]));
        let d = Activator::Sigmoid.derivative(&arr1(&[-1000.0, 1000.0]));
        assert!(d.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn names_round_trip_through_registry() {
        for a in Activator::ALL.iter() {
            assert_eq!(a.name().parse::<Activator>().unwrap(), *a);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        match "Tanh".parse::<Activator>() {
            Err(Error::UnknownFunction { kind, name }) => {
                assert_eq!(kind, "activation");
                assert_eq!(name, "Tanh");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[proptest]
    fn sigmoid_derivative_matches_central_difference(#[strategy(-10.0f64..10.0)] x: f64) {
        let h = 1e-4;
        let s = Activator::Sigmoid;
        let numeric = (s.f(x + h) - s.f(x - h)) / (2.0 * h);
        assert!((s.fprime(x) - numeric).abs() < 1e-4);
    }

    #[proptest]
    fn relu_derivative_matches_central_difference(#[strategy(0.01f64..10.0)] x: f64, negative: bool) {
        let x = if negative { -x } else { x };
        let h = 1e-4;
        let r = Activator::ReLU;
        let numeric = (r.f(x + h) - r.f(x - h)) / (2.0 * h);
        assert!((r.fprime(x) - numeric).abs() < 1e-6);
    }
}
