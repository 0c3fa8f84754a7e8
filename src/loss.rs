//! Loss function types.

use crate::error::{Error, Result};
use crate::matrix::{check_len, Vector};

use std::fmt;
use std::str::FromStr;

/// Predictions are clipped into `[EPSILON, 1 - EPSILON]` before taking
/// logarithms in the cross-entropy loss.
pub const EPSILON: f64 = 1e-15;

/// [Loss function](https://en.wikipedia.org/wiki/Loss_function) types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Loss {
    /// Mean of the squared differences.
    MeanSquareError,
    /// Binary cross-entropy, averaged over the output neurons.
    ///
    /// Only meaningful when predictions are probabilities, e.g. after a
    /// sigmoid activation. Out of range predictions are clipped silently.
    CrossEntropy,
}

impl Loss {
    /// Every registered loss function.
    pub const ALL: [Loss; 2] = [Loss::MeanSquareError, Loss::CrossEntropy];

    /// The registry name of the loss function.
    pub fn name(&self) -> &'static str {
        match self {
            Loss::MeanSquareError => "Mean Square Error",
            Loss::CrossEntropy => "Cross Entropy",
        }
    }

    /// Evaluates the scalar loss of `pred` against `target`.
    pub fn evaluate(&self, pred: &Vector, target: &Vector) -> Result<f64> {
        check_len("target vector", target, pred.len())?;
        Ok(match self {
            Loss::MeanSquareError => mse(pred, target),
            Loss::CrossEntropy => cross_entropy(pred, target),
        })
    }

    /// Evaluates the per-element gradient of the loss with respect to `pred`.
    pub fn gradient(&self, pred: &Vector, target: &Vector) -> Result<Vector> {
        check_len("target vector", target, pred.len())?;
        Ok(match self {
            Loss::MeanSquareError => mse_derivative(pred, target),
            Loss::CrossEntropy => cross_entropy_derivative(pred, target),
        })
    }
}

impl fmt::Display for Loss {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Loss {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Loss::ALL
            .iter()
            .copied()
            .find(|l| l.name() == name)
            .ok_or_else(|| Error::UnknownFunction {
                kind: "loss",
                name: name.to_string(),
            })
    }
}

fn mse(pred: &Vector, target: &Vector) -> f64 {
    let diff = pred - target;
    diff.mapv(|d| d * d).mean().unwrap_or(0.0)
}

fn mse_derivative(pred: &Vector, target: &Vector) -> Vector {
    (pred - target) * (2.0 / pred.len() as f64)
}

fn clip(pred: &Vector) -> Vector {
    pred.mapv(|p| p.max(EPSILON).min(1.0 - EPSILON))
}

fn cross_entropy(pred: &Vector, target: &Vector) -> f64 {
    let pred = clip(pred);
    let per_element = ndarray::Zip::from(&pred)
        .and(target)
        .map_collect(|&p, &t| t * p.ln() + (1.0 - t) * (1.0 - p).ln());
    -per_element.mean().unwrap_or(0.0)
}

fn cross_entropy_derivative(pred: &Vector, target: &Vector) -> Vector {
    let n = pred.len() as f64;
    let pred = clip(pred);
    ndarray::Zip::from(&pred)
        .and(target)
        .map_collect(|&p, &t| -(t / p - (1.0 - t) / (1.0 - p)) / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;
    use test_strategy::proptest;

    #[test]
    fn mse_averages_squared_error() {
        let l = Loss::MeanSquareError
            .evaluate(&arr1(&[1.0, 3.0]), &arr1(&[0.0, 1.0]))
            .unwrap();
        assert_eq!(l, 2.5);
    }

    #[test]
    fn mse_gradient_is_scaled_by_length() {
        let g = Loss::MeanSquareError
            .gradient(&arr1(&[1.0, 3.0]), &arr1(&[0.0, 1.0]))
            .unwrap();
        assert_eq!(g, arr1(&[1.0, 2.0]));
    }

    #[test]
    fn cross_entropy_clips_certain_predictions() {
        let l = Loss::CrossEntropy
            .evaluate(&arr1(&[1.0]), &arr1(&[1.0]))
            .unwrap();
        assert!(l.is_finite());
        assert!(l >= 0.0 && l < 1e-12);
    }

    #[test]
    fn cross_entropy_of_wrong_certainty_is_bounded() {
        let l = Loss::CrossEntropy
            .evaluate(&arr1(&[0.0]), &arr1(&[1.0]))
            .unwrap();
        assert!(l.is_finite());
        assert!((l + EPSILON.ln()).abs() < 1e-9);
    }

    #[test]
    fn cross_entropy_gradient_stays_finite() {
        let g = Loss::CrossEntropy
            .gradient(&arr1(&[0.0, 1.0, 1.5]), &arr1(&[1.0, 0.0, 1.0]))
            .unwrap();
        assert!(g.iter().all(|v| v.is_finite()));
        assert!(g[0] < 0.0);
        assert!(g[1] > 0.0);
    }

    #[test]
    fn mismatched_target_is_rejected() {
        let err = Loss::MeanSquareError
            .evaluate(&arr1(&[1.0, 2.0]), &arr1(&[1.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn names_round_trip_through_registry() {
        for l in Loss::ALL.iter() {
            assert_eq!(l.name().parse::<Loss>().unwrap(), *l);
        }
        assert!("Hinge".parse::<Loss>().is_err());
    }

    #[proptest]
    fn cross_entropy_gradient_matches_central_difference(
        #[strategy(0.05f64..0.95)] p: f64,
        #[strategy(0.0f64..1.0)] t: f64,
    ) {
        let h = 1e-6;
        let target = arr1(&[t]);
        let ce = Loss::CrossEntropy;
        let numeric = (ce.evaluate(&arr1(&[p + h]), &target).unwrap()
            - ce.evaluate(&arr1(&[p - h]), &target).unwrap())
            / (2.0 * h);
        let analytic = ce.gradient(&arr1(&[p]), &target).unwrap()[0];
        assert!((analytic - numeric).abs() < 1e-4);
    }
}
