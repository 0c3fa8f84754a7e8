//! Dense matrix and vector helpers on top of `ndarray`.

use crate::error::{Error, Result};

use ndarray::{Array1, Array2, Axis};
use rand::distributions::Distribution;
use rand::Rng;

/// A weight matrix, rows indexed by destination neuron and columns by source
/// neuron.
pub type Mat = Array2<f64>;

/// A single column of activations, biases or errors.
pub type Vector = Array1<f64>;

/// Samples every element of a `rows x cols` matrix from `distribution`.
pub fn random<D, R>(distribution: D, rows: usize, cols: usize, rng: &mut R) -> Mat
where
    D: Distribution<f64>,
    R: Rng + ?Sized,
{
    Mat::from_shape_fn((rows, cols), |_| distribution.sample(rng))
}

/// Samples every element of a vector of length `len` from `distribution`.
pub fn random_vector<D, R>(distribution: D, len: usize, rng: &mut R) -> Vector
where
    D: Distribution<f64>,
    R: Rng + ?Sized,
{
    Vector::from_shape_fn(len, |_| distribution.sample(rng))
}

/// The outer product `a b^T`.
pub fn outer(a: &Vector, b: &Vector) -> Mat {
    let column = a.view().insert_axis(Axis(1));
    let row = b.view().insert_axis(Axis(0));
    column.dot(&row)
}

/// Builds a matrix out of a list of equally long rows.
pub fn from_rows(rows: &[Vec<f64>]) -> Result<Mat> {
    let cols = rows.first().map_or(0, Vec::len);
    let mut data = Vec::with_capacity(rows.len() * cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(Error::mismatch(format!("length of row {}", i), cols, row.len()));
        }
        data.extend_from_slice(row);
    }
    Mat::from_shape_vec((rows.len(), cols), data)
        .map_err(|_| Error::mismatch("matrix elements", rows.len() * cols, rows.len() * cols))
}

/// Splits a matrix back into its rows.
pub fn to_rows(m: &Mat) -> Vec<Vec<f64>> {
    m.outer_iter().map(|row| row.to_vec()).collect()
}

/// Fails unless `v` has exactly `expected` elements.
pub fn check_len(what: &str, v: &Vector, expected: usize) -> Result<()> {
    if v.len() != expected {
        return Err(Error::mismatch(what, expected, v.len()));
    }
    Ok(())
}

/// Whether `a` and `b` hold bit-identical elements.
///
/// Unlike `==`, a NaN element matches itself.
pub fn same_bits(a: &Vector, b: &Vector) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| p.to_bits() == q.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::Uniform;

    #[test]
    fn outer_product_has_destination_rows() {
        let m = outer(&arr1(&[1.0, 2.0]), &arr1(&[3.0, 4.0, 5.0]));
        assert_eq!(m, arr2(&[[3.0, 4.0, 5.0], [6.0, 8.0, 10.0]]));
    }

    #[test]
    fn rows_convert_both_ways() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let m = from_rows(&rows).unwrap();
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(to_rows(&m), rows);
    }

    #[test]
    fn same_bits_matches_nan_with_itself() {
        let a = arr1(&[f64::NAN, 1.0]);
        assert!(same_bits(&a, &a.clone()));
        assert!(!same_bits(&a, &arr1(&[f64::NAN, 2.0])));
        assert!(!same_bits(&a, &arr1(&[f64::NAN])));
        assert!(!same_bits(&arr1(&[0.0]), &arr1(&[-0.0])));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        match from_rows(&rows) {
            Err(Error::DimensionMismatch { expected, found, .. }) => {
                assert_eq!((expected, found), (2, 1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn random_matrix_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = random(Uniform::new(-1.0, 1.0), 4, 3, &mut rng);
        assert_eq!(m.dim(), (4, 3));
        assert!(m.iter().all(|v| (-1.0..1.0).contains(v)));
    }
}
