//! Index-set helpers over dense nalgebra matrices.
//!
//! Everything here is pure: inputs are borrowed and every result is a freshly
//! allocated value.

use nalgebra::{DMatrix, DVector};

/// Copy the rows named by `indices`, in that order.
///
/// Indices may repeat and need not cover the matrix. Panics if one is out of
/// range.
pub fn select_rows(matrix: &DMatrix<f64>, indices: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(indices.len(), matrix.ncols(), |i, j| matrix[(indices[i], j)])
}

/// Copy the columns named by `indices`, in that order.
pub fn select_cols(matrix: &DMatrix<f64>, indices: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(matrix.nrows(), indices.len(), |i, j| matrix[(i, indices[j])])
}

/// Vector counterpart of [`select_rows`].
pub fn select(vector: &DVector<f64>, indices: &[usize]) -> DVector<f64> {
    DVector::from_iterator(indices.len(), indices.iter().map(|&i| vector[i]))
}

/// Index of the largest value; the left-most one wins ties.
///
/// Panics on an empty slice.
pub fn arg_max(values: &[f64]) -> usize {
    assert!(!values.is_empty(), "arg_max of an empty slice");
    let mut max_val = values[0];
    let mut max_idx = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if max_val < v {
            max_val = v;
            max_idx = i;
        }
    }
    max_idx
}

/// Index of the smallest value, computed as the `arg_max` of the negation so
/// both directions break ties the same way.
pub fn arg_min(values: &[f64]) -> usize {
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();
    arg_max(&negated)
}

/// Every value of `0..n` absent from `indices`, ascending.
///
/// `indices` may come in any order. With distinct entries drawn from `0..n`
/// the result has `n - indices.len()` elements.
pub fn complement_indices(indices: &[usize], n: usize) -> Vec<usize> {
    (0..n).filter(|i| !indices.contains(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0])
    }

    #[test]
    fn test_select_rows_in_given_order() {
        let rows = select_rows(&sample(), &[2, 0, 2]);
        assert_eq!(rows.nrows(), 3);
        assert_eq!(rows.row(0).iter().copied().collect::<Vec<_>>(), vec![7.0, 8.0, 9.0]);
        assert_eq!(rows.row(1).iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(rows.row(2).iter().copied().collect::<Vec<_>>(), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_select_cols_partial() {
        let cols = select_cols(&sample(), &[1]);
        assert_eq!(cols.shape(), (3, 1));
        assert_eq!(cols.as_slice(), &[2.0, 5.0, 8.0]);
    }

    #[test]
    fn test_select_vector() {
        let v = DVector::from_vec(vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(select(&v, &[3, 1]).as_slice(), &[40.0, 20.0]);
    }

    #[test]
    fn test_arg_extrema_tie_break() {
        let v = [1.0, 5.0, -2.0, 5.0, -2.0];
        assert_eq!(arg_max(&v), 1);
        assert_eq!(arg_min(&v), 2);
        assert_eq!(arg_max(&[3.0]), 0);
    }

    #[test]
    fn test_complement_indices() {
        assert_eq!(complement_indices(&[3, 1, 5], 7), vec![0, 2, 4, 6]);
        assert_eq!(complement_indices(&[], 3), vec![0, 1, 2]);
        assert!(complement_indices(&[2, 0, 1], 3).is_empty());
    }
}
