use std::collections::HashMap;

use num::Float;

use crate::types::{Label, Mask, Result};
use crate::util::{check_argument, round_to_precision, tolerance_for};
use crate::RCFFloat;

/// Default number of decimal places input coordinates are rounded to.
pub const DEFAULT_PRECISION: u32 = 9;

/// Largest supported rounding precision. Beyond this the scaled values no
/// longer fit the integer range of an `f64`.
pub const MAX_PRECISION: u32 = 15;

/// An immutable collection of unique *d*-dimensional rows.
///
/// A point set is prepared once from the caller's rows: every coordinate is
/// rounded to a fixed number of decimal places and rows that are equal
/// within `10^-(precision + 1.5)` are collapsed, in first-seen order, into a
/// single unique row. Each unique row carries a weight equal to the number
/// of original rows collapsed into it, and every original row index (its
/// label) maps to the unique row that represents it.
///
/// Statistics over subsets of the unique rows are computed through boolean
/// masks with one entry per unique row.
///
/// # Examples
///
/// ```
/// use rrcflib::PointSet;
///
/// let rows = vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![1.0, 1.0]];
/// let point_set = PointSet::new(&rows).unwrap();
/// assert_eq!(point_set.len(), 2);
/// assert_eq!(point_set.weights(), &[2, 1]);
/// assert_eq!(point_set.inverse(), &[0, 0, 1]);
///
/// let mask = point_set.full_mask();
/// assert_eq!(point_set.column_max(&mask), Some(vec![1.0, 1.0]));
/// ```
#[derive(Debug, Clone)]
pub struct PointSet<T> {
    rows: Vec<Vec<T>>,
    weights: Vec<usize>,
    inverse: Vec<usize>,
    labels: Vec<Vec<Label>>,
    dimensions: usize,
    precision: u32,
}

impl<T: RCFFloat> PointSet<T> {
    /// Prepare a point set rounding to [`DEFAULT_PRECISION`] places.
    pub fn new(rows: &[Vec<T>]) -> Result<Self> {
        Self::with_precision(rows, DEFAULT_PRECISION)
    }

    /// Prepare a point set rounding to `precision` decimal places.
    ///
    /// Fails with `InvalidInput` when there are no rows, when rows have no
    /// coordinates or differing lengths, when a coordinate is not finite, or
    /// when `precision` exceeds [`MAX_PRECISION`].
    pub fn with_precision(rows: &[Vec<T>], precision: u32) -> Result<Self> {
        check_argument(precision <= MAX_PRECISION, "precision must be at most 15")?;
        check_argument(!rows.is_empty(), "dataset must contain at least one row")?;
        let dimensions = rows[0].len();
        check_argument(dimensions > 0, "rows must have at least one dimension")?;
        for row in rows {
            check_argument(row.len() == dimensions, "rows must have equal lengths")?;
            check_argument(row.iter().all(|v| v.is_finite()), "coordinates must be finite")?;
        }

        let mut unique: Vec<Vec<T>> = Vec::new();
        let mut weights: Vec<usize> = Vec::new();
        let mut inverse: Vec<usize> = Vec::with_capacity(rows.len());
        let mut labels: Vec<Vec<Label>> = Vec::new();
        let mut seen: HashMap<Vec<u64>, usize> = HashMap::new();

        for row in rows {
            let rounded: Vec<T> = row.iter().map(|&v| round_to_precision(v, precision)).collect();
            let key = canonical_key(&rounded);
            let index = match seen.get(&key) {
                Some(&index) => {
                    debug_assert!(within_tolerance(&unique[index], &rounded, tolerance_for(precision)));
                    weights[index] += 1;
                    labels[index].push(inverse.len());
                    index
                }
                None => {
                    unique.push(rounded);
                    weights.push(1);
                    labels.push(vec![inverse.len()]);
                    seen.insert(key, unique.len() - 1);
                    unique.len() - 1
                }
            };
            inverse.push(index);
        }

        Ok(PointSet {
            rows: unique,
            weights,
            inverse,
            labels,
            dimensions,
            precision,
        })
    }

    /// Number of unique rows.
    pub fn len(&self) -> usize { self.rows.len() }

    /// A prepared point set always holds at least one row.
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Number of rows originally supplied, duplicates included.
    pub fn original_len(&self) -> usize { self.inverse.len() }

    pub fn dimensions(&self) -> usize { self.dimensions }

    pub fn precision(&self) -> u32 { self.precision }

    /// Absolute tolerance under which two rows are considered equal.
    pub fn tolerance(&self) -> f64 { tolerance_for(self.precision) }

    pub fn unique_rows(&self) -> &[Vec<T>] { &self.rows }

    /// Returns the unique row at `index`.
    pub fn row(&self, index: usize) -> &[T] { &self.rows[index] }

    /// Weight of each unique row: the number of original rows it represents.
    pub fn weights(&self) -> &[usize] { &self.weights }

    /// Maps each original label to the index of its unique row.
    pub fn inverse(&self) -> &[usize] { &self.inverse }

    /// Returns the unique row index holding the data of `label`.
    pub fn unique_index(&self, label: Label) -> Option<usize> {
        self.inverse.get(label).copied()
    }

    /// Returns every original label collapsed into unique row `index`, in
    /// ascending order.
    pub fn labels_of(&self, index: usize) -> &[Label] { &self.labels[index] }

    /// Round a row the same way input rows were rounded on preparation.
    pub fn round_row(&self, row: &[T]) -> Vec<T> {
        row.iter().map(|&v| round_to_precision(v, self.precision)).collect()
    }

    /// Returns true if two rows agree within this set's tolerance.
    pub fn rows_equal(&self, a: &[T], b: &[T]) -> bool {
        within_tolerance(a, b, self.tolerance())
    }

    /// A mask selecting every unique row.
    pub fn full_mask(&self) -> Mask { vec![true; self.rows.len()] }

    /// Number of unique rows selected by `mask`.
    pub fn count(&self, mask: &[bool]) -> usize {
        mask.iter().filter(|&&m| m).count()
    }

    /// Indices of the unique rows selected by `mask`.
    pub fn indices(&self, mask: &[bool]) -> Vec<usize> {
        mask.iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(i, _)| i)
            .collect()
    }

    /// Iterate over the rows selected by `mask`, preserving order.
    pub fn filter<'a>(&'a self, mask: &'a [bool]) -> impl Iterator<Item = &'a [T]> + 'a {
        debug_assert_eq!(mask.len(), self.rows.len());
        self.rows
            .iter()
            .zip(mask)
            .filter(|(_, &m)| m)
            .map(|(row, _)| row.as_slice())
    }

    /// Minimum of each column over the rows selected by `mask`, or `None` if
    /// the mask selects nothing.
    pub fn column_min(&self, mask: &[bool]) -> Option<Vec<T>> {
        self.fold_columns(mask, <T as Float>::min)
    }

    /// Maximum of each column over the rows selected by `mask`, or `None` if
    /// the mask selects nothing.
    pub fn column_max(&self, mask: &[bool]) -> Option<Vec<T>> {
        self.fold_columns(mask, <T as Float>::max)
    }

    /// Sum of each column over the rows selected by `mask`. Unique rows count
    /// once regardless of weight.
    pub fn column_sum(&self, mask: &[bool]) -> Vec<T> {
        let mut sum = vec![T::zero(); self.dimensions];
        for row in self.filter(mask) {
            for (s, &v) in sum.iter_mut().zip(row) {
                *s = *s + v;
            }
        }
        sum
    }

    fn fold_columns(&self, mask: &[bool], combine: fn(T, T) -> T) -> Option<Vec<T>> {
        let mut rows = self.filter(mask);
        let mut acc = rows.next()?.to_vec();
        for row in rows {
            for (a, &v) in acc.iter_mut().zip(row) {
                *a = combine(*a, v);
            }
        }
        Some(acc)
    }
}

/// Hash key of a rounded row. After rounding, coordinates that differ at all
/// differ by at least `10^-precision`, which exceeds the tolerance, so bitwise
/// equality matches tolerance equality once signed zeros are unified.
fn canonical_key<T: RCFFloat>(row: &[T]) -> Vec<u64> {
    row.iter()
        .map(|v| (v.to_f64().unwrap_or(0.0) + 0.0).to_bits())
        .collect()
}

fn within_tolerance<T: RCFFloat>(a: &[T], b: &[T], tolerance: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(&x, &y)| {
            (x - y).abs().to_f64().map_or(false, |d| d <= tolerance)
        })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::errors::RCFError;

    #[test]
    fn test_rejects_empty() {
        let rows: Vec<Vec<f64>> = vec![];
        assert!(matches!(PointSet::new(&rows), Err(RCFError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let rows: Vec<Vec<f64>> = vec![vec![], vec![]];
        assert!(matches!(PointSet::new(&rows), Err(RCFError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_ragged() {
        let rows = vec![vec![0.0, 1.0], vec![2.0]];
        assert!(matches!(PointSet::new(&rows), Err(RCFError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_non_finite() {
        let rows = vec![vec![0.0, f64::NAN]];
        assert!(matches!(PointSet::new(&rows), Err(RCFError::InvalidInput { .. })));
        let rows = vec![vec![f32::INFINITY]];
        assert!(matches!(PointSet::new(&rows), Err(RCFError::InvalidInput { .. })));
    }

    #[test]
    fn test_rejects_precision() {
        let rows = vec![vec![0.0]];
        assert!(PointSet::with_precision(&rows, 16).is_err());
        assert!(PointSet::with_precision(&rows, 15).is_ok());
    }

    #[test]
    fn test_collapses_noise() {
        let rows = vec![
            vec![1.0, 2.0],
            vec![1.0 + 1.0e-12, 2.0 - 1.0e-12],
            vec![3.0, 4.0],
            vec![-0.0, 0.0],
            vec![0.0, -0.0],
        ];
        let point_set = PointSet::new(&rows).unwrap();
        assert_eq!(point_set.len(), 3);
        assert_eq!(point_set.original_len(), 5);
        assert_eq!(point_set.weights(), &[2, 1, 2]);
        assert_eq!(point_set.inverse(), &[0, 0, 1, 2, 2]);
        assert_eq!(point_set.labels_of(0), &[0, 1]);
        assert_eq!(point_set.labels_of(1), &[2]);
        assert_eq!(point_set.labels_of(2), &[3, 4]);
        for (index, &weight) in point_set.weights().iter().enumerate() {
            assert_eq!(point_set.labels_of(index).len(), weight);
        }
        assert_eq!(point_set.unique_index(2), Some(1));
        assert_eq!(point_set.unique_index(5), None);
        assert_eq!(point_set.weights().iter().sum::<usize>(), rows.len());
    }

    #[test]
    fn test_distinct_at_precision_kept() {
        let rows = vec![vec![0.0], vec![1.0e-9], vec![2.0e-9]];
        let point_set = PointSet::new(&rows).unwrap();
        assert_eq!(point_set.len(), 3);
    }

    #[test]
    fn test_preparation_idempotent() {
        let rows = vec![vec![0.5, 0.25], vec![0.5, 0.25], vec![0.1234567891, 7.0], vec![-3.0, 2.0]];
        let once = PointSet::new(&rows).unwrap();
        let twice = PointSet::new(once.unique_rows()).unwrap();
        assert_eq!(twice.unique_rows(), once.unique_rows());
        assert!(twice.weights().iter().all(|&w| w == 1));
        assert_eq!(twice.inverse(), &[0, 1, 2]);
    }

    #[test]
    fn test_column_statistics() {
        let rows = vec![vec![0.0, 5.0], vec![2.0, -1.0], vec![4.0, 3.0]];
        let point_set = PointSet::new(&rows).unwrap();

        let mask = point_set.full_mask();
        assert_eq!(point_set.column_min(&mask), Some(vec![0.0, -1.0]));
        assert_eq!(point_set.column_max(&mask), Some(vec![4.0, 5.0]));
        let sum = point_set.column_sum(&mask);
        assert_relative_eq!(sum[0], 6.0);
        assert_relative_eq!(sum[1], 7.0);

        let mask = vec![false, true, true];
        assert_eq!(point_set.count(&mask), 2);
        assert_eq!(point_set.indices(&mask), vec![1, 2]);
        assert_eq!(point_set.column_min(&mask), Some(vec![2.0, -1.0]));
        assert_eq!(point_set.column_max(&mask), Some(vec![4.0, 3.0]));
        let filtered: Vec<&[f64]> = point_set.filter(&mask).collect();
        assert_eq!(filtered, vec![&[2.0, -1.0][..], &[4.0, 3.0][..]]);

        let mask = vec![false; 3];
        assert_eq!(point_set.column_min(&mask), None);
        assert_eq!(point_set.column_sum(&mask), vec![0.0, 0.0]);
    }

    #[test]
    fn test_rows_equal() {
        let point_set = PointSet::new(&vec![vec![0.0f64]]).unwrap();
        assert!(point_set.rows_equal(&[1.0, 2.0], &[1.0, 2.0 + 1.0e-12]));
        assert!(!point_set.rows_equal(&[1.0, 2.0], &[1.0, 2.0 + 1.0e-9]));
        assert!(!point_set.rows_equal(&[1.0], &[1.0, 2.0]));
        assert_eq!(point_set.round_row(&[0.1234567891234]), vec![0.123456789]);
    }
}
