use std::fmt;

use num::{Float, Zero};

use crate::RCFFloat;

/// Axis-aligned bounding box on a collection of points.
///
/// Given a set of *d*-dimensional points, a bounding box is the smallest
/// *d*-dimensional rectangular prism containing all of these points. It is
/// represented by two vectors: the low corner (min values) and the high
/// corner (max values). For every dimension the min value never exceeds the
/// max value.
///
/// # Examples
///
/// ```
/// use rrcflib::BoundingBox;
///
/// // a leaf's bounding box degenerates to its point
/// let point: Vec<f64> = vec![1.0, 2.0];
/// let bbox = BoundingBox::new_from_point(&point);
/// assert_eq!(bbox.min_values(), &point[..]);
/// assert_eq!(bbox.max_values(), &point[..]);
///
/// // a branch's bounding box spans both of its children
/// let other = BoundingBox::new_from_point(&[3.0, -2.0]);
/// let merged = BoundingBox::merged_box_with_box(&bbox, &other);
/// println!("{}", &merged);   // BoundingBox ([1.0, -2.0], [3.0, 2.0])
///
/// assert!(merged.contains_point(&point));
/// assert!(merged.contains_box(&bbox));
/// assert!(merged.contains_box(&other));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox<T> {
    min_values: Vec<T>,
    max_values: Vec<T>,
    range_sum: T,
}

impl<T> BoundingBox<T> where T: RCFFloat {

    /// Create a new bounding box from a min values vector and a max values
    /// vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrcflib::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(&[-1.0, 0.0], &[1.0, 3.0]);
    /// assert_eq!(bbox.dimensions(), 2);
    /// assert_eq!(bbox.range_sum(), 5.0);
    /// ```
    pub fn new(min_values: &[T], max_values: &[T]) -> Self {
        assert_eq!(min_values.len(), max_values.len());

        BoundingBox {
            min_values: min_values.to_vec(),
            max_values: max_values.to_vec(),
            range_sum: BoundingBox::compute_range_sum(min_values, max_values),
        }
    }

    /// Create a new bounding box from a single point.
    ///
    /// The resulting bounding box has no interior: its min values are equal to
    /// its max values. Therefore, its range sum is zero.
    pub fn new_from_point(point: &[T]) -> Self {
        BoundingBox {
            min_values: point.to_vec(),
            max_values: point.to_vec(),
            range_sum: Zero::zero(),
        }
    }

    /// Returns a new bounding box given by the merging of two bounding boxes.
    ///
    /// The low corner is the component-wise minimum of both low corners and
    /// the high corner the component-wise maximum of both high corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrcflib::BoundingBox;
    ///
    /// let bbox1 = BoundingBox::new(&[0.0, 0.0], &[2.0, 2.0]);
    /// let bbox2 = BoundingBox::new(&[1.0, 1.0], &[3.0, 4.0]);
    ///
    /// let merged = BoundingBox::merged_box_with_box(&bbox1, &bbox2);
    /// assert_eq!(merged.min_values(), &[0.0, 0.0]);
    /// assert_eq!(merged.max_values(), &[3.0, 4.0]);
    /// assert_eq!(merged.range_sum(), 7.0);
    /// ```
    pub fn merged_box_with_box(
        bounding_box1: &BoundingBox<T>,
        bounding_box2: &BoundingBox<T>) -> Self
    {
        let min_values: Vec<T> = bounding_box1.min_values().iter()
            .zip(bounding_box2.min_values())
            .map(|(&x, &y)| Float::min(x, y))
            .collect();

        let max_values: Vec<T> = bounding_box1.max_values().iter()
            .zip(bounding_box2.max_values())
            .map(|(&x, &y)| Float::max(x, y))
            .collect();

        let range_sum = BoundingBox::compute_range_sum(&min_values, &max_values);

        BoundingBox {
            min_values,
            max_values,
            range_sum,
        }
    }

    /// Get the dimensionality of the bounding box.
    pub fn dimensions(&self) -> usize { self.min_values.len() }

    /// Get the vector of min values of the bounding box.
    pub fn min_values(&self) -> &[T] { &self.min_values }

    /// Get the vector of max values of the bounding box.
    pub fn max_values(&self) -> &[T] { &self.max_values }

    /// Get the sum across all dimensions of lengths of the bounding box.
    pub fn range_sum(&self) -> T { self.range_sum }

    /// Returns true if the given point is contained inside the bounding box.
    pub fn contains_point(&self, point: &[T]) -> bool {
        (0..self.dimensions())
            .all(|i| self.min_values[i] <= point[i] && point[i] <= self.max_values[i])
    }

    /// Returns true if the given bounding box is contained inside this
    /// bounding box.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrcflib::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(&[0.0, 0.0], &[8.0, 8.0]);
    /// let small_bbox = BoundingBox::new(&[0.0, 1.0], &[2.0, 3.0]);
    /// assert!(bbox.contains_box(&small_bbox));
    ///
    /// let med_bbox = BoundingBox::new(&[4.0, 6.0], &[9.0, 7.0]);
    /// assert!(!bbox.contains_box(&med_bbox));
    /// ```
    pub fn contains_box(&self, bounding_box: &BoundingBox<T>) -> bool {
        (0..self.dimensions()).all(|i| {
            self.min_values[i] <= bounding_box.min_values[i]
                && bounding_box.max_values[i] <= self.max_values[i]
        })
    }

    /// Compute the range sum from a pair of min/max value vectors.
    ///
    /// The range sum is the sum of the differences between the min values and
    /// max values of the bounding box across each component. For example, if
    /// the min values are `[a, b]` and the max values are `[c, d]` then the
    /// range sum is equal to `(c - a) + (d - b)`.
    pub fn compute_range_sum(min_values: &[T], max_values: &[T]) -> T {
        assert_eq!(min_values.len(), max_values.len());

        min_values.iter().zip(max_values).map(|(&lo, &hi)| hi - lo).sum()
    }
}

impl<T> fmt::Display for BoundingBox<T>
    where T: RCFFloat
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundingBox ({:?}, {:?})", self.min_values, self.max_values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_box_is_degenerate() {
        let bbox = BoundingBox::new_from_point(&[5.0f32, -1.0]);
        assert_eq!(bbox.range_sum(), 0.0);
        assert_eq!(bbox.min_values(), bbox.max_values());
        assert!(bbox.contains_point(&[5.0, -1.0]));
        assert!(!bbox.contains_point(&[5.0, -1.5]));
    }

    #[test]
    fn test_merge_is_symmetric() {
        let a = BoundingBox::new(&[0.0, 2.0], &[1.0, 3.0]);
        let b = BoundingBox::new(&[-1.0, 2.5], &[0.5, 6.0]);
        let ab = BoundingBox::merged_box_with_box(&a, &b);
        let ba = BoundingBox::merged_box_with_box(&b, &a);
        assert_eq!(ab, ba);
        assert_eq!(ab.min_values(), &[-1.0, 2.0]);
        assert_eq!(ab.max_values(), &[1.0, 6.0]);
        assert!(ab.contains_box(&a) && ab.contains_box(&b));
    }

    #[test]
    fn test_display() {
        let bbox = BoundingBox::new(&[0.0, 1.0], &[2.0, 3.0]);
        assert_eq!(format!("{}", bbox), "BoundingBox ([0.0, 1.0], [2.0, 3.0])");
    }
}
