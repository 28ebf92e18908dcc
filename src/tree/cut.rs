use log::trace;
use num::Float;

use crate::errors::RCFError;
use crate::random::UniformSource;
use crate::types::{Mask, Result};
use crate::util::check_argument;
use crate::{PointSet, RCFFloat};

/// Axis-aligned cut through a set of points.
///
/// This data structure represents the "cut" part of random cut trees. A cut
/// is a hyperplane that partitions data points into two halves. It consists
/// of a `dimension` and a `value`: points whose component along `dimension`
/// is less than or equal to `value` lie to the left of the cut, all others
/// lie to the right.
///
/// # Examples
///
/// ```
/// use rrcflib::Cut;
///
/// let cut = Cut::new(1, 0.0);
/// assert!(Cut::is_left_of(&[1.0, -1.0], &cut));
/// assert!(Cut::is_left_of(&[1.0, 0.0], &cut));
/// assert!(!Cut::is_left_of(&[1.0, 2.0], &cut));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cut<T> {
    dimension: usize,
    value: T,
}

impl<T> Cut<T>
    where T: RCFFloat
{
    /// Create a new cut from a given dimension and value.
    pub fn new(dimension: usize, value: T) -> Self {
        Cut { dimension, value }
    }

    /// Returns true if `point` is to the left of `cut`.
    pub fn is_left_of(point: &[T], cut: &Cut<T>) -> bool {
        point[cut.dimension] <= cut.value
    }

    /// Get the dimension of the cut.
    pub fn dimension(&self) -> usize { self.dimension }

    /// Get the value of the cut.
    pub fn value(&self) -> T { self.value }

    /// Choose a cut dimension with probability proportional to its range.
    ///
    /// One uniform value is drawn for every dimension and scaled by that
    /// dimension's share of the total range. The dimension with the largest
    /// scaled value wins; on ties the earliest dimension is kept. Should every
    /// scaled value be zero, the first dimension with a nonzero range is
    /// returned so that a flat dimension is never cut.
    ///
    /// Ranges must be finite. Their sum may overflow, in which case the
    /// shares are taken relative to the largest range instead.
    ///
    /// Fails with `DegenerateSubset` when every range is zero. `points` is
    /// only used to describe the subset in that error.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrcflib::{Cut, SequenceSource};
    ///
    /// // dimension 1 has three times the range of dimension 0
    /// let ranges = vec![1.0, 3.0];
    /// let mut source = SequenceSource::new(vec![0.9, 0.5]);
    /// assert_eq!(Cut::choose_dimension(&ranges, 2, &mut source), Ok(1));
    ///
    /// let mut source = SequenceSource::new(vec![0.9, 0.2]);
    /// assert_eq!(Cut::choose_dimension(&ranges, 2, &mut source), Ok(0));
    /// ```
    pub fn choose_dimension<S: UniformSource + ?Sized>(
        ranges: &[T],
        points: usize,
        source: &mut S,
    ) -> Result<usize> {
        let mut total: T = ranges.iter().copied().sum();
        if !(total > T::zero()) {
            return Err(RCFError::DegenerateSubset { points });
        }
        let mut scale = T::one();
        if total.is_infinite() {
            scale = ranges.iter().copied().fold(T::zero(), <T as Float>::max);
            total = ranges.iter().map(|&range| range / scale).sum();
        }

        let mut index = 0;
        let mut max = 0.0;
        for (i, &range) in ranges.iter().enumerate() {
            let probability = (range / scale / total).to_f64().unwrap_or(0.0);
            let weighted = source.next_uniform() * probability;
            if weighted > max {
                index = i;
                max = weighted;
            }
        }

        if max > 0.0 {
            Ok(index)
        } else {
            ranges
                .iter()
                .position(|&range| range > T::zero())
                .ok_or(RCFError::DegenerateSubset { points })
        }
    }

    /// Returns a cut along `dimension` at a uniform value in `[min, max)`.
    ///
    /// A span `max - min` too wide for `T` is stepped across in two halves.
    /// When rounding pushes the value onto `max` it is moved just below it,
    /// falling back to `min` if that is not representable. Either way, for
    /// finite `min < max` the cut leaves at least one point on each side.
    pub fn new_random_cut<S: UniformSource + ?Sized>(
        dimension: usize,
        min: T,
        max: T,
        source: &mut S,
    ) -> Self {
        let factor = T::from(source.next_uniform()).unwrap_or_else(T::zero);
        let span = max - min;
        let mut value = if span.is_finite() {
            min + factor * span
        } else {
            let two = T::one() + T::one();
            let half = factor * (max / two - min / two);
            min + half + half
        };
        if value >= max && max > min {
            value = max - Float::epsilon();
        }
        if !value.is_finite() || value >= max || value < min {
            value = min;
        }
        Cut::new(dimension, value)
    }
}

/// The outcome of one random cut over an active subset.
///
/// `left` and `right` are disjoint masks whose union is the subset that was
/// cut. Both select at least one row.
#[derive(Debug, Clone)]
pub struct Partition<T> {
    pub left: Mask,
    pub right: Mask,
    pub cut: Cut<T>,
}

/// Splits active subsets of a point set with random cuts.
///
/// Each call to [`partition`](RandomCutPartitioner::partition) computes the
/// per-dimension range over the rows selected by the mask, picks a dimension
/// with [`Cut::choose_dimension`] and a value with [`Cut::new_random_cut`],
/// and returns the rows on each side of the resulting cut. A partition
/// consumes exactly `d + 1` uniform values from the source.
///
/// # Examples
///
/// ```
/// use rrcflib::{PointSet, SequenceSource};
/// use rrcflib::tree::RandomCutPartitioner;
///
/// let rows = vec![vec![0.0, 0.0], vec![4.0, 0.0], vec![1.0, 0.0]];
/// let point_set = PointSet::new(&rows).unwrap();
/// let partitioner = RandomCutPartitioner::new(&point_set);
///
/// // only dimension 0 has a range, and the cut lands at 0.5 * 4.0 = 2.0
/// let mut source = SequenceSource::new(vec![0.3, 0.8, 0.5]);
/// let partition = partitioner.partition(&point_set.full_mask(), &mut source).unwrap();
/// assert_eq!(partition.cut.dimension(), 0);
/// assert_eq!(partition.cut.value(), 2.0);
/// assert_eq!(partition.left, vec![true, false, true]);
/// assert_eq!(partition.right, vec![false, true, false]);
/// ```
pub struct RandomCutPartitioner<'a, T> {
    points: &'a PointSet<T>,
}

impl<'a, T: RCFFloat> RandomCutPartitioner<'a, T> {
    pub fn new(points: &'a PointSet<T>) -> Self {
        RandomCutPartitioner { points }
    }

    /// Cut the rows selected by `mask` in two.
    ///
    /// The mask must select at least two rows. Fails with `DegenerateSubset`
    /// when the selected rows are identical in every dimension.
    pub fn partition<S: UniformSource + ?Sized>(
        &self,
        mask: &[bool],
        source: &mut S,
    ) -> Result<Partition<T>> {
        check_argument(mask.len() == self.points.len(), "mask length must match the point set")?;
        let count = self.points.count(mask);
        check_argument(count >= 2, "a cut needs at least two rows")?;

        let (min, max) = match (self.points.column_min(mask), self.points.column_max(mask)) {
            (Some(min), Some(max)) => (min, max),
            _ => return Err(RCFError::InvalidInput { msg: "a cut needs at least two rows" }),
        };
        let mut ranges: Vec<T> = min.iter().zip(&max).map(|(&lo, &hi)| hi - lo).collect();
        if ranges.iter().any(|range| range.is_infinite()) {
            // finite coordinates more than `T::max_value()` apart; halving
            // every range keeps their proportions
            let two = T::one() + T::one();
            ranges = min.iter().zip(&max).map(|(&lo, &hi)| hi / two - lo / two).collect();
        }

        let dimension = Cut::choose_dimension(&ranges, count, source)?;
        let cut = Cut::new_random_cut(dimension, min[dimension], max[dimension], source);

        let left: Mask = self.points
            .unique_rows()
            .iter()
            .zip(mask)
            .map(|(row, &active)| active && Cut::is_left_of(row, &cut))
            .collect();
        let right: Mask = mask
            .iter()
            .zip(&left)
            .map(|(&active, &is_left)| active && !is_left)
            .collect();

        trace!(
            "cut dimension {} at {:?}: {} rows left, {} rows right",
            dimension,
            cut.value(),
            self.points.count(&left),
            self.points.count(&right),
        );
        Ok(Partition { left, right, cut })
    }
}
