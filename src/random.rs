//! Sources of uniform randomness for random cuts.
//!
//! Tree construction only ever asks for uniform values in `[0, 1)`. Any
//! [`rand_core::RngCore`] generator serves as a source; tests can script
//! the exact sequence with [`SequenceSource`].
use rand::Rng;
use rand_core::RngCore;

/// A total source of uniform values in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: RngCore> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// A scripted source that replays a fixed sequence of values, cycling back
/// to the start once exhausted.
///
/// # Examples
///
/// ```
/// use rrcflib::{SequenceSource, UniformSource};
///
/// let mut source = SequenceSource::new(vec![0.25, 0.75]);
/// assert_eq!(source.next_uniform(), 0.25);
/// assert_eq!(source.next_uniform(), 0.75);
/// assert_eq!(source.next_uniform(), 0.25);
/// assert_eq!(source.draws(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    position: usize,
    draws: usize,
}

impl SequenceSource {
    /// Create a source replaying `values`. Values are clamped into `[0, 1)`;
    /// an empty sequence yields `0.0` forever.
    pub fn new(values: Vec<f64>) -> Self {
        let below_one = 1.0 - f64::EPSILON / 2.0;
        let values = values
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, below_one) })
            .collect();
        SequenceSource {
            values,
            position: 0,
            draws: 0,
        }
    }

    /// Number of values handed out so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl UniformSource for SequenceSource {
    fn next_uniform(&mut self) -> f64 {
        self.draws += 1;
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position];
        self.position = (self.position + 1) % self.values.len();
        value
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    #[test]
    fn test_rng_source_in_unit_interval() {
        let mut rng = ChaCha20Rng::seed_from_u64(17);
        for _ in 0..1000 {
            let u = rng.next_uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_sequence_clamps() {
        let mut source = SequenceSource::new(vec![-1.0, 2.0, f64::NAN]);
        assert_eq!(source.next_uniform(), 0.0);
        assert!(source.next_uniform() < 1.0);
        assert_eq!(source.next_uniform(), 0.0);
    }

    #[test]
    fn test_empty_sequence() {
        let mut source = SequenceSource::new(vec![]);
        assert_eq!(source.next_uniform(), 0.0);
        assert_eq!(source.draws(), 1);
    }
}
