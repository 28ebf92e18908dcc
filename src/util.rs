use crate::{errors::RCFError, types::Result, RCFFloat};

/// If the test condition is false, return an InvalidInput error with
/// the given error message. Otherwise return Ok.
pub(crate) fn check_argument(test: bool, msg: &'static str) -> Result<()> {
    if test {
        Ok(())
    } else {
        Err(RCFError::InvalidInput { msg })
    }
}

/// Round a value to `precision` decimal places, ties to even.
///
/// Values whose scaled magnitude already exceeds the integer precision of an
/// `f64` carry no fractional digits at that scale and are returned as is.
pub(crate) fn round_to_precision<T: RCFFloat>(value: T, precision: u32) -> T {
    let scale = 10f64.powi(precision as i32);
    let scaled = match value.to_f64() {
        Some(v) => v * scale,
        None => return value,
    };
    if !scaled.is_finite() || scaled.abs() >= (1u64 << 52) as f64 {
        return value;
    }
    T::from(scaled.round_ties_even() / scale).unwrap_or(value)
}

/// Absolute tolerance under which two rounded coordinates are the same.
pub(crate) fn tolerance_for(precision: u32) -> f64 {
    10f64.powf(-(precision as f64 + 1.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_argument() {
        assert!(check_argument(true, "unused").is_ok());
        assert_eq!(
            check_argument(false, "bad"),
            Err(RCFError::InvalidInput { msg: "bad" })
        );
    }

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(0.1234567891234f64, 9), 0.123456789);
        assert_eq!(round_to_precision(2.5f64, 0), 2.0);
        assert_eq!(round_to_precision(3.5f64, 0), 4.0);
        assert_eq!(round_to_precision(-1.25f64, 1), -1.2);
        assert_eq!(round_to_precision(1.0e300f64, 9), 1.0e300);
    }

    #[test]
    fn test_tolerance() {
        let tol = tolerance_for(9);
        assert!(tol < 1.0e-10 && tol > 1.0e-11);
    }
}
