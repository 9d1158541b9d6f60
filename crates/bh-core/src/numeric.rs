use crate::CoreError;

/// Floating point type used for every metric.
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Check that `v` is a finite rate in `[0, 1]`.
pub fn ensure_unit_rate(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(CoreError::RateOutOfRange { what, value: v })
    }
}

/// Format a rate as a percentage with `decimals` places, e.g. `0.8123 -> "81.23%"`.
pub fn format_percent(rate: Real, decimals: usize) -> String {
    format!("{:.*}%", decimals, rate * 100.0)
}
