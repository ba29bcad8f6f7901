use crate::{TlError, TlResult};

/// Floating point type used throughout the controller.
pub type Real = f64;

/// Timers at or below this value count as elapsed. Absorbs the drift left
/// behind by repeatedly subtracting a tick length that is not exactly
/// representable (e.g. 0.1 s).
pub const TIMER_EPSILON: Real = 1e-9;

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

pub fn ensure_finite(v: Real, what: &'static str) -> TlResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TlError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive, e.g. a tick length or window size.
pub fn ensure_positive(v: Real, what: &'static str) -> TlResult<Real> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(TlError::InvalidArg { what })
    }
}

#[inline]
pub fn timer_expired(timer: Real) -> bool {
    timer <= TIMER_EPSILON
}
