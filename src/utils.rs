//! Numeric helpers shared across the crate.

use num_traits::Float;

/// Converts an `f64` constant into `T`.
///
/// Every `Float` type can represent (possibly with rounding) any finite `f64`, so the conversion
/// only fails for types that don't exist in practice.
pub(crate) fn constant<T: Float>(value: f64) -> T {
    num_traits::cast(value).unwrap_or_else(T::nan)
}

/// Converts a `T` into an `f64` for diagnostics and persistence defaults.
pub(crate) fn to_f64<T: Float>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
