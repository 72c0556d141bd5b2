use protomesh_common::item_with;

/// Trait for floating-point types, so that generators can be generic over {f32, f64} without
/// having to use [weird macros](protomesh_common::item_with).
///
/// Conversions are named `cast_*` to stay clear of `FromPrimitive`, which [RealField] brings
/// along.
///
/// [RealField]: simba::scalar::RealField
pub trait Float: simba::scalar::RealField + Copy + Send + Sync {
    /// `0`
    const ZERO: Self;
    /// `1`
    const ONE: Self;
    /// `2`
    const TWO: Self;
    /// `0.5`
    const HALF: Self;

    /// Convert from `f64`, rounding if `Self` is narrower.
    fn cast_f64(value: f64) -> Self;
    /// Convert from `u32`, rounding if `Self` can't represent it exactly.
    fn cast_u32(value: u32) -> Self;
    /// Widen to `f64`.
    fn as_f64(self) -> f64;
}

item_with! {Real: f32, f64 => impl Float for Real {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const TWO: Self = 2.0;
    const HALF: Self = 0.5;

    #[inline]
    fn cast_f64(value: f64) -> Self {
        value as Self
    }

    #[inline]
    fn cast_u32(value: u32) -> Self {
        value as Self
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}}
