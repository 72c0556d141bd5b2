//! Parameter validation errors.

/// Reasons a set of primitive parameters is rejected by [Primitive::validate](crate::Primitive::validate).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A size that must be strictly positive was zero, negative, or not finite.
    #[error("{name} must be finite and greater than 0; found {value}")]
    NonPositive {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },
    /// A size that may be zero was negative or not finite.
    #[error("{name} must be finite and at least 0; found {value}")]
    Negative {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },
    /// A segment count below its minimum.
    #[error("{name} must be at least {min}; found {value}")]
    TooFew {
        /// Parameter name
        name: &'static str,
        /// Smallest accepted value
        min: u32,
        /// Offending value
        value: u32,
    },
    /// A segment or subdivision count above its maximum.
    #[error("{name} must be at most {max}; found {value}")]
    TooMany {
        /// Parameter name
        name: &'static str,
        /// Largest accepted value
        max: u32,
        /// Offending value
        value: u32,
    },
    /// The mesh would need more vertices than a `u32` index can address.
    #[error("mesh would have {0} vertices; u32 indices can address at most {max}", max = u32::MAX as u64 + 1)]
    TooManyVertices(u64),
}
