//! Configuration-time error types.
//!
//! The per-frame simulation never fails: degenerate inputs are clamped or
//! defaulted in place. Errors only surface while loading and validating
//! [`crate::config::DriveConfig`], where the caller logs them and keeps the
//! compiled defaults.

use thiserror::Error;

/// Top-level error enum for the driving sandbox.
#[derive(Debug, Error)]
pub enum DriveError {
    /// `assets/drive.toml` exists but is not valid TOML for the config schema.
    #[error("failed to parse drive config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A tuning value is outside its safe operating range.
    #[error("constant '{name}' = {value} is outside safe range {safe_range}")]
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// A `[min, max)` sampling range is empty or inverted.
    #[error("range '{name}' is empty: min {min} must be below max {max}")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
}

/// Convenience alias: a `Result` using `DriveError` as the error type.
pub type DriveResult<T> = Result<T, DriveError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> DriveResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DriveError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` lies in `[0, 1]`.
pub fn validate_unit(name: &'static str, value: f32) -> DriveResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DriveError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}

/// Returns an error unless `min < max` and both are finite, so that
/// `rng.gen_range(min..max)` cannot panic.
pub fn validate_range(name: &'static str, min: f32, max: f32) -> DriveResult<()> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(DriveError::InvalidRange { name, min, max })
    }
}
