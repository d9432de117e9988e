use thiserror::Error;

/// Rejected simulation parameters.
///
/// Steps never fail; every runtime condition (missing audio, zero distances,
/// full buffers) is absorbed by the simulators. These errors only surface when
/// a params struct is validated before a simulator is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("{name} must be a probability in [0, 1], got {value}")]
    NotProbability { name: &'static str, value: f32 },
    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        name: &'static str,
        value: usize,
        min: usize,
    },
    #[error("{name} = {value} exceeds capacity {capacity}")]
    OverCapacity {
        name: &'static str,
        value: usize,
        capacity: usize,
    },
}

pub(crate) fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

pub(crate) fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

pub(crate) fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

pub(crate) fn probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotProbability { name, value })
    }
}

pub(crate) fn at_least(name: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::TooSmall { name, value, min })
    }
}

pub(crate) fn within(name: &'static str, value: usize, capacity: usize) -> Result<(), ConfigError> {
    if value <= capacity {
        Ok(())
    } else {
        Err(ConfigError::OverCapacity {
            name,
            value,
            capacity,
        })
    }
}
