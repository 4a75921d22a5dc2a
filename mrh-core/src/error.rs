//! Error types for the MRH model

use thiserror::Error;

/// Errors raised while building or mutating the visualization model
#[derive(Debug, Error)]
pub enum MrhError {
    #[error("Invalid color {input:?}: {reason}")]
    InvalidColor { input: String, reason: String },

    #[error("Invalid ramp range: {0}")]
    InvalidRange(String),

    #[error("Unknown chromosome: {0}")]
    UnknownChromosome(String),

    #[error("Invalid header for {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Invalid render config: {0}")]
    InvalidRenderConfig(String),

    #[error("Invalid value for field {field}: {value:?}")]
    InvalidField { field: String, value: String },

    #[error("Missing field: {0}")]
    MissingField(String),
}

impl MrhError {
    pub fn invalid_color<S: Into<String>, R: Into<String>>(input: S, reason: R) -> Self {
        Self::InvalidColor {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_field<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }
}

pub type MrhResult<T> = Result<T, MrhError>;
