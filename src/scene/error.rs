//! Error types for scene mutation

use thiserror::Error;

/// Errors that can occur when changing the scene's contents
#[derive(Debug, Error)]
pub enum SceneError {
    /// A shape with this name is already on the canvas
    #[error("duplicate shape name '{name}'")]
    DuplicateName { name: String },

    /// No shape with this name exists
    #[error("unknown shape '{name}'")]
    UnknownShape { name: String },

    /// Geometry that cannot be committed
    #[error("invalid geometry for '{name}': {reason}")]
    InvalidGeometry { name: String, reason: String },
}

impl SceneError {
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownShape { name: name.into() }
    }

    pub fn invalid_geometry(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
