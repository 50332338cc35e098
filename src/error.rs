//! Error types for editor operations

use thiserror::Error;

use crate::history::HistoryError;
use crate::scene::SceneError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// Gesture update or finish without a gesture in progress
    #[error("no gesture in progress")]
    NoGesture,

    #[error("a gesture on '{name}' is already in progress")]
    GestureInProgress { name: String },

    /// Multi-shape selections may be moved but not scaled
    #[error("cannot scale '{name}' while {count} shapes are selected")]
    SelectionLocked { name: String, count: usize },

    #[error("shape '{name}' is not selectable")]
    NotSelectable { name: String },
}

impl EditorError {
    /// True for errors that mean history state can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(self, EditorError::History(_))
    }
}
