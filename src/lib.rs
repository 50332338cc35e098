//! Planogram Editor - editing core for nested planogram rectangles
//!
//! A planogram is flattened into a scene of named rectangles: blocks,
//! shelves, columns and stacked columns. This library keeps that scene,
//! validates block resizes against the shelves underneath, and records
//! full-scene snapshots for undo/redo.
//!
//! # Example
//!
//! ```rust
//! use planogram_editor::{Editor, EditorConfig, Geometry, GestureKind, GestureOutcome};
//!
//! let fixture = r#"{"data": {"blocks": [{
//!     "blockBoundingBox": {"x": 0, "y": 0, "w": 100, "h": 100},
//!     "facings": {"shelves": [
//!         {"shelfBoundingBox": {"x": 10, "y": 0, "w": 80, "h": 50}},
//!         {"shelfBoundingBox": {"x": 95, "y": 0, "w": 90, "h": 50}}
//!     ]}
//! }]}}"#;
//!
//! let mut editor = planogram_editor::load(fixture, EditorConfig::default()).unwrap();
//! editor.begin_gesture("block_1", GestureKind::Scale).unwrap();
//! editor
//!     .update_gesture(Geometry::new(0.0, 0.0, 100.0, 100.0).with_scale(2.0, 1.0))
//!     .unwrap();
//!
//! let outcome = editor.finish_gesture().unwrap();
//! assert_eq!(outcome, GestureOutcome::Snapped { width: 170.0, left: 10.0 });
//!
//! editor.undo().unwrap();
//! assert_eq!(editor.scene().get("block_1").unwrap().geometry.width, 100.0);
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod fixture;
pub mod geometry;
pub mod history;
pub mod resize;
pub mod scene;

pub use config::{ConfigError, EditorConfig, NamePrefixes};
pub use editor::{Editor, Gesture, GestureKind, GestureOutcome, Hierarchy};
pub use error::EditorError;
pub use fixture::{Fixture, FixtureError};
pub use geometry::{is_between_exclusive, BoundingBox};
pub use history::{HistoryEvent, HistoryManager, HistoryMode, Snapshot};
pub use resize::{evaluate_block_resize, ResizeDecision, RevertReason};
pub use scene::{Geometry, HierarchyTag, Scene, SceneEvent, Shape};

/// Parse a layout fixture and open an editor on it
pub fn load(fixture_json: &str, config: EditorConfig) -> Result<Editor, FixtureError> {
    let fixture = Fixture::from_json(fixture_json)?;
    Editor::from_fixture(&fixture, config)
}
