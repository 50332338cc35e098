//! Editor controller
//!
//! Connects pointer gestures to the resize validator and committed scene
//! changes to the history manager. Gesture updates only touch the
//! controller's proposal; nothing reaches the scene (or the history) until
//! the gesture finishes.

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::fixture::{Fixture, FixtureError};
use crate::geometry::BoundingBox;
use crate::history::{HistoryEvent, HistoryManager, Snapshot};
use crate::resize::{ResizeDecision, ResizeValidator, RevertReason};
use crate::scene::{Geometry, HierarchyTag, Scene, SceneError, Shape};

/// What a gesture does to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Scale,
    Skew,
}

/// A drag in progress on one shape
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub name: String,
    pub kind: GestureKind,
    /// Committed geometry when the gesture started
    pub origin: Geometry,
    /// Latest proposed geometry
    pub proposed: Geometry,
}

/// Result of finishing a gesture
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// The proposed geometry was committed
    Committed,
    /// A block resize was committed with snapped dimensions
    Snapped { width: f64, left: f64 },
    /// The committed geometry was left as it was before the gesture
    Reverted(RevertReason),
    /// The gesture ended where it started
    Unchanged,
}

/// Shape names grouped by hierarchy class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hierarchy {
    pub blocks: Vec<String>,
    pub shelves: Vec<String>,
    pub columns: Vec<String>,
    pub stacked_columns: Vec<String>,
}

#[derive(Debug)]
pub struct Editor {
    scene: Scene,
    history: HistoryManager,
    config: EditorConfig,
    selection: Vec<String>,
    gesture: Option<Gesture>,
}

impl Editor {
    /// Start editing `scene`; its current content is the history baseline
    pub fn new(mut scene: Scene, config: EditorConfig) -> Self {
        scene.take_events();
        let history = HistoryManager::with_config(&scene, config.history.clone());
        Self {
            scene,
            history,
            config,
            selection: Vec::new(),
            gesture: None,
        }
    }

    pub fn from_fixture(fixture: &Fixture, config: EditorConfig) -> Result<Self, FixtureError> {
        let scene = fixture.build_scene(&config)?;
        info!(shapes = scene.len(), "fixture loaded");
        Ok(Self::new(scene, config))
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.scene)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Shape> {
        self.scene.index().blocks()
    }

    pub fn shelves(&self) -> impl Iterator<Item = &Shape> {
        self.scene.index().shelves()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Shape> {
        self.scene.index().columns()
    }

    pub fn stacked_columns(&self) -> impl Iterator<Item = &Shape> {
        self.scene.index().stacked_columns()
    }

    /// All shape names grouped by class
    pub fn hierarchy(&self) -> Hierarchy {
        let index = self.scene.index();
        let names = |tag| {
            index
                .names(tag)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        Hierarchy {
            blocks: names(HierarchyTag::Block),
            shelves: names(HierarchyTag::Shelf),
            columns: names(HierarchyTag::Column),
            stacked_columns: names(HierarchyTag::StackedColumn),
        }
    }

    /// Check a proposed block box against the committed scene
    pub fn evaluate_block_resize(&self, candidate: &BoundingBox, block_name: &str) -> ResizeDecision {
        ResizeValidator::new(self.scene.index(), self.config.block_padding)
            .evaluate_block_resize(candidate, block_name)
    }

    /// Forward queued scene changes to the history manager
    fn dispatch_scene_events(&mut self) {
        for event in self.scene.take_events() {
            trace!(targets = ?event.targets(), "scene changed");
            self.history.on_scene_mutated(&self.scene);
        }
    }

    pub fn add_shape(&mut self, shape: Shape) -> Result<(), EditorError> {
        self.scene.add(shape)?;
        self.dispatch_scene_events();
        Ok(())
    }

    // ── Gestures ──────────────────────────────────────────────────────

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn begin_gesture(&mut self, name: &str, kind: GestureKind) -> Result<(), EditorError> {
        if let Some(gesture) = &self.gesture {
            return Err(EditorError::GestureInProgress {
                name: gesture.name.clone(),
            });
        }
        let shape = self.scene.get(name).ok_or_else(|| SceneError::unknown(name))?;
        if kind == GestureKind::Scale
            && self.selection.len() > 1
            && self.selection.iter().any(|selected| selected == name)
        {
            return Err(EditorError::SelectionLocked {
                name: name.to_string(),
                count: self.selection.len(),
            });
        }
        self.gesture = Some(Gesture {
            name: name.to_string(),
            kind,
            origin: shape.geometry,
            proposed: shape.geometry,
        });
        Ok(())
    }

    /// Record an intermediate position of the gesture.
    ///
    /// Lock flags of the target pin the affected coordinates to their
    /// starting values.
    pub fn update_gesture(&mut self, proposed: Geometry) -> Result<(), EditorError> {
        let gesture = self.gesture.as_mut().ok_or(EditorError::NoGesture)?;
        let attributes = self
            .scene
            .get(&gesture.name)
            .map(|shape| shape.attributes)
            .ok_or_else(|| SceneError::unknown(gesture.name.clone()))?;

        let mut geometry = proposed;
        if attributes.lock_movement_x {
            geometry.left = gesture.origin.left;
        }
        if attributes.lock_movement_y {
            geometry.top = gesture.origin.top;
        }
        if attributes.lock_scaling_y {
            geometry.height = gesture.origin.height;
            geometry.scale_y = gesture.origin.scale_y;
        }
        gesture.proposed = geometry;
        Ok(())
    }

    /// Abandon the gesture; the committed geometry never changed
    pub fn cancel_gesture(&mut self) -> Option<Gesture> {
        self.gesture.take()
    }

    /// Commit the gesture's final geometry.
    ///
    /// Resizing a block, whatever the gesture kind, goes through the
    /// resize validator first; a rejected resize leaves the scene exactly
    /// as it was.
    pub fn finish_gesture(&mut self) -> Result<GestureOutcome, EditorError> {
        let gesture = self.gesture.take().ok_or(EditorError::NoGesture)?;
        if gesture.proposed == gesture.origin {
            return Ok(GestureOutcome::Unchanged);
        }

        let tag = self
            .scene
            .get(&gesture.name)
            .map(|shape| shape.tag)
            .ok_or_else(|| SceneError::unknown(gesture.name.clone()))?;

        let candidate = gesture.proposed.bounds();
        let original = gesture.origin.bounds();
        let resized = candidate.width != original.width || candidate.height != original.height;

        let outcome = if tag == HierarchyTag::Block && resized {
            self.commit_block_resize(&gesture, candidate)?
        } else {
            self.commit(&gesture.name, gesture.kind, gesture.proposed)?;
            GestureOutcome::Committed
        };

        self.dispatch_scene_events();
        Ok(outcome)
    }

    /// Skews end as a skewing change, everything else as a modification
    fn commit(
        &mut self,
        name: &str,
        kind: GestureKind,
        geometry: Geometry,
    ) -> Result<(), SceneError> {
        match kind {
            GestureKind::Skew => self.scene.commit_skew(name, geometry),
            GestureKind::Move | GestureKind::Scale => self.scene.commit_geometry(name, geometry),
        }
    }

    fn commit_block_resize(
        &mut self,
        gesture: &Gesture,
        candidate: BoundingBox,
    ) -> Result<GestureOutcome, EditorError> {
        let name = gesture.name.as_str();
        match self.evaluate_block_resize(&candidate, name) {
            ResizeDecision::Revert(reason) => Ok(GestureOutcome::Reverted(reason)),
            ResizeDecision::Snap { width, left } => {
                let snapped = Geometry::new(left, candidate.top, width, candidate.height);
                self.commit(name, gesture.kind, snapped)?;
                debug!(block = name, width, left, "block snapped");
                Ok(GestureOutcome::Snapped { width, left })
            }
            ResizeDecision::Accept => {
                self.commit(name, gesture.kind, gesture.proposed)?;
                Ok(GestureOutcome::Committed)
            }
        }
    }

    // ── Selection ─────────────────────────────────────────────────────

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn select<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), EditorError> {
        let mut selection = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let shape = self.scene.get(name).ok_or_else(|| SceneError::unknown(name))?;
            if !shape.attributes.selectable {
                return Err(EditorError::NotSelectable {
                    name: name.to_string(),
                });
            }
            if !selection.iter().any(|selected: &String| selected == name) {
                selection.push(name.to_string());
            }
        }
        self.selection = selection;
        Ok(())
    }

    /// Remove every selected shape as a single undoable step
    pub fn delete_selected(&mut self) -> Result<usize, EditorError> {
        if let Some(gesture) = &self.gesture {
            return Err(EditorError::GestureInProgress {
                name: gesture.name.clone(),
            });
        }
        let selection = std::mem::take(&mut self.selection);
        let removed = self.scene.remove_many(&selection);
        self.dispatch_scene_events();
        Ok(removed.len())
    }

    // ── History ───────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.gesture = None;
        let changed = self.history.undo(&mut self.scene)?;
        self.retain_live_selection();
        Ok(changed)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.gesture = None;
        let changed = self.history.redo(&mut self.scene)?;
        self.retain_live_selection();
        Ok(changed)
    }

    /// Shapes are replaced wholesale by a replay; keep only names that
    /// still resolve.
    fn retain_live_selection(&mut self) {
        let scene = &self.scene;
        self.selection.retain(|name| scene.contains(name));
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn pause_history(&mut self) {
        self.history.pause();
    }

    pub fn resume_history(&mut self) {
        self.dispatch_scene_events();
        self.history.resume(&self.scene);
    }

    pub fn take_history_events(&mut self) -> Vec<HistoryEvent> {
        self.history.take_events()
    }
}
