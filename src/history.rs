//! Snapshot-based undo/redo history
//!
//! The history manager keeps a full copy of the scene for every undoable
//! step. It is fed every committed scene change through
//! [`HistoryManager::on_scene_mutated`]; replaying a snapshot during
//! undo/redo produces the same kind of changes, so the manager switches to
//! [`HistoryMode::Suppressed`] for the duration of a replay and ignores
//! them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::scene::{Scene, SceneError, Shape};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors raised while replaying or decoding history
#[derive(Debug, Error)]
pub enum HistoryError {
    /// A stored snapshot could not be loaded back into the scene
    #[error("failed to restore snapshot: {0}")]
    Restore(#[from] SceneError),

    /// Snapshot JSON could not be decoded
    #[error("invalid snapshot JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// Snapshot written by an incompatible format version
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Full serialized copy of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    version: u32,
    objects: Vec<Shape>,
}

impl Snapshot {
    /// Copy the current scene content
    pub fn capture(scene: &Scene) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            objects: scene.shapes().to_vec(),
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn to_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, HistoryError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(HistoryError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Replace the scene content with this snapshot
    fn restore_into(&self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.replace_all(self.objects.clone())
    }
}

/// Whether scene changes are being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Recording,
    Suppressed,
}

/// Notification emitted by the history manager
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    /// A snapshot was pushed onto the undo stack
    Appended(Snapshot),
    Undo,
    Redo,
    Cleared,
}

/// Configuration options for the history manager
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept (unbounded when `None`)
    pub max_entries: Option<usize>,
}

#[derive(Debug)]
pub struct HistoryManager {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Scene state right before the next captured change
    pending: Snapshot,
    mode: HistoryMode,
    config: HistoryConfig,
    events: Vec<HistoryEvent>,
}

impl HistoryManager {
    /// Create a manager whose baseline is the scene's current content
    pub fn new(scene: &Scene) -> Self {
        Self::with_config(scene, HistoryConfig::default())
    }

    pub fn with_config(scene: &Scene, config: HistoryConfig) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: Snapshot::capture(scene),
            mode: HistoryMode::Recording,
            config,
            events: Vec::new(),
        }
    }

    /// Reset the pending snapshot to the scene's current content
    pub fn capture_baseline(&mut self, scene: &Scene) {
        self.pending = Snapshot::capture(scene);
    }

    /// Record a committed scene change.
    ///
    /// Ignored while suppressed. Otherwise the state before the change
    /// becomes an undo step and any redo steps are discarded.
    pub fn on_scene_mutated(&mut self, scene: &Scene) {
        if self.mode == HistoryMode::Suppressed {
            trace!("scene change during replay ignored");
            return;
        }

        let next = Snapshot::capture(scene);
        let previous = std::mem::replace(&mut self.pending, next);
        self.undo_stack.push(previous.clone());
        self.redo_stack.clear();
        self.enforce_limit();

        debug!(
            undo = self.undo_stack.len(),
            shapes = previous.len(),
            "history step recorded"
        );
        self.events.push(HistoryEvent::Appended(previous));
    }

    fn enforce_limit(&mut self) {
        if let Some(max) = self.config.max_entries {
            if self.undo_stack.len() > max {
                let excess = self.undo_stack.len() - max;
                self.undo_stack.drain(..excess);
            }
        }
    }

    /// Step back one snapshot.
    ///
    /// Returns `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> Result<bool, HistoryError> {
        let Some(snapshot) = self.undo_stack.pop() else {
            return Ok(false);
        };
        let current = Snapshot::capture(scene);
        if let Err(err) = self.replay(scene, &snapshot) {
            self.undo_stack.push(snapshot);
            return Err(err);
        }
        self.pending = snapshot;
        self.redo_stack.push(current);
        debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "undo");
        self.events.push(HistoryEvent::Undo);
        Ok(true)
    }

    /// Step forward one snapshot.
    ///
    /// Returns `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> Result<bool, HistoryError> {
        let Some(snapshot) = self.redo_stack.pop() else {
            return Ok(false);
        };
        let current = Snapshot::capture(scene);
        if let Err(err) = self.replay(scene, &snapshot) {
            self.redo_stack.push(snapshot);
            return Err(err);
        }
        self.pending = snapshot;
        self.undo_stack.push(current);
        debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "redo");
        self.events.push(HistoryEvent::Redo);
        Ok(true)
    }

    /// Load `snapshot` into the scene with recording suppressed.
    ///
    /// On error the scene is left as it was. Either way the manager ends
    /// up recording, which also ends a [`pause`](Self::pause).
    fn replay(&mut self, scene: &mut Scene, snapshot: &Snapshot) -> Result<(), HistoryError> {
        if self.mode == HistoryMode::Suppressed {
            debug!("replay ends paused recording");
        }
        self.mode = HistoryMode::Suppressed;
        let restored = snapshot.restore_into(scene);
        for _event in scene.take_events() {
            self.on_scene_mutated(scene);
        }
        self.mode = HistoryMode::Recording;
        Ok(restored?)
    }

    /// Drop all undo and redo steps
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        debug!("history cleared");
        self.events.push(HistoryEvent::Cleared);
    }

    /// Stop recording until [`resume`](Self::resume) is called.
    ///
    /// Pause/resume does not nest. An undo or redo while paused switches
    /// recording back on.
    pub fn pause(&mut self) {
        self.mode = HistoryMode::Suppressed;
    }

    /// Start recording again and record everything changed since
    /// [`pause`](Self::pause) as one step
    pub fn resume(&mut self, scene: &Scene) {
        self.mode = HistoryMode::Recording;
        self.on_scene_mutated(scene);
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    pub fn is_suppressed(&self) -> bool {
        self.mode == HistoryMode::Suppressed
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn pending(&self) -> &Snapshot {
        &self.pending
    }

    /// Drain queued history notifications
    pub fn take_events(&mut self) -> Vec<HistoryEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, HierarchyTag};

    fn scene_with_block() -> Scene {
        let mut scene = Scene::new();
        scene
            .add(Shape::new(
                HierarchyTag::Block,
                "block_1",
                Geometry::new(0.0, 0.0, 100.0, 100.0),
            ))
            .unwrap();
        scene.take_events();
        scene
    }

    fn move_block(scene: &mut Scene, history: &mut HistoryManager, left: f64) {
        scene
            .commit_geometry("block_1", Geometry::new(left, 0.0, 100.0, 100.0))
            .unwrap();
        for _ in scene.take_events() {
            history.on_scene_mutated(scene);
        }
    }

    fn block_left(scene: &Scene) -> f64 {
        scene.get("block_1").unwrap().geometry.left
    }

    #[test]
    fn test_capture_pushes_previous_state() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        let baseline = Snapshot::capture(&scene);

        move_block(&mut scene, &mut history, 50.0);

        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.pending(), &Snapshot::capture(&scene));
        assert_eq!(
            history.take_events(),
            vec![HistoryEvent::Appended(baseline)]
        );
    }

    #[test]
    fn test_undo_restores_and_redo_reapplies() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        move_block(&mut scene, &mut history, 50.0);

        assert!(history.undo(&mut scene).unwrap());
        assert_eq!(block_left(&scene), 0.0);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
        assert_eq!(history.mode(), HistoryMode::Recording);

        assert!(history.redo(&mut scene).unwrap());
        assert_eq!(block_left(&scene), 50.0);
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_replay_wave_is_not_recorded() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        move_block(&mut scene, &mut history, 50.0);
        history.undo(&mut scene).unwrap();

        assert!(!scene.has_pending_events());
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        let before = Snapshot::capture(&scene);

        assert!(!history.undo(&mut scene).unwrap());
        assert!(!history.redo(&mut scene).unwrap());
        assert_eq!(Snapshot::capture(&scene), before);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 0);
        assert!(history.take_events().is_empty());
    }

    #[test]
    fn test_new_change_after_undo_clears_redo() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        move_block(&mut scene, &mut history, 50.0);
        move_block(&mut scene, &mut history, 80.0);
        history.undo(&mut scene).unwrap();
        assert!(history.can_redo());

        move_block(&mut scene, &mut history, 10.0);
        assert!(!history.can_redo());
        assert_eq!(history.undo_len(), 2);
    }

    #[test]
    fn test_suppressed_changes_leave_stacks_alone() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        move_block(&mut scene, &mut history, 50.0);
        history.undo(&mut scene).unwrap();

        history.pause();
        move_block(&mut scene, &mut history, 20.0);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
    }

    #[test]
    fn test_resume_collapses_paused_changes() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);

        history.pause();
        move_block(&mut scene, &mut history, 10.0);
        move_block(&mut scene, &mut history, 20.0);
        move_block(&mut scene, &mut history, 30.0);
        history.resume(&scene);

        assert_eq!(history.undo_len(), 1);
        history.undo(&mut scene).unwrap();
        assert_eq!(block_left(&scene), 0.0);
    }

    #[test]
    fn test_clear_keeps_pending() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        move_block(&mut scene, &mut history, 50.0);
        history.undo(&mut scene).unwrap();
        let pending = history.pending().clone();
        history.take_events();

        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.pending(), &pending);
        assert_eq!(history.take_events(), vec![HistoryEvent::Cleared]);
    }

    #[test]
    fn test_max_entries_drops_oldest() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::with_config(
            &scene,
            HistoryConfig {
                max_entries: Some(2),
            },
        );
        for left in [10.0, 20.0, 30.0] {
            move_block(&mut scene, &mut history, left);
        }
        assert_eq!(history.undo_len(), 2);
        history.undo(&mut scene).unwrap();
        history.undo(&mut scene).unwrap();
        assert_eq!(block_left(&scene), 10.0);
        assert!(!history.undo(&mut scene).unwrap());
    }

    #[test]
    fn test_snapshot_json() {
        let scene = scene_with_block();
        let snapshot = Snapshot::capture(&scene);
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"block_1\""));
        assert!(json.contains("\"version\":1"));
        assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_snapshot_wrong_version() {
        let err = Snapshot::from_json(r#"{"version": 7, "objects": []}"#).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::UnsupportedVersion { found: 7, .. }
        ));
    }

    fn corrupt_snapshot() -> Snapshot {
        let json = r#"{"version": 1, "objects": [
            {"tag": "block", "name": "block_1", "left": 0, "top": 0, "width": 0, "height": 10}
        ]}"#;
        Snapshot::from_json(json).unwrap()
    }

    #[test]
    fn test_corrupt_snapshot_surfaces_error() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        history.undo_stack.push(corrupt_snapshot());

        let err = history.undo(&mut scene).unwrap_err();
        assert!(matches!(err, HistoryError::Restore(_)));
        assert_eq!(history.mode(), HistoryMode::Recording);
        assert_eq!(block_left(&scene), 0.0);
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.take_events(), vec![]);

        let err = history.undo(&mut scene).unwrap_err();
        assert!(matches!(err, HistoryError::Restore(_)));
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_corrupt_redo_snapshot_keeps_stacks() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        let pending = history.pending().clone();
        history.redo_stack.push(corrupt_snapshot());

        let err = history.redo(&mut scene).unwrap_err();
        assert!(matches!(err, HistoryError::Restore(_)));
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
        assert_eq!(history.pending(), &pending);
        assert_eq!(block_left(&scene), 0.0);
    }

    #[test]
    fn test_undo_while_paused_resumes_recording() {
        let mut scene = scene_with_block();
        let mut history = HistoryManager::new(&scene);
        move_block(&mut scene, &mut history, 50.0);

        history.pause();
        assert!(history.undo(&mut scene).unwrap());
        assert_eq!(history.mode(), HistoryMode::Recording);
        assert_eq!(block_left(&scene), 0.0);
    }
}
