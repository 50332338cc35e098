//! The canvas scene: an insertion-ordered set of named rectangles
//!
//! All writes go through commit operations, each of which queues a
//! [`SceneEvent`]. Whoever drives the scene drains those events with
//! [`Scene::take_events`] and forwards them to interested parties
//! (the history manager in particular).

pub mod error;
pub mod index;
pub mod shape;

pub use error::SceneError;
pub use index::SceneIndex;
pub use shape::{DisplayAttributes, Geometry, HierarchyTag, Shape};

use std::collections::HashSet;

/// Change notification queued by a committed scene mutation
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Added(String),
    Removed(String),
    Modified(String),
    Skewing(String),
    BulkRemoved(Vec<String>),
}

impl SceneEvent {
    /// Names of the shapes affected by this event
    pub fn targets(&self) -> Vec<&str> {
        match self {
            SceneEvent::Added(name)
            | SceneEvent::Removed(name)
            | SceneEvent::Modified(name)
            | SceneEvent::Skewing(name) => vec![name.as_str()],
            SceneEvent::BulkRemoved(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
    events: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn index(&self) -> SceneIndex<'_> {
        SceneIndex::new(&self.shapes)
    }

    pub fn get(&self, name: &str) -> Option<&Shape> {
        self.index().find_by_name(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn position(&self, name: &str) -> Result<usize, SceneError> {
        self.shapes
            .iter()
            .position(|shape| shape.name == name)
            .ok_or_else(|| SceneError::unknown(name))
    }

    /// Append a shape
    pub fn add(&mut self, shape: Shape) -> Result<(), SceneError> {
        shape.geometry.validate(&shape.name)?;
        if self.contains(&shape.name) {
            return Err(SceneError::duplicate(shape.name));
        }
        self.events.push(SceneEvent::Added(shape.name.clone()));
        self.shapes.push(shape);
        Ok(())
    }

    /// Remove a single shape
    pub fn remove(&mut self, name: &str) -> Result<Shape, SceneError> {
        let pos = self.position(name)?;
        let shape = self.shapes.remove(pos);
        self.events.push(SceneEvent::Removed(shape.name.clone()));
        Ok(shape)
    }

    /// Remove several shapes as one change.
    ///
    /// Unknown names are skipped. A single `BulkRemoved` event is queued
    /// when at least one shape was removed.
    pub fn remove_many<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<Shape> {
        let mut removed = Vec::new();
        for name in names {
            if let Ok(pos) = self.position(name.as_ref()) {
                removed.push(self.shapes.remove(pos));
            }
        }
        if !removed.is_empty() {
            self.events.push(SceneEvent::BulkRemoved(
                removed.iter().map(|s| s.name.clone()).collect(),
            ));
        }
        removed
    }

    /// Commit the terminal geometry of a move or resize
    pub fn commit_geometry(&mut self, name: &str, geometry: Geometry) -> Result<(), SceneError> {
        self.set_geometry(name, geometry)?;
        self.events.push(SceneEvent::Modified(name.to_string()));
        Ok(())
    }

    /// Commit the terminal geometry of a skew
    pub fn commit_skew(&mut self, name: &str, geometry: Geometry) -> Result<(), SceneError> {
        self.set_geometry(name, geometry)?;
        self.events.push(SceneEvent::Skewing(name.to_string()));
        Ok(())
    }

    fn set_geometry(&mut self, name: &str, geometry: Geometry) -> Result<(), SceneError> {
        geometry.validate(name)?;
        let pos = self.position(name)?;
        self.shapes[pos].geometry = geometry;
        Ok(())
    }

    /// Replace the whole scene content.
    ///
    /// The incoming shapes are validated first; on error the scene is left
    /// untouched. On success a `Removed` event is queued for every old
    /// shape followed by an `Added` event for every new one.
    pub fn replace_all(&mut self, shapes: Vec<Shape>) -> Result<(), SceneError> {
        {
            let mut seen = HashSet::new();
            for shape in &shapes {
                shape.geometry.validate(&shape.name)?;
                if !seen.insert(shape.name.as_str()) {
                    return Err(SceneError::duplicate(shape.name.clone()));
                }
            }
        }

        let old = std::mem::replace(&mut self.shapes, shapes);
        self.events
            .extend(old.into_iter().map(|shape| SceneEvent::Removed(shape.name)));
        let added: Vec<SceneEvent> = self
            .shapes
            .iter()
            .map(|shape| SceneEvent::Added(shape.name.clone()))
            .collect();
        self.events.extend(added);
        Ok(())
    }

    /// Drain queued change notifications
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}
