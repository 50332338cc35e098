//! Shape records held by the scene

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

use super::error::SceneError;

/// Hierarchy class of a shape.
///
/// Nesting between classes is never stored; it is recomputed from
/// geometry whenever a query needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyTag {
    Block,
    Shelf,
    Column,
    StackedColumn,
}

impl HierarchyTag {
    pub fn all() -> &'static [HierarchyTag] {
        &[Self::Block, Self::Shelf, Self::Column, Self::StackedColumn]
    }
}

impl fmt::Display for HierarchyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyTag::Block => write!(f, "block"),
            HierarchyTag::Shelf => write!(f, "shelf"),
            HierarchyTag::Column => write!(f, "column"),
            HierarchyTag::StackedColumn => write!(f, "stacked column"),
        }
    }
}

/// Display attributes that travel with a shape through history snapshots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayAttributes {
    pub selectable: bool,
    pub padding: f64,
    pub lock_scaling_y: bool,
    pub lock_movement_x: bool,
    pub lock_movement_y: bool,
}

impl Default for DisplayAttributes {
    fn default() -> Self {
        Self {
            selectable: true,
            padding: 0.0,
            lock_scaling_y: false,
            lock_movement_x: false,
            lock_movement_y: false,
        }
    }
}

/// Committed geometry of a shape.
///
/// A resize gesture arrives as a scale transform; `width` and `height`
/// are the unscaled dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Geometry {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Set the scale factors
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Extent on the canvas, scale applied
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.left,
            self.top,
            self.width * self.scale_x,
            self.height * self.scale_y,
        )
    }

    /// Take a bounding box as literal dimensions with unit scale
    pub fn from_bounds(bounds: BoundingBox) -> Self {
        Self::new(bounds.left, bounds.top, bounds.width, bounds.height)
    }

    /// Reject non-finite or non-positive dimensions
    pub fn validate(&self, name: &str) -> Result<(), SceneError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !self.left.is_finite() || !self.top.is_finite() {
            return Err(SceneError::invalid_geometry(name, "position must be finite"));
        }
        if !positive(self.width) || !positive(self.height) {
            return Err(SceneError::invalid_geometry(
                name,
                format!(
                    "width and height must be positive (got {}x{})",
                    self.width, self.height
                ),
            ));
        }
        if !positive(self.scale_x) || !positive(self.scale_y) {
            return Err(SceneError::invalid_geometry(
                name,
                format!(
                    "scale factors must be positive (got {}, {})",
                    self.scale_x, self.scale_y
                ),
            ));
        }
        Ok(())
    }
}

/// A named rectangle on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub tag: HierarchyTag,
    pub name: String,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default)]
    pub attributes: DisplayAttributes,
}

impl Shape {
    pub fn new(tag: HierarchyTag, name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            tag,
            name: name.into(),
            geometry,
            attributes: DisplayAttributes::default(),
        }
    }

    /// Set the display attributes
    pub fn with_attributes(mut self, attributes: DisplayAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn bounds(&self) -> BoundingBox {
        self.geometry.bounds()
    }

    pub fn is(&self, tag: HierarchyTag) -> bool {
        self.tag == tag
    }
}
