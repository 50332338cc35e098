//! Axis-aligned geometry helpers

/// True iff `low < point < high`
pub fn is_between_exclusive(point: f64, high: f64, low: f64) -> bool {
    low < point && point < high
}

/// A bounding box in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Horizontal span of this box after applying the margin convention
    pub fn padded_span(&self, padding: f64) -> PaddedSpan {
        PaddedSpan::of(self, padding)
    }
}

/// Horizontal extent of a box used for overlap tests.
///
/// The left edge is shifted in by one padding unit and the right edge sits
/// three padding units short of `left + width`, so rectangles that merely
/// share an edge never register as overlapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddedSpan {
    pub left: f64,
    pub right: f64,
}

impl PaddedSpan {
    pub fn of(bounds: &BoundingBox, padding: f64) -> Self {
        let left = bounds.left + padding;
        Self {
            left,
            right: left + bounds.width - 3.0 * padding,
        }
    }

    /// Check whether either edge of `other` falls strictly inside this span
    pub fn contains_edge_of(&self, other: &PaddedSpan) -> bool {
        is_between_exclusive(other.left, self.right, self.left)
            || is_between_exclusive(other.right, self.right, self.left)
    }

    /// Check whether the two spans cut into each other from either side
    pub fn crosses(&self, other: &PaddedSpan) -> bool {
        self.contains_edge_of(other) || other.contains_edge_of(self)
    }
}
