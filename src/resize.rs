//! Constraint checks for resizing a block.
//!
//! A block may only be resized when it stays clear of its neighbouring
//! blocks and the shelves underneath its new footprint form a regular grid:
//! every horizontal slot holds the same number of shelves and the shelf
//! heights line up row by row. When the checks pass, the block snaps to the
//! combined width of the shelf slots it covers.
//!
//! Nesting is recomputed from horizontal spans on every call; no parent
//! links exist between blocks and shelves.

use std::fmt;

use tracing::{debug, warn};

use crate::geometry::{BoundingBox, PaddedSpan};
use crate::scene::{HierarchyTag, SceneIndex, Shape};

/// Row height differences up to this value are ignored
const MODERATE_DIFFERENCE: f64 = 5.0;

/// Row height differences above this value count as large
const LARGE_DIFFERENCE: f64 = 10.0;

/// How many moderate (or large) row differences are tolerated
const MAX_DIVERGENT_ROWS: usize = 2;

/// Why a resize was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum RevertReason {
    /// The new footprint reaches into another block
    CrossesBlock { neighbor: String },
    /// Shelf slots under the block hold different numbers of shelves
    UnequalShelfCounts { counts: Vec<usize> },
    /// Shelf heights differ too much between slots
    DivergentShelfHeights { moderate: usize, large: usize },
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertReason::CrossesBlock { neighbor } => write!(
                f,
                "make sure you are not going into another block ('{}')",
                neighbor
            ),
            RevertReason::UnequalShelfCounts { counts } => write!(
                f,
                "there are different numbers of shelves per column ({}); make them equal before expanding",
                counts
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            RevertReason::DivergentShelfHeights { moderate, large } => write!(
                f,
                "shelves have considerable difference in height ({} moderate, {} large)",
                moderate, large
            ),
        }
    }
}

/// Outcome of evaluating a proposed block resize
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeDecision {
    /// No constraint applies; commit the proposed geometry as is
    Accept,
    /// Commit with this width and left edge, scale reset to 1
    Snap { width: f64, left: f64 },
    /// Leave the committed geometry unchanged
    Revert(RevertReason),
}

impl ResizeDecision {
    pub fn is_revert(&self) -> bool {
        matches!(self, ResizeDecision::Revert(_))
    }
}

/// Shelves sharing one horizontal position, top to bottom in scene order
#[derive(Debug)]
struct ShelfSlot {
    padded_left: f64,
    width: f64,
    heights: Vec<f64>,
}

/// Evaluates block resizes against the committed scene
#[derive(Debug, Clone, Copy)]
pub struct ResizeValidator<'a> {
    index: SceneIndex<'a>,
    padding: f64,
}

impl<'a> ResizeValidator<'a> {
    pub fn new(index: SceneIndex<'a>, padding: f64) -> Self {
        Self { index, padding }
    }

    /// Decide whether `block_name` may take the `candidate` bounds.
    ///
    /// Shapes that exist but are not blocks are never constrained.
    pub fn evaluate_block_resize(&self, candidate: &BoundingBox, block_name: &str) -> ResizeDecision {
        if let Some(shape) = self.index.find_by_name(block_name) {
            if !shape.is(HierarchyTag::Block) {
                return ResizeDecision::Accept;
            }
        }

        let span = candidate.padded_span(self.padding);

        if let Some(neighbor) = self.crossed_block(&span, block_name) {
            return self.revert(
                block_name,
                RevertReason::CrossesBlock {
                    neighbor: neighbor.name.clone(),
                },
            );
        }

        let shelves = self.shelves_within(&span, block_name);
        let Some(first_left) = shelves.first().map(|shelf| shelf.bounds().left) else {
            debug!(block = block_name, "no shelves under resized block");
            return ResizeDecision::Accept;
        };

        let slots = self.group_into_slots(&shelves);
        let counts: Vec<usize> = slots.iter().map(|slot| slot.heights.len()).collect();
        if counts.windows(2).any(|pair| pair[0] != pair[1]) {
            return self.revert(block_name, RevertReason::UnequalShelfCounts { counts });
        }

        let (moderate, large) = count_row_differences(&slots);
        if moderate > MAX_DIVERGENT_ROWS || large > MAX_DIVERGENT_ROWS {
            return self.revert(
                block_name,
                RevertReason::DivergentShelfHeights { moderate, large },
            );
        }

        let width: f64 = slots.iter().map(|slot| slot.width).sum();
        debug!(
            block = block_name,
            slots = slots.len(),
            width,
            left = first_left,
            "snapping block to shelf slots"
        );
        ResizeDecision::Snap {
            width,
            left: first_left,
        }
    }

    /// First other block whose span cuts into `span`, or the reverse
    fn crossed_block(&self, span: &PaddedSpan, block_name: &str) -> Option<&'a Shape> {
        self.index
            .blocks()
            .filter(|block| block.name != block_name)
            .find(|block| span.crosses(&block.bounds().padded_span(self.padding)))
    }

    /// Shelves with an edge strictly inside `span`
    fn shelves_within(&self, span: &PaddedSpan, block_name: &str) -> Vec<&'a Shape> {
        self.index
            .shelves()
            .filter(|shelf| shelf.name != block_name)
            .filter(|shelf| span.contains_edge_of(&shelf.bounds().padded_span(self.padding)))
            .collect()
    }

    fn group_into_slots(&self, shelves: &[&Shape]) -> Vec<ShelfSlot> {
        let mut slots: Vec<ShelfSlot> = Vec::new();
        for shelf in shelves {
            let bounds = shelf.bounds();
            let padded_left = bounds.left + self.padding;
            match slots.iter_mut().find(|slot| slot.padded_left == padded_left) {
                Some(slot) => slot.heights.push(bounds.height),
                None => slots.push(ShelfSlot {
                    padded_left,
                    width: bounds.width,
                    heights: vec![bounds.height],
                }),
            }
        }
        slots
    }

    fn revert(&self, block_name: &str, reason: RevertReason) -> ResizeDecision {
        warn!(block = block_name, "resize rejected: {}", reason);
        ResizeDecision::Revert(reason)
    }
}

/// Compare each row of the first slot against the same row of every other
/// slot, returning (moderate, large) difference counts.
fn count_row_differences(slots: &[ShelfSlot]) -> (usize, usize) {
    let Some((first, rest)) = slots.split_first() else {
        return (0, 0);
    };
    let mut moderate = 0;
    let mut large = 0;
    for (row, reference) in first.heights.iter().enumerate() {
        for slot in rest {
            let Some(height) = slot.heights.get(row) else {
                continue;
            };
            let diff = (reference - height).abs();
            if diff > LARGE_DIFFERENCE {
                large += 1;
            } else if diff > MODERATE_DIFFERENCE {
                moderate += 1;
            }
        }
    }
    (moderate, large)
}

/// Evaluate a block resize against a scene index
pub fn evaluate_block_resize(
    index: SceneIndex<'_>,
    candidate: &BoundingBox,
    block_name: &str,
    padding: f64,
) -> ResizeDecision {
    ResizeValidator::new(index, padding).evaluate_block_resize(candidate, block_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Geometry;

    const PADDING: f64 = 5.0;

    fn rect(tag: HierarchyTag, name: &str, left: f64, top: f64, width: f64, height: f64) -> Shape {
        Shape::new(tag, name, Geometry::new(left, top, width, height))
    }

    fn evaluate(shapes: &[Shape], candidate: BoundingBox, name: &str) -> ResizeDecision {
        evaluate_block_resize(SceneIndex::new(shapes), &candidate, name, PADDING)
    }

    #[test]
    fn test_crossing_neighbor_block_reverts() {
        let shapes = vec![
            rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 200.0),
            rect(HierarchyTag::Block, "block_2", 100.0, 0.0, 100.0, 200.0),
        ];
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 150.0, 200.0), "block_1");
        assert_eq!(
            decision,
            ResizeDecision::Revert(RevertReason::CrossesBlock {
                neighbor: "block_2".to_string()
            })
        );
    }

    #[test]
    fn test_block_swallowed_by_candidate_reverts() {
        let shapes = vec![
            rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 200.0),
            rect(HierarchyTag::Block, "block_2", 120.0, 0.0, 40.0, 200.0),
        ];
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 400.0, 200.0), "block_1");
        assert!(decision.is_revert());
    }

    #[test]
    fn test_resize_into_gap_without_shelves_accepts() {
        let shapes = vec![
            rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 200.0),
            rect(HierarchyTag::Block, "block_2", 300.0, 0.0, 100.0, 200.0),
        ];
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 150.0, 200.0), "block_1");
        assert_eq!(decision, ResizeDecision::Accept);
    }

    #[test]
    fn test_snaps_to_sum_of_slot_widths() {
        let shapes = vec![
            rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 200.0),
            rect(HierarchyTag::Shelf, "shelf_1", 10.0, 0.0, 80.0, 50.0),
            rect(HierarchyTag::Shelf, "shelf_2", 95.0, 0.0, 90.0, 50.0),
        ];
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 200.0, 200.0), "block_1");
        assert_eq!(
            decision,
            ResizeDecision::Snap {
                width: 170.0,
                left: 10.0
            }
        );
    }

    #[test]
    fn test_stacked_slot_counts_width_once() {
        let shapes = vec![
            rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 200.0),
            rect(HierarchyTag::Shelf, "shelf_1", 10.0, 0.0, 80.0, 50.0),
            rect(HierarchyTag::Shelf, "shelf_2", 10.0, 50.0, 80.0, 50.0),
            rect(HierarchyTag::Shelf, "shelf_3", 95.0, 0.0, 90.0, 52.0),
            rect(HierarchyTag::Shelf, "shelf_4", 95.0, 52.0, 90.0, 48.0),
        ];
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 200.0, 200.0), "block_1");
        assert_eq!(
            decision,
            ResizeDecision::Snap {
                width: 170.0,
                left: 10.0
            }
        );
    }

    #[test]
    fn test_unequal_shelf_counts_revert() {
        let shapes = vec![
            rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 200.0),
            rect(HierarchyTag::Shelf, "shelf_1", 10.0, 0.0, 80.0, 50.0),
            rect(HierarchyTag::Shelf, "shelf_2", 10.0, 50.0, 80.0, 50.0),
            rect(HierarchyTag::Shelf, "shelf_3", 95.0, 0.0, 90.0, 100.0),
        ];
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 200.0, 200.0), "block_1");
        assert_eq!(
            decision,
            ResizeDecision::Revert(RevertReason::UnequalShelfCounts { counts: vec![2, 1] })
        );
    }

    #[test]
    fn test_large_height_differences_revert() {
        let mut shapes = vec![rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 300.0)];
        for row in 0..3 {
            let top = row as f64 * 60.0;
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_a{}", row), 10.0, top, 80.0, 50.0));
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_b{}", row), 95.0, top, 90.0, 62.0));
        }
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 200.0, 300.0), "block_1");
        assert_eq!(
            decision,
            ResizeDecision::Revert(RevertReason::DivergentShelfHeights {
                moderate: 0,
                large: 3
            })
        );
    }

    #[test]
    fn test_two_large_differences_tolerated() {
        let mut shapes = vec![rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 300.0)];
        for row in 0..3 {
            let top = row as f64 * 60.0;
            let other = if row < 2 { 38.0 } else { 50.0 };
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_a{}", row), 10.0, top, 80.0, 50.0));
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_b{}", row), 95.0, top, 90.0, other));
        }
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 200.0, 300.0), "block_1");
        assert!(matches!(decision, ResizeDecision::Snap { .. }));
    }

    #[test]
    fn test_small_differences_are_ignored() {
        let mut shapes = vec![rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 400.0)];
        for row in 0..5 {
            let top = row as f64 * 60.0;
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_a{}", row), 10.0, top, 80.0, 50.0));
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_b{}", row), 95.0, top, 90.0, 45.0));
        }
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 200.0, 400.0), "block_1");
        assert!(matches!(decision, ResizeDecision::Snap { .. }));
    }

    #[test]
    fn test_moderate_differences_use_magnitude() {
        let mut shapes = vec![rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 400.0)];
        for row in 0..3 {
            let top = row as f64 * 70.0;
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_a{}", row), 10.0, top, 80.0, 50.0));
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_b{}", row), 95.0, top, 90.0, 58.0));
        }
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 200.0, 400.0), "block_1");
        assert_eq!(
            decision,
            ResizeDecision::Revert(RevertReason::DivergentShelfHeights {
                moderate: 3,
                large: 0
            })
        );
    }

    fn two_slot_rows(rows: usize, left_height: f64, right_height: f64) -> Vec<Shape> {
        let mut shapes = vec![rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 400.0)];
        for row in 0..rows {
            let top = row as f64 * 70.0;
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_a{}", row), 10.0, top, 80.0, left_height));
            shapes.push(rect(HierarchyTag::Shelf, &format!("shelf_b{}", row), 95.0, top, 90.0, right_height));
        }
        shapes
    }

    #[test]
    fn test_difference_of_exactly_ten_is_moderate() {
        let shapes = two_slot_rows(3, 50.0, 60.0);
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 200.0, 400.0), "block_1");
        assert_eq!(
            decision,
            ResizeDecision::Revert(RevertReason::DivergentShelfHeights {
                moderate: 3,
                large: 0
            })
        );
    }

    #[test]
    fn test_difference_of_exactly_five_is_ignored() {
        let shapes = two_slot_rows(3, 50.0, 55.0);
        let decision = evaluate(&shapes, BoundingBox::new(0.0, 0.0, 200.0, 400.0), "block_1");
        assert_eq!(
            decision,
            ResizeDecision::Snap {
                width: 170.0,
                left: 10.0
            }
        );
    }

    #[test]
    fn test_non_block_is_unconstrained() {
        let shapes = vec![
            rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 200.0),
            rect(HierarchyTag::Shelf, "shelf_1", 10.0, 0.0, 80.0, 50.0),
        ];
        let decision = evaluate(&shapes, BoundingBox::new(10.0, 0.0, 500.0, 50.0), "shelf_1");
        assert_eq!(decision, ResizeDecision::Accept);
    }

    #[test]
    fn test_deterministic() {
        let shapes = vec![
            rect(HierarchyTag::Block, "block_1", 0.0, 0.0, 100.0, 200.0),
            rect(HierarchyTag::Shelf, "shelf_1", 10.0, 0.0, 80.0, 50.0),
            rect(HierarchyTag::Shelf, "shelf_2", 95.0, 0.0, 90.0, 50.0),
        ];
        let candidate = BoundingBox::new(0.0, 0.0, 200.0, 200.0);
        assert_eq!(
            evaluate(&shapes, candidate, "block_1"),
            evaluate(&shapes, candidate, "block_1")
        );
    }

    #[test]
    fn test_reason_display() {
        let reason = RevertReason::UnequalShelfCounts { counts: vec![2, 1] };
        assert!(reason.to_string().contains("2, 1"));
    }
}
