//! Read-only queries over the committed shape set

use super::shape::{HierarchyTag, Shape};

/// Borrowed view over a scene's shapes in insertion order
#[derive(Debug, Clone, Copy)]
pub struct SceneIndex<'a> {
    shapes: &'a [Shape],
}

impl<'a> SceneIndex<'a> {
    pub fn new(shapes: &'a [Shape]) -> Self {
        Self { shapes }
    }

    /// All shapes carrying the given tag
    pub fn tagged(&self, tag: HierarchyTag) -> impl Iterator<Item = &'a Shape> + 'a {
        self.shapes.iter().filter(move |shape| shape.is(tag))
    }

    pub fn blocks(&self) -> impl Iterator<Item = &'a Shape> + 'a {
        self.tagged(HierarchyTag::Block)
    }

    pub fn shelves(&self) -> impl Iterator<Item = &'a Shape> + 'a {
        self.tagged(HierarchyTag::Shelf)
    }

    /// Single-product columns; stacked columns are queried separately
    pub fn columns(&self) -> impl Iterator<Item = &'a Shape> + 'a {
        self.tagged(HierarchyTag::Column)
    }

    pub fn stacked_columns(&self) -> impl Iterator<Item = &'a Shape> + 'a {
        self.tagged(HierarchyTag::StackedColumn)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&'a Shape> {
        self.shapes.iter().find(|shape| shape.name == name)
    }

    /// Names of all shapes with the given tag
    pub fn names(&self, tag: HierarchyTag) -> Vec<&'a str> {
        self.tagged(tag).map(|shape| shape.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::shape::Geometry;

    fn shapes() -> Vec<Shape> {
        vec![
            Shape::new(HierarchyTag::Shelf, "shelf_1", Geometry::new(0.0, 0.0, 10.0, 10.0)),
            Shape::new(HierarchyTag::Block, "block_1", Geometry::new(0.0, 0.0, 50.0, 50.0)),
            Shape::new(HierarchyTag::Column, "column_1", Geometry::new(0.0, 0.0, 5.0, 5.0)),
            Shape::new(
                HierarchyTag::StackedColumn,
                "column_1_stack_1",
                Geometry::new(0.0, 0.0, 5.0, 5.0),
            ),
            Shape::new(HierarchyTag::Shelf, "shelf_2", Geometry::new(0.0, 10.0, 10.0, 10.0)),
        ]
    }

    #[test]
    fn test_filters_keep_insertion_order() {
        let shapes = shapes();
        let index = SceneIndex::new(&shapes);
        assert_eq!(index.names(HierarchyTag::Shelf), vec!["shelf_1", "shelf_2"]);
        assert_eq!(index.blocks().count(), 1);
    }

    #[test]
    fn test_columns_exclude_stacked() {
        let shapes = shapes();
        let index = SceneIndex::new(&shapes);
        assert_eq!(index.names(HierarchyTag::Column), vec!["column_1"]);
        assert_eq!(
            index.names(HierarchyTag::StackedColumn),
            vec!["column_1_stack_1"]
        );
    }

    #[test]
    fn test_find_by_name() {
        let shapes = shapes();
        let index = SceneIndex::new(&shapes);
        assert_eq!(
            index.find_by_name("block_1").map(|s| s.tag),
            Some(HierarchyTag::Block)
        );
        assert!(index.find_by_name("block_9").is_none());
    }
}
