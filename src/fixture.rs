//! Layout fixture import
//!
//! A fixture describes the planogram as a tree: blocks hold shelves, shelves
//! hold columns, columns hold one or more products. The scene has no tree,
//! so the import flattens it into rectangles: all blocks first, then all
//! shelves, then one rectangle per product.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::EditorConfig;
use crate::scene::{Geometry, HierarchyTag, Scene, SceneError, Shape};

/// Errors that can occur when loading a fixture
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse fixture JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid fixture shape: {0}")]
    InvalidShape(#[from] SceneError),
}

/// Box as written in the fixture
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FixtureBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl FixtureBox {
    fn geometry(&self) -> Geometry {
        Geometry::new(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub data: FixtureData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureData {
    #[serde(default)]
    pub blocks: Vec<FixtureBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureBlock {
    pub block_bounding_box: FixtureBox,
    #[serde(default)]
    pub facings: Facings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Facings {
    #[serde(default)]
    pub shelves: Vec<FixtureShelf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureShelf {
    pub shelf_bounding_box: FixtureBox,
    #[serde(default)]
    pub columns: Vec<FixtureColumn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureColumn {
    #[serde(default)]
    pub products: Vec<FixtureProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureProduct {
    pub product_bounding_box: FixtureBox,
}

impl Fixture {
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Flatten the fixture into a fresh scene.
    ///
    /// Counters are 1-based. A column with several products is stacked:
    /// each product is named after the most recent plain column plus a
    /// running stack counter.
    pub fn build_scene(&self, config: &EditorConfig) -> Result<Scene, FixtureError> {
        let prefixes = &config.prefixes;
        let mut scene = Scene::new();
        let mut add = |tag: HierarchyTag, name: String, bounds: &FixtureBox| {
            let shape = Shape::new(tag, name, bounds.geometry())
                .with_attributes(config.display.for_tag(tag));
            scene.add(shape)
        };

        for (i, block) in self.data.blocks.iter().enumerate() {
            add(HierarchyTag::Block, prefixes.block(i + 1), &block.block_bounding_box)?;
        }

        let shelves: Vec<&FixtureShelf> = self
            .data
            .blocks
            .iter()
            .flat_map(|block| &block.facings.shelves)
            .collect();
        for (i, shelf) in shelves.iter().enumerate() {
            add(HierarchyTag::Shelf, prefixes.shelf(i + 1), &shelf.shelf_bounding_box)?;
        }

        let mut column = 0;
        let mut stack = 0;
        for col in shelves.iter().flat_map(|shelf| &shelf.columns) {
            let stacked = col.products.len() > 1;
            for product in &col.products {
                if stacked {
                    stack += 1;
                    add(
                        HierarchyTag::StackedColumn,
                        prefixes.stacked_column(column, stack),
                        &product.product_bounding_box,
                    )?;
                } else {
                    column += 1;
                    add(
                        HierarchyTag::Column,
                        prefixes.column(column),
                        &product.product_bounding_box,
                    )?;
                }
            }
        }

        scene.take_events();
        Ok(scene)
    }
}
