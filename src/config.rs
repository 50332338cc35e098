//! Editor configuration
//!
//! Defaults are built in; a TOML file can override any subset of them:
//!
//! ```toml
//! block_padding = 4.0
//!
//! [prefixes]
//! block = "blk-"
//!
//! [display.shelf]
//! selectable = false
//!
//! [history]
//! max_entries = 50
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::history::HistoryConfig;
use crate::scene::{DisplayAttributes, HierarchyTag};

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Name prefixes identifying each hierarchy class.
///
/// These are shared with whatever produced the layout, so changing them
/// only makes sense when the producer changes too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NamePrefixes {
    pub block: String,
    pub shelf: String,
    pub column: String,
    /// Infix between a column's name and its stack index
    pub stack: String,
}

impl Default for NamePrefixes {
    fn default() -> Self {
        Self {
            block: "block_".to_string(),
            shelf: "shelf_".to_string(),
            column: "column_".to_string(),
            stack: "_stack_".to_string(),
        }
    }
}

impl NamePrefixes {
    pub fn block(&self, index: usize) -> String {
        format!("{}{}", self.block, index)
    }

    pub fn shelf(&self, index: usize) -> String {
        format!("{}{}", self.shelf, index)
    }

    pub fn column(&self, index: usize) -> String {
        format!("{}{}", self.column, index)
    }

    pub fn stacked_column(&self, column: usize, stack: usize) -> String {
        format!("{}{}{}{}", self.column, column, self.stack, stack)
    }
}

/// Display attributes applied to newly created shapes, per hierarchy class
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub block: DisplayAttributes,
    pub shelf: DisplayAttributes,
    /// Used for plain and stacked columns
    pub column: DisplayAttributes,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            block: DisplayAttributes {
                selectable: true,
                padding: 0.0,
                lock_scaling_y: true,
                lock_movement_x: false,
                lock_movement_y: true,
            },
            shelf: DisplayAttributes {
                selectable: true,
                padding: 0.0,
                lock_scaling_y: false,
                lock_movement_x: true,
                lock_movement_y: false,
            },
            column: DisplayAttributes {
                selectable: true,
                padding: 0.0,
                lock_scaling_y: false,
                lock_movement_x: false,
                lock_movement_y: true,
            },
        }
    }
}

impl DisplayConfig {
    pub fn for_tag(&self, tag: HierarchyTag) -> DisplayAttributes {
        match tag {
            HierarchyTag::Block => self.block,
            HierarchyTag::Shelf => self.shelf,
            HierarchyTag::Column | HierarchyTag::StackedColumn => self.column,
        }
    }
}

/// Configuration options for the editor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Margin used when computing a shape's span for overlap tests
    pub block_padding: f64,

    pub prefixes: NamePrefixes,

    pub display: DisplayConfig,

    pub history: HistoryConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            block_padding: 5.0,
            prefixes: NamePrefixes::default(),
            display: DisplayConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the block padding
    pub fn with_block_padding(mut self, padding: f64) -> Self {
        self.block_padding = padding;
        self
    }

    /// Set the name prefixes
    pub fn with_prefixes(mut self, prefixes: NamePrefixes) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Bound the number of undo steps
    pub fn with_history_limit(mut self, max_entries: usize) -> Self {
        self.history.max_entries = Some(max_entries);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.block_padding.is_finite() || self.block_padding < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "block_padding must be a non-negative number (got {})",
                self.block_padding
            )));
        }

        let p = &self.prefixes;
        let prefixes = [&p.block, &p.shelf, &p.column, &p.stack];
        if prefixes.iter().any(|prefix| prefix.is_empty()) {
            return Err(ConfigError::Invalid("name prefixes must not be empty".to_string()));
        }
        for (i, a) in prefixes.iter().enumerate() {
            if prefixes[i + 1..].contains(a) {
                return Err(ConfigError::Invalid(format!(
                    "name prefix '{}' is used twice",
                    a
                )));
            }
        }

        if self.history.max_entries == Some(0) {
            return Err(ConfigError::Invalid(
                "history.max_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
