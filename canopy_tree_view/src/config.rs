// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View configuration and its validation errors.

/// Reasons a [`TreeViewConfig`] is rejected.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Row height must be finite and strictly positive.
    #[error("row height must be finite and positive, got {0}")]
    InvalidRowHeight(f64),
    /// Viewport height must be finite and not negative.
    #[error("viewport height must be finite and non-negative, got {0}")]
    InvalidViewportHeight(f64),
    /// Indent must be finite and not negative.
    #[error("indent must be finite and non-negative, got {0}")]
    InvalidIndent(f64),
}

/// Geometry and timing for a [`TreeView`](crate::TreeView).
///
/// All lengths are in the host's logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TreeViewConfig {
    /// Width given to every row.
    pub viewport_width: f64,
    /// Height of the scrollable viewport.
    pub viewport_height: f64,
    /// Height of a single row.
    pub row_height: f64,
    /// Horizontal offset per depth level.
    pub indent: f64,
    /// Quiet period before typed search text is applied, in milliseconds.
    pub search_debounce_ms: u64,
}

impl Default for TreeViewConfig {
    fn default() -> Self {
        Self {
            viewport_width: 320.0,
            viewport_height: 480.0,
            row_height: 24.0,
            indent: 16.0,
            search_debounce_ms: 150,
        }
    }
}

impl TreeViewConfig {
    /// Sets the viewport width.
    #[must_use]
    pub fn with_viewport_width(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self
    }

    /// Sets the viewport height.
    #[must_use]
    pub fn with_viewport_height(mut self, height: f64) -> Self {
        self.viewport_height = height;
        self
    }

    /// Sets the row height.
    #[must_use]
    pub fn with_row_height(mut self, height: f64) -> Self {
        self.row_height = height;
        self
    }

    /// Sets the per-level indent.
    #[must_use]
    pub fn with_indent(mut self, indent: f64) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the search debounce delay.
    #[must_use]
    pub fn with_search_debounce_ms(mut self, delay: u64) -> Self {
        self.search_debounce_ms = delay;
        self
    }

    /// Checks that every length is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(ConfigError::InvalidRowHeight(self.row_height));
        }
        if !(self.viewport_height.is_finite() && self.viewport_height >= 0.0) {
            return Err(ConfigError::InvalidViewportHeight(self.viewport_height));
        }
        if !(self.indent.is_finite() && self.indent >= 0.0) {
            return Err(ConfigError::InvalidIndent(self.indent));
        }
        Ok(())
    }
}
