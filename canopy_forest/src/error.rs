// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Result alias for forest construction.
pub type Result<T> = core::result::Result<T, BuildError>;

/// Reasons a forest cannot be built from the given records.
///
/// Unresolvable parents and parent cycles are not errors; those records are
/// promoted to roots. Repeated ids are not errors either; the first record
/// keeps the id.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The forest can address at most `u32::MAX` nodes.
    #[error("too many entities to index: {count}")]
    TooManyNodes {
        /// Number of records supplied.
        count: usize,
    },
}
