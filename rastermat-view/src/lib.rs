//! Strided layout metadata for dense matrices.
//!
//! This crate provides [`Layout`], the dims/strides/offset description of how
//! a flat buffer maps to an N-dimensional index space, together with the
//! zero-copy transforms on it. It knows nothing about element types or the
//! buffers themselves; the operation layer lives in the `rastermat` crate.
//!
//! # Metadata Transformations
//!
//! These operate only on dims/strides/offset and never touch data:
//! - [`Layout::permute`]: Reorder dimensions
//! - [`Layout::select`]: Per-dimension index subsets ([`Span`])
//! - [`Layout::broadcast`]: Expand size-1 dimensions via stride 0
//! - [`Layout::transpose_2d`]: Swap the two dimensions of a rank-2 layout
//!
//! # Conventions
//!
//! Layouts are always rank ≥ 2 and canonically column-major: the first
//! dimension varies fastest, matching the toolkit's native element order.
//! Shape predicates ([`Layout::is_row`], [`Layout::is_column`],
//! [`Layout::is_vector`], [`Layout::is_matrix`]) are derived from dims alone.

mod layout;

pub use layout::{
    broadcast_shape, col_major_strides, inverse_permutation, row_major_strides, Layout, Offsets,
    Span,
};

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by layout metadata operations.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Permutation argument is not a bijection over the layout's dimensions.
    #[error("invalid permutation {perm:?} for rank {rank}")]
    InvalidPermutation { perm: Vec<usize>, rank: usize },

    /// Index outside a dimension's size.
    #[error("index {index} out of bounds for dimension {dim} of size {size}")]
    IndexOutOfBounds { dim: usize, index: usize, size: usize },

    /// The layout would address memory before the start of its buffer.
    #[error("offset overflow while computing reachable indices")]
    OffsetOverflow,
}

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, ViewError>;
