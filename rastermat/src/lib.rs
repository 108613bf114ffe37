//! Dense-matrix core of a raster-processing toolkit.
//!
//! This crate provides [`Matrix`], a MATLAB-style N-dimensional matrix over a
//! flat typed buffer, with optional split real/imaginary storage for complex
//! data. It supports:
//!
//! - **Runtime element types**: [`ElementType`] tags (`int8` … `uint32`,
//!   `uint8c`, `single`, `double`, `logical`) with case-insensitive alias
//!   parsing and well-defined narrowing rules on store
//! - **Zero-copy views**: [`Matrix::view`] yields a borrowed [`MatrixView`]
//!   supporting `permute`, `select`, `broadcast`, and `transpose` as pure
//!   metadata transforms; [`MatrixView::to_matrix`] materializes in canonical
//!   column-major order
//! - **Element-wise math**: `abs`, `angle`, `conj` with real and complex
//!   branches, in place or as pure copies; NaN/Inf/finiteness predicates
//!   producing `logical` matrices
//! - **Broadcasting arithmetic**: `add`/`sub`/`mul`/`div` with shape
//!   broadcasting and element-type promotion
//! - **Packed raster I/O**: the [`raw`] module decodes and encodes the
//!   toolkit's 64-byte-header little-endian sample format
//!
//! # Conventions
//!
//! Matrices are column-major (first dimension fastest) and always rank ≥ 2.
//! Every operation that produces a matrix allocates fresh buffers; views
//! borrow and never outlive their matrix. Casts always produce a new buffer.
//!
//! # Example
//!
//! ```rust
//! use rastermat::Matrix;
//!
//! let mut m = Matrix::from_elems(&[2, 2], &[1.0f64, -2.0, 3.0, -4.0]).unwrap();
//! m.abs_in_place();
//! assert_eq!(m.as_slice::<f64>().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
//!
//! let t = m.view().transpose().unwrap().to_matrix();
//! assert_eq!(t.dims(), &[2, 2]);
//! assert_eq!(t.get(&[0, 1]).unwrap(), 2.0);
//! ```

mod arith;
mod buffer;
mod element;
mod elementwise;
mod matrix;
pub mod raw;

pub use buffer::{Buffer, Scalar};
pub use element::ElementType;
pub use matrix::{Matrix, MatrixView};

// ============================================================================
// Re-exports from rastermat-view
// ============================================================================
pub use rastermat_view::{
    broadcast_shape, col_major_strides, inverse_permutation, row_major_strides, Layout, Span,
    ViewError,
};

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by matrix construction, math, and raster decoding.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    /// Layout metadata error (permutation, bounds, shape, rank).
    #[error(transparent)]
    View(#[from] ViewError),

    /// Unrecognized element-type tag.
    #[error("unknown element type tag {0:?}")]
    UnknownType(String),

    /// Buffer length does not match the declared shape.
    #[error("buffer of {actual} elements does not match shape of {expected} elements")]
    SizeMismatch { expected: usize, actual: usize },

    /// Real and imaginary parts of a complex matrix disagree in type or length.
    #[error("component mismatch: {re_type}[{re_len}] real vs {im_type}[{im_len}] imaginary")]
    ComponentMismatch {
        re_type: ElementType,
        im_type: ElementType,
        re_len: usize,
        im_len: usize,
    },

    /// `real()` or `imag()` called on a strictly real matrix.
    #[error("matrix has no imaginary part")]
    NotComplex,

    /// Raster input does not start with the expected magic bytes.
    #[error("bad raster magic {0:?}")]
    BadMagic([u8; 4]),

    /// Raster input ends before the declared sample data.
    #[error("raster data truncated: need {needed} bytes, have {actual}")]
    TruncatedRaw { needed: usize, actual: usize },

    /// Raster header declares a sample kind/precision with no matching
    /// element type.
    #[error("unsupported sample format: kind {kind}, {precision} bits")]
    UnsupportedSampleFormat { kind: u32, precision: u32 },

    /// Complex matrices have no raster sample representation.
    #[error("complex matrices cannot be encoded as raster samples")]
    ComplexUnsupported,
}

/// Result type for matrix operations.
pub type Result<T> = std::result::Result<T, MatrixError>;
