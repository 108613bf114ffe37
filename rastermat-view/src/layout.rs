//! Layout: the size/stride/offset description of a strided matrix.

use crate::{Result, ViewError};

/// Column-major strides for the given dims (first dimension has stride 1).
pub fn col_major_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = vec![1isize; dims.len()];
    for i in 1..dims.len() {
        strides[i] = strides[i - 1] * dims[i - 1] as isize;
    }
    strides
}

/// Row-major strides for the given dims (last dimension has stride 1).
pub fn row_major_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = vec![1isize; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1] as isize;
    }
    strides
}

/// Invert a permutation: if `perm[i] = j`, then `result[j] = i`.
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0usize; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inv[p] = i;
    }
    inv
}

fn is_permutation(perm: &[usize], rank: usize) -> bool {
    if perm.len() != rank {
        return false;
    }
    let mut seen = vec![false; rank];
    for &p in perm {
        if p >= rank || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

/// Normalize dims to the canonical rank-≥-2 form: pad with trailing 1s up to
/// rank 2, trim trailing 1s beyond rank 2.
fn normalize_dims(dims: &[usize]) -> Vec<usize> {
    let mut out = dims.to_vec();
    while out.len() < 2 {
        out.push(1);
    }
    while out.len() > 2 && out.last() == Some(&1) {
        out.pop();
    }
    out
}

/// An index subset along one dimension: `start`, `start + step`, … for `len`
/// elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
    pub step: usize,
}

impl Span {
    /// A single index (dimension keeps size 1).
    pub fn at(index: usize) -> Self {
        Span { start: index, len: 1, step: 1 }
    }

    /// The first `len` indices.
    pub fn prefix(len: usize) -> Self {
        Span { start: 0, len, step: 1 }
    }

    /// A contiguous run of `len` indices starting at `start`.
    pub fn range(start: usize, len: usize) -> Self {
        Span { start, len, step: 1 }
    }

    /// Every `step`-th index, `len` of them, starting at `start`.
    ///
    /// # Panics
    /// Panics if `step` is zero.
    pub fn strided(start: usize, len: usize, step: usize) -> Self {
        assert!(step > 0, "span step must be positive");
        Span { start, len, step }
    }

    /// Largest index the span touches, if it touches any.
    fn last(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.start + (self.len - 1) * self.step)
        }
    }
}

/// How a flat buffer's elements map to an N-dimensional index space.
///
/// A `Layout` holds a size and stride per dimension plus a starting offset,
/// and nothing else; it never owns or references data. All transforms
/// return new layouts and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    dims: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
}

impl Layout {
    /// Canonical dense column-major layout over the given dims.
    pub fn col_major(dims: &[usize]) -> Layout {
        let dims = normalize_dims(dims);
        let strides = col_major_strides(&dims);
        Layout { dims, strides, offset: 0 }
    }

    /// Dense row-major layout over the given dims (used when overlaying
    /// externally produced sample data).
    pub fn row_major(dims: &[usize]) -> Layout {
        let dims = normalize_dims(dims);
        let strides = row_major_strides(&dims);
        Layout { dims, strides, offset: 0 }
    }

    /// Build a layout from explicit parts.
    ///
    /// Dims are normalized to rank ≥ 2; `strides` must match the raw dims
    /// length before normalization.
    pub fn from_parts(dims: &[usize], strides: &[isize], offset: usize) -> Result<Layout> {
        if dims.len() != strides.len() {
            return Err(ViewError::RankMismatch(dims.len(), strides.len()));
        }
        let mut dims = dims.to_vec();
        let mut strides = strides.to_vec();
        while dims.len() < 2 {
            dims.push(1);
            strides.push(0);
        }
        while dims.len() > 2 && dims.last() == Some(&1) {
            dims.pop();
            strides.pop();
        }
        let layout = Layout { dims, strides, offset };
        layout.required_len()?;
        Ok(layout)
    }

    /// Size of each dimension.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Stride of each dimension, in elements.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Starting offset into the buffer, in elements.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of dimensions (always ≥ 2).
    #[inline]
    pub fn ndims(&self) -> usize {
        self.dims.len()
    }

    /// Size of dimension `dim`.
    #[inline]
    pub fn dim(&self, dim: usize) -> usize {
        self.dims[dim]
    }

    /// Total number of elements addressed by the layout.
    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    /// True if the layout addresses no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.contains(&0)
    }

    // ========================================================================
    // Shape predicates
    // ========================================================================

    /// Exactly two dimensions, any sizes.
    #[inline]
    pub fn is_matrix(&self) -> bool {
        self.dims.len() == 2
    }

    /// Exactly two dimensions with a single row. A 1×1 layout is a row.
    #[inline]
    pub fn is_row(&self) -> bool {
        self.dims.len() == 2 && self.dims[0] == 1
    }

    /// Exactly two dimensions with a single column. A 1×1 layout is a column.
    #[inline]
    pub fn is_column(&self) -> bool {
        self.dims.len() == 2 && self.dims[1] == 1
    }

    /// Exactly two dimensions, one of them of size 1.
    #[inline]
    pub fn is_vector(&self) -> bool {
        self.dims.len() == 2 && (self.dims[0] == 1 || self.dims[1] == 1)
    }

    // ========================================================================
    // Metadata transforms
    // ========================================================================

    /// Reorder dimensions according to `order`.
    ///
    /// # Errors
    /// [`ViewError::InvalidPermutation`] unless `order` is a bijection over
    /// `0..ndims()`.
    pub fn permute(&self, order: &[usize]) -> Result<Layout> {
        if !is_permutation(order, self.dims.len()) {
            return Err(ViewError::InvalidPermutation {
                perm: order.to_vec(),
                rank: self.dims.len(),
            });
        }
        let dims = order.iter().map(|&d| self.dims[d]).collect();
        let strides = order.iter().map(|&d| self.strides[d]).collect();
        Ok(Layout { dims, strides, offset: self.offset })
    }

    /// Swap the two dimensions of a rank-2 layout.
    ///
    /// # Errors
    /// [`ViewError::RankMismatch`] if the layout is not rank 2.
    pub fn transpose_2d(&self) -> Result<Layout> {
        if self.dims.len() != 2 {
            return Err(ViewError::RankMismatch(self.dims.len(), 2));
        }
        self.permute(&[1, 0])
    }

    /// Take an index subset along every dimension.
    ///
    /// One [`Span`] per dimension; the resulting layout keeps the rank and
    /// adjusts offset, sizes, and strides.
    ///
    /// # Errors
    /// [`ViewError::RankMismatch`] if `spans.len() != ndims()`;
    /// [`ViewError::IndexOutOfBounds`] if any span reaches past its
    /// dimension.
    pub fn select(&self, spans: &[Span]) -> Result<Layout> {
        if spans.len() != self.dims.len() {
            return Err(ViewError::RankMismatch(spans.len(), self.dims.len()));
        }
        for (dim, (span, &size)) in spans.iter().zip(self.dims.iter()).enumerate() {
            if let Some(last) = span.last() {
                if last >= size {
                    return Err(ViewError::IndexOutOfBounds { dim, index: last, size });
                }
            }
        }
        let mut offset = self.offset as isize;
        let mut dims = Vec::with_capacity(self.dims.len());
        let mut strides = Vec::with_capacity(self.strides.len());
        for (span, &stride) in spans.iter().zip(self.strides.iter()) {
            offset += span.start as isize * stride;
            dims.push(span.len);
            strides.push(stride * span.step as isize);
        }
        Ok(Layout { dims, strides, offset: offset as usize })
    }

    /// Expand size-1 dimensions to `target` via stride 0.
    ///
    /// `target` may have higher rank than the layout; the missing trailing
    /// dimensions are treated as size 1.
    ///
    /// # Errors
    /// [`ViewError::RankMismatch`] if `target` has lower rank;
    /// [`ViewError::ShapeMismatch`] if a non-1 dimension differs from the
    /// target.
    pub fn broadcast(&self, target: &[usize]) -> Result<Layout> {
        if target.len() < self.dims.len() {
            return Err(ViewError::RankMismatch(self.dims.len(), target.len()));
        }
        let mut strides = Vec::with_capacity(target.len());
        for (d, &tdim) in target.iter().enumerate() {
            let sdim = self.dims.get(d).copied().unwrap_or(1);
            let stride = self.strides.get(d).copied().unwrap_or(0);
            if sdim == tdim {
                strides.push(stride);
            } else if sdim == 1 {
                strides.push(0);
            } else {
                return Err(ViewError::ShapeMismatch(self.dims.clone(), target.to_vec()));
            }
        }
        Ok(Layout { dims: target.to_vec(), strides, offset: self.offset })
    }

    // ========================================================================
    // Addressing
    // ========================================================================

    /// True if the layout is the canonical dense column-major one over its
    /// dims with no offset. Axes of size ≤ 1 are ignored, since they never
    /// affect addressability.
    pub fn is_contiguous(&self) -> bool {
        if self.offset != 0 {
            return false;
        }
        let mut expected = 1isize;
        for (&dim, &stride) in self.dims.iter().zip(self.strides.iter()) {
            if dim <= 1 {
                continue;
            }
            if stride != expected {
                return false;
            }
            expected *= dim as isize;
        }
        true
    }

    /// Minimal buffer length the layout can address (one past the largest
    /// reachable linear index; 0 for an empty layout).
    ///
    /// # Errors
    /// [`ViewError::OffsetOverflow`] if any reachable index is negative.
    pub fn required_len(&self) -> Result<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        let mut min = self.offset as isize;
        let mut max = self.offset as isize;
        for (&dim, &stride) in self.dims.iter().zip(self.strides.iter()) {
            let reach = (dim - 1) as isize * stride;
            if stride >= 0 {
                max += reach;
            } else {
                min += reach;
            }
        }
        if min < 0 {
            return Err(ViewError::OffsetOverflow);
        }
        Ok(max as usize + 1)
    }

    /// Linear buffer index of the given multi-dimensional index.
    ///
    /// # Errors
    /// [`ViewError::RankMismatch`] on wrong index rank;
    /// [`ViewError::IndexOutOfBounds`] on a per-dimension violation.
    pub fn linear_index(&self, index: &[usize]) -> Result<usize> {
        if index.len() != self.dims.len() {
            return Err(ViewError::RankMismatch(index.len(), self.dims.len()));
        }
        let mut linear = self.offset as isize;
        for (dim, ((&i, &size), &stride)) in index
            .iter()
            .zip(self.dims.iter())
            .zip(self.strides.iter())
            .enumerate()
        {
            if i >= size {
                return Err(ViewError::IndexOutOfBounds { dim, index: i, size });
            }
            linear += i as isize * stride;
        }
        Ok(linear as usize)
    }

    /// Iterate linear buffer indices in canonical order (first dimension
    /// fastest).
    pub fn offsets(&self) -> Offsets<'_> {
        Offsets {
            dims: &self.dims,
            strides: &self.strides,
            index: vec![0; self.dims.len()],
            offset: self.offset as isize,
            remaining: self.len(),
        }
    }
}

/// Odometer over a layout's linear indices, first dimension fastest.
pub struct Offsets<'a> {
    dims: &'a [usize],
    strides: &'a [isize],
    index: Vec<usize>,
    offset: isize,
    remaining: usize,
}

impl Iterator for Offsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        debug_assert!(self.offset >= 0);
        let current = self.offset as usize;
        for d in 0..self.dims.len() {
            self.index[d] += 1;
            self.offset += self.strides[d];
            if self.index[d] < self.dims[d] {
                break;
            }
            self.index[d] = 0;
            self.offset -= self.dims[d] as isize * self.strides[d];
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Offsets<'_> {}

/// Common broadcast shape of two dim lists.
///
/// Per dimension the sizes must be equal or one of them 1; the result takes
/// the larger size. The shorter list is treated as padded with trailing 1s.
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let rank = a.len().max(b.len());
    let mut out = Vec::with_capacity(rank);
    for d in 0..rank {
        let x = a.get(d).copied().unwrap_or(1);
        let y = b.get(d).copied().unwrap_or(1);
        if x == y || y == 1 {
            out.push(x);
        } else if x == 1 {
            out.push(y);
        } else {
            return Err(ViewError::ShapeMismatch(a.to_vec(), b.to_vec()));
        }
    }
    Ok(out)
}
