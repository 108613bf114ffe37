//! The `Matrix` type: a canonical layout over one or two typed buffers.
//!
//! A matrix is strictly real (one buffer) or complex (two same-type,
//! same-length buffers holding the real and imaginary parts). The matrix
//! itself always has the canonical dense column-major layout; every other
//! access pattern is expressed as a borrowed [`MatrixView`] and, when data
//! must move, materialized back into canonical order with
//! [`MatrixView::to_matrix`].

use crate::{Buffer, ElementType, MatrixError, Result, Scalar};
use rastermat_view::{Layout, Span};

/// Dense N-dimensional matrix over flat typed storage.
///
/// Construction validates that the buffer length matches the shape's element
/// count. A matrix is never resized in place: value-mutating APIs exist,
/// shape-mutating ones do not. Copies and operation results always own fresh
/// buffers.
#[derive(Debug)]
pub struct Matrix {
    pub(crate) layout: Layout,
    pub(crate) re: Buffer,
    pub(crate) im: Option<Buffer>,
}

impl Matrix {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// A real matrix over the given buffer.
    ///
    /// # Errors
    /// [`MatrixError::SizeMismatch`] unless `data.len()` equals the product
    /// of `dims`.
    pub fn new(dims: &[usize], data: Buffer) -> Result<Matrix> {
        let layout = Layout::col_major(dims);
        if data.len() != layout.len() {
            return Err(MatrixError::SizeMismatch {
                expected: layout.len(),
                actual: data.len(),
            });
        }
        Ok(Matrix { layout, re: data, im: None })
    }

    /// A complex matrix over separate real and imaginary buffers.
    ///
    /// # Errors
    /// [`MatrixError::ComponentMismatch`] unless both buffers share one
    /// element type and length; [`MatrixError::SizeMismatch`] unless that
    /// length matches the shape.
    pub fn new_complex(dims: &[usize], re: Buffer, im: Buffer) -> Result<Matrix> {
        if re.element_type() != im.element_type() || re.len() != im.len() {
            return Err(MatrixError::ComponentMismatch {
                re_type: re.element_type(),
                im_type: im.element_type(),
                re_len: re.len(),
                im_len: im.len(),
            });
        }
        let mut matrix = Matrix::new(dims, re)?;
        matrix.im = Some(im);
        Ok(matrix)
    }

    /// A zero-filled real matrix of the given shape and element type.
    pub fn zeros(dims: &[usize], ty: ElementType) -> Matrix {
        let layout = Layout::col_major(dims);
        let re = Buffer::zeros(ty, layout.len());
        Matrix { layout, re, im: None }
    }

    /// A real matrix copied from a typed slice, in canonical element order.
    pub fn from_elems<T: Scalar>(dims: &[usize], data: &[T]) -> Result<Matrix> {
        Matrix::new(dims, Buffer::from_slice(data))
    }

    /// A complex matrix copied from typed real and imaginary slices.
    pub fn from_elems_complex<T: Scalar>(dims: &[usize], re: &[T], im: &[T]) -> Result<Matrix> {
        Matrix::new_complex(dims, Buffer::from_slice(re), Buffer::from_slice(im))
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Shape (size of each dimension, rank ≥ 2).
    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.layout.dims()
    }

    /// Number of dimensions.
    #[inline]
    pub fn ndims(&self) -> usize {
        self.layout.ndims()
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    /// True if the matrix has zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// The canonical layout over the storage.
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Element type of the storage (both components for complex matrices).
    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.re.element_type()
    }

    /// True iff no imaginary buffer is present.
    #[inline]
    pub fn is_real(&self) -> bool {
        self.im.is_none()
    }

    /// True iff an imaginary buffer is present.
    #[inline]
    pub fn is_complex(&self) -> bool {
        self.im.is_some()
    }

    /// Exactly two dimensions.
    #[inline]
    pub fn is_matrix(&self) -> bool {
        self.layout.is_matrix()
    }

    /// Exactly two dimensions, single row (1×1 included).
    #[inline]
    pub fn is_row(&self) -> bool {
        self.layout.is_row()
    }

    /// Exactly two dimensions, single column (1×1 included).
    #[inline]
    pub fn is_column(&self) -> bool {
        self.layout.is_column()
    }

    /// Exactly two dimensions, one of size 1.
    #[inline]
    pub fn is_vector(&self) -> bool {
        self.layout.is_vector()
    }

    // ========================================================================
    // Element access
    // ========================================================================

    /// Real component at the given index, as `f64`.
    pub fn get(&self, index: &[usize]) -> Result<f64> {
        let i = self.layout.linear_index(index)?;
        Ok(self.re.get(i))
    }

    /// Real and imaginary components at the given index (imaginary is 0 for
    /// a real matrix).
    pub fn get_complex(&self, index: &[usize]) -> Result<(f64, f64)> {
        let i = self.layout.linear_index(index)?;
        let im = self.im.as_ref().map_or(0.0, |im| im.get(i));
        Ok((self.re.get(i), im))
    }

    /// Store a value into the real component; the shape never changes.
    pub fn set(&mut self, index: &[usize], value: f64) -> Result<()> {
        let i = self.layout.linear_index(index)?;
        self.re.set(i, value);
        Ok(())
    }

    /// Store real and imaginary components.
    ///
    /// # Errors
    /// [`MatrixError::NotComplex`] on a strictly real matrix.
    pub fn set_complex(&mut self, index: &[usize], re: f64, im: f64) -> Result<()> {
        let imag = self.im.as_mut().ok_or(MatrixError::NotComplex)?;
        let i = self.layout.linear_index(index)?;
        self.re.set(i, re);
        imag.set(i, im);
        Ok(())
    }

    /// Borrow the real component's typed storage, if `T` matches.
    pub fn as_slice<T: Scalar>(&self) -> Option<&[T]> {
        self.re.as_slice()
    }

    /// Borrow the imaginary component's typed storage, if present and `T`
    /// matches.
    pub fn imag_as_slice<T: Scalar>(&self) -> Option<&[T]> {
        self.im.as_ref().and_then(|im| im.as_slice())
    }

    // ========================================================================
    // Copies and components
    // ========================================================================

    /// Deep copy sharing no storage with `self`.
    pub fn get_copy(&self) -> Matrix {
        Matrix {
            layout: self.layout.clone(),
            re: self.re.clone(),
            im: self.im.clone(),
        }
    }

    /// The real part as a fresh strictly-real matrix.
    ///
    /// # Errors
    /// [`MatrixError::NotComplex`] on a strictly real matrix.
    pub fn real(&self) -> Result<Matrix> {
        if self.im.is_none() {
            return Err(MatrixError::NotComplex);
        }
        Ok(Matrix {
            layout: self.layout.clone(),
            re: self.re.clone(),
            im: None,
        })
    }

    /// The imaginary part as a fresh strictly-real matrix.
    ///
    /// # Errors
    /// [`MatrixError::NotComplex`] on a strictly real matrix.
    pub fn imag(&self) -> Result<Matrix> {
        match &self.im {
            Some(im) => Ok(Matrix {
                layout: self.layout.clone(),
                re: im.clone(),
                im: None,
            }),
            None => Err(MatrixError::NotComplex),
        }
    }

    /// Convert to a fresh matrix of element type `ty`, preserving the shape
    /// exactly. Both components of a complex matrix are cast; the source is
    /// never modified.
    pub fn cast(&self, ty: ElementType) -> Matrix {
        Matrix {
            layout: self.layout.clone(),
            re: self.re.cast(ty),
            im: self.im.as_ref().map(|im| im.cast(ty)),
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Borrow the matrix as a view with the canonical layout.
    pub fn view(&self) -> MatrixView<'_> {
        MatrixView {
            layout: self.layout.clone(),
            re: &self.re,
            im: self.im.as_ref(),
        }
    }

    pub(crate) fn components(&self) -> (&Buffer, Option<&Buffer>) {
        (&self.re, self.im.as_ref())
    }

    pub(crate) fn components_mut(&mut self) -> (&mut Buffer, Option<&mut Buffer>) {
        (&mut self.re, self.im.as_mut())
    }
}

/// A borrowed access pattern over a matrix's storage.
///
/// Views are created by, and only by, the owning [`Matrix`]; they hold
/// references to its buffers and cannot outlive it. All transforms are pure
/// metadata operations over the layout.
#[derive(Debug, Clone)]
pub struct MatrixView<'a> {
    pub(crate) layout: Layout,
    pub(crate) re: &'a Buffer,
    pub(crate) im: Option<&'a Buffer>,
}

impl<'a> MatrixView<'a> {
    /// Shape of the view.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        self.layout.dims()
    }

    /// Number of dimensions.
    #[inline]
    pub fn ndims(&self) -> usize {
        self.layout.ndims()
    }

    /// Total number of elements addressed by the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    /// True if the view addresses no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// The view's layout.
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Element type of the underlying storage.
    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.re.element_type()
    }

    /// True iff the underlying matrix is strictly real.
    #[inline]
    pub fn is_real(&self) -> bool {
        self.im.is_none()
    }

    /// Real component at the given index, as `f64`.
    pub fn get(&self, index: &[usize]) -> Result<f64> {
        let i = self.layout.linear_index(index)?;
        Ok(self.re.get(i))
    }

    /// Real and imaginary components at the given index.
    pub fn get_complex(&self, index: &[usize]) -> Result<(f64, f64)> {
        let i = self.layout.linear_index(index)?;
        let im = self.im.map_or(0.0, |im| im.get(i));
        Ok((self.re.get(i), im))
    }

    fn with_layout(&self, layout: Layout) -> MatrixView<'a> {
        MatrixView { layout, re: self.re, im: self.im }
    }

    /// Reorder dimensions; data is untouched.
    ///
    /// # Errors
    /// [`ViewError::InvalidPermutation`](rastermat_view::ViewError) unless
    /// `order` is a bijection over the view's dimensions.
    pub fn permute(&self, order: &[usize]) -> Result<MatrixView<'a>> {
        Ok(self.with_layout(self.layout.permute(order)?))
    }

    /// Take an index subset per dimension; data is untouched.
    pub fn select(&self, spans: &[Span]) -> Result<MatrixView<'a>> {
        Ok(self.with_layout(self.layout.select(spans)?))
    }

    /// Expand size-1 dimensions to `target` via stride 0.
    pub fn broadcast(&self, target: &[usize]) -> Result<MatrixView<'a>> {
        Ok(self.with_layout(self.layout.broadcast(target)?))
    }

    /// Swap the dimensions of a rank-2 view.
    pub fn transpose(&self) -> Result<MatrixView<'a>> {
        Ok(self.with_layout(self.layout.transpose_2d()?))
    }

    /// Materialize the view into a fresh matrix in canonical column-major
    /// order. The result shares no storage with the viewed matrix.
    pub fn to_matrix(&self) -> Matrix {
        let ty = self.re.element_type();
        let mut re = Buffer::zeros(ty, self.len());
        let mut im = self.im.map(|_| Buffer::zeros(ty, self.len()));
        for (k, offset) in self.layout.offsets().enumerate() {
            re.set(k, self.re.get(offset));
            if let (Some(out), Some(src)) = (im.as_mut(), self.im) {
                out.set(k, src.get(offset));
            }
        }
        Matrix {
            layout: Layout::col_major(self.dims()),
            re,
            im,
        }
    }
}
