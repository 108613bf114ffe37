//! Flat typed buffers and the narrowing rules applied on store.
//!
//! A [`Buffer`] is a homogeneous, fixed-length sequence of elements of one
//! [`ElementType`]. All math routes values through `f64` (every supported
//! element type round-trips exactly through a 64-bit float) and the
//! destination type's conversion rule is applied on every store:
//!
//! - floats keep (or round to) their width,
//! - integers truncate toward zero and wrap to the destination width,
//!   storing 0 for non-finite values,
//! - `uint8c` saturates to `[0, 255]`, rounding half to even,
//! - `logical` stores `value != 0` (NaN stores false).

use crate::{ElementType, MatrixError, Result};

mod convert {
    fn trunc(v: f64) -> i64 {
        if v.is_finite() {
            v.trunc() as i64
        } else {
            0
        }
    }

    pub fn to_i8(v: f64) -> i8 {
        trunc(v) as i8
    }

    pub fn to_i16(v: f64) -> i16 {
        trunc(v) as i16
    }

    pub fn to_i32(v: f64) -> i32 {
        trunc(v) as i32
    }

    pub fn to_u8(v: f64) -> u8 {
        trunc(v) as u8
    }

    pub fn to_u16(v: f64) -> u16 {
        trunc(v) as u16
    }

    pub fn to_u32(v: f64) -> u32 {
        trunc(v) as u32
    }

    /// Clamp to `[0, 255]`, rounding half to even.
    pub fn to_u8_clamped(v: f64) -> u8 {
        if !(v > 0.0) {
            return 0;
        }
        if v >= 255.0 {
            return 255;
        }
        let floor = v.floor();
        let frac = v - floor;
        let rounded = if frac > 0.5 {
            floor + 1.0
        } else if frac < 0.5 {
            floor
        } else if (floor as u8) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        };
        rounded as u8
    }

    pub fn to_bool(v: f64) -> bool {
        !v.is_nan() && v != 0.0
    }
}

// ============================================================================
// Scalar: Rust types usable as typed elements
// ============================================================================

mod sealed {
    pub trait Sealed {}
}

/// Rust scalar types that map onto an [`ElementType`].
///
/// `u8` maps to `uint8`; the clamped `uint8c` buffers share its storage but
/// are only reachable through tagged constructors and casts.
pub trait Scalar: Copy + sealed::Sealed + 'static {
    /// Tag of buffers holding this type.
    const ELEMENT_TYPE: ElementType;

    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;

    #[doc(hidden)]
    fn buffer_from_vec(data: Vec<Self>) -> Buffer;
    #[doc(hidden)]
    fn slice_of(buffer: &Buffer) -> Option<&[Self]>;
}

macro_rules! impl_scalar {
    ($ty:ty, $variant:ident, $from:path) => {
        impl sealed::Sealed for $ty {}

        impl Scalar for $ty {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;

            #[inline]
            fn to_f64(self) -> f64 {
                num_traits::ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                $from(v)
            }

            fn buffer_from_vec(data: Vec<Self>) -> Buffer {
                Buffer::$variant(data)
            }

            fn slice_of(buffer: &Buffer) -> Option<&[Self]> {
                match buffer {
                    Buffer::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

fn f64_id(v: f64) -> f64 {
    v
}

fn f64_to_f32(v: f64) -> f32 {
    v as f32
}

impl_scalar!(i8, Int8, convert::to_i8);
impl_scalar!(i16, Int16, convert::to_i16);
impl_scalar!(i32, Int32, convert::to_i32);
impl_scalar!(u8, Uint8, convert::to_u8);
impl_scalar!(u16, Uint16, convert::to_u16);
impl_scalar!(u32, Uint32, convert::to_u32);
impl_scalar!(f32, Single, f64_to_f32);
impl_scalar!(f64, Double, f64_id);

impl sealed::Sealed for bool {}

impl Scalar for bool {
    const ELEMENT_TYPE: ElementType = ElementType::Logical;

    #[inline]
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        convert::to_bool(v)
    }

    fn buffer_from_vec(data: Vec<Self>) -> Buffer {
        Buffer::Logical(data)
    }

    fn slice_of(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::Logical(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Buffer
// ============================================================================

/// A flat, homogeneously typed element buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Uint8Clamped(Vec<u8>),
    Single(Vec<f32>),
    Double(Vec<f64>),
    Logical(Vec<bool>),
}

impl Buffer {
    /// A zero-filled buffer of the given type and length.
    pub fn zeros(ty: ElementType, len: usize) -> Buffer {
        match ty {
            ElementType::Int8 => Buffer::Int8(vec![0; len]),
            ElementType::Int16 => Buffer::Int16(vec![0; len]),
            ElementType::Int32 => Buffer::Int32(vec![0; len]),
            ElementType::Uint8 => Buffer::Uint8(vec![0; len]),
            ElementType::Uint16 => Buffer::Uint16(vec![0; len]),
            ElementType::Uint32 => Buffer::Uint32(vec![0; len]),
            ElementType::Uint8Clamped => Buffer::Uint8Clamped(vec![0; len]),
            ElementType::Single => Buffer::Single(vec![0.0; len]),
            ElementType::Double => Buffer::Double(vec![0.0; len]),
            ElementType::Logical => Buffer::Logical(vec![false; len]),
        }
    }

    /// A buffer of `T::ELEMENT_TYPE` copied from a typed slice.
    pub fn from_slice<T: Scalar>(data: &[T]) -> Buffer {
        T::buffer_from_vec(data.to_vec())
    }

    /// A buffer of the given type filled from `f64` values, applying the
    /// destination type's conversion rule per element.
    pub fn from_f64s(ty: ElementType, data: &[f64]) -> Buffer {
        let mut out = Buffer::zeros(ty, data.len());
        for (i, &v) in data.iter().enumerate() {
            out.set(i, v);
        }
        out
    }

    /// Element type tag of this buffer.
    pub fn element_type(&self) -> ElementType {
        match self {
            Buffer::Int8(_) => ElementType::Int8,
            Buffer::Int16(_) => ElementType::Int16,
            Buffer::Int32(_) => ElementType::Int32,
            Buffer::Uint8(_) => ElementType::Uint8,
            Buffer::Uint16(_) => ElementType::Uint16,
            Buffer::Uint32(_) => ElementType::Uint32,
            Buffer::Uint8Clamped(_) => ElementType::Uint8Clamped,
            Buffer::Single(_) => ElementType::Single,
            Buffer::Double(_) => ElementType::Double,
            Buffer::Logical(_) => ElementType::Logical,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Buffer::Int8(v) => v.len(),
            Buffer::Int16(v) => v.len(),
            Buffer::Int32(v) => v.len(),
            Buffer::Uint8(v) | Buffer::Uint8Clamped(v) => v.len(),
            Buffer::Uint16(v) => v.len(),
            Buffer::Uint32(v) => v.len(),
            Buffer::Single(v) => v.len(),
            Buffer::Double(v) => v.len(),
            Buffer::Logical(v) => v.len(),
        }
    }

    /// True if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read element `i` as `f64` (`logical` reads as 0 or 1).
    ///
    /// # Panics
    /// Panics if `i` is out of bounds.
    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        match self {
            Buffer::Int8(v) => v[i] as f64,
            Buffer::Int16(v) => v[i] as f64,
            Buffer::Int32(v) => v[i] as f64,
            Buffer::Uint8(v) | Buffer::Uint8Clamped(v) => v[i] as f64,
            Buffer::Uint16(v) => v[i] as f64,
            Buffer::Uint32(v) => v[i] as f64,
            Buffer::Single(v) => v[i] as f64,
            Buffer::Double(v) => v[i],
            Buffer::Logical(v) => {
                if v[i] {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Store `value` at element `i`, applying this buffer's conversion rule.
    ///
    /// # Panics
    /// Panics if `i` is out of bounds.
    #[inline]
    pub fn set(&mut self, i: usize, value: f64) {
        match self {
            Buffer::Int8(v) => v[i] = convert::to_i8(value),
            Buffer::Int16(v) => v[i] = convert::to_i16(value),
            Buffer::Int32(v) => v[i] = convert::to_i32(value),
            Buffer::Uint8(v) => v[i] = convert::to_u8(value),
            Buffer::Uint16(v) => v[i] = convert::to_u16(value),
            Buffer::Uint32(v) => v[i] = convert::to_u32(value),
            Buffer::Uint8Clamped(v) => v[i] = convert::to_u8_clamped(value),
            Buffer::Single(v) => v[i] = value as f32,
            Buffer::Double(v) => v[i] = value,
            Buffer::Logical(v) => v[i] = convert::to_bool(value),
        }
    }

    /// Apply `f` to every element in place.
    ///
    /// The float variants run a direct typed loop; the rest route through
    /// the `f64` accessors.
    pub fn map_in_place(&mut self, f: impl Fn(f64) -> f64) {
        match self {
            Buffer::Double(v) => {
                for x in v.iter_mut() {
                    *x = f(*x);
                }
            }
            Buffer::Single(v) => {
                for x in v.iter_mut() {
                    *x = f(*x as f64) as f32;
                }
            }
            _ => {
                for i in 0..self.len() {
                    let y = f(self.get(i));
                    self.set(i, y);
                }
            }
        }
    }

    /// A fresh buffer of type `ty` with `f` applied to every element.
    pub fn map_to(&self, ty: ElementType, f: impl Fn(f64) -> f64) -> Buffer {
        let mut out = Buffer::zeros(ty, self.len());
        for i in 0..self.len() {
            out.set(i, f(self.get(i)));
        }
        out
    }

    /// A fresh `logical` buffer with the predicate applied to every element.
    pub fn map_to_logical(&self, f: impl Fn(f64) -> bool) -> Buffer {
        Buffer::Logical((0..self.len()).map(|i| f(self.get(i))).collect())
    }

    /// Convert to a fresh buffer of type `ty` under the destination type's
    /// narrowing rule. Always allocates; `self` is never modified.
    pub fn cast(&self, ty: ElementType) -> Buffer {
        self.map_to(ty, |x| x)
    }

    /// Borrow the typed storage if `T` matches this buffer's variant.
    pub fn as_slice<T: Scalar>(&self) -> Option<&[T]> {
        T::slice_of(self)
    }

    // ========================================================================
    // Little-endian sample codec
    // ========================================================================

    /// Decode a packed little-endian sample region into a buffer of `ty`.
    ///
    /// `bytes.len()` must be a multiple of the element width; callers
    /// validate the sample count beforehand.
    pub fn from_le_bytes(ty: ElementType, bytes: &[u8]) -> Result<Buffer> {
        let width = ty.byte_width();
        if bytes.len() % width != 0 {
            return Err(MatrixError::TruncatedRaw {
                needed: bytes.len().div_ceil(width) * width,
                actual: bytes.len(),
            });
        }
        let buffer = match ty {
            ElementType::Int8 => Buffer::Int8(bytes.iter().map(|&b| b as i8).collect()),
            ElementType::Uint8 => Buffer::Uint8(bytes.to_vec()),
            ElementType::Uint8Clamped => Buffer::Uint8Clamped(bytes.to_vec()),
            ElementType::Logical => Buffer::Logical(bytes.iter().map(|&b| b != 0).collect()),
            ElementType::Int16 => Buffer::Int16(read_le::<i16>(bytes)),
            ElementType::Uint16 => Buffer::Uint16(read_le::<u16>(bytes)),
            ElementType::Int32 => Buffer::Int32(read_le::<i32>(bytes)),
            ElementType::Uint32 => Buffer::Uint32(read_le::<u32>(bytes)),
            ElementType::Single => Buffer::Single(read_le::<f32>(bytes)),
            ElementType::Double => Buffer::Double(read_le::<f64>(bytes)),
        };
        Ok(buffer)
    }

    /// Append every element to `out` in packed little-endian form.
    pub fn extend_le_bytes(&self, out: &mut Vec<u8>) {
        match self {
            Buffer::Int8(v) => out.extend(v.iter().map(|&x| x as u8)),
            Buffer::Uint8(v) | Buffer::Uint8Clamped(v) => out.extend_from_slice(v),
            Buffer::Logical(v) => out.extend(v.iter().map(|&x| x as u8)),
            Buffer::Int16(v) => write_le(v, out),
            Buffer::Uint16(v) => write_le(v, out),
            Buffer::Int32(v) => write_le(v, out),
            Buffer::Uint32(v) => write_le(v, out),
            Buffer::Single(v) => write_le(v, out),
            Buffer::Double(v) => write_le(v, out),
        }
    }
}

fn read_le<T: bytemuck::Pod>(bytes: &[u8]) -> Vec<T> {
    bytes
        .chunks_exact(std::mem::size_of::<T>())
        .map(|chunk| {
            let mut le = [0u8; 8];
            let le = &mut le[..chunk.len()];
            le.copy_from_slice(chunk);
            if cfg!(target_endian = "big") {
                le.reverse();
            }
            bytemuck::pod_read_unaligned(le)
        })
        .collect()
}

fn write_le<T: bytemuck::Pod>(values: &[T], out: &mut Vec<u8>) {
    for value in values {
        let mut bytes = bytemuck::bytes_of(value).to_vec();
        if cfg!(target_endian = "big") {
            bytes.reverse();
        }
        out.extend_from_slice(&bytes);
    }
}
