//! Packed raster codec.
//!
//! The toolkit's loader format: a 64-byte header followed by little-endian
//! samples.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "MRAW"
//!      4    16  hint string, NUL-padded ASCII
//!     20     4  width  (u32 LE)
//!     24     4  height (u32 LE)
//!     28     4  precision, bits per sample (u32 LE)
//!     32     4  sample kind (u32 LE): 0 unsigned, 1 signed, 2 float,
//!               3 logical, 4 clamped unsigned
//!     36     4  reserved (u32 LE)
//!     40     4  channels (u32 LE)
//!     44    20  reserved
//!     64     .  samples, row-major [height][width][channel] interleaved
//! ```
//!
//! Samples arrive row-major while matrices are column-major, so decoding
//! overlays the sample order as a `[channels, width, height]` matrix and
//! permutes to the canonical `[height, width, channels]` shape.

use crate::{Buffer, ElementType, Matrix, MatrixError, Result};
use log::{debug, trace};

/// Magic bytes opening every raster stream.
pub const MAGIC: [u8; 4] = *b"MRAW";

/// Total header length; samples start here.
pub const HEADER_LEN: usize = 64;

const KIND_UNSIGNED: u32 = 0;
const KIND_SIGNED: u32 = 1;
const KIND_FLOAT: u32 = 2;
const KIND_LOGICAL: u32 = 3;
const KIND_CLAMPED: u32 = 4;

/// Parsed raster header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader {
    pub hint: String,
    pub width: u32,
    pub height: u32,
    pub precision: u32,
    pub kind: u32,
    pub channels: u32,
}

impl RawHeader {
    /// Parse the fixed 64-byte header.
    ///
    /// # Errors
    /// [`MatrixError::TruncatedRaw`] if fewer than 64 bytes are present;
    /// [`MatrixError::BadMagic`] on a wrong signature.
    pub fn parse(bytes: &[u8]) -> Result<RawHeader> {
        if bytes.len() < HEADER_LEN {
            return Err(MatrixError::TruncatedRaw {
                needed: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[..4] != MAGIC {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&bytes[..4]);
            return Err(MatrixError::BadMagic(magic));
        }
        let hint = String::from_utf8_lossy(&bytes[4..20])
            .trim_end_matches('\0')
            .to_string();
        let field = |i: usize| -> u32 {
            let start = 20 + 4 * i;
            let mut le = [0u8; 4];
            le.copy_from_slice(&bytes[start..start + 4]);
            u32::from_le_bytes(le)
        };
        Ok(RawHeader {
            hint,
            width: field(0),
            height: field(1),
            precision: field(2),
            kind: field(3),
            // field(4) is reserved
            channels: field(5),
        })
    }

    /// Element type declared by the kind/precision pair.
    ///
    /// # Errors
    /// [`MatrixError::UnsupportedSampleFormat`] on an unknown combination.
    pub fn element_type(&self) -> Result<ElementType> {
        let ty = match (self.kind, self.precision) {
            (KIND_UNSIGNED, 8) => ElementType::Uint8,
            (KIND_UNSIGNED, 16) => ElementType::Uint16,
            (KIND_UNSIGNED, 32) => ElementType::Uint32,
            (KIND_SIGNED, 8) => ElementType::Int8,
            (KIND_SIGNED, 16) => ElementType::Int16,
            (KIND_SIGNED, 32) => ElementType::Int32,
            (KIND_FLOAT, 32) => ElementType::Single,
            (KIND_FLOAT, 64) => ElementType::Double,
            (KIND_LOGICAL, 8) => ElementType::Logical,
            (KIND_CLAMPED, 8) => ElementType::Uint8Clamped,
            (kind, precision) => {
                return Err(MatrixError::UnsupportedSampleFormat { kind, precision })
            }
        };
        Ok(ty)
    }

    fn sample_count(&self) -> usize {
        self.height as usize * self.width as usize * self.channels as usize
    }
}

fn kind_of(ty: ElementType) -> (u32, u32) {
    let kind = match ty {
        ElementType::Uint8 | ElementType::Uint16 | ElementType::Uint32 => KIND_UNSIGNED,
        ElementType::Int8 | ElementType::Int16 | ElementType::Int32 => KIND_SIGNED,
        ElementType::Single | ElementType::Double => KIND_FLOAT,
        ElementType::Logical => KIND_LOGICAL,
        ElementType::Uint8Clamped => KIND_CLAMPED,
    };
    (kind, ty.byte_width() as u32 * 8)
}

/// Decode a raster stream into a canonical `[height, width, channels]`
/// matrix (`[height, width]` for a single channel).
pub fn decode(bytes: &[u8]) -> Result<Matrix> {
    let header = RawHeader::parse(bytes)?;
    let ty = header.element_type()?;
    let count = header.sample_count();
    let needed = HEADER_LEN + count * ty.byte_width();
    if bytes.len() < needed {
        return Err(MatrixError::TruncatedRaw {
            needed,
            actual: bytes.len(),
        });
    }
    debug!(
        "decoding {}x{}x{} {} raster (hint {:?})",
        header.height, header.width, header.channels, ty, header.hint
    );
    let samples = Buffer::from_le_bytes(ty, &bytes[HEADER_LEN..needed])?;
    // Row-major [h][w][c] sample order reads directly as a column-major
    // [c, w, h] matrix; permuting flips it into the canonical shape.
    let overlay = Matrix::new(
        &[
            header.channels as usize,
            header.width as usize,
            header.height as usize,
        ],
        samples,
    )?;
    let rank = overlay.ndims();
    let reversal: Vec<usize> = (0..rank).rev().collect();
    let matrix = overlay.view().permute(&reversal)?.to_matrix();
    trace!("decoded raster dims {:?}", matrix.dims());
    Ok(matrix)
}

/// Encode a real matrix as a raster stream.
///
/// Accepts `[height, width]` or `[height, width, channels]` matrices.
///
/// # Errors
/// [`MatrixError::ComplexUnsupported`] for complex input; rank errors
/// propagate as layout errors.
pub fn encode(matrix: &Matrix, hint: &str) -> Result<Vec<u8>> {
    if matrix.is_complex() {
        return Err(MatrixError::ComplexUnsupported);
    }
    let dims = matrix.dims();
    let (height, width, channels) = match dims.len() {
        2 => (dims[0], dims[1], 1),
        3 => (dims[0], dims[1], dims[2]),
        rank => return Err(rastermat_view::ViewError::RankMismatch(rank, 3).into()),
    };
    let ty = matrix.element_type();
    let (kind, precision) = kind_of(ty);
    debug!("encoding {height}x{width}x{channels} {ty} raster (hint {hint:?})");

    // Back into row-major sample order: reverse the dims and materialize.
    let rank = matrix.ndims();
    let reversal: Vec<usize> = (0..rank).rev().collect();
    let samples = matrix.view().permute(&reversal)?.to_matrix();

    let mut out = Vec::with_capacity(HEADER_LEN + matrix.len() * ty.byte_width());
    out.extend_from_slice(&MAGIC);
    let mut hint_bytes = [0u8; 16];
    for (dst, src) in hint_bytes.iter_mut().zip(hint.bytes()) {
        *dst = src;
    }
    out.extend_from_slice(&hint_bytes);
    for value in [
        width as u32,
        height as u32,
        precision,
        kind,
        0u32,
        channels as u32,
    ] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out.extend_from_slice(&[0u8; 20]);
    samples.components().0.extend_le_bytes(&mut out);
    Ok(out)
}
