//! Runtime element-type tags.
//!
//! Every buffer carries exactly one [`ElementType`]. Tags parse from
//! MATLAB-style names with their historical aliases (`"logical"`, `"bool"`,
//! and `"boolean"` are the same type), case-insensitively.

use crate::MatrixError;
use std::fmt;
use std::str::FromStr;

/// Element type of a flat buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Unsigned 8-bit integer with saturating (clamped) stores.
    Uint8Clamped,
    /// 32-bit float.
    Single,
    /// 64-bit float.
    Double,
    /// Boolean mask element.
    Logical,
}

impl ElementType {
    /// Canonical lowercase tag name.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Int8 => "int8",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
            ElementType::Uint8 => "uint8",
            ElementType::Uint16 => "uint16",
            ElementType::Uint32 => "uint32",
            ElementType::Uint8Clamped => "uint8c",
            ElementType::Single => "single",
            ElementType::Double => "double",
            ElementType::Logical => "logical",
        }
    }

    /// Width of one element in bytes, as stored and as serialized.
    pub fn byte_width(self) -> usize {
        match self {
            ElementType::Int8 | ElementType::Uint8 | ElementType::Uint8Clamped => 1,
            ElementType::Int16 | ElementType::Uint16 => 2,
            ElementType::Int32 | ElementType::Uint32 | ElementType::Single => 4,
            ElementType::Double => 8,
            ElementType::Logical => 1,
        }
    }

    /// True for `single` and `double`.
    pub fn is_float(self) -> bool {
        matches!(self, ElementType::Single | ElementType::Double)
    }

    /// True for the integer tags, clamped included.
    pub fn is_integer(self) -> bool {
        !self.is_float() && self != ElementType::Logical
    }

    fn promotion_rank(self) -> u8 {
        match self {
            ElementType::Logical => 0,
            ElementType::Int8 => 1,
            ElementType::Uint8 => 2,
            ElementType::Uint8Clamped => 3,
            ElementType::Int16 => 4,
            ElementType::Uint16 => 5,
            ElementType::Int32 => 6,
            ElementType::Uint32 => 7,
            ElementType::Single => 8,
            ElementType::Double => 9,
        }
    }

    /// Output element type for mixed-type binary arithmetic.
    ///
    /// The wider type wins; arithmetic between two `logical` masks yields
    /// `double`, so masks combine into numbers rather than a mask.
    pub fn promote(a: ElementType, b: ElementType) -> ElementType {
        if a == ElementType::Logical && b == ElementType::Logical {
            return ElementType::Double;
        }
        if a.promotion_rank() >= b.promotion_rank() {
            a
        } else {
            b
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = MatrixError;

    /// Parse a tag, case-insensitively, accepting the historical aliases.
    fn from_str(tag: &str) -> Result<Self, MatrixError> {
        match tag.to_ascii_lowercase().as_str() {
            "int8" => Ok(ElementType::Int8),
            "int16" => Ok(ElementType::Int16),
            "int32" => Ok(ElementType::Int32),
            "uint8" => Ok(ElementType::Uint8),
            "uint16" => Ok(ElementType::Uint16),
            "uint32" => Ok(ElementType::Uint32),
            "uint8c" | "uint8clamped" => Ok(ElementType::Uint8Clamped),
            "single" | "float32" | "float" => Ok(ElementType::Single),
            "double" | "float64" => Ok(ElementType::Double),
            "logical" | "bool" | "boolean" => Ok(ElementType::Logical),
            _ => Err(MatrixError::UnknownType(tag.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for ty in [
            ElementType::Int8,
            ElementType::Int16,
            ElementType::Int32,
            ElementType::Uint8,
            ElementType::Uint16,
            ElementType::Uint32,
            ElementType::Uint8Clamped,
            ElementType::Single,
            ElementType::Double,
            ElementType::Logical,
        ] {
            assert_eq!(ty.name().parse::<ElementType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_parse_aliases_and_case() {
        assert_eq!("BOOL".parse::<ElementType>().unwrap(), ElementType::Logical);
        assert_eq!("Boolean".parse::<ElementType>().unwrap(), ElementType::Logical);
        assert_eq!("Logical".parse::<ElementType>().unwrap(), ElementType::Logical);
        assert_eq!("FLOAT32".parse::<ElementType>().unwrap(), ElementType::Single);
        assert_eq!("float64".parse::<ElementType>().unwrap(), ElementType::Double);
        assert_eq!(
            "Uint8Clamped".parse::<ElementType>().unwrap(),
            ElementType::Uint8Clamped
        );
    }

    #[test]
    fn test_parse_unknown_tag() {
        let err = "quadruple".parse::<ElementType>().unwrap_err();
        match err {
            MatrixError::UnknownType(tag) => assert_eq!(tag, "quadruple"),
            e => panic!("expected UnknownType, got: {e:?}"),
        }
    }

    #[test]
    fn test_promote_wider_wins() {
        use ElementType::*;
        assert_eq!(ElementType::promote(Int8, Double), Double);
        assert_eq!(ElementType::promote(Uint8, Int16), Int16);
        assert_eq!(ElementType::promote(Uint32, Single), Single);
        assert_eq!(ElementType::promote(Int32, Int32), Int32);
        assert_eq!(ElementType::promote(Logical, Uint8), Uint8);
    }

    #[test]
    fn test_promote_logical_pair_is_double() {
        assert_eq!(
            ElementType::promote(ElementType::Logical, ElementType::Logical),
            ElementType::Double
        );
    }

    #[test]
    fn test_byte_widths() {
        assert_eq!(ElementType::Uint8Clamped.byte_width(), 1);
        assert_eq!(ElementType::Int16.byte_width(), 2);
        assert_eq!(ElementType::Single.byte_width(), 4);
        assert_eq!(ElementType::Double.byte_width(), 8);
        assert_eq!(ElementType::Logical.byte_width(), 1);
    }
}
