//! Broadcasting element-wise arithmetic with type promotion.
//!
//! Shapes combine per the broadcast rule (per dimension: equal sizes, or one
//! side is 1 and expands via stride 0). The output element type is
//! [`ElementType::promote`] of the operand types; the output is complex when
//! either operand is. Results are always freshly allocated and the operands
//! are never modified.

use crate::{Buffer, ElementType, Matrix, Result};
use rastermat_view::broadcast_shape;

fn binary(
    a: &Matrix,
    b: &Matrix,
    real: impl Fn(f64, f64) -> f64,
    complex: impl Fn((f64, f64), (f64, f64)) -> (f64, f64),
) -> Result<Matrix> {
    let shape = broadcast_shape(a.dims(), b.dims())?;
    let ty = ElementType::promote(a.element_type(), b.element_type());
    let av = a.view().broadcast(&shape)?;
    let bv = b.view().broadcast(&shape)?;
    let n = av.len();

    if a.is_real() && b.is_real() {
        let mut out = Buffer::zeros(ty, n);
        if av.layout().is_contiguous() && bv.layout().is_contiguous() {
            for k in 0..n {
                out.set(k, real(av.re.get(k), bv.re.get(k)));
            }
        } else {
            for (k, (oa, ob)) in av.layout().offsets().zip(bv.layout().offsets()).enumerate() {
                out.set(k, real(av.re.get(oa), bv.re.get(ob)));
            }
        }
        Matrix::new(&shape, out)
    } else {
        let mut out_re = Buffer::zeros(ty, n);
        let mut out_im = Buffer::zeros(ty, n);
        for (k, (oa, ob)) in av.layout().offsets().zip(bv.layout().offsets()).enumerate() {
            let x = (av.re.get(oa), av.im.map_or(0.0, |im| im.get(oa)));
            let y = (bv.re.get(ob), bv.im.map_or(0.0, |im| im.get(ob)));
            let (re, im) = complex(x, y);
            out_re.set(k, re);
            out_im.set(k, im);
        }
        Matrix::new_complex(&shape, out_re, out_im)
    }
}

impl Matrix {
    /// Element-wise sum with broadcasting.
    pub fn add(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        binary(a, b, |x, y| x + y, |(ar, ai), (br, bi)| (ar + br, ai + bi))
    }

    /// Element-wise difference with broadcasting.
    pub fn sub(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        binary(a, b, |x, y| x - y, |(ar, ai), (br, bi)| (ar - br, ai - bi))
    }

    /// Element-wise product with broadcasting; complex operands use the full
    /// complex product.
    pub fn mul(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        binary(
            a,
            b,
            |x, y| x * y,
            |(ar, ai), (br, bi)| (ar * br - ai * bi, ar * bi + ai * br),
        )
    }

    /// Element-wise quotient with broadcasting; complex operands use the
    /// full complex quotient.
    pub fn div(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        binary(
            a,
            b,
            |x, y| x / y,
            |(ar, ai), (br, bi)| {
                let denom = br * br + bi * bi;
                ((ar * br + ai * bi) / denom, (ai * br - ar * bi) / denom)
            },
        )
    }

    /// Multiply every element by the real scalar `k`; the result keeps this
    /// matrix's element type.
    pub fn scale(&self, k: f64) -> Matrix {
        let (re, im) = self.components();
        Matrix {
            layout: self.layout().clone(),
            re: re.map_to(re.element_type(), |x| x * k),
            im: im.map(|im| im.map_to(im.element_type(), |x| x * k)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatrixError;
    use rastermat_view::ViewError;

    #[test]
    fn test_add_same_shape() {
        let a = Matrix::from_elems(&[2, 2], &[1.0f64, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::from_elems(&[2, 2], &[10.0f64, 20.0, 30.0, 40.0]).unwrap();
        let sum = Matrix::add(&a, &b).unwrap();
        assert_eq!(sum.as_slice::<f64>().unwrap(), &[11.0, 22.0, 33.0, 44.0]);
    }

    #[test]
    fn test_add_broadcasts_row_and_column() {
        let col = Matrix::from_elems(&[2, 1], &[1.0f64, 2.0]).unwrap();
        let row = Matrix::from_elems(&[1, 3], &[10.0f64, 20.0, 30.0]).unwrap();
        let sum = Matrix::add(&col, &row).unwrap();
        assert_eq!(sum.dims(), &[2, 3]);
        for i in 0..2 {
            for j in 0..3 {
                let expected = (i + 1) as f64 + ((j + 1) * 10) as f64;
                assert_eq!(sum.get(&[i, j]).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_scalar_broadcasts_to_any_rank() {
        let scalar = Matrix::from_elems(&[1, 1], &[5.0f64]).unwrap();
        let cube = Matrix::zeros(&[2, 2, 2], ElementType::Double);
        let out = Matrix::add(&cube, &scalar).unwrap();
        assert_eq!(out.dims(), &[2, 2, 2]);
        assert!(out.as_slice::<f64>().unwrap().iter().all(|&x| x == 5.0));
    }

    #[test]
    fn test_incompatible_shapes() {
        let a = Matrix::zeros(&[2, 3], ElementType::Double);
        let b = Matrix::zeros(&[4, 3], ElementType::Double);
        let err = Matrix::add(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::View(ViewError::ShapeMismatch(_, _))
        ));
    }

    #[test]
    fn test_mixed_types_promote() {
        let bytes = Matrix::from_elems(&[1, 2], &[200u8, 100]).unwrap();
        let floats = Matrix::from_elems(&[1, 2], &[0.5f64, 0.25]).unwrap();
        let sum = Matrix::add(&bytes, &floats).unwrap();
        assert_eq!(sum.element_type(), ElementType::Double);
        assert_eq!(sum.as_slice::<f64>().unwrap(), &[200.5, 100.25]);
    }

    #[test]
    fn test_integer_output_applies_narrowing() {
        let a = Matrix::from_elems(&[1, 2], &[200u8, 100]).unwrap();
        let b = Matrix::from_elems(&[1, 2], &[100u8, 50]).unwrap();
        let sum = Matrix::add(&a, &b).unwrap();
        assert_eq!(sum.element_type(), ElementType::Uint8);
        // 300 wraps to 44 in an unclamped 8-bit store.
        assert_eq!(sum.as_slice::<u8>().unwrap(), &[44, 150]);
    }

    #[test]
    fn test_logical_pair_yields_double() {
        let a = Matrix::from_elems(&[1, 2], &[true, false]).unwrap();
        let b = Matrix::from_elems(&[1, 2], &[true, true]).unwrap();
        let sum = Matrix::add(&a, &b).unwrap();
        assert_eq!(sum.element_type(), ElementType::Double);
        assert_eq!(sum.as_slice::<f64>().unwrap(), &[2.0, 1.0]);
    }

    #[test]
    fn test_complex_mul_matches_hand_product() {
        // (1 + 2i)(3 + 4i) = -5 + 10i
        let a = Matrix::from_elems_complex(&[1, 1], &[1.0f64], &[2.0]).unwrap();
        let b = Matrix::from_elems_complex(&[1, 1], &[3.0f64], &[4.0]).unwrap();
        let prod = Matrix::mul(&a, &b).unwrap();
        assert_eq!(prod.get_complex(&[0, 0]).unwrap(), (-5.0, 10.0));
    }

    #[test]
    fn test_complex_div_inverts_mul() {
        let a = Matrix::from_elems_complex(&[1, 1], &[-5.0f64], &[10.0]).unwrap();
        let b = Matrix::from_elems_complex(&[1, 1], &[3.0f64], &[4.0]).unwrap();
        let q = Matrix::div(&a, &b).unwrap();
        let (re, im) = q.get_complex(&[0, 0]).unwrap();
        assert!((re - 1.0).abs() < 1e-12);
        assert!((im - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_mixed_real_complex_operand() {
        let real = Matrix::from_elems(&[1, 2], &[1.0f64, 2.0]).unwrap();
        let complex = Matrix::from_elems_complex(&[1, 2], &[10.0f64, 20.0], &[1.0, 2.0]).unwrap();
        let sum = Matrix::add(&real, &complex).unwrap();
        assert!(sum.is_complex());
        assert_eq!(sum.as_slice::<f64>().unwrap(), &[11.0, 22.0]);
        assert_eq!(sum.imag_as_slice::<f64>().unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_operands_untouched() {
        let a = Matrix::from_elems(&[1, 2], &[1.0f64, 2.0]).unwrap();
        let b = Matrix::from_elems(&[1, 2], &[3.0f64, 4.0]).unwrap();
        let _ = Matrix::mul(&a, &b).unwrap();
        assert_eq!(a.as_slice::<f64>().unwrap(), &[1.0, 2.0]);
        assert_eq!(b.as_slice::<f64>().unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn test_scale_keeps_type() {
        let m = Matrix::from_elems(&[1, 3], &[10u8, 20, 30]).unwrap();
        let scaled = m.scale(2.0);
        assert_eq!(scaled.element_type(), ElementType::Uint8);
        assert_eq!(scaled.as_slice::<u8>().unwrap(), &[20, 40, 60]);
    }

    #[test]
    fn test_scale_complex() {
        let m = Matrix::from_elems_complex(&[1, 1], &[1.5f64], &[-2.0]).unwrap();
        let scaled = m.scale(2.0);
        assert_eq!(scaled.get_complex(&[0, 0]).unwrap(), (3.0, -4.0));
    }
}
