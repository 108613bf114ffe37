use approx::assert_relative_eq;
use num_complex::Complex64;
use rastermat::{
    inverse_permutation, ElementType, Layout, Matrix, MatrixError, Span, ViewError,
};

fn complex_ramp(rows: usize, cols: usize) -> Matrix {
    let n = rows * cols;
    let re: Vec<f64> = (0..n).map(|k| k as f64 - 3.0).collect();
    let im: Vec<f64> = (0..n).map(|k| 2.0 * k as f64 + 1.0).collect();
    Matrix::from_elems_complex(&[rows, cols], &re, &im).unwrap()
}

#[test]
fn test_conj_of_real_matrix_is_identity_copy() {
    let m = Matrix::from_elems(&[2, 2], &[1.0f64, -2.0, 3.0, -4.0]).unwrap();
    let c = Matrix::conj(&m);
    assert_eq!(c.as_slice::<f64>().unwrap(), m.as_slice::<f64>().unwrap());

    // Independent storage: mutating the conjugate leaves the source alone.
    let mut c = c;
    c.abs_in_place();
    assert_eq!(m.as_slice::<f64>().unwrap(), &[1.0, -2.0, 3.0, -4.0]);
}

#[test]
fn test_conj_is_involution_on_complex() {
    let m = complex_ramp(3, 4);
    let twice = Matrix::conj(&Matrix::conj(&m));
    assert_eq!(twice.as_slice::<f64>().unwrap(), m.as_slice::<f64>().unwrap());
    assert_eq!(
        twice.imag_as_slice::<f64>().unwrap(),
        m.imag_as_slice::<f64>().unwrap()
    );
}

#[test]
fn test_conj_matches_reference_complex() {
    let m = complex_ramp(2, 3);
    let c = Matrix::conj(&m);
    for i in 0..2 {
        for j in 0..3 {
            let (re, im) = m.get_complex(&[i, j]).unwrap();
            let expected = Complex64::new(re, im).conj();
            let (cre, cim) = c.get_complex(&[i, j]).unwrap();
            assert_relative_eq!(cre, expected.re);
            assert_relative_eq!(cim, expected.im);
        }
    }
}

#[test]
fn test_angle_of_real_matrix_is_all_zero() {
    let m = Matrix::from_elems(&[2, 3], &[-5.0f64, -1.0, 0.0, 1.0, 5.0, 100.0]).unwrap();
    let a = Matrix::angle(&m);
    assert_eq!(a.as_slice::<f64>().unwrap(), &[0.0; 6]);
    // Source untouched.
    assert_eq!(m.get(&[0, 0]).unwrap(), -5.0);
}

#[test]
fn test_angle_matches_reference_complex() {
    let m = complex_ramp(2, 2);
    let a = Matrix::angle(&m);
    for i in 0..2 {
        for j in 0..2 {
            let (re, im) = m.get_complex(&[i, j]).unwrap();
            let expected = Complex64::new(re, im).arg();
            assert_relative_eq!(a.get(&[i, j]).unwrap(), expected, epsilon = 1e-12);
            let (_, aim) = a.get_complex(&[i, j]).unwrap();
            assert_eq!(aim, 0.0);
        }
    }
}

#[test]
fn test_abs_matches_reference_complex() {
    let m = complex_ramp(3, 3);
    let a = Matrix::abs(&m);
    for i in 0..3 {
        for j in 0..3 {
            let (re, im) = m.get_complex(&[i, j]).unwrap();
            let expected = Complex64::new(re, im).norm();
            assert_relative_eq!(a.get(&[i, j]).unwrap(), expected, epsilon = 1e-12);
        }
    }
    // The result stays in two-buffer form with a zeroed imaginary part.
    assert!(a.is_complex());
    assert!(a.imag_as_slice::<f64>().unwrap().iter().all(|&x| x == 0.0));
}

#[test]
fn test_abs_scenarios() {
    let mut real = Matrix::from_elems(&[2, 2], &[1.0f64, -2.0, 3.0, -4.0]).unwrap();
    real.abs_in_place();
    assert_eq!(real.as_slice::<f64>().unwrap(), &[1.0, 2.0, 3.0, 4.0]);

    let mut complex = Matrix::from_elems_complex(&[2, 1], &[3.0f64, 0.0], &[4.0, 0.0]).unwrap();
    complex.abs_in_place();
    assert_eq!(complex.as_slice::<f64>().unwrap(), &[5.0, 0.0]);
    assert_eq!(complex.imag_as_slice::<f64>().unwrap(), &[0.0, 0.0]);
}

#[test]
fn test_permute_self_inverse() {
    let layout = Layout::col_major(&[2, 3, 4]);
    let perm = [1, 2, 0];
    let inv = inverse_permutation(&perm);
    let roundtrip = layout.permute(&perm).unwrap().permute(&inv).unwrap();
    assert_eq!(roundtrip.dims(), layout.dims());
    assert_eq!(roundtrip.strides(), layout.strides());
}

#[test]
fn test_permuted_view_round_trips_data() {
    let m = Matrix::from_elems(&[2, 3], &[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let perm = [1, 0];
    let back = m
        .view()
        .permute(&perm)
        .unwrap()
        .to_matrix()
        .view()
        .permute(&inverse_permutation(&perm))
        .unwrap()
        .to_matrix();
    assert_eq!(back.as_slice::<f64>().unwrap(), m.as_slice::<f64>().unwrap());
}

#[test]
fn test_shape_predicates() {
    let scalar = Matrix::zeros(&[1, 1], ElementType::Double);
    assert!(scalar.is_row());
    assert!(scalar.is_column());
    assert!(scalar.is_vector());
    assert!(scalar.is_matrix());

    let m = Matrix::zeros(&[3, 4], ElementType::Double);
    assert!(m.is_matrix());
    assert!(!m.is_vector());
}

#[test]
fn test_cast_saturation_and_truncation() {
    let m = Matrix::from_elems(&[1, 1], &[300.0f64]).unwrap();
    let clamped = m.cast(ElementType::Uint8Clamped);
    assert_eq!(clamped.get(&[0, 0]).unwrap(), 255.0);

    let wrapped = m.cast(ElementType::Int8);
    assert_eq!(wrapped.get(&[0, 0]).unwrap(), 44.0);

    // Shape and source type preserved.
    assert_eq!(clamped.dims(), &[1, 1]);
    assert_eq!(m.element_type(), ElementType::Double);
}

#[test]
fn test_get_copy_isolation() {
    let original = Matrix::from_elems(&[2, 2], &[-1.0f64, 2.0, -3.0, 4.0]).unwrap();
    let mut copy = original.get_copy();
    copy.abs_in_place();
    assert_eq!(copy.as_slice::<f64>().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    assert_eq!(original.as_slice::<f64>().unwrap(), &[-1.0, 2.0, -3.0, 4.0]);
}

#[test]
fn test_complex_component_extraction() {
    let m = complex_ramp(2, 2);
    let re = m.real().unwrap();
    let im = m.imag().unwrap();
    assert!(re.is_real());
    assert!(im.is_real());
    for i in 0..2 {
        for j in 0..2 {
            let (mre, mim) = m.get_complex(&[i, j]).unwrap();
            assert_eq!(re.get(&[i, j]).unwrap(), mre);
            assert_eq!(im.get(&[i, j]).unwrap(), mim);
        }
    }

    let real_only = Matrix::zeros(&[2, 2], ElementType::Double);
    assert!(matches!(real_only.real(), Err(MatrixError::NotComplex)));
}

#[test]
fn test_complex_cast_converts_both_components() {
    let m = Matrix::from_elems_complex(&[1, 2], &[1.9f64, -2.9], &[300.0, 3.5]).unwrap();
    let ints = m.cast(ElementType::Int16);
    assert_eq!(ints.as_slice::<i16>().unwrap(), &[1, -2]);
    assert_eq!(ints.imag_as_slice::<i16>().unwrap(), &[300, 3]);
}

#[test]
fn test_select_then_permute_compose() {
    // A 4x4 ramp; take the odd columns of rows 1..3, then transpose.
    let data: Vec<f64> = (0..16).map(f64::from).collect();
    let m = Matrix::from_elems(&[4, 4], &data).unwrap();
    let sub = m
        .view()
        .select(&[Span::range(1, 2), Span::strided(1, 2, 2)])
        .unwrap()
        .transpose()
        .unwrap()
        .to_matrix();
    assert_eq!(sub.dims(), &[2, 2]);
    for i in 0..2 {
        for j in 0..2 {
            let expected = m.get(&[1 + j, 1 + 2 * i]).unwrap();
            assert_eq!(sub.get(&[i, j]).unwrap(), expected);
        }
    }
}

#[test]
fn test_view_errors_surface() {
    let m = Matrix::zeros(&[2, 3], ElementType::Double);
    let err = m.view().permute(&[0, 0]).unwrap_err();
    assert!(matches!(
        err,
        MatrixError::View(ViewError::InvalidPermutation { .. })
    ));

    let err = m.view().select(&[Span::at(2), Span::at(0)]).unwrap_err();
    assert!(matches!(
        err,
        MatrixError::View(ViewError::IndexOutOfBounds { dim: 0, .. })
    ));
}

#[test]
fn test_broadcast_arithmetic_against_direct_loop() {
    let col: Vec<f64> = (0..5).map(|k| k as f64 * 1.5).collect();
    let row: Vec<f64> = (0..4).map(|k| k as f64 - 2.0).collect();
    let a = Matrix::from_elems(&[5, 1], &col).unwrap();
    let b = Matrix::from_elems(&[1, 4], &row).unwrap();
    let prod = Matrix::mul(&a, &b).unwrap();
    assert_eq!(prod.dims(), &[5, 4]);
    for i in 0..5 {
        for j in 0..4 {
            assert_relative_eq!(prod.get(&[i, j]).unwrap(), col[i] * row[j]);
        }
    }
}

#[test]
fn test_complex_arithmetic_matches_reference() {
    let a = complex_ramp(2, 2);
    let b = {
        let re: Vec<f64> = (0..4).map(|k| 0.5 * k as f64 + 1.0).collect();
        let im: Vec<f64> = (0..4).map(|k| -(k as f64) - 0.5).collect();
        Matrix::from_elems_complex(&[2, 2], &re, &im).unwrap()
    };
    let prod = Matrix::mul(&a, &b).unwrap();
    let quot = Matrix::div(&a, &b).unwrap();
    for i in 0..2 {
        for j in 0..2 {
            let (ar, ai) = a.get_complex(&[i, j]).unwrap();
            let (br, bi) = b.get_complex(&[i, j]).unwrap();
            let x = Complex64::new(ar, ai);
            let y = Complex64::new(br, bi);

            let (pre, pim) = prod.get_complex(&[i, j]).unwrap();
            assert_relative_eq!(pre, (x * y).re, epsilon = 1e-12);
            assert_relative_eq!(pim, (x * y).im, epsilon = 1e-12);

            let (qre, qim) = quot.get_complex(&[i, j]).unwrap();
            assert_relative_eq!(qre, (x / y).re, epsilon = 1e-12);
            assert_relative_eq!(qim, (x / y).im, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_element_type_parse_and_dispatch() {
    let ty: ElementType = "LOGICAL".parse().unwrap();
    let m = Matrix::zeros(&[2, 2], ty);
    assert_eq!(m.element_type(), ElementType::Logical);
    assert_eq!(m.as_slice::<bool>().unwrap(), &[false; 4]);

    let err = "complex128".parse::<ElementType>().unwrap_err();
    assert!(matches!(err, MatrixError::UnknownType(_)));
}

#[test]
fn test_raw_round_trip_via_views() {
    // Encode a two-channel float raster and pull a channel plane back out.
    let mut m = Matrix::zeros(&[3, 4, 2], ElementType::Single);
    for y in 0..3 {
        for x in 0..4 {
            m.set(&[y, x, 0], (y * 4 + x) as f64).unwrap();
            m.set(&[y, x, 1], -((y * 4 + x) as f64)).unwrap();
        }
    }
    let bytes = rastermat::raw::encode(&m, "two planes").unwrap();
    let back = rastermat::raw::decode(&bytes).unwrap();
    assert_eq!(back.dims(), &[3, 4, 2]);

    let plane = back
        .view()
        .select(&[Span::prefix(3), Span::prefix(4), Span::at(1)])
        .unwrap()
        .to_matrix();
    assert_eq!(plane.dims(), &[3, 4]);
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(plane.get(&[y, x]).unwrap(), -((y * 4 + x) as f64));
        }
    }
}

#[test]
fn test_predicate_pipeline_on_cast_data() {
    // NaN and Inf survive a double -> single cast and are flagged.
    let m = Matrix::from_elems(&[1, 3], &[1.0f64, f64::NAN, f64::INFINITY]).unwrap();
    let single = m.cast(ElementType::Single);
    assert_eq!(
        single.is_nan().as_slice::<bool>().unwrap(),
        &[false, true, false]
    );
    assert_eq!(
        single.is_finite().as_slice::<bool>().unwrap(),
        &[true, false, false]
    );

    // Casting to an integer type maps non-finite values to 0.
    let ints = m.cast(ElementType::Int32);
    assert_eq!(ints.as_slice::<i32>().unwrap(), &[1, 0, 0]);
}
