//! Element-wise math: `abs`, `angle`, `conj`, and the numeric predicates.
//!
//! Every operation has a real-buffer branch and a complex dual-buffer
//! branch, selected on [`Matrix::is_real`]. The in-place methods mutate the
//! receiver through `&mut self` and return nothing; the pure associated
//! forms operate on a copy and leave their argument untouched.

use crate::{Buffer, Matrix};

impl Matrix {
    // ========================================================================
    // In-place forms
    // ========================================================================

    /// Replace every element with its magnitude.
    ///
    /// Real branch: `|x|` per element. Complex branch: the real part becomes
    /// `hypot(re, im)` and the imaginary part is zeroed; the matrix keeps its
    /// two-buffer complex representation.
    pub fn abs_in_place(&mut self) {
        let (re, im) = self.components_mut();
        match im {
            None => re.map_in_place(f64::abs),
            Some(im) => {
                for i in 0..re.len() {
                    let magnitude = re.get(i).hypot(im.get(i));
                    re.set(i, magnitude);
                    im.set(i, 0.0);
                }
            }
        }
    }

    /// Replace every element with its principal argument.
    ///
    /// Real branch: every element becomes 0. Complex branch: the real part
    /// becomes `atan2(im, re)` and the imaginary part is zeroed.
    pub fn angle_in_place(&mut self) {
        let (re, im) = self.components_mut();
        match im {
            None => re.map_in_place(|_| 0.0),
            Some(im) => {
                for i in 0..re.len() {
                    let arg = im.get(i).atan2(re.get(i));
                    re.set(i, arg);
                    im.set(i, 0.0);
                }
            }
        }
    }

    /// Conjugate every element.
    ///
    /// Real branch: nothing to do. Complex branch: the imaginary part is
    /// negated in place.
    pub fn conj_in_place(&mut self) {
        let (_, im) = self.components_mut();
        if let Some(im) = im {
            im.map_in_place(|x| -x);
        }
    }

    // ========================================================================
    // Pure forms
    // ========================================================================

    /// Magnitudes of `m`, as a fresh matrix; `m` is untouched.
    pub fn abs(m: &Matrix) -> Matrix {
        let mut out = m.get_copy();
        out.abs_in_place();
        out
    }

    /// Principal arguments of `m`, as a fresh matrix; `m` is untouched.
    pub fn angle(m: &Matrix) -> Matrix {
        let mut out = m.get_copy();
        out.angle_in_place();
        out
    }

    /// Conjugate of `m`, as a fresh matrix; `m` is untouched. For a real
    /// matrix this is an independent copy of `m`.
    pub fn conj(m: &Matrix) -> Matrix {
        let mut out = m.get_copy();
        out.conj_in_place();
        out
    }

    // ========================================================================
    // Numeric predicates
    // ========================================================================

    fn predicate(
        &self,
        real: impl Fn(f64) -> bool,
        complex: impl Fn(f64, f64) -> bool,
    ) -> Matrix {
        let (re, im) = self.components();
        let mask = match im {
            None => re.map_to_logical(real),
            Some(im) => Buffer::from_slice(
                &(0..re.len())
                    .map(|i| complex(re.get(i), im.get(i)))
                    .collect::<Vec<bool>>(),
            ),
        };
        Matrix {
            layout: self.layout().clone(),
            re: mask,
            im: None,
        }
    }

    /// Per-element NaN test, as a `logical` matrix of the same shape. A
    /// complex element is NaN if either component is.
    pub fn is_nan(&self) -> Matrix {
        self.predicate(f64::is_nan, |re, im| re.is_nan() || im.is_nan())
    }

    /// Per-element infinity test. A complex element is infinite if either
    /// component is.
    pub fn is_inf(&self) -> Matrix {
        self.predicate(f64::is_infinite, |re, im| {
            re.is_infinite() || im.is_infinite()
        })
    }

    /// Per-element finiteness test. A complex element is finite only when
    /// both components are.
    pub fn is_finite(&self) -> Matrix {
        self.predicate(f64::is_finite, |re, im| re.is_finite() && im.is_finite())
    }
}
