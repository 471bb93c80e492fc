// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module contains an implementation of imaginary class groups. Elements are represented by
//! binary quadratic forms which form a group under composition. Here we use additive notation
//! for the composition.
//!
//! The composition and duplication algorithms (NUCOMP and NUDUPL) leave their result in a
//! near-reduced state; the public group operations reduce immediately while the scalar
//! multiplication defers reduction to a [Reducer] which only runs when the coefficients have
//! outgrown a per-discriminant bound.

use crate::class_group::discriminant::Discriminant;
use crate::class_group::reduction::Reducer;
use crate::error::VdfError::InvalidInput;
use crate::error::VdfResult;
use crate::math::extended_gcd::{extended_euclidean_algorithm, EuclideanAlgorithmOutput};
use crate::ParameterizedGroupElement;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::mem::swap;
use std::ops::{Add, Neg};

pub mod compressed;
pub mod discriminant;
pub mod reduction;

/// A binary quadratic form, (a, b, c) for arbitrary integers a, b, and c.
///
/// The `partial_gcd_limit` variable must be equal to `|discriminant|^{1/4}` and is used to speed
/// up the composition algorithm.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct QuadraticForm {
    a: BigInt,
    b: BigInt,
    c: BigInt,
    partial_gcd_limit: BigInt,
}

impl QuadraticForm {
    /// Create a new quadratic form given only the a and b coefficients and the discriminant.
    /// Returns an error if `a` is not positive or if `(a, b)` does not define a form of the
    /// given discriminant.
    pub fn from_a_b_discriminant(
        a: BigInt,
        b: BigInt,
        discriminant: &Discriminant,
    ) -> VdfResult<Self> {
        if !a.is_positive() {
            return Err(InvalidInput);
        }
        let numerator = b.pow(2) - discriminant.as_bigint();
        let denominator = &a << 2;
        if !numerator.is_multiple_of(&denominator) {
            return Err(InvalidInput);
        }
        let c = numerator / denominator;
        Ok(Self {
            a,
            b,
            c,
            // This limit is used by the partial Euclidean algorithm in composition and
            // duplication.
            partial_gcd_limit: discriminant.as_bigint().abs().nth_root(4),
        })
    }

    /// Return a generator (or, more precisely, an element with a presumed large order) in a
    /// class group with a given discriminant. We use the element `(2, 1, c)` where `c` is
    /// determined from the discriminant.
    pub fn generator(discriminant: &Discriminant) -> Self {
        Self::from_a_b_discriminant(BigInt::from(2), BigInt::one(), discriminant)
            .expect("Always succeeds when the discriminant is 1 mod 8")
    }

    /// Compute the discriminant `b^2 - 4ac` for this quadratic form.
    pub fn discriminant(&self) -> Discriminant {
        Discriminant::try_from(self.b.pow(2) - ((&self.a * &self.c) << 2))
            .expect("The discriminant is checked in the constructors")
    }

    /// Compute the composition of this quadratic form with another quadratic form and reduce the
    /// result.
    pub fn compose(&self, rhs: &QuadraticForm) -> QuadraticForm {
        let mut result = self.compose_impl(rhs);
        result.reduce();
        result
    }

    /// Compute the composition of this quadratic form with another quadratic form without
    /// reducing the result.
    fn compose_impl(&self, rhs: &QuadraticForm) -> QuadraticForm {
        // Slightly optimised version of Algorithm 1 from Jacobson, Jr, Michael & Poorten, Alfred
        // (2002). "Computational aspects of NUCOMP", Lecture Notes in Computer Science.
        // (https://www.researchgate.net/publication/221451638_Computational_aspects_of_NUCOMP)
        // The paragraph numbers and variable names follow the paper.

        let (mut u1, mut v1, mut w1) = (&self.a, &self.b, &self.c);
        let (mut u2, mut v2, mut w2) = (&rhs.a, &rhs.b, &rhs.c);

        // 1.
        if w1 < w2 {
            swap(&mut u1, &mut u2);
            swap(&mut v1, &mut v2);
            swap(&mut w1, &mut w2);
        }
        let s: BigInt = (v1 + v2) >> 1;
        let m = v2 - &s;

        // 2.
        let EuclideanAlgorithmOutput {
            gcd: f,
            x: b,
            y: c,
            a_divided_by_gcd: mut capital_cy,
            b_divided_by_gcd: mut capital_by,
        } = extended_euclidean_algorithm(u2, u1);

        let (q, r) = s.div_rem(&f);
        let (g, capital_bx, capital_dy) = if r.is_zero() {
            (f, &m * &b, q)
        } else {
            // 3.
            let EuclideanAlgorithmOutput {
                gcd: g,
                x: _,
                y,
                a_divided_by_gcd: h,
                b_divided_by_gcd,
            } = extended_euclidean_algorithm(&f, &s);
            capital_by *= &h;
            capital_cy *= &h;

            // 4.
            let l = (&y * (&b * (w1.mod_floor(&h)) + &c * (w2.mod_floor(&h)))).mod_floor(&h);
            (
                g,
                &b * (&m / &h) + &l * (&capital_by / &h),
                b_divided_by_gcd,
            )
        };

        // 5. (partial xgcd)
        let mut bx = capital_bx.mod_floor(&capital_by);
        let mut by = capital_by.clone();

        let mut x = BigInt::one();
        let mut y = BigInt::zero();
        let mut z = 0u32;

        while by.abs() > self.partial_gcd_limit && !bx.is_zero() {
            let (q, t) = by.div_rem(&bx);
            by = bx;
            bx = t;
            swap(&mut x, &mut y);
            x -= &q * &y;
            z += 1;
        }

        if z.is_odd() {
            by = -by;
            y = -y;
        }

        let u3: BigInt;
        let w3: BigInt;
        let v3: BigInt;

        if z == 0 {
            // 6.
            let q = &capital_cy * &bx;
            let cx = (&q - &m) / &capital_by;
            let dx = (&bx * &capital_dy - w2) / &capital_by;
            u3 = &by * &capital_cy;
            w3 = &bx * &cx - &g * &dx;
            v3 = v2 - (&q << 1);
        } else {
            // 7.
            let cx = (&capital_cy * &bx - &m * &x) / &capital_by;
            let q1 = &by * &cx;
            let q2 = &q1 + &m;
            let dx = (&capital_dy * &bx - w2 * &x) / &capital_by;
            let q3 = &y * &dx;
            let q4 = &q3 + &capital_dy;
            let dy = &q4 / &x;
            let cy = if !b.is_zero() {
                &q2 / &bx
            } else {
                (&cx * &dy - w1) / &dx
            };

            u3 = &by * &cy - &g * &y * &dy;
            w3 = &bx * &cx - &g * &x * &dx;
            v3 = &g * (&q3 + &q4) - &q1 - &q2;
        }

        QuadraticForm {
            a: u3,
            b: v3,
            c: w3,
            partial_gcd_limit: self.partial_gcd_limit.clone(),
        }
    }

    /// Compute 2 * self without reducing the result.
    fn double_impl(&self) -> QuadraticForm {
        // Slightly optimised version of Algorithm 2 from Jacobson, Jr, Michael & Poorten, Alfred
        // (2002). "Computational aspects of NUCOMP", Lecture Notes in Computer Science.
        // (https://www.researchgate.net/publication/221451638_Computational_aspects_of_NUCOMP)
        // The paragraph numbers and variable names follow the paper.

        let u = &self.a;
        let v = &self.b;
        let w = &self.c;

        let EuclideanAlgorithmOutput {
            gcd: g,
            x: _,
            y,
            a_divided_by_gcd: capital_by,
            b_divided_by_gcd: capital_dy,
        } = extended_euclidean_algorithm(u, v);

        let mut bx = (&y * w).mod_floor(&capital_by);
        let mut by = capital_by.clone();

        let mut x = BigInt::one();
        let mut y = BigInt::zero();
        let mut z = 0u32;

        while by.abs() > self.partial_gcd_limit && !bx.is_zero() {
            let (q, t) = by.div_rem(&bx);
            by = bx;
            bx = t;
            swap(&mut x, &mut y);
            x -= &q * &y;
            z += 1;
        }

        if z.is_odd() {
            by = -by;
            y = -y;
        }

        let mut u3: BigInt;
        let mut w3: BigInt;
        let mut v3: BigInt;

        if z == 0 {
            let dx = (&bx * &capital_dy - w) / &capital_by;
            u3 = &by * &by;
            w3 = &bx * &bx;
            let s = &bx + &by;
            v3 = v - &s * &s + &u3 + &w3;
            w3 = &w3 - &g * &dx;
        } else {
            let dx = (&bx * &capital_dy - w * &x) / &capital_by;
            let q1 = &dx * &y;
            let mut dy = &q1 + &capital_dy;
            v3 = &g * (&dy + &q1);
            dy = &dy / &x;
            u3 = &by * &by;
            w3 = &bx * &bx;
            v3 = &v3 - (&bx + &by).pow(2) + &u3 + &w3;

            u3 = &u3 - &g * &y * &dy;
            w3 = &w3 - &g * &x * &dx;
        }

        QuadraticForm {
            a: u3,
            b: v3,
            c: w3,
            partial_gcd_limit: self.partial_gcd_limit.clone(),
        }
    }

    /// Compute `scale * self` by left-to-right binary expansion of the scalar, deferring
    /// reduction of the accumulator to the given [Reducer]: after every duplication the
    /// accumulator is reduced only if its `a` coefficient has outgrown the per-discriminant
    /// bound, and one mandatory reduction canonicalizes the result before returning. The scalar
    /// must be non-negative. A zero scalar returns the identity immediately without using the
    /// reducer.
    pub fn mul_with_reducer(&self, scale: &BigInt, reducer: &mut Reducer) -> QuadraticForm {
        debug_assert!(!scale.is_negative());
        if scale.is_zero() {
            return Self::zero(&self.discriminant());
        }

        let mut result = self.clone();
        for i in (0..scale.bits() - 1).rev() {
            result = result.double_impl();
            reducer.reduce_if_oversized(&mut result);
            if scale.bit(i) {
                result = result.compose_impl(self);
            }
        }
        reducer.reduce(&mut result);
        result
    }
}

impl ParameterizedGroupElement for QuadraticForm {
    /// The discriminant of a quadratic form defines the class group.
    type ParameterType = Discriminant;

    type ScalarType = BigInt;

    fn zero(discriminant: &Self::ParameterType) -> Self {
        Self::from_a_b_discriminant(BigInt::one(), BigInt::one(), discriminant)
            .expect("Always succeeds when the discriminant is 1 mod 4")
    }

    fn double(&self) -> Self {
        let mut result = self.double_impl();
        result.reduce();
        result
    }

    fn mul(&self, scale: &BigInt) -> Self {
        let mut reducer = Reducer::new(&self.discriminant());
        self.mul_with_reducer(scale, &mut reducer)
    }

    fn same_group(&self, other: &Self) -> bool {
        self.discriminant() == other.discriminant()
    }
}

impl Add<&QuadraticForm> for QuadraticForm {
    type Output = QuadraticForm;

    fn add(self, rhs: &QuadraticForm) -> Self::Output {
        self.compose(rhs)
    }
}

impl Add<QuadraticForm> for QuadraticForm {
    type Output = QuadraticForm;

    fn add(self, rhs: QuadraticForm) -> Self::Output {
        self.compose(&rhs)
    }
}

impl Add<&QuadraticForm> for &QuadraticForm {
    type Output = QuadraticForm;

    fn add(self, rhs: &QuadraticForm) -> Self::Output {
        self.compose(rhs)
    }
}

impl Neg for QuadraticForm {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            a: self.a,
            b: self.b.neg(),
            c: self.c,
            partial_gcd_limit: self.partial_gcd_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parameter;

    #[test]
    fn test_multiplication() {
        let discriminant = Discriminant::try_from(BigInt::from(-47)).unwrap();
        let generator = QuadraticForm::generator(&discriminant);
        let mut current = QuadraticForm::zero(&discriminant);
        for i in 0..1000 {
            assert_eq!(current, generator.mul(&BigInt::from(i)));
            current = current + &generator;
        }
    }

    #[test]
    fn test_composition() {
        // The order of the class group (the class number) for -223 is 7 (see
        // https://mathworld.wolfram.com/ClassNumber.html).
        let discriminant = Discriminant::try_from(BigInt::from(-223)).unwrap();
        let g = QuadraticForm::generator(&discriminant);

        for i in 1..=6 {
            assert_ne!(QuadraticForm::zero(&discriminant), g.mul(&BigInt::from(i)));
        }
        assert_eq!(QuadraticForm::zero(&discriminant), g.mul(&BigInt::from(7)));
    }

    #[test]
    fn test_identity_scalar() {
        let discriminant = Discriminant::try_from(BigInt::from(-223)).unwrap();
        let g = QuadraticForm::generator(&discriminant);

        let mut reducer = Reducer::new(&discriminant);
        assert_eq!(
            QuadraticForm::zero(&discriminant),
            g.mul_with_reducer(&BigInt::zero(), &mut reducer)
        );
        assert_eq!(QuadraticForm::zero(&discriminant), g.mul(&BigInt::zero()));
    }

    #[test]
    fn test_mul_matches_repeated_composition() {
        let discriminant = Discriminant::from_seed(b"differential test", 512).unwrap();
        let g = QuadraticForm::generator(&discriminant);
        let mut reducer = Reducer::new(&discriminant);

        let mut expected = QuadraticForm::zero(&discriminant);
        for e in 0u64..=64 {
            assert_eq!(expected, g.mul_with_reducer(&BigInt::from(e), &mut reducer));
            expected = expected + &g;
        }

        // A larger scalar, exercising longer runs between reductions.
        let scale = BigInt::from(0x0123456789abcdefu64);
        assert_eq!(g.mul(&scale), g.mul_with_reducer(&scale, &mut reducer));
    }

    #[test]
    fn test_from_a_b_discriminant_validation() {
        let discriminant = Discriminant::try_from(BigInt::from(-223)).unwrap();

        // 4a must divide b^2 - discriminant.
        assert!(
            QuadraticForm::from_a_b_discriminant(BigInt::from(3), BigInt::one(), &discriminant)
                .is_err()
        );

        // a must be positive.
        assert!(QuadraticForm::from_a_b_discriminant(
            BigInt::from(-1),
            BigInt::one(),
            &discriminant
        )
        .is_err());
        assert!(
            QuadraticForm::from_a_b_discriminant(BigInt::zero(), BigInt::one(), &discriminant)
                .is_err()
        );
    }

    #[test]
    fn test_same_group() {
        let discriminant = Discriminant::try_from(BigInt::from(-223)).unwrap();
        let other_discriminant = Discriminant::try_from(BigInt::from(-47)).unwrap();

        let g = QuadraticForm::generator(&discriminant);
        assert_eq!(discriminant, g.discriminant());
        assert!(g.same_group(&g.mul(&BigInt::from(3))));
        assert!(!g.same_group(&QuadraticForm::generator(&other_discriminant)));
    }
}
