// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Normalization and reduction of binary quadratic forms, and a reusable reduction context for
//! batches of reductions over a fixed discriminant.

use crate::class_group::discriminant::Discriminant;
use crate::class_group::QuadraticForm;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;
use std::cmp::Ordering;
use std::mem::swap;
use std::ops::{AddAssign, Shl, Shr};

impl QuadraticForm {
    /// Return true if this form is in normal form: -a < b <= a.
    pub fn is_normal(&self) -> bool {
        match self.b.magnitude().cmp(self.a.magnitude()) {
            Ordering::Less => true,
            Ordering::Equal => !self.b.is_negative(),
            Ordering::Greater => false,
        }
    }

    /// Bring this form to normal form. See [`QuadraticForm::is_normal`].
    pub fn normalize(&mut self) {
        // See section 5 in https://github.com/Chia-Network/chiavdf/blob/main/classgroups.pdf.
        if self.is_normal() {
            return;
        }
        let r = (&self.a - &self.b).div_floor(&self.a).shr(1);
        let ra: BigInt = &r * &self.a;
        self.c.add_assign((&ra + &self.b) * &r);
        self.b.add_assign(&ra.shl(1));
    }

    /// Return true if this form is reduced: A form is reduced if it is normal (see
    /// [`QuadraticForm::is_normal`]) and a <= c and if a == c then b >= 0.
    pub fn is_reduced(&self) -> bool {
        if !self.is_normal() {
            return false;
        }
        match self.a.cmp(&self.c) {
            Ordering::Less => true,
            Ordering::Equal => !self.b.is_negative(),
            Ordering::Greater => false,
        }
    }

    /// Bring this form to its unique reduced representative. See
    /// [`QuadraticForm::is_reduced`].
    pub fn reduce(&mut self) {
        // See section 5 in https://github.com/Chia-Network/chiavdf/blob/main/classgroups.pdf.
        self.normalize();
        while !self.is_reduced() {
            let s = (&self.b + &self.c).div_floor(&self.c).shr(1);
            let cs: BigInt = &self.c * &s;
            swap(&mut self.a, &mut self.c);
            self.c += (&cs - &self.b) * &s;
            self.b = cs.shl(1) - &self.b;
        }
    }
}

/// Bits per big integer machine word, used when bounding coefficient sizes.
const LIMB_BITS: u64 = 64;

fn limbs(x: &BigInt) -> u64 {
    (x.bits() + LIMB_BITS - 1) / LIMB_BITS
}

/// A reusable context for reducing a batch of forms of a fixed discriminant.
///
/// Composition and duplication may leave their result unreduced, letting coefficients grow by a
/// bounded amount per operation. The context carries the size bound beyond which a reduction is
/// due: half the discriminant's word size plus one word of headroom. Keeping the `a` coefficient
/// within this bound is required for the composition algorithms to stay on their fast path, so
/// [Reducer::reduce_if_oversized] must be consulted after every operation on an unreduced form.
///
/// Every reduction requires an exclusive reference, so a single instance serves at most one
/// logical operation at a time; concurrent operations construct one instance each. The context
/// holds no form data between calls.
pub struct Reducer {
    a_limb_bound: u64,
}

impl Reducer {
    /// Create a context for forms of the given discriminant.
    pub fn new(discriminant: &Discriminant) -> Self {
        Self {
            a_limb_bound: limbs(discriminant.as_bigint()) / 2 + 1,
        }
    }

    /// Reduce `form` to its canonical representative, in place.
    pub fn reduce(&mut self, form: &mut QuadraticForm) {
        form.reduce();
    }

    /// Reduce `form` only if its `a` coefficient has outgrown the bound for this context's
    /// discriminant. Returns whether a reduction was performed.
    pub fn reduce_if_oversized(&mut self, form: &mut QuadraticForm) -> bool {
        if limbs(&form.a) > self.a_limb_bound {
            form.reduce();
            return true;
        }
        false
    }
}
