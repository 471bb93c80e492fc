// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Prover-side primitives for Wesolowski's verifiable delay function (VDF) over the class group
//! of binary quadratic forms of an imaginary quadratic order: deterministic hash-to-prime
//! challenge derivation, a compact canonical serialization of group elements, and class group
//! exponentiation with adaptive lazy reduction.
//!
//! Group elements are represented by binary quadratic forms which form a group under
//! composition. We use additive notation for the composition throughout.

use crate::error::VdfResult;
use std::ops::{Add, Neg};

pub mod class_group;
pub mod error;
pub mod math;
pub mod vdf;

/// Serialization into the canonical byte representation used when group elements and group
/// parameters are hashed or put on the wire.
pub trait ToBytes {
    /// Serialize this object into bytes.
    fn to_bytes(&self) -> Vec<u8>;
}

/// A group parameter which may be generated deterministically from a seed.
pub trait Parameter: Eq + Sized {
    /// Compute a parameter from a seed. The `size_in_bits` must be divisible by 8.
    fn from_seed(seed: &[u8], size_in_bits: usize) -> VdfResult<Self>;
}

/// Trait implemented by elements of an additive group where the group is parameterized, for
/// example by the discriminant in case of class groups.
pub trait ParameterizedGroupElement:
    Sized + Clone + for<'a> Add<&'a Self, Output = Self> + Add<Output = Self> + Neg + Eq + ToBytes
{
    /// The type of the parameter which uniquely defines this group.
    type ParameterType: Eq;

    /// Integer type used for multiplication.
    type ScalarType: From<u64>;

    /// Return an instance of the identity element in this group.
    fn zero(parameters: &Self::ParameterType) -> Self;

    /// Compute 2 * Self.
    fn double(&self) -> Self;

    /// Compute scale * self.
    fn mul(&self, scale: &Self::ScalarType) -> Self;

    /// Check whether this group element is in the same group as `other`.
    fn same_group(&self, other: &Self) -> bool;
}
