// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::error::VdfError::InvalidInput;
use crate::error::{VdfError, VdfResult};
use crate::math::hash_prime;
use crate::{Parameter, ToBytes};
use num_bigint::{BigInt, Sign, ToBigInt};
use num_integer::Integer;
use num_traits::{One, Signed};
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Neg;

/// A discriminant for an imaginary class group. The discriminant is a negative integer congruent
/// to 1 mod 8.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Discriminant(BigInt);

fn validate(discriminant: &BigInt) -> VdfResult<()> {
    if !discriminant.is_negative() || discriminant.mod_floor(&BigInt::from(8)) != BigInt::one() {
        return Err(InvalidInput);
    }
    Ok(())
}

impl TryFrom<BigInt> for Discriminant {
    type Error = VdfError;

    fn try_from(value: BigInt) -> VdfResult<Self> {
        validate(&value)?;
        Ok(Self(value))
    }
}

impl Discriminant {
    /// Return the number of bits needed to represent this discriminant, not including the sign
    /// bit.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Borrow a reference to the underlying big integer.
    pub(crate) fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Try to create a discriminant from a big-endian byte representation of the absolute value.
    /// Fails if the resulting discriminant is not equal to 1 mod 8.
    pub fn try_from_be_bytes(bytes: &[u8]) -> VdfResult<Self> {
        let discriminant = BigInt::from_bytes_be(Sign::Minus, bytes);
        Self::try_from(discriminant)
    }
}

impl ToBytes for Discriminant {
    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes_be().1
    }
}

impl Parameter for Discriminant {
    /// Compute a valid discriminant (aka a negative prime equal to 1 mod 8) based on the given
    /// seed. The `size_in_bits` must be divisible by 8.
    fn from_seed(seed: &[u8], size_in_bits: usize) -> VdfResult<Self> {
        if size_in_bits % 8 != 0 {
            return Err(InvalidInput);
        }
        // Set the lower three bits to ensure that the prime is 7 mod 8 which makes the negated
        // discriminant 1 mod 8.
        Self::try_from(
            hash_prime::hash_prime_default(seed, size_in_bits / 8, &[0, 1, 2, size_in_bits - 1])
                .to_bigint()
                .expect("Conversion from BigUint never fails")
                .neg(),
        )
    }
}

impl<'de> Deserialize<'de> for Discriminant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = BigInt::deserialize(deserializer)?;
        validate(&value).map_err(serde::de::Error::custom)?;
        Ok(Discriminant(value))
    }
}
