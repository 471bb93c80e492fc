// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fiat-Shamir derivation of the challenge prime for Wesolowski's proof of exponentiation,
//! making the proof non-interactive.

use crate::class_group::discriminant::Discriminant;
use crate::class_group::QuadraticForm;
use crate::math::hash_prime::hash_prime_default;
use crate::vdf::wesolowski::CHALLENGE_SIZE;
use num_bigint::BigInt;

/// Compute the challenge prime binding the discriminant and the two given forms: the compact
/// serializations of `input` and `output` are concatenated and used as the seed of a
/// hash-to-prime search for a prime of `8 * CHALLENGE_SIZE` bits, whose top bit is forced to fix
/// the exact bit length. The derivation is deterministic, and changing either form changes the
/// result with overwhelming probability.
pub fn compute_challenge(
    discriminant: &Discriminant,
    input: &QuadraticForm,
    output: &QuadraticForm,
) -> BigInt {
    let mut seed = input.serialize(discriminant);
    seed.extend_from_slice(&output.serialize(discriminant));
    hash_prime_default(&seed, CHALLENGE_SIZE, &[8 * CHALLENGE_SIZE - 1]).into()
}
