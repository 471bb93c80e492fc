// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::class_group::discriminant::Discriminant;
use crate::class_group::reduction::Reducer;
use crate::class_group::QuadraticForm;
use crate::error::{VdfError, VdfResult};
use crate::math::modular::mod_exp;
use fiat_shamir::compute_challenge;
use num_bigint::BigInt;
use num_traits::One;

pub mod fiat_shamir;

/// Size in bytes of the Fiat-Shamir challenge prime used in proving and verification (same as
/// chiavdf).
pub const CHALLENGE_SIZE: usize = 33;

/// Prover and verifier for Wesolowski's proof of exponentiation
/// (https://eprint.iacr.org/2018/623) over the class group of a given discriminant.
///
/// The output to be proven is `2^iterations * input`, produced by the caller's sequential
/// squaring pipeline; this type only constructs and checks the succinct proof that the output is
/// correct. All forms are expected in reduced canonical form, as produced by the group
/// operations and the codec.
pub struct WesolowskisVDF {
    discriminant: Discriminant,
    iterations: u64,
}

impl WesolowskisVDF {
    /// Create a new instance over the group defined by the given discriminant. Verifying with
    /// this instance will require that the output is `2^iterations * input`.
    pub fn new(discriminant: Discriminant, iterations: u64) -> Self {
        Self {
            discriminant,
            iterations,
        }
    }

    /// Compute the proof `⌊2^iterations / ℓ⌋ * input` where `ℓ` is the Fiat-Shamir challenge
    /// prime binding `input` and `output`. This scalar multiplication dominates the cost of
    /// proof construction and runs with lazy reduction of the accumulator.
    pub fn prove(
        &self,
        input: &QuadraticForm,
        output: &QuadraticForm,
    ) -> VdfResult<QuadraticForm> {
        if input.discriminant() != self.discriminant || output.discriminant() != self.discriminant
        {
            return Err(VdfError::InvalidInput);
        }
        let challenge = compute_challenge(&self.discriminant, input, output);
        let exponent = (BigInt::one() << self.iterations) / &challenge;
        let mut reducer = Reducer::new(&self.discriminant);
        Ok(input.mul_with_reducer(&exponent, &mut reducer))
    }

    /// Verify a proof produced by [WesolowskisVDF::prove]: with `r = 2^iterations mod ℓ`, the
    /// proof is accepted if and only if `ℓ * proof + r * input == output`.
    pub fn verify(
        &self,
        input: &QuadraticForm,
        output: &QuadraticForm,
        proof: &QuadraticForm,
    ) -> VdfResult<()> {
        if input.discriminant() != self.discriminant
            || output.discriminant() != self.discriminant
            || proof.discriminant() != self.discriminant
        {
            return Err(VdfError::InvalidInput);
        }
        let challenge = compute_challenge(&self.discriminant, input, output);
        let r = BigInt::from(mod_exp(2, self.iterations, challenge.magnitude()));

        let mut reducer = Reducer::new(&self.discriminant);
        let lhs = proof.mul_with_reducer(&challenge, &mut reducer)
            + input.mul_with_reducer(&r, &mut reducer);

        if lhs != *output {
            return Err(VdfError::InvalidProof);
        }
        Ok(())
    }
}
