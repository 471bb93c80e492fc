// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module contains an implementation of a hash-to-prime function identical to the HashPrime
//! function from [chiavdf](https://github.com/Chia-Network/chiavdf/blob/bcc36af3a8de4d2fcafa571602040a4ebd4bdd56/src/proof_common.h#L14-L43).

use num_bigint::BigUint;
use num_prime::nt_funcs::is_prime;
use num_prime::PrimalityTestConfig;
use sha2::{Digest, Sha256};
use std::cmp::min;

/// Iterator over the deterministic candidate sequence derived from a seed.
///
/// The seed buffer doubles as a big-endian counter which is incremented before every hash
/// expansion, so the sequence continues across candidates instead of restarting; it wraps
/// silently if the counter overflows the seed width. The iterator is infinite and never fails,
/// which lets callers bound a search with `take` where needed.
pub struct HashPrimeIterator {
    seed: Vec<u8>,
    length_in_bytes: usize,
    bitmask: Vec<usize>,
}

impl HashPrimeIterator {
    /// Create an iterator over candidates of `length_in_bytes` bytes with the bits from
    /// `bitmask` forced.
    pub fn new(seed: &[u8], length_in_bytes: usize, bitmask: &[usize]) -> Self {
        Self {
            seed: seed.to_vec(),
            length_in_bytes,
            bitmask: bitmask.to_vec(),
        }
    }
}

impl Iterator for HashPrimeIterator {
    type Item = BigUint;

    fn next(&mut self) -> Option<Self::Item> {
        let mut blob = Vec::with_capacity(self.length_in_bytes);
        while blob.len() < self.length_in_bytes {
            for i in (0..self.seed.len()).rev() {
                self.seed[i] = self.seed[i].wrapping_add(1);
                if self.seed[i] != 0 {
                    break;
                }
            }
            let hash = Sha256::digest(&self.seed);
            blob.extend_from_slice(&hash[..min(hash.len(), self.length_in_bytes - blob.len())]);
        }
        let mut x = BigUint::from_bytes_be(&blob);
        for b in &self.bitmask {
            x.set_bit(*b as u64, true);
        }
        Some(x)
    }
}

/// Implementation of a probabilistic primality test.
pub trait PrimalityCheck {
    /// Return true if `x` is probably a prime. If `false` is returned, `x` is guaranteed to be
    /// composite.
    fn is_prime(x: &BigUint) -> bool;
}

/// Generate a random pseudo-prime using the hash and check method: Chooses an `x` of
/// `length_in_bytes` bytes deterministically from the seed, applies the bitmask
/// (for b in bitmask) { x |= (1 << b) }, and returns `x` if it is a pseudo-prime, otherwise
/// repeats with the next candidate. Forcing the top bit fixes the exact bit length of the
/// result.
///
/// The search is deterministic for a fixed `(seed, length_in_bytes, bitmask)` and blocks until a
/// prime is found; non-termination is cryptographically negligible.
pub fn hash_prime<P: PrimalityCheck>(
    seed: &[u8],
    length_in_bytes: usize,
    bitmask: &[usize],
) -> BigUint {
    HashPrimeIterator::new(seed, length_in_bytes, bitmask)
        .find(P::is_prime)
        .expect("The iterator is infinite")
}

/// Implementation of [hash_prime] using [DefaultPrimalityCheck].
pub fn hash_prime_default(seed: &[u8], length_in_bytes: usize, bitmask: &[usize]) -> BigUint {
    hash_prime::<DefaultPrimalityCheck>(seed, length_in_bytes, bitmask)
}

/// Implementation of the [PrimalityCheck] trait using the Baillie-PSW test. This is in
/// accordance with the recommendations of "Prime and Prejudice: Primality Testing Under
/// Adversarial Conditions" by Albrecht et al. (https://eprint.iacr.org/2018/749) because the
/// test is also used in cases where an adversary could influence the input.
pub struct DefaultPrimalityCheck {}

impl PrimalityCheck for DefaultPrimalityCheck {
    fn is_prime(x: &BigUint) -> bool {
        is_prime(x, Some(PrimalityTestConfig::bpsw())).probably()
    }
}
