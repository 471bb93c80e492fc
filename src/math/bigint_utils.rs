// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width byte encoding of signed big integers, compatible with the integer serialization
//! used by chiavdf when feeding serialized values into hash functions or persisting them.

use num_bigint::{BigInt, Sign};

/// Encode `x` as exactly `num_bytes` big-endian bytes.
///
/// Non-negative values are encoded as the zero-padded big-endian magnitude. Negative values are
/// encoded by complementing every byte of the magnitude of `x + 1`, including the padding bytes,
/// which coincides with the two's complement representation whenever
/// `|x| < 2^(8 * num_bytes - 1)`. Magnitudes that need more than `num_bytes` bytes have their
/// high-order bytes silently dropped; this matches the wire behavior of existing provers and
/// verifiers, so no range check is performed.
pub fn to_signed_bytes_be_fixed(x: &BigInt, num_bytes: usize) -> Vec<u8> {
    let (negative, magnitude) = match x.sign() {
        Sign::Minus => (true, x.magnitude() - 1u8),
        _ => (false, x.magnitude().clone()),
    };
    let digits = magnitude.to_bytes_le();
    let mut bytes: Vec<u8> = (0..num_bytes)
        .map(|i| {
            let byte = digits.get(i).copied().unwrap_or(0);
            if negative {
                byte ^ 0xff
            } else {
                byte
            }
        })
        .collect();
    bytes.reverse();
    bytes
}

/// Decode bytes produced by [to_signed_bytes_be_fixed]. This is an exact inverse on the domain
/// `|x| < 2^(8 * num_bytes - 1)`, where the encoding coincides with two's complement; values
/// that were truncated during encoding cannot be recovered.
pub fn from_signed_bytes_be_fixed(bytes: &[u8]) -> BigInt {
    BigInt::from_signed_bytes_be(bytes)
}
