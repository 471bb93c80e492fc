// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Modular arithmetic helpers.

use num_bigint::BigUint;

/// Compute `base^exponent mod modulus` for a machine word base and exponent. The modulus must be
/// nonzero.
pub fn mod_exp(base: u64, exponent: u64, modulus: &BigUint) -> BigUint {
    BigUint::from(base).modpow(&BigUint::from(exponent), modulus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_mod_exp() {
        assert_eq!(BigUint::from(24u64), mod_exp(2, 10, &BigUint::from(1000u64)));
        assert_eq!(BigUint::from(1u64), mod_exp(3, 0, &BigUint::from(7u64)));
        assert_eq!(BigUint::from(4u64), mod_exp(7, 2, &BigUint::from(5u64)));

        let modulus = BigUint::from(0xfffffffffffffffdu64);
        assert_eq!(
            (BigUint::one() << 264u32) % &modulus,
            mod_exp(2, 264, &modulus)
        );
    }
}
