// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Compression and the compact fixed-size wire format for quadratic forms. The compressed
//! representation stores roughly half the bits of a form, see https://eprint.iacr.org/2020/196.pdf,
//! and the byte layout is compatible with the bqfc format from chiavdf
//! (https://github.com/Chia-Network/chiavdf/blob/bcc36af3a8de4d2fcafa571602040a4ebd4bdd56/src/bqfc.c).

use crate::class_group::compressed::CompressedQuadraticForm::{Generator, Nontrivial, Zero};
use crate::class_group::discriminant::Discriminant;
use crate::class_group::QuadraticForm;
use crate::error::{VdfError, VdfResult};
use crate::{ParameterizedGroupElement, ToBytes};
use num_bigint::{BigInt, Sign};
use num_integer::{ExtendedGcd, Integer};
use num_traits::{One, Signed, Zero as OtherZero};
use std::cmp::{max, Ordering};

/// Serialized length in bytes of forms with the 1024-bit reference discriminant. See also
/// [QuadraticForm::serialized_length].
pub const FORM_SIZE: usize = 100;

/// Flag bit in the first serialized byte marking the sign of b.
const B_SIGN_FLAG: u8 = 0x01;
/// Flag bit in the first serialized byte marking the sign of t'.
const T_SIGN_FLAG: u8 = 0x02;
/// Flag bit in the first serialized byte marking the identity form.
const IDENTITY_FLAG: u8 = 0x04;
/// Flag bit in the first serialized byte marking the generator form.
const GENERATOR_FLAG: u8 = 0x08;

/// A quadratic form in compressed representation.
#[derive(PartialEq, Eq, Debug)]
enum CompressedQuadraticForm {
    Zero(Discriminant),
    Generator(Discriminant),
    Nontrivial(CompressedFormat),
}

#[derive(PartialEq, Eq, Debug)]
struct CompressedFormat {
    a_prime: BigInt,
    t_prime: BigInt,
    g: BigInt,
    /// The quotient |b| / a'. Non-negative; the sign of b is tracked by `b_sign`.
    b0: BigInt,
    b_sign: bool,
    discriminant: Discriminant,
}

impl QuadraticForm {
    /// Return the length of the serialization in bytes of a quadratic form with a discriminant
    /// of the given bit length.
    pub fn serialized_length(discriminant_bits: u64) -> usize {
        // The number of 32 bit words needed to represent the discriminant, rounded up.
        (discriminant_bits as usize + 31) / 32
            * 3 // a' is two words and t' is one word, both less the length of g.
            + 1 // Flags for special forms (identity or generator) and the signs of b and t'.
            + 1 // The size of g - 1 = g_size.
            + 2 // Two extra bytes for g and b0. Note that 2 * g_size was already counted.
    }

    /// Serialize this form into the compact fixed-size format. The form is brought to its
    /// canonical reduced representative before encoding, so equivalent forms serialize
    /// identically. The given discriminant must be the discriminant of this form; the result is
    /// unspecified otherwise.
    pub fn serialize(&self, discriminant: &Discriminant) -> Vec<u8> {
        if self.is_reduced() {
            return self.compress(discriminant).to_bytes();
        }
        let mut reduced = self.clone();
        reduced.reduce();
        reduced.compress(discriminant).to_bytes()
    }

    /// Deserialize bytes into a quadratic form of the given discriminant. The expected length of
    /// the serialization may be computed using [QuadraticForm::serialized_length]; buffers of
    /// any other length are rejected, as are buffers whose fields fail the structural validity
    /// checks of the format.
    pub fn from_bytes(bytes: &[u8], discriminant: &Discriminant) -> VdfResult<Self> {
        CompressedQuadraticForm::from_bytes(bytes, discriminant)?.decompress()
    }

    /// Return a compressed representation of this quadratic form, which must be reduced. See
    /// https://eprint.iacr.org/2020/196.pdf for a definition of the compression.
    fn compress(&self, discriminant: &Discriminant) -> CompressedQuadraticForm {
        // This implementation follows bqfc_compress from chiavdf.
        if self.a.is_one() && self.b.is_one() {
            return Zero(discriminant.clone());
        } else if self.a == BigInt::from(2) && self.b.is_one() {
            return Generator(discriminant.clone());
        }

        // The decomposition of b is impossible when a = b; t' = 0 marks this case on the wire.
        if self.a == self.b {
            return Nontrivial(CompressedFormat {
                a_prime: self.a.clone(),
                t_prime: BigInt::zero(),
                g: BigInt::one(),
                b0: BigInt::zero(),
                b_sign: false,
                discriminant: discriminant.clone(),
            });
        }

        let b_sign = self.b.is_negative();
        let b_abs = self.b.abs();

        let (_, mut t_prime) = partial_xgcd(&self.a, &b_abs)
            .expect("a is positive and b is nonzero for forms of an odd discriminant");
        let g = self.a.gcd(&t_prime);

        let (a_prime, b0) = if g.is_one() {
            (self.a.clone(), BigInt::zero())
        } else {
            let a_prime = &self.a / &g;
            t_prime /= &g;
            // Both operands are non-negative, so this matches the truncated division
            // (mpz_tdiv_q) used by chiavdf.
            let b0 = &b_abs / &a_prime;
            (a_prime, b0)
        };

        Nontrivial(CompressedFormat {
            a_prime,
            t_prime,
            g,
            b0,
            b_sign,
            discriminant: discriminant.clone(),
        })
    }
}

impl ToBytes for QuadraticForm {
    fn to_bytes(&self) -> Vec<u8> {
        self.serialize(&self.discriminant())
    }
}

impl CompressedQuadraticForm {
    /// Return this as an uncompressed QuadraticForm. See https://eprint.iacr.org/2020/196.pdf
    /// for a definition of the compression.
    fn decompress(&self) -> VdfResult<QuadraticForm> {
        // This implementation follows bqfc_decompress from chiavdf.
        match self {
            Zero(discriminant) => Ok(QuadraticForm::zero(discriminant)),
            Generator(discriminant) => Ok(QuadraticForm::generator(discriminant)),
            Nontrivial(form) => {
                let CompressedFormat {
                    a_prime,
                    t_prime,
                    g,
                    b0,
                    b_sign,
                    discriminant,
                } = form;

                if t_prime.is_zero() {
                    return QuadraticForm::from_a_b_discriminant(
                        a_prime.clone(),
                        a_prime.clone(),
                        discriminant,
                    );
                }

                if a_prime.is_zero() {
                    return Err(VdfError::InvalidInput);
                }

                let t = if t_prime.is_negative() {
                    t_prime + a_prime
                } else {
                    t_prime.clone()
                };

                let d_mod_a = discriminant.as_bigint().mod_floor(a_prime);
                let sqrt_input = (t.modpow(&BigInt::from(2), a_prime) * &d_mod_a).mod_floor(a_prime);
                let sqrt = sqrt_input.sqrt();

                // The square root must be exact for valid serializations.
                if sqrt.pow(2) != sqrt_input {
                    return Err(VdfError::InvalidInput);
                }

                let out_a = if !g.is_one() {
                    a_prime * g
                } else {
                    a_prime.clone()
                };

                let t_inv = mod_inverse(&t, a_prime)?;
                let mut out_b = (&sqrt * &t_inv).mod_floor(a_prime);
                if b0.is_positive() {
                    out_b += a_prime * b0;
                }
                if *b_sign {
                    out_b = -out_b;
                }

                QuadraticForm::from_a_b_discriminant(out_a, out_b, discriminant)
            }
        }
    }

    /// Serialize into the fixed-size chiavdf-compatible buffer.
    fn to_bytes(&self) -> Vec<u8> {
        match self {
            Zero(discriminant) => {
                let mut bytes = vec![0u8; QuadraticForm::serialized_length(discriminant.bits())];
                bytes[0] = IDENTITY_FLAG;
                bytes
            }
            Generator(discriminant) => {
                let mut bytes = vec![0u8; QuadraticForm::serialized_length(discriminant.bits())];
                bytes[0] = GENERATOR_FLAG;
                bytes
            }
            Nontrivial(form) => {
                let length = QuadraticForm::serialized_length(form.discriminant.bits());
                let mut bytes = Vec::with_capacity(length);

                let mut flags = 0u8;
                if form.b_sign {
                    flags |= B_SIGN_FLAG;
                }
                if form.t_prime.is_negative() {
                    flags |= T_SIGN_FLAG;
                }
                bytes.push(flags);

                // The bit length of the discriminant, rounded up to a multiple of 32.
                let d_bits = (form.discriminant.bits() as usize + 31) & !31;

                // Size of g in bytes minus 1. GMP counts zero as a one bit number, hence the max.
                let g_size = (max(form.g.bits(), 1) as usize + 7) / 8 - 1;
                bytes.push(g_size as u8);

                bytes.extend_from_slice(
                    &export_to_size(&form.a_prime, d_bits / 16 - g_size)
                        .expect("Reduction bounds the size of a'"),
                );
                bytes.extend_from_slice(
                    &export_to_size(&form.t_prime, d_bits / 32 - g_size)
                        .expect("The partial xgcd bounds the size of t'"),
                );
                bytes.extend_from_slice(
                    &export_to_size(&form.g, g_size + 1).expect("The export size is derived from g"),
                );
                bytes.extend_from_slice(
                    &export_to_size(&form.b0, g_size + 1).expect("b0 is bounded by g"),
                );
                debug_assert_eq!(bytes.len(), length);
                bytes
            }
        }
    }

    /// Deserialize a compressed binary form from the fixed-size chiavdf-compatible buffer.
    fn from_bytes(bytes: &[u8], discriminant: &Discriminant) -> VdfResult<Self> {
        if bytes.len() != QuadraticForm::serialized_length(discriminant.bits()) {
            return Err(VdfError::InputLengthWrong(bytes.len()));
        }

        // Serialization of special forms (identity or generator) only uses the flag byte.
        if bytes[0] & IDENTITY_FLAG != 0 {
            return Ok(Zero(discriminant.clone()));
        }
        if bytes[0] & GENERATOR_FLAG != 0 {
            return Ok(Generator(discriminant.clone()));
        }

        // The bit length of the discriminant, rounded up to a multiple of 32.
        let d_bits = (discriminant.bits() as usize + 31) & !31;

        // Size of g in bytes minus 1 (g_size).
        let g_size = bytes[1] as usize;
        if g_size >= d_bits / 32 {
            return Err(VdfError::InvalidInput);
        }

        let a_prime_length = d_bits / 16 - g_size;
        let t_prime_length = d_bits / 32 - g_size;
        let g_length = g_size + 1;
        let b0_length = g_size + 1;

        let mut offset = 2;

        // a' = a / g
        let a_prime = bigint_from_bytes(&bytes[offset..offset + a_prime_length]);
        offset += a_prime_length;

        // t' = t / g, where t satisfies (a*x + b*t < sqrt(a))
        let mut t_prime = bigint_from_bytes(&bytes[offset..offset + t_prime_length]);
        if bytes[0] & T_SIGN_FLAG != 0 {
            t_prime = -t_prime;
        }
        offset += t_prime_length;

        // g = gcd(a, t)
        let g = bigint_from_bytes(&bytes[offset..offset + g_length]);
        offset += g_length;

        // b0 = |b| / a'
        let b0 = bigint_from_bytes(&bytes[offset..offset + b0_length]);
        let b_sign = bytes[0] & B_SIGN_FLAG != 0;

        Ok(Nontrivial(CompressedFormat {
            a_prime,
            t_prime,
            g,
            b0,
            b_sign,
            discriminant: discriminant.clone(),
        }))
    }
}

/// Return the modular inverse of `a` modulo `m`, or an error if `a` is not invertible modulo
/// `m`.
fn mod_inverse(a: &BigInt, m: &BigInt) -> VdfResult<BigInt> {
    if m <= &BigInt::one() || a.is_zero() {
        return Err(VdfError::InvalidInput);
    }

    let ExtendedGcd::<BigInt> { gcd, x, y: _ } = a.extended_gcd(m);

    if !gcd.is_one() {
        return Err(VdfError::InvalidInput);
    }
    Ok(x.mod_floor(m))
}

/// Import function for BigInts using little-endian representation.
fn bigint_from_bytes(bytes: &[u8]) -> BigInt {
    BigInt::from_bytes_le(Sign::Plus, bytes)
}

/// Export function for BigInts using little-endian representation.
fn bigint_to_bytes(n: &BigInt) -> Vec<u8> {
    n.to_bytes_le().1
}

/// Export a BigInt to a byte array of the given size. Zeroes are padded to the end if the number
/// serializes to fewer bytes than `target_size`. If the serialization is too large, an error is
/// returned.
fn export_to_size(number: &BigInt, target_size: usize) -> VdfResult<Vec<u8>> {
    let mut bytes = bigint_to_bytes(number);
    match bytes.len().cmp(&target_size) {
        Ordering::Less => {
            bytes.append(&mut vec![0u8; target_size - bytes.len()]);
            Ok(bytes)
        }
        Ordering::Equal => Ok(bytes),
        Ordering::Greater => Err(VdfError::InvalidInput),
    }
}

/// Takes `a` and `b` and returns `(s, t)` such that `s = b t (mod a)` with
/// `0 <= s < sqrt(a)` and `|t| <= sqrt(a)`. This is algorithm 1 from
/// https://arxiv.org/pdf/2211.16128.pdf.
fn partial_xgcd(a: &BigInt, b: &BigInt) -> VdfResult<(BigInt, BigInt)> {
    if a <= b {
        let (s, t) = partial_xgcd(b, a)?;
        return Ok((t, s));
    }

    if b <= &BigInt::zero() {
        return Err(VdfError::InvalidInput);
    }

    let mut s = (b.clone(), a.clone());
    let mut t = (BigInt::one(), BigInt::zero());
    let bound = a.sqrt();

    while s.0 >= bound {
        let q = s.1.div_floor(&s.0);

        let s_tmp = &s.1 - &q * &s.0;
        s.1 = s.0;
        s.0 = s_tmp;

        let t_tmp = &t.1 - &q * &t.0;
        t.1 = t.0;
        t.0 = t_tmp;
    }

    Ok((s.0, t.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_group::discriminant::Discriminant;
    use crate::class_group::QuadraticForm;
    use num_traits::Num;
    use std::str::FromStr;

    #[test]
    fn test_bigint_import() {
        let bytes = hex::decode("0102").unwrap();
        let bigint = bigint_from_bytes(&bytes);

        // We expect little endian, e.g. 0x02 * 256 + 0x01 = 513.
        let expected = BigInt::from_str_radix("513", 10).unwrap();
        assert_eq!(bigint, expected);

        let reconstructed = bigint_to_bytes(&bigint);
        assert_eq!(bytes, reconstructed);
    }

    #[test]
    fn test_compression() {
        let discriminant_hex = "d2b4bc45525b1c2b59e1ad7f81a1003f2f0efdcbc734bf711ebf5599a73577a282af5e8959ffcf3ec8601b601bcd2fa54915823d73130e90cb90fe1c6c7c10bf";
        let discriminant =
            Discriminant::try_from(-BigInt::from_str_radix(discriminant_hex, 16).unwrap()).unwrap();
        let compressed_hex = "0200222889d197dbfddc011bba8725c753b3caf8cb85b2a03b4f8d92cf5606e81208d717f068b8476ffe1f9c2e0443fc55030605";
        let compressed = CompressedQuadraticForm::from_bytes(
            &hex::decode(compressed_hex).unwrap(),
            &discriminant,
        )
        .unwrap();
        let decompressed = compressed.decompress().unwrap();
        let recompressed = decompressed.compress(&discriminant);
        assert_eq!(compressed, recompressed);
    }

    #[test]
    fn test_serialize_deserialize() {
        let discriminant_hex = "d2b4bc45525b1c2b59e1ad7f81a1003f2f0efdcbc734bf711ebf5599a73577a282af5e8959ffcf3ec8601b601bcd2fa54915823d73130e90cb90fe1c6c7c10bf";
        let discriminant =
            Discriminant::try_from(-BigInt::from_str_radix(discriminant_hex, 16).unwrap()).unwrap();
        let compressed_hex = "010083b82ff747c385b0e2ff91ef1bea77d3d70b74322db1cd405e457aefece6ff23961c1243f1ed69e15efd232397e467200100";
        let compressed_bytes = hex::decode(compressed_hex).unwrap();
        let compressed =
            CompressedQuadraticForm::from_bytes(&compressed_bytes, &discriminant).unwrap();
        let serialized = compressed.to_bytes();
        assert_eq!(serialized, compressed_bytes);

        let length = QuadraticForm::serialized_length(discriminant.bits());

        let mut generator_serialized = vec![0u8; length];
        generator_serialized[0] = GENERATOR_FLAG;
        assert_eq!(
            QuadraticForm::generator(&discriminant).serialize(&discriminant),
            generator_serialized
        );
        assert_eq!(
            QuadraticForm::generator(&discriminant),
            QuadraticForm::from_bytes(&generator_serialized, &discriminant).unwrap()
        );

        let mut identity_serialized = vec![0u8; length];
        identity_serialized[0] = IDENTITY_FLAG;
        assert_eq!(
            QuadraticForm::zero(&discriminant).serialize(&discriminant),
            identity_serialized
        );
        assert_eq!(
            QuadraticForm::zero(&discriminant),
            QuadraticForm::from_bytes(&identity_serialized, &discriminant).unwrap()
        );
    }

    #[test]
    fn test_serialize_roundtrip() {
        // 512 and 1024 bit discriminants
        let discriminants = [
            "-9349344414767291113687223839476811112057517254984004685948091483948469540163634423565760143454771869645957446839582874595782298614481082568123251157411687",
            "-133945061969889266637985327980602701669957743979382571436531763623415706276402737192009754195707000763534826528470478732951439968182253841713707751680514914997731717008973123373160242352119122869810833826423629802461890931457718412113596718805448770307254626415119526466550394593324563882174686655718775270447",
        ].map(|s| BigInt::from_str(s).unwrap()).map(|p| Discriminant::try_from(p).unwrap());

        for discriminant in discriminants {
            let form = QuadraticForm::generator(&discriminant).mul(&BigInt::from(1234));
            let serialized = form.serialize(&discriminant);
            assert_eq!(
                serialized.len(),
                QuadraticForm::serialized_length(discriminant.bits())
            );
            assert_eq!(
                form,
                QuadraticForm::from_bytes(&serialized, &discriminant).unwrap()
            );
        }
    }

    #[test]
    fn test_form_size_constant() {
        assert_eq!(FORM_SIZE, QuadraticForm::serialized_length(1024));
    }

    #[test]
    fn test_serialize_reduces() {
        let discriminant = Discriminant::try_from(BigInt::from(-223)).unwrap();
        let unreduced =
            QuadraticForm::from_a_b_discriminant(BigInt::from(41), BigInt::from(49), &discriminant)
                .unwrap();
        let mut reduced = unreduced.clone();
        reduced.reduce();
        assert_ne!(unreduced, reduced);

        // Equivalent forms serialize identically, and deserialization returns the canonical
        // representative.
        let serialized = unreduced.serialize(&discriminant);
        assert_eq!(serialized, reduced.serialize(&discriminant));
        assert_eq!(
            reduced,
            QuadraticForm::from_bytes(&serialized, &discriminant).unwrap()
        );
    }

    #[test]
    fn test_a_equals_b_roundtrip() {
        let discriminant = Discriminant::try_from(BigInt::from(-95)).unwrap();
        let form =
            QuadraticForm::from_a_b_discriminant(BigInt::from(5), BigInt::from(5), &discriminant)
                .unwrap();
        assert!(form.is_reduced());

        let serialized = form.serialize(&discriminant);
        assert_eq!(
            form,
            QuadraticForm::from_bytes(&serialized, &discriminant).unwrap()
        );
    }

    #[test]
    fn test_invalid_input_rejected() {
        let discriminant = Discriminant::try_from(BigInt::from(-223)).unwrap();
        let length = QuadraticForm::serialized_length(discriminant.bits());

        // Wrong buffer length.
        assert_eq!(
            QuadraticForm::from_bytes(&vec![0u8; length - 1], &discriminant),
            Err(VdfError::InputLengthWrong(length - 1))
        );

        // g_size out of range for the discriminant.
        let mut bytes = vec![0u8; length];
        bytes[1] = 0xff;
        assert_eq!(
            QuadraticForm::from_bytes(&bytes, &discriminant),
            Err(VdfError::InvalidInput)
        );

        // An all-zero buffer has a' = 0 which is not a valid form.
        assert!(QuadraticForm::from_bytes(&vec![0u8; length], &discriminant).is_err());
    }
}
