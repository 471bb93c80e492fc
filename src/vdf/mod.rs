// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module contains an implementation of the prover side of Wesolowski's construction
//! (https://eprint.iacr.org/2018/623) of a verifiable delay function over imaginary class
//! groups: Fiat-Shamir challenge derivation and construction and verification of the succinct
//! proof of exponentiation. Computing the VDF output itself, `iterations` sequential squarings
//! of the input, is left to the caller's evaluation pipeline.

pub mod wesolowski;
