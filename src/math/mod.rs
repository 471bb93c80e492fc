// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

pub mod bigint_utils;
pub(crate) mod extended_gcd;
pub mod hash_prime;
pub mod modular;
