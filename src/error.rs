// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types used throughout the crate.

use thiserror::Error;

/// Result of a fallible operation in this crate.
pub type VdfResult<T> = Result<T, VdfError>;

/// Collection of errors returned by the VDF primitives.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VdfError {
    /// Invalid value was given to the function
    #[error("Invalid value was given to the function")]
    InvalidInput,

    /// Input length is wrong.
    #[error("Expected input of length exactly {0}")]
    InputLengthWrong(usize),

    /// Invalid proof was given to the function
    #[error("Invalid proof was given to the function")]
    InvalidProof,
}
