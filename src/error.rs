// Copyright 2019 Stichting Organism
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Errors reported by an engine.

use core::fmt;

use crate::engine::Phase;

/// The engine call that was attempted, carried by protocol errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    IngestAad,
    Encrypt,
    Decrypt,
    Finish,
    Authenticate,
    Verify,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Operation::IngestAad => "ingest_aad",
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
            Operation::Finish => "finish",
            Operation::Authenticate => "authenticate",
            Operation::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// Everything that can go wrong while driving an engine.
///
/// Length mismatches and protocol violations void the engine: it must be
/// discarded, and every later call on it returns [`EngineError::Voided`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    /// For a truncated tag `expected` is the configured length; at
    /// construction time it is the largest length the cipher supports.
    #[error("invalid tag length: expected {expected} bytes, got {actual}")]
    InvalidTagLength { expected: usize, actual: usize },

    #[error("`{operation}` is not permitted while {phase}")]
    ProtocolViolation { operation: Operation, phase: Phase },

    /// The caller's output slice cannot hold what the call would emit.
    /// Nothing was processed, so the engine stays usable.
    #[error("output buffer too small: need {needed} bytes, got {actual}")]
    OutputTooSmall { needed: usize, actual: usize },

    #[error("engine was voided by an earlier error and must be discarded")]
    Voided,

    #[error("authentication failed")]
    AuthenticationFailed,
}

impl EngineError {
    /// Whether this error leaves the engine unusable.
    pub fn voids_engine(&self) -> bool {
        !matches!(
            self,
            EngineError::OutputTooSmall { .. } | EngineError::AuthenticationFailed
        )
    }
}
