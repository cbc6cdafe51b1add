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

//! The streaming engine shared by every cipher.
//!
//! A cipher only supplies block-level operations through [`DuplexTransform`].
//! [`Engine`] owns the buffering of associated data and payload, enforces the
//! call order
//!
//! ```text
//! ingest_aad* , (encrypt | decrypt)* , finish , (authenticate | verify)
//! ```
//!
//! and exposes it through the [`AeadEngine`] façade.

use core::fmt;

use subtle::ConstantTimeEq;
use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::accumulator::{Block, BlockAccumulator, FlushPolicy};
use crate::error::{EngineError, Operation};

/// Longest tag any engine may produce.
pub const MAX_TAG_LEN: usize = 32;

/// Protocol phase of an engine. Phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    AbsorbingAad,
    AbsorbingPayload,
    Finalized,
    Tagged,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Phase::AbsorbingAad => "absorbing associated data",
            Phase::AbsorbingPayload => "absorbing payload",
            Phase::Finalized => "finalized",
            Phase::Tagged => "tagged",
        };
        f.write_str(name)
    }
}

/// Whether an engine encrypts or decrypts. Fixed by the first payload call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// An authentication tag, at most [`MAX_TAG_LEN`] bytes.
#[derive(Clone, Zeroize)]
pub struct Tag {
    bytes: [u8; MAX_TAG_LEN],
    len: usize,
}

impl Tag {
    pub(crate) fn zeroed(len: usize) -> Tag {
        debug_assert!(len <= MAX_TAG_LEN);
        Tag {
            bytes: [0u8; MAX_TAG_LEN],
            len,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ConstantTimeEq for Tag {
    fn ct_eq(&self, other: &Tag) -> subtle::Choice {
        self.as_bytes().ct_eq(other.as_bytes())
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Tag) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Tag {}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag(")?;
        for b in self.as_bytes() {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

/// Block-level operations of one cipher.
///
/// Implementations never see partial blocks except in the `*_final` calls,
/// and never see calls out of order: [`Engine`] guarantees
/// `initialize, absorb_aad_block*, finish_aad, (encrypt|decrypt)_block*,
/// (encrypt|decrypt)_final, finalize`.
pub trait DuplexTransform: Sized {
    const KEY_LEN: usize;
    const NONCE_LEN: usize;
    /// Full tag length.
    const TAG_LEN: usize;
    /// Shortest truncated tag the cipher accepts.
    const MIN_TAG_LEN: usize;
    const LAST_BLOCK: FlushPolicy = FlushPolicy::Eager;

    type AadBlock: Block;
    type PayloadBlock: Block;

    /// Builds the initial state. Key and nonce lengths are already checked.
    fn initialize(key: &[u8], nonce: &[u8]) -> Self;

    fn absorb_aad_block(&mut self, block: &[u8]);

    /// Absorbs the last, possibly empty, associated-data block.
    /// `aad_len` is the total associated-data length.
    fn finish_aad(&mut self, tail: &[u8], aad_len: u64);

    fn encrypt_block(&mut self, plaintext: &[u8], ciphertext: &mut [u8]);

    fn decrypt_block(&mut self, ciphertext: &[u8], plaintext: &mut [u8]);

    fn encrypt_final(&mut self, plaintext: &[u8], ciphertext: &mut [u8]);

    fn decrypt_final(&mut self, ciphertext: &[u8], plaintext: &mut [u8]);

    /// Runs finalization and writes the first `tag.len()` tag bytes.
    fn finalize(&mut self, tag: &mut [u8]);
}

/// The operation-ordering contract every concrete cipher satisfies.
pub trait AeadEngine: Sized {
    const KEY_LEN: usize;
    const NONCE_LEN: usize;
    /// Maximum tag length.
    const TAG_LEN: usize;
    const MIN_TAG_LEN: usize;

    /// Creates an engine producing full-length tags.
    fn new(key: &[u8], nonce: &[u8]) -> Result<Self, EngineError> {
        Self::with_tag_len(key, nonce, Self::TAG_LEN)
    }

    /// Creates an engine producing tags truncated to `tag_len` bytes.
    fn with_tag_len(key: &[u8], nonce: &[u8], tag_len: usize) -> Result<Self, EngineError>;

    fn phase(&self) -> Phase;

    fn tag_len(&self) -> usize;

    /// Authenticates `aad`. Allowed any number of times before the first
    /// payload call.
    fn ingest_aad(&mut self, aad: &[u8]) -> Result<(), EngineError>;

    /// Encrypts the available full blocks of `plaintext` into `ciphertext`
    /// and buffers the rest. Returns the number of bytes written.
    fn encrypt(&mut self, plaintext: &[u8], ciphertext: &mut [u8]) -> Result<usize, EngineError>;

    /// Decrypts the available full blocks of `ciphertext` into `plaintext`
    /// and buffers the rest. Returns the number of bytes written.
    ///
    /// Plaintext released here is unauthenticated until [`AeadEngine::verify`]
    /// returns `true`; callers must discard it otherwise.
    fn decrypt(&mut self, ciphertext: &[u8], plaintext: &mut [u8]) -> Result<usize, EngineError>;

    /// Bytes the next `encrypt`/`decrypt` call with `len` input bytes emits.
    fn update_output_size(&self, len: usize) -> usize;

    /// Bytes the `finish` call emits.
    fn finish_output_size(&self) -> usize;

    /// Processes the buffered tail and closes the payload.
    fn finish(&mut self, output: &mut [u8]) -> Result<usize, EngineError>;

    /// Produces the tag. Terminal.
    fn authenticate(&mut self) -> Result<Tag, EngineError>;

    /// Compares `candidate` against the tag in constant time. Terminal.
    fn verify(&mut self, candidate: &[u8]) -> Result<bool, EngineError>;
}

/// The shared phase machine, generic over a cipher's block transform.
///
/// One engine processes exactly one message.
pub struct Engine<T: DuplexTransform> {
    core: T,
    aad: BlockAccumulator<T::AadBlock>,
    payload: BlockAccumulator<T::PayloadBlock>,
    aad_len: u64,
    phase: Phase,
    direction: Option<Direction>,
    tag_len: usize,
    voided: bool,
}

impl<T: DuplexTransform> fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Ensure that the cipher state isn't accidentally logged
        f.debug_struct("Engine")
            .field("phase", &self.phase)
            .field("direction", &self.direction)
            .field("tag_len", &self.tag_len)
            .field("voided", &self.voided)
            .finish()
    }
}

impl<T: DuplexTransform> Engine<T> {
    /// Whether a previous error voided this engine.
    pub fn is_voided(&self) -> bool {
        self.voided
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    fn void(&mut self, err: EngineError) -> EngineError {
        if err.voids_engine() {
            debug!(phase = %self.phase, error = %err, "engine voided");
            self.voided = true;
        }
        err
    }

    fn violation(&mut self, operation: Operation) -> EngineError {
        let phase = self.phase;
        self.void(EngineError::ProtocolViolation { operation, phase })
    }

    fn check_live(&self) -> Result<(), EngineError> {
        if self.voided {
            return Err(EngineError::Voided);
        }
        Ok(())
    }

    /// Closes the associated data, moving to `AbsorbingPayload`.
    fn close_aad(&mut self) {
        let core = &mut self.core;
        let aad_len = self.aad_len;
        self.aad.flush(|tail| core.finish_aad(tail, aad_len));
        self.phase = Phase::AbsorbingPayload;
        trace!(aad_len, "associated data closed");
    }

    /// Common entry for `encrypt` and `decrypt`.
    fn update(
        &mut self,
        direction: Direction,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, EngineError> {
        self.check_live()?;
        let operation = match direction {
            Direction::Encrypt => Operation::Encrypt,
            Direction::Decrypt => Operation::Decrypt,
        };
        if self.phase > Phase::AbsorbingPayload {
            return Err(self.violation(operation));
        }
        if self.direction.map_or(false, |d| d != direction) {
            return Err(self.violation(operation));
        }

        let needed = self.payload.pending_output(input.len());
        if output.len() < needed {
            return Err(self.void(EngineError::OutputTooSmall {
                needed,
                actual: output.len(),
            }));
        }

        if self.phase == Phase::AbsorbingAad {
            self.close_aad();
        }
        self.direction = Some(direction);

        let core = &mut self.core;
        let mut written = 0;
        self.payload.feed(input, |block| {
            let out = &mut output[written..written + block.len()];
            match direction {
                Direction::Encrypt => core.encrypt_block(block, out),
                Direction::Decrypt => core.decrypt_block(block, out),
            }
            written += block.len();
        });
        Ok(written)
    }

    /// Common entry for `authenticate` and `verify`.
    fn tag(&mut self, operation: Operation) -> Result<Tag, EngineError> {
        self.check_live()?;
        if self.phase != Phase::Finalized {
            return Err(self.violation(operation));
        }
        let mut tag = Tag::zeroed(self.tag_len);
        self.core.finalize(tag.as_mut_bytes());
        self.phase = Phase::Tagged;
        trace!(tag_len = self.tag_len, "tag derived");
        Ok(tag)
    }
}

impl<T: DuplexTransform> AeadEngine for Engine<T> {
    const KEY_LEN: usize = T::KEY_LEN;
    const NONCE_LEN: usize = T::NONCE_LEN;
    const TAG_LEN: usize = T::TAG_LEN;
    const MIN_TAG_LEN: usize = T::MIN_TAG_LEN;

    fn with_tag_len(key: &[u8], nonce: &[u8], tag_len: usize) -> Result<Self, EngineError> {
        if key.len() != T::KEY_LEN {
            return Err(EngineError::InvalidKeyLength {
                expected: T::KEY_LEN,
                actual: key.len(),
            });
        }
        if nonce.len() != T::NONCE_LEN {
            return Err(EngineError::InvalidNonceLength {
                expected: T::NONCE_LEN,
                actual: nonce.len(),
            });
        }
        if tag_len < T::MIN_TAG_LEN || tag_len > T::TAG_LEN || tag_len > MAX_TAG_LEN {
            return Err(EngineError::InvalidTagLength {
                expected: T::TAG_LEN,
                actual: tag_len,
            });
        }

        let engine = Engine {
            core: T::initialize(key, nonce),
            aad: BlockAccumulator::new(T::LAST_BLOCK),
            payload: BlockAccumulator::new(T::LAST_BLOCK),
            aad_len: 0,
            phase: Phase::AbsorbingAad,
            direction: None,
            tag_len,
            voided: false,
        };
        trace!(tag_len, "engine initialized");
        Ok(engine)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn tag_len(&self) -> usize {
        self.tag_len
    }

    fn ingest_aad(&mut self, aad: &[u8]) -> Result<(), EngineError> {
        self.check_live()?;
        if self.phase != Phase::AbsorbingAad {
            return Err(self.violation(Operation::IngestAad));
        }
        let core = &mut self.core;
        self.aad.feed(aad, |block| core.absorb_aad_block(block));
        self.aad_len += aad.len() as u64;
        Ok(())
    }

    fn encrypt(&mut self, plaintext: &[u8], ciphertext: &mut [u8]) -> Result<usize, EngineError> {
        self.update(Direction::Encrypt, plaintext, ciphertext)
    }

    fn decrypt(&mut self, ciphertext: &[u8], plaintext: &mut [u8]) -> Result<usize, EngineError> {
        self.update(Direction::Decrypt, ciphertext, plaintext)
    }

    fn update_output_size(&self, len: usize) -> usize {
        self.payload.pending_output(len)
    }

    fn finish_output_size(&self) -> usize {
        self.payload.buffered()
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<usize, EngineError> {
        self.check_live()?;
        if self.phase > Phase::AbsorbingPayload {
            return Err(self.violation(Operation::Finish));
        }
        let needed = self.payload.buffered();
        if output.len() < needed {
            return Err(self.void(EngineError::OutputTooSmall {
                needed,
                actual: output.len(),
            }));
        }

        if self.phase == Phase::AbsorbingAad {
            self.close_aad();
        }

        let core = &mut self.core;
        let direction = self.direction.unwrap_or(Direction::Encrypt);
        let written = self.payload.flush(|tail| {
            let out = &mut output[..tail.len()];
            match direction {
                Direction::Encrypt => core.encrypt_final(tail, out),
                Direction::Decrypt => core.decrypt_final(tail, out),
            }
            tail.len()
        });
        self.phase = Phase::Finalized;
        trace!(tail_len = written, "payload finished");
        Ok(written)
    }

    fn authenticate(&mut self) -> Result<Tag, EngineError> {
        self.tag(Operation::Authenticate)
    }

    fn verify(&mut self, candidate: &[u8]) -> Result<bool, EngineError> {
        self.check_live()?;
        if self.phase == Phase::Finalized && candidate.len() != self.tag_len {
            let expected = self.tag_len;
            return Err(self.void(EngineError::InvalidTagLength {
                expected,
                actual: candidate.len(),
            }));
        }
        let mut tag = self.tag(Operation::Verify)?;
        let ok: bool = tag.as_bytes().ct_eq(candidate).into();
        tag.zeroize();
        if !ok {
            debug!("tag verification failed");
        }
        Ok(ok)
    }
}
