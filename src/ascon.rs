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

//! Ascon [authenticated encryption](https://ascon.iaik.tugraz.at), v1.2.
//!
//! A duplex over the 320-bit Ascon permutation. The first `rate` bytes of the
//! state are exposed to associated data and payload; the remaining capacity
//! words only ever see key material, round outputs and the domain separation
//! bit.

use core::marker::PhantomData;

use zeroize::Zeroize;

use crate::accumulator::Block;
use crate::engine::{DuplexTransform, Engine};
use crate::internal::{self, WORD_SIZE};
use crate::permutation::{State, STATE_WORDS};

/// Size of the permutation state in bytes.
const STATE_BYTES: usize = STATE_WORDS * WORD_SIZE;

/// Longest key among the variants (Ascon-80pq).
const MAX_KEY_LEN: usize = 20;

/// First byte after the message in a padded block.
const PAD: u8 = 0x80;

/// Ascon-family nonce length.
pub const NONCE_LEN: usize = 16;

/// Full Ascon tag length.
pub const TAG_LEN: usize = 16;

/// Shortest truncated tag accepted.
pub const MIN_TAG_LEN: usize = 4;

/// Parameter set of one Ascon variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    pub name: &'static str,
    pub key_len: usize,
    /// Rate in bytes; associated data and payload use the same block width.
    pub rate: usize,
    /// Rounds for initialization and finalization (`a`).
    pub init_rounds: usize,
    /// Rounds between blocks (`b`).
    pub block_rounds: usize,
}

impl Parameters {
    /// The initialization vector: key bits, rate bits, `a`, `b`, zero padded
    /// so that `IV || K || N` fills the state.
    fn iv(&self) -> [u8; STATE_BYTES] {
        let mut iv = [0u8; STATE_BYTES];
        iv[0] = (self.key_len * 8) as u8;
        iv[1] = (self.rate * 8) as u8;
        iv[2] = self.init_rounds as u8;
        iv[3] = self.block_rounds as u8;
        iv
    }
}

/// The Ascon AEAD variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Ascon128,
    Ascon128a,
    Ascon80pq,
}

impl Variant {
    pub const fn parameters(self) -> Parameters {
        match self {
            Variant::Ascon128 => Parameters {
                name: "Ascon-128",
                key_len: 16,
                rate: 8,
                init_rounds: 12,
                block_rounds: 6,
            },
            Variant::Ascon128a => Parameters {
                name: "Ascon-128a",
                key_len: 16,
                rate: 16,
                init_rounds: 12,
                block_rounds: 8,
            },
            Variant::Ascon80pq => Parameters {
                name: "Ascon-80pq",
                key_len: 20,
                rate: 8,
                init_rounds: 12,
                block_rounds: 6,
            },
        }
    }
}

/// Type-level selection of a [`Variant`].
pub trait AsconVariant {
    const VARIANT: Variant;
    const PARAMS: Parameters = Self::VARIANT.parameters();

    /// Scratch block of `rate` bytes.
    type Block: Block;
}

/// Marker for Ascon-128.
#[derive(Debug, Clone, Copy)]
pub struct Ascon128Params;

impl AsconVariant for Ascon128Params {
    const VARIANT: Variant = Variant::Ascon128;
    type Block = [u8; 8];
}

/// Marker for Ascon-128a.
#[derive(Debug, Clone, Copy)]
pub struct Ascon128aParams;

impl AsconVariant for Ascon128aParams {
    const VARIANT: Variant = Variant::Ascon128a;
    type Block = [u8; 16];
}

/// Marker for Ascon-80pq.
#[derive(Debug, Clone, Copy)]
pub struct Ascon80pqParams;

impl AsconVariant for Ascon80pqParams {
    const VARIANT: Variant = Variant::Ascon80pq;
    type Block = [u8; 8];
}

/// Ascon-128: 16-byte key, 8-byte rate.
pub type Ascon128 = Engine<AsconCore<Ascon128Params>>;

/// Ascon-128a: 16-byte key, 16-byte rate.
pub type Ascon128a = Engine<AsconCore<Ascon128aParams>>;

/// Ascon-80pq: 20-byte key, 8-byte rate.
pub type Ascon80pq = Engine<AsconCore<Ascon80pqParams>>;

/// Block transform for one Ascon variant.
pub struct AsconCore<V: AsconVariant> {
    state: State,
    key: [u8; MAX_KEY_LEN],
    _variant: PhantomData<V>,
}

impl<V: AsconVariant> ::core::fmt::Debug for AsconCore<V> {
    fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
        // Ensure that the key and state aren't accidentally logged
        write!(f, "AsconCore<{}>: STATE OMITTED", V::PARAMS.name)
    }
}

impl<V: AsconVariant> Drop for AsconCore<V> {
    fn drop(&mut self) {
        self.state.zeroize();
        self.key.zeroize();
    }
}

impl<V: AsconVariant> AsconCore<V> {
    /// Words of the state that hold rate bytes.
    fn rate_words(&mut self) -> &mut [u64] {
        &mut self.state.0[..V::PARAMS.rate / WORD_SIZE]
    }

    fn permute_block(&mut self) {
        self.state.permute(V::PARAMS.block_rounds);
    }

    /// XORs `data` (shorter than the rate) followed by the padding marker
    /// into the rate.
    fn absorb_padded(&mut self, data: &[u8]) {
        debug_assert!(data.len() < V::PARAMS.rate);
        let mut block = V::Block::default();
        block.as_mut()[..data.len()].copy_from_slice(data);
        block.as_mut()[data.len()] = PAD;
        internal::xor_block(self.rate_words(), block.as_ref());
        block.zeroize();
    }

    /// The current rate bytes.
    fn squeeze_rate(&self) -> V::Block {
        let mut block = V::Block::default();
        let words = V::PARAMS.rate / WORD_SIZE;
        internal::store_block(&self.state.0[..words], block.as_mut());
        block
    }
}

impl<V: AsconVariant> DuplexTransform for AsconCore<V> {
    const KEY_LEN: usize = V::PARAMS.key_len;
    const NONCE_LEN: usize = NONCE_LEN;
    const TAG_LEN: usize = TAG_LEN;
    const MIN_TAG_LEN: usize = MIN_TAG_LEN;

    type AadBlock = V::Block;
    type PayloadBlock = V::Block;

    fn initialize(key: &[u8], nonce: &[u8]) -> Self {
        let params = V::PARAMS;
        let key_len = params.key_len;

        // S = IV || K || N
        let mut init = params.iv();
        let key_at = STATE_BYTES - NONCE_LEN - key_len;
        init[key_at..key_at + key_len].copy_from_slice(key);
        init[STATE_BYTES - NONCE_LEN..].copy_from_slice(nonce);

        let mut core = AsconCore {
            state: State::default(),
            key: [0u8; MAX_KEY_LEN],
            _variant: PhantomData,
        };
        core.key[..key_len].copy_from_slice(key);
        internal::load_block(&mut core.state.0, &init);
        init.zeroize();

        core.state.permute(params.init_rounds);

        // S ^= 0* || K
        internal::xor_bytes_at(&mut core.state.0, STATE_BYTES - key_len, key);
        core
    }

    fn absorb_aad_block(&mut self, block: &[u8]) {
        internal::xor_block(self.rate_words(), block);
        self.permute_block();
    }

    fn finish_aad(&mut self, tail: &[u8], aad_len: u64) {
        // Empty associated data skips the padding block entirely.
        if aad_len > 0 {
            self.absorb_padded(tail);
            self.permute_block();
        }
        // domain separation
        self.state.0[4] ^= 1;
    }

    fn encrypt_block(&mut self, plaintext: &[u8], ciphertext: &mut [u8]) {
        let rate = self.rate_words();
        internal::xor_block(rate, plaintext);
        internal::store_block(rate, ciphertext);
        self.permute_block();
    }

    fn decrypt_block(&mut self, ciphertext: &[u8], plaintext: &mut [u8]) {
        let rate = self.rate_words();
        internal::store_block(rate, plaintext);
        for (p, c) in plaintext.iter_mut().zip(ciphertext) {
            *p ^= c;
        }
        // the ciphertext becomes the new rate
        internal::load_block(rate, ciphertext);
        self.permute_block();
    }

    fn encrypt_final(&mut self, plaintext: &[u8], ciphertext: &mut [u8]) {
        self.absorb_padded(plaintext);
        let mut rate = self.squeeze_rate();
        ciphertext.copy_from_slice(&rate.as_ref()[..plaintext.len()]);
        rate.zeroize();
    }

    fn decrypt_final(&mut self, ciphertext: &[u8], plaintext: &mut [u8]) {
        let mut rate = self.squeeze_rate();
        for ((p, c), s) in plaintext.iter_mut().zip(ciphertext).zip(rate.as_ref()) {
            *p = c ^ s;
        }
        rate.zeroize();
        // absorbing the recovered plaintext leaves the ciphertext in the rate
        self.absorb_padded(plaintext);
    }

    fn finalize(&mut self, tag: &mut [u8]) {
        let params = V::PARAMS;
        let key = &self.key[..params.key_len];

        // S ^= 0^rate || K || 0*
        internal::xor_bytes_at(&mut self.state.0, params.rate, key);
        self.state.permute(params.init_rounds);

        // T = (x3 || x4) ^ last 16 key bytes
        let mut full = [0u8; TAG_LEN];
        internal::store_block(&self.state.0[3..], &mut full);
        for (t, k) in full.iter_mut().zip(&key[params.key_len - TAG_LEN..]) {
            *t ^= k;
        }
        tag.copy_from_slice(&full[..tag.len()]);
        full.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AeadEngine, EngineError};

    #[test]
    fn parameter_sets() {
        assert_eq!(
            Variant::Ascon128.parameters().iv()[..8],
            [0x80, 0x40, 0x0c, 0x06, 0, 0, 0, 0]
        );
        assert_eq!(
            Variant::Ascon128a.parameters().iv()[..8],
            [0x80, 0x80, 0x0c, 0x08, 0, 0, 0, 0]
        );
        assert_eq!(Variant::Ascon80pq.parameters().iv()[..4], [0xa0, 0x40, 0x0c, 0x06]);

        assert_eq!(<Ascon128 as AeadEngine>::KEY_LEN, 16);
        assert_eq!(<Ascon80pq as AeadEngine>::KEY_LEN, 20);
        assert_eq!(<Ascon128a as AeadEngine>::NONCE_LEN, 16);
        assert_eq!(<Ascon128a as AeadEngine>::TAG_LEN, 16);
    }

    #[test]
    fn block_width_matches_rate() {
        let wide = Ascon128a::new(&[0; 16], &[0; 16]).unwrap();
        assert_eq!(wide.update_output_size(15), 0);
        assert_eq!(wide.update_output_size(16), 16);

        let narrow = Ascon128::new(&[0; 16], &[0; 16]).unwrap();
        assert_eq!(narrow.update_output_size(15), 8);
    }

    #[test]
    fn rejects_wrong_key_and_nonce_lengths() {
        assert_eq!(
            Ascon80pq::new(&[0; 16], &[0; 16]).unwrap_err(),
            EngineError::InvalidKeyLength {
                expected: 20,
                actual: 16
            }
        );
        assert_eq!(
            Ascon128::new(&[0; 16], &[0; 12]).unwrap_err(),
            EngineError::InvalidNonceLength {
                expected: 16,
                actual: 12
            }
        );
    }

    #[test]
    fn all_zero_key_and_nonce_empty_message() {
        let mut engine = Ascon128::new(&[0; 16], &[0; 16]).unwrap();
        assert_eq!(engine.finish(&mut []).unwrap(), 0);
        let tag = engine.authenticate().unwrap();
        assert_eq!(tag.len(), TAG_LEN);

        // the same inputs always give the same tag
        let mut again = Ascon128::new(&[0; 16], &[0; 16]).unwrap();
        again.finish(&mut []).unwrap();
        assert!(again.verify(tag.as_bytes()).unwrap());
    }

    #[test]
    fn capacity_untouched_by_payload() {
        let key = [0x11u8; 16];
        let nonce = [0x22u8; 16];
        let mut a = AsconCore::<Ascon128Params>::initialize(&key, &nonce);
        let mut b = AsconCore::<Ascon128Params>::initialize(&key, &nonce);
        a.finish_aad(&[], 0);
        b.finish_aad(&[], 0);

        let mut out = [0u8; 8];
        a.encrypt_final(&[1, 2, 3], &mut out[..3]);
        b.encrypt_final(&[4, 5, 6], &mut out[..3]);
        // only the rate word differs
        assert_ne!(a.state.0[0], b.state.0[0]);
        assert_eq!(a.state.0[1..], b.state.0[1..]);
    }
}
