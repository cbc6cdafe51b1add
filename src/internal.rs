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

//! Big-endian word/byte conversion shared by the permutation-based cores.

use byteorder::{BigEndian, ByteOrder};

/// Width of a state word in bytes.
pub(crate) const WORD_SIZE: usize = 8;

/// XORs `block` into consecutive words. `block` must be a whole number of words.
pub(crate) fn xor_block(words: &mut [u64], block: &[u8]) {
    debug_assert_eq!(block.len() % WORD_SIZE, 0);
    for (word, chunk) in words.iter_mut().zip(block.chunks_exact(WORD_SIZE)) {
        *word ^= BigEndian::read_u64(chunk);
    }
}

/// Overwrites consecutive words with `block`.
pub(crate) fn load_block(words: &mut [u64], block: &[u8]) {
    debug_assert_eq!(block.len() % WORD_SIZE, 0);
    for (word, chunk) in words.iter_mut().zip(block.chunks_exact(WORD_SIZE)) {
        *word = BigEndian::read_u64(chunk);
    }
}

/// Serializes consecutive words into `out`.
pub(crate) fn store_block(words: &[u64], out: &mut [u8]) {
    debug_assert_eq!(out.len() % WORD_SIZE, 0);
    for (word, chunk) in words.iter().zip(out.chunks_exact_mut(WORD_SIZE)) {
        BigEndian::write_u64(chunk, *word);
    }
}

/// XORs `bytes` into the word array viewed as one big-endian byte string,
/// starting at byte `offset`.
pub(crate) fn xor_bytes_at(words: &mut [u64], offset: usize, bytes: &[u8]) {
    for (i, byte) in bytes.iter().enumerate() {
        let at = offset + i;
        let shift = 8 * (WORD_SIZE - 1 - at % WORD_SIZE);
        words[at / WORD_SIZE] ^= u64::from(*byte) << shift;
    }
}
