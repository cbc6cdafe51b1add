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

//! Turns arbitrarily chunked input into block-aligned callbacks.
//!
//! The callbacks a [`BlockAccumulator`] makes depend only on the
//! concatenation of everything fed to it, never on how that stream was split
//! into calls.

use zeroize::Zeroize;

/// A fixed-size scratch block, e.g. `[u8; 8]`.
pub trait Block: AsRef<[u8]> + AsMut<[u8]> + Default + Zeroize {}

impl<B> Block for B where B: AsRef<[u8]> + AsMut<[u8]> + Default + Zeroize {}

/// When a block that exactly fills the buffer is handed to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Full blocks are processed as soon as they are complete. The final
    /// block seen by [`BlockAccumulator::flush`] is always shorter than the
    /// block width.
    Eager,
    /// A full block is held back until at least one more byte arrives, so
    /// that a final full block reaches [`BlockAccumulator::flush`] intact.
    Deferred,
}

/// Fixed-capacity buffer plus write position.
///
/// `pos < width` holds after every call under [`FlushPolicy::Eager`];
/// under [`FlushPolicy::Deferred`] `pos == width` is allowed while the
/// accumulator waits to learn whether the buffered block is the last one.
pub struct BlockAccumulator<B: Block> {
    buf: B,
    pos: usize,
    policy: FlushPolicy,
}

impl<B: Block> BlockAccumulator<B> {
    pub fn new(policy: FlushPolicy) -> BlockAccumulator<B> {
        BlockAccumulator {
            buf: B::default(),
            pos: 0,
            policy,
        }
    }

    /// Block width in bytes.
    pub fn width(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.pos
    }

    pub fn policy(&self) -> FlushPolicy {
        self.policy
    }

    /// Number of bytes that `feed` would hand to the callback if called with
    /// `len` more bytes.
    pub fn pending_output(&self, len: usize) -> usize {
        let width = self.width();
        let total = self.pos + len;
        match self.policy {
            FlushPolicy::Eager => total / width * width,
            FlushPolicy::Deferred if len == 0 => 0,
            FlushPolicy::Deferred => (total - 1) / width * width,
        }
    }

    /// Feeds `data`, calling `on_block` once per complete block that is
    /// ready under the flush policy. Leftover bytes stay buffered.
    pub fn feed<F>(&mut self, mut data: &[u8], mut on_block: F)
    where
        F: FnMut(&[u8]),
    {
        if data.is_empty() {
            return;
        }
        let width = self.width();

        // A held-back full block is no longer the last one.
        if self.pos == width {
            on_block(self.buf.as_ref());
            self.pos = 0;
        }

        if self.pos > 0 {
            let take = core::cmp::min(width - self.pos, data.len());
            self.buf.as_mut()[self.pos..self.pos + take].copy_from_slice(&data[..take]);
            self.pos += take;
            data = &data[take..];

            if self.pos < width {
                return;
            }
            if data.is_empty() && self.policy == FlushPolicy::Deferred {
                return;
            }
            on_block(self.buf.as_ref());
            self.pos = 0;
        }

        while data.len() > width || (data.len() == width && self.policy == FlushPolicy::Eager) {
            on_block(&data[..width]);
            data = &data[width..];
        }

        self.buf.as_mut()[..data.len()].copy_from_slice(data);
        self.pos = data.len();
    }

    /// Hands the buffered tail (possibly empty, or a full block under
    /// [`FlushPolicy::Deferred`]) to `on_last` and resets the buffer.
    pub fn flush<F, R>(&mut self, on_last: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        let pos = self.pos;
        let result = on_last(&self.buf.as_ref()[..pos]);
        self.buf.zeroize();
        self.pos = 0;
        result
    }
}

impl<B: Block> Drop for BlockAccumulator<B> {
    fn drop(&mut self) {
        self.buf.zeroize();
        self.pos = 0;
    }
}

impl<B: Block> ::core::fmt::Debug for BlockAccumulator<B> {
    fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
        f.debug_struct("BlockAccumulator")
            .field("width", &self.width())
            .field("pos", &self.pos)
            .field("policy", &self.policy)
            .finish()
    }
}
