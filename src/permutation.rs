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

//! The 320-bit Ascon permutation.
//!
//! Each round adds a constant to `x2`, runs the 5-bit S-box bitsliced across
//! the five words, then diffuses every word with two fixed rotations. `p^n`
//! runs the last `n` of the twelve rounds.

use zeroize::Zeroize;

/// Number of 64-bit words in the state.
pub const STATE_WORDS: usize = 5;

/// Largest round count; `p^12` is used for initialization and finalization.
pub const MAX_ROUNDS: usize = 12;

/// Round constants, indexed by round number `0..12`.
pub const ROUND_CONSTANTS: [u64; MAX_ROUNDS] = [
    0xf0, 0xe1, 0xd2, 0xc3, 0xb4, 0xa5, 0x96, 0x87, 0x78, 0x69, 0x5a, 0x4b,
];

/// Ascon state: `x0 .. x4`.
#[derive(Clone, Default, PartialEq, Eq, Zeroize)]
pub struct State(pub [u64; STATE_WORDS]);

impl ::core::fmt::Debug for State {
    fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
        // Ensure that the state isn't accidentally logged
        write!(f, "State: OMITTED")
    }
}

impl State {
    pub fn new(words: [u64; STATE_WORDS]) -> State {
        State(words)
    }

    /// Applies `p^rounds` in place.
    pub fn permute(&mut self, rounds: usize) {
        permute(&mut self.0, rounds)
    }
}

#[inline(always)]
fn round(x: &mut [u64; STATE_WORDS], c: u64) {
    // constant addition
    x[2] ^= c;

    // substitution layer
    x[0] ^= x[4];
    x[4] ^= x[3];
    x[2] ^= x[1];

    let t0 = !x[0] & x[1];
    let t1 = !x[1] & x[2];
    let t2 = !x[2] & x[3];
    let t3 = !x[3] & x[4];
    let t4 = !x[4] & x[0];

    x[0] ^= t1;
    x[1] ^= t2;
    x[2] ^= t3;
    x[3] ^= t4;
    x[4] ^= t0;

    x[1] ^= x[0];
    x[0] ^= x[4];
    x[3] ^= x[2];
    x[2] = !x[2];

    // linear diffusion layer
    x[0] ^= x[0].rotate_right(19) ^ x[0].rotate_right(28);
    x[1] ^= x[1].rotate_right(61) ^ x[1].rotate_right(39);
    x[2] ^= x[2].rotate_right(1) ^ x[2].rotate_right(6);
    x[3] ^= x[3].rotate_right(10) ^ x[3].rotate_right(17);
    x[4] ^= x[4].rotate_right(7) ^ x[4].rotate_right(41);
}

/// Applies the last `rounds` rounds of the permutation (`p^rounds`).
pub fn permute(x: &mut [u64; STATE_WORDS], rounds: usize) {
    debug_assert!(rounds <= MAX_ROUNDS, "at most {} rounds", MAX_ROUNDS);
    for c in &ROUND_CONSTANTS[MAX_ROUNDS - rounds..] {
        round(x, *c);
    }
}
