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

//! Streaming authenticated encryption.
//!
//! Every cipher is driven through the same call sequence,
//! `ingest_aad* , (encrypt | decrypt)* , finish , (authenticate | verify)`,
//! on an [`Engine`] that owns the buffering and the phase discipline. A
//! cipher plugs in by implementing [`DuplexTransform`]; this crate ships the
//! Ascon duplex ([`Ascon128`], [`Ascon128a`], [`Ascon80pq`]).
//!
//! ```
//! use sporae::{AeadEngine, Ascon128};
//!
//! let key = [0u8; 16];
//! let nonce = [1u8; 16];
//! let message = b"attack at dawn";
//!
//! let mut sender = Ascon128::new(&key, &nonce).unwrap();
//! sender.ingest_aad(b"header").unwrap();
//! let mut ciphertext = vec![0u8; message.len()];
//! let n = sender.encrypt(&message[..5], &mut ciphertext).unwrap();
//! let n = n + sender.encrypt(&message[5..], &mut ciphertext[n..]).unwrap();
//! sender.finish(&mut ciphertext[n..]).unwrap();
//! let tag = sender.authenticate().unwrap();
//!
//! let mut receiver = Ascon128::new(&key, &nonce).unwrap();
//! receiver.ingest_aad(b"header").unwrap();
//! let mut plaintext = vec![0u8; ciphertext.len()];
//! let n = receiver.decrypt(&ciphertext, &mut plaintext).unwrap();
//! receiver.finish(&mut plaintext[n..]).unwrap();
//! assert!(receiver.verify(tag.as_bytes()).unwrap());
//! assert_eq!(&plaintext[..], &message[..]);
//! ```

pub mod accumulator;
pub mod ascon;
pub mod engine;
mod error;
pub(crate) mod internal;
pub mod oneshot;
pub mod permutation;

pub use accumulator::{BlockAccumulator, FlushPolicy};
pub use ascon::{Ascon128, Ascon128a, Ascon80pq, Variant};
pub use engine::{AeadEngine, Direction, DuplexTransform, Engine, Phase, Tag};
pub use error::{EngineError, Operation};


#[cfg(test)]
mod kat_tests;
