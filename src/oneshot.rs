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

//! Whole-message helpers built on the [`AeadEngine`] façade.
//!
//! ```
//! # use sporae::{oneshot, Ascon128};
//! let key = [7u8; 16];
//! let nonce = [9u8; 16];
//! let sealed = oneshot::seal::<Ascon128>(&key, &nonce, b"header", b"hello").unwrap();
//! let opened = oneshot::open::<Ascon128>(&key, &nonce, b"header", &sealed).unwrap();
//! assert_eq!(opened, b"hello");
//! ```

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::engine::AeadEngine;
use crate::error::EngineError;

/// Encrypts `plaintext` and authenticates it with `aad`.
/// Returns the ciphertext followed by the full-length tag.
pub fn seal<E: AeadEngine>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, EngineError> {
    let mut engine = E::new(key, nonce)?;
    engine.ingest_aad(aad)?;

    let mut sealed = vec![0u8; plaintext.len() + E::TAG_LEN];
    let written = engine.encrypt(plaintext, &mut sealed)?;
    let written = written + engine.finish(&mut sealed[written..])?;
    debug_assert_eq!(written, plaintext.len());

    let tag = engine.authenticate()?;
    sealed[written..].copy_from_slice(tag.as_bytes());
    Ok(sealed)
}

/// Decrypts `ciphertext || tag` produced by [`seal`].
///
/// The plaintext is only returned once the tag has verified; on failure the
/// decrypted bytes are zeroed and [`EngineError::AuthenticationFailed`] is
/// returned.
pub fn open<E: AeadEngine>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    sealed: &[u8],
) -> Result<Vec<u8>, EngineError> {
    if sealed.len() < E::TAG_LEN {
        return Err(EngineError::AuthenticationFailed);
    }
    let (ciphertext, tag) = sealed.split_at(sealed.len() - E::TAG_LEN);

    let mut engine = E::new(key, nonce)?;
    engine.ingest_aad(aad)?;

    let mut plaintext = vec![0u8; ciphertext.len()];
    let written = engine.decrypt(ciphertext, &mut plaintext)?;
    engine.finish(&mut plaintext[written..])?;

    if engine.verify(tag)? {
        Ok(plaintext)
    } else {
        plaintext.zeroize();
        Err(EngineError::AuthenticationFailed)
    }
}

/// Draws a fresh nonce of `E::NONCE_LEN` bytes.
pub fn generate_nonce<E, R>(rng: &mut R) -> Vec<u8>
where
    E: AeadEngine,
    R: RngCore + CryptoRng,
{
    let mut nonce = vec![0u8; E::NONCE_LEN];
    rng.fill_bytes(&mut nonce);
    nonce
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ascon128, Ascon128a, Ascon80pq};
    use rand_chacha::ChaChaRng;
    use rand_core::SeedableRng;

    #[test]
    fn seal_then_open() {
        let key = [0x42u8; 20];
        let nonce = [0x24u8; 16];
        let message = b"a message that spans several rate blocks";

        let sealed = seal::<Ascon80pq>(&key, &nonce, b"ad", message).unwrap();
        assert_eq!(sealed.len(), message.len() + 16);
        assert_ne!(&sealed[..message.len()], &message[..]);

        let opened = open::<Ascon80pq>(&key, &nonce, b"ad", &sealed).unwrap();
        assert_eq!(opened, &message[..]);
    }

    #[test]
    fn open_rejects_tampering() {
        let key = [1u8; 16];
        let nonce = [2u8; 16];
        let sealed = seal::<Ascon128a>(&key, &nonce, b"header", b"payload").unwrap();

        let mut bad_ct = sealed.clone();
        bad_ct[0] ^= 1;
        assert_eq!(
            open::<Ascon128a>(&key, &nonce, b"header", &bad_ct),
            Err(EngineError::AuthenticationFailed)
        );
        assert_eq!(
            open::<Ascon128a>(&key, &nonce, b"headex", &sealed),
            Err(EngineError::AuthenticationFailed)
        );
        assert_eq!(
            open::<Ascon128a>(&key, &nonce, b"header", &sealed[..10]),
            Err(EngineError::AuthenticationFailed)
        );
    }

    #[test]
    fn open_rejects_short_input() {
        assert_eq!(
            open::<Ascon128>(&[0; 16], &[0; 16], b"", &[0; 15]),
            Err(EngineError::AuthenticationFailed)
        );
    }

    #[test]
    fn seal_propagates_length_errors() {
        assert_eq!(
            seal::<Ascon128>(&[0; 15], &[0; 16], b"", b""),
            Err(EngineError::InvalidKeyLength {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn nonces_are_drawn_from_rng() {
        let mut rng = ChaChaRng::from_seed([0; 32]);
        let n1 = generate_nonce::<Ascon128, _>(&mut rng);
        let n2 = generate_nonce::<Ascon128, _>(&mut rng);
        assert_eq!(n1.len(), 16);
        assert_ne!(n1, n2);

        let mut replay = ChaChaRng::from_seed([0; 32]);
        assert_eq!(generate_nonce::<Ascon128, _>(&mut replay), n1);
    }
}
