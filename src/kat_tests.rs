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

//! Known-answer tests in the LWC format: key and nonce count up from zero,
//! `ct` is the ciphertext followed by the tag. Message and associated-data
//! lengths sit on either side of each variant's rate.

use serde_derive::Deserialize;

use crate::{oneshot, AeadEngine, Ascon128, Ascon128a, Ascon80pq};

#[derive(Deserialize, Debug)]
struct KatVector {
    variant: String,
    key: String,
    nonce: String,
    pt: String,
    ad: String,
    ct: String,
}

struct Decoded {
    key: Vec<u8>,
    nonce: Vec<u8>,
    pt: Vec<u8>,
    ad: Vec<u8>,
    ct: Vec<u8>,
}

fn vectors(variant: &str) -> Vec<Decoded> {
    let all: Vec<KatVector> =
        serde_json::from_str(include_str!("../tests/data/ascon_kat.json")).unwrap();
    let decoded: Vec<Decoded> = all
        .into_iter()
        .filter(|v| v.variant == variant)
        .map(|v| Decoded {
            key: hex::decode(&v.key).unwrap(),
            nonce: hex::decode(&v.nonce).unwrap(),
            pt: hex::decode(&v.pt).unwrap(),
            ad: hex::decode(&v.ad).unwrap(),
            ct: hex::decode(&v.ct).unwrap(),
        })
        .collect();
    assert!(!decoded.is_empty(), "no vectors for {}", variant);
    decoded
}

/// Drives one engine feeding `chunk` bytes at a time.
fn encrypt_chunked<E: AeadEngine>(v: &Decoded, chunk: usize) -> Vec<u8> {
    let mut engine = E::new(&v.key, &v.nonce).unwrap();
    for piece in v.ad.chunks(chunk) {
        engine.ingest_aad(piece).unwrap();
    }
    let mut out = vec![0u8; v.pt.len()];
    let mut written = 0;
    for piece in v.pt.chunks(chunk) {
        written += engine.encrypt(piece, &mut out[written..]).unwrap();
    }
    written += engine.finish(&mut out[written..]).unwrap();
    assert_eq!(written, v.pt.len());
    out.extend_from_slice(engine.authenticate().unwrap().as_bytes());
    out
}

fn decrypt_chunked<E: AeadEngine>(v: &Decoded, chunk: usize) -> (Vec<u8>, bool) {
    let (ct, tag) = v.ct.split_at(v.pt.len());
    let mut engine = E::new(&v.key, &v.nonce).unwrap();
    for piece in v.ad.chunks(chunk) {
        engine.ingest_aad(piece).unwrap();
    }
    let mut out = vec![0u8; ct.len()];
    let mut written = 0;
    for piece in ct.chunks(chunk) {
        written += engine.decrypt(piece, &mut out[written..]).unwrap();
    }
    engine.finish(&mut out[written..]).unwrap();
    let ok = engine.verify(tag).unwrap();
    (out, ok)
}

fn check_variant<E: AeadEngine>(variant: &str) {
    for v in vectors(variant) {
        for chunk in [1usize, 3, 7, 8, 9, 16, 64] {
            assert_eq!(
                hex::encode_upper(encrypt_chunked::<E>(&v, chunk)),
                hex::encode_upper(&v.ct),
                "{} encrypt, pt {} ad {} chunk {}",
                variant,
                v.pt.len(),
                v.ad.len(),
                chunk
            );

            let (pt, ok) = decrypt_chunked::<E>(&v, chunk);
            assert!(ok, "{} verify, pt {} ad {}", variant, v.pt.len(), v.ad.len());
            assert_eq!(pt, v.pt);
        }

        assert_eq!(oneshot::seal::<E>(&v.key, &v.nonce, &v.ad, &v.pt).unwrap(), v.ct);
        assert_eq!(oneshot::open::<E>(&v.key, &v.nonce, &v.ad, &v.ct).unwrap(), v.pt);
    }
}

#[test]
fn ascon128_kat() {
    check_variant::<Ascon128>("128");
}

#[test]
fn ascon128a_kat() {
    check_variant::<Ascon128a>("128a");
}

#[test]
fn ascon80pq_kat() {
    check_variant::<Ascon80pq>("80pq");
}

#[test]
fn empty_message_tags() {
    let cases: [(&str, &str); 3] = [
        ("128", "E355159F292911F794CB1432A0103A8A"),
        ("128a", "7A834E6F09210957067B10FD831F0078"),
        ("80pq", "ABB688EFA0B9D56B33277A2C97D2146B"),
    ];
    for (variant, tag) in cases.iter() {
        let empty = vectors(variant)
            .into_iter()
            .find(|v| v.pt.is_empty() && v.ad.is_empty())
            .unwrap();
        assert_eq!(hex::encode_upper(&empty.ct), *tag);
    }

    let mut engine = Ascon128::new(&vectors("128")[0].key, &vectors("128")[0].nonce).unwrap();
    engine.finish(&mut []).unwrap();
    assert_eq!(
        hex::encode_upper(engine.authenticate().unwrap()),
        "E355159F292911F794CB1432A0103A8A"
    );
}
