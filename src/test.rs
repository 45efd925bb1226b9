use crate::block::{Algorithm, KeyedCipher};
use crate::ccm::{CcmContext, State};
use crate::config::CcmConfig;
use crate::error::Error;
use proptest::{collection::vec, prelude::*, sample::Index};

#[derive(Clone, Debug)]
struct Message {
    algorithm: Algorithm,
    key: Vec<u8>,
    config: CcmConfig,
    nonce: Vec<u8>,
    aad: Vec<u8>,
    plaintext: Vec<u8>,
}

#[derive(Clone, Copy, Debug)]
enum Target {
    Ciphertext,
    Tag,
    Aad,
}

fn seal(m: &Message) -> (Vec<u8>, Vec<u8>) {
    let mut ccm = CcmContext::for_algorithm(m.algorithm, &m.key, m.config).unwrap();
    ccm.set_nonce(&m.nonce).unwrap();
    ccm.update_aad(&m.aad).unwrap();
    let ciphertext = ccm.encrypt(&m.plaintext).unwrap();
    ccm.finalize().unwrap();
    (ciphertext, ccm.tag().unwrap().to_vec())
}

fn open(m: &Message, aad: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Vec<u8>, Error> {
    let mut ccm = CcmContext::for_algorithm(m.algorithm, &m.key, m.config).unwrap();
    ccm.set_expected_tag(tag)?;
    ccm.set_nonce(&m.nonce)?;
    ccm.update_aad(aad)?;
    let plaintext = ccm.decrypt(ciphertext);
    assert_eq!(State::PayloadProcessed, ccm.state());
    let plaintext = plaintext?;
    ccm.finalize()?;
    Ok(plaintext)
}

fn arb_data() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..200)
}

fn arb_algorithm() -> impl Strategy<Value = Algorithm> {
    prop_oneof![
        Just(Algorithm::Aes128),
        Just(Algorithm::Aes192),
        Just(Algorithm::Aes256),
        Just(Algorithm::Sm4),
    ]
}

prop_compose! {
    fn arb_config()(tag in 2usize..=8, nonce in 7usize..=13) -> CcmConfig {
        CcmConfig::new(tag * 2, nonce).unwrap()
    }
}

prop_compose! {
    fn arb_message()(algorithm in arb_algorithm(), config in arb_config())(
        key in vec(any::<u8>(), algorithm.key_len()),
        nonce in vec(any::<u8>(), config.nonce_len()),
        aad in vec(any::<u8>(), 0..64),
        plaintext in arb_data(),
        algorithm in Just(algorithm),
        config in Just(config)
    ) -> Message {
        Message { algorithm, key, config, nonce, aad, plaintext }
    }
}

fn arb_target() -> impl Strategy<Value = Target> {
    prop_oneof![Just(Target::Ciphertext), Just(Target::Tag), Just(Target::Aad)]
}

proptest! {
    #[test]
    fn test_round_trip(m in arb_message()) {
        let (ciphertext, tag) = seal(&m);
        prop_assert_eq!(m.plaintext.len(), ciphertext.len());
        prop_assert_eq!(m.config.tag_len(), tag.len());
        prop_assert_eq!(&m.plaintext, &open(&m, &m.aad, &ciphertext, &tag).unwrap());
    }

    #[test]
    fn test_deterministic(m in arb_message()) {
        prop_assert_eq!(seal(&m), seal(&m));
    }

    #[test]
    fn test_split_aad(m in arb_message(), at in any::<Index>()) {
        let at = at.index(m.aad.len() + 1);
        let mut ccm = CcmContext::for_algorithm(m.algorithm, &m.key, m.config).unwrap();
        ccm.set_nonce(&m.nonce).unwrap();
        ccm.update_aad(&m.aad[..at]).unwrap();
        ccm.update_aad(&m.aad[at..]).unwrap();
        let ciphertext = ccm.encrypt(&m.plaintext).unwrap();
        ccm.finalize().unwrap();

        prop_assert_eq!(seal(&m), (ciphertext, ccm.tag().unwrap().to_vec()));
    }

    #[test]
    fn test_shared_cipher(m in arb_message()) {
        // One key schedule borrowed by a context gives the owned result
        let cipher = KeyedCipher::new(m.algorithm, &m.key).unwrap();
        let mut ccm = CcmContext::with_config(&cipher, m.config);
        ccm.set_nonce(&m.nonce).unwrap();
        ccm.update_aad(&m.aad).unwrap();
        let ciphertext = ccm.encrypt(&m.plaintext).unwrap();
        ccm.finalize().unwrap();

        prop_assert_eq!(seal(&m), (ciphertext, ccm.tag().unwrap().to_vec()));
    }

    #[test]
    fn test_tamper(
        m in arb_message(),
        target in arb_target(),
        at in any::<Index>(),
        bit in 0u8..8
    ) {
        let (mut ciphertext, mut tag) = seal(&m);
        let mut aad = m.aad.clone();
        let region = match target {
            Target::Ciphertext if !ciphertext.is_empty() => &mut ciphertext,
            Target::Aad if !aad.is_empty() => &mut aad,
            _ => &mut tag,
        };
        let at = at.index(region.len());
        region[at] ^= 1 << bit;

        prop_assert_eq!(
            Err(Error::AuthenticationFailed),
            open(&m, &aad, &ciphertext, &tag)
        );
    }

    #[test]
    fn test_dropped_aad(m in arb_message()) {
        prop_assume!(!m.aad.is_empty());
        let (ciphertext, tag) = seal(&m);
        prop_assert_eq!(
            Err(Error::AuthenticationFailed),
            open(&m, &[], &ciphertext, &tag)
        );
    }
}
