use std::fmt;

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use rand::RngCore;
use sealconf_core::storage::{AuthenticatedCipher, CipherError};

/// First byte of every envelope; also bound as associated data.
const ENVELOPE_VERSION: u8 = 1;
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// AES-256-GCM cipher producing text-safe envelopes.
///
/// Keys are 32 bytes carried as URL-safe base64 text. An envelope is the
/// base64 text of `version || nonce || ciphertext+tag`, with a fresh random
/// nonce per encryption.
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        f.debug_struct("AesGcmCipher").finish_non_exhaustive()
    }
}

impl AuthenticatedCipher for AesGcmCipher {
    fn generate_key() -> Vec<u8> {
        let mut bytes = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        URL_SAFE.encode(bytes).into_bytes()
    }

    fn from_key(key: &[u8]) -> Result<Self, CipherError> {
        let bytes = URL_SAFE
            .decode(key.trim_ascii())
            .map_err(|e| CipherError::InvalidKey {
                reason: format!("expected url-safe base64 text: {e}"),
            })?;

        if bytes.len() != KEY_LEN {
            return Err(CipherError::InvalidKey {
                reason: format!("expected {KEY_LEN} bytes, got {}", bytes.len()),
            });
        }

        let cipher = Aes256Gcm::new_from_slice(&bytes).map_err(|e| CipherError::InvalidKey {
            reason: format!("cipher init failed: {e}"),
        })?;
        Ok(Self { cipher })
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: &[ENVELOPE_VERSION],
                },
            )
            .map_err(|e| CipherError::Encryption {
                reason: e.to_string(),
            })?;

        let mut envelope = Vec::with_capacity(1 + NONCE_LEN + sealed.len());
        envelope.push(ENVELOPE_VERSION);
        envelope.extend_from_slice(nonce.as_slice());
        envelope.extend_from_slice(&sealed);
        Ok(URL_SAFE.encode(envelope).into_bytes())
    }

    fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CipherError> {
        let envelope = URL_SAFE
            .decode(blob)
            .map_err(|e| auth_err(format!("envelope decode failed: {e}")))?;

        if envelope.len() < 1 + NONCE_LEN + TAG_LEN {
            return Err(auth_err(format!(
                "envelope too short: {} bytes",
                envelope.len()
            )));
        }

        let (version, rest) = envelope
            .split_first()
            .ok_or_else(|| auth_err("empty envelope".to_string()))?;
        if *version != ENVELOPE_VERSION {
            return Err(auth_err(format!("unsupported envelope version: {version}")));
        }

        let (nonce, sealed) = rest.split_at(NONCE_LEN);
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: &[ENVELOPE_VERSION],
                },
            )
            .map_err(|_| auth_err("invalid key or corrupted data".to_string()))
    }
}

fn auth_err(reason: String) -> CipherError {
    CipherError::Authentication { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> AesGcmCipher {
        AesGcmCipher::from_key(&AesGcmCipher::generate_key()).expect("cipher")
    }

    #[test]
    fn generated_key_is_base64_of_32_bytes() {
        let key = AesGcmCipher::generate_key();
        assert_eq!(key.len(), 44);
        let decoded = URL_SAFE.decode(&key).expect("decode");
        assert_eq!(decoded.len(), KEY_LEN);
        assert_ne!(key, AesGcmCipher::generate_key());
    }

    #[test]
    fn round_trip_encrypts_and_decrypts() {
        let cipher = cipher();
        let blob = cipher.encrypt(b"api_token = \"secret\"").expect("encrypt");

        let text = String::from_utf8(blob.clone()).expect("envelope is text");
        assert!(!text.contains("secret"), "plaintext must not be stored");
        assert_eq!(
            cipher.decrypt(&blob).expect("decrypt"),
            b"api_token = \"secret\""
        );
    }

    #[test]
    fn nonces_are_fresh_per_encryption() {
        let cipher = cipher();
        let first = cipher.encrypt(b"same").expect("encrypt");
        let second = cipher.encrypt(b"same").expect("encrypt");
        assert_ne!(first, second);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let blob = cipher().encrypt(b"payload").expect("encrypt");
        let err = cipher().decrypt(&blob).expect_err("wrong key");
        assert!(matches!(err, CipherError::Authentication { .. }));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let cipher = cipher();
        let blob = cipher.encrypt(b"payload").expect("encrypt");
        let mut envelope = URL_SAFE.decode(&blob).expect("decode");
        envelope[0] = 2;
        let err = cipher
            .decrypt(URL_SAFE.encode(envelope).as_bytes())
            .expect_err("version");
        assert!(matches!(err, CipherError::Authentication { .. }));
    }

    #[test]
    fn short_or_garbage_input_fails_authentication() {
        let cipher = cipher();
        let inputs: [&[u8]; 3] = [b"", b"AAAA", b"not base64 at all!"];
        for input in inputs {
            let err = cipher.decrypt(input).expect_err("should fail");
            assert!(matches!(err, CipherError::Authentication { .. }));
        }
    }

    #[test]
    fn rejects_malformed_keys() {
        let keys: [&[u8]; 3] = [b"short", b"!!!!", b"AAAA"];
        for key in keys {
            let err = AesGcmCipher::from_key(key).expect_err("should reject");
            assert!(matches!(err, CipherError::InvalidKey { .. }));
        }
    }

    #[test]
    fn tolerates_surrounding_whitespace_in_key() {
        let mut key = AesGcmCipher::generate_key();
        key.push(b'\n');
        assert!(AesGcmCipher::from_key(&key).is_ok());
    }

    #[test]
    fn debug_output_redacts_key() {
        assert_eq!(format!("{:?}", cipher()), "AesGcmCipher { .. }");
    }
}
