//! Key derivation and authenticated encryption.
//!
//! - **Key derivation**: PBKDF2-HMAC-SHA256 derives a 256-bit key from a
//!   passphrase and a per-vault random salt. Deterministic for a
//!   (passphrase, salt, iterations) triple, which is what lets a vault be
//!   reopened with nothing but the passphrase.
//! - **Encryption**: AES-256-GCM with a random 96-bit nonce per call.
//!   Wire format is `base64(nonce || ciphertext || tag)`.
//! - **Randomness**: `ring`'s system CSPRNG; salt generation is never
//!   deterministic or time-seeded, so two vaults created in the same
//!   second still derive unrelated keys.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, OpeningKey, SealingKey, UnboundKey};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::ZeroizeOnDrop;

use crate::core::types::Document;
use crate::error::CryptoError;

type Result<T> = std::result::Result<T, CryptoError>;

/// Symmetric key length in bytes (AES-256-GCM).
pub const KEY_LEN: usize = 32;

/// Nonce length in bytes (96-bit GCM nonce).
pub const NONCE_LEN: usize = aead::NONCE_LEN;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Default salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Minimum accepted salt length in bytes.
pub const MIN_SALT_LEN: usize = 16;

static PBKDF2_ALG: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;
static AEAD_ALG: &aead::Algorithm = &aead::AES_256_GCM;

/// Derived vault key. Never persisted; zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct VaultKey([u8; KEY_LEN]);

impl VaultKey {
    /// Raw key bytes, for key export only.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey(..)")
    }
}

/// Derive a vault key from a passphrase and salt.
///
/// # Errors
///
/// `CryptoError::SaltTooShort` for salts under [`MIN_SALT_LEN`] bytes,
/// `CryptoError::ZeroIterations` for a zero iteration count.
pub fn derive_key(passphrase: &str, salt: &[u8], iterations: u32) -> Result<VaultKey> {
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptoError::SaltTooShort {
            min: MIN_SALT_LEN,
            got: salt.len(),
        });
    }
    let iterations = std::num::NonZeroU32::new(iterations).ok_or(CryptoError::ZeroIterations)?;

    let mut key = [0u8; KEY_LEN];
    pbkdf2::derive(PBKDF2_ALG, iterations, salt, passphrase.as_bytes(), &mut key);

    tracing::debug!(iterations, "derived vault key");

    Ok(VaultKey(key))
}

/// Generate `len` cryptographically random salt bytes.
///
/// # Errors
///
/// `CryptoError::SaltTooShort` for `len` under [`MIN_SALT_LEN`],
/// `CryptoError::Random` if the system CSPRNG fails.
pub fn generate_salt(len: usize) -> Result<Vec<u8>> {
    if len < MIN_SALT_LEN {
        return Err(CryptoError::SaltTooShort {
            min: MIN_SALT_LEN,
            got: len,
        });
    }
    let mut salt = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| CryptoError::Random)?;
    Ok(salt)
}

/// Single-use nonce sequence for `ring`'s bound-key API.
///
/// A fresh random nonce is generated per call, so each sealing/opening
/// key is used exactly once.
struct SingleNonce(Option<[u8; NONCE_LEN]>);

impl SingleNonce {
    fn new(bytes: [u8; NONCE_LEN]) -> Self {
        Self(Some(bytes))
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, ring::error::Unspecified> {
        self.0
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// Encrypt `plaintext`, returning `nonce || ciphertext || tag`.
fn seal(key: &VaultKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| CryptoError::Random)?;

    let unbound = UnboundKey::new(AEAD_ALG, &key.0).map_err(|_| CryptoError::Encrypt {
        reason: "failed to create AES-256-GCM key".into(),
    })?;
    let mut sealing = SealingKey::new(unbound, SingleNonce::new(nonce_bytes));

    let mut in_out = plaintext.to_vec();
    sealing
        .seal_in_place_append_tag(Aad::empty(), &mut in_out)
        .map_err(|_| CryptoError::Encrypt {
            reason: "seal_in_place failed".into(),
        })?;

    let mut out = Vec::with_capacity(NONCE_LEN + in_out.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&in_out);
    Ok(out)
}

/// Decrypt `nonce || ciphertext || tag` bytes.
fn open(key: &VaultKey, data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::Decrypt {
            reason: "ciphertext is truncated".into(),
        });
    }
    let (nonce_bytes, ct) = data.split_at(NONCE_LEN);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);

    let unbound = UnboundKey::new(AEAD_ALG, &key.0).map_err(|_| CryptoError::Decrypt {
        reason: "failed to create AES-256-GCM key".into(),
    })?;
    let mut opening = OpeningKey::new(unbound, SingleNonce::new(nonce));

    let mut in_out = ct.to_vec();
    let plaintext = opening
        .open_in_place(Aad::empty(), &mut in_out)
        .map_err(|_| CryptoError::Decrypt {
            reason: "authentication failed (wrong key or tampered ciphertext)".into(),
        })?;

    Ok(plaintext.to_vec())
}

/// Encrypt a document body to its base64 wire form.
pub fn encrypt_document(doc: &Document, key: &VaultKey) -> Result<String> {
    let plaintext = serde_json::to_vec(doc).map_err(|e| CryptoError::Encrypt {
        reason: format!("document serialization failed: {e}"),
    })?;
    let sealed = seal(key, &plaintext)?;
    Ok(BASE64.encode(sealed))
}

/// Decrypt a base64 wire-form ciphertext back into a document body.
///
/// # Errors
///
/// `CryptoError` for malformed base64, truncated frames, authentication
/// failures, and plaintext that is not a JSON object.
pub fn decrypt_document(encoded: &str, key: &VaultKey) -> Result<Document> {
    let data = BASE64.decode(encoded)?;
    let plaintext = open(key, &data)?;
    let doc: Document = serde_json::from_slice(&plaintext).map_err(|e| CryptoError::Decrypt {
        reason: format!("decrypted payload is not a JSON object: {e}"),
    })?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Document {
        json!({"name": "Alice", "count": 10, "active": true})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn key_derivation_is_deterministic() {
        let salt = generate_salt(SALT_LEN).unwrap();
        let k1 = derive_key("passphrase", &salt, 1_000).unwrap();
        let k2 = derive_key("passphrase", &salt, 1_000).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_salts_derive_different_keys() {
        let s1 = generate_salt(SALT_LEN).unwrap();
        let s2 = generate_salt(SALT_LEN).unwrap();
        assert_ne!(s1, s2);

        let k1 = derive_key("same-pass", &s1, 1_000).unwrap();
        let k2 = derive_key("same-pass", &s2, 1_000).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn different_iterations_derive_different_keys() {
        let salt = generate_salt(SALT_LEN).unwrap();
        let k1 = derive_key("pass", &salt, 1_000).unwrap();
        let k2 = derive_key("pass", &salt, 2_000).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn short_salt_rejected() {
        assert!(matches!(
            generate_salt(8),
            Err(CryptoError::SaltTooShort { .. })
        ));
        assert!(matches!(
            derive_key("pass", &[0u8; 8], 1_000),
            Err(CryptoError::SaltTooShort { .. })
        ));
    }

    #[test]
    fn zero_iterations_rejected() {
        let salt = generate_salt(SALT_LEN).unwrap();
        assert!(matches!(
            derive_key("pass", &salt, 0),
            Err(CryptoError::ZeroIterations)
        ));
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let salt = generate_salt(SALT_LEN).unwrap();
        let key = derive_key("pass", &salt, 1_000).unwrap();

        let original = doc();
        let encoded = encrypt_document(&original, &key).unwrap();
        let decrypted = decrypt_document(&encoded, &key).unwrap();
        assert_eq!(decrypted, original);
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let salt = generate_salt(SALT_LEN).unwrap();
        let key = derive_key("correct-pass", &salt, 1_000).unwrap();
        let wrong = derive_key("wrong-pass", &salt, 1_000).unwrap();

        let encoded = encrypt_document(&doc(), &key).unwrap();
        assert!(matches!(
            decrypt_document(&encoded, &wrong),
            Err(CryptoError::Decrypt { .. })
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let salt = generate_salt(SALT_LEN).unwrap();
        let key = derive_key("pass", &salt, 1_000).unwrap();

        let encoded = encrypt_document(&doc(), &key).unwrap();
        let mut raw = BASE64.decode(&encoded).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = BASE64.encode(raw);

        assert!(matches!(
            decrypt_document(&tampered, &key),
            Err(CryptoError::Decrypt { .. })
        ));
    }

    #[test]
    fn malformed_encoding_fails() {
        let salt = generate_salt(SALT_LEN).unwrap();
        let key = derive_key("pass", &salt, 1_000).unwrap();

        assert!(matches!(
            decrypt_document("not-base64!!!", &key),
            Err(CryptoError::Encoding(_))
        ));
        // Valid base64 but too short to hold a nonce and tag.
        assert!(matches!(
            decrypt_document(&BASE64.encode(b"tiny"), &key),
            Err(CryptoError::Decrypt { .. })
        ));
    }

    #[test]
    fn nonces_are_unique_per_encryption() {
        let salt = generate_salt(SALT_LEN).unwrap();
        let key = derive_key("pass", &salt, 1_000).unwrap();

        let a = encrypt_document(&doc(), &key).unwrap();
        let b = encrypt_document(&doc(), &key).unwrap();
        assert_ne!(a, b);
    }
}
