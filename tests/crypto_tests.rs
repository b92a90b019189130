//! Tests for cryptographic operations through the public surface.

use coffer::core::crypto::{
    decrypt_document, derive_key, encrypt_document, generate_salt, KEY_LEN, SALT_LEN,
};
use proptest::prelude::*;
use serde_json::json;

#[test]
fn test_derived_key_has_expected_length() {
    let salt = generate_salt(SALT_LEN).unwrap();
    let key = derive_key("pass", &salt, 1_000).unwrap();
    assert_eq!(key.as_bytes().len(), KEY_LEN);
}

#[test]
fn test_salts_are_independent_within_one_process() {
    // Salt generation must not be time-seeded: many salts generated
    // back-to-back are still pairwise distinct.
    let salts: Vec<_> = (0..32).map(|_| generate_salt(SALT_LEN).unwrap()).collect();
    for (i, a) in salts.iter().enumerate() {
        for b in &salts[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_longer_salts_accepted() {
    let salt = generate_salt(32).unwrap();
    assert_eq!(salt.len(), 32);
    assert!(derive_key("pass", &salt, 1_000).is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_roundtrip_preserves_arbitrary_fields(
        name in ".{0,64}",
        count in any::<i64>(),
        flag in any::<bool>(),
    ) {
        let salt = generate_salt(SALT_LEN).unwrap();
        let key = derive_key("prop-pass", &salt, 1_000).unwrap();

        let doc = json!({"name": name, "count": count, "flag": flag})
            .as_object()
            .cloned()
            .unwrap();

        let encoded = encrypt_document(&doc, &key).unwrap();
        let decrypted = decrypt_document(&encoded, &key).unwrap();
        prop_assert_eq!(decrypted, doc);
    }
}
