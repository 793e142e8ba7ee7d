//! Integration tests for the crypto layer's observable properties.

use std::collections::HashSet;

use havenvault::crypto::encryption::{decrypt_json, encrypt_json};
use havenvault::crypto::kdf::{derive_key, generate_salt, MIN_ITERATIONS};
use havenvault::crypto::keys::SessionKey;
use havenvault::errors::VaultError;
use serde_json::json;

// ---------------------------------------------------------------------------
// Round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip_exact_value() {
    let key = SessionKey::new([42u8; 32]);
    let value = json!({"hello": "world", "n": 1});

    let payload = encrypt_json(&key, &value).expect("encrypt");
    let out: serde_json::Value = decrypt_json(&key, &payload).expect("decrypt");

    assert_eq!(out["hello"], "world");
    assert_eq!(out["n"], 1);
    assert_eq!(out, value);
}

// ---------------------------------------------------------------------------
// Key isolation
// ---------------------------------------------------------------------------

#[test]
fn a_different_key_never_decrypts() {
    let k1 = SessionKey::new([1u8; 32]);
    let k2 = SessionKey::new([2u8; 32]);

    let payload = encrypt_json(&k1, &json!({"private": "thought"})).unwrap();
    let err = decrypt_json::<serde_json::Value>(&k2, &payload).unwrap_err();
    assert!(matches!(err, VaultError::DecryptFailed));
}

#[test]
fn derived_keys_isolate_by_passcode_and_salt() {
    let salt = generate_salt();
    let k1 = derive_key("first-passcode", &salt, MIN_ITERATIONS).unwrap();
    let k2 = derive_key("other-passcode", &salt, MIN_ITERATIONS).unwrap();

    let payload = encrypt_json(&k1, &json!("hidden")).unwrap();
    assert!(decrypt_json::<serde_json::Value>(&k2, &payload).is_err());

    // Same passcode, different salt: also a different key.
    let k3 = derive_key("first-passcode", &generate_salt(), MIN_ITERATIONS).unwrap();
    assert!(decrypt_json::<serde_json::Value>(&k3, &payload).is_err());

    // Same passcode, same salt: the original key, decrypts fine.
    let k4 = derive_key("first-passcode", &salt, MIN_ITERATIONS).unwrap();
    let out: String = decrypt_json(&k4, &payload).unwrap();
    assert_eq!(out, "hidden");
}

// ---------------------------------------------------------------------------
// IV freshness
// ---------------------------------------------------------------------------

#[test]
fn repeated_encryption_never_repeats_iv_or_ciphertext() {
    let key = SessionKey::new([7u8; 32]);
    let value = json!({"same": "plaintext"});

    let mut seen = HashSet::new();
    for _ in 0..50 {
        let payload = encrypt_json(&key, &value).unwrap();
        assert_eq!(payload.iv.len(), 12);
        assert!(
            seen.insert((payload.iv.clone(), payload.ciphertext.clone())),
            "duplicate (iv, ciphertext) pair"
        );
    }
}
