//! Cryptographic primitives for crypt4gh key management.
//!
//! This module provides:
//! - X25519 key pair generation
//! - PEM armor for key files, compatible with OpenSSL's X25519 layout
//! - Direction-aware session key derivation (X25519 + BLAKE2b-512)
//!
//! # Security Guarantees
//! - Private keys and session keys are zeroized on drop
//! - No key material is ever logged
//! - Constant-time equality for secret values

pub mod armor;
pub mod exchange;
pub mod keys;

pub use armor::{
    decode_key, encode_key, read_armored, read_private_key, read_public_key, write_key,
    ArmoredKey, KeyKind,
};
pub use exchange::{derive_shared_key, Role, SessionKey, SESSION_KEY_LENGTH};
pub use keys::{KeyMaterial, KeyPair, PrivateKey, PublicKey, KEY_LENGTH};

#[cfg(test)]
pub(crate) fn hex32(s: &str) -> [u8; KEY_LENGTH] {
    let mut out = [0u8; KEY_LENGTH];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).unwrap();
    }
    out
}
