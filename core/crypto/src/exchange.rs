//! Direction-aware session key derivation.
//!
//! The raw X25519 output is the same for both directions of a conversation.
//! Hashing it together with the ordered pair (reader public key, writer
//! public key) binds the session key to one direction, while both parties
//! still compute the same 96-byte input:
//!
//! ```text
//! session_key = BLAKE2b-512(dh || reader_pk || writer_pk)[..32]
//! ```

use blake2::{Blake2b512, Digest};
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::keys::{PrivateKey, PublicKey};
use crypt4gh_common::{Error, Result};

/// Length of a derived session key in bytes.
pub const SESSION_KEY_LENGTH: usize = 32;

/// Which side of the exchange the local private key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The local key pair receives (decrypts) the payload.
    Reader,
    /// The local key pair produces (encrypts) the payload.
    Writer,
}

impl Role {
    /// Order `(own, peer)` as `(reader_pk, writer_pk)`.
    fn order<'a>(self, own: &'a PublicKey, peer: &'a PublicKey) -> (&'a PublicKey, &'a PublicKey) {
        match self {
            Role::Reader => (own, peer),
            Role::Writer => (peer, own),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Reader => write!(f, "reader"),
            Role::Writer => write!(f, "writer"),
        }
    }
}

/// Symmetric key for one reader/writer pairing.
///
/// Held in memory only; zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    key: [u8; SESSION_KEY_LENGTH],
}

impl SessionKey {
    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_LENGTH] {
        &self.key
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.key[..].ct_eq(&other.key[..]).into()
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey([REDACTED])")
    }
}

/// Derive the session key shared between `own_private` and `peer_public`.
///
/// # Postconditions
/// - `derive_shared_key(a, B, Reader) == derive_shared_key(b, A, Writer)`
///   for any key pairs (a, A) and (b, B)
/// - Reader and Writer keys for the same inputs differ unless both pairs
///   are the same
///
/// # Errors
/// - Returns `LowOrderPoint` if `peer_public` yields an all-zero shared secret
pub fn derive_shared_key(
    own_private: &PrivateKey,
    peer_public: &PublicKey,
    role: Role,
) -> Result<SessionKey> {
    let own_public = own_private.public_key();

    let secret = own_private.to_static_secret();
    let shared = secret.diffie_hellman(&peer_public.to_x25519());
    if !shared.was_contributory() {
        return Err(Error::LowOrderPoint);
    }

    let (reader_public, writer_public) = role.order(&own_public, peer_public);

    let mut hasher = Blake2b512::new();
    hasher.update(shared.as_bytes());
    hasher.update(reader_public.as_bytes());
    hasher.update(writer_public.as_bytes());
    let mut digest = hasher.finalize();

    let mut key = [0u8; SESSION_KEY_LENGTH];
    key.copy_from_slice(&digest[..SESSION_KEY_LENGTH]);
    digest.as_mut_slice().zeroize();

    debug!(%role, peer = %peer_public, "Derived session key");

    Ok(SessionKey { key })
}

impl PrivateKey {
    /// Derive the session key between this key and `peer_public`.
    ///
    /// See [`derive_shared_key`].
    pub fn session_key(&self, peer_public: &PublicKey, role: Role) -> Result<SessionKey> {
        derive_shared_key(self, peer_public, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex32;
    use crate::keys::{KeyPair, KEY_LENGTH};
    use proptest::prelude::*;

    fn rfc7748_alice() -> PrivateKey {
        PrivateKey::from_bytes(hex32(
            "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a",
        ))
    }

    fn rfc7748_bob() -> PrivateKey {
        PrivateKey::from_bytes(hex32(
            "5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb",
        ))
    }

    #[test]
    fn test_known_answer_reader_hash_input() {
        let alice = rfc7748_alice();
        let bob = rfc7748_bob();
        let dh = hex32("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");

        // Alice reads, Bob writes.
        let mut hasher = Blake2b512::new();
        hasher.update(dh);
        hasher.update(alice.public_key().as_bytes());
        hasher.update(bob.public_key().as_bytes());
        let digest = hasher.finalize();

        let key = derive_shared_key(&alice, &bob.public_key(), Role::Reader).unwrap();
        assert_eq!(&key.as_bytes()[..], &digest[..SESSION_KEY_LENGTH]);

        let key = derive_shared_key(&bob, &alice.public_key(), Role::Writer).unwrap();
        assert_eq!(&key.as_bytes()[..], &digest[..SESSION_KEY_LENGTH]);
    }

    #[test]
    fn test_role_symmetry() {
        let reader = KeyPair::generate().unwrap();
        let writer = KeyPair::generate().unwrap();

        let k1 = derive_shared_key(reader.private_key(), writer.public_key(), Role::Reader).unwrap();
        let k2 = derive_shared_key(writer.private_key(), reader.public_key(), Role::Writer).unwrap();

        assert_eq!(k1, k2);
        assert_eq!(k1.as_bytes().len(), SESSION_KEY_LENGTH);
    }

    #[test]
    fn test_role_distinctness() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();

        let as_reader = a.private_key().session_key(b.public_key(), Role::Reader).unwrap();
        let as_writer = a.private_key().session_key(b.public_key(), Role::Writer).unwrap();

        assert_ne!(as_reader, as_writer);
    }

    #[test]
    fn test_same_pair_roles_coincide() {
        let a = KeyPair::generate().unwrap();

        let as_reader = a.private_key().session_key(a.public_key(), Role::Reader).unwrap();
        let as_writer = a.private_key().session_key(a.public_key(), Role::Writer).unwrap();

        assert_eq!(as_reader, as_writer);
    }

    #[test]
    fn test_different_peers_different_keys() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        let c = KeyPair::generate().unwrap();

        let ab = a.private_key().session_key(b.public_key(), Role::Writer).unwrap();
        let ac = a.private_key().session_key(c.public_key(), Role::Writer).unwrap();

        assert_ne!(ab, ac);
    }

    #[test]
    fn test_low_order_points_rejected() {
        let a = KeyPair::generate().unwrap();

        let zero = PublicKey::from_bytes([0u8; KEY_LENGTH]);
        assert!(matches!(
            derive_shared_key(a.private_key(), &zero, Role::Reader),
            Err(Error::LowOrderPoint)
        ));

        let mut one = [0u8; KEY_LENGTH];
        one[0] = 1;
        assert!(matches!(
            derive_shared_key(a.private_key(), &PublicKey::from_bytes(one), Role::Writer),
            Err(Error::LowOrderPoint)
        ));

        // Point of order 8.
        let order8 = PublicKey::from_bytes(hex32(
            "e0eb7a7c3b41b8ae1656e3faf19fc46ada098deb9c32b1fd866205165f49b800",
        ));
        assert!(matches!(
            derive_shared_key(a.private_key(), &order8, Role::Reader),
            Err(Error::LowOrderPoint)
        ));
    }

    #[test]
    fn test_session_key_debug_redacted() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        let key = a.private_key().session_key(b.public_key(), Role::Reader).unwrap();

        assert_eq!(format!("{:?}", key), "SessionKey([REDACTED])");
    }

    proptest! {
        #[test]
        fn prop_role_symmetry(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let a = KeyPair::from_private(PrivateKey::from_bytes(a));
            let b = KeyPair::from_private(PrivateKey::from_bytes(b));

            let k1 = derive_shared_key(a.private_key(), b.public_key(), Role::Reader).unwrap();
            let k2 = derive_shared_key(b.private_key(), a.public_key(), Role::Writer).unwrap();
            prop_assert_eq!(k1, k2);
        }

        #[test]
        fn prop_role_distinctness(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let a = KeyPair::from_private(PrivateKey::from_bytes(a));
            let b = KeyPair::from_private(PrivateKey::from_bytes(b));
            prop_assume!(a.public_key() != b.public_key());

            let reader = derive_shared_key(a.private_key(), b.public_key(), Role::Reader).unwrap();
            let writer = derive_shared_key(a.private_key(), b.public_key(), Role::Writer).unwrap();
            prop_assert_ne!(reader, writer);
        }
    }
}
