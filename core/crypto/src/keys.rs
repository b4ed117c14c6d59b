//! X25519 key types with secure memory handling.
//!
//! Private key material is zeroized on drop. Public keys are always
//! re-derivable from the private scalar, so a [`KeyPair`] never treats its
//! public half as independent authority.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use subtle::ConstantTimeEq;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crypt4gh_common::{Error, Result};

/// Length of X25519 key material in bytes.
pub const KEY_LENGTH: usize = 32;

/// Raw 32-byte key material: a private scalar or a public curve point.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_LENGTH],
}

impl KeyMaterial {
    /// Create key material from a fixed-size array.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Create key material from a slice.
    ///
    /// # Errors
    /// - Returns a format error if the slice is not exactly KEY_LENGTH bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| {
            Error::format(format!(
                "Invalid key length: expected {}, got {}",
                KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl Eq for KeyMaterial {}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([REDACTED])")
    }
}

/// X25519 private key.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(KeyMaterial);

impl PrivateKey {
    /// Create a private key from raw bytes.
    ///
    /// The bytes are stored as given; X25519 clamps the scalar on every use.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(KeyMaterial::from_bytes(bytes))
    }

    /// Wrap existing key material as a private key.
    pub fn from_material(material: KeyMaterial) -> Self {
        Self(material)
    }

    /// Get the underlying key material.
    pub fn material(&self) -> &KeyMaterial {
        &self.0
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        self.0.as_bytes()
    }

    /// Derive the matching public key by scalar base multiplication.
    ///
    /// Pure and deterministic: the same private key always yields the same
    /// public key.
    pub fn public_key(&self) -> PublicKey {
        let secret = self.to_static_secret();
        PublicKey::from_bytes(X25519PublicKey::from(&secret).to_bytes())
    }

    pub(crate) fn to_static_secret(&self) -> StaticSecret {
        StaticSecret::from(*self.0.as_bytes())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

/// X25519 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(KeyMaterial);

impl PublicKey {
    /// Create a public key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(KeyMaterial::from_bytes(bytes))
    }

    /// Wrap existing key material as a public key.
    pub fn from_material(material: KeyMaterial) -> Self {
        Self(material)
    }

    /// Get the underlying key material.
    pub fn material(&self) -> &KeyMaterial {
        &self.0
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        self.0.as_bytes()
    }

    pub(crate) fn to_x25519(&self) -> X25519PublicKey {
        X25519PublicKey::from(*self.0.as_bytes())
    }
}

/// Lowercase hex of the key bytes.
impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.as_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

/// An X25519 key pair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the operating system's CSPRNG.
    ///
    /// # Errors
    /// - Returns an entropy error if the randomness source is unavailable
    pub fn generate() -> Result<Self> {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a fresh key pair from the given randomness source.
    ///
    /// The 32 random bytes are clamped per Curve25519 conventions before use.
    ///
    /// # Errors
    /// - Returns an entropy error if `rng` fails to produce bytes
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut scalar = [0u8; KEY_LENGTH];
        if let Err(e) = rng.try_fill_bytes(&mut scalar) {
            scalar.zeroize();
            return Err(Error::Entropy(format!(
                "Failed to draw random key material: {}",
                e
            )));
        }
        clamp(&mut scalar);

        let private = PrivateKey::from_bytes(scalar);
        scalar.zeroize();
        Ok(Self::from_private(private))
    }

    /// Build a key pair around an existing private key.
    pub fn from_private(private: PrivateKey) -> Self {
        let public = private.public_key();
        Self { private, public }
    }

    /// Get the private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// Get the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Split the pair into its private and public halves.
    pub fn into_parts(self) -> (PrivateKey, PublicKey) {
        (self.private, self.public)
    }
}

/// Clamp a scalar per RFC 7748.
fn clamp(scalar: &mut [u8; KEY_LENGTH]) {
    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;
}
