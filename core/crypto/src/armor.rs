//! PEM armor for X25519 key files.
//!
//! Keys are written the way OpenSSL writes X25519 keys: the DER algorithm
//! identifier prefix followed by the 32 raw key bytes, base64-encoded
//! between `PUBLIC KEY` / `PRIVATE KEY` markers.
//!
//! Readers anchor on the tail: the key is the last 32 bytes of the decoded
//! payload, whatever prefix precedes it.
//!
//! # Security
//! Private keys are stored unencrypted.

use pem::{EncodeConfig, LineEnding, Pem};
use std::io::{Read, Write};
use tracing::debug;

use crate::keys::{KeyMaterial, PrivateKey, PublicKey, KEY_LENGTH};
use crypt4gh_common::{Error, Result};

/// PEM label of a public key block.
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// PEM label of a private key block.
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// SubjectPublicKeyInfo header for an X25519 public key (OID 1.3.101.110).
const PUBLIC_KEY_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x6e, 0x03, 0x21, 0x00,
];

/// PKCS#8 header for an X25519 private key (OID 1.3.101.110).
const PRIVATE_KEY_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x6e, 0x04, 0x22, 0x04, 0x20,
];

/// Which half of a key pair an armored block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Public,
    Private,
}

impl KeyKind {
    /// PEM label written for this kind.
    pub fn label(self) -> &'static str {
        match self {
            KeyKind::Public => PUBLIC_KEY_LABEL,
            KeyKind::Private => PRIVATE_KEY_LABEL,
        }
    }

    fn prefix(self) -> &'static [u8] {
        match self {
            KeyKind::Public => &PUBLIC_KEY_PREFIX,
            KeyKind::Private => &PRIVATE_KEY_PREFIX,
        }
    }

    /// Classify a PEM label; `X25519 PUBLIC KEY` counts as public.
    pub fn from_label(label: &str) -> Option<Self> {
        if label.starts_with("ENCRYPTED") {
            None
        } else if label.ends_with(PRIVATE_KEY_LABEL) {
            Some(KeyKind::Private)
        } else if label.ends_with(PUBLIC_KEY_LABEL) {
            Some(KeyKind::Public)
        } else {
            None
        }
    }
}

/// A decoded key block.
#[derive(Debug)]
pub struct ArmoredKey {
    label: String,
    material: KeyMaterial,
}

impl ArmoredKey {
    /// The block's PEM label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Kind implied by the label, if recognised.
    pub fn kind(&self) -> Option<KeyKind> {
        KeyKind::from_label(&self.label)
    }

    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    pub fn into_material(self) -> KeyMaterial {
        self.material
    }

    fn expect_kind(self, expected: KeyKind) -> Result<KeyMaterial> {
        if self.kind() != Some(expected) {
            return Err(Error::format(format!(
                "Expected a {} block, found '{}'",
                expected.label(),
                self.label
            )));
        }
        Ok(self.into_material())
    }
}

/// Encode key material as a PEM block.
pub fn encode_key(material: &KeyMaterial, kind: KeyKind) -> String {
    let prefix = kind.prefix();
    let mut payload = Vec::with_capacity(prefix.len() + KEY_LENGTH);
    payload.extend_from_slice(prefix);
    payload.extend_from_slice(material.as_bytes());

    let block = Pem::new(kind.label(), payload);
    pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Write key material as a PEM block.
///
/// # Errors
/// - Returns an I/O error if writing fails
pub fn write_key<W: Write>(writer: &mut W, material: &KeyMaterial, kind: KeyKind) -> Result<()> {
    let encoded = encode_key(material, kind);
    writer.write_all(encoded.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Decode a PEM block and take the last 32 bytes of its payload.
///
/// # Errors
/// - Returns a format error if the input is empty or not a PEM block
/// - Returns a format error if the payload is shorter than 32 bytes
pub fn decode_key(input: &[u8]) -> Result<ArmoredKey> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::format("Key input is empty"));
    }

    let block = pem::parse(input)
        .map_err(|e| Error::format(format!("Failed to decode key envelope: {}", e)))?;

    let contents = block.contents();
    if contents.len() < KEY_LENGTH {
        return Err(Error::format(format!(
            "Key payload too short: expected at least {} bytes, got {}",
            KEY_LENGTH,
            contents.len()
        )));
    }

    let material = KeyMaterial::from_slice(&contents[contents.len() - KEY_LENGTH..])?;
    debug!(
        label = block.tag(),
        prefix_len = contents.len() - KEY_LENGTH,
        "Decoded key block"
    );

    Ok(ArmoredKey {
        label: block.tag().to_string(),
        material,
    })
}

/// Read one PEM block from `reader`.
///
/// # Errors
/// - Returns an I/O error if reading fails
/// - See [`decode_key`]
pub fn read_armored<R: Read>(reader: &mut R) -> Result<ArmoredKey> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    decode_key(&input)
}

/// Read a public key block.
///
/// # Errors
/// - See [`read_armored`]
/// - Returns a format error if the block is not labelled as a public key
pub fn read_public_key<R: Read>(reader: &mut R) -> Result<PublicKey> {
    let material = read_armored(reader)?.expect_kind(KeyKind::Public)?;
    Ok(PublicKey::from_material(material))
}

/// Read a private key block.
///
/// # Errors
/// - See [`read_armored`]
/// - Returns a format error if the block is not labelled as an unencrypted private key
pub fn read_private_key<R: Read>(reader: &mut R) -> Result<PrivateKey> {
    let material = read_armored(reader)?.expect_kind(KeyKind::Private)?;
    Ok(PrivateKey::from_material(material))
}
