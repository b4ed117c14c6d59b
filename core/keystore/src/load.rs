//! Loading key files from disk.

use std::fs::File;
use std::path::Path;
use tracing::debug;

use crypt4gh_common::Result;
use crypt4gh_crypto::{armor, PrivateKey, PublicKey};

/// Load a private key from an armored key file.
///
/// # Errors
/// - Returns an I/O error if the file cannot be opened or read
/// - Returns a format error if the file is not a private key block
pub fn load_private_key(path: impl AsRef<Path>) -> Result<PrivateKey> {
    let path = path.as_ref();
    debug!("Loading private key from {}", path.display());

    let mut file = File::open(path)?;
    armor::read_private_key(&mut file)
}

/// Load a public key from an armored key file.
///
/// # Errors
/// - Returns an I/O error if the file cannot be opened or read
/// - Returns a format error if the file is not a public key block
pub fn load_public_key(path: impl AsRef<Path>) -> Result<PublicKey> {
    let path = path.as_ref();
    debug!("Loading public key from {}", path.display());

    let mut file = File::open(path)?;
    armor::read_public_key(&mut file)
}
