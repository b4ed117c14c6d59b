//! Key pair provisioning.
//!
//! ```text
//! Start -> CheckExisting -> [ConfirmOverwrite] -> Generate -> PersistPublic -> PersistPrivate -> Done
//!                                  |
//!                                  +-> Cancelled
//! ```
//!
//! Fresh key files are created exclusively, so a second process provisioning
//! the same name concurrently fails instead of interleaving writes. An
//! overwrite is only performed after the user confirmed it.
//!
//! A failure while persisting the private key leaves the already written
//! public key file in place.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crypt4gh_common::{KeyName, Result};
use crypt4gh_crypto::{armor, KeyKind, KeyMaterial, KeyPair};

/// Asks the user a yes/no question.
pub trait Confirm {
    /// Return `true` if the user agreed.
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> Result<bool>,
{
    fn confirm(&mut self, message: &str) -> Result<bool> {
        self(message)
    }
}

/// Locations of the two files of a key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPairPaths {
    pub public: PathBuf,
    pub private: PathBuf,
}

impl KeyPairPaths {
    /// Resolve the key files for `name` inside `dir`.
    pub fn new(dir: &Path, name: &KeyName) -> Self {
        Self {
            public: dir.join(name.public_file_name()),
            private: dir.join(name.private_file_name()),
        }
    }

    /// Check whether either key file already exists.
    pub fn any_exists(&self) -> bool {
        self.public.is_file() || self.private.is_file()
    }
}

/// Result of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Both key files were written.
    Created(KeyPairPaths),
    /// The user declined to overwrite existing files; nothing was touched.
    Cancelled,
}

/// Generates named key pairs into a directory.
#[derive(Debug, Clone)]
pub struct Provisioner {
    dir: PathBuf,
}

impl Provisioner {
    /// Create a provisioner writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the key files for `name`.
    pub fn paths(&self, name: &KeyName) -> KeyPairPaths {
        KeyPairPaths::new(&self.dir, name)
    }

    /// Generate a key pair and write it as `<name>.pub.pem` / `<name>.sec.pem`.
    ///
    /// # Postconditions
    /// - On `Created`, both files hold the two halves of one fresh key pair
    /// - On `Cancelled`, no file was created, truncated or written
    /// - `confirm` is consulted only if one of the files already exists
    ///
    /// # Errors
    /// - Entropy failure while generating the key pair
    /// - I/O failure while creating or writing either file; the public key
    ///   file is not removed if writing the private key fails
    /// - A key file appeared between the existence check and its creation
    pub fn provision<C: Confirm + ?Sized>(
        &self,
        name: &KeyName,
        confirm: &mut C,
    ) -> Result<Outcome> {
        let paths = self.paths(name);

        let overwrite = paths.any_exists();
        if overwrite {
            let message = format!(
                "Key pair with name '{}' seems to already exist. Please, confirm overwriting",
                name
            );
            if !confirm.confirm(&message)? {
                warn!("Overwrite of key pair '{}' declined", name);
                return Ok(Outcome::Cancelled);
            }
            debug!("Overwrite of key pair '{}' confirmed", name);
        }

        info!("Generating key pair '{}'", name);
        let pair = KeyPair::generate()?;

        persist(&paths.public, pair.public_key().material(), KeyKind::Public, overwrite)?;
        info!("Public key written to {}", paths.public.display());

        persist(&paths.private, pair.private_key().material(), KeyKind::Private, overwrite)?;
        info!("Private key written to {}", paths.private.display());

        Ok(Outcome::Created(paths))
    }
}

/// Write one armored key to `path`.
///
/// Without `overwrite` the file must not exist yet.
fn persist(path: &Path, material: &KeyMaterial, kind: KeyKind, overwrite: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if kind == KeyKind::Private {
            options.mode(0o600);
        }
    }

    let mut file = options.open(path)?;

    // The open mode only applies to newly created files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if kind == KeyKind::Private {
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
    }

    armor::write_key(&mut file, material, kind)?;
    file.sync_all()?;
    Ok(())
}
