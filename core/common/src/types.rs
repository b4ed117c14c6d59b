//! Common types used throughout crypt4gh.

use std::fmt;

/// File name suffix of a public key file.
pub const PUBLIC_KEY_SUFFIX: &str = ".pub.pem";

/// File name suffix of a private (secret) key file.
pub const PRIVATE_KEY_SUFFIX: &str = ".sec.pem";

/// Name of a key pair, as supplied by the user.
///
/// The key files of a pair are named `<name>.pub.pem` and `<name>.sec.pem`,
/// so a name is a single file name stem and never a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyName(String);

impl KeyName {
    /// Create a new KeyName from a string.
    ///
    /// # Errors
    /// - Returns a validation error if the name is empty, `.` or `..`
    /// - Returns a validation error if the name contains a path separator or NUL
    pub fn new(name: impl Into<String>) -> crate::Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(crate::Error::validation("Key name cannot be empty"));
        }
        if name == "." || name == ".." {
            return Err(crate::Error::validation(format!(
                "Key name cannot be '{}'",
                name
            )));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(crate::Error::validation(
                "Key name cannot contain path separators",
            ));
        }
        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the public key, e.g. `alice.pub.pem`.
    pub fn public_file_name(&self) -> String {
        format!("{}{}", self.0, PUBLIC_KEY_SUFFIX)
    }

    /// File name of the private key, e.g. `alice.sec.pem`.
    pub fn private_file_name(&self) -> String {
        format!("{}{}", self.0, PRIVATE_KEY_SUFFIX)
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
