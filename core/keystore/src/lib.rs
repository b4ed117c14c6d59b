//! Key file management for crypt4gh.
//!
//! This module provides:
//! - The key pair provisioning workflow (generate, confirm overwrite, persist)
//! - Loading of armored key files from disk
//!
//! All operations are synchronous and blocking.

pub mod load;
pub mod provision;

pub use load::{load_private_key, load_public_key};
pub use provision::{Confirm, KeyPairPaths, Outcome, Provisioner};
