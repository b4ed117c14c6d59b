//! Common utilities and types shared across crypt4gh crates.
//!
//! This module provides the error taxonomy used by every layer and the
//! key pair naming rules that decide where key files live.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{KeyName, PRIVATE_KEY_SUFFIX, PUBLIC_KEY_SUFFIX};
