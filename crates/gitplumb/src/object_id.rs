//! Fixed-width git object identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{GitError, Result};

/// Length of an object id in bytes.
pub const ID_LEN: usize = 20;

/// Length of an object id in hex characters.
pub const HEX_LEN: usize = ID_LEN * 2;

/// A 20-byte (SHA-1) object identifier.
///
/// Only full 40-character hex strings parse; abbreviations and ref names
/// must be resolved first (see [`Repository::resolve`](crate::Repository::resolve)).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ID_LEN]);

impl ObjectId {
    /// Wrap raw id bytes.
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a full 40-character hex id. Upper- and lower-case digits are
    /// both accepted.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::InvalidObjectId`] if `s` is not exactly 40 hex
    /// characters.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != HEX_LEN {
            return Err(GitError::InvalidObjectId {
                input: s.to_string(),
                reason: format!("expected {HEX_LEN} hex characters, got {}", s.len()),
            });
        }
        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| GitError::InvalidObjectId {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }

    /// Whether `s` is a full hex id that [`ObjectId::from_hex`] would accept.
    pub fn is_full_hex(s: &str) -> bool {
        s.len() == HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// The raw id bytes.
    pub const fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Lower-case hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = GitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Parse the id printed by a plumbing command: the first 40 characters of
/// the trimmed, single-line stdout.
///
/// # Errors
///
/// Returns [`GitError::UnexpectedOutput`] if the output is shorter than an
/// id, or [`GitError::InvalidObjectId`] if those characters are not hex.
pub fn parse_object_id_output(command: &str, stdout: &str) -> Result<ObjectId> {
    let trimmed = stdout.trim();
    match trimmed.get(..HEX_LEN) {
        Some(head) => ObjectId::from_hex(head),
        None => Err(GitError::UnexpectedOutput {
            command: command.to_string(),
            output: stdout.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
