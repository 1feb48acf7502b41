use std::{fmt, str::FromStr};

use thiserror::Error;

/// Errors that can occur while parsing a printed identity back into a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// The token did not start with the expected prefix
    #[error("Identity `{token}` is missing the `{prefix}` prefix")]
    MissingPrefix { token: String, prefix: char },

    /// The token body was not a valid number in the expected radix
    #[error("Identity `{token}` is not a valid token")]
    InvalidDigits { token: String },
}

// EntityId

/// Opaque, process-unique identity of an [`Entity`](crate::Entity).
///
/// Identities compare by allocation order and print as a compact base-36
/// token such as `#1z4`. Collaborators should rely on nothing beyond
/// equality, ordering and the printed form.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct EntityId(u64);

impl EntityId {
    const PREFIX: char = '#';

    pub(crate) fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub(crate) fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, to_base36(self.0))
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let Some(body) = token.strip_prefix(Self::PREFIX) else {
            return Err(IdParseError::MissingPrefix {
                token: token.to_string(),
                prefix: Self::PREFIX,
            });
        };
        if body.is_empty() || body.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(IdParseError::InvalidDigits {
                token: token.to_string(),
            });
        }
        u64::from_str_radix(body, 36)
            .map(EntityId)
            .map_err(|_| IdParseError::InvalidDigits {
                token: token.to_string(),
            })
    }
}

// LockToken

/// Position of a [`Container`](crate::Container) in the global lock
/// acquisition order. Tokens are handed out once, ascending, and never reused.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct LockToken(u64);

impl LockToken {
    pub(crate) fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }
    let mut buffer = Vec::with_capacity(13);
    while value > 0 {
        buffer.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buffer.reverse();
    String::from_utf8(buffer).unwrap_or_default()
}
