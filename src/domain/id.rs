//! Identifiers for tasks and storyline nodes
//!
//! Both are opaque strings supplied by the catalog. The only rules enforced
//! are that an ID is non-empty and carries no surrounding whitespace, since
//! IDs end up verbatim inside persistence keys.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("ID must not be empty")]
    Empty,

    #[error("ID must not have leading or trailing whitespace: '{0}'")]
    Untrimmed(String),
}

fn validate(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if s.trim() != s {
        return Err(IdError::Untrimmed(s.to_string()));
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an ID, panicking on invalid input. Intended for literals.
            pub fn new(id: impl Into<String>) -> Self {
                let id = id.into();
                match validate(&id) {
                    Ok(()) => Self(id),
                    Err(e) => panic!("invalid {}: {}", stringify!($name), e),
                }
            }

            /// Returns the ID as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                validate(&value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Identifier of a task in the catalog
    TaskId
}

string_id! {
    /// Identifier of a node in the storyline decision graph
    NodeId
}
