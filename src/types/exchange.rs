//! Exchange tag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque venue tag attached to a book and its orders.
///
/// The well-known null exchange (an empty name) marks orders and books that
/// are not routed anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exchange {
    pub name: String,
}

impl Exchange {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The null exchange sentinel.
    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "NullExchange")
        } else {
            write!(f, "{}", self.name)
        }
    }
}
