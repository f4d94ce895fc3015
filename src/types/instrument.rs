//! Instrument identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset class of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    Currency,
    Pair,
    Equity,
    Bond,
    Commodity,
    Future,
    Option,
    Index,
    Other,
}

/// Opaque instrument identity: a name plus an asset class, compared by
/// equality. The engine never interprets either field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub instrument_type: InstrumentType,
}

impl Instrument {
    pub fn new(name: impl Into<String>, instrument_type: InstrumentType) -> Self {
        Self {
            name: name.into(),
            instrument_type,
        }
    }

    /// Shorthand for the most common case in tests and examples.
    pub fn equity(name: impl Into<String>) -> Self {
        Self::new(name, InstrumentType::Equity)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
