//! Core value types shared across the matching engine.

pub mod exchange;
pub mod instrument;
pub mod order;

pub use exchange::Exchange;
pub use instrument::{Instrument, InstrumentType};
pub use order::{Order, OrderFlag, OrderId, OrderRef, OrderType, Side};

use ordered_float::OrderedFloat;

/// Price of an order or a trade.
pub type Price = f64;

/// Volume of an order or a trade.
pub type Volume = f64;

/// Total-ordered price used to key the book's price-level maps.
pub type PriceKey = OrderedFloat<f64>;
