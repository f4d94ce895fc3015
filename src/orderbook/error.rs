//! Order book error types

use crate::types::{OrderId, Price};
use std::fmt;

/// Errors surfaced by book operations
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBookError {
    /// The order is not resting where its price says it should be
    NotFound {
        /// Id of the order that was looked up
        order_id: OrderId,
        /// Price level the lookup was routed to
        price: Price,
    },

    /// An order was observed with `filled` above `volume`. The book's
    /// invariants no longer hold; the operation is aborted without
    /// attempting recovery.
    Corrupt {
        /// Id of the offending order
        order_id: OrderId,
        /// Observed filled volume
        filled: f64,
        /// Total volume
        volume: f64,
    },

    /// Malformed order, rejected before any state mutation
    InvalidArgument {
        /// Description of the problem
        message: String,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::NotFound { order_id, price } => {
                write!(f, "Order {} not found at price level {}", order_id, price)
            }
            OrderBookError::Corrupt {
                order_id,
                filled,
                volume,
            } => {
                write!(
                    f,
                    "Order book is corrupt: order {} has filled {} above volume {}",
                    order_id, filled, volume
                )
            }
            OrderBookError::InvalidArgument { message } => {
                write!(f, "Invalid order: {}", message)
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
