//! Market events emitted by the matching engine.

use crate::types::{OrderRef, Price, Volume};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Aggregate describing an execution that consumed one or more makers.
///
/// `price` is the volume-weighted average across the consumed makers and
/// `volume` the total quantity exchanged in this submission.
#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub id: Uuid,
    pub taker: OrderRef,
    pub makers: Vec<OrderRef>,
    pub price: Price,
    pub volume: Volume,
}

/// A committed market event, delivered synchronously to the book's
/// callback in staging order.
#[derive(Debug, Clone, Serialize)]
pub enum Event {
    /// An order newly resting on the book.
    Open { order: OrderRef },
    /// A fill was applied to `order`; for makers, `volume` carries the
    /// incremental quantity filled in this transaction.
    Fill {
        order: OrderRef,
        volume: Option<Volume>,
    },
    /// A resting order's remaining volume changed.
    Change {
        order: OrderRef,
        volume: Option<Volume>,
    },
    /// An order was removed from the book.
    Cancel { order: OrderRef },
    /// A completed execution aggregate.
    Trade(Trade),
}

impl Event {
    /// The primary order this event refers to (the taker for trades).
    pub fn order(&self) -> &OrderRef {
        match self {
            Event::Open { order }
            | Event::Fill { order, .. }
            | Event::Change { order, .. }
            | Event::Cancel { order } => order,
            Event::Trade(trade) => &trade.taker,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Open { order } => write!(f, "OPEN {}", order.borrow()),
            Event::Fill { order, volume } => match volume {
                Some(v) => write!(f, "FILL {} ({})", order.borrow(), v),
                None => write!(f, "FILL {}", order.borrow()),
            },
            Event::Change { order, volume } => match volume {
                Some(v) => write!(f, "CHANGE {} ({})", order.borrow(), v),
                None => write!(f, "CHANGE {}", order.borrow()),
            },
            Event::Cancel { order } => write!(f, "CANCEL {}", order.borrow()),
            Event::Trade(trade) => write!(
                f,
                "TRADE {} {}@{} makers={}",
                trade.taker.borrow().id,
                trade.volume,
                trade.price,
                trade.makers.len()
            ),
        }
    }
}

/// Sink for committed events. Invoked synchronously during commit; the
/// handler must not call back into the book.
pub type EventHandler = Box<dyn FnMut(&Event)>;
