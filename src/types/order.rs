//! Order record and its enumerations.

use super::{Price, Volume};
use crate::types::{Exchange, Instrument};
use crate::utils::current_time_millis;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Side of the book an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Kind of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Stop => write!(f, "STOP"),
        }
    }
}

/// Execution flag, as exposed by common exchange APIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderFlag {
    #[default]
    None,
    FillOrKill,
    AllOrNone,
    ImmediateOrCancel,
}

impl fmt::Display for OrderFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderFlag::None => write!(f, "NONE"),
            OrderFlag::FillOrKill => write!(f, "FILL_OR_KILL"),
            OrderFlag::AllOrNone => write!(f, "ALL_OR_NONE"),
            OrderFlag::ImmediateOrCancel => write!(f, "IMMEDIATE_OR_CANCEL"),
        }
    }
}

/// Caller-supplied, stable, opaque order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        OrderId(s.to_string())
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        OrderId(s)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to an order.
///
/// Orders are co-owned by the caller, the price level FIFO they rest in,
/// and the staging buffers of an in-progress cross; the engine is
/// single-threaded, so `Rc<RefCell<_>>` is the whole story.
pub type OrderRef = Rc<RefCell<Order>>;

/// An order. Identity (`id`) is immutable once submitted; `filled` and
/// `timestamp` are maintained by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub flag: OrderFlag,
    pub price: Price,
    pub volume: Volume,
    pub filled: Volume,
    pub timestamp: u64,
    /// For `Stop` orders only: the order submitted when the stop triggers.
    pub stop_target: Option<OrderRef>,
    pub instrument: Instrument,
    pub exchange: Exchange,
}

impl Order {
    /// A limit order resting at `price`.
    pub fn limit(
        id: impl Into<OrderId>,
        side: Side,
        price: Price,
        volume: Volume,
        instrument: Instrument,
    ) -> Self {
        Self {
            id: id.into(),
            side,
            order_type: OrderType::Limit,
            flag: OrderFlag::None,
            price,
            volume,
            filled: 0.0,
            timestamp: current_time_millis(),
            stop_target: None,
            instrument,
            exchange: Exchange::null(),
        }
    }

    /// A market order. `price` is ignored for the default flag; with a
    /// flag it bounds how deep the order may sweep.
    pub fn market(
        id: impl Into<OrderId>,
        side: Side,
        volume: Volume,
        instrument: Instrument,
    ) -> Self {
        Self {
            id: id.into(),
            side,
            order_type: OrderType::Market,
            flag: OrderFlag::None,
            price: 0.0,
            volume,
            filled: 0.0,
            timestamp: current_time_millis(),
            stop_target: None,
            instrument,
            exchange: Exchange::null(),
        }
    }

    /// A stop order triggering at `price`, submitting `target` when its
    /// host level is crossed.
    pub fn stop(
        id: impl Into<OrderId>,
        side: Side,
        price: Price,
        target: OrderRef,
        instrument: Instrument,
    ) -> Self {
        let volume = target.borrow().volume;
        Self {
            id: id.into(),
            side,
            order_type: OrderType::Stop,
            flag: OrderFlag::None,
            price,
            volume,
            filled: 0.0,
            timestamp: current_time_millis(),
            stop_target: Some(target),
            instrument,
            exchange: Exchange::null(),
        }
    }

    pub fn with_flag(mut self, flag: OrderFlag) -> Self {
        self.flag = flag;
        self
    }

    pub fn with_exchange(mut self, exchange: Exchange) -> Self {
        self.exchange = exchange;
        self
    }

    /// Wrap into the shared handle the book operates on.
    pub fn into_ref(self) -> OrderRef {
        Rc::new(RefCell::new(self))
    }

    /// Volume still open.
    pub fn remaining(&self) -> Volume {
        self.volume - self.filled
    }

    /// An order is finished once its whole volume is filled.
    pub fn is_finished(&self) -> bool {
        self.filled >= self.volume
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}@{} filled={} [{}]",
            self.id, self.side, self.order_type, self.volume, self.price, self.filled, self.flag
        )
    }
}
