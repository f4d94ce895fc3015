//! # Matchbook
//!
//! An in-memory limit order book and matching engine core for algorithmic
//! trading toolkits. The engine accepts incoming orders, matches them
//! against resting liquidity under strict price-time priority, and emits a
//! stream of market events (opens, fills, trades, changes, cancels)
//! through a synchronous callback.
//!
//! ## Key Features
//!
//! - **Price-time priority matching**: best price first, and within a
//!   price level, earliest arrival first.
//!
//! - **Atomic multi-level crossing**: a single submission may sweep
//!   several price levels; the whole execution is staged through a
//!   transactional collector and either commits as one batch of events or
//!   reverts without a trace.
//!
//! - **Exchange-API order flags**: FILL_OR_KILL, ALL_OR_NONE and
//!   IMMEDIATE_OR_CANCEL semantics for both takers and resting makers.
//!
//! - **Stop orders**: contingent orders armed at a price level whose
//!   targets are submitted automatically once the level is crossed.
//!
//! - **Market events**: every committed mutation is observable through a
//!   single event stream, suitable for driving strategy code, market-data
//!   fan-out or a UI.
//!
//! ## Design
//!
//! The engine is a deliberately single-threaded, synchronous state machine
//! over one instrument. There are no suspension points and no internal
//! I/O; every operation runs to completion before the caller regains
//! control. Orders are shared `Rc<RefCell<_>>` handles, co-owned by the
//! caller and the book, so fills are observable on the caller's own
//! handle the moment a submission returns.
//!
//! ## Example
//!
//! ```
//! use matchbook::{Instrument, Order, OrderBook, Side};
//!
//! let mut book = OrderBook::new(Instrument::equity("ACME"));
//! book.set_callback(|event| println!("{event}"));
//!
//! let maker = Order::limit("a", Side::Sell, 100.0, 10.0, Instrument::equity("ACME")).into_ref();
//! let taker = Order::limit("b", Side::Buy, 100.0, 10.0, Instrument::equity("ACME")).into_ref();
//! book.add(&maker).unwrap();
//! book.add(&taker).unwrap();
//! assert!(book.is_empty());
//! ```
//!
//! ## Status
//!
//! The matching core is feature-complete; surrounding toolkit layers
//! (accounting, routing, persistence) live outside this crate.

mod events;
mod orderbook;
mod types;
mod utils;

pub use events::{Event, EventHandler, Trade};
pub use orderbook::{
    Collector, LevelSnapshot, OrderBook, OrderBookError, OrderBookSnapshot, PriceLevel,
};
pub use types::{
    Exchange, Instrument, InstrumentType, Order, OrderFlag, OrderId, OrderRef, OrderType, Price,
    PriceKey, Side, Volume,
};
pub use utils::current_time_millis;
