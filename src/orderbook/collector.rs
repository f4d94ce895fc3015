//! Transactional event buffer backing a single `add` invocation.
//!
//! Matching a single incoming order may sweep several price levels before
//! the book can decide whether the execution stands. The collector stages
//! every event produced along the way; the book then either commits the
//! whole batch to the callback or reverts it, undoing each staged fill and
//! restoring the consumed queues.

use super::level::PriceLevel;
use crate::events::{Event, EventHandler, Trade};
use crate::types::{OrderRef, Price, PriceKey, Volume};
use std::collections::{BTreeMap, VecDeque};
use tracing::trace;
use uuid::Uuid;

/// Stages events and fill state for one in-flight book transaction.
pub struct Collector {
    /// Sink for committed events
    handler: Option<EventHandler>,

    /// Events staged in order, flushed on commit
    events: VecDeque<Event>,

    /// Running volume-weighted average price of the staged trade
    price: Price,

    /// Total volume accumulated into the staged trade
    volume: Volume,

    /// Maker orders consumed so far, in fill order
    makers: Vec<OrderRef>,

    /// Price levels fully consumed by the in-progress cross, in clearing
    /// order. Survives commit so the book can still remove them; dropped
    /// by `clear`.
    cleared: Vec<PriceKey>,

    /// Price levels that staged state this transaction, for revert
    touched: Vec<PriceKey>,

    /// The taker driving this transaction and its `filled` at the start
    taker: Option<(OrderRef, Volume)>,
}

impl Collector {
    pub fn new(handler: Option<EventHandler>) -> Self {
        Self {
            handler,
            events: VecDeque::new(),
            price: 0.0,
            volume: 0.0,
            makers: Vec::new(),
            cleared: Vec::new(),
            touched: Vec::new(),
            taker: None,
        }
    }

    pub fn set_handler(&mut self, handler: EventHandler) {
        self.handler = Some(handler);
    }

    /// Open a transaction for `taker`, snapshotting its fill state so a
    /// later revert can restore it.
    pub fn begin(&mut self, taker: &OrderRef) {
        let filled = taker.borrow().filled;
        self.taker = Some((taker.clone(), filled));
    }

    /// Record that a level staged state this transaction.
    pub fn touch(&mut self, price: PriceKey) {
        if !self.touched.contains(&price) {
            self.touched.push(price);
        }
    }

    pub fn touched(&self) -> &[PriceKey] {
        &self.touched
    }

    /// Record that a resting order was placed.
    pub fn push_open(&mut self, order: &OrderRef) {
        self.events.push_back(Event::Open {
            order: order.clone(),
        });
    }

    /// Record a fill on `order`. `volume` carries the incremental quantity
    /// for maker fills and folds it into the staged trade aggregate.
    pub fn push_fill(&mut self, order: &OrderRef, volume: Option<Volume>) {
        if let Some(v) = volume {
            self.accumulate(order, v);
        }
        self.events.push_back(Event::Fill {
            order: order.clone(),
            volume,
        });
    }

    /// Record that a resting order's remaining volume changed.
    pub fn push_change(&mut self, order: &OrderRef, volume: Option<Volume>) {
        if let Some(v) = volume {
            self.accumulate(order, v);
        }
        self.events.push_back(Event::Change {
            order: order.clone(),
            volume,
        });
    }

    /// Record that an order left the book.
    pub fn push_cancel(&mut self, order: &OrderRef) {
        self.events.push_back(Event::Cancel {
            order: order.clone(),
        });
    }

    /// Record the trade aggregate for a taker whose submission executed.
    /// Consumes the accumulated makers, price and volume.
    pub fn push_trade(&mut self, taker: &OrderRef, filled: Volume) {
        trace!(
            "Collector: staging trade for {} filled {}",
            taker.borrow().id,
            filled
        );
        let trade = Trade {
            id: Uuid::new_v4(),
            taker: taker.clone(),
            makers: std::mem::take(&mut self.makers),
            price: self.price,
            volume: self.volume,
        };
        self.price = 0.0;
        self.volume = 0.0;
        self.events.push_back(Event::Trade(trade));
    }

    /// Mark `price` as fully consumed by the in-progress cross; returns
    /// how many levels are cleared so far.
    pub fn clear_level(&mut self, price: PriceKey) -> usize {
        self.cleared.push(price);
        self.cleared.len()
    }

    /// Number of levels cleared in the current transaction.
    pub fn cleared_levels(&self) -> usize {
        self.cleared.len()
    }

    /// Number of events currently staged.
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Deliver all staged events to the callback in insertion order and
    /// empty the buffer. Cleared-level tombstones survive until `clear`.
    pub fn commit(&mut self) {
        trace!("Collector: committing {} events", self.events.len());
        while let Some(event) = self.events.pop_front() {
            if let Some(handler) = self.handler.as_mut() {
                handler(&event);
            }
        }
    }

    /// Discard all staged events and undo every staged mutation: the
    /// taker's fill is restored from the transaction snapshot, every
    /// touched level unwinds its staged pops and fills, and cleared-level
    /// tombstones are dropped.
    pub fn revert(&mut self, opposing: &mut BTreeMap<PriceKey, PriceLevel>) {
        trace!("Collector: reverting {} staged events", self.events.len());
        self.events.clear();
        if let Some((taker, filled)) = &self.taker {
            taker.borrow_mut().filled = *filled;
        }
        for price in &self.touched {
            if let Some(level) = opposing.get_mut(price) {
                level.revert();
            }
        }
        self.cleared.clear();
        self.makers.clear();
        self.price = 0.0;
        self.volume = 0.0;
    }

    /// Hard reset at the end of every transaction.
    pub fn clear(&mut self) {
        self.events.clear();
        self.price = 0.0;
        self.volume = 0.0;
        self.makers.clear();
        self.cleared.clear();
        self.touched.clear();
        self.taker = None;
    }

    /// True when nothing is staged and no tombstones are pending.
    pub fn is_clean(&self) -> bool {
        self.events.is_empty() && self.cleared.is_empty() && self.touched.is_empty()
    }

    /// Fold `volume` of `order` at its price into the running trade
    /// aggregate and remember the maker.
    fn accumulate(&mut self, order: &OrderRef, volume: Volume) {
        let order_price = order.borrow().price;
        let total = self.volume + volume;
        if total > 0.0 {
            self.price = (self.price * self.volume + order_price * volume) / total;
        }
        self.volume = total;
        self.makers.push(order.clone());
    }
}
