//! Core OrderBook state: price levels for both sides and the shared
//! event collector.

use super::collector::Collector;
use super::level::PriceLevel;
use crate::events::Event;
use crate::types::{Exchange, Instrument, OrderRef, Price, PriceKey, Side, Volume};
use std::collections::BTreeMap;
use tracing::trace;

/// In-memory limit order book for a single instrument.
///
/// The book is a single-threaded state machine: orders flow through
/// [`add`](OrderBook::add), may later be referenced by
/// [`cancel`](OrderBook::cancel) or [`change`](OrderBook::change), and
/// every committed mutation is reported through the event callback.
pub struct OrderBook {
    /// Instrument this book trades
    instrument: Instrument,

    /// Venue tag, the null exchange by default
    exchange: Exchange,

    /// Bid side levels, keyed by price ascending; best bid is the last key
    pub(super) buys: BTreeMap<PriceKey, PriceLevel>,

    /// Ask side levels, keyed by price ascending; best ask is the first key
    pub(super) sells: BTreeMap<PriceKey, PriceLevel>,

    /// Transactional event buffer shared by all book operations
    pub(super) collector: Collector,
}

impl OrderBook {
    /// Create a book for `instrument` on the null exchange, with no
    /// callback.
    pub fn new(instrument: Instrument) -> Self {
        Self::with_exchange(instrument, Exchange::null())
    }

    /// Create a book for `instrument` tagged with `exchange`.
    pub fn with_exchange(instrument: Instrument, exchange: Exchange) -> Self {
        Self {
            instrument,
            exchange,
            buys: BTreeMap::new(),
            sells: BTreeMap::new(),
            collector: Collector::new(None),
        }
    }

    /// Create a book that delivers committed events to `callback`.
    pub fn with_callback<F>(instrument: Instrument, exchange: Exchange, callback: F) -> Self
    where
        F: FnMut(&Event) + 'static,
    {
        let mut book = Self::with_exchange(instrument, exchange);
        book.collector.set_handler(Box::new(callback));
        book
    }

    /// Replace the event callback.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Event) + 'static,
    {
        self.collector.set_handler(Box::new(callback));
    }

    /// Discard all resting state. Instrument, exchange and callback are
    /// kept.
    pub fn reset(&mut self) {
        trace!("Order book {}: reset", self.instrument);
        self.buys.clear();
        self.sells.clear();
        self.collector.clear();
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    /// Best (highest) bid price, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.buys.keys().next_back().map(|k| k.into_inner())
    }

    /// Best (lowest) ask price, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.sells.keys().next().map(|k| k.into_inner())
    }

    /// Midpoint of best bid and best ask.
    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }

    /// Best ask minus best bid.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Remaining volume resting at `price` on `side`.
    pub fn volume_at(&self, side: Side, price: Price) -> Volume {
        let levels = match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
        };
        levels
            .get(&PriceKey::from(price))
            .map(|level| level.volume())
            .unwrap_or(0.0)
    }

    /// Number of populated bid levels.
    pub fn bid_levels(&self) -> usize {
        self.buys.len()
    }

    /// Number of populated ask levels.
    pub fn ask_levels(&self) -> usize {
        self.sells.len()
    }

    /// True when neither side holds any level.
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Resting orders in price-then-time order: asks ascending from the
    /// best, then bids descending from the best.
    pub fn iter(&self) -> impl Iterator<Item = OrderRef> + '_ {
        self.sells
            .values()
            .flat_map(|level| level.orders())
            .chain(self.buys.values().rev().flat_map(|level| level.orders()))
            .cloned()
    }

    /// The `k`-th best opposing price for a taker on `taker_side`,
    /// skipping levels already consumed by the in-progress cross. `None`
    /// means no opposing liquidity remains.
    pub(super) fn top_price(&self, taker_side: Side, cleared: usize) -> Option<PriceKey> {
        match taker_side {
            Side::Buy => self.sells.keys().nth(cleared).copied(),
            Side::Sell => self.buys.keys().rev().nth(cleared).copied(),
        }
    }
}
