//! Order book snapshot for market data

use super::book::OrderBook;
use crate::types::{Price, Volume};
use crate::utils::current_time_millis;
use serde::{Deserialize, Serialize};

/// One price level, flattened for market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub price: Price,
    /// Remaining volume resting at the level
    pub volume: Volume,
    pub order_count: usize,
}

/// A snapshot of the order book state at a specific point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Name of the instrument this book trades
    pub instrument: String,

    /// Timestamp when the snapshot was created (milliseconds since epoch)
    pub timestamp: u64,

    /// Bid levels, best first
    pub bids: Vec<LevelSnapshot>,

    /// Ask levels, best first
    pub asks: Vec<LevelSnapshot>,
}

impl OrderBookSnapshot {
    /// Best bid price and volume.
    pub fn best_bid(&self) -> Option<(Price, Volume)> {
        self.bids.first().map(|level| (level.price, level.volume))
    }

    /// Best ask price and volume.
    pub fn best_ask(&self) -> Option<(Price, Volume)> {
        self.asks.first().map(|level| (level.price, level.volume))
    }

    /// Midpoint of best bid and best ask.
    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }

    /// Best ask minus best bid.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        }
    }

    /// Total volume across the captured bid levels.
    pub fn total_bid_volume(&self) -> Volume {
        self.bids.iter().map(|level| level.volume).sum()
    }

    /// Total volume across the captured ask levels.
    pub fn total_ask_volume(&self) -> Volume {
        self.asks.iter().map(|level| level.volume).sum()
    }
}

impl OrderBook {
    /// Capture the top `depth` levels of each side.
    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        let bids = self
            .buys
            .values()
            .rev()
            .take(depth)
            .map(|level| LevelSnapshot {
                price: level.price(),
                volume: level.volume(),
                order_count: level.order_count(),
            })
            .collect();
        let asks = self
            .sells
            .values()
            .take(depth)
            .map(|level| LevelSnapshot {
                price: level.price(),
                volume: level.volume(),
                order_count: level.order_count(),
            })
            .collect();

        OrderBookSnapshot {
            instrument: self.instrument().name.clone(),
            timestamp: current_time_millis(),
            bids,
            asks,
        }
    }
}
