//! Cancelling and changing resting orders.

use super::book::OrderBook;
use super::error::OrderBookError;
use crate::types::{OrderRef, PriceKey, Side};
use tracing::trace;

impl OrderBook {
    /// Cancel a resting order.
    ///
    /// The order is located through its own price; a price that maps to no
    /// level, or a level that does not hold the id, is `NotFound` and
    /// leaves the book untouched. A cancel that empties its level removes
    /// the level.
    pub fn cancel(&mut self, order: &OrderRef) -> Result<(), OrderBookError> {
        let (id, price, side) = {
            let o = order.borrow();
            (o.id.clone(), o.price, o.side)
        };
        trace!(
            "Order book {}: cancelling order {} at {}",
            self.instrument(),
            id,
            price
        );

        let key = PriceKey::from(price);
        let levels = match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        };
        let level = levels.get_mut(&key).ok_or(OrderBookError::NotFound {
            order_id: id,
            price,
        })?;
        level.remove(order, &mut self.collector)?;
        if level.is_empty() {
            levels.remove(&key);
        }

        self.collector.commit();
        self.collector.clear();
        Ok(())
    }

    /// Change a resting order's volume.
    ///
    /// Routed like [`cancel`](OrderBook::cancel); only the volume is
    /// applied, and it must exceed what the resting order has already
    /// filled.
    pub fn change(&mut self, order: &OrderRef) -> Result<(), OrderBookError> {
        let (id, price, side) = {
            let o = order.borrow();
            (o.id.clone(), o.price, o.side)
        };
        trace!(
            "Order book {}: changing order {} at {}",
            self.instrument(),
            id,
            price
        );

        let key = PriceKey::from(price);
        let levels = match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        };
        let level = levels.get_mut(&key).ok_or(OrderBookError::NotFound {
            order_id: id,
            price,
        })?;
        level.modify(order, &mut self.collector)?;

        self.collector.commit();
        self.collector.clear();
        Ok(())
    }
}
