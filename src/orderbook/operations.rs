//! Convenience constructors for submitting common order shapes.

use super::book::OrderBook;
use super::error::OrderBookError;
use crate::types::{Order, OrderFlag, OrderId, OrderRef, Price, Side, Volume};
use tracing::trace;

impl OrderBook {
    /// Build and submit a plain limit order, returning its handle.
    pub fn limit_order(
        &mut self,
        id: impl Into<OrderId>,
        side: Side,
        price: Price,
        volume: Volume,
    ) -> Result<OrderRef, OrderBookError> {
        self.limit_order_with_flag(id, side, price, volume, OrderFlag::None)
    }

    /// Build and submit a limit order carrying `flag`.
    pub fn limit_order_with_flag(
        &mut self,
        id: impl Into<OrderId>,
        side: Side,
        price: Price,
        volume: Volume,
        flag: OrderFlag,
    ) -> Result<OrderRef, OrderBookError> {
        let order = Order::limit(id, side, price, volume, self.instrument().clone())
            .with_flag(flag)
            .with_exchange(self.exchange().clone())
            .into_ref();
        trace!(
            "Order book {}: submitting limit {}",
            self.instrument(),
            order.borrow()
        );
        self.add(&order)?;
        Ok(order)
    }

    /// Build and submit a market order, returning its handle.
    pub fn market_order(
        &mut self,
        id: impl Into<OrderId>,
        side: Side,
        volume: Volume,
    ) -> Result<OrderRef, OrderBookError> {
        let order = Order::market(id, side, volume, self.instrument().clone())
            .with_exchange(self.exchange().clone())
            .into_ref();
        trace!(
            "Order book {}: submitting market {}",
            self.instrument(),
            order.borrow()
        );
        self.add(&order)?;
        Ok(order)
    }

    /// Build and submit a stop order triggering at `price`, returning its
    /// handle. `target` is submitted when the stop fires.
    pub fn stop_order(
        &mut self,
        id: impl Into<OrderId>,
        side: Side,
        price: Price,
        target: OrderRef,
    ) -> Result<OrderRef, OrderBookError> {
        let order = Order::stop(id, side, price, target, self.instrument().clone())
            .with_exchange(self.exchange().clone())
            .into_ref();
        trace!(
            "Order book {}: submitting stop {}",
            self.instrument(),
            order.borrow()
        );
        self.add(&order)?;
        Ok(order)
    }
}
