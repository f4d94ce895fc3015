//! A single price level: the FIFO queue of resting orders at one price.
//!
//! The level also executes crosses for the opposing side, staging every
//! pop and fill so the collector can revert the whole transaction if the
//! book decides the execution must not stand.

use super::collector::Collector;
use super::error::OrderBookError;
use crate::types::{OrderFlag, OrderRef, OrderType, Price, Volume};
use ordered_float::OrderedFloat;
use std::collections::VecDeque;

/// FIFO queue of resting orders at one price, plus the stop orders armed
/// at this price.
pub struct PriceLevel {
    /// Identity key within its side
    price: Price,

    /// Resting non-stop orders in price-time priority
    orders: VecDeque<OrderRef>,

    /// Orders popped during an in-progress cross, for revert
    orders_staged: VecDeque<OrderRef>,

    /// Fill delta applied to each staged order, parallel to `orders_staged`
    orders_filled_staged: VecDeque<Volume>,

    /// Stop targets to submit when this level is crossed
    stop_orders: Vec<OrderRef>,

    /// Stop targets drained by the in-progress cross, for revert
    stop_orders_staged: Vec<OrderRef>,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            orders_staged: VecDeque::new(),
            orders_filled_staged: VecDeque::new(),
            stop_orders: Vec::new(),
            stop_orders_staged: Vec::new(),
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Sum of remaining volume across resting orders.
    pub fn volume(&self) -> Volume {
        self.orders
            .iter()
            .map(|o| {
                let o = o.borrow();
                o.volume - o.filled
            })
            .sum()
    }

    /// Number of resting orders. Stop orders do not count.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of stop orders armed at this level.
    pub fn stop_count(&self) -> usize {
        self.stop_orders.len()
    }

    /// A level with neither resting orders nor armed stops has no reason
    /// to stay in the book.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.stop_orders.is_empty()
    }

    /// Resting orders in queue order.
    pub fn orders(&self) -> impl Iterator<Item = &OrderRef> {
        self.orders.iter()
    }

    /// Queue `order` at this level.
    ///
    /// Stop orders arm their target here instead of resting in the FIFO;
    /// a target already armed is not queued twice. Resubmitting an id that
    /// is already resting emits a change rather than a second open, and a
    /// finished order is not queued at all.
    pub fn add(&mut self, order: &OrderRef, collector: &mut Collector) {
        let order_type = order.borrow().order_type;
        if order_type == OrderType::Stop {
            let target = match order.borrow().stop_target.clone() {
                Some(target) => target,
                None => return,
            };
            let target_id = target.borrow().id.clone();
            if self
                .stop_orders
                .iter()
                .any(|s| s.borrow().id == target_id)
            {
                return;
            }
            self.stop_orders.push(target);
            return;
        }

        let (id, filled, volume) = {
            let o = order.borrow();
            (o.id.clone(), o.filled, o.volume)
        };
        if self.orders.iter().any(|o| o.borrow().id == id) {
            collector.push_change(order, None);
        } else if filled < volume {
            self.orders.push_back(order.clone());
            collector.push_open(order);
        }
    }

    /// Look up a resting order by id. Misses when the price does not
    /// match this level.
    pub fn find(&self, order: &OrderRef) -> Option<OrderRef> {
        let (id, price) = {
            let o = order.borrow();
            (o.id.clone(), o.price)
        };
        if price != self.price {
            return None;
        }
        self.orders.iter().find(|o| o.borrow().id == id).cloned()
    }

    /// Apply `order`'s volume to the resting order with the same id and
    /// emit a change. Only the volume may be modified, and never below
    /// what is already filled.
    pub fn modify(
        &mut self,
        order: &OrderRef,
        collector: &mut Collector,
    ) -> Result<(), OrderBookError> {
        let (id, price, new_volume) = {
            let o = order.borrow();
            (o.id.clone(), o.price, o.volume)
        };
        let resting = self.find(order).ok_or(OrderBookError::NotFound {
            order_id: id,
            price,
        })?;
        let filled = resting.borrow().filled;
        if new_volume <= filled {
            return Err(OrderBookError::InvalidArgument {
                message: format!(
                    "new volume {} does not exceed filled volume {}",
                    new_volume, filled
                ),
            });
        }
        resting.borrow_mut().volume = new_volume;
        collector.push_change(&resting, None);
        Ok(())
    }

    /// Remove the resting order with `order`'s id and emit a cancel.
    pub fn remove(
        &mut self,
        order: &OrderRef,
        collector: &mut Collector,
    ) -> Result<OrderRef, OrderBookError> {
        let (id, price) = {
            let o = order.borrow();
            (o.id.clone(), o.price)
        };
        if price != self.price {
            return Err(OrderBookError::NotFound {
                order_id: id,
                price,
            });
        }
        let position = self.orders.iter().position(|o| o.borrow().id == id);
        match position.and_then(|p| self.orders.remove(p)) {
            Some(removed) => {
                collector.push_cancel(&removed);
                Ok(removed)
            }
            None => Err(OrderBookError::NotFound {
                order_id: id,
                price,
            }),
        }
    }

    /// Match `taker` against the resting queue at this level.
    ///
    /// Returns `Some(taker)` when the level was fully consumed and the
    /// taker still has volume, signalling the book to advance to the next
    /// level; `None` when the taker terminated here. Every pop and fill is
    /// staged for revert, and any armed stops are drained into
    /// `secondaries` for submission after commit.
    pub fn cross(
        &mut self,
        taker: &OrderRef,
        collector: &mut Collector,
        secondaries: &mut Vec<OrderRef>,
    ) -> Result<Option<OrderRef>, OrderBookError> {
        if taker.borrow().order_type == OrderType::Stop {
            // contingent order: arm it here, nothing executes
            self.add(taker, collector);
            return Ok(None);
        }

        let (taker_id, taker_flag, taker_filled, taker_volume) = {
            let t = taker.borrow();
            (t.id.clone(), t.flag, t.filled, t.volume)
        };

        if taker_filled == taker_volume {
            self.drain_stop_orders(collector, secondaries);
            return Ok(None);
        }
        if taker_filled > taker_volume {
            return Err(OrderBookError::Corrupt {
                order_id: taker_id,
                filled: taker_filled,
                volume: taker_volume,
            });
        }

        collector.touch(OrderedFloat(self.price));

        loop {
            let to_fill = {
                let t = taker.borrow();
                t.volume - t.filled
            };
            if to_fill <= 0.0 {
                break;
            }
            let maker = match self.orders.pop_front() {
                Some(maker) => maker,
                None => break,
            };
            self.orders_staged.push_back(maker.clone());

            let (maker_remaining, maker_flag) = {
                let m = maker.borrow();
                (m.volume - m.filled, m.flag)
            };

            if maker_remaining > to_fill {
                if matches!(maker_flag, OrderFlag::FillOrKill | OrderFlag::AllOrNone) {
                    // the maker may not be partially consumed; kill it and
                    // keep crossing
                    collector.push_cancel(&maker);
                    self.orders_filled_staged.push_back(0.0);
                    continue;
                }
                maker.borrow_mut().filled += to_fill;
                self.orders_filled_staged.push_back(to_fill);
                {
                    let mut t = taker.borrow_mut();
                    t.filled = t.volume;
                }
                collector.push_fill(taker, None);
                collector.push_change(&maker, Some(to_fill));
                if maker_flag == OrderFlag::ImmediateOrCancel {
                    // an IOC maker may not rest with a remainder
                    collector.push_cancel(&maker);
                } else {
                    self.orders.push_front(maker);
                }
            } else if maker_remaining < to_fill {
                taker.borrow_mut().filled += maker_remaining;
                if taker_flag == OrderFlag::AllOrNone {
                    // the taker cannot be filled whole at this level; put
                    // the maker back untouched and let the book revert the
                    // partial
                    self.orders.push_front(maker);
                    self.orders_filled_staged.push_back(0.0);
                    self.drain_stop_orders(collector, secondaries);
                    return Ok(None);
                }
                {
                    let mut m = maker.borrow_mut();
                    m.filled = m.volume;
                }
                self.orders_filled_staged.push_back(maker_remaining);
                collector.push_change(taker, None);
                collector.push_fill(&maker, Some(maker_remaining));
            } else {
                // both fill exactly
                {
                    let mut m = maker.borrow_mut();
                    m.filled = m.volume;
                }
                {
                    let mut t = taker.borrow_mut();
                    t.filled = t.volume;
                }
                self.orders_filled_staged.push_back(to_fill);
                collector.push_fill(taker, None);
                collector.push_fill(&maker, Some(to_fill));
            }
        }

        let (taker_filled, taker_volume) = {
            let t = taker.borrow();
            (t.filled, t.volume)
        };
        if taker_filled == taker_volume {
            collector.push_trade(taker, taker_filled);
            self.drain_stop_orders(collector, secondaries);
            return Ok(None);
        }
        if taker_filled > taker_volume {
            return Err(OrderBookError::Corrupt {
                order_id: taker_id,
                filled: taker_filled,
                volume: taker_volume,
            });
        }

        // queue exhausted with taker volume left: this level is cleared
        self.drain_stop_orders(collector, secondaries);
        Ok(Some(taker.clone()))
    }

    /// Undo the staged effects of an in-progress cross: reverse each fill
    /// delta and restore popped orders to the front in their original
    /// order. Makers that were requeued during the cross are only
    /// un-filled, not duplicated.
    pub fn revert(&mut self) {
        while let Some(order) = self.orders_staged.pop_back() {
            let delta = self.orders_filled_staged.pop_back().unwrap_or(0.0);
            if delta != 0.0 {
                order.borrow_mut().filled -= delta;
            }
            let id = order.borrow().id.clone();
            if !self.orders.iter().any(|o| o.borrow().id == id) {
                self.orders.push_front(order);
            }
        }
        if !self.stop_orders_staged.is_empty() {
            let mut restored = std::mem::take(&mut self.stop_orders_staged);
            restored.append(&mut self.stop_orders);
            self.stop_orders = restored;
        }
    }

    /// Accept the staged state: the transaction committed, so the staged
    /// buffers are no longer needed.
    pub fn commit(&mut self) {
        self.orders_staged.clear();
        self.orders_filled_staged.clear();
        self.stop_orders_staged.clear();
    }

    /// Move armed stops into `secondaries` for submission after commit,
    /// staging them so a revert can re-arm the level.
    fn drain_stop_orders(&mut self, collector: &mut Collector, secondaries: &mut Vec<OrderRef>) {
        if self.stop_orders.is_empty() {
            return;
        }
        collector.touch(OrderedFloat(self.price));
        for stop in self.stop_orders.drain(..) {
            secondaries.push(stop.clone());
            self.stop_orders_staged.push(stop);
        }
    }
}
