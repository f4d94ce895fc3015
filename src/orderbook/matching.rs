//! Order submission: the crossing loop, flag semantics and stop-order
//! triggering.

use super::book::OrderBook;
use super::error::OrderBookError;
use super::level::PriceLevel;
use crate::types::{OrderFlag, OrderRef, OrderType, PriceKey, Side};
use tracing::trace;

impl OrderBook {
    /// Submit an order.
    ///
    /// The order is matched against opposing liquidity while it crosses,
    /// walking levels from the top of the book. The whole submission is
    /// staged through the collector: depending on the order type and flag
    /// the book commits the execution (flushing events to the callback)
    /// or reverts it, leaving the book byte-equal to its prior state.
    /// Stop orders triggered by the cross are submitted afterwards, as
    /// their own transactions.
    pub fn add(&mut self, order: &OrderRef) -> Result<(), OrderBookError> {
        self.validate(order)?;

        let (side, order_type, flag, order_price, timestamp) = {
            let o = order.borrow();
            trace!("Order book {}: adding order {}", self.instrument(), o);
            (o.side, o.order_type, o.flag, o.price, o.timestamp)
        };

        // stop targets triggered while crossing, submitted after commit
        let mut secondaries: Vec<OrderRef> = Vec::new();

        self.collector.begin(order);

        // a flagless market order crosses whatever is on the other side
        let unconditional = order_type == OrderType::Market && flag == OrderFlag::None;

        // set when a stop taker was armed at a crossed opposing level
        let mut stop_armed = false;

        loop {
            let cleared = self.collector.cleared_levels();
            let top = match self.top_price(side, cleared) {
                Some(top) => top,
                None => break,
            };
            let crosses = unconditional
                || match side {
                    Side::Buy => order_price >= top.into_inner(),
                    Side::Sell => order_price <= top.into_inner(),
                };
            if !crosses {
                break;
            }

            let opposing = match side {
                Side::Buy => &mut self.sells,
                Side::Sell => &mut self.buys,
            };
            let residual = match opposing.get_mut(&top) {
                Some(level) => level.cross(order, &mut self.collector, &mut secondaries)?,
                None => break,
            };

            if order_type == OrderType::Stop {
                // the cross armed the stop at this level; nothing executed
                stop_armed = true;
                break;
            }

            if residual.is_some() {
                // level fully consumed with taker volume left: advance to
                // the next one
                self.collector.clear_level(top);
                continue;
            }

            // the taker terminated here; the level may still have been
            // consumed exactly
            let emptied = opposing
                .get(&top)
                .map(|level| level.order_count() == 0)
                .unwrap_or(false);
            if emptied {
                self.collector.clear_level(top);
            }
            break;
        }

        if order_type == OrderType::Stop {
            // contingent orders never execute or emit on submission: one
            // that crossed is armed at the opposing level, one that did
            // not rests at its own price
            if !stop_armed {
                self.rest(order, side);
            }
            self.collector.commit();
            self.finish(side);
            return Ok(());
        }

        let (filled, volume) = {
            let o = order.borrow();
            (o.filled, o.volume)
        };
        let mut submit_secondaries = true;

        if filled < volume {
            match order_type {
                OrderType::Market => {
                    if matches!(flag, OrderFlag::AllOrNone | OrderFlag::FillOrKill) {
                        // could not be filled whole: undo any partial
                        self.revert_cross(side);
                        self.collector.push_cancel(order);
                        self.collector.commit();
                        submit_secondaries = false;
                    } else {
                        // partial execution stands, remainder dies
                        if filled > 0.0 {
                            self.collector.push_trade(order, filled);
                        }
                        self.clear_crossed_levels(side);
                        self.collector.push_cancel(order);
                        self.collector.commit();
                    }
                }
                OrderType::Limit | OrderType::Stop => match flag {
                    OrderFlag::FillOrKill | OrderFlag::AllOrNone => {
                        if filled > 0.0 {
                            self.revert_cross(side);
                            self.collector.push_cancel(order);
                            self.collector.commit();
                            submit_secondaries = false;
                        } else {
                            self.rest(order, side);
                            self.collector.commit();
                        }
                    }
                    OrderFlag::ImmediateOrCancel => {
                        if filled > 0.0 {
                            self.clear_crossed_levels(side);
                            self.collector.push_cancel(order);
                            self.collector.commit();
                        } else {
                            self.rest(order, side);
                            self.collector.commit();
                        }
                    }
                    OrderFlag::None => {
                        self.clear_crossed_levels(side);
                        self.rest(order, side);
                        self.collector.commit();
                    }
                },
            }
        } else {
            // fully filled during the cross; the trade event was staged by
            // the level
            self.clear_crossed_levels(side);
            self.collector.commit();
        }

        self.finish(side);

        if submit_secondaries {
            for secondary in secondaries {
                secondary.borrow_mut().timestamp = timestamp;
                self.add(&secondary)?;
            }
        }

        Ok(())
    }

    /// Reject malformed orders before any state is touched.
    fn validate(&self, order: &OrderRef) -> Result<(), OrderBookError> {
        let o = order.borrow();
        if !o.volume.is_finite() || o.volume <= 0.0 {
            return Err(OrderBookError::InvalidArgument {
                message: format!("volume {} must be positive and finite", o.volume),
            });
        }
        if !o.filled.is_finite() || o.filled < 0.0 || o.filled > o.volume {
            return Err(OrderBookError::InvalidArgument {
                message: format!("filled {} outside [0, {}]", o.filled, o.volume),
            });
        }
        let unconditional = o.order_type == OrderType::Market && o.flag == OrderFlag::None;
        if !unconditional && (!o.price.is_finite() || o.price < 0.0) {
            return Err(OrderBookError::InvalidArgument {
                message: format!("price {} must be non-negative and finite", o.price),
            });
        }
        match o.order_type {
            OrderType::Stop if o.stop_target.is_none() => Err(OrderBookError::InvalidArgument {
                message: "stop order requires a stop target".to_string(),
            }),
            OrderType::Limit | OrderType::Market if o.stop_target.is_some() => {
                Err(OrderBookError::InvalidArgument {
                    message: "only stop orders may carry a stop target".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Place a residual order on its own side, creating the level if
    /// needed.
    fn rest(&mut self, order: &OrderRef, side: Side) {
        let price = order.borrow().price;
        let key = PriceKey::from(price);
        let levels = match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        };
        let level = levels.entry(key).or_insert_with(|| PriceLevel::new(price));
        level.add(order, &mut self.collector);
        // a stop whose target was already armed stages nothing; don't keep
        // a hollow level around
        if level.is_empty() {
            levels.remove(&key);
        }
    }

    /// Physically remove the levels consumed by the cross from the
    /// opposing side.
    fn clear_crossed_levels(&mut self, taker_side: Side) {
        let cleared = self.collector.cleared_levels();
        let opposing = match taker_side {
            Side::Buy => &mut self.sells,
            Side::Sell => &mut self.buys,
        };
        for _ in 0..cleared {
            let key = match taker_side {
                Side::Buy => opposing.keys().next().copied(),
                Side::Sell => opposing.keys().next_back().copied(),
            };
            match key {
                Some(key) => {
                    opposing.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Undo the staged cross on the opposing side.
    fn revert_cross(&mut self, taker_side: Side) {
        let opposing = match taker_side {
            Side::Buy => &mut self.sells,
            Side::Sell => &mut self.buys,
        };
        self.collector.revert(opposing);
    }

    /// Close the transaction: accept staged state on every touched level
    /// still in the book, then hard-reset the collector.
    fn finish(&mut self, taker_side: Side) {
        let opposing = match taker_side {
            Side::Buy => &mut self.sells,
            Side::Sell => &mut self.buys,
        };
        for price in self.collector.touched() {
            if let Some(level) = opposing.get_mut(price) {
                level.commit();
            }
        }
        self.collector.clear();
    }
}
