//! Literal end-to-end matching scenarios, asserting the full event stream
//! seen by the callback.

use matchbook::{Event, Exchange, Instrument, Order, OrderBook, OrderFlag, OrderRef, Side};
use std::cell::RefCell;
use std::rc::Rc;

fn instrument() -> Instrument {
    Instrument::equity("TEST")
}

fn limit(id: &str, side: Side, price: f64, volume: f64) -> OrderRef {
    Order::limit(id, side, price, volume, instrument()).into_ref()
}

fn recording_book() -> (OrderBook, Rc<RefCell<Vec<Event>>>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let book = OrderBook::with_callback(instrument(), Exchange::null(), move |event: &Event| {
        sink.borrow_mut().push(event.clone());
    });
    (book, events)
}

/// Compact stream description: event kind plus the primary order id.
fn describe(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            Event::Open { order } => format!("open:{}", order.borrow().id),
            Event::Fill { order, volume } => match volume {
                Some(v) => format!("fill:{}:{}", order.borrow().id, v),
                None => format!("fill:{}", order.borrow().id),
            },
            Event::Change { order, volume } => match volume {
                Some(v) => format!("change:{}:{}", order.borrow().id, v),
                None => format!("change:{}", order.borrow().id),
            },
            Event::Cancel { order } => format!("cancel:{}", order.borrow().id),
            Event::Trade(trade) => format!(
                "trade:{}:{}@{}",
                trade.taker.borrow().id,
                trade.volume,
                trade.price
            ),
        })
        .collect()
}

#[test]
fn scenario_simple_cross() {
    let (mut book, events) = recording_book();
    let a = limit("A", Side::Sell, 100.0, 10.0);
    let b = limit("B", Side::Buy, 100.0, 10.0);
    book.add(&a).unwrap();
    book.add(&b).unwrap();

    assert_eq!(
        describe(&events.borrow()),
        ["open:A", "fill:B", "fill:A:10", "trade:B:10@100"]
    );
    match events.borrow().last() {
        Some(Event::Trade(trade)) => {
            assert_eq!(trade.price, 100.0);
            assert_eq!(trade.volume, 10.0);
            let makers: Vec<String> = trade
                .makers
                .iter()
                .map(|m| m.borrow().id.to_string())
                .collect();
            assert_eq!(makers, ["A"]);
        }
        other => panic!("expected trade, got {other:?}"),
    }
    assert!(book.is_empty());
    assert!(a.borrow().is_finished());
    assert!(b.borrow().is_finished());
}

#[test]
fn scenario_partial_maker() {
    let (mut book, events) = recording_book();
    let a = limit("A", Side::Sell, 100.0, 10.0);
    let b = limit("B", Side::Buy, 100.0, 4.0);
    book.add(&a).unwrap();
    book.add(&b).unwrap();

    assert_eq!(
        describe(&events.borrow()),
        ["open:A", "fill:B", "change:A:4", "trade:B:4@100"]
    );
    assert_eq!(a.borrow().filled, 4.0);
    assert_eq!(book.volume_at(Side::Sell, 100.0), 6.0);
    assert!(b.borrow().is_finished());
    assert_eq!(book.best_bid(), None);
}

#[test]
fn scenario_sweep_across_two_levels() {
    let (mut book, events) = recording_book();
    let a = limit("A", Side::Sell, 100.0, 5.0);
    let c = limit("C", Side::Sell, 101.0, 5.0);
    let b = limit("B", Side::Buy, 101.0, 10.0);
    book.add(&a).unwrap();
    book.add(&c).unwrap();
    book.add(&b).unwrap();

    assert_eq!(
        describe(&events.borrow()),
        [
            "open:A",
            "open:C",
            "change:B",
            "fill:A:5",
            "fill:B",
            "fill:C:5",
            "trade:B:10@100.5"
        ]
    );
    assert!(book.is_empty());
    assert!(a.borrow().is_finished());
    assert!(b.borrow().is_finished());
    assert!(c.borrow().is_finished());
}

#[test]
fn scenario_fok_limit_insufficient_liquidity() {
    let (mut book, events) = recording_book();
    let a = limit("A", Side::Sell, 100.0, 3.0);
    let b = Order::limit("B", Side::Buy, 100.0, 10.0, instrument())
        .with_flag(OrderFlag::FillOrKill)
        .into_ref();
    book.add(&a).unwrap();
    book.add(&b).unwrap();

    assert_eq!(describe(&events.borrow()), ["open:A", "cancel:B"]);
    // the revert restored A whole
    assert_eq!(a.borrow().filled, 0.0);
    assert_eq!(a.borrow().volume, 3.0);
    assert_eq!(b.borrow().filled, 0.0);
    assert_eq!(book.volume_at(Side::Sell, 100.0), 3.0);
    assert_eq!(book.best_bid(), None);
}

#[test]
fn scenario_ioc_leftover_cancelled() {
    let (mut book, events) = recording_book();
    let a = limit("A", Side::Sell, 100.0, 3.0);
    let b = Order::limit("B", Side::Buy, 100.0, 10.0, instrument())
        .with_flag(OrderFlag::ImmediateOrCancel)
        .into_ref();
    book.add(&a).unwrap();
    book.add(&b).unwrap();

    assert_eq!(
        describe(&events.borrow()),
        ["open:A", "change:B", "fill:A:3", "cancel:B"]
    );
    assert!(a.borrow().is_finished());
    assert_eq!(b.borrow().filled, 3.0);
    assert!(book.is_empty());
}

#[test]
fn scenario_stop_trigger() {
    let (mut book, events) = recording_book();
    let x = limit("X", Side::Sell, 100.0, 1.0);
    book.add(&x).unwrap();

    let target = limit("T", Side::Buy, 50.0, 1.0);
    let stop = Order::stop("S", Side::Buy, 100.0, target.clone(), instrument()).into_ref();
    book.add(&stop).unwrap();

    let y = limit("Y", Side::Buy, 100.0, 1.0);
    book.add(&y).unwrap();

    // the stop's target was submitted after the crossing commit, with the
    // taker's timestamp
    assert_eq!(target.borrow().timestamp, y.borrow().timestamp);
    assert_eq!(
        describe(&events.borrow()),
        [
            "open:X",
            "fill:Y",
            "fill:X:1",
            "trade:Y:1@100",
            "open:T"
        ]
    );
    assert_eq!(book.best_bid(), Some(50.0));
    assert_eq!(book.volume_at(Side::Buy, 50.0), 1.0);
}
