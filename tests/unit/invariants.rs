//! Book-wide invariants checked over scripted operation sequences.

use matchbook::{Event, Exchange, Instrument, Order, OrderBook, OrderFlag, OrderRef, Side};
use std::cell::RefCell;
use std::collections::HashMap;
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

/// No level may linger without resting orders (stop-free books).
fn assert_no_hollow_levels(book: &OrderBook) {
    let snapshot = book.snapshot(usize::MAX);
    for level in snapshot.bids.iter().chain(snapshot.asks.iter()) {
        assert!(
            level.order_count > 0,
            "hollow level left at {}",
            level.price
        );
        assert!(level.volume > 0.0, "zero-volume level at {}", level.price);
    }
}

/// The book must never stay crossed.
fn assert_uncrossed(book: &OrderBook) {
    if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
        assert!(bid < ask, "book left crossed: bid {bid} >= ask {ask}");
    }
}

/// Resting orders are never finished and never overfilled.
fn assert_resting_orders_open(book: &OrderBook) {
    for order in book.iter() {
        let order = order.borrow();
        assert!(order.filled >= 0.0, "negative fill on {}", order.id);
        assert!(
            order.filled < order.volume,
            "finished order {} still resting",
            order.id
        );
    }
}

#[test]
fn no_hollow_levels_after_mixed_operations() {
    let (mut book, _) = recording_book();
    book.add(&limit("a1", Side::Sell, 101.0, 5.0)).unwrap();
    book.add(&limit("a2", Side::Sell, 102.0, 5.0)).unwrap();
    book.add(&limit("b1", Side::Buy, 99.0, 5.0)).unwrap();
    let b2 = limit("b2", Side::Buy, 98.0, 5.0);
    book.add(&b2).unwrap();

    // cross one ask away, cancel a bid, shrink another
    book.add(&limit("t1", Side::Buy, 101.0, 5.0)).unwrap();
    book.cancel(&b2).unwrap();
    book.change(&limit("b1", Side::Buy, 99.0, 2.0)).unwrap();

    assert_no_hollow_levels(&book);
    assert_uncrossed(&book);
}

#[test]
fn book_never_left_crossed() {
    let (mut book, _) = recording_book();
    let submissions = [
        ("s1", Side::Sell, 101.0, 5.0),
        ("s2", Side::Sell, 99.0, 2.0),
        ("b1", Side::Buy, 100.0, 4.0),
        ("b2", Side::Buy, 102.0, 8.0),
        ("s3", Side::Sell, 98.0, 1.0),
        ("b3", Side::Buy, 97.0, 3.0),
        ("s4", Side::Sell, 97.0, 10.0),
    ];
    for (id, side, price, volume) in submissions {
        book.add(&limit(id, side, price, volume)).unwrap();
        assert_uncrossed(&book);
        assert_no_hollow_levels(&book);
    }
}

#[test]
fn finished_orders_never_rest() {
    let (mut book, _) = recording_book();
    book.add(&limit("a", Side::Sell, 100.0, 5.0)).unwrap();
    book.add(&limit("b", Side::Sell, 100.0, 5.0)).unwrap();
    book.add(&limit("t", Side::Buy, 100.0, 7.0)).unwrap();

    // a is gone, b is split, t was filled whole
    assert_resting_orders_open(&book);
    assert_eq!(book.volume_at(Side::Sell, 100.0), 3.0);
}

#[test]
fn fill_volumes_sum_to_filled() {
    let (mut book, events) = recording_book();
    let makers = [
        limit("m1", Side::Sell, 100.0, 2.0),
        limit("m2", Side::Sell, 100.0, 3.0),
        limit("m3", Side::Sell, 101.0, 4.0),
    ];
    for maker in &makers {
        book.add(maker).unwrap();
    }
    book.add(&limit("t", Side::Buy, 101.0, 8.0)).unwrap();

    // maker increments arrive as fills when the maker is consumed whole
    // and as changes when it is split
    let mut fill_sums: HashMap<String, f64> = HashMap::new();
    for event in events.borrow().iter() {
        match event {
            Event::Fill {
                order,
                volume: Some(volume),
            }
            | Event::Change {
                order,
                volume: Some(volume),
            } => {
                *fill_sums.entry(order.borrow().id.to_string()).or_insert(0.0) += volume;
            }
            _ => {}
        }
    }
    for maker in &makers {
        let maker = maker.borrow();
        assert_eq!(
            fill_sums.get(maker.id.as_str()).copied().unwrap_or(0.0),
            maker.filled,
            "fill events disagree with state for {}",
            maker.id
        );
    }
}

#[test]
fn revert_leaves_book_byte_equal() {
    let (mut book, events) = recording_book();
    let m1 = limit("m1", Side::Sell, 100.0, 2.0);
    let m2 = limit("m2", Side::Sell, 100.0, 3.0);
    let m3 = limit("m3", Side::Sell, 101.0, 4.0);
    book.add(&m1).unwrap();
    book.add(&m2).unwrap();
    book.add(&m3).unwrap();

    let before = book.snapshot(usize::MAX);
    let fills_before: Vec<f64> = book.iter().map(|o| o.borrow().filled).collect();
    let ids_before: Vec<String> = book.iter().map(|o| o.borrow().id.to_string()).collect();
    events.borrow_mut().clear();

    // sweeps both levels partially, then dies and reverts
    let killed = Order::limit("k", Side::Buy, 101.0, 20.0, instrument())
        .with_flag(OrderFlag::FillOrKill)
        .into_ref();
    book.add(&killed).unwrap();

    let after = book.snapshot(usize::MAX);
    assert_eq!(before.bids, after.bids);
    assert_eq!(before.asks, after.asks);
    let fills_after: Vec<f64> = book.iter().map(|o| o.borrow().filled).collect();
    let ids_after: Vec<String> = book.iter().map(|o| o.borrow().id.to_string()).collect();
    assert_eq!(fills_before, fills_after);
    assert_eq!(ids_before, ids_after);
    assert_eq!(killed.borrow().filled, 0.0);

    // the only observable trace is the kill itself
    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Event::Cancel { order } if order.borrow().id.as_str() == "k"));
}

#[test]
fn fifo_order_survives_modify_and_remove() {
    let (mut book, _) = recording_book();
    let a = limit("a", Side::Sell, 100.0, 2.0);
    let b = limit("b", Side::Sell, 100.0, 2.0);
    let c = limit("c", Side::Sell, 100.0, 2.0);
    let d = limit("d", Side::Sell, 100.0, 2.0);
    for order in [&a, &b, &c, &d] {
        book.add(order).unwrap();
    }

    // remove one from the middle, grow another in place
    book.cancel(&b).unwrap();
    book.change(&limit("c", Side::Sell, 100.0, 5.0)).unwrap();

    let queue: Vec<String> = book.iter().map(|o| o.borrow().id.to_string()).collect();
    assert_eq!(queue, ["a", "c", "d"]);

    // fills come out in exactly that order
    book.add(&limit("t1", Side::Buy, 100.0, 2.0)).unwrap();
    assert!(a.borrow().is_finished());
    assert_eq!(c.borrow().filled, 0.0);

    book.add(&limit("t2", Side::Buy, 100.0, 5.0)).unwrap();
    assert!(c.borrow().is_finished());
    assert_eq!(d.borrow().filled, 0.0);
}

#[test]
fn collector_is_clean_between_submissions() {
    // observable corollary: two independent partial sweeps do not bleed
    // trade state into each other
    let (mut book, events) = recording_book();
    book.add(&limit("m1", Side::Sell, 100.0, 5.0)).unwrap();
    book.add(&limit("m2", Side::Sell, 200.0, 5.0)).unwrap();

    book.add(&limit("t1", Side::Buy, 100.0, 5.0)).unwrap();
    book.add(&limit("t2", Side::Buy, 200.0, 5.0)).unwrap();

    let trades: Vec<(f64, f64)> = events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            Event::Trade(trade) => Some((trade.price, trade.volume)),
            _ => None,
        })
        .collect();
    assert_eq!(trades, [(100.0, 5.0), (200.0, 5.0)]);
}
