//! Element-demand accounting: adaptors only touch what is asked for

use std::cell::Cell;
use std::rc::Rc;

use lazytrace::iter::{
    count, cycle, cycle_n, filter, first, map, nth, only, span, take, zip, IterError, Iterate,
    SizeCategory, Stateful,
};

/// Wraps a source and counts calls to `next`.
#[derive(Debug, Clone)]
struct Counted<I> {
    inner: I,
    calls: Rc<Cell<usize>>,
}

impl<I> Counted<I> {
    fn new(inner: I) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                inner,
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl<I: Iterate> Iterate for Counted<I> {
    type Item = I::Item;
    type State = I::State;

    fn start(&self) -> I::State {
        self.inner.start()
    }

    fn next(&self, state: I::State) -> Option<(I::Item, I::State)> {
        self.calls.set(self.calls.get() + 1);
        self.inner.next(state)
    }

    fn size(&self) -> SizeCategory {
        self.inner.size()
    }
}

#[test]
fn test_map_and_filter_run_only_on_demand() {
    let mapped = Rc::new(Cell::new(0));
    let tested = Rc::new(Cell::new(0));
    let (m, t) = (Rc::clone(&mapped), Rc::clone(&tested));
    let pipeline = map(
        move |x: i64| {
            m.set(m.get() + 1);
            x * 10
        },
        filter(
            move |x: &i64| {
                t.set(t.get() + 1);
                x % 3 == 0
            },
            count(1i64, 1),
        ),
    );
    assert_eq!((mapped.get(), tested.get()), (0, 0));

    assert_eq!(first(&pipeline), Some(30));
    assert_eq!((mapped.get(), tested.get()), (1, 3));

    let head = take(&pipeline, 2).expect("non-negative count");
    assert_eq!(head.walk().collect::<Vec<_>>(), vec![30, 60]);
    assert_eq!((mapped.get(), tested.get()), (3, 9));
}

#[test]
fn test_take_of_cycle_consumes_exactly_what_it_yields() {
    let (source, calls) = Counted::new(span(0, 5));
    let head = take(cycle(source), 3).expect("non-negative count");
    assert_eq!(head.walk().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_nth_on_cycle_is_modular() {
    let (source, calls) = Counted::new(span(0, 5));
    let forever = cycle(source);
    assert_eq!(nth(&forever, 1_000_000_003), Ok(2));
    assert!(calls.get() <= 5, "stepped {} times", calls.get());
}

#[test]
fn test_nth_on_cycle_n_is_modular_and_bounded() {
    let (source, calls) = Counted::new(span(0, 5));
    let repeated = cycle_n(source, 1_000_000).expect("non-negative count");
    assert_eq!(repeated.length(), Ok(5_000_000));
    assert_eq!(nth(&repeated, 4_999_998), Ok(2));
    assert!(calls.get() <= 5, "stepped {} times", calls.get());
    assert!(matches!(
        nth(&repeated, 5_000_001),
        Err(IterError::OutOfBounds(_))
    ));
}

#[test]
fn test_only_on_infinite_source_stops_after_two() {
    let (source, calls) = Counted::new(count(0u32, 1));
    match only(&source) {
        Err(IterError::OutOfBounds(msg)) => assert!(msg.contains("multiple elements")),
        other => panic!("expected an out-of-bounds error, got {:?}", other),
    }
    assert!(calls.get() <= 2);
}

#[test]
fn test_zip_does_not_pop_stateful_after_exhaustion() {
    let (short, _) = Counted::new(span(0, 2));
    let cursor = Stateful::new(span(100, 110));
    let pairs: Vec<_> = zip((short, &cursor)).walk().collect();
    assert_eq!(pairs, vec![(0, 100), (1, 101)]);
    assert_eq!(cursor.consumed(), 2);
    assert_eq!(cursor.peek(), Some(102));
}

#[test]
fn test_zip_checks_cheap_exhaustion_first() {
    let cursor = Stateful::new(span(0, 10));
    let (unknown, calls) = Counted::new(span(0, 10));
    let empty: Vec<i64> = Vec::new();
    let pairs: Vec<_> = zip((unknown, &cursor, empty)).walk().collect();
    assert!(pairs.is_empty());
    assert_eq!(calls.get(), 0);
    assert_eq!(cursor.consumed(), 0);
}
