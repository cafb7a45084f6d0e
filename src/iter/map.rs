use std::fmt;

use super::{zip, ElementType, IterError, Iterate, Reversible, SizeCategory, Zip, ZipSources};

/// Lazily applies `f` to every element of the source.
///
/// `f` runs exactly once per produced element, at the moment that element is
/// demanded; building the adaptor never calls it.
#[derive(Clone)]
pub struct Map<I, F> {
    inner: I,
    f: F,
}

impl<I: fmt::Debug, F> fmt::Debug for Map<I, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").field("inner", &self.inner).finish_non_exhaustive()
    }
}

/// `f(v)` for each `v` of `it`.
pub fn map<B, I, F>(f: F, it: I) -> Map<I, F>
where
    I: Iterate,
    F: Fn(I::Item) -> B,
{
    Map { inner: it, f }
}

/// `f((v1, v2, ...))` over synchronized sources; stops at the first exhausted one.
pub fn map_n<B, S, F>(f: F, sources: S) -> Map<Zip<S>, F>
where
    S: ZipSources,
    F: Fn(S::Item) -> B,
{
    Map {
        inner: zip(sources),
        f,
    }
}

impl<B, I, F> Iterate for Map<I, F>
where
    I: Iterate,
    F: Fn(I::Item) -> B,
{
    type Item = B;
    type State = I::State;

    fn start(&self) -> I::State {
        self.inner.start()
    }

    fn next(&self, state: I::State) -> Option<(B, I::State)> {
        let (value, state) = self.inner.next(state)?;
        Some(((self.f)(value), state))
    }

    fn size(&self) -> SizeCategory {
        self.inner.size()
    }

    fn is_done(&self, state: &I::State) -> Option<bool> {
        self.inner.is_done(state)
    }

    fn nth(&self, n: usize) -> Result<B, IterError> {
        self.inner.nth(n).map(&self.f)
    }
}

impl<B, I, F> Reversible for Map<I, F>
where
    I: Reversible,
    F: Fn(I::Item) -> B,
{
    type RevState = I::RevState;

    fn check_reversible(&self) -> Result<(), IterError> {
        self.inner.check_reversible()
    }

    fn rev_start(&self) -> I::RevState {
        self.inner.rev_start()
    }

    fn rev_next(&self, state: I::RevState) -> Option<(B, I::RevState)> {
        let (value, state) = self.inner.rev_next(state)?;
        Some(((self.f)(value), state))
    }
}

/// Lazily skips elements failing the predicate.
///
/// The predicate is not cached: every traversal calls it again on every
/// source element, so side-effecting predicates observe traversal order
/// (including reversal and cycling).
#[derive(Clone)]
pub struct Filter<I, P> {
    inner: I,
    predicate: P,
}

impl<I: fmt::Debug, P> fmt::Debug for Filter<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("inner", &self.inner).finish_non_exhaustive()
    }
}

/// Elements of `it` for which `predicate` holds.
pub fn filter<I, P>(predicate: P, it: I) -> Filter<I, P>
where
    I: Iterate,
    P: Fn(&I::Item) -> bool,
{
    Filter {
        inner: it,
        predicate,
    }
}

impl<I, P> Iterate for Filter<I, P>
where
    I: Iterate,
    P: Fn(&I::Item) -> bool,
{
    type Item = I::Item;
    type State = I::State;

    fn start(&self) -> I::State {
        self.inner.start()
    }

    fn next(&self, mut state: I::State) -> Option<(I::Item, I::State)> {
        loop {
            let (value, next_state) = self.inner.next(state)?;
            if (self.predicate)(&value) {
                return Some((value, next_state));
            }
            state = next_state;
        }
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn is_done(&self, state: &I::State) -> Option<bool> {
        // a non-exhausted source may still have nothing left that passes
        match self.inner.is_done(state) {
            Some(true) => Some(true),
            _ => None,
        }
    }
}

impl<I, P> Reversible for Filter<I, P>
where
    I: Reversible,
    P: Fn(&I::Item) -> bool,
{
    type RevState = I::RevState;

    fn check_reversible(&self) -> Result<(), IterError> {
        self.inner.check_reversible()
    }

    fn rev_start(&self) -> I::RevState {
        self.inner.rev_start()
    }

    fn rev_next(&self, mut state: I::RevState) -> Option<(I::Item, I::RevState)> {
        loop {
            let (value, next_state) = self.inner.rev_next(state)?;
            if (self.predicate)(&value) {
                return Some((value, next_state));
            }
            state = next_state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::{reverse, span};
    use std::cell::Cell;

    #[test]
    fn map_is_lazy() {
        let calls = Cell::new(0);
        let mapped = map(
            |x: i64| {
                calls.set(calls.get() + 1);
                x * 10
            },
            span(1, 100),
        );
        assert_eq!(calls.get(), 0);
        let first_three: Vec<_> = mapped.walk().take(3).collect();
        assert_eq!(first_three, vec![10, 20, 30]);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn map_preserves_size_but_not_element_type() {
        let mapped = map(|x: i64| x as f64, span(0, 4));
        assert_eq!(mapped.size(), SizeCategory::HasLength(4));
        assert_eq!(mapped.element_type(), ElementType::Unknown);
    }

    #[test]
    fn map_n_stops_at_shortest() {
        let sums = map_n(|(a, b): (i64, i64)| a + b, (span(0, 3), vec![10i64, 20, 30, 40]));
        assert_eq!(sums.walk().collect::<Vec<_>>(), vec![10, 21, 32]);
    }

    #[test]
    fn filter_size_is_unknown() {
        let odd = filter(|x: &i64| x % 2 == 1, span(0, 10));
        assert_eq!(odd.size(), SizeCategory::Unknown);
        assert!(odd.length().is_err());
        assert_eq!(odd.walk().collect::<Vec<_>>(), vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn reversed_filter_filters_reversed_source() {
        let odd = filter(|x: &i64| x % 2 == 1, span(0, 10));
        let back = reverse(odd).expect("span is reversible");
        assert_eq!(back.walk().collect::<Vec<_>>(), vec![9, 7, 5, 3, 1]);
    }
}
