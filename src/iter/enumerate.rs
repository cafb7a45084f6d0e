use super::{ElementType, Indexed, IterError, Iterate, Reversible, SizeCategory};

/// Pairs a 1-based running counter with each element.
///
/// The counter counts positions; it is not an index into the source.
/// Use [`pairs`] for `(index, value)` over random-access sources.
#[derive(Debug, Clone)]
pub struct Enumerate<I> {
    inner: I,
}

/// `(1, v1), (2, v2), ...` over `it`.
pub fn enumerate<I: Iterate>(it: I) -> Enumerate<I> {
    Enumerate { inner: it }
}

impl<I: Iterate> Iterate for Enumerate<I> {
    type Item = (usize, I::Item);
    type State = (usize, I::State);

    fn start(&self) -> Self::State {
        (1, self.inner.start())
    }

    fn next(&self, (counter, state): Self::State) -> Option<(Self::Item, Self::State)> {
        let (value, state) = self.inner.next(state)?;
        Some(((counter, value), (counter + 1, state)))
    }

    fn size(&self) -> SizeCategory {
        self.inner.size()
    }

    fn element_type(&self) -> ElementType {
        ElementType::all_known::<Self::Item>(&[self.inner.element_type()])
    }

    fn is_done(&self, (_, state): &Self::State) -> Option<bool> {
        self.inner.is_done(state)
    }

    fn nth(&self, n: usize) -> Result<Self::Item, IterError> {
        self.inner.nth(n).map(|value| (n, value))
    }
}

impl<I: Reversible> Reversible for Enumerate<I> {
    type RevState = (usize, I::RevState);

    /// Counting down needs the length up front.
    fn check_reversible(&self) -> Result<(), IterError> {
        self.inner.check_reversible()?;
        self.inner.length().map(|_| ()).map_err(|_| {
            IterError::UnsupportedReverse(format!(
                "enumerate over an iterator of size {}",
                self.inner.size()
            ))
        })
    }

    fn rev_start(&self) -> Self::RevState {
        (self.inner.length().unwrap_or(0), self.inner.rev_start())
    }

    fn rev_next(&self, (counter, state): Self::RevState) -> Option<(Self::Item, Self::RevState)> {
        let (value, state) = self.inner.rev_next(state)?;
        Some(((counter, value), (counter.saturating_sub(1), state)))
    }
}

/// `(index, value)` over a random-access source, using its 0-based indices.
#[derive(Debug, Clone)]
pub struct Pairs<I> {
    inner: I,
}

/// Key/value pairs of an indexed source.
pub fn pairs<I: Indexed>(it: I) -> Pairs<I> {
    Pairs { inner: it }
}

impl<I: Indexed> Iterate for Pairs<I> {
    type Item = (usize, I::Item);
    type State = usize;

    fn start(&self) -> usize {
        0
    }

    fn next(&self, index: usize) -> Option<(Self::Item, usize)> {
        let value = self.inner.get(index)?;
        Some(((index, value), index + 1))
    }

    fn size(&self) -> SizeCategory {
        self.inner.size()
    }

    fn element_type(&self) -> ElementType {
        ElementType::all_known::<Self::Item>(&[self.inner.element_type()])
    }

    fn is_done(&self, index: &usize) -> Option<bool> {
        Some(*index >= self.inner.index_len())
    }

    fn nth(&self, n: usize) -> Result<Self::Item, IterError> {
        let index = super::nth_index(n, self.inner.index_len())?;
        self.inner
            .get(index)
            .map(|value| (index, value))
            .ok_or_else(|| IterError::out_of_bounds(format!("index {}", index)))
    }
}

impl<I: Indexed> Reversible for Pairs<I> {
    type RevState = usize;

    fn rev_start(&self) -> usize {
        self.inner.index_len()
    }

    fn rev_next(&self, remaining: usize) -> Option<(Self::Item, usize)> {
        let index = remaining.checked_sub(1)?;
        let value = self.inner.get(index)?;
        Some(((index, value), index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::{filter, repeated, reverse, seq, span};

    #[test]
    fn counts_from_one() {
        let e = enumerate(vec!['a', 'b', 'c']);
        assert_eq!(
            e.walk().collect::<Vec<_>>(),
            vec![(1, 'a'), (2, 'b'), (3, 'c')]
        );
    }

    #[test]
    fn counter_is_not_an_index() {
        let odd = filter(|x: &i64| x % 2 == 1, span(0, 6));
        let e = enumerate(odd);
        assert_eq!(e.walk().collect::<Vec<_>>(), vec![(1, 1), (2, 3), (3, 5)]);
    }

    #[test]
    fn pairs_use_source_indices() {
        let view = seq(vec![5, 6, 7, 8]).slice(2..4);
        assert_eq!(pairs(view).walk().collect::<Vec<_>>(), vec![(0, 7), (1, 8)]);
    }

    #[test]
    fn reversed_enumerate_counts_down() {
        let back = reverse(enumerate(vec!['x', 'y', 'z'])).expect("finite source");
        assert_eq!(
            back.walk().collect::<Vec<_>>(),
            vec![(3, 'z'), (2, 'y'), (1, 'x')]
        );
    }

    #[test]
    fn reversed_enumerate_over_infinite_fails() {
        assert!(matches!(
            reverse(enumerate(repeated(1))),
            Err(IterError::UnsupportedReverse(_))
        ));
    }

    #[test]
    fn reversed_pairs() {
        let back = reverse(pairs(vec![1, 2])).expect("pairs reverse");
        assert_eq!(back.walk().collect::<Vec<_>>(), vec![(1, 2), (0, 1)]);
    }
}
