//! Concatenation of the iterables produced by an outer iterator

use super::{flatten_size, map, nth_by_stepping, IterError, Iterate, Map, Reversible, SizeCategory};

/// Yields the elements of every inner iterable in turn.
#[derive(Debug, Clone)]
pub struct Flatten<O> {
    outer: O,
}

/// Position in the outer iterator plus the inner iterable being drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenState<S, J, T> {
    outer: S,
    inner: Option<(J, T)>,
}

/// Concatenate the inner iterables of `outer`.
pub fn flatten<O>(outer: O) -> Flatten<O>
where
    O: Iterate,
    O::Item: Iterate + Clone,
{
    Flatten { outer }
}

/// `flatten(map(f, it))`.
pub fn flatmap<B, I, F>(f: F, it: I) -> Flatten<Map<I, F>>
where
    I: Iterate,
    F: Fn(I::Item) -> B,
    B: Iterate + Clone,
{
    flatten(map(f, it))
}

impl<O> Iterate for Flatten<O>
where
    O: Iterate,
    O::Item: Iterate + Clone,
{
    type Item = <O::Item as Iterate>::Item;
    type State = FlattenState<O::State, O::Item, <O::Item as Iterate>::State>;

    fn start(&self) -> Self::State {
        FlattenState {
            outer: self.outer.start(),
            inner: None,
        }
    }

    fn next(
        &self,
        FlattenState { mut outer, inner }: Self::State,
    ) -> Option<(Self::Item, Self::State)> {
        if let Some((current, state)) = inner {
            if let Some((value, state)) = current.next(state) {
                return Some((
                    value,
                    FlattenState {
                        outer,
                        inner: Some((current, state)),
                    },
                ));
            }
        }
        // empty inners are skipped until one produces or the outer runs out
        loop {
            let (current, next_outer) = self.outer.next(outer)?;
            outer = next_outer;
            let first = current.start();
            if let Some((value, state)) = current.next(first) {
                return Some((
                    value,
                    FlattenState {
                        outer,
                        inner: Some((current, state)),
                    },
                ));
            }
        }
    }

    fn size(&self) -> SizeCategory {
        let outer = self.outer.size();
        let by_type = flatten_size(&outer, <O::Item as Iterate>::fixed_len());
        if by_type != SizeCategory::Unknown {
            return by_type;
        }
        match self.outer.constant_item() {
            Some(inner) => repeated_inner_size(&outer, &inner.size()),
            None => by_type,
        }
    }

    fn is_done(&self, state: &Self::State) -> Option<bool> {
        let inner_done = match &state.inner {
            Some((current, inner)) => current.is_done(inner),
            None => Some(true),
        };
        match inner_done {
            Some(false) => Some(false),
            Some(true) if self.outer.is_done(&state.outer) == Some(true) => Some(true),
            _ => None,
        }
    }

    /// A repeated inner (`cycle_n`) has a length even though the inner type
    /// does not fix one.
    fn length(&self) -> Result<usize, IterError> {
        match self.outer.constant_item() {
            Some(inner) => {
                let times = self.outer.length()?;
                inner
                    .length()?
                    .checked_mul(times)
                    .ok_or_else(|| IterError::ArithmeticOverflow("flattened length".to_string()))
            }
            None => self.size().length(),
        }
    }

    /// O(1) for a repeated inner of known length (`cycle_n`) and for inners
    /// whose length is fixed by their type over a random-access outer.
    fn nth(&self, n: usize) -> Result<Self::Item, IterError> {
        if n == 0 {
            return Err(IterError::out_of_bounds("index 0 (indices start at 1)"));
        }
        if let Some(inner) = self.outer.constant_item() {
            let len = inner.length()?;
            if len == 0 {
                return Err(IterError::out_of_bounds("flatten of empty iterables"));
            }
            if let Ok(times) = self.outer.length() {
                let total = len.checked_mul(times).ok_or_else(|| {
                    IterError::ArithmeticOverflow("flattened length".to_string())
                })?;
                if n > total {
                    return Err(IterError::out_of_bounds(format!(
                        "index {} beyond the end ({} elements)",
                        n, total
                    )));
                }
            }
            return inner.nth((n - 1) % len + 1);
        }
        match <O::Item as Iterate>::fixed_len() {
            Some(0) => Err(IterError::out_of_bounds("flatten of empty iterables")),
            Some(k) => self.outer.nth((n - 1) / k + 1)?.nth((n - 1) % k + 1),
            None => nth_by_stepping(self, n),
        }
    }
}

/// Size of `outer` copies of one inner iterable.
fn repeated_inner_size(outer: &SizeCategory, inner: &SizeCategory) -> SizeCategory {
    if outer.is_empty() || inner.is_empty() {
        return SizeCategory::HasLength(0);
    }
    match (outer, inner.length()) {
        (SizeCategory::Infinite, Ok(_)) => SizeCategory::Infinite,
        (_, Ok(k)) => match outer.length().ok().and_then(|n| n.checked_mul(k)) {
            Some(total) => SizeCategory::HasLength(total),
            None => SizeCategory::Unknown,
        },
        (_, Err(_)) => SizeCategory::Unknown,
    }
}

impl<O> Reversible for Flatten<O>
where
    O: Reversible,
    O::Item: Reversible + Clone,
{
    type RevState = FlattenState<O::RevState, O::Item, <O::Item as Reversible>::RevState>;

    fn check_reversible(&self) -> Result<(), IterError> {
        self.outer.check_reversible()?;
        match self.outer.constant_item() {
            Some(inner) => inner.check_reversible(),
            None => Ok(()),
        }
    }

    fn rev_start(&self) -> Self::RevState {
        FlattenState {
            outer: self.outer.rev_start(),
            inner: None,
        }
    }

    fn rev_next(
        &self,
        FlattenState { mut outer, inner }: Self::RevState,
    ) -> Option<(Self::Item, Self::RevState)> {
        if let Some((current, state)) = inner {
            if let Some((value, state)) = current.rev_next(state) {
                return Some((
                    value,
                    FlattenState {
                        outer,
                        inner: Some((current, state)),
                    },
                ));
            }
        }
        loop {
            let (current, next_outer) = self.outer.rev_next(outer)?;
            outer = next_outer;
            let first = current.rev_start();
            if let Some((value, state)) = current.rev_next(first) {
                return Some((
                    value,
                    FlattenState {
                        outer,
                        inner: Some((current, state)),
                    },
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::{repeated, reverse, span, take, zip, Span};

    #[test]
    fn skips_runs_of_empty_inners() {
        let nested = vec![vec![], vec![1, 2], vec![], vec![], vec![3]];
        let flat = flatten(nested);
        assert_eq!(flat.walk().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn all_empty_inners_yield_nothing() {
        let nested: Vec<Vec<u8>> = vec![vec![], vec![]];
        assert_eq!(flatten(nested).walk().count(), 0);
    }

    #[test]
    fn length_needs_type_level_inner_length() {
        let arrays = flatten(vec![[1, 2], [3, 4], [5, 6]]);
        assert_eq!(arrays.size(), SizeCategory::HasShape(vec![2, 3]));
        assert_eq!(arrays.length(), Ok(6));
        assert_eq!(arrays.nth(4), Ok(4));

        let vecs = flatten(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(vecs.size(), SizeCategory::Unknown);
    }

    #[test]
    fn flatmap_expands_each_element() {
        let expanded = flatmap(|n: i64| span(0, n), span(1, 4));
        assert_eq!(
            expanded.walk().collect::<Vec<_>>(),
            vec![0, 0, 1, 0, 1, 2]
        );
    }

    #[test]
    fn repeated_inner_has_modulo_nth() {
        let inner: Span = span(10, 13);
        let flat = flatten(take(repeated(inner), 1000).expect("non-negative"));
        assert_eq!(flat.nth(3000), Ok(12));
        assert_eq!(flat.nth(4), Ok(10));
        assert!(flat.nth(3001).is_err());
    }

    #[test]
    fn repeated_inner_size_agrees_with_length() {
        let flat = flatten(take(repeated(span(0, 3)), 4).expect("non-negative"));
        assert_eq!(flat.size(), SizeCategory::HasLength(12));
        assert_eq!(flat.size().length(), flat.length());

        let paired = zip((flat.clone(), span(100, 112)));
        assert_eq!(paired.size(), SizeCategory::HasLength(12));
        let back = reverse(paired).expect("equal finite lengths");
        assert_eq!(back.walk().next(), Some((2, 111)));

        assert_eq!(flatten(repeated(span(0, 3))).size(), SizeCategory::Infinite);
        assert_eq!(
            flatten(take(repeated(span(0, 0)), 4).expect("non-negative")).size(),
            SizeCategory::HasLength(0)
        );
    }

    #[test]
    fn reversed_flatten_reverses_both_levels() {
        let back = reverse(flatten(vec![vec![1, 2], vec![], vec![3]])).expect("vectors reverse");
        assert_eq!(back.walk().collect::<Vec<_>>(), vec![3, 2, 1]);
    }
}
