//! Infinite generators: arithmetic counts, constant repetition and cycling

use std::ops::Add;

use super::{
    checked_count, flatten, take, ElementType, Flatten, IterError, Iterate, Reversible,
    SizeCategory, Take,
};

/// Infinite arithmetic sequence `start, start + step, ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Count<T> {
    start: T,
    step: T,
}

/// Count upwards from `start` by `step` forever.
pub fn count<T>(start: T, step: T) -> Count<T>
where
    T: Clone + Add<Output = T>,
{
    Count { start, step }
}

impl<T> Iterate for Count<T>
where
    T: Clone + Add<Output = T>,
{
    type Item = T;
    type State = T;

    fn start(&self) -> T {
        self.start.clone()
    }

    fn next(&self, state: T) -> Option<(T, T)> {
        let next = state.clone() + self.step.clone();
        Some((state, next))
    }

    fn size(&self) -> SizeCategory {
        SizeCategory::Infinite
    }

    fn element_type(&self) -> ElementType {
        ElementType::of::<T>()
    }

    fn is_done(&self, _state: &T) -> Option<bool> {
        Some(false)
    }
}

/// The same value forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeated<T> {
    value: T,
}

/// `x, x, x, ...`
pub fn repeated<T: Clone>(value: T) -> Repeated<T> {
    Repeated { value }
}

/// `x` exactly `n` times.
pub fn repeated_n<T: Clone>(value: T, n: isize) -> Result<Take<Repeated<T>>, IterError> {
    take(repeated(value), n)
}

impl<T: Clone> Iterate for Repeated<T> {
    type Item = T;
    type State = ();

    fn start(&self) {}

    fn next(&self, _state: ()) -> Option<(T, ())> {
        Some((self.value.clone(), ()))
    }

    fn size(&self) -> SizeCategory {
        SizeCategory::Infinite
    }

    fn element_type(&self) -> ElementType {
        ElementType::of::<T>()
    }

    fn is_done(&self, _state: &()) -> Option<bool> {
        Some(false)
    }

    fn constant_item(&self) -> Option<T> {
        Some(self.value.clone())
    }

    fn nth(&self, n: usize) -> Result<T, IterError> {
        if n == 0 {
            return Err(IterError::out_of_bounds("index 0 (indices start at 1)"));
        }
        Ok(self.value.clone())
    }

    fn last_value(&self) -> Result<Option<T>, IterError> {
        Ok(Some(self.value.clone()))
    }
}

/// Every element is identical, so backwards is forwards.
impl<T: Clone> Reversible for Repeated<T> {
    type RevState = ();

    fn rev_start(&self) {}

    fn rev_next(&self, _state: ()) -> Option<(T, ())> {
        Some((self.value.clone(), ()))
    }
}

/// Restarts the source each time it runs out.
///
/// An empty source ends the cycle immediately instead of spinning. A source
/// of unknown size still advertises `Infinite` even if it turns out to be
/// empty; that is a known limitation of the static size category. A source
/// that becomes empty between passes (possible only for sources backed by
/// external mutable state) simply ends the cycle at that restart.
#[derive(Debug, Clone)]
pub struct Cycle<I> {
    inner: I,
}

/// Cycle state: position in the current pass, and whether that pass has
/// produced anything yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleState<S> {
    state: S,
    fresh: bool,
}

/// Repeat `it` forever.
pub fn cycle<I: Iterate>(it: I) -> Cycle<I> {
    Cycle { inner: it }
}

/// Repeat `it` exactly `n` times, as `flatten(repeated(it, n))`.
pub fn cycle_n<I>(it: I, n: isize) -> Result<Flatten<Take<Repeated<I>>>, IterError>
where
    I: Iterate + Clone,
{
    checked_count("cycle", n)?;
    Ok(flatten(repeated_n(it, n)?))
}

impl<I: Iterate> Iterate for Cycle<I> {
    type Item = I::Item;
    type State = CycleState<I::State>;

    fn start(&self) -> Self::State {
        CycleState {
            state: self.inner.start(),
            fresh: true,
        }
    }

    fn next(&self, CycleState { state, fresh }: Self::State) -> Option<(I::Item, Self::State)> {
        if let Some((value, state)) = self.inner.next(state) {
            return Some((value, CycleState { state, fresh: false }));
        }
        if fresh {
            // a whole pass produced nothing
            return None;
        }
        let (value, state) = self.inner.next(self.inner.start())?;
        Some((value, CycleState { state, fresh: false }))
    }

    fn size(&self) -> SizeCategory {
        if self.inner.size().is_empty() {
            SizeCategory::HasLength(0)
        } else {
            SizeCategory::Infinite
        }
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn constant_item(&self) -> Option<I::Item> {
        self.inner.constant_item()
    }

    /// O(1) for sources of known length: `((n - 1) mod len) + 1` of the source.
    fn nth(&self, n: usize) -> Result<I::Item, IterError> {
        if n == 0 {
            return Err(IterError::out_of_bounds("index 0 (indices start at 1)"));
        }
        match self.inner.length() {
            Ok(0) => Err(IterError::out_of_bounds("cycle over an empty iterator")),
            Ok(len) => self.inner.nth((n - 1) % len + 1),
            Err(_) => super::nth_by_stepping(self, n),
        }
    }

    fn last_value(&self) -> Result<Option<I::Item>, IterError> {
        if self.inner.size().is_empty() {
            return Ok(None);
        }
        Err(IterError::UndefinedLength(
            "cannot take the last element of an infinite iterator".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::filter;
    use std::cell::Cell;

    #[test]
    fn count_steps_forever() {
        let c = count(5, 3);
        assert_eq!(c.walk().take(4).collect::<Vec<_>>(), vec![5, 8, 11, 14]);
        assert_eq!(c.size(), SizeCategory::Infinite);
    }

    #[test]
    fn repeated_n_is_finite() {
        let r = repeated_n("ab", 3).expect("non-negative");
        assert_eq!(r.walk().collect::<Vec<_>>(), vec!["ab", "ab", "ab"]);
        assert_eq!(r.length(), Ok(3));
    }

    #[test]
    fn cycle_restarts() {
        let c = cycle(vec![1, 2, 3]);
        assert_eq!(
            c.walk().take(7).collect::<Vec<_>>(),
            vec![1, 2, 3, 1, 2, 3, 1]
        );
    }

    #[test]
    fn cycle_over_empty_terminates() {
        let c = cycle(Vec::<i32>::new());
        assert_eq!(c.size(), SizeCategory::HasLength(0));
        assert_eq!(c.walk().count(), 0);
    }

    #[test]
    fn cycle_over_filtered_empty_terminates_despite_infinite_size() {
        let polls = Cell::new(0);
        let none = filter(
            |_: &i32| {
                polls.set(polls.get() + 1);
                false
            },
            vec![1, 2],
        );
        let c = cycle(none);
        assert_eq!(c.size(), SizeCategory::Infinite);
        assert_eq!(c.walk().count(), 0);
        assert_eq!(polls.get(), 2);
    }

    #[test]
    fn cycle_nth_uses_modulo() {
        let c = cycle(vec![1, 2, 3]);
        assert_eq!(c.nth(8), Ok(2));
        assert_eq!(c.nth(3), Ok(3));
        assert!(c.nth(0).is_err());
    }

    #[test]
    fn cycle_n_repeats_exactly() {
        let c = cycle_n(vec!['a', 'b'], 3).expect("non-negative");
        assert_eq!(c.walk().collect::<String>(), "ababab");
        assert_eq!(c.nth(5), Ok('a'));
        assert!(c.nth(7).is_err());
        assert!(cycle_n(vec![1], -1).is_err());
    }
}
