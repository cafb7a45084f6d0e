//! Mutable cursors and resumable remainders

use std::cell::{Cell, RefCell};
use std::fmt;

use super::{ElementType, IterError, Iterate, SizeCategory};

/// A cursor that owns its progress.
///
/// The next `(value, state)` pair is fetched eagerly on construction and after
/// every pop, so [`Stateful::peek`] and the exhaustion check never advance the
/// source. After `k` pops the cursor yields exactly what
/// `rest(source, state_after_k)` would.
///
/// Interior mutability is single-threaded (`RefCell`/`Cell`), so the cursor
/// is `!Sync`.
pub struct Stateful<I: Iterate> {
    inner: I,
    position: RefCell<I::State>,
    slot: RefCell<Option<(I::Item, I::State)>>,
    consumed: Cell<usize>,
}

impl<I: Iterate + fmt::Debug> fmt::Debug for Stateful<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stateful")
            .field("inner", &self.inner)
            .field("consumed", &self.consumed.get())
            .field("exhausted", &self.is_exhausted())
            .finish_non_exhaustive()
    }
}

impl<I: Iterate> Stateful<I> {
    /// Wrap `it` and prefetch its first element.
    pub fn new(it: I) -> Self {
        let position = it.start();
        let slot = it.next(position.clone());
        Self {
            inner: it,
            position: RefCell::new(position),
            slot: RefCell::new(slot),
            consumed: Cell::new(0),
        }
    }

    /// Take the cached element and prefetch the following one.
    pub fn pop(&self) -> Result<I::Item, IterError> {
        let (value, state) = self.slot.borrow_mut().take().ok_or(IterError::EndOfSequence)?;
        let following = self.inner.next(state.clone());
        *self.position.borrow_mut() = state;
        *self.slot.borrow_mut() = following;
        self.consumed.set(self.consumed.get() + 1);
        Ok(value)
    }

    /// Whether the cursor has nothing left.
    pub fn is_exhausted(&self) -> bool {
        self.slot.borrow().is_none()
    }

    /// Number of elements popped since construction or the last reset.
    pub fn consumed(&self) -> usize {
        self.consumed.get()
    }

    /// State of the wrapped iterator after the elements popped so far.
    pub fn state(&self) -> I::State {
        self.position.borrow().clone()
    }

    /// The not-yet-popped elements as an independent iterator.
    pub fn remainder(&self) -> Rest<&I> {
        rest(&self.inner, self.state())
    }

    /// Restart from the beginning of the wrapped iterator.
    pub fn reset(&mut self) {
        let position = self.inner.start();
        *self.slot.get_mut() = self.inner.next(position.clone());
        *self.position.get_mut() = position;
        self.consumed.set(0);
    }

    /// Replace the wrapped iterator and start over on it.
    pub fn reset_with(&mut self, it: I) {
        self.inner = it;
        self.reset();
    }

    /// Unwrap the source iterator.
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Iterate> Stateful<I>
where
    I::Item: Clone,
{
    /// The cached next element without consuming it.
    pub fn peek(&self) -> Option<I::Item> {
        self.slot.borrow().as_ref().map(|(value, _)| value.clone())
    }

    /// The cached next element, or `sentinel` when exhausted.
    pub fn peek_or(&self, sentinel: I::Item) -> I::Item {
        self.peek().unwrap_or(sentinel)
    }
}

/// Popping through the protocol: the unit state carries nothing, progress
/// lives in the cursor.
impl<I: Iterate> Iterate for Stateful<I> {
    type Item = I::Item;
    type State = ();

    fn start(&self) {}

    fn next(&self, _state: ()) -> Option<(I::Item, ())> {
        self.pop().ok().map(|value| (value, ()))
    }

    /// Consumption has already happened, so only infinity survives.
    fn size(&self) -> SizeCategory {
        match self.inner.size() {
            SizeCategory::Infinite => SizeCategory::Infinite,
            _ => SizeCategory::Unknown,
        }
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn is_done(&self, _state: &()) -> Option<bool> {
        Some(self.is_exhausted())
    }
}

/// An iterator resumed from a previously obtained state.
pub struct Rest<I: Iterate> {
    inner: I,
    state: I::State,
}

impl<I: Iterate + fmt::Debug> fmt::Debug for Rest<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rest")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<I: Iterate + Clone> Clone for Rest<I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            state: self.state.clone(),
        }
    }
}

/// Continue `it` from `state` without restarting it.
pub fn rest<I: Iterate>(it: I, state: I::State) -> Rest<I> {
    Rest { inner: it, state }
}

impl<I: Iterate> Iterate for Rest<I> {
    type Item = I::Item;
    type State = I::State;

    fn start(&self) -> I::State {
        self.state.clone()
    }

    fn next(&self, state: I::State) -> Option<(I::Item, I::State)> {
        self.inner.next(state)
    }

    fn size(&self) -> SizeCategory {
        match self.inner.size() {
            SizeCategory::Infinite => SizeCategory::Infinite,
            _ if self.inner.is_done(&self.state) == Some(true) => SizeCategory::HasLength(0),
            _ => SizeCategory::Unknown,
        }
    }

    fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    fn is_done(&self, state: &I::State) -> Option<bool> {
        self.inner.is_done(state)
    }

    fn constant_item(&self) -> Option<I::Item> {
        self.inner.constant_item()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::span;

    #[test]
    fn pop_and_peek() {
        let cursor = Stateful::new(vec![1, 2]);
        assert_eq!(cursor.peek(), Some(1));
        assert_eq!(cursor.pop(), Ok(1));
        assert_eq!(cursor.peek_or(-1), 2);
        assert_eq!(cursor.pop(), Ok(2));
        assert_eq!(cursor.peek_or(-1), -1);
        assert_eq!(cursor.pop(), Err(IterError::EndOfSequence));
        assert_eq!(cursor.consumed(), 2);
    }

    #[test]
    fn popped_cursor_matches_rest() {
        let source = span(0, 10);
        let cursor = Stateful::new(source);
        for _ in 0..4 {
            cursor.pop().expect("enough elements");
        }
        let resumed = rest(source, cursor.state());
        let via_cursor: Vec<_> = cursor.walk().collect();
        assert_eq!(via_cursor, resumed.walk().collect::<Vec<_>>());
        assert_eq!(via_cursor, vec![4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn remainder_does_not_consume() {
        let cursor = Stateful::new(vec!['a', 'b', 'c']);
        cursor.pop().expect("non-empty");
        assert_eq!(cursor.remainder().walk().collect::<String>(), "bc");
        assert_eq!(cursor.peek(), Some('b'));
    }

    #[test]
    fn reset_restarts_or_replaces() {
        let mut cursor = Stateful::new(vec![1, 2, 3]);
        cursor.pop().expect("non-empty");
        cursor.reset();
        assert_eq!(cursor.consumed(), 0);
        assert_eq!(cursor.peek(), Some(1));
        cursor.reset_with(vec![9]);
        assert_eq!(cursor.pop(), Ok(9));
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn size_degrades_to_unknown() {
        let cursor = Stateful::new(vec![1, 2, 3]);
        assert_eq!(cursor.size(), SizeCategory::Unknown);
        assert_eq!(cursor.is_done(&()), Some(false));
    }
}
